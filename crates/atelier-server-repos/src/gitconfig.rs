// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Git identity configuration inside the workspace container.

use tracing::info;

use atelier_server_db::SettingsRepository;
use atelier_server_exec::ContainerExec;

use crate::error::{RepoError, Result};

/// Settings keys the configured identity is persisted under.
pub const GIT_USER_NAME_SETTING: &str = "git_user_name";
pub const GIT_USER_EMAIL_SETTING: &str = "git_user_email";

/// Set the container's global git identity and persist it in settings.
///
/// Commits made from the IDE use this identity; the settings copy survives
/// container rebuilds and seeds SSH key generation.
pub async fn configure_git_user(
	exec: &dyn ContainerExec,
	settings: &SettingsRepository,
	name: &str,
	email: &str,
) -> Result<()> {
	let name = name.trim();
	let email = email.trim();
	if name.is_empty() || email.is_empty() {
		return Err(RepoError::Validation(
			"git user name and email are required".to_string(),
		));
	}
	if name.contains('"') || email.contains('"') {
		return Err(RepoError::Validation(
			"git user name and email cannot contain quotes".to_string(),
		));
	}

	let commands = [
		format!(r#"git config --global user.name "{name}""#),
		format!(r#"git config --global user.email "{email}""#),
		"git config --global init.defaultBranch main".to_string(),
	];

	for command in &commands {
		let result = exec.exec(command).await?;
		if !result.success {
			return Err(RepoError::GitConfigFailed);
		}
	}

	settings
		.set_setting(GIT_USER_NAME_SETTING, name, "git_config")
		.await?;
	settings
		.set_setting(GIT_USER_EMAIL_SETTING, email, "git_config")
		.await?;

	info!(name = %name, email = %email, "git identity configured");
	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;
	use atelier_server_db::testing::create_settings_test_pool;
	use atelier_server_exec::testing::ScriptedExec;
	use atelier_server_exec::ExecOutput;

	#[tokio::test]
	async fn configures_identity_and_persists_settings() {
		let settings = SettingsRepository::new(create_settings_test_pool().await);
		let exec = ScriptedExec::new();

		configure_git_user(&exec, &settings, "Dev", "dev@example.com")
			.await
			.unwrap();

		let calls = exec.calls();
		assert!(calls.iter().any(|c| c.contains(r#"user.name "Dev""#)));
		assert!(calls
			.iter()
			.any(|c| c.contains(r#"user.email "dev@example.com""#)));
		assert!(calls
			.iter()
			.any(|c| c.contains("init.defaultBranch main")));

		let email = settings
			.get_setting(GIT_USER_EMAIL_SETTING)
			.await
			.unwrap()
			.unwrap();
		assert_eq!(email.value, "dev@example.com");
	}

	#[tokio::test]
	async fn blank_fields_are_rejected_before_any_exec() {
		let settings = SettingsRepository::new(create_settings_test_pool().await);
		let exec = ScriptedExec::new();

		let err = configure_git_user(&exec, &settings, " ", "dev@example.com")
			.await
			.unwrap_err();
		assert!(matches!(err, RepoError::Validation(_)));
		assert!(exec.calls().is_empty());
	}

	#[tokio::test]
	async fn container_failure_skips_settings_write() {
		let settings = SettingsRepository::new(create_settings_test_pool().await);
		let exec = ScriptedExec::new()
			.respond("git config", ExecOutput::failed("git: not found"));

		let err = configure_git_user(&exec, &settings, "Dev", "dev@example.com")
			.await
			.unwrap_err();
		assert!(matches!(err, RepoError::GitConfigFailed));
		assert!(settings
			.get_setting(GIT_USER_EMAIL_SETTING)
			.await
			.unwrap()
			.is_none());
	}
}
