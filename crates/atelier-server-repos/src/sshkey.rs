// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! SSH key management inside the workspace container.
//!
//! Private repositories authenticate with a keypair that lives in the
//! container's `~/.ssh`, persisted across restarts by its volume mount. The
//! server ensures a key exists at startup and exposes the public half so the
//! user can register it with their git provider.

use tracing::{info, warn};

use atelier_server_db::SettingsRepository;
use atelier_server_exec::ContainerExec;

use crate::error::{RepoError, Result};

/// Settings key the public key is mirrored under.
pub const SSH_PUBLIC_KEY_SETTING: &str = "ssh_public_key";

/// Git hosts pre-seeded into `known_hosts` so first clones do not stall on
/// host key prompts.
const KNOWN_GIT_HOSTS: &[&str] = &["github.com", "gitlab.com", "bitbucket.org", "codeberg.org"];

/// Read the current public key, trying ed25519 first then RSA.
pub async fn public_key(exec: &dyn ContainerExec) -> Result<String> {
	let result = exec
		.exec("cat ~/.ssh/id_ed25519.pub 2>/dev/null || cat ~/.ssh/id_rsa.pub 2>/dev/null")
		.await?;
	let key = result.output.trim();
	if !result.success || key.is_empty() {
		return Err(RepoError::SshKeyMissing);
	}
	Ok(key.to_string())
}

/// Whether any SSH key exists in the container.
pub async fn has_ssh_key(exec: &dyn ContainerExec) -> bool {
	public_key(exec).await.is_ok()
}

/// Generate a fresh keypair tagged with `email`, returning the public key.
///
/// Prefers ed25519 and falls back to RSA-4096 where the container's
/// ssh-keygen does not support it. The public key is mirrored into settings;
/// failures there are logged and ignored since the key itself exists.
pub async fn generate_ssh_key(
	exec: &dyn ContainerExec,
	settings: &SettingsRepository,
	email: &str,
) -> Result<String> {
	let prepare = exec.exec("mkdir -p ~/.ssh && chmod 700 ~/.ssh").await?;
	if !prepare.success {
		return Err(RepoError::SshKeygenFailed);
	}

	let ed25519 = exec
		.exec(&format!(
			r#"ssh-keygen -t ed25519 -C "{email}" -f ~/.ssh/id_ed25519 -N "" -q"#
		))
		.await?;
	if !ed25519.success {
		let rsa = exec
			.exec(&format!(
				r#"ssh-keygen -t rsa -b 4096 -C "{email}" -f ~/.ssh/id_rsa -N "" -q"#
			))
			.await?;
		if !rsa.success {
			warn!(output = %rsa.output, "ssh-keygen failed for both key types");
			return Err(RepoError::SshKeygenFailed);
		}
	}

	let key = public_key(exec).await?;

	if let Err(e) = configure_known_hosts(exec).await {
		warn!(error = %e, "failed to configure SSH known hosts");
	}

	if let Err(e) = settings
		.set_setting(SSH_PUBLIC_KEY_SETTING, &key, "ssh_key")
		.await
	{
		warn!(error = %e, "failed to mirror SSH public key into settings");
	}

	Ok(key)
}

/// Ensure a key exists, generating one when absent. Called at startup; the
/// email comes from the persisted git identity when configured.
pub async fn ensure_ssh_key(
	exec: &dyn ContainerExec,
	settings: &SettingsRepository,
) -> Result<String> {
	if let Ok(key) = public_key(exec).await {
		info!("SSH key already exists");
		return Ok(key);
	}

	let email = settings
		.get_setting("git_user_email")
		.await
		.ok()
		.flatten()
		.map(|s| s.value)
		.unwrap_or_else(|| "user@atelier.local".to_string());

	info!(email = %email, "generating SSH key");
	generate_ssh_key(exec, settings, &email).await
}

/// Seed `known_hosts` for common git hosts, deduplicating afterwards.
/// Individual host failures are tolerated; offline hosts just stay unseeded.
async fn configure_known_hosts(exec: &dyn ContainerExec) -> Result<()> {
	for host in KNOWN_GIT_HOSTS {
		let _ = exec
			.exec(&format!(
				"ssh-keyscan -t rsa {host} >> ~/.ssh/known_hosts 2>/dev/null"
			))
			.await?;
	}

	exec.exec("sort -u ~/.ssh/known_hosts -o ~/.ssh/known_hosts 2>/dev/null")
		.await?;
	Ok(())
}
