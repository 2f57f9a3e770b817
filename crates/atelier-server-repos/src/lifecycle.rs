// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Clone, pull and delete orchestration.
//!
//! Each operation keeps three places consistent: the remote git state inside
//! the workspace container, the local working tree path, and the database
//! record. Orderings are chosen so partial failures leave recoverable state:
//!
//! - **clone**: container clone succeeds before the record is inserted, so a
//!   failed clone leaves no record
//! - **delete**: the working tree is removed before the record, so a crash
//!   between steps leaves at worst a record pointing at a missing directory,
//!   which pull heals by re-cloning
//! - **pull**: a missing working tree is recoverable, not an error; the
//!   stored URL is re-cloned into the stored path
//!
//! Operations serialize on one process-wide lock. Per-name locking would
//! allow more concurrency, but a single user cannot meaningfully race
//! operations on different repositories, and one lock removes the
//! pull-vs-delete interleaving hazard entirely.
//!
//! Activity recording is fire-and-forget; a clone that lands but fails to
//! log still succeeded.

use std::sync::Arc;

use chrono::Utc;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use atelier_server_audit::{ActivityEntry, ActivityService};
use atelier_server_db::{WorkspaceRepoRecord, WorkspaceRepoRepository};
use atelier_server_exec::ContainerExec;

use crate::classify::{classify_clone_failure, classify_pull_failure, GitFailure};
use crate::error::{RepoError, Result};
use crate::name::{is_ssh_short_form, parse_repo_name, validate_repo_name};
use crate::types::{PullOutcome, Repository};

pub struct RepoLifecycle {
	exec: Arc<dyn ContainerExec>,
	repos: WorkspaceRepoRepository,
	activity: Arc<ActivityService>,
	repos_dir: String,
	ops_lock: tokio::sync::Mutex<()>,
}

impl RepoLifecycle {
	pub fn new(
		exec: Arc<dyn ContainerExec>,
		repos: WorkspaceRepoRepository,
		activity: Arc<ActivityService>,
		repos_dir: impl Into<String>,
	) -> Self {
		Self {
			exec,
			repos,
			activity,
			repos_dir: repos_dir.into(),
			ops_lock: tokio::sync::Mutex::new(()),
		}
	}

	/// Clone `url` into the workspace under `name` (derived from the URL when
	/// blank) and record it.
	#[instrument(skip(self), fields(url = %url, name = %name))]
	pub async fn clone_repo(&self, url: &str, name: &str) -> Result<Repository> {
		let _guard = self.ops_lock.lock().await;

		let url = url.trim();
		validate_url(url)?;

		let name = if name.trim().is_empty() {
			parse_repo_name(url)
		} else {
			name.trim().to_string()
		};
		validate_repo_name(&name)?;

		// Database uniqueness first: cheap, and a duplicate must not touch
		// the container at all.
		if let Some(existing) = self.repos.get_repo_by_name_ci(&name).await? {
			return Err(RepoError::DuplicateName(existing.name));
		}

		self.exec
			.exec(&format!("mkdir -p {}", self.repos_dir))
			.await?;

		let target = self.target_path(&name);

		// The database said the name is free, but the directory can still
		// exist (e.g. orphaned by a delete that died between steps), so the
		// filesystem gets the final say.
		if self.dir_exists(&target).await? {
			return Err(RepoError::TargetExists(name));
		}

		let result = self
			.exec
			.exec(&format!("git clone {url} {target} 2>&1"))
			.await?;
		if !result.success {
			warn!(output = %result.output, "git clone failed");
			return Err(match classify_clone_failure(&result.output) {
				Some(GitFailure::AuthenticationFailed) => RepoError::AuthenticationFailed,
				Some(GitFailure::RemoteNotFound) => RepoError::RemoteNotFound,
				Some(GitFailure::NetworkError) => RepoError::NetworkError,
				_ => RepoError::CloneFailed,
			});
		}

		let now = Utc::now();
		let record = WorkspaceRepoRecord {
			id: Uuid::new_v4(),
			name: name.clone(),
			url: url.to_string(),
			local_path: target,
			description: None,
			is_private: is_ssh_short_form(url),
			created_at: now,
			updated_at: now,
		};
		self.repos.create_repo(&record).await?;

		info!(name = %name, "repository cloned");
		self.activity.record(ActivityEntry::repo(
			"repo_clone",
			&name,
			format!("Cloned repository {name}"),
		));

		Ok(Repository::from(record))
	}

	/// Update `name` from its remote. A missing working tree is healed by
	/// re-cloning from the stored URL rather than reported as an error.
	#[instrument(skip(self), fields(name = %name))]
	pub async fn pull_repo(&self, name: &str) -> Result<PullOutcome> {
		let _guard = self.ops_lock.lock().await;

		let record = self
			.repos
			.get_repo_by_name(name)
			.await?
			.ok_or_else(|| RepoError::NotFound(name.to_string()))?;

		if !self.dir_exists(&record.local_path).await? {
			// The container volume can be rebuilt independently of the
			// database; the record is treated as the source of truth.
			info!(name = %name, "working tree missing, re-cloning");
			self.exec
				.exec(&format!("mkdir -p {}", self.repos_dir))
				.await?;

			let result = self
				.exec
				.exec(&format!("git clone {} {} 2>&1", record.url, record.local_path))
				.await?;
			if !result.success {
				warn!(output = %result.output, "re-clone failed");
				return Err(RepoError::RecloneFailed);
			}

			self.activity.record(ActivityEntry::repo(
				"repo_pull",
				&record.name,
				format!("Re-cloned missing repository {name}"),
			));
			return Ok(PullOutcome::Recloned);
		}

		let result = self
			.exec
			.exec(&format!("cd {} && git pull 2>&1", record.local_path))
			.await?;
		if !result.success {
			warn!(output = %result.output, "git pull failed");
			return Err(match classify_pull_failure(&result.output) {
				Some(GitFailure::AuthenticationFailed) => RepoError::AuthenticationFailed,
				Some(GitFailure::MergeConflict) => RepoError::MergeConflict,
				Some(GitFailure::DirtyWorkingTree) => RepoError::DirtyWorkingTree,
				_ => RepoError::PullFailed,
			});
		}

		info!(name = %name, "repository pulled");
		self.activity.record(ActivityEntry::repo(
			"repo_pull",
			&record.name,
			format!("Synced repository {name}"),
		));

		Ok(PullOutcome::Pulled)
	}

	/// Remove `name`: working tree first, then the record.
	///
	/// A filesystem failure leaves the record intact so the delete can be
	/// retried; the reverse order would strand a directory with no record.
	#[instrument(skip(self), fields(name = %name))]
	pub async fn delete_repo(&self, name: &str) -> Result<()> {
		let _guard = self.ops_lock.lock().await;

		let record = self
			.repos
			.get_repo_by_name(name)
			.await?
			.ok_or_else(|| RepoError::NotFound(name.to_string()))?;

		let result = self
			.exec
			.exec(&format!("rm -rf {}", record.local_path))
			.await?;
		if !result.success {
			warn!(output = %result.output, "failed to remove working tree");
			return Err(RepoError::DeleteFailed);
		}

		self.repos.delete_repo(record.id).await?;

		info!(name = %name, "repository deleted");
		self.activity.record(ActivityEntry::repo(
			"repo_delete",
			&record.name,
			format!("Deleted repository {name}"),
		));

		Ok(())
	}

	/// All repositories, alphabetically.
	pub async fn list_repos(&self) -> Result<Vec<Repository>> {
		let records = self.repos.list_repos().await?;
		Ok(records.into_iter().map(Repository::from).collect())
	}

	/// Disk usage of a repository's working tree in bytes. Best-effort:
	/// `None` when the tree is missing or `du` output is unparseable.
	pub async fn repo_size(&self, repo: &Repository) -> Option<i64> {
		let result = self
			.exec
			.exec(&format!("du -sb {} | cut -f1", repo.local_path))
			.await
			.ok()?;
		if !result.success {
			return None;
		}
		result.output.trim().parse().ok()
	}

	fn target_path(&self, name: &str) -> String {
		format!("{}/{}", self.repos_dir.trim_end_matches('/'), name)
	}

	async fn dir_exists(&self, path: &str) -> Result<bool> {
		let probe = self
			.exec
			.exec(&format!("test -d {path} && echo exists"))
			.await?;
		Ok(probe.output.trim() == "exists")
	}
}

/// The URL is interpolated into a shell command line; reject anything that
/// could escape the argument rather than trying to quote it.
fn validate_url(url: &str) -> Result<()> {
	if url.is_empty() {
		return Err(RepoError::Validation(
			"repository URL is required".to_string(),
		));
	}
	if url
		.chars()
		.any(|c| c.is_whitespace() || matches!(c, '\'' | '"' | ';' | '&' | '|' | '`' | '$'))
	{
		return Err(RepoError::Validation(
			"repository URL contains invalid characters".to_string(),
		));
	}
	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;
	use atelier_server_audit::SqliteActivitySink;
	use atelier_server_db::testing::create_test_pool;
	use atelier_server_db::ActivityRepository;
	use atelier_server_exec::testing::ScriptedExec;
	use atelier_server_exec::ExecOutput;
	use std::time::Duration;

	struct Harness {
		lifecycle: RepoLifecycle,
		exec: Arc<ScriptedExec>,
		repos: WorkspaceRepoRepository,
		activities: ActivityRepository,
	}

	async fn harness(exec: ScriptedExec) -> Harness {
		let pool = create_test_pool().await;
		let activities = ActivityRepository::new(pool.clone());
		let activity = Arc::new(ActivityService::new(
			Arc::new(SqliteActivitySink::new(activities.clone())),
			64,
		));
		let exec = Arc::new(exec);
		let repos = WorkspaceRepoRepository::new(pool.clone());

		Harness {
			lifecycle: RepoLifecycle::new(
				exec.clone(),
				repos.clone(),
				activity,
				"/home/coder/repos",
			),
			exec,
			repos,
			activities,
		}
	}

	async fn drain_activity() {
		tokio::time::sleep(Duration::from_millis(100)).await;
	}

	async fn activity_types(h: &Harness) -> Vec<String> {
		h.activities
			.list_recent(20)
			.await
			.unwrap()
			.into_iter()
			.map(|a| a.activity_type)
			.collect()
	}

	#[tokio::test]
	async fn clone_derives_name_and_records_repository() {
		let h = harness(ScriptedExec::new()).await;

		let repo = h
			.lifecycle
			.clone_repo("https://github.com/acme/widgets.git", "")
			.await
			.unwrap();

		assert_eq!(repo.name, "widgets");
		assert_eq!(repo.local_path, "/home/coder/repos/widgets");
		assert!(!repo.is_private);

		let stored = h.repos.get_repo_by_name("widgets").await.unwrap().unwrap();
		assert_eq!(stored.url, "https://github.com/acme/widgets.git");

		let calls = h.exec.calls();
		assert!(calls.iter().any(|c| c.starts_with("mkdir -p")));
		assert!(calls.iter().any(|c| c.starts_with("test -d")));
		assert!(calls
			.iter()
			.any(|c| c.contains("git clone https://github.com/acme/widgets.git")));

		drain_activity().await;
		assert!(activity_types(&h).await.contains(&"repo_clone".to_string()));
	}

	#[tokio::test]
	async fn clone_ssh_url_is_private() {
		let h = harness(ScriptedExec::new()).await;
		let repo = h
			.lifecycle
			.clone_repo("git@github.com:acme/secrets.git", "")
			.await
			.unwrap();
		assert_eq!(repo.name, "secrets");
		assert!(repo.is_private);
	}

	#[tokio::test]
	async fn clone_rejects_blank_url_and_unparseable_name() {
		let h = harness(ScriptedExec::new()).await;

		let err = h.lifecycle.clone_repo("", "").await.unwrap_err();
		assert!(matches!(err, RepoError::Validation(_)));

		let err = h.lifecycle.clone_repo("https://", "").await.unwrap_err();
		assert!(matches!(err, RepoError::Validation(_)));
	}

	#[tokio::test]
	async fn duplicate_name_touches_neither_container_nor_database() {
		let h = harness(ScriptedExec::new()).await;
		h.lifecycle
			.clone_repo("https://github.com/acme/Widgets.git", "Widgets")
			.await
			.unwrap();
		let calls_before = h.exec.calls().len();

		// Case-insensitive collision, different casing.
		let err = h
			.lifecycle
			.clone_repo("https://github.com/acme/widgets.git", "widgets")
			.await
			.unwrap_err();
		match err {
			RepoError::DuplicateName(existing) => assert_eq!(existing, "Widgets"),
			other => panic!("expected DuplicateName, got {other:?}"),
		}

		assert_eq!(h.exec.calls().len(), calls_before, "no container exec");
		assert_eq!(h.repos.list_repos().await.unwrap().len(), 1, "no new row");
	}

	#[tokio::test]
	async fn orphaned_directory_fails_clone_with_target_exists() {
		let exec = ScriptedExec::new().respond("test -d", ExecOutput::ok("exists"));
		let h = harness(exec).await;

		let err = h
			.lifecycle
			.clone_repo("https://github.com/acme/widgets.git", "")
			.await
			.unwrap_err();
		assert!(matches!(err, RepoError::TargetExists(name) if name == "widgets"));
		assert!(h.repos.get_repo_by_name("widgets").await.unwrap().is_none());
	}

	#[tokio::test]
	async fn clone_failures_classify_from_output() {
		let cases: Vec<(&str, fn(&RepoError) -> bool)> = vec![
			("git@github.com: Permission denied (publickey).", |e| {
				matches!(e, RepoError::AuthenticationFailed)
			}),
			("ERROR: Repository not found.", |e| {
				matches!(e, RepoError::RemoteNotFound)
			}),
			("ssh: Could not resolve hostname github.com", |e| {
				matches!(e, RepoError::NetworkError)
			}),
			("fatal: early EOF", |e| matches!(e, RepoError::CloneFailed)),
		];

		for (output, matches_expected) in cases {
			let exec =
				ScriptedExec::new().respond("git clone", ExecOutput::failed(output.to_string()));
			let h = harness(exec).await;

			let err = h
				.lifecycle
				.clone_repo("https://github.com/acme/widgets.git", "")
				.await
				.unwrap_err();
			assert!(matches_expected(&err), "output {output:?} gave {err:?}");

			// Failed clones never insert a record.
			assert!(h.repos.get_repo_by_name("widgets").await.unwrap().is_none());
		}
	}

	#[tokio::test]
	async fn pull_unknown_repository_is_not_found() {
		let h = harness(ScriptedExec::new()).await;
		let err = h.lifecycle.pull_repo("ghost").await.unwrap_err();
		assert!(matches!(err, RepoError::NotFound(name) if name == "ghost"));
	}

	#[tokio::test]
	async fn pull_updates_existing_working_tree() {
		let exec = ScriptedExec::new()
			.respond("test -d", ExecOutput::ok("exists"))
			.respond("git pull", ExecOutput::ok("Already up to date."));
		let h = harness(exec).await;
		seed_repo(&h, "widgets").await;

		let outcome = h.lifecycle.pull_repo("widgets").await.unwrap();
		assert_eq!(outcome, PullOutcome::Pulled);
		assert!(h
			.exec
			.calls()
			.iter()
			.any(|c| c.contains("cd /home/coder/repos/widgets && git pull")));

		drain_activity().await;
		let recent = h.activities.list_recent(20).await.unwrap();
		assert!(recent
			.iter()
			.any(|a| a.activity_type == "repo_pull" && a.description.contains("Synced repository")));
	}

	#[tokio::test]
	async fn pull_missing_working_tree_heals_by_recloning() {
		let h = harness(ScriptedExec::new()).await;
		h.lifecycle
			.clone_repo("https://github.com/acme/widgets.git", "")
			.await
			.unwrap();

		// Default scripted responses: "test -d" answers empty, so the tree
		// reads as missing and pull re-clones.
		let outcome = h.lifecycle.pull_repo("widgets").await.unwrap();
		assert_eq!(outcome, PullOutcome::Recloned);

		drain_activity().await;
		let recent = h.activities.list_recent(20).await.unwrap();
		assert!(recent
			.iter()
			.any(|a| a.activity_type == "repo_pull"
				&& a.description.contains("Re-cloned missing repository")));
	}

	#[tokio::test]
	async fn pull_failures_classify_from_output() {
		let cases: Vec<(&str, fn(&RepoError) -> bool)> = vec![
			("CONFLICT (content): Merge conflict in src/lib.rs", |e| {
				matches!(e, RepoError::MergeConflict)
			}),
			("error: Your local changes would be overwritten", |e| {
				matches!(e, RepoError::DirtyWorkingTree)
			}),
			("git@github.com: Permission denied (publickey).", |e| {
				matches!(e, RepoError::AuthenticationFailed)
			}),
			("fatal: refusing to merge unrelated histories", |e| {
				matches!(e, RepoError::PullFailed)
			}),
		];

		for (output, matches_expected) in cases {
			let exec = ScriptedExec::new()
				.respond("test -d", ExecOutput::ok("exists"))
				.respond("git pull", ExecOutput::failed(output.to_string()));
			let h = harness(exec).await;
			seed_repo(&h, "widgets").await;

			let err = h.lifecycle.pull_repo("widgets").await.unwrap_err();
			assert!(matches_expected(&err), "output {output:?} gave {err:?}");
		}
	}

	#[tokio::test]
	async fn delete_failure_preserves_the_record() {
		let exec = ScriptedExec::new().respond("rm -rf", ExecOutput::failed("rm: cannot remove"));
		let h = harness(exec).await;
		h.lifecycle
			.clone_repo("https://github.com/acme/widgets.git", "")
			.await
			.unwrap();

		let err = h.lifecycle.delete_repo("widgets").await.unwrap_err();
		assert!(matches!(err, RepoError::DeleteFailed));

		// The record survives so the delete can be retried.
		assert!(h.repos.get_repo_by_name("widgets").await.unwrap().is_some());
	}

	#[tokio::test]
	async fn delete_removes_tree_then_record() {
		let h = harness(ScriptedExec::new()).await;
		h.lifecycle
			.clone_repo("https://github.com/acme/widgets.git", "")
			.await
			.unwrap();

		h.lifecycle.delete_repo("widgets").await.unwrap();
		assert!(h.repos.get_repo_by_name("widgets").await.unwrap().is_none());
		assert!(h
			.exec
			.calls()
			.iter()
			.any(|c| c.contains("rm -rf /home/coder/repos/widgets")));

		drain_activity().await;
		assert!(activity_types(&h).await.contains(&"repo_delete".to_string()));
	}

	#[tokio::test]
	async fn clone_delete_clone_cycle() {
		let h = harness(ScriptedExec::new()).await;

		let repo = h
			.lifecycle
			.clone_repo("https://github.com/acme/widgets.git", "")
			.await
			.unwrap();
		assert_eq!(repo.name, "widgets");
		assert!(!repo.is_private);

		let err = h
			.lifecycle
			.clone_repo("https://github.com/acme/widgets.git", "")
			.await
			.unwrap_err();
		assert!(matches!(err, RepoError::DuplicateName(_)));

		h.lifecycle.delete_repo("widgets").await.unwrap();

		h.lifecycle
			.clone_repo("https://github.com/acme/widgets.git", "")
			.await
			.unwrap();
	}

	#[tokio::test]
	async fn repo_size_parses_du_output() {
		let exec = ScriptedExec::new().respond("du -sb", ExecOutput::ok("48128\t/home/coder/repos/widgets\n"));
		let h = harness(exec).await;
		let repo = h
			.lifecycle
			.clone_repo("https://github.com/acme/widgets.git", "")
			.await
			.unwrap();

		// "du -sb | cut -f1" yields just the byte count.
		let exec = ScriptedExec::new().respond("du -sb", ExecOutput::ok("48128\n"));
		let h2 = harness(exec).await;
		assert_eq!(h2.lifecycle.repo_size(&repo).await, Some(48128));

		let exec = ScriptedExec::new().respond("du -sb", ExecOutput::failed("du: cannot access"));
		let h3 = harness(exec).await;
		assert_eq!(h3.lifecycle.repo_size(&repo).await, None);
	}

	async fn seed_repo(h: &Harness, name: &str) {
		let now = Utc::now();
		h.repos
			.create_repo(&WorkspaceRepoRecord {
				id: Uuid::new_v4(),
				name: name.to_string(),
				url: format!("https://github.com/acme/{name}.git"),
				local_path: format!("/home/coder/repos/{name}"),
				description: None,
				is_private: false,
				created_at: now,
				updated_at: now,
			})
			.await
			.unwrap();
	}
}
