// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use atelier_server_db::DbError;
use atelier_server_exec::ExecError;

/// Errors surfaced by repository lifecycle operations.
///
/// Every variant's `Display` is the user-facing message; handlers render it
/// verbatim. Git-derived variants come from best-effort output matching and
/// fall back to the generic clone/pull failures.
#[derive(Debug, thiserror::Error)]
pub enum RepoError {
	#[error("{0}")]
	Validation(String),

	#[error("a repository named '{0}' already exists")]
	DuplicateName(String),

	#[error("directory {0} already exists - please choose a different name")]
	TargetExists(String),

	#[error("repository '{0}' not found")]
	NotFound(String),

	#[error("authentication failed - check your SSH key is added to the git provider")]
	AuthenticationFailed,

	#[error("repository not found - check the URL is correct")]
	RemoteNotFound,

	#[error("network error - check your connection and try again")]
	NetworkError,

	#[error("failed to clone repository")]
	CloneFailed,

	#[error("merge conflicts detected - resolve manually in the IDE")]
	MergeConflict,

	#[error("uncommitted changes - commit or stash them first")]
	DirtyWorkingTree,

	#[error("failed to pull latest changes")]
	PullFailed,

	#[error("repository directory was missing and re-clone failed")]
	RecloneFailed,

	#[error("failed to delete repository files")]
	DeleteFailed,

	#[error("failed to configure git")]
	GitConfigFailed,

	#[error("no SSH key found")]
	SshKeyMissing,

	#[error("failed to generate SSH key")]
	SshKeygenFailed,

	#[error("Database error: {0}")]
	Database(#[from] DbError),

	#[error("workspace container unavailable: {0}")]
	Exec(#[from] ExecError),
}

pub type Result<T> = std::result::Result<T, RepoError>;
