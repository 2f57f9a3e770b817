// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Git failure classification from combined command output.
//!
//! git reports failures as prose on stderr; these tables map known phrases to
//! error kinds so users get an actionable message instead of a wall of git
//! output. This is a best-effort heuristic: the wording is not a stable
//! interface and new git versions may drift, at which point failures fall
//! back to the generic clone/pull error rather than misclassifying.

/// Failure kinds recognizable from git output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GitFailure {
	AuthenticationFailed,
	RemoteNotFound,
	NetworkError,
	MergeConflict,
	DirtyWorkingTree,
}

/// Phrases seen in failed `git clone` output. First match wins, so the more
/// specific credential phrases sit above the broad "not found" ones.
const CLONE_PATTERNS: &[(&str, GitFailure)] = &[
	("Permission denied", GitFailure::AuthenticationFailed),
	("Could not read from remote", GitFailure::AuthenticationFailed),
	("Authentication failed", GitFailure::AuthenticationFailed),
	("Could not resolve", GitFailure::NetworkError),
	("unable to access", GitFailure::NetworkError),
	("does not exist", GitFailure::RemoteNotFound),
	("not found", GitFailure::RemoteNotFound),
];

/// Phrases seen in failed `git pull` output.
const PULL_PATTERNS: &[(&str, GitFailure)] = &[
	("Permission denied", GitFailure::AuthenticationFailed),
	("Could not read from remote", GitFailure::AuthenticationFailed),
	("merge conflict", GitFailure::MergeConflict),
	("Merge conflict", GitFailure::MergeConflict),
	("uncommitted changes", GitFailure::DirtyWorkingTree),
	("Your local changes", GitFailure::DirtyWorkingTree),
];

fn classify(output: &str, patterns: &[(&str, GitFailure)]) -> Option<GitFailure> {
	patterns
		.iter()
		.find(|(needle, _)| output.contains(needle))
		.map(|(_, kind)| *kind)
}

/// Classify failed clone output; `None` means no known phrase matched.
pub fn classify_clone_failure(output: &str) -> Option<GitFailure> {
	classify(output, CLONE_PATTERNS)
}

/// Classify failed pull output; `None` means no known phrase matched.
pub fn classify_pull_failure(output: &str) -> Option<GitFailure> {
	classify(output, PULL_PATTERNS)
}
