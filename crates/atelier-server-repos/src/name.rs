// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Repository name derivation and validation.

use crate::error::{RepoError, Result};

/// True when a URL uses the SSH short form (`user@host:path`): an `@` appears
/// before the first `:`. HTTPS URLs put their `:` in the scheme, ahead of any
/// userinfo, so they never match.
pub fn is_ssh_short_form(url: &str) -> bool {
	match (url.find('@'), url.find(':')) {
		(Some(at), Some(colon)) => at < colon,
		_ => false,
	}
}

/// Extract a repository name from a git URL.
///
/// Handles HTTPS URLs (`https://github.com/user/repo.git` → `repo`), SSH
/// short forms (`git@github.com:user/repo.git` → `repo`), optional `.git`
/// suffixes and a single trailing slash. Returns an empty string when no
/// name can be extracted; for a bare HTTPS host the host itself is the
/// fallback.
pub fn parse_repo_name(url: &str) -> String {
	if url.is_empty() {
		return String::new();
	}

	let url = url.trim();
	let url = url.strip_suffix('/').unwrap_or(url);
	let url = url.strip_suffix(".git").unwrap_or(url);

	if is_ssh_short_form(url) {
		let Some((_, path)) = url.split_once(':') else {
			return String::new();
		};
		return match path.split('/').next_back() {
			Some(segment) if !segment.is_empty() => segment.to_string(),
			_ => String::new(),
		};
	}

	match url.split('/').next_back() {
		Some(segment) if !segment.is_empty() => segment.to_string(),
		_ => String::new(),
	}
}

/// Validate a repository name before it is used in a container path.
///
/// Names become directory components inside the container and are
/// interpolated into shell commands, so anything outside a conservative
/// character set is rejected.
pub fn validate_repo_name(name: &str) -> Result<()> {
	if name.is_empty() {
		return Err(RepoError::Validation(
			"repository name cannot be empty".into(),
		));
	}

	if name.len() > 100 {
		return Err(RepoError::Validation(
			"repository name must be 100 characters or fewer".into(),
		));
	}

	if name == "." || name == ".." || name.contains("..") {
		return Err(RepoError::Validation(
			"repository name cannot contain '..'".into(),
		));
	}

	if name.starts_with('.') || name.starts_with('-') {
		return Err(RepoError::Validation(
			"repository name cannot start with '.' or '-'".into(),
		));
	}

	if !name
		.chars()
		.all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.')
	{
		return Err(RepoError::Validation(
			"repository name can only contain letters, numbers, dash, underscore, dot".into(),
		));
	}

	Ok(())
}
