// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Activity event types.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Author attributed to events not tied to a signed-in user.
pub const SYSTEM_AUTHOR: &str = "System";

/// An entry in the append-only activity feed.
///
/// `repository` is a name reference, not a foreign key; entries outlive the
/// repository they describe.
#[derive(Debug, Clone, Serialize)]
pub struct ActivityEntry {
	pub activity_type: String,
	pub repository: Option<String>,
	pub description: String,
	pub author: String,
	pub timestamp: DateTime<Utc>,
}

impl ActivityEntry {
	/// A system-attributed event with no repository reference.
	pub fn system(activity_type: impl Into<String>, description: impl Into<String>) -> Self {
		Self {
			activity_type: activity_type.into(),
			repository: None,
			description: description.into(),
			author: SYSTEM_AUTHOR.to_string(),
			timestamp: Utc::now(),
		}
	}

	/// A user-attributed event (signup, signin, signout).
	pub fn user(
		activity_type: impl Into<String>,
		author: impl Into<String>,
		description: impl Into<String>,
	) -> Self {
		Self {
			activity_type: activity_type.into(),
			repository: None,
			description: description.into(),
			author: author.into(),
			timestamp: Utc::now(),
		}
	}

	/// A repository lifecycle event, system-attributed.
	pub fn repo(
		activity_type: impl Into<String>,
		repository: impl Into<String>,
		description: impl Into<String>,
	) -> Self {
		Self {
			activity_type: activity_type.into(),
			repository: Some(repository.into()),
			description: description.into(),
			author: SYSTEM_AUTHOR.to_string(),
			timestamp: Utc::now(),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn system_entries_carry_no_repository() {
		let entry = ActivityEntry::system("auth_signout", "User signed out");
		assert_eq!(entry.author, SYSTEM_AUTHOR);
		assert!(entry.repository.is_none());
	}

	#[test]
	fn repo_entries_reference_by_name() {
		let entry = ActivityEntry::repo("repo_clone", "widgets", "Cloned repository widgets");
		assert_eq!(entry.repository.as_deref(), Some("widgets"));
		assert_eq!(entry.author, SYSTEM_AUTHOR);
	}

	#[test]
	fn user_entries_attribute_the_handle() {
		let entry = ActivityEntry::user("auth_signin", "admin", "User signed in");
		assert_eq!(entry.author, "admin");
	}
}
