// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Repository domain types.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use atelier_server_db::WorkspaceRepoRecord;

/// A cloned repository as exposed to handlers and the dashboard.
#[derive(Debug, Clone, Serialize)]
pub struct Repository {
	pub id: Uuid,
	pub name: String,
	pub url: String,
	pub local_path: String,
	pub description: Option<String>,
	/// Derived from the URL form at clone time: SSH short-form remotes are
	/// assumed private (they need the workspace SSH key), `https://` remotes
	/// public.
	pub is_private: bool,
	pub created_at: DateTime<Utc>,
	pub updated_at: DateTime<Utc>,
}

impl From<WorkspaceRepoRecord> for Repository {
	fn from(record: WorkspaceRepoRecord) -> Self {
		Self {
			id: record.id,
			name: record.name,
			url: record.url,
			local_path: record.local_path,
			description: record.description,
			is_private: record.is_private,
			created_at: record.created_at,
			updated_at: record.updated_at,
		}
	}
}

/// How a pull resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PullOutcome {
	/// The working tree existed and was updated in place.
	Pulled,
	/// The working tree had gone missing and was restored by a fresh clone.
	Recloned,
}
