// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Activity sinks: where drained entries end up.

use async_trait::async_trait;
use uuid::Uuid;

use atelier_server_db::{ActivityRecord, ActivityRepository};

use crate::event::ActivityEntry;

#[derive(Debug, thiserror::Error)]
pub enum ActivitySinkError {
	#[error("transient sink failure: {0}")]
	Transient(String),
}

/// Destination for activity entries, written by the pipeline's background
/// task. Failures are logged by the pipeline and never reach the producer.
#[async_trait]
pub trait ActivitySink: Send + Sync {
	fn name(&self) -> &str;
	async fn publish(&self, entry: &ActivityEntry) -> Result<(), ActivitySinkError>;
}

/// Sink writing entries to the `activities` table.
pub struct SqliteActivitySink {
	repository: ActivityRepository,
}

impl SqliteActivitySink {
	pub fn new(repository: ActivityRepository) -> Self {
		Self { repository }
	}
}

#[async_trait]
impl ActivitySink for SqliteActivitySink {
	fn name(&self) -> &str {
		"sqlite"
	}

	async fn publish(&self, entry: &ActivityEntry) -> Result<(), ActivitySinkError> {
		let record = ActivityRecord {
			id: Uuid::new_v4(),
			activity_type: entry.activity_type.clone(),
			repository: entry.repository.clone(),
			description: entry.description.clone(),
			author: entry.author.clone(),
			created_at: entry.timestamp,
		};

		self.repository
			.append_activity(&record)
			.await
			.map_err(|e| ActivitySinkError::Transient(e.to_string()))
	}
}
