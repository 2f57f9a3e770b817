// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Append-only activity feed persistence.
//!
//! Rows are never updated or deleted; the only reads are "most recent N" for
//! the dashboard feed.

use chrono::{DateTime, Utc};
use sqlx::{sqlite::SqlitePool, Row};
use uuid::Uuid;

use crate::error::DbError;
use crate::user::parse_utc;

/// An activity row as stored in SQLite.
#[derive(Debug, Clone)]
pub struct ActivityRecord {
	pub id: Uuid,
	pub activity_type: String,
	pub repository: Option<String>,
	pub description: String,
	pub author: String,
	pub created_at: DateTime<Utc>,
}

#[derive(Clone)]
pub struct ActivityRepository {
	pool: SqlitePool,
}

impl ActivityRepository {
	pub fn new(pool: SqlitePool) -> Self {
		Self { pool }
	}

	#[tracing::instrument(skip(self, activity), fields(activity_type = %activity.activity_type))]
	pub async fn append_activity(&self, activity: &ActivityRecord) -> Result<(), DbError> {
		sqlx::query(
			r#"
			INSERT INTO activities (id, activity_type, repository, description, author, created_at)
			VALUES (?, ?, ?, ?, ?, ?)
			"#,
		)
		.bind(activity.id.to_string())
		.bind(&activity.activity_type)
		.bind(&activity.repository)
		.bind(&activity.description)
		.bind(&activity.author)
		.bind(activity.created_at.to_rfc3339())
		.execute(&self.pool)
		.await?;

		Ok(())
	}

	#[tracing::instrument(skip(self))]
	pub async fn list_recent(&self, limit: u32) -> Result<Vec<ActivityRecord>, DbError> {
		let rows = sqlx::query(
			r#"
			SELECT id, activity_type, repository, description, author, created_at
			FROM activities
			ORDER BY created_at DESC
			LIMIT ?
			"#,
		)
		.bind(limit as i64)
		.fetch_all(&self.pool)
		.await?;

		rows.iter().map(row_to_activity).collect()
	}
}

fn row_to_activity(row: &sqlx::sqlite::SqliteRow) -> Result<ActivityRecord, DbError> {
	let id_str: String = row.get("id");
	let created_at_str: String = row.get("created_at");

	Ok(ActivityRecord {
		id: Uuid::parse_str(&id_str).map_err(|e| DbError::Internal(e.to_string()))?,
		activity_type: row.get("activity_type"),
		repository: row.get("repository"),
		description: row.get("description"),
		author: row.get("author"),
		created_at: parse_utc(&created_at_str)?,
	})
}
