// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Cloned-repository persistence.
//!
//! Rows are only ever inserted after a clone has succeeded inside the
//! container, and deleted only after the working tree is gone; the lifecycle
//! layer owns that ordering.

use chrono::{DateTime, Utc};
use sqlx::{sqlite::SqlitePool, Row};
use uuid::Uuid;

use crate::error::DbError;
use crate::user::parse_utc;

/// A cloned repository row as stored in SQLite.
#[derive(Debug, Clone)]
pub struct WorkspaceRepoRecord {
	pub id: Uuid,
	pub name: String,
	pub url: String,
	pub local_path: String,
	pub description: Option<String>,
	pub is_private: bool,
	pub created_at: DateTime<Utc>,
	pub updated_at: DateTime<Utc>,
}

#[derive(Clone)]
pub struct WorkspaceRepoRepository {
	pool: SqlitePool,
}

impl WorkspaceRepoRepository {
	pub fn new(pool: SqlitePool) -> Self {
		Self { pool }
	}

	#[tracing::instrument(skip(self, repo), fields(repo_id = %repo.id, name = %repo.name))]
	pub async fn create_repo(&self, repo: &WorkspaceRepoRecord) -> Result<(), DbError> {
		sqlx::query(
			r#"
			INSERT INTO workspace_repos (id, name, url, local_path, description, is_private, created_at, updated_at)
			VALUES (?, ?, ?, ?, ?, ?, ?, ?)
			"#,
		)
		.bind(repo.id.to_string())
		.bind(&repo.name)
		.bind(&repo.url)
		.bind(&repo.local_path)
		.bind(&repo.description)
		.bind(repo.is_private as i64)
		.bind(repo.created_at.to_rfc3339())
		.bind(repo.updated_at.to_rfc3339())
		.execute(&self.pool)
		.await?;

		Ok(())
	}

	/// Exact-name lookup, used by pull and delete which receive the stored
	/// name back from the dashboard.
	#[tracing::instrument(skip(self), fields(name = %name))]
	pub async fn get_repo_by_name(
		&self,
		name: &str,
	) -> Result<Option<WorkspaceRepoRecord>, DbError> {
		let row = sqlx::query(
			r#"
			SELECT id, name, url, local_path, description, is_private, created_at, updated_at
			FROM workspace_repos
			WHERE name = ?
			"#,
		)
		.bind(name)
		.fetch_optional(&self.pool)
		.await?;

		row.map(|r| row_to_repo(&r)).transpose()
	}

	/// Case-insensitive name lookup, used by clone to reject duplicates
	/// before any container or filesystem work happens.
	#[tracing::instrument(skip(self), fields(name = %name))]
	pub async fn get_repo_by_name_ci(
		&self,
		name: &str,
	) -> Result<Option<WorkspaceRepoRecord>, DbError> {
		let row = sqlx::query(
			r#"
			SELECT id, name, url, local_path, description, is_private, created_at, updated_at
			FROM workspace_repos
			WHERE LOWER(name) = LOWER(?)
			"#,
		)
		.bind(name)
		.fetch_optional(&self.pool)
		.await?;

		row.map(|r| row_to_repo(&r)).transpose()
	}

	#[tracing::instrument(skip(self))]
	pub async fn list_repos(&self) -> Result<Vec<WorkspaceRepoRecord>, DbError> {
		let rows = sqlx::query(
			r#"
			SELECT id, name, url, local_path, description, is_private, created_at, updated_at
			FROM workspace_repos
			ORDER BY name ASC
			"#,
		)
		.fetch_all(&self.pool)
		.await?;

		rows.iter().map(row_to_repo).collect()
	}

	#[tracing::instrument(skip(self), fields(repo_id = %id))]
	pub async fn delete_repo(&self, id: Uuid) -> Result<(), DbError> {
		let result = sqlx::query("DELETE FROM workspace_repos WHERE id = ?")
			.bind(id.to_string())
			.execute(&self.pool)
			.await?;

		if result.rows_affected() == 0 {
			return Err(DbError::NotFound("Repository not found".to_string()));
		}

		Ok(())
	}
}

fn row_to_repo(row: &sqlx::sqlite::SqliteRow) -> Result<WorkspaceRepoRecord, DbError> {
	let id_str: String = row.get("id");
	let is_private: i64 = row.get("is_private");
	let created_at_str: String = row.get("created_at");
	let updated_at_str: String = row.get("updated_at");

	Ok(WorkspaceRepoRecord {
		id: Uuid::parse_str(&id_str).map_err(|e| DbError::Internal(e.to_string()))?,
		name: row.get("name"),
		url: row.get("url"),
		local_path: row.get("local_path"),
		description: row.get("description"),
		is_private: is_private != 0,
		created_at: parse_utc(&created_at_str)?,
		updated_at: parse_utc(&updated_at_str)?,
	})
}
