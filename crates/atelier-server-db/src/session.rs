// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Session persistence.
//!
//! Session validity is decided by the signed cookie, not by this table; rows
//! here are an audit trail of issued sessions. Signout deletes the row, and a
//! periodic sweep removes rows whose expiry has passed.

use chrono::{DateTime, Utc};
use sqlx::{sqlite::SqlitePool, Row};
use uuid::Uuid;

use crate::error::DbError;
use crate::user::parse_utc;

/// A session row as stored in SQLite.
#[derive(Debug, Clone)]
pub struct SessionRecord {
	pub id: Uuid,
	pub user_id: Uuid,
	pub created_at: DateTime<Utc>,
	pub expires_at: DateTime<Utc>,
}

#[derive(Clone)]
pub struct SessionRepository {
	pool: SqlitePool,
}

impl SessionRepository {
	pub fn new(pool: SqlitePool) -> Self {
		Self { pool }
	}

	#[tracing::instrument(skip(self, session), fields(session_id = %session.id, user_id = %session.user_id))]
	pub async fn create_session(&self, session: &SessionRecord) -> Result<(), DbError> {
		sqlx::query(
			r#"
			INSERT INTO sessions (id, user_id, created_at, expires_at)
			VALUES (?, ?, ?, ?)
			"#,
		)
		.bind(session.id.to_string())
		.bind(session.user_id.to_string())
		.bind(session.created_at.to_rfc3339())
		.bind(session.expires_at.to_rfc3339())
		.execute(&self.pool)
		.await?;

		Ok(())
	}

	#[tracing::instrument(skip(self), fields(session_id = %id))]
	pub async fn get_session_by_id(&self, id: Uuid) -> Result<Option<SessionRecord>, DbError> {
		let row = sqlx::query(
			r#"
			SELECT id, user_id, created_at, expires_at
			FROM sessions
			WHERE id = ?
			"#,
		)
		.bind(id.to_string())
		.fetch_optional(&self.pool)
		.await?;

		row.map(|r| {
			let id_str: String = r.get("id");
			let user_id_str: String = r.get("user_id");
			let created_at_str: String = r.get("created_at");
			let expires_at_str: String = r.get("expires_at");
			Ok(SessionRecord {
				id: Uuid::parse_str(&id_str).map_err(|e| DbError::Internal(e.to_string()))?,
				user_id: Uuid::parse_str(&user_id_str)
					.map_err(|e| DbError::Internal(e.to_string()))?,
				created_at: parse_utc(&created_at_str)?,
				expires_at: parse_utc(&expires_at_str)?,
			})
		})
		.transpose()
	}

	/// Delete a session row. Missing rows are not an error; signout is
	/// idempotent.
	#[tracing::instrument(skip(self), fields(session_id = %id))]
	pub async fn delete_session(&self, id: Uuid) -> Result<(), DbError> {
		sqlx::query("DELETE FROM sessions WHERE id = ?")
			.bind(id.to_string())
			.execute(&self.pool)
			.await?;
		Ok(())
	}

	/// Remove rows whose expiry is in the past. Returns the number removed.
	#[tracing::instrument(skip(self))]
	pub async fn delete_expired(&self, now: DateTime<Utc>) -> Result<u64, DbError> {
		let result = sqlx::query("DELETE FROM sessions WHERE expires_at < ?")
			.bind(now.to_rfc3339())
			.execute(&self.pool)
			.await?;
		Ok(result.rows_affected())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::testing::create_session_test_pool;
	use chrono::Duration;

	fn make_session(expires_in: Duration) -> SessionRecord {
		SessionRecord {
			id: Uuid::new_v4(),
			user_id: Uuid::new_v4(),
			created_at: Utc::now(),
			expires_at: Utc::now() + expires_in,
		}
	}

	#[tokio::test]
	async fn create_get_delete_roundtrip() {
		let repo = SessionRepository::new(create_session_test_pool().await);
		let session = make_session(Duration::days(30));

		repo.create_session(&session).await.unwrap();
		let loaded = repo.get_session_by_id(session.id).await.unwrap().unwrap();
		assert_eq!(loaded.user_id, session.user_id);

		repo.delete_session(session.id).await.unwrap();
		assert!(repo.get_session_by_id(session.id).await.unwrap().is_none());
	}

	#[tokio::test]
	async fn delete_is_idempotent() {
		let repo = SessionRepository::new(create_session_test_pool().await);
		// Deleting a session that never existed must not error.
		repo.delete_session(Uuid::new_v4()).await.unwrap();
	}

	#[tokio::test]
	async fn delete_expired_removes_only_stale_rows() {
		let repo = SessionRepository::new(create_session_test_pool().await);
		let live = make_session(Duration::days(1));
		let stale = make_session(Duration::days(-1));
		repo.create_session(&live).await.unwrap();
		repo.create_session(&stale).await.unwrap();

		let removed = repo.delete_expired(Utc::now()).await.unwrap();
		assert_eq!(removed, 1);
		assert!(repo.get_session_by_id(live.id).await.unwrap().is_some());
		assert!(repo.get_session_by_id(stale.id).await.unwrap().is_none());
	}
}
