// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! User persistence.
//!
//! The system is single-user: at most one row ever exists in `users`, and the
//! auth gate enforces that invariant with [`UserRepository::count_users`]
//! before any insert. The repository itself stays a plain CRUD surface.

use chrono::{DateTime, Utc};
use sqlx::{sqlite::SqlitePool, Row};
use uuid::Uuid;

use crate::error::DbError;

/// A user row as stored in SQLite.
#[derive(Debug, Clone)]
pub struct UserRecord {
	pub id: Uuid,
	pub display_name: String,
	pub handle: String,
	pub email: String,
	pub password_hash: String,
	pub is_admin: bool,
	pub created_at: DateTime<Utc>,
	pub updated_at: DateTime<Utc>,
}

#[derive(Clone)]
pub struct UserRepository {
	pool: SqlitePool,
}

impl UserRepository {
	pub fn new(pool: SqlitePool) -> Self {
		Self { pool }
	}

	#[tracing::instrument(skip(self, user), fields(user_id = %user.id, handle = %user.handle))]
	pub async fn create_user(&self, user: &UserRecord) -> Result<(), DbError> {
		sqlx::query(
			r#"
			INSERT INTO users (id, display_name, handle, email, password_hash, is_admin, created_at, updated_at)
			VALUES (?, ?, ?, ?, ?, ?, ?, ?)
			"#,
		)
		.bind(user.id.to_string())
		.bind(&user.display_name)
		.bind(&user.handle)
		.bind(&user.email)
		.bind(&user.password_hash)
		.bind(user.is_admin as i64)
		.bind(user.created_at.to_rfc3339())
		.bind(user.updated_at.to_rfc3339())
		.execute(&self.pool)
		.await
		.map_err(|e| match e {
			sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
				DbError::Conflict("User already exists".to_string())
			}
			_ => DbError::Sqlx(e),
		})?;

		Ok(())
	}

	#[tracing::instrument(skip(self))]
	pub async fn count_users(&self) -> Result<i64, DbError> {
		let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users")
			.fetch_one(&self.pool)
			.await?;
		Ok(count)
	}

	#[tracing::instrument(skip(self), fields(user_id = %id))]
	pub async fn get_user_by_id(&self, id: Uuid) -> Result<Option<UserRecord>, DbError> {
		let row = sqlx::query(
			r#"
			SELECT id, display_name, handle, email, password_hash, is_admin, created_at, updated_at
			FROM users
			WHERE id = ?
			"#,
		)
		.bind(id.to_string())
		.fetch_optional(&self.pool)
		.await?;

		row.map(|r| row_to_user(&r)).transpose()
	}

	/// Look a user up by handle or email, both matched case-insensitively.
	/// Signin accepts either in a single field.
	#[tracing::instrument(skip(self, login))]
	pub async fn get_user_by_login(&self, login: &str) -> Result<Option<UserRecord>, DbError> {
		let row = sqlx::query(
			r#"
			SELECT id, display_name, handle, email, password_hash, is_admin, created_at, updated_at
			FROM users
			WHERE LOWER(handle) = LOWER(?) OR LOWER(email) = LOWER(?)
			"#,
		)
		.bind(login)
		.bind(login)
		.fetch_optional(&self.pool)
		.await?;

		row.map(|r| row_to_user(&r)).transpose()
	}
}

fn row_to_user(row: &sqlx::sqlite::SqliteRow) -> Result<UserRecord, DbError> {
	let id_str: String = row.get("id");
	let is_admin: i64 = row.get("is_admin");
	let created_at_str: String = row.get("created_at");
	let updated_at_str: String = row.get("updated_at");

	Ok(UserRecord {
		id: Uuid::parse_str(&id_str).map_err(|e| DbError::Internal(e.to_string()))?,
		display_name: row.get("display_name"),
		handle: row.get("handle"),
		email: row.get("email"),
		password_hash: row.get("password_hash"),
		is_admin: is_admin != 0,
		created_at: parse_utc(&created_at_str)?,
		updated_at: parse_utc(&updated_at_str)?,
	})
}

pub(crate) fn parse_utc(raw: &str) -> Result<DateTime<Utc>, DbError> {
	DateTime::parse_from_rfc3339(raw)
		.map(|d| d.with_timezone(&Utc))
		.map_err(|e| DbError::Internal(e.to_string()))
}
