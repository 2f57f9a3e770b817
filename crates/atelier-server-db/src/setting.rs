// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Key/value settings persistence (git identity, SSH public key, preferences).

use chrono::{DateTime, Utc};
use sqlx::{sqlite::SqlitePool, Row};

use crate::error::DbError;
use crate::user::parse_utc;

/// A setting row as stored in SQLite.
#[derive(Debug, Clone)]
pub struct SettingRecord {
	pub key: String,
	pub value: String,
	pub setting_type: String,
	pub updated_at: DateTime<Utc>,
}

#[derive(Clone)]
pub struct SettingsRepository {
	pool: SqlitePool,
}

impl SettingsRepository {
	pub fn new(pool: SqlitePool) -> Self {
		Self { pool }
	}

	#[tracing::instrument(skip(self), fields(key = %key))]
	pub async fn get_setting(&self, key: &str) -> Result<Option<SettingRecord>, DbError> {
		let row = sqlx::query(
			r#"
			SELECT key, value, setting_type, updated_at
			FROM settings
			WHERE key = ?
			"#,
		)
		.bind(key)
		.fetch_optional(&self.pool)
		.await?;

		row.map(|r| {
			let updated_at_str: String = r.get("updated_at");
			Ok(SettingRecord {
				key: r.get("key"),
				value: r.get("value"),
				setting_type: r.get("setting_type"),
				updated_at: parse_utc(&updated_at_str)?,
			})
		})
		.transpose()
	}

	/// Insert or overwrite a setting; one row per key.
	#[tracing::instrument(skip(self, value), fields(key = %key, setting_type = %setting_type))]
	pub async fn set_setting(
		&self,
		key: &str,
		value: &str,
		setting_type: &str,
	) -> Result<(), DbError> {
		sqlx::query(
			r#"
			INSERT INTO settings (key, value, setting_type, updated_at)
			VALUES (?, ?, ?, ?)
			ON CONFLICT(key) DO UPDATE SET value = excluded.value,
				setting_type = excluded.setting_type,
				updated_at = excluded.updated_at
			"#,
		)
		.bind(key)
		.bind(value)
		.bind(setting_type)
		.bind(Utc::now().to_rfc3339())
		.execute(&self.pool)
		.await?;

		Ok(())
	}
}
