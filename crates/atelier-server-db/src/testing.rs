// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};

use crate::pool::run_migrations;

pub async fn create_test_pool() -> SqlitePool {
	// A single connection: every pooled connection would otherwise get its
	// own empty in-memory database.
	let pool = SqlitePoolOptions::new()
		.max_connections(1)
		.connect(":memory:")
		.await
		.unwrap();
	run_migrations(&pool).await.unwrap();
	pool
}

pub async fn create_user_test_pool() -> SqlitePool {
	create_test_pool().await
}

pub async fn create_session_test_pool() -> SqlitePool {
	create_test_pool().await
}

pub async fn create_repo_test_pool() -> SqlitePool {
	create_test_pool().await
}

pub async fn create_activity_test_pool() -> SqlitePool {
	create_test_pool().await
}

pub async fn create_settings_test_pool() -> SqlitePool {
	create_test_pool().await
}
