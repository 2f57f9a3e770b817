// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! SQLite persistence for the Atelier server.
//!
//! Each entity gets a small repository struct over a shared [`sqlx::SqlitePool`]:
//! users, sessions, cloned repositories, the activity feed and settings.
//! Schema setup is hand-written DDL applied at startup via [`run_migrations`].

pub mod activity;
pub mod error;
pub mod pool;
pub mod repo;
pub mod session;
pub mod setting;
pub mod testing;
pub mod user;

pub use activity::{ActivityRecord, ActivityRepository};
pub use error::{DbError, Result};
pub use pool::{create_pool, run_migrations};
pub use repo::{WorkspaceRepoRecord, WorkspaceRepoRepository};
pub use session::{SessionRecord, SessionRepository};
pub use setting::{SettingRecord, SettingsRepository};
pub use user::{UserRecord, UserRepository};
