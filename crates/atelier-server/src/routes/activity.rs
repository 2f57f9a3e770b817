// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Activity feed HTTP handler.

use axum::extract::State;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::api::AppState;
use crate::auth_middleware::RequireAuth;
use crate::error::ServerError;

/// Entries shown in the dashboard feed.
const RECENT_ACTIVITY_LIMIT: u32 = 20;

#[derive(Debug, Serialize)]
pub struct ActivityResponse {
	pub activity_type: String,
	pub repository: Option<String>,
	pub description: String,
	pub author: String,
	pub timestamp: DateTime<Utc>,
}

/// GET /activity - the 20 most recent entries, newest first.
pub async fn recent_activity(
	State(state): State<AppState>,
	RequireAuth(_user): RequireAuth,
) -> Result<Json<Vec<ActivityResponse>>, ServerError> {
	let entries = state
		.activity_repo
		.list_recent(RECENT_ACTIVITY_LIMIT)
		.await?;

	Ok(Json(
		entries
			.into_iter()
			.map(|entry| ActivityResponse {
				activity_type: entry.activity_type,
				repository: entry.repository,
				description: entry.description,
				author: entry.author,
				timestamp: entry.created_at,
			})
			.collect(),
	))
}
