// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Repository management HTTP handlers.
//!
//! All routes require authentication. Mutations answer with a refresh signal
//! on success; the dashboard re-fetches its lists.

use axum::extract::{Path, State};
use axum::response::Response;
use axum::{Form, Json};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::AppState;
use crate::auth_middleware::RequireAuth;
use crate::error::ServerError;
use crate::routes::refresh;

#[derive(Debug, Deserialize)]
pub struct CloneForm {
	#[serde(default)]
	pub url: String,
	#[serde(default)]
	pub name: String,
}

#[derive(Debug, Serialize)]
pub struct RepoResponse {
	pub id: Uuid,
	pub name: String,
	pub url: String,
	pub local_path: String,
	pub description: Option<String>,
	pub is_private: bool,
	/// Working-tree disk usage; null when the container could not report it.
	pub size_bytes: Option<i64>,
	pub created_at: DateTime<Utc>,
	pub updated_at: DateTime<Utc>,
}

/// GET /repos
pub async fn list_repos(
	State(state): State<AppState>,
	RequireAuth(_user): RequireAuth,
) -> Result<Json<Vec<RepoResponse>>, ServerError> {
	let repos = state.lifecycle.list_repos().await?;

	let mut out = Vec::with_capacity(repos.len());
	for repo in repos {
		let size_bytes = state.lifecycle.repo_size(&repo).await;
		out.push(RepoResponse {
			id: repo.id,
			name: repo.name,
			url: repo.url,
			local_path: repo.local_path,
			description: repo.description,
			is_private: repo.is_private,
			size_bytes,
			created_at: repo.created_at,
			updated_at: repo.updated_at,
		});
	}

	Ok(Json(out))
}

/// POST /repos/clone
pub async fn clone_repo(
	State(state): State<AppState>,
	RequireAuth(_user): RequireAuth,
	Form(form): Form<CloneForm>,
) -> Result<Response, ServerError> {
	state.lifecycle.clone_repo(&form.url, &form.name).await?;
	Ok(refresh())
}

/// POST /repos/pull/{name}
pub async fn pull_repo(
	State(state): State<AppState>,
	RequireAuth(_user): RequireAuth,
	Path(name): Path<String>,
) -> Result<Response, ServerError> {
	state.lifecycle.pull_repo(&name).await?;
	Ok(refresh())
}

/// POST /repos/delete/{name}
pub async fn delete_repo(
	State(state): State<AppState>,
	RequireAuth(_user): RequireAuth,
	Path(name): Path<String>,
) -> Result<Response, ServerError> {
	state.lifecycle.delete_repo(&name).await?;
	Ok(refresh())
}
