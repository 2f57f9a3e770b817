// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Settings HTTP handlers: SSH public key and git identity.

use axum::extract::State;
use axum::response::Response;
use axum::{Form, Json};
use serde::{Deserialize, Serialize};

use crate::api::AppState;
use crate::auth_middleware::RequireAuth;
use crate::error::ServerError;
use crate::routes::refresh;

#[derive(Debug, Serialize)]
pub struct SshKeyResponse {
	pub public_key: String,
}

#[derive(Debug, Deserialize)]
pub struct GitConfigForm {
	#[serde(default)]
	pub name: String,
	#[serde(default)]
	pub email: String,
}

/// GET /settings/ssh-key - the workspace public key, for registering with a
/// git provider.
pub async fn ssh_key(
	State(state): State<AppState>,
	RequireAuth(_user): RequireAuth,
) -> Result<Json<SshKeyResponse>, ServerError> {
	let public_key = atelier_server_repos::public_key(state.exec.as_ref()).await?;
	Ok(Json(SshKeyResponse { public_key }))
}

/// POST /settings/git-config - set the container's git identity.
pub async fn git_config(
	State(state): State<AppState>,
	RequireAuth(_user): RequireAuth,
	Form(form): Form<GitConfigForm>,
) -> Result<Response, ServerError> {
	atelier_server_repos::configure_git_user(
		state.exec.as_ref(),
		&state.settings_repo,
		&form.name,
		&form.email,
	)
	.await?;

	Ok(refresh())
}
