// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Authentication HTTP handlers.
//!
//! - `POST /_auth/signup` - create the single admin account (bootstrap only)
//! - `POST /_auth/signin` - authenticate, rate limited per client address
//! - `POST /_auth/signout` - clear the session cookie (idempotent)
//!
//! Successful signup/signin set the session cookie and signal a page
//! refresh; errors render as JSON for the external form renderer.

use axum::extract::State;
use axum::http::header::SET_COOKIE;
use axum::response::{IntoResponse, Response};
use axum::Form;
use serde::Deserialize;
use tracing::warn;

use atelier_server_auth::{IssuedSession, SignupRequest};

use crate::api::AppState;
use crate::client_info::ClientInfo;
use crate::cookie::{clear_session_cookie, extract_session_cookie, session_cookie};
use crate::error::ServerError;
use crate::routes::refresh;

#[derive(Debug, Deserialize)]
pub struct SignupForm {
	#[serde(default)]
	pub name: String,
	#[serde(default)]
	pub handle: String,
	#[serde(default)]
	pub email: String,
	#[serde(default)]
	pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct SigninForm {
	#[serde(default)]
	pub handle: String,
	#[serde(default)]
	pub password: String,
}

/// POST /_auth/signup
pub async fn signup(
	State(state): State<AppState>,
	client: ClientInfo,
	Form(form): Form<SignupForm>,
) -> Result<Response, ServerError> {
	let issued = state
		.gate
		.signup(
			SignupRequest {
				name: form.name,
				handle: form.handle,
				email: form.email,
				password: form.password,
			},
			&client.addr,
		)
		.await?;

	Ok(signed_in_response(&state, issued, client.secure))
}

/// POST /_auth/signin
pub async fn signin(
	State(state): State<AppState>,
	client: ClientInfo,
	Form(form): Form<SigninForm>,
) -> Result<Response, ServerError> {
	let issued = state
		.gate
		.signin(&form.handle, &form.password, &client.addr)
		.await?;

	Ok(signed_in_response(&state, issued, client.secure))
}

/// POST /_auth/signout
///
/// The cookie is cleared unconditionally; gate-side cleanup (session row
/// deletion, activity entry) is best-effort and never blocks the signout.
pub async fn signout(
	State(state): State<AppState>,
	client: ClientInfo,
	headers: axum::http::HeaderMap,
) -> Response {
	let token = extract_session_cookie(&headers, &state.cookie_name);
	if let Err(e) = state.gate.signout(token.as_deref()).await {
		warn!(error = %e, "signout cleanup failed");
	}

	with_cookie(refresh(), clear_session_cookie(&state.cookie_name, client.secure))
}

fn signed_in_response(state: &AppState, issued: IssuedSession, secure: bool) -> Response {
	let cookie = session_cookie(
		&state.cookie_name,
		&issued.token,
		issued.expires_at,
		secure,
	);
	with_cookie(refresh(), cookie)
}

fn with_cookie(mut response: Response, cookie: String) -> Response {
	match cookie.parse() {
		Ok(value) => {
			response.headers_mut().insert(SET_COOKIE, value);
			response
		}
		Err(_) => ServerError::Internal("failed to encode session cookie".to_string())
			.into_response(),
	}
}
