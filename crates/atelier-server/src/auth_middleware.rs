// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Authentication extractor for protected routes.
//!
//! [`RequireAuth`] runs the gate's access check on every request that
//! declares it - nothing is cached between requests. Unauthenticated
//! requests are answered with a `401` whose `error` field tells the external
//! renderer which form to present inline:
//!
//! - `signup_required` - zero users exist, render the bootstrap signup form
//! - `signin_required` - render the signin form

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

use atelier_server_auth::{AccessCheck, CurrentUser};

use crate::api::AppState;
use crate::cookie::extract_session_cookie;
use crate::error::{ErrorBody, ServerError};

/// Extracts the authenticated user or rejects the request with the
/// appropriate render signal.
pub struct RequireAuth(pub CurrentUser);

impl FromRequestParts<AppState> for RequireAuth {
	type Rejection = Response;

	async fn from_request_parts(
		parts: &mut Parts,
		state: &AppState,
	) -> Result<Self, Self::Rejection> {
		let token = extract_session_cookie(&parts.headers, &state.cookie_name);

		match state.gate.require_authenticated(token.as_deref()).await {
			Ok(AccessCheck::Allowed(current)) => Ok(Self(current)),
			Ok(AccessCheck::SetupRequired) => Err(render_signal(
				"signup_required",
				"create the admin account to continue",
			)),
			Ok(AccessCheck::SigninRequired) => {
				Err(render_signal("signin_required", "sign in to continue"))
			}
			Err(e) => Err(ServerError::from(e).into_response()),
		}
	}
}

fn render_signal(error: &str, message: &str) -> Response {
	(
		StatusCode::UNAUTHORIZED,
		Json(ErrorBody {
			error: error.to_string(),
			message: message.to_string(),
		}),
	)
		.into_response()
}
