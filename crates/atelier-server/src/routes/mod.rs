// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

pub mod activity;
pub mod auth;
pub mod health;
pub mod repos;
pub mod settings;

use axum::http::{HeaderName, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};

/// Successful mutations tell the HTMX dashboard to reload the page.
pub(crate) fn refresh() -> Response {
	(
		StatusCode::NO_CONTENT,
		[(
			HeaderName::from_static("hx-refresh"),
			HeaderValue::from_static("true"),
		)],
	)
		.into_response()
}
