// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Session cookie construction and extraction.

use axum::http::HeaderMap;
use chrono::{DateTime, Utc};
use http::header::COOKIE;

/// Build the Set-Cookie value for a freshly issued session.
///
/// `HttpOnly` keeps the token away from page scripts, `SameSite=Lax` matches
/// the form-post flows, and `Secure` is added whenever the request arrived
/// over TLS (directly or behind a terminating proxy).
pub fn session_cookie(
	name: &str,
	token: &str,
	expires_at: DateTime<Utc>,
	secure: bool,
) -> String {
	let max_age = (expires_at - Utc::now()).num_seconds().max(0);
	let mut cookie = format!("{name}={token}; Path=/; HttpOnly; SameSite=Lax; Max-Age={max_age}");
	if secure {
		cookie.push_str("; Secure");
	}
	cookie
}

/// Build the Set-Cookie value that deletes the session cookie.
pub fn clear_session_cookie(name: &str, secure: bool) -> String {
	let mut cookie = format!("{name}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0");
	if secure {
		cookie.push_str("; Secure");
	}
	cookie
}

/// Extract the session token from the Cookie header, if present.
pub fn extract_session_cookie(headers: &HeaderMap, cookie_name: &str) -> Option<String> {
	headers
		.get(COOKIE)?
		.to_str()
		.ok()?
		.split(';')
		.find_map(|cookie| {
			let cookie = cookie.trim();
			let (name, value) = cookie.split_once('=')?;

			if name == cookie_name {
				Some(value.to_string())
			} else {
				None
			}
		})
}
