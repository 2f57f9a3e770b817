// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Per-request client connection info.
//!
//! Carries the pieces of the request that outlive routing: the client
//! address (rate-limit key), whether the request arrived over TLS (Secure
//! cookie attribute), and the dashboard's timezone header for downstream
//! formatting.

use axum::extract::{ConnectInfo, FromRequestParts};
use axum::http::request::Parts;
use axum::http::HeaderMap;
use std::convert::Infallible;
use std::net::SocketAddr;

/// Header set by TLS-terminating proxies.
const FORWARDED_PROTO: &str = "x-forwarded-proto";
/// Client address as reported by a reverse proxy, first hop wins.
const FORWARDED_FOR: &str = "x-forwarded-for";
/// IANA timezone name sent by the dashboard for timestamp formatting.
const USER_TIMEZONE: &str = "x-user-timezone";

#[derive(Debug, Clone)]
pub struct ClientInfo {
	/// Client IP, preferring the proxy-reported address over the socket peer.
	pub addr: String,
	/// True when the request arrived over TLS, directly or via a proxy.
	pub secure: bool,
	/// The dashboard's timezone header, if present.
	pub timezone: Option<String>,
}

impl ClientInfo {
	pub fn from_parts(headers: &HeaderMap, peer: Option<SocketAddr>) -> Self {
		let forwarded = headers
			.get(FORWARDED_FOR)
			.and_then(|v| v.to_str().ok())
			.and_then(|v| v.split(',').next())
			.map(|v| v.trim().to_string())
			.filter(|v| !v.is_empty());

		let addr = forwarded
			.or_else(|| peer.map(|p| p.ip().to_string()))
			.unwrap_or_else(|| "unknown".to_string());

		let secure = headers
			.get(FORWARDED_PROTO)
			.and_then(|v| v.to_str().ok())
			.map(|v| v.eq_ignore_ascii_case("https"))
			.unwrap_or(false);

		let timezone = headers
			.get(USER_TIMEZONE)
			.and_then(|v| v.to_str().ok())
			.map(|v| v.to_string())
			.filter(|v| !v.is_empty());

		Self {
			addr,
			secure,
			timezone,
		}
	}
}

impl<S> FromRequestParts<S> for ClientInfo
where
	S: Send + Sync,
{
	type Rejection = Infallible;

	async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
		let peer = parts
			.extensions
			.get::<ConnectInfo<SocketAddr>>()
			.map(|ConnectInfo(addr)| *addr);
		Ok(Self::from_parts(&parts.headers, peer))
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use axum::http::HeaderValue;

	fn peer() -> Option<SocketAddr> {
		Some("10.0.0.9:51234".parse().unwrap())
	}

	#[test]
	fn forwarded_for_wins_over_peer() {
		let mut headers = HeaderMap::new();
		headers.insert(FORWARDED_FOR, HeaderValue::from_static("203.0.113.7, 10.0.0.1"));

		let info = ClientInfo::from_parts(&headers, peer());
		assert_eq!(info.addr, "203.0.113.7");
	}

	#[test]
	fn falls_back_to_socket_peer() {
		let info = ClientInfo::from_parts(&HeaderMap::new(), peer());
		assert_eq!(info.addr, "10.0.0.9");
		assert!(!info.secure);
	}

	#[test]
	fn forwarded_proto_marks_secure() {
		let mut headers = HeaderMap::new();
		headers.insert(FORWARDED_PROTO, HeaderValue::from_static("https"));

		let info = ClientInfo::from_parts(&headers, peer());
		assert!(info.secure);
	}

	#[test]
	fn timezone_header_is_captured() {
		let mut headers = HeaderMap::new();
		headers.insert(USER_TIMEZONE, HeaderValue::from_static("Australia/Brisbane"));

		let info = ClientInfo::from_parts(&headers, peer());
		assert_eq!(info.timezone.as_deref(), Some("Australia/Brisbane"));
	}

	#[test]
	fn missing_everything_is_unknown() {
		let info = ClientInfo::from_parts(&HeaderMap::new(), None);
		assert_eq!(info.addr, "unknown");
		assert!(info.timezone.is_none());
	}
}
