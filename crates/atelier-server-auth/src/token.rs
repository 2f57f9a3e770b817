// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! HMAC-signed session tokens.
//!
//! The cookie value is the authoritative proof of a session:
//!
//! ```text
//! v1.<user_id>.<session_id>.<expires_unix>.<hex(hmac_sha256(secret, payload))>
//! ```
//!
//! Validation checks the version tag, the expiry stamp and the signature; no
//! database access is involved, so the check runs on every protected request
//! without a round trip. The session row in the database is an audit trail,
//! not a validity source.
//!
//! Token values are never logged.

use chrono::{DateTime, TimeZone, Utc};
use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::types::{SessionId, UserId};

type HmacSha256 = Hmac<Sha256>;

const TOKEN_VERSION: &str = "v1";

/// Why a presented token was rejected. All variants map to "unauthenticated";
/// the distinction exists for logs and tests only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenError {
	Malformed,
	Expired,
	BadSignature,
}

/// The claims carried by a valid token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenClaims {
	pub user_id: UserId,
	pub session_id: SessionId,
	pub expires_at: DateTime<Utc>,
}

/// Mints and verifies session tokens with a fixed server-side secret.
#[derive(Clone)]
pub struct TokenSigner {
	key: Vec<u8>,
}

impl TokenSigner {
	pub fn new(secret: impl AsRef<[u8]>) -> Self {
		Self {
			key: secret.as_ref().to_vec(),
		}
	}

	/// Produce a signed token for the given session.
	pub fn mint(
		&self,
		user_id: UserId,
		session_id: SessionId,
		expires_at: DateTime<Utc>,
	) -> String {
		let payload = format!(
			"{TOKEN_VERSION}.{user_id}.{session_id}.{}",
			expires_at.timestamp()
		);
		let signature = self.sign(&payload);
		format!("{payload}.{signature}")
	}

	/// Verify a presented token against the clock `now`.
	pub fn verify(&self, raw: &str, now: DateTime<Utc>) -> Result<TokenClaims, TokenError> {
		let mut parts = raw.split('.');
		let version = parts.next().ok_or(TokenError::Malformed)?;
		let user_id = parts.next().ok_or(TokenError::Malformed)?;
		let session_id = parts.next().ok_or(TokenError::Malformed)?;
		let expires = parts.next().ok_or(TokenError::Malformed)?;
		let signature = parts.next().ok_or(TokenError::Malformed)?;
		if parts.next().is_some() || version != TOKEN_VERSION {
			return Err(TokenError::Malformed);
		}

		let payload = format!("{version}.{user_id}.{session_id}.{expires}");
		let signature_bytes = hex::decode(signature).map_err(|_| TokenError::Malformed)?;

		let mut mac = HmacSha256::new_from_slice(&self.key).map_err(|_| TokenError::Malformed)?;
		mac.update(payload.as_bytes());
		// Constant-time comparison via the Mac trait.
		mac.verify_slice(&signature_bytes)
			.map_err(|_| TokenError::BadSignature)?;

		let expires_unix: i64 = expires.parse().map_err(|_| TokenError::Malformed)?;
		let expires_at = Utc
			.timestamp_opt(expires_unix, 0)
			.single()
			.ok_or(TokenError::Malformed)?;
		if expires_at <= now {
			return Err(TokenError::Expired);
		}

		let user_id = user_id
			.parse::<uuid::Uuid>()
			.map(UserId::new)
			.map_err(|_| TokenError::Malformed)?;
		let session_id = session_id
			.parse::<uuid::Uuid>()
			.map(SessionId::new)
			.map_err(|_| TokenError::Malformed)?;

		Ok(TokenClaims {
			user_id,
			session_id,
			expires_at,
		})
	}

	fn sign(&self, payload: &str) -> String {
		let mut mac =
			HmacSha256::new_from_slice(&self.key).expect("HMAC accepts keys of any length");
		mac.update(payload.as_bytes());
		hex::encode(mac.finalize().into_bytes())
	}
}
