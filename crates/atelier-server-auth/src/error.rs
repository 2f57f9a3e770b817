// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use atelier_server_db::DbError;

/// The exact message returned for any credential failure.
///
/// A missing user and a wrong password produce this same string so responses
/// cannot be used to enumerate accounts.
pub const INVALID_CREDENTIALS_MESSAGE: &str = "invalid credentials";

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
	#[error("a user already exists")]
	AlreadyInitialized,

	#[error("too many login attempts, please wait a minute")]
	RateLimited,

	#[error("{0}")]
	Validation(String),

	// Must stay byte-identical to INVALID_CREDENTIALS_MESSAGE.
	#[error("invalid credentials")]
	InvalidCredentials,

	#[error("session secret is not configured")]
	MissingSecret,

	#[error("Database error: {0}")]
	Database(#[from] DbError),

	#[error("Internal: {0}")]
	Internal(String),
}

pub type Result<T> = std::result::Result<T, AuthError>;

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn invalid_credentials_message_is_stable() {
		assert_eq!(
			AuthError::InvalidCredentials.to_string(),
			INVALID_CREDENTIALS_MESSAGE
		);
	}
}
