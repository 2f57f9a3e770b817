// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Argon2 password hashing.
//!
//! Production uses Argon2id with the library's strong defaults; tests swap in
//! deliberately weak parameters so the suite stays fast. The test parameters
//! MUST NOT be used in production.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
#[cfg(test)]
use argon2::{Algorithm, Params, Version};

use crate::error::AuthError;

/// Returns an Argon2 instance configured appropriately for the build context.
#[inline]
fn argon2_instance() -> Argon2<'static> {
	#[cfg(test)]
	{
		// Fast, insecure parameters for tests ONLY.
		let params = Params::new(
			1024, // memory_kib: 1 MiB
			1,    // iterations
			1,    // parallelism
			None, // output length = default
		)
		.expect("valid Argon2 params for tests");
		Argon2::new(Algorithm::Argon2id, Version::V0x13, params)
	}

	#[cfg(not(test))]
	{
		// Production: Argon2id with memory=19456 KiB, iterations=2, parallelism=1
		Argon2::default()
	}
}

/// Hash a password with a fresh random salt, producing a PHC string.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
	let salt = SaltString::generate(&mut OsRng);
	argon2_instance()
		.hash_password(password.as_bytes(), &salt)
		.map(|hash| hash.to_string())
		.map_err(|e| AuthError::Internal(format!("password hashing failed: {e}")))
}

/// Verify a password against a stored PHC string.
///
/// Malformed stored hashes verify as `false` rather than erroring; a corrupt
/// row must read as "wrong password", never as a 500.
pub fn verify_password(stored_hash: &str, password: &str) -> bool {
	match PasswordHash::new(stored_hash) {
		Ok(parsed) => argon2_instance()
			.verify_password(password.as_bytes(), &parsed)
			.is_ok(),
		Err(_) => false,
	}
}
