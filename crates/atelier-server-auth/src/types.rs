// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Core type definitions for authentication.
//!
//! - **ID newtypes**: [`UserId`] and [`SessionId`], transparent UUID wrappers
//!   that keep the two identifier spaces from mixing
//! - [`User`] - the single admin account, minus the credential hash
//! - [`CurrentUser`] - the authenticated caller attached to a request

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use atelier_server_db::UserRecord;

macro_rules! define_id_type {
	($name:ident, $doc:expr) => {
		#[doc = $doc]
		#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
		#[serde(transparent)]
		pub struct $name(Uuid);

		impl $name {
			/// Create a new ID from a UUID.
			pub fn new(id: Uuid) -> Self {
				Self(id)
			}

			/// Generate a new random ID.
			pub fn generate() -> Self {
				Self(Uuid::new_v4())
			}

			/// Get the inner UUID value.
			pub fn into_inner(self) -> Uuid {
				self.0
			}
		}

		impl fmt::Display for $name {
			fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
				write!(f, "{}", self.0)
			}
		}

		impl From<Uuid> for $name {
			fn from(id: Uuid) -> Self {
				Self(id)
			}
		}

		impl From<$name> for Uuid {
			fn from(id: $name) -> Self {
				id.0
			}
		}
	};
}

define_id_type!(UserId, "Unique identifier for a user.");
define_id_type!(SessionId, "Unique identifier for a session.");

/// The admin account, as handed to request handlers.
///
/// The credential hash never leaves the database layer; this struct is the
/// public projection of a [`UserRecord`].
#[derive(Debug, Clone, Serialize)]
pub struct User {
	pub id: UserId,
	pub display_name: String,
	pub handle: String,
	pub email: String,
	pub is_admin: bool,
}

impl From<UserRecord> for User {
	fn from(record: UserRecord) -> Self {
		Self {
			id: UserId::new(record.id),
			display_name: record.display_name,
			handle: record.handle,
			email: record.email,
			is_admin: record.is_admin,
		}
	}
}

/// The authenticated caller, extracted from a valid session cookie.
#[derive(Debug, Clone)]
pub struct CurrentUser {
	pub user: User,
	pub session_id: SessionId,
}
