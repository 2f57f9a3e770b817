// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Server error type and its HTTP mapping.
//!
//! Every operation error is recovered at the handler boundary and rendered
//! as a JSON `{error, message}` body; nothing here panics a request. The
//! `message` is what the dashboard shows the user, so the underlying error
//! `Display` strings are written for humans.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use atelier_server_auth::AuthError;
use atelier_server_db::DbError;
use atelier_server_repos::RepoError;

/// JSON body for every error response.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
	pub error: String,
	pub message: String,
}

#[derive(Debug, thiserror::Error)]
pub enum ServerError {
	#[error(transparent)]
	Auth(#[from] AuthError),

	#[error(transparent)]
	Repo(#[from] RepoError),

	#[error(transparent)]
	Db(#[from] DbError),

	#[error("{0}")]
	Internal(String),
}

impl ServerError {
	/// Stable machine-readable code for the dashboard.
	fn code(&self) -> &'static str {
		match self {
			ServerError::Auth(e) => match e {
				AuthError::AlreadyInitialized => "already_initialized",
				AuthError::RateLimited => "rate_limited",
				AuthError::Validation(_) => "validation",
				AuthError::InvalidCredentials => "invalid_credentials",
				AuthError::MissingSecret | AuthError::Internal(_) | AuthError::Database(_) => {
					"internal"
				}
			},
			ServerError::Repo(e) => match e {
				RepoError::Validation(_) => "validation",
				RepoError::DuplicateName(_) => "duplicate_name",
				RepoError::TargetExists(_) => "target_exists",
				RepoError::NotFound(_) => "not_found",
				RepoError::AuthenticationFailed => "git_authentication_failed",
				RepoError::RemoteNotFound => "git_remote_not_found",
				RepoError::NetworkError => "git_network_error",
				RepoError::CloneFailed => "clone_failed",
				RepoError::MergeConflict => "merge_conflict",
				RepoError::DirtyWorkingTree => "dirty_working_tree",
				RepoError::PullFailed => "pull_failed",
				RepoError::RecloneFailed => "reclone_failed",
				RepoError::DeleteFailed => "delete_failed",
				RepoError::GitConfigFailed => "git_config_failed",
				RepoError::SshKeyMissing => "ssh_key_missing",
				RepoError::SshKeygenFailed => "ssh_keygen_failed",
				RepoError::Database(_) | RepoError::Exec(_) => "internal",
			},
			ServerError::Db(_) | ServerError::Internal(_) => "internal",
		}
	}

	fn status(&self) -> StatusCode {
		match self {
			ServerError::Auth(e) => match e {
				AuthError::Validation(_) => StatusCode::BAD_REQUEST,
				AuthError::InvalidCredentials => StatusCode::UNAUTHORIZED,
				AuthError::AlreadyInitialized => StatusCode::CONFLICT,
				AuthError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
				AuthError::MissingSecret | AuthError::Internal(_) | AuthError::Database(_) => {
					StatusCode::INTERNAL_SERVER_ERROR
				}
			},
			ServerError::Repo(e) => match e {
				RepoError::Validation(_) => StatusCode::BAD_REQUEST,
				RepoError::NotFound(_) | RepoError::SshKeyMissing => StatusCode::NOT_FOUND,
				RepoError::DuplicateName(_) | RepoError::TargetExists(_) => StatusCode::CONFLICT,
				RepoError::AuthenticationFailed
				| RepoError::RemoteNotFound
				| RepoError::NetworkError
				| RepoError::CloneFailed
				| RepoError::MergeConflict
				| RepoError::DirtyWorkingTree
				| RepoError::PullFailed
				| RepoError::RecloneFailed
				| RepoError::DeleteFailed
				| RepoError::GitConfigFailed
				| RepoError::SshKeygenFailed => StatusCode::UNPROCESSABLE_ENTITY,
				RepoError::Database(_) | RepoError::Exec(_) => StatusCode::INTERNAL_SERVER_ERROR,
			},
			ServerError::Db(_) | ServerError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
		}
	}

	/// The user-facing message. Internal failures are collapsed to a generic
	/// line so database/container details never reach the browser.
	fn message(&self) -> String {
		match self.code() {
			"internal" => {
				tracing::error!(error = %self, "internal server error");
				"something went wrong, please try again".to_string()
			}
			_ => self.to_string(),
		}
	}
}

impl IntoResponse for ServerError {
	fn into_response(self) -> Response {
		let body = ErrorBody {
			error: self.code().to_string(),
			message: self.message(),
		};
		(self.status(), Json(body)).into_response()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn rate_limit_maps_to_429() {
		assert_eq!(
			ServerError::Auth(AuthError::RateLimited).status(),
			StatusCode::TOO_MANY_REQUESTS
		);
	}

	#[test]
	fn duplicate_name_maps_to_conflict() {
		let err = ServerError::Repo(RepoError::DuplicateName("widgets".to_string()));
		assert_eq!(err.status(), StatusCode::CONFLICT);
		assert_eq!(err.code(), "duplicate_name");
		assert!(err.message().contains("widgets"));
	}

	#[test]
	fn internal_errors_hide_details() {
		let err = ServerError::Db(DbError::Internal("table users exploded".to_string()));
		assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
		assert!(!err.message().contains("exploded"));
	}

	#[test]
	fn invalid_credentials_maps_to_401() {
		let err = ServerError::Auth(AuthError::InvalidCredentials);
		assert_eq!(err.status(), StatusCode::UNAUTHORIZED);
		assert_eq!(err.message(), "invalid credentials");
	}
}
