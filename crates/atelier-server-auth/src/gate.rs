// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! The authentication gate: signup, signin, signout and the per-request
//! access check.
//!
//! The system is single-user. Signup works exactly once, while the user table
//! is empty, and creates the admin account; afterwards it always fails with
//! [`AuthError::AlreadyInitialized`] no matter what fields are supplied.
//! Signin and signup are both rate limited per client address, with
//! independent windows per action.
//!
//! # Access check flow
//!
//! ```text
//! Request → count users ── 0 ──→ SetupRequired (render signup)
//!               │
//!               └─ cookie token → verify signature+expiry → load user
//!                        │                 │                   │
//!                        └─ missing ──→ SigninRequired         │
//!                                          └─ invalid ─────────┴─ gone → SigninRequired
//!                                                              └─ ok → Allowed
//! ```
//!
//! The check runs on every protected request and caches nothing.

use std::sync::Arc;

use chrono::{Duration, Utc};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use atelier_server_audit::{ActivityEntry, ActivityService};
use atelier_server_config::AuthConfig;
use atelier_server_db::{SessionRecord, SessionRepository, UserRecord, UserRepository};

use crate::error::{AuthError, Result};
use crate::password::{hash_password, verify_password};
use crate::ratelimit::RateLimiter;
use crate::token::TokenSigner;
use crate::types::{CurrentUser, SessionId, User, UserId};

/// Minimum password length accepted at signup.
pub const MIN_PASSWORD_CHARS: usize = 8;

/// Outcome of the per-request access check.
#[derive(Debug, Clone)]
pub enum AccessCheck {
	/// No user exists yet; the bootstrap signup form should be rendered.
	SetupRequired,
	/// A user exists but the request carries no valid session.
	SigninRequired,
	/// The request is authenticated.
	Allowed(CurrentUser),
}

/// Fields submitted to the one-time signup.
#[derive(Debug, Clone)]
pub struct SignupRequest {
	pub name: String,
	pub handle: String,
	pub email: String,
	pub password: String,
}

/// A freshly issued session: the cookie value plus its expiry.
#[derive(Debug, Clone)]
pub struct IssuedSession {
	pub user: User,
	pub token: String,
	pub expires_at: chrono::DateTime<Utc>,
}

pub struct AuthGate {
	users: UserRepository,
	sessions: SessionRepository,
	activity: Arc<ActivityService>,
	limiter: Arc<RateLimiter>,
	signer: TokenSigner,
	session_ttl: Duration,
}

impl AuthGate {
	/// Build the gate from resolved configuration.
	///
	/// Fails with [`AuthError::MissingSecret`] when no session secret is
	/// configured - without one, no token could ever be minted or verified,
	/// so the server refuses to come up half-working.
	pub fn new(
		users: UserRepository,
		sessions: SessionRepository,
		activity: Arc<ActivityService>,
		limiter: Arc<RateLimiter>,
		config: &AuthConfig,
	) -> Result<Self> {
		let secret = config
			.session_secret
			.as_deref()
			.filter(|s| !s.is_empty())
			.ok_or(AuthError::MissingSecret)?;

		Ok(Self {
			users,
			sessions,
			activity,
			limiter,
			signer: TokenSigner::new(secret),
			session_ttl: Duration::days(i64::from(config.session_ttl_days)),
		})
	}

	/// Create the single admin account and sign it in.
	#[instrument(skip(self, request), fields(client_addr = %client_addr))]
	pub async fn signup(
		&self,
		request: SignupRequest,
		client_addr: &str,
	) -> Result<IssuedSession> {
		// Hard single-user invariant, checked before anything else.
		if self.users.count_users().await? > 0 {
			return Err(AuthError::AlreadyInitialized);
		}

		if !self.limiter.allow(&limiter_key(client_addr, "signup")) {
			warn!("signup rate limited");
			return Err(AuthError::RateLimited);
		}

		let name = request.name.trim().to_string();
		let handle = request.handle.trim().to_lowercase();
		let email = request.email.trim().to_lowercase();
		let password = request.password;

		if name.is_empty() || handle.is_empty() || email.is_empty() || password.is_empty() {
			return Err(AuthError::Validation("all fields are required".to_string()));
		}
		if password.chars().count() < MIN_PASSWORD_CHARS {
			return Err(AuthError::Validation(format!(
				"password must be at least {MIN_PASSWORD_CHARS} characters long"
			)));
		}

		let now = Utc::now();
		let record = UserRecord {
			id: Uuid::new_v4(),
			display_name: name,
			handle: handle.clone(),
			email,
			password_hash: hash_password(&password)?,
			is_admin: true,
			created_at: now,
			updated_at: now,
		};
		self.users.create_user(&record).await?;

		info!(handle = %handle, "admin account created");
		self.activity.record(ActivityEntry::user(
			"auth_signup",
			&handle,
			"User account created",
		));

		self.issue_session(User::from(record)).await
	}

	/// Authenticate with handle-or-email plus password.
	#[instrument(skip(self, password), fields(client_addr = %client_addr))]
	pub async fn signin(
		&self,
		login: &str,
		password: &str,
		client_addr: &str,
	) -> Result<IssuedSession> {
		if !self.limiter.allow(&limiter_key(client_addr, "signin")) {
			warn!("signin rate limited");
			return Err(AuthError::RateLimited);
		}

		let login = login.trim().to_lowercase();
		if login.is_empty() || password.is_empty() {
			return Err(AuthError::Validation(
				"email/username and password are required".to_string(),
			));
		}

		// Unknown login and wrong password take the same exit so responses
		// cannot distinguish the two.
		let record = self
			.users
			.get_user_by_login(&login)
			.await?
			.ok_or(AuthError::InvalidCredentials)?;
		if !verify_password(&record.password_hash, password) {
			return Err(AuthError::InvalidCredentials);
		}

		let handle = record.handle.clone();
		info!(handle = %handle, "user signed in");
		self.activity
			.record(ActivityEntry::user("auth_signin", &handle, "User signed in"));

		self.issue_session(User::from(record)).await
	}

	/// End the session carried by `raw_token`, if any.
	///
	/// Idempotent: a missing or invalid token is not an error, it just means
	/// there is nothing to do. The session row is deleted so signed-out
	/// sessions leave no live audit-trail entry behind.
	#[instrument(skip_all)]
	pub async fn signout(&self, raw_token: Option<&str>) -> Result<()> {
		let Some(raw) = raw_token else {
			return Ok(());
		};
		let Ok(claims) = self.signer.verify(raw, Utc::now()) else {
			return Ok(());
		};

		self.sessions
			.delete_session(claims.session_id.into_inner())
			.await?;

		if let Some(record) = self.users.get_user_by_id(claims.user_id.into_inner()).await? {
			self.activity.record(ActivityEntry::user(
				"auth_signout",
				&record.handle,
				"User signed out",
			));
		}

		Ok(())
	}

	/// The access check run by every protected route. Never cached.
	#[instrument(skip_all)]
	pub async fn require_authenticated(&self, raw_token: Option<&str>) -> Result<AccessCheck> {
		// Bootstrap state: nobody can be signed in if nobody exists.
		if self.users.count_users().await? == 0 {
			return Ok(AccessCheck::SetupRequired);
		}

		let Some(raw) = raw_token else {
			return Ok(AccessCheck::SigninRequired);
		};
		let Ok(claims) = self.signer.verify(raw, Utc::now()) else {
			return Ok(AccessCheck::SigninRequired);
		};

		// The signature is ours, but the user may have vanished underneath
		// the token; treat that as unauthenticated rather than erroring.
		match self.users.get_user_by_id(claims.user_id.into_inner()).await? {
			Some(record) => Ok(AccessCheck::Allowed(CurrentUser {
				user: User::from(record),
				session_id: claims.session_id,
			})),
			None => Ok(AccessCheck::SigninRequired),
		}
	}

	async fn issue_session(&self, user: User) -> Result<IssuedSession> {
		let session_id = SessionId::generate();
		let now = Utc::now();
		let expires_at = now + self.session_ttl;

		self.sessions
			.create_session(&SessionRecord {
				id: session_id.into_inner(),
				user_id: user.id.into_inner(),
				created_at: now,
				expires_at,
			})
			.await?;

		let token = self.signer.mint(user.id, session_id, expires_at);

		Ok(IssuedSession {
			user,
			token,
			expires_at,
		})
	}
}

fn limiter_key(client_addr: &str, action: &str) -> String {
	format!("{client_addr}:{action}")
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::error::INVALID_CREDENTIALS_MESSAGE;
	use atelier_server_audit::SqliteActivitySink;
	use atelier_server_db::testing::create_test_pool;
	use atelier_server_db::ActivityRepository;
	use std::time::Duration as StdDuration;

	struct Harness {
		gate: AuthGate,
		activities: ActivityRepository,
		sessions: SessionRepository,
	}

	async fn harness() -> Harness {
		harness_with_limit(5).await
	}

	async fn harness_with_limit(limit: usize) -> Harness {
		let pool = create_test_pool().await;
		let activities = ActivityRepository::new(pool.clone());
		let activity = Arc::new(ActivityService::new(
			Arc::new(SqliteActivitySink::new(activities.clone())),
			64,
		));
		let limiter = Arc::new(RateLimiter::new(limit, StdDuration::from_secs(60)));
		let sessions = SessionRepository::new(pool.clone());

		let gate = AuthGate::new(
			UserRepository::new(pool.clone()),
			sessions.clone(),
			activity,
			limiter,
			&AuthConfig {
				session_secret: Some("unit-test-secret".to_string()),
				..AuthConfig::default()
			},
		)
		.unwrap();

		Harness {
			gate,
			activities,
			sessions,
		}
	}

	fn signup_request() -> SignupRequest {
		SignupRequest {
			name: "Admin".to_string(),
			handle: "Admin".to_string(),
			email: "Admin@Example.com".to_string(),
			password: "hunter2hunter2".to_string(),
		}
	}

	#[tokio::test]
	async fn missing_secret_refuses_construction() {
		let pool = create_test_pool().await;
		let activity = Arc::new(ActivityService::new(
			Arc::new(SqliteActivitySink::new(ActivityRepository::new(pool.clone()))),
			64,
		));
		let err = AuthGate::new(
			UserRepository::new(pool.clone()),
			SessionRepository::new(pool),
			activity,
			Arc::new(RateLimiter::new(5, StdDuration::from_secs(60))),
			&AuthConfig::default(),
		)
		.err()
		.unwrap();
		assert!(matches!(err, AuthError::MissingSecret));
	}

	#[tokio::test]
	async fn signup_bootstraps_exactly_once() {
		let h = harness().await;

		let issued = h.gate.signup(signup_request(), "1.2.3.4").await.unwrap();
		assert_eq!(issued.user.handle, "admin");
		assert_eq!(issued.user.email, "admin@example.com");
		assert!(issued.user.is_admin);

		// Second signup fails the same way regardless of the fields.
		let err = h
			.gate
			.signup(
				SignupRequest {
					handle: "other".to_string(),
					email: "other@example.com".to_string(),
					..signup_request()
				},
				"9.9.9.9",
			)
			.await
			.unwrap_err();
		assert!(matches!(err, AuthError::AlreadyInitialized));
	}

	#[tokio::test]
	async fn signup_validates_fields() {
		let h = harness().await;

		let err = h
			.gate
			.signup(
				SignupRequest {
					handle: "   ".to_string(),
					..signup_request()
				},
				"1.2.3.4",
			)
			.await
			.unwrap_err();
		assert!(matches!(err, AuthError::Validation(_)));

		let err = h
			.gate
			.signup(
				SignupRequest {
					password: "short".to_string(),
					..signup_request()
				},
				"1.2.3.4",
			)
			.await
			.unwrap_err();
		assert!(matches!(err, AuthError::Validation(_)));
	}

	#[tokio::test]
	async fn signin_failures_share_one_message() {
		let h = harness().await;
		h.gate.signup(signup_request(), "1.2.3.4").await.unwrap();

		let missing = h
			.gate
			.signin("nobody", "hunter2hunter2", "1.2.3.4")
			.await
			.unwrap_err();
		let wrong = h
			.gate
			.signin("admin", "wrong-password", "1.2.3.4")
			.await
			.unwrap_err();

		assert_eq!(missing.to_string(), wrong.to_string());
		assert_eq!(missing.to_string(), INVALID_CREDENTIALS_MESSAGE);
	}

	#[tokio::test]
	async fn signin_accepts_handle_or_email() {
		let h = harness().await;
		h.gate.signup(signup_request(), "1.2.3.4").await.unwrap();

		h.gate
			.signin("admin", "hunter2hunter2", "1.2.3.4")
			.await
			.unwrap();
		h.gate
			.signin("ADMIN@example.COM", "hunter2hunter2", "1.2.3.4")
			.await
			.unwrap();
	}

	#[tokio::test]
	async fn signin_is_rate_limited_per_address() {
		let h = harness_with_limit(2).await;
		h.gate.signup(signup_request(), "5.5.5.5").await.unwrap();

		for _ in 0..2 {
			let _ = h.gate.signin("admin", "bad", "1.2.3.4").await;
		}
		let err = h
			.gate
			.signin("admin", "hunter2hunter2", "1.2.3.4")
			.await
			.unwrap_err();
		assert!(matches!(err, AuthError::RateLimited));

		// A different address is unaffected.
		h.gate
			.signin("admin", "hunter2hunter2", "8.8.8.8")
			.await
			.unwrap();
	}

	#[tokio::test]
	async fn access_check_walks_the_three_states() {
		let h = harness().await;

		// Bootstrap: no users yet.
		assert!(matches!(
			h.gate.require_authenticated(None).await.unwrap(),
			AccessCheck::SetupRequired
		));

		let issued = h.gate.signup(signup_request(), "1.2.3.4").await.unwrap();

		// User exists, no token.
		assert!(matches!(
			h.gate.require_authenticated(None).await.unwrap(),
			AccessCheck::SigninRequired
		));

		// Garbage token.
		assert!(matches!(
			h.gate
				.require_authenticated(Some("v1.not.a.real.token"))
				.await
				.unwrap(),
			AccessCheck::SigninRequired
		));

		// Valid token.
		match h
			.gate
			.require_authenticated(Some(&issued.token))
			.await
			.unwrap()
		{
			AccessCheck::Allowed(current) => assert_eq!(current.user.handle, "admin"),
			other => panic!("expected Allowed, got {other:?}"),
		}
	}

	#[tokio::test]
	async fn access_check_rejects_token_for_vanished_user() {
		let h = harness().await;
		h.gate.signup(signup_request(), "1.2.3.4").await.unwrap();

		// A correctly signed token whose user id resolves to nothing.
		let foreign = TokenSigner::new("unit-test-secret").mint(
			UserId::generate(),
			SessionId::generate(),
			Utc::now() + Duration::days(1),
		);
		assert!(matches!(
			h.gate.require_authenticated(Some(&foreign)).await.unwrap(),
			AccessCheck::SigninRequired
		));
	}

	#[tokio::test]
	async fn signout_is_idempotent_and_deletes_the_session() {
		let h = harness().await;
		let issued = h.gate.signup(signup_request(), "1.2.3.4").await.unwrap();

		// No token: fine.
		h.gate.signout(None).await.unwrap();
		// Garbage token: fine.
		h.gate.signout(Some("garbage")).await.unwrap();

		let claims = TokenSigner::new("unit-test-secret")
			.verify(&issued.token, Utc::now())
			.unwrap();
		assert!(h
			.sessions
			.get_session_by_id(claims.session_id.into_inner())
			.await
			.unwrap()
			.is_some());

		h.gate.signout(Some(&issued.token)).await.unwrap();
		assert!(h
			.sessions
			.get_session_by_id(claims.session_id.into_inner())
			.await
			.unwrap()
			.is_none());

		// Again: still fine.
		h.gate.signout(Some(&issued.token)).await.unwrap();
	}

	#[tokio::test]
	async fn auth_actions_land_in_the_activity_feed() {
		let h = harness().await;
		let issued = h.gate.signup(signup_request(), "1.2.3.4").await.unwrap();
		h.gate
			.signin("admin", "hunter2hunter2", "1.2.3.4")
			.await
			.unwrap();
		h.gate.signout(Some(&issued.token)).await.unwrap();

		// The pipeline is asynchronous; give it a beat.
		tokio::time::sleep(StdDuration::from_millis(100)).await;

		let types: Vec<String> = h
			.activities
			.list_recent(10)
			.await
			.unwrap()
			.into_iter()
			.map(|a| a.activity_type)
			.collect();
		assert!(types.contains(&"auth_signup".to_string()));
		assert!(types.contains(&"auth_signin".to_string()));
		assert!(types.contains(&"auth_signout".to_string()));
	}
}
