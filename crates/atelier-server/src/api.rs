// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Application state and router assembly.

use std::sync::Arc;
use std::time::Duration;

use axum::routing::{get, post};
use axum::Router;
use sqlx::SqlitePool;
use tower_http::trace::TraceLayer;

use atelier_server_audit::{ActivityService, SqliteActivitySink};
use atelier_server_auth::{AuthGate, RateLimiter};
use atelier_server_config::ServerConfig;
use atelier_server_db::{
	ActivityRepository, SessionRepository, SettingsRepository, UserRepository,
	WorkspaceRepoRepository,
};
use atelier_server_exec::ContainerExec;
use atelier_server_repos::RepoLifecycle;

use crate::error::ServerError;
use crate::routes;

/// Queue capacity for the fire-and-forget activity pipeline.
const ACTIVITY_QUEUE_CAPACITY: usize = 1024;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
	pub gate: Arc<AuthGate>,
	pub lifecycle: Arc<RepoLifecycle>,
	pub activity_repo: ActivityRepository,
	pub session_repo: SessionRepository,
	pub settings_repo: SettingsRepository,
	pub exec: Arc<dyn ContainerExec>,
	pub cookie_name: String,
	pub pool: SqlitePool,
}

/// Creates the application state, wiring repositories, the activity
/// pipeline, the rate limiter (with its background sweep) and the auth gate.
///
/// The container executor is injected so tests can script it.
pub fn create_app_state(
	pool: SqlitePool,
	exec: Arc<dyn ContainerExec>,
	config: &ServerConfig,
) -> Result<AppState, ServerError> {
	let user_repo = UserRepository::new(pool.clone());
	let session_repo = SessionRepository::new(pool.clone());
	let repo_repo = WorkspaceRepoRepository::new(pool.clone());
	let activity_repo = ActivityRepository::new(pool.clone());
	let settings_repo = SettingsRepository::new(pool.clone());

	let activity = Arc::new(ActivityService::new(
		Arc::new(SqliteActivitySink::new(activity_repo.clone())),
		ACTIVITY_QUEUE_CAPACITY,
	));

	let limiter = Arc::new(RateLimiter::new(
		config.auth.rate_limit_attempts as usize,
		Duration::from_secs(config.auth.rate_limit_window_secs),
	));
	Arc::clone(&limiter).spawn_sweeper();

	let gate = Arc::new(AuthGate::new(
		user_repo,
		session_repo.clone(),
		activity.clone(),
		limiter,
		&config.auth,
	)?);

	let lifecycle = Arc::new(RepoLifecycle::new(
		exec.clone(),
		repo_repo,
		activity,
		config.workspace.repos_dir.clone(),
	));

	Ok(AppState {
		gate,
		lifecycle,
		activity_repo,
		session_repo,
		settings_repo,
		exec,
		cookie_name: config.auth.cookie_name.clone(),
		pool,
	})
}

/// Build the full router over the given state.
pub fn create_router(state: AppState) -> Router {
	Router::new()
		.route("/health", get(routes::health::health_check))
		.route("/_auth/signup", post(routes::auth::signup))
		.route("/_auth/signin", post(routes::auth::signin))
		.route("/_auth/signout", post(routes::auth::signout))
		.route("/repos", get(routes::repos::list_repos))
		.route("/repos/clone", post(routes::repos::clone_repo))
		.route("/repos/pull/{name}", post(routes::repos::pull_repo))
		.route("/repos/delete/{name}", post(routes::repos::delete_repo))
		.route("/activity", get(routes::activity::recent_activity))
		.route("/settings/ssh-key", get(routes::settings::ssh_key))
		.route("/settings/git-config", post(routes::settings::git_config))
		.layer(TraceLayer::new_for_http())
		.with_state(state)
}
