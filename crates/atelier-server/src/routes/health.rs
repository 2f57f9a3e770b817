// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Health check HTTP handler.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;

use crate::api::AppState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HealthStatus {
	Healthy,
	Degraded,
	Unhealthy,
}

#[derive(Debug, Serialize)]
pub struct HealthComponents {
	pub database: HealthStatus,
	pub container: HealthStatus,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
	pub status: HealthStatus,
	pub timestamp: String,
	pub components: HealthComponents,
}

/// GET /health - unauthenticated liveness/readiness probe.
///
/// The database is load-bearing, so its failure makes the whole response
/// unhealthy; a missing container only degrades (auth and reads still work).
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
	let (database, container) = tokio::join!(check_database(&state), check_container(&state));

	let status = match (database, container) {
		(HealthStatus::Healthy, HealthStatus::Healthy) => HealthStatus::Healthy,
		(HealthStatus::Healthy, _) => HealthStatus::Degraded,
		_ => HealthStatus::Unhealthy,
	};

	let http_status = match status {
		HealthStatus::Healthy | HealthStatus::Degraded => StatusCode::OK,
		HealthStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
	};

	(
		http_status,
		Json(HealthResponse {
			status,
			timestamp: chrono::Utc::now().to_rfc3339(),
			components: HealthComponents {
				database,
				container,
			},
		}),
	)
}

async fn check_database(state: &AppState) -> HealthStatus {
	match sqlx::query_scalar::<_, i64>("SELECT 1")
		.fetch_one(&state.pool)
		.await
	{
		Ok(_) => HealthStatus::Healthy,
		Err(e) => {
			tracing::error!(error = %e, "health: database check failed");
			HealthStatus::Unhealthy
		}
	}
}

async fn check_container(state: &AppState) -> HealthStatus {
	match state.exec.exec("true").await {
		Ok(result) if result.success => HealthStatus::Healthy,
		Ok(_) => HealthStatus::Degraded,
		Err(e) => {
			tracing::warn!(error = %e, "health: container check failed");
			HealthStatus::Degraded
		}
	}
}
