// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Atelier server binary.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use atelier_server::{create_app_state, create_router};
use atelier_server_exec::DockerExec;

/// Interval for sweeping expired session rows out of the audit trail.
const SESSION_SWEEP_INTERVAL: Duration = Duration::from_secs(60 * 60);

/// Atelier server - single-user cloud development workspace.
#[derive(Parser, Debug)]
#[command(name = "atelier-server", about = "Atelier workspace server", version)]
struct Args {
	/// Path to a config file (defaults to /etc/atelier/server.toml)
	#[arg(long)]
	config: Option<std::path::PathBuf>,

	#[command(subcommand)]
	command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
	/// Show version information
	Version,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
	let args = Args::parse();

	if let Some(Command::Version) = args.command {
		println!("atelier-server {}", env!("CARGO_PKG_VERSION"));
		return Ok(());
	}

	// Load .env file if present
	dotenvy::dotenv().ok();

	let config = match &args.config {
		Some(path) => atelier_server_config::load_config_with_file(path.clone())?,
		None => atelier_server_config::load_config()?,
	};

	tracing_subscriber::registry()
		.with(
			tracing_subscriber::EnvFilter::try_from_default_env()
				.unwrap_or_else(|_| config.logging.level.clone().into()),
		)
		.with(tracing_subscriber::fmt::layer())
		.init();

	tracing::info!(
		host = %config.http.host,
		port = config.http.port,
		database = %config.database.url,
		container = %config.workspace.container,
		"starting atelier-server"
	);

	let pool = atelier_server_db::create_pool(&config.database.url).await?;
	atelier_server_db::run_migrations(&pool).await?;

	let exec = Arc::new(DockerExec::new(config.workspace.container.clone()));
	let state = create_app_state(pool, exec.clone(), &config)?;

	// Garbage-collect expired session rows; cookie expiry already bounds
	// session validity, this just keeps the audit trail tidy.
	{
		let sessions = state.session_repo.clone();
		tokio::spawn(async move {
			let mut ticker = tokio::time::interval(SESSION_SWEEP_INTERVAL);
			ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
			loop {
				ticker.tick().await;
				match sessions.delete_expired(chrono::Utc::now()).await {
					Ok(0) => {}
					Ok(removed) => tracing::debug!(removed, "expired sessions swept"),
					Err(e) => tracing::warn!(error = %e, "session sweep failed"),
				}
			}
		});
	}

	// Make sure the workspace has an SSH key for private repositories.
	// Non-fatal: the container may still be coming up; clones of private
	// repos will fail with an actionable message until a key exists.
	{
		let exec = exec.clone();
		let settings = state.settings_repo.clone();
		tokio::spawn(async move {
			match atelier_server_repos::ensure_ssh_key(exec.as_ref(), &settings).await {
				Ok(_) => tracing::info!("workspace SSH key ready"),
				Err(e) => tracing::warn!(error = %e, "failed to ensure workspace SSH key"),
			}
		});
	}

	let addr = config.socket_addr();
	let listener = tokio::net::TcpListener::bind(&addr).await?;
	tracing::info!(addr = %addr, "listening");

	axum::serve(
		listener,
		create_router(state).into_make_service_with_connect_info::<SocketAddr>(),
	)
	.await?;

	Ok(())
}
