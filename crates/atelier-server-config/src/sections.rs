// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Configuration sections: resolved structs plus partial layers for merging.

use serde::Deserialize;

// =============================================================================
// HTTP
// =============================================================================

/// HTTP listener configuration (runtime, fully resolved).
#[derive(Debug, Clone)]
pub struct HttpConfig {
	pub host: String,
	pub port: u16,
}

impl Default for HttpConfig {
	fn default() -> Self {
		Self {
			host: "0.0.0.0".to_string(),
			port: 8000,
		}
	}
}

/// HTTP configuration layer (partial, for merging).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HttpConfigLayer {
	#[serde(default)]
	pub host: Option<String>,
	#[serde(default)]
	pub port: Option<u16>,
}

impl HttpConfigLayer {
	pub fn merge(&mut self, other: HttpConfigLayer) {
		if other.host.is_some() {
			self.host = other.host;
		}
		if other.port.is_some() {
			self.port = other.port;
		}
	}

	pub fn finalize(self) -> HttpConfig {
		let defaults = HttpConfig::default();
		HttpConfig {
			host: self.host.unwrap_or(defaults.host),
			port: self.port.unwrap_or(defaults.port),
		}
	}
}

// =============================================================================
// Database
// =============================================================================

/// Database configuration (runtime, fully resolved).
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
	pub url: String,
}

impl Default for DatabaseConfig {
	fn default() -> Self {
		Self {
			url: "sqlite:./atelier.db".to_string(),
		}
	}
}

/// Database configuration layer (partial, for merging).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DatabaseConfigLayer {
	#[serde(default)]
	pub url: Option<String>,
}

impl DatabaseConfigLayer {
	pub fn merge(&mut self, other: DatabaseConfigLayer) {
		if other.url.is_some() {
			self.url = other.url;
		}
	}

	pub fn finalize(self) -> DatabaseConfig {
		DatabaseConfig {
			url: self.url.unwrap_or_else(|| DatabaseConfig::default().url),
		}
	}
}

// =============================================================================
// Auth
// =============================================================================

/// Authentication configuration (runtime, fully resolved).
///
/// `session_secret` stays optional here; the auth gate refuses to construct
/// without it so the failure happens once at startup rather than per request.
#[derive(Debug, Clone)]
pub struct AuthConfig {
	pub session_secret: Option<String>,
	pub cookie_name: String,
	pub session_ttl_days: u32,
	pub rate_limit_attempts: u32,
	pub rate_limit_window_secs: u64,
}

impl Default for AuthConfig {
	fn default() -> Self {
		Self {
			session_secret: None,
			cookie_name: "atelier_session".to_string(),
			session_ttl_days: 30,
			rate_limit_attempts: 5,
			rate_limit_window_secs: 60,
		}
	}
}

/// Auth configuration layer (partial, for merging).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuthConfigLayer {
	#[serde(default)]
	pub session_secret: Option<String>,
	#[serde(default)]
	pub cookie_name: Option<String>,
	#[serde(default)]
	pub session_ttl_days: Option<u32>,
	#[serde(default)]
	pub rate_limit_attempts: Option<u32>,
	#[serde(default)]
	pub rate_limit_window_secs: Option<u64>,
}

impl AuthConfigLayer {
	pub fn merge(&mut self, other: AuthConfigLayer) {
		if other.session_secret.is_some() {
			self.session_secret = other.session_secret;
		}
		if other.cookie_name.is_some() {
			self.cookie_name = other.cookie_name;
		}
		if other.session_ttl_days.is_some() {
			self.session_ttl_days = other.session_ttl_days;
		}
		if other.rate_limit_attempts.is_some() {
			self.rate_limit_attempts = other.rate_limit_attempts;
		}
		if other.rate_limit_window_secs.is_some() {
			self.rate_limit_window_secs = other.rate_limit_window_secs;
		}
	}

	pub fn finalize(self) -> AuthConfig {
		let defaults = AuthConfig::default();
		AuthConfig {
			session_secret: self.session_secret,
			cookie_name: self.cookie_name.unwrap_or(defaults.cookie_name),
			session_ttl_days: self.session_ttl_days.unwrap_or(defaults.session_ttl_days),
			rate_limit_attempts: self
				.rate_limit_attempts
				.unwrap_or(defaults.rate_limit_attempts),
			rate_limit_window_secs: self
				.rate_limit_window_secs
				.unwrap_or(defaults.rate_limit_window_secs),
		}
	}
}

// =============================================================================
// Workspace
// =============================================================================

/// Workspace container configuration (runtime, fully resolved).
#[derive(Debug, Clone)]
pub struct WorkspaceConfig {
	/// Name of the long-lived IDE container commands are executed in.
	pub container: String,
	/// Base directory inside the container that repositories are cloned under.
	pub repos_dir: String,
}

impl Default for WorkspaceConfig {
	fn default() -> Self {
		Self {
			container: "atelier-ide".to_string(),
			repos_dir: "/home/coder/repos".to_string(),
		}
	}
}

/// Workspace configuration layer (partial, for merging).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WorkspaceConfigLayer {
	#[serde(default)]
	pub container: Option<String>,
	#[serde(default)]
	pub repos_dir: Option<String>,
}

impl WorkspaceConfigLayer {
	pub fn merge(&mut self, other: WorkspaceConfigLayer) {
		if other.container.is_some() {
			self.container = other.container;
		}
		if other.repos_dir.is_some() {
			self.repos_dir = other.repos_dir;
		}
	}

	pub fn finalize(self) -> WorkspaceConfig {
		let defaults = WorkspaceConfig::default();
		WorkspaceConfig {
			container: self.container.unwrap_or(defaults.container),
			repos_dir: self.repos_dir.unwrap_or(defaults.repos_dir),
		}
	}
}

// =============================================================================
// Logging
// =============================================================================

/// Logging configuration (runtime, fully resolved).
#[derive(Debug, Clone)]
pub struct LoggingConfig {
	pub level: String,
}

impl Default for LoggingConfig {
	fn default() -> Self {
		Self {
			level: "info".to_string(),
		}
	}
}

/// Logging configuration layer (partial, for merging).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoggingConfigLayer {
	#[serde(default)]
	pub level: Option<String>,
}

impl LoggingConfigLayer {
	pub fn merge(&mut self, other: LoggingConfigLayer) {
		if other.level.is_some() {
			self.level = other.level;
		}
	}

	pub fn finalize(self) -> LoggingConfig {
		LoggingConfig {
			level: self.level.unwrap_or_else(|| LoggingConfig::default().level),
		}
	}
}
