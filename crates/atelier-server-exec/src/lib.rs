// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Shell command execution inside the long-lived workspace IDE container.
//!
//! The container is an external collaborator: it is assumed to exist and be
//! running (its lifecycle is managed outside this server). This crate models
//! only the command seam the rest of the system needs:
//!
//! - [`ContainerExec`] - the trait repository lifecycle and bootstrap code
//!   program against
//! - [`DockerExec`] - production implementation via `docker exec`
//! - [`ExecOutput`] - combined stdout/stderr plus a success flag
//!
//! Callers must tolerate multi-second blocking; git clones over the network
//! run through here.

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, trace};

#[derive(Debug, thiserror::Error)]
pub enum ExecError {
	#[error("failed to invoke container runtime: {0}")]
	Spawn(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ExecError>;

/// Result of running a command inside the container.
///
/// `output` is stdout and stderr interleaved, the way git writes its
/// diagnostics; error classification downstream matches against it.
#[derive(Debug, Clone)]
pub struct ExecOutput {
	pub output: String,
	pub success: bool,
}

impl ExecOutput {
	pub fn ok(output: impl Into<String>) -> Self {
		Self {
			output: output.into(),
			success: true,
		}
	}

	pub fn failed(output: impl Into<String>) -> Self {
		Self {
			output: output.into(),
			success: false,
		}
	}
}

/// Executes shell commands inside the workspace container.
///
/// An `Err` means the runtime itself could not be reached (container engine
/// missing, daemon down); a command that ran and exited non-zero is `Ok` with
/// `success == false` so callers can inspect the output.
#[async_trait]
pub trait ContainerExec: Send + Sync {
	async fn exec(&self, command: &str) -> Result<ExecOutput>;
}

/// Container executor backed by the `docker` CLI.
///
/// Commands run as `docker exec <container> /bin/bash -c <command>`; the
/// command string is passed as a single argument, so no host-side shell
/// splitting happens.
pub struct DockerExec {
	container: String,
}

impl DockerExec {
	pub fn new(container: impl Into<String>) -> Self {
		Self {
			container: container.into(),
		}
	}

	pub fn container(&self) -> &str {
		&self.container
	}
}

#[async_trait]
impl ContainerExec for DockerExec {
	async fn exec(&self, command: &str) -> Result<ExecOutput> {
		trace!(container = %self.container, command = %command, "container exec");

		let result = Command::new("docker")
			.arg("exec")
			.arg(&self.container)
			.arg("/bin/bash")
			.arg("-c")
			.arg(command)
			.output()
			.await?;

		let mut output = String::from_utf8_lossy(&result.stdout).into_owned();
		output.push_str(&String::from_utf8_lossy(&result.stderr));

		debug!(
			container = %self.container,
			success = result.status.success(),
			output_len = output.len(),
			"container exec finished"
		);

		Ok(ExecOutput {
			output,
			success: result.status.success(),
		})
	}
}

pub mod testing {
	//! Scripted executor for tests: canned responses matched by substring,
	//! with a recorded call log.

	use std::sync::Mutex;

	use async_trait::async_trait;

	use crate::{ContainerExec, ExecOutput, Result};

	/// Test double that answers commands from a `(substring, response)` table
	/// and records every command it sees.
	#[derive(Default)]
	pub struct ScriptedExec {
		responses: Vec<(String, ExecOutput)>,
		calls: Mutex<Vec<String>>,
	}

	impl ScriptedExec {
		pub fn new() -> Self {
			Self::default()
		}

		/// Respond to any command containing `needle` with `response`.
		/// First match wins.
		pub fn respond(mut self, needle: impl Into<String>, response: ExecOutput) -> Self {
			self.responses.push((needle.into(), response));
			self
		}

		/// Commands executed so far, in order.
		pub fn calls(&self) -> Vec<String> {
			self.calls.lock().unwrap().clone()
		}
	}

	#[async_trait]
	impl ContainerExec for ScriptedExec {
		async fn exec(&self, command: &str) -> Result<ExecOutput> {
			self.calls.lock().unwrap().push(command.to_string());

			for (needle, response) in &self.responses {
				if command.contains(needle.as_str()) {
					return Ok(response.clone());
				}
			}

			// Unmatched commands succeed silently; tests only script what
			// they assert on.
			Ok(ExecOutput::ok(""))
		}
	}
}

#[cfg(test)]
mod tests {
	use super::testing::ScriptedExec;
	use super::*;

	#[test]
	fn exec_output_constructors() {
		assert!(ExecOutput::ok("done").success);
		assert!(!ExecOutput::failed("boom").success);
	}

	#[tokio::test]
	async fn scripted_exec_matches_first_needle() {
		let exec = ScriptedExec::new()
			.respond("git clone", ExecOutput::failed("fatal: not found"))
			.respond("git", ExecOutput::ok("ok"));

		let out = exec.exec("git clone https://x /tmp/x").await.unwrap();
		assert!(!out.success);

		let out = exec.exec("git pull").await.unwrap();
		assert!(out.success);
	}

	#[tokio::test]
	async fn scripted_exec_records_calls() {
		let exec = ScriptedExec::new();
		exec.exec("mkdir -p /home/coder/repos").await.unwrap();
		exec.exec("test -d /home/coder/repos/x").await.unwrap();

		let calls = exec.calls();
		assert_eq!(calls.len(), 2);
		assert!(calls[0].starts_with("mkdir"));
	}
}
