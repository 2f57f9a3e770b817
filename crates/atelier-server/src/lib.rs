// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Atelier personal cloud workspace server.
//!
//! This crate wires the auth gate, repository lifecycle and activity feed
//! into an axum HTTP API consumed by the external dashboard renderer.

pub mod api;
pub mod auth_middleware;
pub mod client_info;
pub mod cookie;
pub mod error;
pub mod routes;

pub use api::{create_app_state, create_router, AppState};
pub use client_info::ClientInfo;
pub use error::ServerError;
