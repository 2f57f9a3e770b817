// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Append-only activity feed for the Atelier server.
//!
//! Producers build an [`ActivityEntry`] and hand it to [`ActivityService`];
//! a background task drains the queue into an [`ActivitySink`]. Recording is
//! best-effort by design: sink failures are logged, never propagated.

pub mod event;
pub mod pipeline;
pub mod sink;

pub use event::{ActivityEntry, SYSTEM_AUTHOR};
pub use pipeline::ActivityService;
pub use sink::{ActivitySink, ActivitySinkError, SqliteActivitySink};
