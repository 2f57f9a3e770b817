// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Fire-and-forget activity recording.
//!
//! Producers hand entries to [`ActivityService::record`], which enqueues onto
//! a bounded channel and returns immediately; a background task drains the
//! queue into the sink. A slow or failing sink can never block or fail the
//! operation that produced the entry - the worst case is a dropped entry,
//! which is logged internally.

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::warn;

use crate::event::ActivityEntry;
use crate::sink::ActivitySink;

pub struct ActivityService {
	tx: mpsc::Sender<ActivityEntry>,
}

impl ActivityService {
	pub fn new(sink: Arc<dyn ActivitySink>, queue_capacity: usize) -> Self {
		let (tx, rx) = mpsc::channel(queue_capacity);

		tokio::spawn(Self::background_task(rx, sink));

		Self { tx }
	}

	async fn background_task(mut rx: mpsc::Receiver<ActivityEntry>, sink: Arc<dyn ActivitySink>) {
		while let Some(entry) = rx.recv().await {
			if let Err(e) = sink.publish(&entry).await {
				warn!(
					sink = sink.name(),
					activity_type = %entry.activity_type,
					error = %e,
					"activity sink publish failed"
				);
			}
		}
	}

	/// Enqueue an entry for recording.
	///
	/// Returns `true` if the entry was queued, `false` if it was dropped
	/// (queue full or worker gone). Callers ignore the return value on the
	/// hot path; it exists for tests and diagnostics.
	pub fn record(&self, entry: ActivityEntry) -> bool {
		let queued = self.tx.try_send(entry).is_ok();
		if !queued {
			warn!("activity queue full, entry dropped");
		}
		queued
	}

	/// Enqueue an entry and wait for queue admission (not for the write).
	/// Used at shutdown points where dropping would lose a terminal event.
	pub async fn record_blocking(&self, entry: ActivityEntry) -> bool {
		self.tx.send(entry).await.is_ok()
	}
}
