// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Sliding-window rate limiter for authentication attempts.
//!
//! In-memory and process-local: state resets on restart, which is acceptable
//! for a single-instance, single-user deployment. Keys are arbitrary strings;
//! the auth gate uses `"{client_addr}:{action}"` so signup and signin windows
//! are tracked independently.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

/// Sliding-window limiter: at most `limit` accepted attempts per key within
/// any trailing `window`.
///
/// A single mutex guards the whole map; every call does prune + check +
/// record under the lock. Work per call is O(window size), bounded by
/// `limit`, and call volume is a handful of auth attempts per minute.
pub struct RateLimiter {
	attempts: Mutex<HashMap<String, Vec<Instant>>>,
	limit: usize,
	window: Duration,
}

impl RateLimiter {
	pub fn new(limit: usize, window: Duration) -> Self {
		Self {
			attempts: Mutex::new(HashMap::new()),
			limit,
			window,
		}
	}

	/// Check whether an attempt is allowed for `key`, recording it if so.
	///
	/// A rejected attempt is NOT recorded; hammering the endpoint while
	/// blocked does not extend the block past the window.
	pub fn allow(&self, key: &str) -> bool {
		self.allow_at(key, Instant::now())
	}

	/// Clock-injected core of [`RateLimiter::allow`], used directly by tests.
	pub fn allow_at(&self, key: &str, now: Instant) -> bool {
		let mut attempts = self.attempts.lock().unwrap_or_else(|e| e.into_inner());
		let entry = attempts.entry(key.to_string()).or_default();

		entry.retain(|t| now.duration_since(*t) < self.window);

		if entry.len() >= self.limit {
			return false;
		}

		entry.push(now);
		true
	}

	/// Drop keys whose entire history has aged out of the window.
	fn sweep_at(&self, now: Instant) {
		let mut attempts = self.attempts.lock().unwrap_or_else(|e| e.into_inner());
		attempts.retain(|_, entries| {
			entries.retain(|t| now.duration_since(*t) < self.window);
			!entries.is_empty()
		});
	}

	/// Spawn the background sweep that bounds memory growth, running every
	/// five minutes for the lifetime of the process.
	pub fn spawn_sweeper(self: Arc<Self>) {
		let limiter = self;
		tokio::spawn(async move {
			let mut ticker = tokio::time::interval(Duration::from_secs(5 * 60));
			ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
			loop {
				ticker.tick().await;
				limiter.sweep_at(Instant::now());
			}
		});
	}

	#[cfg(test)]
	fn tracked_keys(&self) -> usize {
		self.attempts.lock().unwrap().len()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	const WINDOW: Duration = Duration::from_secs(60);

	#[test]
	fn allows_up_to_limit_within_window() {
		let limiter = RateLimiter::new(5, WINDOW);
		let start = Instant::now();

		for i in 0..5 {
			assert!(
				limiter.allow_at("1.2.3.4:signin", start + Duration::from_secs(i)),
				"attempt {i} should pass"
			);
		}
		assert!(!limiter.allow_at("1.2.3.4:signin", start + Duration::from_secs(5)));
	}

	#[test]
	fn rejection_does_not_consume_an_attempt() {
		let limiter = RateLimiter::new(2, WINDOW);
		let start = Instant::now();

		assert!(limiter.allow_at("k", start));
		assert!(limiter.allow_at("k", start));
		// Rejected attempts are not recorded, so once the two accepted ones
		// age out the key is clean again.
		for i in 0..10 {
			assert!(!limiter.allow_at("k", start + Duration::from_secs(i + 1)));
		}
		assert!(limiter.allow_at("k", start + WINDOW + Duration::from_secs(1)));
	}

	#[test]
	fn window_slides_from_oldest_attempt() {
		let limiter = RateLimiter::new(3, WINDOW);
		let start = Instant::now();

		assert!(limiter.allow_at("k", start));
		assert!(limiter.allow_at("k", start + Duration::from_secs(20)));
		assert!(limiter.allow_at("k", start + Duration::from_secs(40)));
		assert!(!limiter.allow_at("k", start + Duration::from_secs(59)));

		// The first attempt ages out at start+60; one slot frees up.
		assert!(limiter.allow_at("k", start + Duration::from_secs(61)));
		// But the window is still saturated by the three newest attempts.
		assert!(!limiter.allow_at("k", start + Duration::from_secs(62)));
	}

	#[test]
	fn keys_are_independent() {
		let limiter = RateLimiter::new(1, WINDOW);
		let now = Instant::now();

		assert!(limiter.allow_at("1.2.3.4:signin", now));
		assert!(limiter.allow_at("1.2.3.4:signup", now));
		assert!(limiter.allow_at("5.6.7.8:signin", now));
		assert!(!limiter.allow_at("1.2.3.4:signin", now));
	}

	#[test]
	fn sweep_drops_fully_aged_keys() {
		let limiter = RateLimiter::new(5, WINDOW);
		let start = Instant::now();

		limiter.allow_at("stale", start);
		limiter.allow_at("fresh", start + WINDOW);
		assert_eq!(limiter.tracked_keys(), 2);

		limiter.sweep_at(start + WINDOW + Duration::from_secs(1));
		assert_eq!(limiter.tracked_keys(), 1);
	}
}
