// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Waiting, as an injectable capability.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

/// Suspends the caller for a duration.
#[async_trait]
pub trait Sleeper: Send + Sync {
	async fn sleep(&self, duration: Duration);
}

#[async_trait]
impl<S> Sleeper for Arc<S>
where
	S: Sleeper + ?Sized,
{
	async fn sleep(&self, duration: Duration) {
		(**self).sleep(duration).await
	}
}

/// Real wall-clock waits on the tokio timer.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
	async fn sleep(&self, duration: Duration) {
		tokio::time::sleep(duration).await;
	}
}

/// Records every requested wait and returns immediately.
#[derive(Debug, Default)]
pub struct RecordingSleeper {
	recorded: Mutex<Vec<Duration>>,
}

impl RecordingSleeper {
	pub fn new() -> Self {
		Self::default()
	}

	/// All waits requested so far, in order.
	pub fn recorded(&self) -> Vec<Duration> {
		self.recorded
			.lock()
			.map(|guard| guard.clone())
			.unwrap_or_default()
	}
}

#[async_trait]
impl Sleeper for RecordingSleeper {
	async fn sleep(&self, duration: Duration) {
		if let Ok(mut guard) = self.recorded.lock() {
			guard.push(duration);
		}
	}
}

/// A randomised pause inserted between consecutive requests to stay under
/// secondary rate limits. A zero-width window at zero disables pacing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pacing {
	min: Duration,
	max: Duration,
}

impl Pacing {
	/// Bounds are reordered if given backwards.
	pub fn new(min: Duration, max: Duration) -> Self {
		if min <= max {
			Self { min, max }
		} else {
			Self { min: max, max: min }
		}
	}

	pub const fn disabled() -> Self {
		Self {
			min: Duration::ZERO,
			max: Duration::ZERO,
		}
	}

	pub fn is_disabled(&self) -> bool {
		self.max.is_zero()
	}

	pub fn min(&self) -> Duration {
		self.min
	}

	pub fn max(&self) -> Duration {
		self.max
	}

	/// Picks a duration in `[min, max]` from a unit sample in `[0, 1]`.
	pub fn at(&self, unit: f64) -> Duration {
		let span = self.max.saturating_sub(self.min);
		self.min + span.mul_f64(unit.clamp(0.0, 1.0))
	}

	/// Sleeps for a uniformly random duration inside the window.
	pub async fn pause(&self, sleeper: &dyn Sleeper) {
		if self.is_disabled() {
			return;
		}
		sleeper.sleep(self.at(fastrand::f64())).await;
	}
}

impl Default for Pacing {
	fn default() -> Self {
		Self::disabled()
	}
}
