// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Rate-limit aware retry with exponential backoff.
//!
//! Only throttling responses are retried: any 429, and a 403 whose message
//! names a secondary rate limit. Everything else, success or failure, goes
//! straight back to the caller. When attempts run out the last response is
//! returned as-is so ordinary status handling applies to it.

use std::time::Duration;

use reqwest::StatusCode;
use tracing::{instrument, warn};

use crate::sleep::{Sleeper, TokioSleeper};
use crate::transport::{HttpRequest, HttpResponse, HttpTransport, TransportError};

/// Substring GitHub puts in the message of a 403 abuse throttle.
pub const SECONDARY_RATE_LIMIT_MARKER: &str = "secondary rate limit";

const BODY_PREVIEW_CHARS: usize = 200;

#[derive(Debug, Clone)]
pub struct RetryConfig {
	/// Total sends, including the first.
	pub max_attempts: u32,
	pub base_delay: Duration,
	pub max_delay: Duration,
	pub backoff_factor: f64,
	/// Upper bound of the uniform jitter added on top of the capped backoff.
	pub max_jitter: Duration,
	/// Statuses retried unconditionally.
	pub retryable_statuses: Vec<StatusCode>,
	/// Case-insensitive markers that make a 403 retryable.
	pub forbidden_markers: Vec<String>,
}

impl Default for RetryConfig {
	fn default() -> Self {
		Self {
			max_attempts: 8,
			base_delay: Duration::from_secs(1),
			max_delay: Duration::from_secs(60),
			backoff_factor: 2.0,
			max_jitter: Duration::from_millis(1500),
			retryable_statuses: vec![StatusCode::TOO_MANY_REQUESTS],
			forbidden_markers: vec![SECONDARY_RATE_LIMIT_MARKER.to_string()],
		}
	}
}

impl RetryConfig {
	/// Fallback delay after the zero-based `attempt`:
	/// `min(max_delay, base_delay * backoff_factor^attempt) + max_jitter * unit`.
	pub fn backoff_delay(&self, attempt: u32, jitter_unit: f64) -> Duration {
		let exponent = i32::try_from(attempt).unwrap_or(i32::MAX);
		let exponential = self.base_delay.as_secs_f64() * self.backoff_factor.powi(exponent);
		let capped = if exponential.is_finite() {
			exponential.min(self.max_delay.as_secs_f64())
		} else {
			self.max_delay.as_secs_f64()
		};
		let jitter = self.max_jitter.mul_f64(jitter_unit.clamp(0.0, 1.0));
		Duration::from_secs_f64(capped.max(0.0)) + jitter
	}

	/// Whether `response` is a throttle worth waiting out.
	pub fn is_transient(&self, response: &HttpResponse) -> bool {
		if self
			.retryable_statuses
			.iter()
			.any(|s| s.as_u16() == response.status)
		{
			return true;
		}
		response.status == StatusCode::FORBIDDEN.as_u16()
			&& self
				.forbidden_markers
				.iter()
				.any(|marker| is_secondary_rate_limit(response, marker))
	}
}

/// Parses a `Retry-After` header holding a whole number of seconds.
/// HTTP-date values and anything else non-numeric are ignored.
pub fn retry_after(response: &HttpResponse) -> Option<Duration> {
	let raw = response.header("retry-after")?.trim();
	if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
		return None;
	}
	raw.parse::<u64>().ok().map(Duration::from_secs)
}

/// Looks for `marker` in the JSON `message` field, or in the raw body when the
/// body is not JSON.
pub fn is_secondary_rate_limit(response: &HttpResponse, marker: &str) -> bool {
	let marker = marker.to_lowercase();
	let haystack = match response.json() {
		Ok(value) => value
			.get("message")
			.and_then(|m| m.as_str())
			.unwrap_or_default()
			.to_lowercase(),
		Err(_) => response.body.to_lowercase(),
	};
	haystack.contains(&marker)
}

/// Sends requests through a transport, waiting out throttling responses.
pub struct RetryExecutor<T, S = TokioSleeper> {
	transport: T,
	sleeper: S,
	config: RetryConfig,
}

impl<T> RetryExecutor<T, TokioSleeper>
where
	T: HttpTransport,
{
	pub fn new(transport: T, config: RetryConfig) -> Self {
		Self {
			transport,
			sleeper: TokioSleeper,
			config,
		}
	}
}

impl<T, S> RetryExecutor<T, S>
where
	T: HttpTransport,
	S: Sleeper,
{
	/// Replaces the sleeper, typically with a recording fake in tests.
	pub fn with_sleeper<S2: Sleeper>(self, sleeper: S2) -> RetryExecutor<T, S2> {
		RetryExecutor {
			transport: self.transport,
			sleeper,
			config: self.config,
		}
	}

	pub fn config(&self) -> &RetryConfig {
		&self.config
	}

	pub fn sleeper(&self) -> &S {
		&self.sleeper
	}

	#[instrument(skip(self, request), fields(method = %request.method, url = %request.url))]
	pub async fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
		let max_attempts = self.config.max_attempts.max(1);
		let mut attempt = 0;

		loop {
			let response = self.transport.send(request).await?;
			if !self.config.is_transient(&response) {
				return Ok(response);
			}

			attempt += 1;
			if attempt >= max_attempts {
				warn!(
						status = response.status,
						attempt = attempt,
						max_attempts = max_attempts,
						"rate limit retries exhausted, returning last response"
				);
				return Ok(response);
			}

			let delay = retry_after(&response)
				.unwrap_or_else(|| self.config.backoff_delay(attempt - 1, fastrand::f64()));
			warn!(
					status = response.status,
					attempt = attempt,
					max_attempts = max_attempts,
					delay_ms = delay.as_millis() as u64,
					url = %request.url,
					body_preview = %response.body_preview(BODY_PREVIEW_CHARS).replace('\n', " "),
					"rate limited, retrying after delay"
			);

			self.sleeper.sleep(delay).await;
		}
	}
}
