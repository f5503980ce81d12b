// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Shared HTTP utilities for ccsync.
//!
//! This crate provides:
//! - A pre-configured reqwest client with a consistent User-Agent header
//! - The [`HttpTransport`] capability the rest of the workspace talks to
//! - A [`Sleeper`] abstraction so waits can be faked in tests
//! - [`RetryExecutor`], the single home of rate-limit retry policy

mod client;
mod retry;
mod sleep;
mod transport;

pub use client::{builder, new_client_with_timeout, user_agent};
pub use retry::{
	is_secondary_rate_limit, retry_after, RetryConfig, RetryExecutor, SECONDARY_RATE_LIMIT_MARKER,
};
pub use sleep::{Pacing, RecordingSleeper, Sleeper, TokioSleeper};
pub use transport::{
	truncate_chars, HttpRequest, HttpResponse, HttpTransport, ReqwestTransport, TransportError,
};
