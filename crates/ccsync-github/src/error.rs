// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Error types for the GitHub client.

use ccsync_common_http::{truncate_chars, HttpResponse, TransportError};
use thiserror::Error;

/// Response bodies are cut to this many characters in diagnostics.
pub const DIAGNOSTIC_BODY_CHARS: usize = 1000;

/// Errors that end a run. Every variant that saw a response carries the
/// request target, the status and a truncated body.
#[derive(Debug, Error)]
pub enum GithubError {
	#[error(transparent)]
	Transport(#[from] TransportError),

	#[error("{operation} failed\nURL: {url}\nHTTP {status}\nResponse: {body}")]
	Api {
		operation: String,
		url: String,
		status: u16,
		body: String,
	},

	#[error("non-JSON response from {operation}\nURL: {url}\nHTTP {status}\nBody: {body}")]
	InvalidJson {
		operation: String,
		url: String,
		status: u16,
		body: String,
	},

	#[error("aborting after {pages} pages: possible pagination loop (next page {next_url})")]
	PaginationLoop { pages: usize, next_url: String },

	#[error("configuration error: {0}")]
	Config(String),
}

impl GithubError {
	pub fn api(operation: impl Into<String>, url: impl Into<String>, response: &HttpResponse) -> Self {
		Self::Api {
			operation: operation.into(),
			url: url.into(),
			status: response.status,
			body: truncate_chars(&response.body, DIAGNOSTIC_BODY_CHARS).to_string(),
		}
	}

	pub fn invalid_json(
		operation: impl Into<String>,
		url: impl Into<String>,
		response: &HttpResponse,
	) -> Self {
		Self::InvalidJson {
			operation: operation.into(),
			url: url.into(),
			status: response.status,
			body: truncate_chars(&response.body, DIAGNOSTIC_BODY_CHARS).to_string(),
		}
	}

	pub fn config(message: impl Into<String>) -> Self {
		Self::Config(message.into())
	}

	/// HTTP status, if the error came from a response.
	pub fn status(&self) -> Option<u16> {
		match self {
			Self::Api { status, .. } | Self::InvalidJson { status, .. } => Some(*status),
			_ => None,
		}
	}
}
