// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

use ccsync_github::GithubError;
use thiserror::Error;

use crate::outcome::MutationAction;

/// Conditions that abort a reconciliation run.
#[derive(Debug, Error)]
pub enum SyncError {
	#[error(transparent)]
	Github(#[from] GithubError),

	#[error("{action} batch of {batch} user(s) failed\nURL: {endpoint}\nHTTP {status}\nResponse: {body}")]
	HardFailure {
		action: MutationAction,
		batch: usize,
		endpoint: String,
		status: u16,
		body: String,
	},
}
