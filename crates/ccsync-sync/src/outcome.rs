// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Classification of add/remove responses.
//!
//! This is the only place where add and remove policies differ. Duplicate
//! adds and removals of absent users are expected when a previous run was
//! interrupted, so they are recorded as skips instead of failing the run.

use std::fmt;

use ccsync_common_http::truncate_chars;
use ccsync_github::error::DIAGNOSTIC_BODY_CHARS;
use serde::Serialize;

const SUCCESS_STATUSES: [u16; 4] = [200, 201, 202, 204];
const ADD_CONFLICT_STATUSES: [u16; 2] = [409, 422];
const DUPLICATE_MARKERS: [&str; 4] = ["already", "exists", "conflict", "has already been taken"];
const NOT_PRESENT_MARKER: &str = "no resources";

/// Markers are searched for in this many leading characters of the body.
const MARKER_WINDOW_CHARS: usize = 800;
/// Skip messages quoting the response body are cut to this length.
const MESSAGE_BODY_CHARS: usize = 500;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MutationAction {
	Add,
	Remove,
}

impl MutationAction {
	pub fn as_str(&self) -> &'static str {
		match self {
			Self::Add => "add",
			Self::Remove => "remove",
		}
	}

	fn past_tense(&self) -> &'static str {
		match self {
			Self::Add => "added",
			Self::Remove => "removed",
		}
	}
}

impl fmt::Display for MutationAction {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// What one mutation call amounted to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
	Success { message: String },
	BenignSkip { message: String },
	/// Aborts the run. `body` is already truncated for diagnostics.
	HardFailure { status: u16, body: String },
}

impl Outcome {
	pub fn is_hard_failure(&self) -> bool {
		matches!(self, Self::HardFailure { .. })
	}
}

pub fn classify(action: MutationAction, status: u16, body: &str) -> Outcome {
	if SUCCESS_STATUSES.contains(&status) {
		return Outcome::Success {
			message: format!("{} (HTTP {status})", action.past_tense()),
		};
	}

	let window = truncate_chars(body, MARKER_WINDOW_CHARS).to_lowercase();
	let skip = |message: String| Outcome::BenignSkip { message };

	match action {
		MutationAction::Add if ADD_CONFLICT_STATUSES.contains(&status) => {
			if DUPLICATE_MARKERS.iter().any(|marker| window.contains(marker)) {
				skip("already present".to_string())
			} else {
				skip(raw_message(status, body))
			}
		}
		MutationAction::Remove if status == 400 => {
			if window.contains(NOT_PRESENT_MARKER) {
				skip("not present".to_string())
			} else {
				skip(raw_message(status, body))
			}
		}
		MutationAction::Remove if status == 404 => skip("not found".to_string()),
		_ => Outcome::HardFailure {
			status,
			body: truncate_chars(body, DIAGNOSTIC_BODY_CHARS).to_string(),
		},
	}
}

fn raw_message(status: u16, body: &str) -> String {
	format!("HTTP {status}: {}", truncate_chars(body.trim(), MESSAGE_BODY_CHARS))
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn success_codes_for_both_actions() {
		for status in SUCCESS_STATUSES {
			assert!(matches!(classify(MutationAction::Add, status, ""), Outcome::Success { .. }));
			assert!(matches!(classify(MutationAction::Remove, status, ""), Outcome::Success { .. }));
		}
		assert_eq!(
			classify(MutationAction::Add, 201, ""),
			Outcome::Success {
				message: "added (HTTP 201)".to_string()
			}
		);
	}

	#[test]
	fn duplicate_add_is_skipped() {
		assert_eq!(
			classify(MutationAction::Add, 409, "User already exists"),
			Outcome::BenignSkip {
				message: "already present".to_string()
			}
		);
		assert_eq!(
			classify(MutationAction::Add, 422, r#"{"message":"Login has already been taken"}"#),
			Outcome::BenignSkip {
				message: "already present".to_string()
			}
		);
	}

	/// Conflicts without a duplicate marker still skip, but quote the body.
	#[test]
	fn unexplained_add_conflict_quotes_body() {
		assert_eq!(
			classify(MutationAction::Add, 422, "Validation Failed"),
			Outcome::BenignSkip {
				message: "HTTP 422: Validation Failed".to_string()
			}
		);
	}

	#[test]
	fn add_server_error_is_hard_failure() {
		let outcome = classify(MutationAction::Add, 500, "Internal Server Error");
		assert_eq!(
			outcome,
			Outcome::HardFailure {
				status: 500,
				body: "Internal Server Error".to_string()
			}
		);
		assert!(outcome.is_hard_failure());
	}

	#[test]
	fn add_not_found_is_hard_failure() {
		assert!(classify(MutationAction::Add, 404, "").is_hard_failure());
		assert!(classify(MutationAction::Add, 400, "no resources").is_hard_failure());
	}

	#[test]
	fn remove_of_absent_user_is_skipped() {
		assert_eq!(
			classify(MutationAction::Remove, 400, "No resources to remove"),
			Outcome::BenignSkip {
				message: "not present".to_string()
			}
		);
		assert_eq!(
			classify(MutationAction::Remove, 404, ""),
			Outcome::BenignSkip {
				message: "not found".to_string()
			}
		);
	}

	#[test]
	fn other_remove_bad_request_quotes_body() {
		assert_eq!(
			classify(MutationAction::Remove, 400, " bad payload \n"),
			Outcome::BenignSkip {
				message: "HTTP 400: bad payload".to_string()
			}
		);
	}

	#[test]
	fn remove_conflict_is_hard_failure() {
		assert!(classify(MutationAction::Remove, 409, "already").is_hard_failure());
		assert!(classify(MutationAction::Remove, 401, "Bad credentials").is_hard_failure());
	}

	#[test]
	fn markers_beyond_window_are_ignored() {
		let body = format!("{}already", "x".repeat(MARKER_WINDOW_CHARS));
		match classify(MutationAction::Add, 409, &body) {
			Outcome::BenignSkip { message } => {
				assert!(message.starts_with("HTTP 409: "));
				assert_eq!(message.len(), "HTTP 409: ".len() + MESSAGE_BODY_CHARS);
			}
			other => panic!("unexpected outcome: {other:?}"),
		}
	}

	#[test]
	fn hard_failure_body_is_truncated() {
		let body = "e".repeat(5000);
		match classify(MutationAction::Remove, 502, &body) {
			Outcome::HardFailure { body, .. } => assert_eq!(body.len(), DIAGNOSTIC_BODY_CHARS),
			other => panic!("unexpected outcome: {other:?}"),
		}
	}
}
