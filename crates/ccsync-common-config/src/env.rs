// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Environment variable helpers for loading secrets.
//!
//! Supports the `*_FILE` convention used by Docker and Kubernetes secrets as
//! well as CI runners that mount tokens as files.

use std::path::PathBuf;
use std::{env, fs};

use thiserror::Error;

use crate::secret::SecretString;

/// Errors that can occur when loading secrets from environment variables.
#[derive(Debug, Error)]
pub enum SecretEnvError {
	#[error("failed to read secret file at {path}: {source}")]
	Io {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	#[error("secret file path in {var} is empty")]
	EmptyPath { var: String },
}

/// Load a secret using the `VAR` / `VAR_FILE` convention.
///
/// `VAR_FILE` wins over `VAR`. A single trailing newline is stripped from file
/// contents. Empty values count as unset.
pub fn load_secret_env(var: &str) -> Result<Option<SecretString>, SecretEnvError> {
	let file_var = format!("{var}_FILE");

	if let Ok(path_str) = env::var(&file_var) {
		if path_str.is_empty() {
			return Err(SecretEnvError::EmptyPath { var: file_var });
		}

		let path = PathBuf::from(&path_str);
		let content = fs::read_to_string(&path).map_err(|e| SecretEnvError::Io {
			path: path.clone(),
			source: e,
		})?;

		let secret = content.strip_suffix('\n').unwrap_or(&content).to_string();
		return Ok(Some(SecretString::new(secret)));
	}

	match env::var(var) {
		Ok(value) if !value.is_empty() => Ok(Some(SecretString::new(value))),
		_ => Ok(None),
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::io::Write;
	use tempfile::NamedTempFile;

	#[test]
	fn returns_none_when_not_set() {
		let var = "CCSYNC_TEST_SECRET_UNSET_1";
		env::remove_var(var);
		env::remove_var(format!("{var}_FILE"));

		assert!(load_secret_env(var).unwrap().is_none());
	}

	#[test]
	fn reads_direct_value() {
		let var = "CCSYNC_TEST_SECRET_DIRECT_2";
		env::remove_var(format!("{var}_FILE"));
		env::set_var(var, "ghp_direct");

		let secret = load_secret_env(var).unwrap().unwrap();
		assert_eq!(secret.expose(), "ghp_direct");

		env::remove_var(var);
	}

	#[test]
	fn empty_direct_value_is_unset() {
		let var = "CCSYNC_TEST_SECRET_EMPTY_3";
		env::remove_var(format!("{var}_FILE"));
		env::set_var(var, "");

		assert!(load_secret_env(var).unwrap().is_none());

		env::remove_var(var);
	}

	/// File contents take precedence and lose exactly one trailing newline.
	#[test]
	fn file_wins_and_strips_newline() {
		let var = "CCSYNC_TEST_SECRET_FILE_4";
		let mut file = NamedTempFile::new().unwrap();
		writeln!(file, "ghp_from_file").unwrap();

		env::set_var(var, "ghp_direct");
		env::set_var(format!("{var}_FILE"), file.path());

		let secret = load_secret_env(var).unwrap().unwrap();
		assert_eq!(secret.expose(), "ghp_from_file");

		env::remove_var(var);
		env::remove_var(format!("{var}_FILE"));
	}

	#[test]
	fn empty_file_path_is_error() {
		let var = "CCSYNC_TEST_SECRET_EMPTY_PATH_5";
		env::set_var(format!("{var}_FILE"), "");

		let err = load_secret_env(var).unwrap_err();
		assert!(matches!(err, SecretEnvError::EmptyPath { .. }));

		env::remove_var(format!("{var}_FILE"));
	}

	#[test]
	fn missing_file_is_io_error() {
		let var = "CCSYNC_TEST_SECRET_MISSING_FILE_6";
		env::set_var(format!("{var}_FILE"), "/nonexistent/ccsync/token");

		let err = load_secret_env(var).unwrap_err();
		assert!(matches!(err, SecretEnvError::Io { .. }));

		env::remove_var(format!("{var}_FILE"));
	}
}
