// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Common configuration primitives for ccsync.
//!
//! - [`Secret<T>`]: a wrapper that keeps tokens out of logs and debug output
//! - [`load_secret_env`]: loads a secret from `VAR` or a file named by
//!   `VAR_FILE`

pub mod env;
pub mod secret;

pub use env::{load_secret_env, SecretEnvError};
pub use secret::{Secret, SecretString, REDACTED};
