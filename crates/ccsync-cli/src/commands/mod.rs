// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Subcommand implementations. Each returns `anyhow::Result`; `main` owns
//! the exit code.

pub mod cost_center_add;
pub mod export;
pub mod sync;
pub mod team_add;
