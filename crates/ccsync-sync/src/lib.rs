// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Reconciles an enterprise team with a billing cost center.
//!
//! The engine reads two identity sets through a [`CostCenterDirectory`],
//! computes a [`ReconciliationPlan`], applies it in batches and records one
//! [`ReportRow`] per identity. Writing the report out is left to the caller.

pub mod batch;
pub mod directory;
pub mod error;
pub mod identity;
pub mod outcome;
pub mod plan;
pub mod reconciler;
pub mod report;

pub use batch::{chunk, DEFAULT_BATCH_SIZE};
pub use directory::{CostCenterDirectory, GithubDirectory, MutationResponse};
pub use error::SyncError;
pub use identity::IdentitySet;
pub use outcome::{classify, MutationAction, Outcome};
pub use plan::ReconciliationPlan;
pub use reconciler::{Reconciler, SyncOptions, SyncRun};
pub use report::{ReconciliationReport, ReportRow, RowAction, RowStatus, Summary};
