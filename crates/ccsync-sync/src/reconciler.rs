// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! The reconciliation driver.
//!
//! A run reads both identity sets, computes the plan, then applies it: adds
//! first, removes second, one call per batch, strictly sequentially. Each
//! batch response is classified and expanded into one report row per login.
//! The first hard failure ends the run.

use std::num::NonZeroUsize;
use std::time::Duration;

use ccsync_common_http::{Pacing, Sleeper, TokioSleeper};
use tracing::{debug, error, info, instrument, warn};

use crate::batch::{chunk, DEFAULT_BATCH_SIZE};
use crate::directory::CostCenterDirectory;
use crate::error::SyncError;
use crate::identity::IdentitySet;
use crate::outcome::{classify, MutationAction, Outcome};
use crate::plan::ReconciliationPlan;
use crate::report::{ReconciliationReport, RowAction, RowStatus};

const ALREADY_SYNCED_MESSAGE: &str = "already in sync";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncOptions {
	pub batch_size: NonZeroUsize,
	/// Compute and report the plan without mutating anything.
	pub dry_run: bool,
	/// Pause between consecutive mutation calls.
	pub inter_batch: Pacing,
}

impl Default for SyncOptions {
	fn default() -> Self {
		Self {
			batch_size: DEFAULT_BATCH_SIZE,
			dry_run: false,
			inter_batch: Pacing::new(Duration::from_millis(500), Duration::from_millis(1500)),
		}
	}
}

/// The result of a completed run.
#[derive(Debug, Clone)]
pub struct SyncRun {
	pub plan: ReconciliationPlan,
	pub report: ReconciliationReport,
}

pub struct Reconciler<D, S = TokioSleeper> {
	directory: D,
	options: SyncOptions,
	sleeper: S,
}

impl<D> Reconciler<D, TokioSleeper>
where
	D: CostCenterDirectory,
{
	pub fn new(directory: D, options: SyncOptions) -> Self {
		Self {
			directory,
			options,
			sleeper: TokioSleeper,
		}
	}
}

impl<D, S> Reconciler<D, S>
where
	D: CostCenterDirectory,
	S: Sleeper,
{
	pub fn with_sleeper<S2: Sleeper>(self, sleeper: S2) -> Reconciler<D, S2> {
		Reconciler {
			directory: self.directory,
			options: self.options,
			sleeper,
		}
	}

	pub fn sleeper(&self) -> &S {
		&self.sleeper
	}

	/// Reads both sides and reconciles them.
	#[instrument(skip(self), fields(dry_run = self.options.dry_run))]
	pub async fn run(&self) -> Result<SyncRun, SyncError> {
		let source: IdentitySet = self.directory.team_members().await?.into_iter().collect();
		info!(members = source.len(), "loaded team members");

		let target: IdentitySet = self
			.directory
			.cost_center_members()
			.await?
			.into_iter()
			.collect();
		info!(members = target.len(), "loaded cost center members");

		self.reconcile(&source, &target).await
	}

	/// Reconciles already-loaded sets.
	pub async fn reconcile(
		&self,
		source: &IdentitySet,
		target: &IdentitySet,
	) -> Result<SyncRun, SyncError> {
		let plan = ReconciliationPlan::compute(source, target);
		info!(
			to_add = plan.to_add.len(),
			to_remove = plan.to_remove.len(),
			already_synced = plan.already_synced.len(),
			"computed reconciliation plan"
		);
		debug!(to_add = ?plan.to_add.to_vec(), to_remove = ?plan.to_remove.to_vec(), "plan members");

		let mut report = ReconciliationReport::new();

		if self.options.dry_run {
			report.record_batch(plan.to_add.iter(), RowAction::Add, RowStatus::Planned, "would add");
			report.record_batch(
				plan.to_remove.iter(),
				RowAction::Remove,
				RowStatus::Planned,
				"would remove",
			);
		} else {
			let mut calls = 0;
			self.apply(MutationAction::Add, &plan.to_add, &mut report, &mut calls)
				.await?;
			self.apply(MutationAction::Remove, &plan.to_remove, &mut report, &mut calls)
				.await?;
		}

		report.record_batch(
			plan.already_synced.iter(),
			RowAction::None,
			RowStatus::AlreadySynced,
			ALREADY_SYNCED_MESSAGE,
		);

		Ok(SyncRun { plan, report })
	}

	async fn apply(
		&self,
		action: MutationAction,
		logins: &IdentitySet,
		report: &mut ReconciliationReport,
		calls: &mut usize,
	) -> Result<(), SyncError> {
		let logins = logins.to_vec();
		let batches = chunk(&logins, self.options.batch_size);
		let total = batches.len();

		for (index, batch) in batches.enumerate() {
			if *calls > 0 {
				self.options.inter_batch.pause(&self.sleeper).await;
			}
			*calls += 1;

			let response = match action {
				MutationAction::Add => self.directory.add_members(batch).await?,
				MutationAction::Remove => self.directory.remove_members(batch).await?,
			};

			match classify(action, response.status, &response.body) {
				Outcome::Success { message } => {
					info!(
						%action,
						batch = index + 1,
						of = total,
						size = batch.len(),
						status = response.status,
						"batch applied"
					);
					report.record_batch(
						batch.iter().map(String::as_str),
						action.into(),
						RowStatus::Success,
						&message,
					);
				}
				Outcome::BenignSkip { message } => {
					warn!(
						%action,
						batch = index + 1,
						of = total,
						size = batch.len(),
						status = response.status,
						reason = %message,
						"batch skipped"
					);
					report.record_batch(
						batch.iter().map(String::as_str),
						action.into(),
						RowStatus::Skipped,
						&message,
					);
				}
				Outcome::HardFailure { status, body } => {
					error!(
						%action,
						batch = index + 1,
						of = total,
						status,
						endpoint = %response.endpoint,
						"batch failed"
					);
					return Err(SyncError::HardFailure {
						action,
						batch: batch.len(),
						endpoint: response.endpoint,
						status,
						body,
					});
				}
			}
		}

		Ok(())
	}
}
