// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! `ccsync cost-center-add`: assign the users listed in a CSV file to the
//! cost center, without consulting any team.

use std::fs::File;
use std::path::Path;

use anyhow::Context;
use ccsync_common_http::{HttpTransport, Sleeper};
use ccsync_github::GithubClient;
use ccsync_sync::{
	chunk, classify, MutationAction, Outcome, ReconciliationReport, RowAction, RowStatus,
	SyncError, SyncOptions,
};
use tracing::{error, info, warn};

use crate::config::CostCenterAddSettings;
use crate::members::read_user_list;
use crate::report::write_report;

pub async fn run(settings: CostCenterAddSettings, csv_path: &Path) -> anyhow::Result<()> {
	let file =
		File::open(csv_path).with_context(|| format!("failed to open {}", csv_path.display()))?;
	let users = read_user_list(file)
		.with_context(|| format!("invalid user list {}", csv_path.display()))?
		.to_vec();

	let client = GithubClient::new(settings.github).context("failed to build GitHub client")?;
	let report = add_users(&client, &settings.cost_center_id, &users, &settings.options).await?;
	let summary = report.summary();

	write_report(&settings.report_path, report.rows())?;
	info!(
		path = %settings.report_path.display(),
		rows = report.len(),
		"wrote cost center report"
	);

	println!(
		"Added: {}, Skipped: {}. Report written to {}",
		summary.added,
		summary.skipped,
		settings.report_path.display()
	);
	Ok(())
}

/// Assigns `users` in batches. Already-assigned batches are recorded as
/// skipped; any other rejection aborts before the next batch.
pub async fn add_users<T, S>(
	client: &GithubClient<T, S>,
	cost_center_id: &str,
	users: &[String],
	options: &SyncOptions,
) -> anyhow::Result<ReconciliationReport>
where
	T: HttpTransport,
	S: Sleeper,
{
	let action = MutationAction::Add;
	let mut report = ReconciliationReport::new();
	let batches = chunk(users, options.batch_size);
	let total = batches.len();

	for (index, batch) in batches.enumerate() {
		if index > 0 {
			options.inter_batch.pause(client.executor().sleeper()).await;
		}

		let response = client
			.add_cost_center_users(cost_center_id, batch)
			.await
			.with_context(|| format!("failed to add batch {} of {total}", index + 1))?;

		match classify(action, response.status, &response.body) {
			Outcome::Success { message } => {
				info!(
					batch = index + 1,
					of = total,
					size = batch.len(),
					status = response.status,
					"users assigned"
				);
				report.record_batch(
					batch.iter().map(String::as_str),
					RowAction::Add,
					RowStatus::Success,
					&message,
				);
			}
			Outcome::BenignSkip { message } => {
				warn!(
					batch = index + 1,
					of = total,
					status = response.status,
					reason = %message,
					"batch skipped"
				);
				report.record_batch(
					batch.iter().map(String::as_str),
					RowAction::Add,
					RowStatus::Skipped,
					&message,
				);
			}
			Outcome::HardFailure { status, body } => {
				let endpoint =
					client.cost_center_resource_url(cost_center_id, client.config().add_path());
				error!(batch = index + 1, of = total, status, %endpoint, "batch failed");
				return Err(SyncError::HardFailure {
					action,
					batch: batch.len(),
					endpoint,
					status,
					body,
				}
				.into());
			}
		}
	}

	Ok(report)
}
