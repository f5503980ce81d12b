// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! `ccsync sync`: make the cost center match the team.

use std::path::Path;

use anyhow::Context;
use ccsync_common_http::Sleeper;
use ccsync_github::GithubClient;
use ccsync_sync::{CostCenterDirectory, GithubDirectory, Reconciler, Summary};
use tracing::info;

use crate::config::SyncSettings;
use crate::report::write_report;

pub async fn run(settings: SyncSettings) -> anyhow::Result<()> {
	let dry_run = settings.options.dry_run;
	let client = GithubClient::new(settings.github).context("failed to build GitHub client")?;
	let directory = GithubDirectory::new(client, settings.team, settings.cost_center_id);
	let reconciler = Reconciler::new(directory, settings.options);

	let summary = reconcile_and_report(&reconciler, &settings.report_path).await?;
	println!("{}", render_summary(&summary, &settings.report_path, dry_run));
	Ok(())
}

/// Runs the reconciliation and writes the report. Nothing is written if the
/// run fails.
pub async fn reconcile_and_report<D, S>(
	reconciler: &Reconciler<D, S>,
	report_path: &Path,
) -> anyhow::Result<Summary>
where
	D: CostCenterDirectory,
	S: Sleeper,
{
	let run = reconciler.run().await.context("sync aborted")?;
	let summary = run.report.summary();

	write_report(report_path, run.report.rows())?;
	info!(
		path = %report_path.display(),
		rows = run.report.len(),
		"wrote sync report"
	);

	Ok(summary)
}

pub fn render_summary(summary: &Summary, report_path: &Path, dry_run: bool) -> String {
	if dry_run {
		return format!(
			"Dry run: {} planned, {} already synced. Plan written to {}",
			summary.planned,
			summary.already_synced,
			report_path.display()
		);
	}
	format!(
		"Added: {}, Removed: {}, Skipped: {}, Already synced: {}. Report written to {}",
		summary.added,
		summary.removed,
		summary.skipped,
		summary.already_synced,
		report_path.display()
	)
}
