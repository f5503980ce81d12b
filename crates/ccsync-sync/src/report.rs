// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Per-login outcome rows produced by a run.

use serde::Serialize;

use crate::outcome::MutationAction;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RowAction {
	Add,
	Remove,
	None,
}

impl From<MutationAction> for RowAction {
	fn from(action: MutationAction) -> Self {
		match action {
			MutationAction::Add => Self::Add,
			MutationAction::Remove => Self::Remove,
		}
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RowStatus {
	Success,
	Skipped,
	AlreadySynced,
	/// Dry run: the mutation was computed but not sent.
	Planned,
}

/// One line of the report. Field order is the column order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportRow {
	pub login: String,
	pub action: RowAction,
	pub status: RowStatus,
	pub message: String,
}

/// Counts by outcome.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Summary {
	pub added: usize,
	pub removed: usize,
	pub skipped: usize,
	pub already_synced: usize,
	pub planned: usize,
}

/// Append-only list of rows: add phase, then remove phase, then
/// already-synced logins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconciliationReport {
	rows: Vec<ReportRow>,
}

impl ReconciliationReport {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn push(&mut self, row: ReportRow) {
		self.rows.push(row);
	}

	/// Records the same outcome for every login of a batch.
	pub fn record_batch<'a>(
		&mut self,
		logins: impl IntoIterator<Item = &'a str>,
		action: RowAction,
		status: RowStatus,
		message: &str,
	) {
		self.rows.extend(logins.into_iter().map(|login| ReportRow {
			login: login.to_string(),
			action,
			status,
			message: message.to_string(),
		}));
	}

	pub fn rows(&self) -> &[ReportRow] {
		&self.rows
	}

	pub fn len(&self) -> usize {
		self.rows.len()
	}

	pub fn is_empty(&self) -> bool {
		self.rows.is_empty()
	}

	pub fn summary(&self) -> Summary {
		self.rows.iter().fold(Summary::default(), |mut summary, row| {
			match (row.action, row.status) {
				(RowAction::Add, RowStatus::Success) => summary.added += 1,
				(RowAction::Remove, RowStatus::Success) => summary.removed += 1,
				(_, RowStatus::Skipped) => summary.skipped += 1,
				(_, RowStatus::AlreadySynced) => summary.already_synced += 1,
				(_, RowStatus::Planned) => summary.planned += 1,
				(RowAction::None, RowStatus::Success) => {}
			}
			summary
		})
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn batch_rows_share_outcome() {
		let mut report = ReconciliationReport::new();
		report.record_batch(["a", "b"], RowAction::Add, RowStatus::Skipped, "already present");

		assert_eq!(report.len(), 2);
		assert!(report
			.rows()
			.iter()
			.all(|row| row.status == RowStatus::Skipped && row.message == "already present"));
		assert_eq!(report.rows()[1].login, "b");
	}

	#[test]
	fn summary_counts_each_bucket() {
		let mut report = ReconciliationReport::new();
		report.record_batch(["a", "b"], RowAction::Add, RowStatus::Success, "added (HTTP 201)");
		report.record_batch(["c"], RowAction::Add, RowStatus::Skipped, "already present");
		report.record_batch(["d"], RowAction::Remove, RowStatus::Success, "removed (HTTP 200)");
		report.record_batch(["e"], RowAction::Remove, RowStatus::Skipped, "not found");
		report.record_batch(["f"], RowAction::None, RowStatus::AlreadySynced, "already in sync");

		assert_eq!(
			report.summary(),
			Summary {
				added: 2,
				removed: 1,
				skipped: 2,
				already_synced: 1,
				planned: 0,
			}
		);
	}

	#[test]
	fn statuses_serialize_in_snake_case() {
		let row = ReportRow {
			login: "bob".to_string(),
			action: RowAction::None,
			status: RowStatus::AlreadySynced,
			message: "already in sync".to_string(),
		};
		let value = serde_json::to_value(&row).unwrap();
		assert_eq!(value["action"], "none");
		assert_eq!(value["status"], "already_synced");
	}
}
