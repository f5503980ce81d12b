// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! CSV output for sync reports and membership exports.

use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};

use ccsync_github::MembershipRecord;
use ccsync_sync::ReportRow;
use serde::Serialize;

pub const REPORT_COLUMNS: [&str; 4] = ["login", "action", "status", "message"];
pub const EXPORT_COLUMNS: [&str; 5] = ["login", "id", "html_url", "role", "state"];

#[derive(Debug, thiserror::Error)]
pub enum CsvWriteError {
	#[error("failed to create {path}: {source}")]
	Create {
		path: PathBuf,
		#[source]
		source: io::Error,
	},

	#[error("failed to write {path}: {source}")]
	Write {
		path: PathBuf,
		#[source]
		source: csv::Error,
	},
}

/// Writes the header row, then one row per item. The header is written even
/// when `rows` is empty.
pub fn write_rows<W, R>(writer: W, columns: &[&str], rows: &[R]) -> Result<(), csv::Error>
where
	W: io::Write,
	R: Serialize,
{
	let mut csv = csv::WriterBuilder::new().has_headers(false).from_writer(writer);
	csv.write_record(columns)?;
	for row in rows {
		csv.serialize(row)?;
	}
	csv.flush()?;
	Ok(())
}

pub fn write_report(path: &Path, rows: &[ReportRow]) -> Result<(), CsvWriteError> {
	write_file(path, &REPORT_COLUMNS, rows)
}

pub fn write_memberships(path: &Path, records: &[MembershipRecord]) -> Result<(), CsvWriteError> {
	write_file(path, &EXPORT_COLUMNS, records)
}

fn write_file<R: Serialize>(path: &Path, columns: &[&str], rows: &[R]) -> Result<(), CsvWriteError> {
	let file = File::create(path).map_err(|source| CsvWriteError::Create {
		path: path.to_path_buf(),
		source,
	})?;
	write_rows(file, columns, rows).map_err(|source| CsvWriteError::Write {
		path: path.to_path_buf(),
		source,
	})
}
