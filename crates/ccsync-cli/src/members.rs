// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Reading user lists from CSV.
//!
//! The team-add file needs a `username` column. `enterprise` and `team`
//! columns are optional and fall back to the configured defaults row by row.
//! The cost-center-add file is a plain list: the `username` column if there
//! is one, otherwise the first column.

use std::io;

use ccsync_sync::IdentitySet;

const USERNAME_COLUMN: &str = "username";
const ENTERPRISE_COLUMN: &str = "enterprise";
const TEAM_COLUMN: &str = "team";

#[derive(Debug, thiserror::Error)]
pub enum MemberListError {
	#[error("CSV must include a 'username' column (optional: 'enterprise', 'team'); found: {found}")]
	MissingUsernameColumn { found: String },

	#[error("CSV row {line}: {source}")]
	Row {
		line: u64,
		#[source]
		source: csv::Error,
	},

	#[error("failed to read CSV header: {0}")]
	Header(#[source] csv::Error),

	#[error("row {line} ({username}) has no {field}; add a '{field}' column or configure a default")]
	Unresolved {
		line: u64,
		username: String,
		field: &'static str,
	},
}

/// One membership to create.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberRequest {
	/// 1-based line in the file, header included.
	pub line: u64,
	pub username: String,
	pub enterprise: String,
	pub team: String,
}

/// Parses the list and resolves every row's enterprise and team. Blank
/// usernames are skipped. Any row left without an enterprise or team fails
/// the whole read before anything is sent.
pub fn read_member_requests<R: io::Read>(
	reader: R,
	default_enterprise: Option<&str>,
	default_team: Option<&str>,
) -> Result<Vec<MemberRequest>, MemberListError> {
	let mut csv = csv::ReaderBuilder::new()
		.flexible(true)
		.trim(csv::Trim::All)
		.from_reader(reader);

	let headers = csv.headers().map_err(MemberListError::Header)?.clone();
	let position = |name: &str| headers.iter().position(|h| h.eq_ignore_ascii_case(name));

	let Some(username_idx) = position(USERNAME_COLUMN) else {
		return Err(MemberListError::MissingUsernameColumn {
			found: headers.iter().collect::<Vec<_>>().join(", "),
		});
	};
	let enterprise_idx = position(ENTERPRISE_COLUMN);
	let team_idx = position(TEAM_COLUMN);
	let default_enterprise = default_enterprise.map(str::trim).filter(|v| !v.is_empty());
	let default_team = default_team.map(str::trim).filter(|v| !v.is_empty());

	let mut requests = Vec::new();
	for (idx, record) in csv.records().enumerate() {
		let line = idx as u64 + 2;
		let record = record.map_err(|source| MemberListError::Row { line, source })?;

		let field = |i: Option<usize>| {
			i.and_then(|i| record.get(i))
				.map(str::trim)
				.filter(|v| !v.is_empty())
		};

		let Some(username) = field(Some(username_idx)) else {
			continue;
		};

		requests.push(MemberRequest {
			line,
			username: username.to_string(),
			enterprise: resolved(
				field(enterprise_idx).or(default_enterprise),
				line,
				username,
				ENTERPRISE_COLUMN,
			)?,
			team: resolved(field(team_idx).or(default_team), line, username, TEAM_COLUMN)?,
		});
	}

	Ok(requests)
}

/// Reads a list of logins, header first. Blank entries are skipped and
/// repeats collapse to their first occurrence.
pub fn read_user_list<R: io::Read>(reader: R) -> Result<IdentitySet, MemberListError> {
	let mut csv = csv::ReaderBuilder::new()
		.flexible(true)
		.trim(csv::Trim::All)
		.from_reader(reader);

	let headers = csv.headers().map_err(MemberListError::Header)?;
	let column = headers
		.iter()
		.position(|h| h.eq_ignore_ascii_case(USERNAME_COLUMN))
		.unwrap_or(0);

	let mut users = IdentitySet::new();
	for (idx, record) in csv.records().enumerate() {
		let line = idx as u64 + 2;
		let record = record.map_err(|source| MemberListError::Row { line, source })?;
		if let Some(login) = record.get(column).filter(|v| !v.is_empty()) {
			users.insert(login);
		}
	}

	Ok(users)
}

fn resolved(
	value: Option<&str>,
	line: u64,
	username: &str,
	field: &'static str,
) -> Result<String, MemberListError> {
	value.map(str::to_string).ok_or_else(|| MemberListError::Unresolved {
		line,
		username: username.to_string(),
		field,
	})
}
