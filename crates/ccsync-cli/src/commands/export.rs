// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! `ccsync export`: dump a team's memberships to CSV.

use std::path::Path;

use anyhow::Context;
use ccsync_common_http::{HttpTransport, Sleeper};
use ccsync_github::GithubClient;
use tracing::{info, warn};

use crate::config::ExportSettings;
use crate::report::write_memberships;

pub async fn run(settings: ExportSettings, output: &Path) -> anyhow::Result<()> {
	let client = GithubClient::new(settings.github).context("failed to build GitHub client")?;

	match export_memberships(&client, &settings.team, output).await? {
		0 => println!("No memberships found; nothing written."),
		rows => println!("Wrote {rows} rows to {}", output.display()),
	}
	Ok(())
}

/// Fetches every membership of `team` and writes them to `output`. Returns
/// the number of rows written; an empty team writes no file.
pub async fn export_memberships<T, S>(
	client: &GithubClient<T, S>,
	team: &str,
	output: &Path,
) -> anyhow::Result<usize>
where
	T: HttpTransport,
	S: Sleeper,
{
	let records = client
		.fetch_team_memberships(team)
		.await
		.with_context(|| format!("failed to fetch memberships of team '{team}'"))?;

	if records.is_empty() {
		warn!(
			enterprise = client.config().enterprise(),
			team,
			"the API returned no memberships; check the enterprise and team slugs, token permissions, and whether the team has members"
		);
		return Ok(0);
	}

	write_memberships(output, &records)?;
	info!(path = %output.display(), rows = records.len(), "wrote membership export");
	Ok(records.len())
}
