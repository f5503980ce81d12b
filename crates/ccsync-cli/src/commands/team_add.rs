// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! `ccsync team-add`: add users listed in a CSV file to enterprise teams.

use std::fs::File;
use std::path::Path;

use anyhow::Context;
use ccsync_common_http::{truncate_chars, HttpTransport, Sleeper};
use ccsync_github::error::DIAGNOSTIC_BODY_CHARS;
use ccsync_github::GithubClient;
use tracing::{info, warn};

use crate::config::TeamAddSettings;
use crate::members::{read_member_requests, MemberRequest};

/// Tally of one team-add run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TeamAddSummary {
	pub succeeded: usize,
	pub failed: usize,
}

pub async fn run(settings: TeamAddSettings, csv_path: &Path) -> anyhow::Result<()> {
	let file =
		File::open(csv_path).with_context(|| format!("failed to open {}", csv_path.display()))?;
	let requests = read_member_requests(
		file,
		settings.default_enterprise.as_deref(),
		settings.default_team.as_deref(),
	)
	.with_context(|| format!("invalid member list {}", csv_path.display()))?;

	let client = GithubClient::new(settings.github).context("failed to build GitHub client")?;
	let summary = add_members(&client, &requests).await?;

	println!(
		"Processed {} row(s): {} succeeded, {} failed",
		requests.len(),
		summary.succeeded,
		summary.failed
	);
	Ok(())
}

/// Sends one add call per row, in file order. A rejected row is logged and
/// the run continues; a transport failure stops it.
pub async fn add_members<T, S>(
	client: &GithubClient<T, S>,
	requests: &[MemberRequest],
) -> anyhow::Result<TeamAddSummary>
where
	T: HttpTransport,
	S: Sleeper,
{
	let mut summary = TeamAddSummary::default();

	for request in requests {
		let response = client
			.add_enterprise_team_members(
				&request.enterprise,
				&request.team,
				std::slice::from_ref(&request.username),
			)
			.await
			.with_context(|| {
				format!(
					"failed to add {} to {}/{} (row {})",
					request.username, request.enterprise, request.team, request.line
				)
			})?;

		if response.is_success() {
			summary.succeeded += 1;
			info!(
				enterprise = %request.enterprise,
				team = %request.team,
				username = %request.username,
				status = response.status,
				"added team member"
			);
		} else {
			summary.failed += 1;
			warn!(
				enterprise = %request.enterprise,
				team = %request.team,
				username = %request.username,
				status = response.status,
				body = truncate_chars(&response.body, DIAGNOSTIC_BODY_CHARS),
				"team member add rejected"
			);
		}
	}

	Ok(summary)
}

#[cfg(test)]
mod tests {
	use super::*;
	use ccsync_common_config::Secret;
	use ccsync_github::GithubConfig;
	use serde_json::json;
	use wiremock::matchers::{body_json, method, path};
	use wiremock::{Mock, MockServer, ResponseTemplate};

	fn client(server: &MockServer) -> GithubClient {
		let config = GithubConfig::new("acme", Secret::new("ghp_test".to_string()))
			.with_base_url(&server.uri())
			.unwrap();
		GithubClient::new(config).unwrap()
	}

	fn request(line: u64, username: &str, team: &str) -> MemberRequest {
		MemberRequest {
			line,
			username: username.to_string(),
			enterprise: "acme".to_string(),
			team: team.to_string(),
		}
	}

	#[tokio::test]
	async fn one_call_per_row() {
		let server = MockServer::start().await;
		Mock::given(method("POST"))
			.and(path("/enterprises/acme/teams/eng/memberships/add"))
			.and(body_json(json!({"usernames": ["alice"]})))
			.respond_with(ResponseTemplate::new(201))
			.expect(1)
			.mount(&server)
			.await;
		Mock::given(method("POST"))
			.and(path("/enterprises/acme/teams/ops/memberships/add"))
			.and(body_json(json!({"usernames": ["bob"]})))
			.respond_with(ResponseTemplate::new(201))
			.expect(1)
			.mount(&server)
			.await;

		let summary = add_members(
			&client(&server),
			&[request(2, "alice", "eng"), request(3, "bob", "ops")],
		)
		.await
		.unwrap();

		assert_eq!(
			summary,
			TeamAddSummary {
				succeeded: 2,
				failed: 0
			}
		);
	}

	#[tokio::test]
	async fn rejected_rows_do_not_stop_the_run() {
		let server = MockServer::start().await;
		Mock::given(method("POST"))
			.and(path("/enterprises/acme/teams/eng/memberships/add"))
			.and(body_json(json!({"usernames": ["ghost"]})))
			.respond_with(ResponseTemplate::new(422).set_body_string("Validation Failed"))
			.mount(&server)
			.await;
		Mock::given(method("POST"))
			.and(path("/enterprises/acme/teams/eng/memberships/add"))
			.and(body_json(json!({"usernames": ["carol"]})))
			.respond_with(ResponseTemplate::new(200))
			.mount(&server)
			.await;

		let summary = add_members(
			&client(&server),
			&[request(2, "ghost", "eng"), request(3, "carol", "eng")],
		)
		.await
		.unwrap();

		assert_eq!(
			summary,
			TeamAddSummary {
				succeeded: 1,
				failed: 1
			}
		);
	}
}
