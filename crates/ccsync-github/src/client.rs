// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! GitHub REST client for enterprise teams and cost centers.

use ccsync_common_http::{
	new_client_with_timeout, HttpRequest, HttpResponse, HttpTransport, ReqwestTransport,
	RetryExecutor, Sleeper, TokioSleeper,
};
use serde_json::json;
use tracing::{debug, info, instrument, warn};

use crate::config::{GithubConfig, ResourcePath};
use crate::error::GithubError;
use crate::pagination::Paginator;
use crate::payload::{cost_center_user_names, member_login, MembershipRecord};

/// Client bound to one enterprise. All requests go through a shared
/// [`RetryExecutor`], so rate-limit handling applies uniformly.
pub struct GithubClient<T = ReqwestTransport, S = TokioSleeper> {
	config: GithubConfig,
	executor: RetryExecutor<T, S>,
}

impl GithubClient {
	/// Builds a client that talks to the network through reqwest.
	pub fn new(config: GithubConfig) -> Result<Self, GithubError> {
		let http = new_client_with_timeout(config.timeout())
			.map_err(|e| GithubError::config(format!("failed to build HTTP client: {e}")))?;
		let transport = ReqwestTransport::new(http, config.default_headers()?);
		let executor = RetryExecutor::new(transport, config.retry_config.clone());
		Ok(Self { config, executor })
	}
}

impl<T, S> GithubClient<T, S>
where
	T: HttpTransport,
	S: Sleeper,
{
	/// Builds a client over an arbitrary transport and sleeper.
	pub fn with_transport(config: GithubConfig, transport: T, sleeper: S) -> Self {
		let executor = RetryExecutor::new(transport, config.retry_config.clone()).with_sleeper(sleeper);
		Self { config, executor }
	}

	pub fn config(&self) -> &GithubConfig {
		&self.config
	}

	pub fn executor(&self) -> &RetryExecutor<T, S> {
		&self.executor
	}

	pub fn team_memberships_url(&self, team: &str) -> String {
		self.config.endpoint(&format!(
			"/enterprises/{}/teams/{}/memberships",
			segment(self.config.enterprise()),
			segment(team)
		))
	}

	pub fn cost_center_url(&self, cost_center_id: &str) -> String {
		self.config.endpoint(&format!(
			"/enterprises/{}/settings/billing/cost-centers/{}",
			segment(self.config.enterprise()),
			segment(cost_center_id)
		))
	}

	pub fn cost_center_resource_url(&self, cost_center_id: &str, path: ResourcePath) -> String {
		format!("{}/{}", self.cost_center_url(cost_center_id), path.as_str())
	}

	pub fn team_members_add_url(&self, enterprise: &str, team: &str) -> String {
		self.config.endpoint(&format!(
			"/enterprises/{}/teams/{}/memberships/add",
			segment(enterprise),
			segment(team)
		))
	}

	/// Lazily walks the team's membership pages.
	pub fn team_memberships(&self, team: &str) -> Paginator<'_, T, S> {
		Paginator::new(
			&self.executor,
			"fetch team memberships",
			self.team_memberships_url(team),
		)
		.with_pacing(self.config.page_pacing())
	}

	/// Every member login of `team`, in page order. Records without a login
	/// are skipped; duplicates are kept.
	#[instrument(skip(self), fields(enterprise = %self.config.enterprise()))]
	pub async fn fetch_team_member_logins(&self, team: &str) -> Result<Vec<String>, GithubError> {
		let mut pages = self.team_memberships(team);
		let mut logins = Vec::new();

		while let Some(page) = pages.next_page().await? {
			let records = page.records();
			let before = logins.len();
			logins.extend(records.iter().filter_map(member_login).map(str::to_string));
			let without_login = records.len() - (logins.len() - before);
			if without_login > 0 {
				debug!(page = page.number, without_login, "skipped records without a login");
			}
			info!(
				page = page.number,
				records = records.len(),
				total = logins.len(),
				"fetched team membership page"
			);
		}

		Ok(logins)
	}

	/// Every membership of `team`, flattened for export.
	#[instrument(skip(self), fields(enterprise = %self.config.enterprise()))]
	pub async fn fetch_team_memberships(
		&self,
		team: &str,
	) -> Result<Vec<MembershipRecord>, GithubError> {
		let mut pages = self.team_memberships(team);
		let mut memberships = Vec::new();

		while let Some(page) = pages.next_page().await? {
			let records = page.records();
			memberships.extend(records.iter().filter_map(MembershipRecord::from_value));
			info!(
				page = page.number,
				records = records.len(),
				total = memberships.len(),
				"fetched team membership page"
			);
		}

		Ok(memberships)
	}

	/// Users currently assigned to the cost center. A missing cost center
	/// reads as empty.
	#[instrument(skip(self), fields(enterprise = %self.config.enterprise()))]
	pub async fn fetch_cost_center_users(
		&self,
		cost_center_id: &str,
	) -> Result<Vec<String>, GithubError> {
		let url = self.cost_center_url(cost_center_id);
		let response = self.executor.execute(&HttpRequest::get(&url)).await?;

		match response.status {
			200 => {}
			404 => {
				warn!(url = %url, "cost center not found, treating it as empty");
				return Ok(Vec::new());
			}
			_ => return Err(GithubError::api("fetch cost center", url, &response)),
		}

		let payload = response
			.json()
			.map_err(|_| GithubError::invalid_json("fetch cost center", url.as_str(), &response))?;
		let users = cost_center_user_names(&payload);
		info!(users = users.len(), "fetched cost center membership");
		Ok(users)
	}

	/// Adds `users` to the cost center through the configured add path.
	/// The response is returned unclassified.
	#[instrument(skip(self, users), fields(batch = users.len()))]
	pub async fn add_cost_center_users(
		&self,
		cost_center_id: &str,
		users: &[String],
	) -> Result<HttpResponse, GithubError> {
		let url = self.cost_center_resource_url(cost_center_id, self.config.add_path());
		let response = self
			.executor
			.execute(&HttpRequest::post(url, json!({ "users": users })))
			.await?;
		Ok(response)
	}

	/// Removes `users` from the cost center. Removal only works on the
	/// singular `resource` path, whatever the add path is.
	#[instrument(skip(self, users), fields(batch = users.len()))]
	pub async fn remove_cost_center_users(
		&self,
		cost_center_id: &str,
		users: &[String],
	) -> Result<HttpResponse, GithubError> {
		let url = self.cost_center_resource_url(cost_center_id, ResourcePath::Singular);
		let response = self
			.executor
			.execute(&HttpRequest::delete(url, json!({ "users": users })))
			.await?;
		Ok(response)
	}

	/// Adds `usernames` to an enterprise team in one call.
	#[instrument(skip(self, usernames), fields(batch = usernames.len()))]
	pub async fn add_enterprise_team_members(
		&self,
		enterprise: &str,
		team: &str,
		usernames: &[String],
	) -> Result<HttpResponse, GithubError> {
		let url = self.team_members_add_url(enterprise, team);
		let response = self
			.executor
			.execute(&HttpRequest::post(url, json!({ "usernames": usernames })))
			.await?;
		Ok(response)
	}
}

fn segment(value: &str) -> std::borrow::Cow<'_, str> {
	urlencoding::encode(value)
}
