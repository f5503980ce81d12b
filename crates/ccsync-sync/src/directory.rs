// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! The remote side of a reconciliation, as seen by the engine.

use std::sync::Arc;

use async_trait::async_trait;
use ccsync_common_http::{HttpResponse, HttpTransport, ReqwestTransport, Sleeper, TokioSleeper};
use ccsync_github::{GithubClient, ResourcePath};

use crate::error::SyncError;

/// Raw result of one add/remove call, before classification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MutationResponse {
	pub endpoint: String,
	pub status: u16,
	pub body: String,
}

impl MutationResponse {
	fn from_http(endpoint: String, response: HttpResponse) -> Self {
		Self {
			endpoint,
			status: response.status,
			body: response.body,
		}
	}
}

/// Read and write access to the source team and the target cost center.
#[async_trait]
pub trait CostCenterDirectory: Send + Sync {
	/// Logins of the source team, in API order. May contain duplicates.
	async fn team_members(&self) -> Result<Vec<String>, SyncError>;

	/// Users currently assigned to the cost center.
	async fn cost_center_members(&self) -> Result<Vec<String>, SyncError>;

	async fn add_members(&self, batch: &[String]) -> Result<MutationResponse, SyncError>;

	async fn remove_members(&self, batch: &[String]) -> Result<MutationResponse, SyncError>;
}

#[async_trait]
impl<D> CostCenterDirectory for Arc<D>
where
	D: CostCenterDirectory + ?Sized,
{
	async fn team_members(&self) -> Result<Vec<String>, SyncError> {
		(**self).team_members().await
	}

	async fn cost_center_members(&self) -> Result<Vec<String>, SyncError> {
		(**self).cost_center_members().await
	}

	async fn add_members(&self, batch: &[String]) -> Result<MutationResponse, SyncError> {
		(**self).add_members(batch).await
	}

	async fn remove_members(&self, batch: &[String]) -> Result<MutationResponse, SyncError> {
		(**self).remove_members(batch).await
	}
}

/// [`CostCenterDirectory`] backed by the GitHub REST API.
pub struct GithubDirectory<T = ReqwestTransport, S = TokioSleeper> {
	client: GithubClient<T, S>,
	team: String,
	cost_center_id: String,
}

impl<T, S> GithubDirectory<T, S>
where
	T: HttpTransport,
	S: Sleeper,
{
	pub fn new(
		client: GithubClient<T, S>,
		team: impl Into<String>,
		cost_center_id: impl Into<String>,
	) -> Self {
		Self {
			client,
			team: team.into(),
			cost_center_id: cost_center_id.into(),
		}
	}

	pub fn client(&self) -> &GithubClient<T, S> {
		&self.client
	}
}

#[async_trait]
impl<T, S> CostCenterDirectory for GithubDirectory<T, S>
where
	T: HttpTransport,
	S: Sleeper,
{
	async fn team_members(&self) -> Result<Vec<String>, SyncError> {
		Ok(self.client.fetch_team_member_logins(&self.team).await?)
	}

	async fn cost_center_members(&self) -> Result<Vec<String>, SyncError> {
		Ok(self.client.fetch_cost_center_users(&self.cost_center_id).await?)
	}

	async fn add_members(&self, batch: &[String]) -> Result<MutationResponse, SyncError> {
		let endpoint = self
			.client
			.cost_center_resource_url(&self.cost_center_id, self.client.config().add_path());
		let response = self
			.client
			.add_cost_center_users(&self.cost_center_id, batch)
			.await?;
		Ok(MutationResponse::from_http(endpoint, response))
	}

	async fn remove_members(&self, batch: &[String]) -> Result<MutationResponse, SyncError> {
		let endpoint = self
			.client
			.cost_center_resource_url(&self.cost_center_id, ResourcePath::Singular);
		let response = self
			.client
			.remove_cost_center_users(&self.cost_center_id, batch)
			.await?;
		Ok(MutationResponse::from_http(endpoint, response))
	}
}
