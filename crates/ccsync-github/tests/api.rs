// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! End-to-end tests of the GitHub client against a mock HTTP server.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use ccsync_common_config::Secret;
use ccsync_github::{GithubClient, GithubConfig, GithubError, ResourcePath, RetryConfig, MAX_PAGES};
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

const TEAM_PATH: &str = "/enterprises/acme/teams/eng/memberships";
const COST_CENTER_PATH: &str = "/enterprises/acme/settings/billing/cost-centers/cc-1";

fn client(server: &MockServer) -> GithubClient {
	let config = GithubConfig::new("acme", Secret::new("test-token".to_string()))
		.with_base_url(&server.uri())
		.unwrap()
		.with_retry_config(RetryConfig {
			max_attempts: 3,
			..Default::default()
		});
	GithubClient::new(config).unwrap()
}

/// Answers every request with one member and a link to the following page.
struct EndlessPages {
	base: String,
	served: Arc<AtomicUsize>,
}

impl Respond for EndlessPages {
	fn respond(&self, _request: &Request) -> ResponseTemplate {
		let n = self.served.fetch_add(1, Ordering::SeqCst) + 1;
		let next = format!("<{}{TEAM_PATH}?page={}>; rel=\"next\"", self.base, n + 1);
		ResponseTemplate::new(200)
			.insert_header("link", next.as_str())
			.set_body_json(json!([{"user": {"login": format!("user{n}")}}]))
	}
}

#[tokio::test]
async fn team_members_are_collected_across_pages() {
	let server = MockServer::start().await;
	let next = format!("<{}{TEAM_PATH}?page=2>; rel=\"next\"", server.uri());

	Mock::given(method("GET"))
		.and(path(TEAM_PATH))
		.and(query_param("page", "2"))
		.respond_with(ResponseTemplate::new(200).set_body_json(json!({
			"items": [{"login": "carol"}, {"user": {"login": "alice"}}]
		})))
		.expect(1)
		.mount(&server)
		.await;

	Mock::given(method("GET"))
		.and(path(TEAM_PATH))
		.and(header("authorization", "Bearer test-token"))
		.and(header("x-github-api-version", "2022-11-28"))
		.respond_with(
			ResponseTemplate::new(200)
				.insert_header("link", next.as_str())
				.set_body_json(json!([{"user": {"login": "alice"}}, {"user": {"login": "bob"}}])),
		)
		.mount(&server)
		.await;

	let logins = client(&server).fetch_team_member_logins("eng").await.unwrap();
	assert_eq!(logins, vec!["alice", "bob", "carol", "alice"]);
}

#[tokio::test]
async fn pagination_loop_aborts_after_ceiling() {
	let server = MockServer::start().await;
	let served = Arc::new(AtomicUsize::new(0));

	Mock::given(method("GET"))
		.and(path(TEAM_PATH))
		.respond_with(EndlessPages {
			base: server.uri(),
			served: served.clone(),
		})
		.mount(&server)
		.await;

	let err = client(&server).fetch_team_member_logins("eng").await.unwrap_err();

	assert!(matches!(err, GithubError::PaginationLoop { pages: MAX_PAGES, .. }));
	assert_eq!(served.load(Ordering::SeqCst), MAX_PAGES);
}

#[tokio::test]
async fn throttled_page_is_retried() {
	let server = MockServer::start().await;

	Mock::given(method("GET"))
		.and(path(TEAM_PATH))
		.respond_with(ResponseTemplate::new(429).insert_header("retry-after", "0"))
		.up_to_n_times(1)
		.mount(&server)
		.await;

	Mock::given(method("GET"))
		.and(path(TEAM_PATH))
		.respond_with(ResponseTemplate::new(200).set_body_json(json!([{"login": "alice"}])))
		.mount(&server)
		.await;

	let logins = client(&server).fetch_team_member_logins("eng").await.unwrap();
	assert_eq!(logins, vec!["alice"]);
}

#[tokio::test]
async fn cost_center_users_filter_non_user_resources() {
	let server = MockServer::start().await;

	Mock::given(method("GET"))
		.and(path(COST_CENTER_PATH))
		.respond_with(ResponseTemplate::new(200).set_body_json(json!({
			"id": "cc-1",
			"name": "Engineering",
			"resources": [
				{"type": "User", "name": "bob"},
				{"type": "Org", "name": "acme"},
				{"type": "User", "name": "dan"}
			]
		})))
		.mount(&server)
		.await;

	let users = client(&server).fetch_cost_center_users("cc-1").await.unwrap();
	assert_eq!(users, vec!["bob", "dan"]);
}

#[tokio::test]
async fn missing_cost_center_is_empty() {
	let server = MockServer::start().await;

	Mock::given(method("GET"))
		.and(path(COST_CENTER_PATH))
		.respond_with(ResponseTemplate::new(404).set_body_json(json!({"message": "Not Found"})))
		.mount(&server)
		.await;

	let users = client(&server).fetch_cost_center_users("cc-1").await.unwrap();
	assert!(users.is_empty());
}

#[tokio::test]
async fn unauthorized_cost_center_fetch_is_fatal() {
	let server = MockServer::start().await;

	Mock::given(method("GET"))
		.and(path(COST_CENTER_PATH))
		.respond_with(ResponseTemplate::new(401).set_body_json(json!({"message": "Bad credentials"})))
		.mount(&server)
		.await;

	let err = client(&server).fetch_cost_center_users("cc-1").await.unwrap_err();
	let text = err.to_string();
	assert!(text.contains("HTTP 401"));
	assert!(text.contains(COST_CENTER_PATH));
	assert!(text.contains("Bad credentials"));
}

#[tokio::test]
async fn add_and_remove_hit_their_endpoints() {
	let server = MockServer::start().await;
	let users = vec!["alice".to_string(), "carol".to_string()];

	Mock::given(method("POST"))
		.and(path(format!("{COST_CENTER_PATH}/resource")))
		.and(body_json(json!({"users": ["alice", "carol"]})))
		.respond_with(ResponseTemplate::new(201))
		.expect(1)
		.mount(&server)
		.await;

	Mock::given(method("DELETE"))
		.and(path(format!("{COST_CENTER_PATH}/resource")))
		.and(body_json(json!({"users": ["alice", "carol"]})))
		.respond_with(ResponseTemplate::new(400).set_body_string("No resources to remove"))
		.expect(1)
		.mount(&server)
		.await;

	let client = client(&server);
	let added = client.add_cost_center_users("cc-1", &users).await.unwrap();
	let removed = client.remove_cost_center_users("cc-1", &users).await.unwrap();

	assert_eq!(added.status, 201);
	assert_eq!(removed.status, 400);
	assert_eq!(removed.body, "No resources to remove");
}

#[tokio::test]
async fn plural_add_path_is_honoured() {
	let server = MockServer::start().await;

	Mock::given(method("POST"))
		.and(path(format!("{COST_CENTER_PATH}/resources")))
		.respond_with(ResponseTemplate::new(200))
		.expect(1)
		.mount(&server)
		.await;

	let config = GithubConfig::new("acme", Secret::new("test-token".to_string()))
		.with_base_url(&server.uri())
		.unwrap()
		.with_add_path(ResourcePath::Plural);
	let client = GithubClient::new(config).unwrap();

	let response = client
		.add_cost_center_users("cc-1", &["alice".to_string()])
		.await
		.unwrap();
	assert_eq!(response.status, 200);
}
