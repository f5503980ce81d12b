// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Configuration for the GitHub client.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use ccsync_common_config::SecretString;
use ccsync_common_http::{Pacing, RetryConfig};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};
use reqwest::Url;

use crate::error::GithubError;

pub const DEFAULT_BASE_URL: &str = "https://api.github.com";
pub const DEFAULT_API_VERSION: &str = "2022-11-28";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

const ACCEPT_GITHUB_JSON: &str = "application/vnd.github+json";
const API_VERSION_HEADER: &str = "x-github-api-version";

/// Final path segment used when adding users to a cost center.
///
/// Both spellings have been documented for the add call; removal always uses
/// the singular form.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ResourcePath {
	#[default]
	Singular,
	Plural,
}

impl ResourcePath {
	pub fn as_str(&self) -> &'static str {
		match self {
			Self::Singular => "resource",
			Self::Plural => "resources",
		}
	}
}

impl fmt::Display for ResourcePath {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl FromStr for ResourcePath {
	type Err = GithubError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.trim().to_ascii_lowercase().as_str() {
			"resource" => Ok(Self::Singular),
			"resources" => Ok(Self::Plural),
			other => Err(GithubError::config(format!(
				"add endpoint must be 'resource' or 'resources', got '{other}'"
			))),
		}
	}
}

/// Connection settings for one enterprise.
///
/// The token is held as a [`SecretString`] and only exposed when building the
/// `Authorization` header.
#[derive(Clone)]
pub struct GithubConfig {
	base_url: String,
	enterprise: String,
	token: SecretString,
	api_version: String,
	timeout: Duration,
	add_path: ResourcePath,
	page_pacing: Pacing,
	pub retry_config: RetryConfig,
}

impl fmt::Debug for GithubConfig {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("GithubConfig")
			.field("base_url", &self.base_url)
			.field("enterprise", &self.enterprise)
			.field("token", &self.token)
			.field("api_version", &self.api_version)
			.field("timeout", &self.timeout)
			.field("add_path", &self.add_path)
			.field("page_pacing", &self.page_pacing)
			.field("retry_config", &self.retry_config)
			.finish()
	}
}

impl GithubConfig {
	/// Creates a configuration against the public API with default settings.
	pub fn new(enterprise: impl Into<String>, token: SecretString) -> Self {
		Self {
			base_url: DEFAULT_BASE_URL.to_string(),
			enterprise: enterprise.into(),
			token,
			api_version: DEFAULT_API_VERSION.to_string(),
			timeout: DEFAULT_TIMEOUT,
			add_path: ResourcePath::default(),
			page_pacing: Pacing::disabled(),
			retry_config: RetryConfig::default(),
		}
	}

	/// Validate and normalize a base URL.
	///
	/// Requirements:
	/// - Must be a valid URL with a host
	/// - Must use HTTPS, except for loopback hosts
	/// - Trailing slashes are dropped
	fn validate_and_normalize_base_url(raw: &str) -> Result<String, GithubError> {
		let url = Url::parse(raw.trim())
			.map_err(|e| GithubError::config(format!("invalid GitHub API base URL '{raw}': {e}")))?;

		let host = url
			.host_str()
			.ok_or_else(|| GithubError::config("GitHub API base URL must include a host"))?;
		let loopback = matches!(host, "localhost" | "127.0.0.1" | "[::1]" | "::1");

		match url.scheme() {
			"https" => {}
			"http" if loopback => {}
			scheme => {
				return Err(GithubError::config(format!(
					"GitHub API base URL must use https, got '{scheme}'"
				)))
			}
		}

		Ok(url.as_str().trim_end_matches('/').to_string())
	}

	pub fn with_base_url(mut self, raw: &str) -> Result<Self, GithubError> {
		self.base_url = Self::validate_and_normalize_base_url(raw)?;
		Ok(self)
	}

	pub fn with_api_version(mut self, version: impl Into<String>) -> Self {
		self.api_version = version.into();
		self
	}

	pub fn with_timeout(mut self, timeout: Duration) -> Self {
		self.timeout = timeout;
		self
	}

	pub fn with_add_path(mut self, add_path: ResourcePath) -> Self {
		self.add_path = add_path;
		self
	}

	/// Pause inserted between consecutive page requests.
	pub fn with_page_pacing(mut self, pacing: Pacing) -> Self {
		self.page_pacing = pacing;
		self
	}

	pub fn with_retry_config(mut self, retry_config: RetryConfig) -> Self {
		self.retry_config = retry_config;
		self
	}

	pub fn base_url(&self) -> &str {
		&self.base_url
	}

	pub fn enterprise(&self) -> &str {
		&self.enterprise
	}

	pub fn api_version(&self) -> &str {
		&self.api_version
	}

	pub fn timeout(&self) -> Duration {
		self.timeout
	}

	pub fn add_path(&self) -> ResourcePath {
		self.add_path
	}

	pub fn page_pacing(&self) -> Pacing {
		self.page_pacing
	}

	/// Joins `path` (which must start with `/`) onto the base URL, keeping any
	/// path prefix the base carries (e.g. `/api/v3` on GitHub Enterprise Server).
	pub fn endpoint(&self, path: &str) -> String {
		format!("{}{}", self.base_url, path)
	}

	/// Headers sent with every request.
	pub fn default_headers(&self) -> Result<HeaderMap, GithubError> {
		let mut headers = HeaderMap::new();

		let mut auth = HeaderValue::from_str(&format!("Bearer {}", self.token.expose()))
			.map_err(|_| GithubError::config("GitHub token contains invalid header characters"))?;
		auth.set_sensitive(true);
		headers.insert(AUTHORIZATION, auth);

		headers.insert(ACCEPT, HeaderValue::from_static(ACCEPT_GITHUB_JSON));

		let version = HeaderValue::from_str(&self.api_version).map_err(|_| {
			GithubError::config(format!("invalid GitHub API version '{}'", self.api_version))
		})?;
		headers.insert(API_VERSION_HEADER, version);

		Ok(headers)
	}
}
