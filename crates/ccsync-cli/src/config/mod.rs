// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Layered configuration for the `ccsync` binary.
//!
//! Precedence (highest to lowest):
//! 1. Command-line flags
//! 2. Environment variables (`GITHUB_*`, `.env` included)
//! 3. Config file (`--config`, `CCSYNC_CONFIG` or `./ccsync.toml`)
//! 4. Built-in defaults

mod error;
mod sections;
mod sources;

use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::time::Duration;

use ccsync_common_config::SecretString;
use ccsync_common_http::{Pacing, RetryConfig};
use ccsync_github::config::{DEFAULT_API_VERSION, DEFAULT_BASE_URL, DEFAULT_TIMEOUT};
use ccsync_github::{GithubConfig, ResourcePath};
use ccsync_sync::{SyncOptions, DEFAULT_BATCH_SIZE};
use tracing::{debug, info};

pub use error::ConfigError;
pub use sections::{ConfigLayer, GithubConfigLayer, SyncConfigLayer};
use sources::{CliSource, ConfigSource, DefaultsSource, EnvSource, TomlSource};

pub const DEFAULT_CONFIG_FILE: &str = "ccsync.toml";
pub const DEFAULT_REPORT_PATH: &str = "synced_users.csv";
pub const DEFAULT_LOG_LEVEL: &str = "info";

const DEFAULT_INTER_BATCH_MIN_MS: u64 = 500;
const DEFAULT_INTER_BATCH_MAX_MS: u64 = 1500;
const DEFAULT_PAGE_DELAY_MIN_MS: u64 = 100;
const DEFAULT_PAGE_DELAY_MAX_MS: u64 = 300;

/// Fully resolved configuration. Identity fields stay optional here because
/// each command needs a different subset; the `*_settings` methods check
/// them.
#[derive(Debug, Clone)]
pub struct CcsyncConfig {
	pub api_base: String,
	pub enterprise: Option<String>,
	pub team: Option<String>,
	pub cost_center_id: Option<String>,
	pub token: Option<SecretString>,
	pub api_version: String,
	pub timeout: Duration,
	pub add_path: ResourcePath,
	pub batch_size: NonZeroUsize,
	pub inter_batch: Pacing,
	pub page_pacing: Pacing,
	pub report_path: PathBuf,
	pub retry: RetryConfig,
	pub log_level: String,
}

/// Everything `ccsync sync` needs.
#[derive(Debug, Clone)]
pub struct SyncSettings {
	pub github: GithubConfig,
	pub team: String,
	pub cost_center_id: String,
	pub options: SyncOptions,
	pub report_path: PathBuf,
}

/// Everything `ccsync export` needs.
#[derive(Debug, Clone)]
pub struct ExportSettings {
	pub github: GithubConfig,
	pub team: String,
}

/// Everything `ccsync team-add` needs. Enterprise and team are per-row
/// fallbacks.
#[derive(Debug, Clone)]
pub struct TeamAddSettings {
	pub github: GithubConfig,
	pub default_enterprise: Option<String>,
	pub default_team: Option<String>,
}

/// Everything `ccsync cost-center-add` needs.
#[derive(Debug, Clone)]
pub struct CostCenterAddSettings {
	pub github: GithubConfig,
	pub cost_center_id: String,
	pub options: SyncOptions,
	pub report_path: PathBuf,
}

impl CcsyncConfig {
	pub fn sync_settings(&self, dry_run: bool) -> Result<SyncSettings, ConfigError> {
		let mut missing = Vec::new();
		let enterprise = required(&self.enterprise, "GITHUB_ENTERPRISE", &mut missing);
		let team = required(&self.team, "GITHUB_TEAM_SLUG", &mut missing);
		let cost_center_id = required(&self.cost_center_id, "GITHUB_COST_CENTER_ID", &mut missing);
		let token = required(&self.token, "GITHUB_TOKEN", &mut missing);

		let (Some(enterprise), Some(team), Some(cost_center_id), Some(token)) =
			(enterprise, team, cost_center_id, token)
		else {
			return Err(ConfigError::Missing(missing));
		};

		Ok(SyncSettings {
			github: self.github_config(enterprise, token)?,
			team,
			cost_center_id,
			options: SyncOptions {
				batch_size: self.batch_size,
				dry_run,
				inter_batch: self.inter_batch,
			},
			report_path: self.report_path.clone(),
		})
	}

	pub fn export_settings(&self) -> Result<ExportSettings, ConfigError> {
		let mut missing = Vec::new();
		let enterprise = required(&self.enterprise, "GITHUB_ENTERPRISE", &mut missing);
		let team = required(&self.team, "GITHUB_TEAM_SLUG", &mut missing);
		let token = required(&self.token, "GITHUB_TOKEN", &mut missing);

		let (Some(enterprise), Some(team), Some(token)) = (enterprise, team, token) else {
			return Err(ConfigError::Missing(missing));
		};

		Ok(ExportSettings {
			github: self.github_config(enterprise, token)?,
			team,
		})
	}

	pub fn team_add_settings(&self) -> Result<TeamAddSettings, ConfigError> {
		let mut missing = Vec::new();
		let Some(token) = required(&self.token, "GITHUB_TOKEN", &mut missing) else {
			return Err(ConfigError::Missing(missing));
		};

		Ok(TeamAddSettings {
			github: self.github_config(self.enterprise.clone().unwrap_or_default(), token)?,
			default_enterprise: self.enterprise.clone(),
			default_team: self.team.clone(),
		})
	}

	pub fn cost_center_add_settings(&self) -> Result<CostCenterAddSettings, ConfigError> {
		let mut missing = Vec::new();
		let enterprise = required(&self.enterprise, "GITHUB_ENTERPRISE", &mut missing);
		let cost_center_id = required(&self.cost_center_id, "GITHUB_COST_CENTER_ID", &mut missing);
		let token = required(&self.token, "GITHUB_TOKEN", &mut missing);

		let (Some(enterprise), Some(cost_center_id), Some(token)) =
			(enterprise, cost_center_id, token)
		else {
			return Err(ConfigError::Missing(missing));
		};

		Ok(CostCenterAddSettings {
			github: self.github_config(enterprise, token)?,
			cost_center_id,
			options: SyncOptions {
				batch_size: self.batch_size,
				dry_run: false,
				inter_batch: self.inter_batch,
			},
			report_path: self.report_path.clone(),
		})
	}

	fn github_config(
		&self,
		enterprise: String,
		token: SecretString,
	) -> Result<GithubConfig, ConfigError> {
		GithubConfig::new(enterprise, token)
			.with_base_url(&self.api_base)
			.map_err(|e| ConfigError::invalid_value("GITHUB_API_BASE", e.to_string()))
			.map(|config| {
				config
					.with_api_version(self.api_version.clone())
					.with_timeout(self.timeout)
					.with_add_path(self.add_path)
					.with_page_pacing(self.page_pacing)
					.with_retry_config(self.retry.clone())
			})
	}
}

fn required<T: Clone>(value: &Option<T>, key: &'static str, missing: &mut Vec<&'static str>) -> Option<T> {
	if value.is_none() {
		missing.push(key);
	}
	value.clone()
}

/// Where the config file comes from.
#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
	/// Explicit `--config` / `CCSYNC_CONFIG` path.
	pub config_path: Option<PathBuf>,
	/// Flag overrides.
	pub cli: ConfigLayer,
}

/// Load configuration from all sources with standard precedence.
pub fn load_config(options: LoadOptions) -> Result<CcsyncConfig, ConfigError> {
	let toml = match &options.config_path {
		Some(path) => TomlSource::new(path),
		None => TomlSource::working_dir(),
	};

	let mut sources: Vec<Box<dyn ConfigSource>> = vec![
		Box::new(DefaultsSource),
		Box::new(toml),
		Box::new(EnvSource),
		Box::new(CliSource::new(options.cli)),
	];

	sources.sort_by_key(|s| s.precedence());

	let mut merged = ConfigLayer::default();
	for source in sources {
		debug!(source = source.name(), "loading configuration source");
		let layer = source.load()?;
		merged.merge(layer);
	}

	finalize(merged)
}

/// Load configuration from a single file plus explicit overrides, ignoring
/// the process environment.
#[cfg(test)]
fn load_config_from_file(
	path: impl AsRef<std::path::Path>,
	overrides: ConfigLayer,
) -> Result<CcsyncConfig, ConfigError> {
	let mut merged = TomlSource::new(path.as_ref()).load()?;
	merged.merge(overrides);
	finalize(merged)
}

/// Applies defaults and validates value ranges.
fn finalize(layer: ConfigLayer) -> Result<CcsyncConfig, ConfigError> {
	let github = layer.github.unwrap_or_default();
	let sync = layer.sync.unwrap_or_default();
	let retry = layer.retry.unwrap_or_default();
	let logging = layer.logging.unwrap_or_default();

	let add_path = match github.add_endpoint.as_deref() {
		Some(raw) => raw
			.parse::<ResourcePath>()
			.map_err(|e| ConfigError::invalid_value("github.add_endpoint", e.to_string()))?,
		None => ResourcePath::default(),
	};

	let batch_size = match sync.batch_size {
		Some(n) => NonZeroUsize::new(n)
			.ok_or_else(|| ConfigError::invalid_value("sync.batch_size", "must be at least 1"))?,
		None => DEFAULT_BATCH_SIZE,
	};

	let timeout = match github.timeout_secs {
		Some(0) => return Err(ConfigError::invalid_value("github.timeout_secs", "must be at least 1")),
		Some(secs) => Duration::from_secs(secs),
		None => DEFAULT_TIMEOUT,
	};

	let mut retry_config = RetryConfig::default();
	if let Some(attempts) = retry.max_attempts {
		if attempts == 0 {
			return Err(ConfigError::invalid_value("retry.max_attempts", "must be at least 1"));
		}
		retry_config.max_attempts = attempts;
	}
	if let Some(secs) = retry.max_backoff_secs {
		retry_config.max_delay = Duration::from_secs(secs);
	}

	let inter_batch = pacing(
		sync.inter_batch_min_ms.unwrap_or(DEFAULT_INTER_BATCH_MIN_MS),
		sync.inter_batch_max_ms.unwrap_or(DEFAULT_INTER_BATCH_MAX_MS),
	);
	let page_pacing = pacing(
		sync.page_delay_min_ms.unwrap_or(DEFAULT_PAGE_DELAY_MIN_MS),
		sync.page_delay_max_ms.unwrap_or(DEFAULT_PAGE_DELAY_MAX_MS),
	);

	let config = CcsyncConfig {
		api_base: github.api_base.unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
		enterprise: github.enterprise,
		team: sync.team,
		cost_center_id: sync.cost_center_id,
		token: github.token,
		api_version: github
			.api_version
			.unwrap_or_else(|| DEFAULT_API_VERSION.to_string()),
		timeout,
		add_path,
		batch_size,
		inter_batch,
		page_pacing,
		report_path: sync
			.report_path
			.unwrap_or_else(|| PathBuf::from(DEFAULT_REPORT_PATH)),
		retry: retry_config,
		log_level: logging
			.level
			.unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string()),
	};

	info!(
		api_base = %config.api_base,
		enterprise = config.enterprise.as_deref().unwrap_or("-"),
		team = config.team.as_deref().unwrap_or("-"),
		cost_center = config.cost_center_id.as_deref().unwrap_or("-"),
		token_configured = config.token.is_some(),
		batch_size = config.batch_size.get(),
		add_path = %config.add_path,
		"configuration loaded"
	);

	Ok(config)
}

fn pacing(min_ms: u64, max_ms: u64) -> Pacing {
	Pacing::new(Duration::from_millis(min_ms), Duration::from_millis(max_ms))
}

#[cfg(test)]
mod tests {
	use super::*;
	use ccsync_common_config::Secret;
	use std::io::Write;
	use tempfile::NamedTempFile;

	fn complete_layer() -> ConfigLayer {
		ConfigLayer {
			github: Some(GithubConfigLayer {
				enterprise: Some("acme".to_string()),
				token: Some(Secret::new("ghp_test".to_string())),
				..Default::default()
			}),
			sync: Some(SyncConfigLayer {
				team: Some("eng".to_string()),
				cost_center_id: Some("cc-1".to_string()),
				..Default::default()
			}),
			..Default::default()
		}
	}

	#[test]
	fn defaults_apply_when_unset() {
		let config = finalize(ConfigLayer::default()).unwrap();

		assert_eq!(config.api_base, DEFAULT_BASE_URL);
		assert_eq!(config.api_version, DEFAULT_API_VERSION);
		assert_eq!(config.batch_size.get(), 25);
		assert_eq!(config.add_path, ResourcePath::Singular);
		assert_eq!(config.report_path, PathBuf::from(DEFAULT_REPORT_PATH));
		assert_eq!(config.retry.max_attempts, 8);
		assert_eq!(config.inter_batch.min(), Duration::from_millis(500));
		assert_eq!(config.inter_batch.max(), Duration::from_millis(1500));
		assert_eq!(config.page_pacing.max(), Duration::from_millis(300));
		assert_eq!(config.log_level, "info");
	}

	/// Every missing key is listed at once, in a stable order.
	#[test]
	fn sync_reports_all_missing_keys() {
		let err = finalize(ConfigLayer::default())
			.unwrap()
			.sync_settings(false)
			.unwrap_err();

		assert_eq!(
			err.to_string(),
			"missing required configuration: GITHUB_ENTERPRISE, GITHUB_TEAM_SLUG, \
			 GITHUB_COST_CENTER_ID, GITHUB_TOKEN"
		);
	}

	#[test]
	fn export_does_not_need_cost_center() {
		let mut layer = complete_layer();
		layer.sync.as_mut().unwrap().cost_center_id = None;

		let settings = finalize(layer).unwrap().export_settings().unwrap();
		assert_eq!(settings.team, "eng");
		assert_eq!(settings.github.enterprise(), "acme");
	}

	#[test]
	fn cost_center_add_does_not_need_team() {
		let mut layer = complete_layer();
		layer.sync.as_mut().unwrap().team = None;

		let settings = finalize(layer).unwrap().cost_center_add_settings().unwrap();
		assert_eq!(settings.cost_center_id, "cc-1");
		assert_eq!(settings.options.batch_size.get(), 25);
		assert!(!settings.options.dry_run);

		let err = finalize(ConfigLayer::default())
			.unwrap()
			.cost_center_add_settings()
			.unwrap_err();
		assert_eq!(
			err.to_string(),
			"missing required configuration: GITHUB_ENTERPRISE, GITHUB_COST_CENTER_ID, GITHUB_TOKEN"
		);
	}

	#[test]
	fn team_add_only_needs_token() {
		let layer = ConfigLayer {
			github: Some(GithubConfigLayer {
				token: Some(Secret::new("ghp_test".to_string())),
				..Default::default()
			}),
			..Default::default()
		};

		let settings = finalize(layer).unwrap().team_add_settings().unwrap();
		assert!(settings.default_enterprise.is_none());
		assert!(settings.default_team.is_none());

		let err = finalize(ConfigLayer::default())
			.unwrap()
			.team_add_settings()
			.unwrap_err();
		assert_eq!(err.to_string(), "missing required configuration: GITHUB_TOKEN");
	}

	#[test]
	fn sync_settings_carry_tuning() {
		let mut layer = complete_layer();
		layer.merge(ConfigLayer {
			github: Some(GithubConfigLayer {
				add_endpoint: Some("resources".to_string()),
				..Default::default()
			}),
			sync: Some(SyncConfigLayer {
				batch_size: Some(10),
				inter_batch_min_ms: Some(0),
				inter_batch_max_ms: Some(0),
				..Default::default()
			}),
			..Default::default()
		});

		let settings = finalize(layer).unwrap().sync_settings(true).unwrap();
		assert_eq!(settings.options.batch_size.get(), 10);
		assert!(settings.options.dry_run);
		assert!(settings.options.inter_batch.is_disabled());
		assert_eq!(settings.github.add_path(), ResourcePath::Plural);
		assert_eq!(settings.cost_center_id, "cc-1");
	}

	#[test]
	fn zero_batch_size_is_rejected() {
		let layer = ConfigLayer {
			sync: Some(SyncConfigLayer {
				batch_size: Some(0),
				..Default::default()
			}),
			..Default::default()
		};
		let err = finalize(layer).unwrap_err();
		assert!(err.to_string().contains("sync.batch_size"));
	}

	#[test]
	fn unknown_add_endpoint_is_rejected() {
		let layer = ConfigLayer {
			github: Some(GithubConfigLayer {
				add_endpoint: Some("users".to_string()),
				..Default::default()
			}),
			..Default::default()
		};
		assert!(finalize(layer).is_err());
	}

	#[test]
	fn insecure_base_url_is_rejected_when_building_client_config() {
		let mut layer = complete_layer();
		layer.github.as_mut().unwrap().api_base = Some("http://ghe.example.com".to_string());

		let err = finalize(layer).unwrap().sync_settings(false).unwrap_err();
		assert!(err.to_string().contains("GITHUB_API_BASE"));
	}

	#[test]
	fn file_values_yield_to_overrides() {
		let mut file = NamedTempFile::new().unwrap();
		writeln!(
			file,
			"[github]\nenterprise = \"from-file\"\n\n[sync]\nteam = \"file-team\"\nbatch_size = 5"
		)
		.unwrap();

		let overrides = ConfigLayer {
			sync: Some(SyncConfigLayer {
				team: Some("cli-team".to_string()),
				..Default::default()
			}),
			..Default::default()
		};
		let config = load_config_from_file(file.path(), overrides).unwrap();

		assert_eq!(config.enterprise.as_deref(), Some("from-file"));
		assert_eq!(config.team.as_deref(), Some("cli-team"));
		assert_eq!(config.batch_size.get(), 5);
	}
}
