// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Configuration sources: defaults, TOML file, environment and command line.

use std::path::PathBuf;

use ccsync_common_config::load_secret_env;
use tracing::{debug, trace};

use super::error::ConfigError;
use super::sections::{
	ConfigLayer, GithubConfigLayer, LoggingConfigLayer, RetryConfigLayer, SyncConfigLayer,
};

/// Source precedence levels (higher = overrides lower).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Precedence {
	Defaults = 10,
	ConfigFile = 20,
	Environment = 50,
	CommandLine = 80,
}

/// Trait for configuration sources.
pub trait ConfigSource: Send + Sync {
	fn name(&self) -> &'static str;
	fn precedence(&self) -> Precedence;
	fn load(&self) -> Result<ConfigLayer, ConfigError>;
}

/// Built-in defaults source. Defaults themselves are applied at finalize
/// time, so this layer is empty.
pub struct DefaultsSource;

impl ConfigSource for DefaultsSource {
	fn name(&self) -> &'static str {
		"defaults"
	}

	fn precedence(&self) -> Precedence {
		Precedence::Defaults
	}

	fn load(&self) -> Result<ConfigLayer, ConfigError> {
		debug!("loading defaults");
		Ok(ConfigLayer::default())
	}
}

/// TOML file configuration source.
pub struct TomlSource {
	path: PathBuf,
	required: bool,
}

impl TomlSource {
	/// A file the user asked for explicitly; it must exist.
	pub fn new(path: impl Into<PathBuf>) -> Self {
		Self {
			path: path.into(),
			required: true,
		}
	}

	/// `./ccsync.toml`, read only if present.
	pub fn working_dir() -> Self {
		Self {
			path: PathBuf::from(super::DEFAULT_CONFIG_FILE),
			required: false,
		}
	}
}

impl ConfigSource for TomlSource {
	fn name(&self) -> &'static str {
		"toml-config"
	}

	fn precedence(&self) -> Precedence {
		Precedence::ConfigFile
	}

	fn load(&self) -> Result<ConfigLayer, ConfigError> {
		if !self.required && !self.path.exists() {
			debug!(path = %self.path.display(), "config file not found, skipping");
			return Ok(ConfigLayer::default());
		}

		debug!(path = %self.path.display(), "loading config file");
		let content = std::fs::read_to_string(&self.path).map_err(|e| ConfigError::FileRead {
			path: self.path.clone(),
			source: e,
		})?;

		parse_toml(&content).map_err(|e| match e {
			TomlProblem::Parse(source) => ConfigError::TomlParse {
				path: self.path.clone(),
				source,
			},
			TomlProblem::Token => ConfigError::validation(format!(
				"{} contains github.token; supply the token through GITHUB_TOKEN or GITHUB_TOKEN_FILE",
				self.path.display()
			)),
		})
	}
}

enum TomlProblem {
	Parse(toml::de::Error),
	Token,
}

fn parse_toml(content: &str) -> Result<ConfigLayer, TomlProblem> {
	let table: toml::Table = toml::from_str(content).map_err(TomlProblem::Parse)?;
	let has_token = table
		.get("github")
		.and_then(|github| github.get("token"))
		.is_some();
	if has_token {
		return Err(TomlProblem::Token);
	}

	let layer: ConfigLayer = toml::from_str(content).map_err(TomlProblem::Parse)?;
	trace!("parsed config layer from TOML");
	Ok(layer)
}

/// Environment variable source.
///
/// Names follow the `GITHUB_*` convention shared with GitHub Actions, plus a
/// few tuning knobs. The token may come from `GITHUB_TOKEN_FILE` instead.
pub struct EnvSource;

impl ConfigSource for EnvSource {
	fn name(&self) -> &'static str {
		"environment"
	}

	fn precedence(&self) -> Precedence {
		Precedence::Environment
	}

	fn load(&self) -> Result<ConfigLayer, ConfigError> {
		debug!("loading environment variables");
		let mut layer = layer_from_env(|name| std::env::var(name).ok())?;
		let token = load_secret_env("GITHUB_TOKEN").map_err(|e| ConfigError::Secret(e.to_string()))?;
		if let Some(github) = layer.github.as_mut() {
			github.token = token;
		}
		Ok(layer)
	}
}

/// Reads every non-secret variable through `lookup`. Empty values count as
/// unset.
pub(crate) fn layer_from_env(
	lookup: impl Fn(&str) -> Option<String>,
) -> Result<ConfigLayer, ConfigError> {
	let var = |name: &str| lookup(name).filter(|s| !s.trim().is_empty());

	Ok(ConfigLayer {
		github: Some(GithubConfigLayer {
			api_base: var("GITHUB_API_BASE"),
			enterprise: var("GITHUB_ENTERPRISE"),
			api_version: var("GITHUB_API_VERSION"),
			timeout_secs: None,
			add_endpoint: var("GITHUB_ADD_ENDPOINT"),
			token: None,
		}),
		sync: Some(SyncConfigLayer {
			team: var("GITHUB_TEAM_SLUG"),
			cost_center_id: var("GITHUB_COST_CENTER_ID"),
			batch_size: parse_var(&var, "CHUNK_SIZE")?,
			inter_batch_min_ms: seconds_as_ms(&var, "INTER_BATCH_SLEEP_MIN")?,
			inter_batch_max_ms: seconds_as_ms(&var, "INTER_BATCH_SLEEP_MAX")?,
			page_delay_min_ms: None,
			page_delay_max_ms: None,
			report_path: var("OUTPUT_CSV").map(PathBuf::from),
		}),
		retry: Some(RetryConfigLayer {
			max_attempts: parse_var(&var, "MAX_RETRIES")?,
			max_backoff_secs: None,
		}),
		logging: Some(LoggingConfigLayer {
			level: var("CCSYNC_LOG_LEVEL"),
		}),
	})
}

fn parse_var<T: std::str::FromStr>(
	var: &impl Fn(&str) -> Option<String>,
	name: &str,
) -> Result<Option<T>, ConfigError> {
	match var(name) {
		Some(v) => v.trim().parse().map(Some).map_err(|_| {
			ConfigError::invalid_value(name, format!("'{v}' is not a valid {}", type_label::<T>()))
		}),
		None => Ok(None),
	}
}

fn type_label<T>() -> &'static str {
	let full = std::any::type_name::<T>();
	full.rsplit("::").next().unwrap_or(full)
}

/// Reads fractional seconds (`0.5`) and converts them to milliseconds.
fn seconds_as_ms(
	var: &impl Fn(&str) -> Option<String>,
	name: &str,
) -> Result<Option<u64>, ConfigError> {
	let Some(secs) = parse_var::<f64>(var, name)? else {
		return Ok(None);
	};
	if !secs.is_finite() || secs < 0.0 {
		return Err(ConfigError::invalid_value(
			name,
			format!("'{secs}' must be a non-negative number of seconds"),
		));
	}
	Ok(Some((secs * 1000.0).round() as u64))
}

/// Command-line overrides, already collected into a layer by the caller.
pub struct CliSource {
	layer: ConfigLayer,
}

impl CliSource {
	pub fn new(layer: ConfigLayer) -> Self {
		Self { layer }
	}
}

impl ConfigSource for CliSource {
	fn name(&self) -> &'static str {
		"command-line"
	}

	fn precedence(&self) -> Precedence {
		Precedence::CommandLine
	}

	fn load(&self) -> Result<ConfigLayer, ConfigError> {
		debug!("applying command-line overrides");
		Ok(self.layer.clone())
	}
}
