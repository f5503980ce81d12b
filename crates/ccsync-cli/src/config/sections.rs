// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Configuration sections as partial, mergeable layers.
//!
//! Every field is optional so a layer only overrides what its source sets.
//! Defaults are applied once, when the merged layers are finalized.

use std::path::PathBuf;

use ccsync_common_config::SecretString;
use serde::Deserialize;

/// Top-level layer, one optional table per section.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConfigLayer {
	#[serde(default)]
	pub github: Option<GithubConfigLayer>,
	#[serde(default)]
	pub sync: Option<SyncConfigLayer>,
	#[serde(default)]
	pub retry: Option<RetryConfigLayer>,
	#[serde(default)]
	pub logging: Option<LoggingConfigLayer>,
}

impl ConfigLayer {
	pub fn merge(&mut self, other: ConfigLayer) {
		merge_section(&mut self.github, other.github, GithubConfigLayer::merge);
		merge_section(&mut self.sync, other.sync, SyncConfigLayer::merge);
		merge_section(&mut self.retry, other.retry, RetryConfigLayer::merge);
		merge_section(&mut self.logging, other.logging, LoggingConfigLayer::merge);
	}
}

fn merge_section<T>(slot: &mut Option<T>, other: Option<T>, merge: fn(&mut T, T)) {
	match (slot.as_mut(), other) {
		(Some(current), Some(other)) => merge(current, other),
		(None, Some(other)) => *slot = Some(other),
		(_, None) => {}
	}
}

macro_rules! override_some {
	($self:ident, $other:ident, $($field:ident),+ $(,)?) => {
		$(
			if $other.$field.is_some() {
				$self.$field = $other.$field;
			}
		)+
	};
}

/// `[github]`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GithubConfigLayer {
	#[serde(default)]
	pub api_base: Option<String>,
	#[serde(default)]
	pub enterprise: Option<String>,
	#[serde(default)]
	pub api_version: Option<String>,
	#[serde(default)]
	pub timeout_secs: Option<u64>,
	/// `resource` or `resources`
	#[serde(default)]
	pub add_endpoint: Option<String>,
	/// Only ever set from the environment.
	#[serde(skip)]
	pub token: Option<SecretString>,
}

impl GithubConfigLayer {
	pub fn merge(&mut self, other: GithubConfigLayer) {
		override_some!(self, other, api_base, enterprise, api_version, timeout_secs, add_endpoint, token);
	}
}

/// `[sync]`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SyncConfigLayer {
	#[serde(default)]
	pub team: Option<String>,
	#[serde(default)]
	pub cost_center_id: Option<String>,
	#[serde(default)]
	pub batch_size: Option<usize>,
	#[serde(default)]
	pub inter_batch_min_ms: Option<u64>,
	#[serde(default)]
	pub inter_batch_max_ms: Option<u64>,
	#[serde(default)]
	pub page_delay_min_ms: Option<u64>,
	#[serde(default)]
	pub page_delay_max_ms: Option<u64>,
	#[serde(default)]
	pub report_path: Option<PathBuf>,
}

impl SyncConfigLayer {
	pub fn merge(&mut self, other: SyncConfigLayer) {
		override_some!(
			self,
			other,
			team,
			cost_center_id,
			batch_size,
			inter_batch_min_ms,
			inter_batch_max_ms,
			page_delay_min_ms,
			page_delay_max_ms,
			report_path,
		);
	}
}

/// `[retry]`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RetryConfigLayer {
	#[serde(default)]
	pub max_attempts: Option<u32>,
	#[serde(default)]
	pub max_backoff_secs: Option<u64>,
}

impl RetryConfigLayer {
	pub fn merge(&mut self, other: RetryConfigLayer) {
		override_some!(self, other, max_attempts, max_backoff_secs);
	}
}

/// `[logging]`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoggingConfigLayer {
	#[serde(default)]
	pub level: Option<String>,
}

impl LoggingConfigLayer {
	pub fn merge(&mut self, other: LoggingConfigLayer) {
		override_some!(self, other, level);
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn later_layer_overrides_only_set_fields() {
		let mut base = ConfigLayer {
			github: Some(GithubConfigLayer {
				enterprise: Some("acme".to_string()),
				api_version: Some("2022-11-28".to_string()),
				..Default::default()
			}),
			..Default::default()
		};
		base.merge(ConfigLayer {
			github: Some(GithubConfigLayer {
				enterprise: Some("globex".to_string()),
				..Default::default()
			}),
			sync: Some(SyncConfigLayer {
				batch_size: Some(10),
				..Default::default()
			}),
			..Default::default()
		});

		let github = base.github.unwrap();
		assert_eq!(github.enterprise.as_deref(), Some("globex"));
		assert_eq!(github.api_version.as_deref(), Some("2022-11-28"));
		assert_eq!(base.sync.unwrap().batch_size, Some(10));
	}

	#[test]
	fn empty_layer_changes_nothing() {
		let mut base = ConfigLayer {
			logging: Some(LoggingConfigLayer {
				level: Some("debug".to_string()),
			}),
			..Default::default()
		};
		base.merge(ConfigLayer::default());
		assert_eq!(base.logging.unwrap().level.as_deref(), Some("debug"));
	}

	#[test]
	fn parses_toml_sections() {
		let layer: ConfigLayer = toml::from_str(
			r#"
			[github]
			enterprise = "acme"
			add_endpoint = "resources"

			[sync]
			team = "eng"
			batch_size = 50
			report_path = "out/report.csv"

			[retry]
			max_attempts = 4
			"#,
		)
		.unwrap();

		let github = layer.github.unwrap();
		assert_eq!(github.enterprise.as_deref(), Some("acme"));
		assert_eq!(github.add_endpoint.as_deref(), Some("resources"));
		assert!(github.token.is_none());
		let sync = layer.sync.unwrap();
		assert_eq!(sync.batch_size, Some(50));
		assert_eq!(sync.report_path, Some(PathBuf::from("out/report.csv")));
		assert_eq!(layer.retry.unwrap().max_attempts, Some(4));
	}
}
