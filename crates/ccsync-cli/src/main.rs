// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! `ccsync`: keeps a GitHub billing cost center in step with an enterprise
//! team.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::{
	layer::SubscriberExt, reload, util::SubscriberInitExt, EnvFilter, Registry,
};

mod commands;
mod config;
mod members;
mod report;
mod version;

use config::{ConfigLayer, GithubConfigLayer, LoadOptions, SyncConfigLayer};

const DEFAULT_EXPORT_PATH: &str = "team_memberships.csv";
const DEFAULT_MEMBERS_PATH: &str = "members.csv";
const DEFAULT_USERS_PATH: &str = "users.csv";
const LOG_LEVEL_ENV: &str = "CCSYNC_LOG_LEVEL";

type FilterHandle = reload::Handle<EnvFilter, Registry>;

/// Reconcile an enterprise team with a billing cost center.
#[derive(Parser, Debug)]
#[command(name = "ccsync", about = "Enterprise team to cost center sync", version)]
struct Args {
	/// Config file (default: ./ccsync.toml if present)
	#[arg(long, global = true, env = "CCSYNC_CONFIG")]
	config: Option<PathBuf>,

	/// Enterprise slug
	#[arg(long, global = true)]
	enterprise: Option<String>,

	/// API base URL, e.g. https://api.github.com
	#[arg(long, global = true)]
	api_base: Option<String>,

	/// Log output format
	#[arg(long, global = true, value_enum, default_value_t = LogFormat::Text)]
	log_format: LogFormat,

	#[command(subcommand)]
	command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
	/// Add team members missing from the cost center and remove users who
	/// left the team
	Sync {
		/// Compute and report the plan without changing anything
		#[arg(long)]
		dry_run: bool,

		/// Team slug
		#[arg(long)]
		team: Option<String>,

		/// Cost center id
		#[arg(long)]
		cost_center: Option<String>,

		/// Users per add/remove call
		#[arg(long)]
		batch_size: Option<usize>,

		/// Report destination (default: synced_users.csv)
		#[arg(long)]
		report: Option<PathBuf>,
	},

	/// Write every membership of a team to CSV
	Export {
		/// Team slug
		#[arg(long)]
		team: Option<String>,

		/// Output file
		#[arg(long, short, default_value = DEFAULT_EXPORT_PATH)]
		output: PathBuf,
	},

	/// Add the users listed in a CSV file to enterprise teams
	TeamAdd {
		/// CSV with a `username` column and optional `enterprise`, `team`
		#[arg(default_value = DEFAULT_MEMBERS_PATH)]
		csv: PathBuf,

		/// Team for rows without a `team` value
		#[arg(long)]
		team: Option<String>,
	},

	/// Assign the users listed in a CSV file to the cost center
	CostCenterAdd {
		/// CSV with a `username` column, or logins in the first column
		#[arg(default_value = DEFAULT_USERS_PATH)]
		csv: PathBuf,

		/// Cost center id
		#[arg(long)]
		cost_center: Option<String>,

		/// Users per add call
		#[arg(long)]
		batch_size: Option<usize>,

		/// Report destination (default: synced_users.csv)
		#[arg(long)]
		report: Option<PathBuf>,
	},

	/// Show version and build information
	Version,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum LogFormat {
	Text,
	Json,
}

impl Args {
	/// Flag overrides as the highest-precedence config layer.
	fn cli_layer(&self) -> ConfigLayer {
		let mut sync = SyncConfigLayer::default();
		match &self.command {
			Command::Sync {
				team,
				cost_center,
				batch_size,
				report,
				..
			} => {
				sync.team = team.clone();
				sync.cost_center_id = cost_center.clone();
				sync.batch_size = *batch_size;
				sync.report_path = report.clone();
			}
			Command::CostCenterAdd {
				cost_center,
				batch_size,
				report,
				..
			} => {
				sync.cost_center_id = cost_center.clone();
				sync.batch_size = *batch_size;
				sync.report_path = report.clone();
			}
			Command::Export { team, .. } | Command::TeamAdd { team, .. } => {
				sync.team = team.clone();
			}
			Command::Version => {}
		}

		ConfigLayer {
			github: Some(GithubConfigLayer {
				api_base: self.api_base.clone(),
				enterprise: self.enterprise.clone(),
				..Default::default()
			}),
			sync: Some(sync),
			..Default::default()
		}
	}
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
	// Before parsing: .env may carry CCSYNC_CONFIG.
	dotenvy::dotenv().ok();
	let args = Args::parse();

	if let Command::Version = args.command {
		println!("{}", version::format_version_info());
		return ExitCode::SUCCESS;
	}

	let filter = init_tracing(args.log_format);

	match run(args, &filter).await {
		Ok(()) => ExitCode::SUCCESS,
		Err(e) => {
			let message = format!("{e:#}");
			tracing::error!(error = %message, "ccsync failed");
			eprintln!("Error: {message}");
			ExitCode::FAILURE
		}
	}
}

async fn run(args: Args, filter: &FilterHandle) -> anyhow::Result<()> {
	let config = config::load_config(LoadOptions {
		config_path: args.config.clone(),
		cli: args.cli_layer(),
	})
	.context("failed to load configuration")?;

	let rust_log = std::env::var("RUST_LOG").ok();
	apply_log_level(filter, rust_log.as_deref(), &config.log_level)?;
	tracing::info!(version = version::VERSION, "starting ccsync");

	match args.command {
		Command::Sync { dry_run, .. } => {
			let settings = config.sync_settings(dry_run)?;
			commands::sync::run(settings).await
		}
		Command::Export { output, .. } => {
			let settings = config.export_settings()?;
			commands::export::run(settings, &output).await
		}
		Command::TeamAdd { csv, .. } => {
			let settings = config.team_add_settings()?;
			commands::team_add::run(settings, &csv).await
		}
		Command::CostCenterAdd { csv, .. } => {
			let settings = config.cost_center_add_settings()?;
			commands::cost_center_add::run(settings, &csv).await
		}
		Command::Version => Ok(()),
	}
}

/// Installs the subscriber ahead of config loading. The filter starts from
/// `RUST_LOG`, then `CCSYNC_LOG_LEVEL`, then the default level, and is
/// replaced once the configured level is known.
fn init_tracing(format: LogFormat) -> FilterHandle {
	let rust_log = std::env::var("RUST_LOG").ok();
	let level = std::env::var(LOG_LEVEL_ENV).ok();
	let initial = filter_directive(
		rust_log.as_deref(),
		level.as_deref().unwrap_or(config::DEFAULT_LOG_LEVEL),
	);
	let (filter, handle) = reload::Layer::new(env_filter(initial));
	let json = format == LogFormat::Json;

	tracing_subscriber::registry()
		.with(filter)
		.with(json.then(|| tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr)))
		.with((!json).then(|| tracing_subscriber::fmt::layer().with_writer(std::io::stderr)))
		.init();

	handle
}

/// `RUST_LOG` wins over any configured level.
fn filter_directive<'a>(rust_log: Option<&'a str>, level: &'a str) -> &'a str {
	rust_log
		.map(str::trim)
		.filter(|v| !v.is_empty())
		.unwrap_or(level)
}

fn env_filter(directive: &str) -> EnvFilter {
	EnvFilter::try_new(directive).unwrap_or_else(|_| EnvFilter::new(config::DEFAULT_LOG_LEVEL))
}

fn apply_log_level(
	handle: &FilterHandle,
	rust_log: Option<&str>,
	level: &str,
) -> anyhow::Result<()> {
	handle
		.reload(env_filter(filter_directive(rust_log, level)))
		.context("failed to apply log level")
}
