// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! GitHub client for enterprise teams and billing cost centers.
//!
//! Covers the read side (paginated team memberships, cost center resources)
//! and the write side (bulk add/remove of users on a cost center, adding
//! members to an enterprise team). Mutation calls hand back the raw response;
//! deciding what a status means is left to the caller.

pub mod client;
pub mod config;
pub mod error;
pub mod link;
pub mod pagination;
pub mod payload;

pub use ccsync_common_http::RetryConfig;
pub use client::GithubClient;
pub use config::{GithubConfig, ResourcePath};
pub use error::GithubError;
pub use link::parse_next_link;
pub use pagination::{Page, Paginator, MAX_PAGES};
pub use payload::{
	cost_center_user_names, extract_records, member_login, MembershipRecord, Shape, WRAPPER_KEYS,
};
