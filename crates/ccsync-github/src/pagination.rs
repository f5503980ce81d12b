// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Cursor-following pagination over `Link: <...>; rel="next"` chains.

use ccsync_common_http::{HttpRequest, HttpTransport, Pacing, RetryExecutor, Sleeper};
use serde_json::Value;
use tracing::{debug, instrument};

use crate::error::GithubError;
use crate::link::parse_next_link;
use crate::payload::extract_records;

/// Most pages fetched before a continuing chain is treated as a loop.
pub const MAX_PAGES: usize = 200;

/// One fetched page.
#[derive(Debug, Clone)]
pub struct Page {
	/// 1-based position in the chain.
	pub number: usize,
	pub url: String,
	pub payload: Value,
}

impl Page {
	pub fn records(&self) -> &[Value] {
		extract_records(&self.payload)
	}
}

/// A lazy, finite sequence of pages.
///
/// Each call to [`Paginator::next_page`] issues at most one request. The
/// sequence ends when a response carries no next link. If a next link is
/// still present once `max_pages` pages have been fetched, the following call
/// fails with [`GithubError::PaginationLoop`].
pub struct Paginator<'a, T, S> {
	executor: &'a RetryExecutor<T, S>,
	operation: String,
	next_url: Option<String>,
	fetched: usize,
	max_pages: usize,
	pacing: Pacing,
}

impl<'a, T, S> Paginator<'a, T, S>
where
	T: HttpTransport,
	S: Sleeper,
{
	pub fn new(
		executor: &'a RetryExecutor<T, S>,
		operation: impl Into<String>,
		first_url: impl Into<String>,
	) -> Self {
		Self {
			executor,
			operation: operation.into(),
			next_url: Some(first_url.into()),
			fetched: 0,
			max_pages: MAX_PAGES,
			pacing: Pacing::disabled(),
		}
	}

	pub fn with_max_pages(mut self, max_pages: usize) -> Self {
		self.max_pages = max_pages;
		self
	}

	/// Pause inserted before every page after the first.
	pub fn with_pacing(mut self, pacing: Pacing) -> Self {
		self.pacing = pacing;
		self
	}

	pub fn pages_fetched(&self) -> usize {
		self.fetched
	}

	#[instrument(skip(self), fields(operation = %self.operation, page = self.fetched + 1))]
	pub async fn next_page(&mut self) -> Result<Option<Page>, GithubError> {
		let Some(url) = self.next_url.take() else {
			return Ok(None);
		};

		if self.fetched >= self.max_pages {
			return Err(GithubError::PaginationLoop {
				pages: self.fetched,
				next_url: url,
			});
		}

		if self.fetched > 0 {
			self.pacing.pause(self.executor.sleeper()).await;
		}

		let number = self.fetched + 1;
		let response = self.executor.execute(&HttpRequest::get(&url)).await?;
		let operation = format!("{} (page {number})", self.operation);

		if response.status != 200 {
			return Err(GithubError::api(operation, url, &response));
		}
		let payload = response
			.json()
			.map_err(|_| GithubError::invalid_json(operation, url.as_str(), &response))?;

		self.next_url = response
			.header("link")
			.and_then(parse_next_link)
			.map(str::to_string);
		self.fetched = number;

		debug!(
			page = number,
			has_next = self.next_url.is_some(),
			"fetched page"
		);

		Ok(Some(Page {
			number,
			url,
			payload,
		}))
	}
}
