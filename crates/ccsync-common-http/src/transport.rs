// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Request/response types and the transport capability.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, Method};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, trace};

/// Errors raised below the HTTP status level: no response was received.
#[derive(Debug, Error)]
pub enum TransportError {
	#[error("request to {url} timed out")]
	Timeout { url: String },

	#[error("request to {url} failed: {source}")]
	Request {
		url: String,
		#[source]
		source: reqwest::Error,
	},
}

/// An outgoing request: method, absolute URL and optional JSON body.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
	pub method: Method,
	pub url: String,
	pub body: Option<Value>,
}

impl HttpRequest {
	pub fn new(method: Method, url: impl Into<String>) -> Self {
		Self {
			method,
			url: url.into(),
			body: None,
		}
	}

	pub fn get(url: impl Into<String>) -> Self {
		Self::new(Method::GET, url)
	}

	pub fn post(url: impl Into<String>, body: Value) -> Self {
		Self::new(Method::POST, url).with_body(body)
	}

	pub fn delete(url: impl Into<String>, body: Value) -> Self {
		Self::new(Method::DELETE, url).with_body(body)
	}

	pub fn with_body(mut self, body: Value) -> Self {
		self.body = Some(body);
		self
	}
}

/// A fully-read response. The body is kept as text so callers decide whether
/// and how to decode it.
#[derive(Debug, Clone)]
pub struct HttpResponse {
	pub status: u16,
	pub headers: HeaderMap,
	pub body: String,
}

impl HttpResponse {
	pub fn new(status: u16) -> Self {
		Self {
			status,
			headers: HeaderMap::new(),
			body: String::new(),
		}
	}

	pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
		self.headers.insert(name, value);
		self
	}

	pub fn with_body(mut self, body: impl Into<String>) -> Self {
		self.body = body.into();
		self
	}

	pub fn is_success(&self) -> bool {
		(200..300).contains(&self.status)
	}

	/// Case-insensitive header lookup; non-UTF-8 values read as absent.
	pub fn header(&self, name: &str) -> Option<&str> {
		self.headers.get(name).and_then(|v| v.to_str().ok())
	}

	pub fn json(&self) -> Result<Value, serde_json::Error> {
		serde_json::from_str(&self.body)
	}

	/// The body cut to at most `max_chars` characters.
	pub fn body_preview(&self, max_chars: usize) -> &str {
		truncate_chars(&self.body, max_chars)
	}
}

/// Returns the longest prefix of `text` with at most `max_chars` characters.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
	match text.char_indices().nth(max_chars) {
		Some((idx, _)) => &text[..idx],
		None => text,
	}
}

/// The capability to send one HTTP request and read the whole response.
///
/// Every network call in the workspace goes through this trait so that retry
/// policy and engine logic can be exercised against scripted transports.
#[async_trait]
pub trait HttpTransport: Send + Sync {
	async fn send(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError>;
}

#[async_trait]
impl<T> HttpTransport for Arc<T>
where
	T: HttpTransport + ?Sized,
{
	async fn send(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
		(**self).send(request).await
	}
}

/// [`HttpTransport`] backed by a reqwest client and a fixed set of headers
/// applied to every request.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
	client: Client,
	headers: HeaderMap,
}

impl ReqwestTransport {
	pub fn new(client: Client, headers: HeaderMap) -> Self {
		Self { client, headers }
	}
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
	async fn send(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
		trace!(method = %request.method, url = %request.url, "sending request");

		let mut builder = self
			.client
			.request(request.method.clone(), &request.url)
			.headers(self.headers.clone());
		if let Some(body) = &request.body {
			builder = builder.json(body);
		}

		let map_err = |e: reqwest::Error| {
			if e.is_timeout() {
				TransportError::Timeout {
					url: request.url.clone(),
				}
			} else {
				TransportError::Request {
					url: request.url.clone(),
					source: e,
				}
			}
		};

		let response = builder.send().await.map_err(map_err)?;
		let status = response.status().as_u16();
		let headers = response.headers().clone();
		let body = response.text().await.map_err(map_err)?;

		debug!(method = %request.method, url = %request.url, status, "received response");

		Ok(HttpResponse {
			status,
			headers,
			body,
		})
	}
}
