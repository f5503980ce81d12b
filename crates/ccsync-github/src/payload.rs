// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Shape-tolerant extraction of records and logins from API payloads.
//!
//! The team memberships endpoint has been seen returning a bare array as well
//! as arrays wrapped under various keys, so extraction dispatches on the
//! decoded shape instead of deserializing into a fixed struct. An
//! unrecognised shape yields no records rather than an error.

use serde::Serialize;
use serde_json::{Map, Value};

/// Wrapper keys checked, in order, when a payload is an object.
pub const WRAPPER_KEYS: [&str; 4] = ["memberships", "items", "value", "data"];

/// The three shapes a decoded payload can take.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Shape<'a> {
	List(&'a [Value]),
	Mapping(&'a Map<String, Value>),
	Scalar(&'a Value),
}

impl<'a> Shape<'a> {
	pub fn of(value: &'a Value) -> Self {
		match value {
			Value::Array(items) => Shape::List(items),
			Value::Object(map) => Shape::Mapping(map),
			other => Shape::Scalar(other),
		}
	}
}

/// Normalises one page payload into its record sequence.
///
/// 1. a bare array is used as-is;
/// 2. an object's first [`WRAPPER_KEYS`] entry holding an array wins;
/// 3. otherwise the first array value that is empty or starts with an object;
/// 4. otherwise nothing.
pub fn extract_records(payload: &Value) -> &[Value] {
	match Shape::of(payload) {
		Shape::List(items) => items,
		Shape::Mapping(map) => WRAPPER_KEYS
			.iter()
			.find_map(|key| map.get(*key).and_then(Value::as_array))
			.or_else(|| {
				map.values()
					.filter_map(Value::as_array)
					.find(|items| items.first().map_or(true, Value::is_object))
			})
			.map(Vec::as_slice)
			.unwrap_or(&[]),
		Shape::Scalar(_) => &[],
	}
}

/// The login of a membership record: `user.login` first, then `login`.
/// Empty strings count as missing.
pub fn member_login(record: &Value) -> Option<&str> {
	fn non_empty(v: &Value) -> Option<&str> {
		v.as_str().filter(|s| !s.is_empty())
	}

	record
		.get("user")
		.and_then(|user| user.get("login"))
		.and_then(non_empty)
		.or_else(|| record.get("login").and_then(non_empty))
}

/// User names assigned to a cost center: entries of `resources` whose `type`
/// is `"User"`, in payload order.
pub fn cost_center_user_names(payload: &Value) -> Vec<String> {
	payload
		.get("resources")
		.and_then(Value::as_array)
		.map(|resources| {
			resources
				.iter()
				.filter(|r| r.get("type").and_then(Value::as_str) == Some("User"))
				.filter_map(|r| r.get("name").and_then(Value::as_str))
				.filter(|name| !name.is_empty())
				.map(str::to_string)
				.collect()
		})
		.unwrap_or_default()
}

/// A flattened team membership, as written by the export command.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MembershipRecord {
	pub login: Option<String>,
	pub id: Option<String>,
	pub html_url: Option<String>,
	pub role: Option<String>,
	pub state: Option<String>,
}

impl MembershipRecord {
	/// Reads nested `user` fields first, falling back to the record itself.
	/// Non-object records yield `None`.
	pub fn from_value(record: &Value) -> Option<Self> {
		let fields = record.as_object()?;
		let user = fields.get("user").and_then(Value::as_object);
		let user_field = |key: &str| user.and_then(|u| u.get(key)).and_then(scalar_string);
		let own_field = |key: &str| fields.get(key).and_then(scalar_string);

		Some(Self {
			login: member_login(record).map(str::to_string),
			id: user_field("id").or_else(|| own_field("id")),
			html_url: user_field("html_url").or_else(|| user_field("url")),
			role: own_field("role"),
			state: own_field("state"),
		})
	}
}

fn scalar_string(value: &Value) -> Option<String> {
	match value {
		Value::String(s) if !s.is_empty() => Some(s.clone()),
		Value::Number(n) => Some(n.to_string()),
		Value::Bool(b) => Some(b.to_string()),
		_ => None,
	}
}
