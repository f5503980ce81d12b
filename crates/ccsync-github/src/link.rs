// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! `Link` header parsing (RFC 8288, as GitHub emits it).

/// Returns the target of the `rel="next"` link, if any.
///
/// ```
/// use ccsync_github::parse_next_link;
///
/// let header = r#"<https://x/y?page=2>; rel="next", <https://x/y?page=1>; rel="prev""#;
/// assert_eq!(parse_next_link(header), Some("https://x/y?page=2"));
/// ```
pub fn parse_next_link(header: &str) -> Option<&str> {
	header.split(',').find_map(|segment| {
		let segment = segment.trim();
		let start = segment.find('<')? + 1;
		let end = start + segment[start..].find('>')?;
		let target = &segment[start..end];
		let is_next = segment[end + 1..].split(';').any(is_next_relation);
		(is_next && !target.is_empty()).then_some(target)
	})
}

fn is_next_relation(param: &str) -> bool {
	let Some((key, value)) = param.split_once('=') else {
		return false;
	};
	key.trim().eq_ignore_ascii_case("rel")
		&& value
			.trim()
			.trim_matches('"')
			.split_whitespace()
			.any(|rel| rel.eq_ignore_ascii_case("next"))
}

#[cfg(test)]
mod tests {
	use super::*;
	use proptest::prelude::*;

	#[test]
	fn finds_next_among_relations() {
		let header = r#"<https://x/y?page=2>; rel="next", <https://x/y?page=1>; rel="prev""#;
		assert_eq!(parse_next_link(header), Some("https://x/y?page=2"));
	}

	#[test]
	fn next_does_not_need_to_come_first() {
		let header = concat!(
			r#"<https://api.github.com/e/teams/t/memberships?page=1>; rel="prev", "#,
			r#"<https://api.github.com/e/teams/t/memberships?page=3>; rel="next", "#,
			r#"<https://api.github.com/e/teams/t/memberships?page=9>; rel="last""#
		);
		assert_eq!(
			parse_next_link(header),
			Some("https://api.github.com/e/teams/t/memberships?page=3")
		);
	}

	#[test]
	fn none_without_next() {
		let header = r#"<https://x/y?page=1>; rel="prev", <https://x/y?page=1>; rel="first""#;
		assert_eq!(parse_next_link(header), None);
	}

	#[test]
	fn none_for_empty_or_garbage() {
		assert_eq!(parse_next_link(""), None);
		assert_eq!(parse_next_link("rel=\"next\""), None);
		assert_eq!(parse_next_link("<>; rel=\"next\""), None);
	}

	#[test]
	fn accepts_unquoted_and_multi_valued_rel() {
		assert_eq!(parse_next_link("<https://x/2>; rel=next"), Some("https://x/2"));
		assert_eq!(
			parse_next_link(r#"<https://x/2>; rel="last next""#),
			Some("https://x/2")
		);
	}

	/// A "next" inside the URL itself is not a relation.
	#[test]
	fn ignores_next_inside_target() {
		assert_eq!(parse_next_link(r#"<https://x/next>; rel="prev""#), None);
	}

	proptest! {
		#[test]
		fn next_target_survives_surrounding_relations(
			page in 1u32..10_000,
			before in proptest::collection::vec("prev|first|last", 0..3),
			after in proptest::collection::vec("prev|first|last", 0..3),
		) {
			let target = format!("https://api.github.com/x?page={page}&per_page=100");
			let mut segments: Vec<String> = before
				.iter()
				.map(|rel| format!("<https://api.github.com/x?page=1>; rel=\"{rel}\""))
				.collect();
			segments.push(format!("<{target}>; rel=\"next\""));
			segments.extend(after.iter().map(|rel| format!("<https://api.github.com/x?page=9>; rel=\"{rel}\"")));
			let header = segments.join(", ");

			prop_assert_eq!(parse_next_link(&header), Some(target.as_str()));
		}
	}
}
