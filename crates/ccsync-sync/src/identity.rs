// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Deduplicated, insertion-ordered sets of logins.

use indexmap::IndexSet;

/// Unique logins in first-seen order.
///
/// Logins are compared exactly, so `Alice` and `alice` are distinct.
/// Equality ignores order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdentitySet {
	members: IndexSet<String>,
}

impl IdentitySet {
	pub fn new() -> Self {
		Self::default()
	}

	/// Returns `false` if the login was already present; its position is kept.
	pub fn insert(&mut self, login: impl Into<String>) -> bool {
		self.members.insert(login.into())
	}

	pub fn contains(&self, login: &str) -> bool {
		self.members.contains(login)
	}

	pub fn len(&self) -> usize {
		self.members.len()
	}

	pub fn is_empty(&self) -> bool {
		self.members.is_empty()
	}

	pub fn iter(&self) -> impl Iterator<Item = &str> + '_ {
		self.members.iter().map(String::as_str)
	}

	/// Members of `self` absent from `other`, in `self`'s order.
	pub fn difference(&self, other: &IdentitySet) -> IdentitySet {
		self.iter().filter(|login| !other.contains(login)).collect()
	}

	/// Members of `self` also in `other`, in `self`'s order.
	pub fn intersection(&self, other: &IdentitySet) -> IdentitySet {
		self.iter().filter(|login| other.contains(login)).collect()
	}

	pub fn to_vec(&self) -> Vec<String> {
		self.members.iter().cloned().collect()
	}
}

impl<S: Into<String>> FromIterator<S> for IdentitySet {
	fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
		let mut set = Self::new();
		set.extend(iter);
		set
	}
}

impl<S: Into<String>> Extend<S> for IdentitySet {
	fn extend<I: IntoIterator<Item = S>>(&mut self, iter: I) {
		for login in iter {
			self.insert(login);
		}
	}
}
