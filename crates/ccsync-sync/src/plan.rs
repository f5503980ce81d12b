// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

use crate::identity::IdentitySet;

/// The three-way split of `source ∪ target`.
///
/// `to_add` and `already_synced` follow source order, `to_remove` follows
/// target order. Computed once per run and never modified.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconciliationPlan {
	pub to_add: IdentitySet,
	pub to_remove: IdentitySet,
	pub already_synced: IdentitySet,
}

impl ReconciliationPlan {
	pub fn compute(source: &IdentitySet, target: &IdentitySet) -> Self {
		Self {
			to_add: source.difference(target),
			to_remove: target.difference(source),
			already_synced: source.intersection(target),
		}
	}

	/// True when no mutation is needed.
	pub fn is_converged(&self) -> bool {
		self.to_add.is_empty() && self.to_remove.is_empty()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use proptest::prelude::*;

	fn set(logins: &[&str]) -> IdentitySet {
		logins.iter().copied().collect()
	}

	#[test]
	fn splits_example_sets() {
		let plan = ReconciliationPlan::compute(&set(&["alice", "bob", "carol"]), &set(&["bob", "dan"]));

		assert_eq!(plan.to_add.to_vec(), vec!["alice", "carol"]);
		assert_eq!(plan.to_remove.to_vec(), vec!["dan"]);
		assert_eq!(plan.already_synced.to_vec(), vec!["bob"]);
		assert!(!plan.is_converged());
	}

	#[test]
	fn identical_sets_converge() {
		let plan = ReconciliationPlan::compute(&set(&["a", "b"]), &set(&["b", "a"]));
		assert!(plan.is_converged());
		assert_eq!(plan.already_synced.to_vec(), vec!["a", "b"]);
	}

	#[test]
	fn empty_target_adds_everything() {
		let plan = ReconciliationPlan::compute(&set(&["a", "b"]), &IdentitySet::new());
		assert_eq!(plan.to_add.to_vec(), vec!["a", "b"]);
		assert!(plan.to_remove.is_empty());
		assert!(plan.already_synced.is_empty());
	}

	proptest! {
		#[test]
		fn buckets_partition_the_union(
			source in proptest::collection::vec("[a-h]", 0..20),
			target in proptest::collection::vec("[a-h]", 0..20),
		) {
			let source: IdentitySet = source.into_iter().collect();
			let target: IdentitySet = target.into_iter().collect();
			let plan = ReconciliationPlan::compute(&source, &target);

			for login in plan.to_add.iter() {
				prop_assert!(!plan.to_remove.contains(login));
				prop_assert!(!plan.already_synced.contains(login));
			}
			for login in plan.to_remove.iter() {
				prop_assert!(!plan.already_synced.contains(login));
			}

			let mut add_or_synced = plan.to_add.clone();
			add_or_synced.extend(plan.already_synced.iter());
			prop_assert_eq!(add_or_synced, source);

			let mut remove_or_synced = plan.to_remove.clone();
			remove_or_synced.extend(plan.already_synced.iter());
			prop_assert_eq!(remove_or_synced, target);
		}
	}
}
