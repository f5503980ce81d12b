// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Splitting work into fixed-size mutation batches.

use std::num::NonZeroUsize;
use std::slice::Chunks;

/// Logins sent per add/remove call unless configured otherwise.
pub const DEFAULT_BATCH_SIZE: NonZeroUsize = NonZeroUsize::MIN.saturating_add(24);

/// Contiguous, order-preserving chunks of at most `size` items.
/// An empty input yields no chunks at all.
pub fn chunk<T>(items: &[T], size: NonZeroUsize) -> Chunks<'_, T> {
	items.chunks(size.get())
}
