// Copyright 2025 Jiri Bobek. All rights reserved.
// License: GPL 3.0 or later. See LICENSE.txt for details.

use std::collections::HashMap;

/// Per-kind instance counters used to generate unique naming scopes.
///
/// Each unit kind claims `"<Kind>_<n>"` with `n` starting at 1, so repeated
/// instantiation of the same kind never collides in the shared variable
/// store. The counter is threaded through every `initialize()` call by the
/// caller; one counter per variable store.
#[derive(Debug, Default)]
pub struct ScopeCounter {
	counts: HashMap<&'static str, u64>,
}

impl ScopeCounter {
	pub fn new() -> Self {
		Self::default()
	}

	/// Increments `kind`'s counter and returns the new scope name.
	pub fn next_scope(&mut self, kind: &'static str) -> String {
		let n = self.counts.entry(kind).or_insert(0);
		*n += 1;
		format!("{kind}_{n}")
	}

	/// How many scopes have been claimed for `kind`.
	pub fn count(&self, kind: &str) -> u64 {
		self.counts.get(kind).copied().unwrap_or(0)
	}
}
