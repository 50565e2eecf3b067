// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The entry table: an ordered map doubling as an insertion-ordered expiry
//! list.
//!
//! The original keeps two structures — a red-black tree keyed by token for
//! lookup, and a doubly-linked list in creation order for cheap "sweep the
//! oldest expired entries" — and keeps them in sync by hand. Because every
//! entry in a given registry shares the same timeout, creation order and
//! expiry order coincide, so a single [`indexmap::IndexMap`] gives both: O(1)
//! average lookup by token, and an iteration order that happens to be the
//! expiry order the original's dlist provided.

use indexmap::IndexMap;

use crate::entry::StateEntry;
use crate::token::StateToken;

/// The entry table proper. Not thread-safe on its own — callers (the
/// registry) hold a mutex around every method call.
#[derive(Default)]
pub struct EntryStore {
    entries: IndexMap<StateToken, StateEntry>,
}

impl EntryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get_mut(&mut self, token: &StateToken) -> Option<&mut StateEntry> {
        self.entries.get_mut(token)
    }

    /// `state_entry_create`'s insertion half: add a newly-minted entry.
    /// Returns the entry that previously lived under this token, if the
    /// caller is reusing a token in place (same-round retry).
    pub fn insert(&mut self, token: StateToken, entry: StateEntry) -> Option<StateEntry> {
        self.entries.insert(token, entry)
    }

    /// `state_entry_find_and_unlink`: remove and return the entry for `token`.
    pub fn remove(&mut self, token: &StateToken) -> Option<StateEntry> {
        self.entries.shift_remove(token)
    }

    /// `fr_state_tree_sweep`-equivalent: unlink every entry whose cleanup
    /// deadline has passed, oldest first, and hand them back to the caller to
    /// drop *after* releasing the registry's lock.
    ///
    /// Relies on creation order coinciding with expiry order (see module
    /// docs); stops at the first live entry rather than scanning the whole
    /// table.
    pub fn sweep(&mut self, now: std::time::Instant) -> Vec<StateEntry> {
        let mut reaped = Vec::new();
        loop {
            let Some((_, front)) = self.entries.get_index(0) else { break };
            if !front.is_expired(now) {
                break;
            }
            let Some((_, entry)) = self.entries.shift_remove_index(0) else { break };
            reaped.push(entry);
        }
        reaped
    }
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
