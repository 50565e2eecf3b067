// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! A single tracked session: the token that names it, the attributes and
//! request-data it carries between rounds, and the bookkeeping the registry
//! needs to reap it.

use std::time::Instant;

use crate::attribute::SessionState;
use crate::request::RequestDataItem;
use crate::token::StateToken;

/// A frozen round of a multi-round conversation.
///
/// Identity is the `token`; everything else is the payload a request handed
/// over on freeze and expects back, byte-for-byte, on thaw.
pub struct StateEntry {
    /// Monotonically assigned identifier, for logs; reassigned on reuse.
    pub id: u64,
    pub token: StateToken,
    /// Request number that originated the conversation (`seq_start`).
    pub seq_start: u64,
    /// Number of rounds completed so far, mirrored from the token's `tries`.
    pub tries: u8,
    /// Deadline after which [`crate::store::EntryStore::sweep`] may reap this
    /// entry even though nobody thawed it.
    pub cleanup_deadline: Instant,
    /// Session-state attributes, present unless currently thawed out to a request.
    pub ctx: Option<SessionState>,
    /// Persistable request-data slots handed over on freeze.
    pub data: Vec<RequestDataItem>,
    /// Set while an in-flight request holds this entry thawed; used to
    /// detect the double-thaw case the original calls out as an oddity
    /// (thawing an entry that's already checked out returns an error rather
    /// than silently handing out the same state twice).
    pub thawed_by: Option<u64>,
}

impl StateEntry {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: u64,
        token: StateToken,
        seq_start: u64,
        tries: u8,
        cleanup_deadline: Instant,
        ctx: Option<SessionState>,
        data: Vec<RequestDataItem>,
    ) -> Self {
        Self { id, token, seq_start, tries, cleanup_deadline, ctx, data, thawed_by: None }
    }

    pub fn is_expired(&self, now: Instant) -> bool {
        now >= self.cleanup_deadline
    }

    pub fn is_thawed(&self) -> bool {
        self.thawed_by.is_some()
    }
}

impl std::fmt::Debug for StateEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StateEntry")
            .field("id", &self.id)
            .field("seq_start", &self.seq_start)
            .field("tries", &self.tries)
            .field("thawed_by", &self.thawed_by)
            .field("data_len", &self.data.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[path = "entry_tests.rs"]
mod tests;
