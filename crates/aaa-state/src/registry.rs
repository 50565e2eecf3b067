// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The session registry: the top-level freeze/thaw/discard API, capacity
//! enforcement, and mutex discipline.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::attribute::{Attribute, SessionState};
use crate::clock::{Clock, SystemClock};
use crate::config::{ConfigError, RegistryConfig};
use crate::entry::StateEntry;
use crate::request::{RequestContext, RequestDataItem, RequestDataKey};
use crate::store::EntryStore;
use crate::token;

/// Reserved request-data key under which a thawed entry lives while it is
/// checked out to a request, the Rust re-expression of the weak
/// `thawed` back-reference described in the crate's design notes: the
/// request, not the entry, is the single owner while an entry is in flight.
const ENTRY_DATA_KEY: RequestDataKey = (0, i32::MIN);

/// Result of [`Registry::freeze`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FreezeOutcome {
    /// The request's data was moved into a (possibly reused) entry and a
    /// State attribute was appended to the reply.
    Ok,
    /// Both the session bag and the persistable request-data were empty;
    /// nothing was stored and no State attribute was appended.
    Noop,
    /// Capacity exhausted (or an unrecoverable token collision); the
    /// request's data was restored unchanged.
    Fail,
}

/// Result of [`Registry::thaw`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThawOutcome {
    /// The entry's session bag and persistable data were restored to the request.
    Restored,
    /// No State attribute was present and this is the first request of a
    /// new conversation; `request.seq_start` was set from `request.number`.
    NoStateAttr,
    /// A State attribute was present but didn't match any live entry.
    UnknownState,
    /// This request already holds a thawed entry; treated as a hard
    /// invariant breach rather than a second registry lookup (see
    /// `DESIGN.md` for the "observed oddity" this replaces).
    AlreadyThawed,
}

/// A point-in-time snapshot of the registry's counters.
#[derive(Debug, Clone, Copy, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RegistryStats {
    pub created: u64,
    pub timed_out: u64,
    pub live: usize,
}

struct RegistryInner {
    store: EntryStore,
    next_id: u64,
    created: u64,
    timed_out: u64,
}

/// The concurrent State token registry.
///
/// All mutating operations acquire a single internal mutex; per
/// `DESIGN.md`, this crate always takes the lock rather than offering an
/// unlocked fast path for `RegistryConfig::thread_safe = false`.
pub struct Registry {
    inner: Mutex<RegistryInner>,
    config: RegistryConfig,
    clock: Arc<dyn Clock>,
}

impl Registry {
    /// Build a registry backed by the system clock.
    pub fn new(config: RegistryConfig) -> Result<Self, ConfigError> {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    /// Build a registry backed by an injected clock (tests, simulation).
    pub fn with_clock(config: RegistryConfig, clock: Arc<dyn Clock>) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            inner: Mutex::new(RegistryInner {
                store: EntryStore::new(),
                next_id: 0,
                created: 0,
                timed_out: 0,
            }),
            config,
            clock,
        })
    }

    /// Move `request`'s session bag and persistable request-data into a
    /// (possibly reused) entry, appending a State attribute to the reply.
    ///
    /// Follows the split critical-region protocol: sweep and capacity-check
    /// under lock, release, mint the token (CSPRNG work) and build the new
    /// entry outside the lock, then reacquire to insert.
    pub fn freeze(&self, request: &mut RequestContext) -> FreezeOutcome {
        let persistable = request.request_data_by_persistance();
        let ctx = request.session_state_ctx.take();
        let ctx_is_empty = ctx.as_ref().map_or(true, SessionState::is_empty);

        if ctx_is_empty && persistable.is_empty() {
            request.session_state_ctx = ctx;
            request.request_data_restore(persistable);
            tracing::debug!("freeze: nothing to persist, noop");
            return FreezeOutcome::Noop;
        }

        let reused = take_attached_entry(request);
        let prev_token = reused.as_ref().map(|e| e.token);
        let seq_start = reused.as_ref().map_or(request.seq_start, |e| e.seq_start);

        let now = self.clock.now();
        let (reaped, over_capacity, candidate_id) = {
            let mut inner = self.inner.lock();
            let reaped = inner.store.sweep(now);
            inner.timed_out += reaped.len() as u64;
            let over_capacity =
                reused.is_none() && inner.store.len() >= self.config.max_sessions as usize;
            (reaped, over_capacity, inner.next_id + 1)
        };
        // Destructors for reaped entries run here, lock-free.
        drop(reaped);

        if over_capacity {
            tracing::error!(max_sessions = self.config.max_sessions, "freeze: capacity exhausted");
            request.session_state_ctx = ctx;
            request.request_data_restore(persistable);
            return FreezeOutcome::Fail;
        }

        let mut rng = rand::rng();
        let (wire, key) =
            token::emit(prev_token.as_ref(), self.config.server_id, self.config.context_id, &mut rng);
        let tries = token::tries(&wire);
        let deadline = now + self.config.timeout;
        let entry = StateEntry::new(candidate_id, key, seq_start, tries, deadline, ctx, persistable);

        let displaced = {
            let mut inner = self.inner.lock();
            inner.next_id = candidate_id;
            inner.created += 1;
            inner.store.insert(key, entry)
        };

        if let Some(displaced) = displaced {
            // CSPRNG collision against a still-live entry (~2^-128): treat as
            // a programming error, restore the entry we almost clobbered,
            // and abort before the reply attribute is ever appended.
            tracing::error!("state token collision on freeze, aborting");
            self.inner.lock().store.insert(key, displaced);
            return FreezeOutcome::Fail;
        }

        request
            .reply_pairs
            .append(Attribute::new(self.config.state_attribute.clone(), wire.to_vec()));
        tracing::debug!(tries, "freeze: entry stored");
        FreezeOutcome::Ok
    }

    /// Locate the inbound State attribute, look up its entry, and transfer
    /// ownership of its contents onto `request`.
    pub fn thaw(&self, request: &mut RequestContext) -> ThawOutcome {
        if let Some(item) = request.request_data_get(ENTRY_DATA_KEY) {
            // This request already holds a checked-out entry: a second thaw
            // without an intervening freeze/discard. Put it back untouched
            // and report the breach without ever touching the lock.
            request.request_data_add(item);
            tracing::error!("thaw called twice on the same request");
            return ThawOutcome::AlreadyThawed;
        }

        let Some(attr) = request.request_pairs.find_by_name(&self.config.state_attribute) else {
            if request.seq_start == 0 {
                request.seq_start = request.number;
            }
            return ThawOutcome::NoStateAttr;
        };
        let key = token::parse(&attr.value, self.config.context_id);

        let found = self.inner.lock().store.remove(&key);
        let Some(mut entry) = found else {
            tracing::debug!("thaw: unknown state token");
            return ThawOutcome::UnknownState;
        };

        request.session_state_ctx = entry.ctx.take();
        request.request_data_restore(std::mem::take(&mut entry.data));
        request.seq_start = entry.seq_start;
        request.sequence = entry.tries as u32;
        entry.thawed_by = Some(request.number);

        tracing::debug!(id = entry.id, tries = entry.tries, "thaw: entry restored");
        request.request_data_add(RequestDataItem::new(ENTRY_DATA_KEY, false, entry));
        ThawOutcome::Restored
    }

    /// Destroy the entry for `request` (thawed this round or still live in
    /// the map) and reset its session bag to a fresh empty one. Called on
    /// terminal responses.
    pub fn discard(&self, request: &mut RequestContext) {
        let reused = take_attached_entry(request);
        if reused.is_none() {
            if let Some(attr) = request.request_pairs.find_by_name(&self.config.state_attribute) {
                let key = token::parse(&attr.value, self.config.context_id);
                self.inner.lock().store.remove(&key);
            }
        }
        // `reused`, if any, is dropped here, outside the lock.

        request.session_state_ctx = Some(SessionState::new());
        request.reply_pairs.remove_by_name(&self.config.state_attribute);
        tracing::debug!("discard: entry released");
    }

    pub fn count_created(&self) -> u64 {
        self.inner.lock().created
    }

    pub fn count_timed_out(&self) -> u64 {
        self.inner.lock().timed_out
    }

    pub fn count_live(&self) -> usize {
        self.inner.lock().store.len()
    }

    pub fn stats(&self) -> RegistryStats {
        let inner = self.inner.lock();
        RegistryStats { created: inner.created, timed_out: inner.timed_out, live: inner.store.len() }
    }
}

/// Remove and downcast the entry a prior `thaw` attached to `request`, if any.
fn take_attached_entry(request: &mut RequestContext) -> Option<StateEntry> {
    let item = request.request_data_get(ENTRY_DATA_KEY)?;
    item.into_inner().downcast::<StateEntry>().ok().map(|boxed| *boxed)
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;
