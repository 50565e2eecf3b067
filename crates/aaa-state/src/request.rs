// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The "Request object" collaborator: fields and operations the registry
//! needs from an in-flight request, plus the persistable request-data slots
//! it transfers ownership of between rounds.

use std::any::Any;

use crate::attribute::{AttributeList, SessionState};

/// Identifies a persistable request-data slot: `(owner, qualifier)`.
///
/// `owner` is an opaque caller-chosen identity (e.g. a function pointer or a
/// `&'static` address cast to `usize` — never dereferenced by this crate),
/// the Rust re-expression of the original's `(unique_ptr, unique_int)` pair
/// used to disambiguate which module's persisted state a slot holds.
pub type RequestDataKey = (usize, i32);

/// One persistable request-data item: a type-erased value plus whether it
/// survives a freeze/thaw round-trip (`persistable`) or is request-local.
pub struct RequestDataItem {
    pub key: RequestDataKey,
    pub persistable: bool,
    value: Box<dyn Any + Send + Sync>,
}

impl RequestDataItem {
    pub fn new<T: Any + Send + Sync>(key: RequestDataKey, persistable: bool, value: T) -> Self {
        Self { key, persistable, value: Box::new(value) }
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.value.downcast_ref()
    }

    pub fn into_inner(self) -> Box<dyn Any + Send + Sync> {
        self.value
    }
}

impl std::fmt::Debug for RequestDataItem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestDataItem")
            .field("key", &self.key)
            .field("persistable", &self.persistable)
            .finish_non_exhaustive()
    }
}

/// Stand-in for the RADIUS `request_t`: carries the attribute lists, the
/// session-state container, round bookkeeping, and the persistable
/// request-data slots the registry reads and writes.
#[derive(Default)]
pub struct RequestContext {
    /// Attributes received on the wire, including any inbound State.
    pub request_pairs: AttributeList,
    /// Attributes queued to send back, including any minted State.
    pub reply_pairs: AttributeList,
    /// Session-state attribute bag, present except while thawed/frozen in transit.
    pub session_state_ctx: Option<SessionState>,
    /// Request number that began this conversation (for prioritization).
    pub seq_start: u64,
    /// This request's own sequence number.
    pub number: u64,
    /// Round counter restored from the thawed entry's `tries`.
    pub sequence: u32,
    /// Parent request, for subrequests (EAP-in-EAP, nested modules, etc).
    pub parent: Option<u64>,
    request_data: Vec<RequestDataItem>,
}

impl RequestContext {
    pub fn new(number: u64) -> Self {
        Self { number, ..Default::default() }
    }

    pub fn with_parent(number: u64, parent: u64) -> Self {
        Self { number, parent: Some(parent), ..Default::default() }
    }

    /// `request_data_add`: insert (or replace) a request-data slot.
    pub fn request_data_add(&mut self, item: RequestDataItem) {
        self.request_data.retain(|existing| existing.key != item.key);
        self.request_data.push(item);
    }

    /// `request_data_get`: remove and return the slot for `key`, if present.
    pub fn request_data_get(&mut self, key: RequestDataKey) -> Option<RequestDataItem> {
        let idx = self.request_data.iter().position(|i| i.key == key)?;
        Some(self.request_data.remove(idx))
    }

    /// `request_data_by_persistance`: drain every slot marked persistable.
    pub fn request_data_by_persistance(&mut self) -> Vec<RequestDataItem> {
        let (persistable, rest): (Vec<_>, Vec<_>) =
            std::mem::take(&mut self.request_data).into_iter().partition(|i| i.persistable);
        self.request_data = rest;
        persistable
    }

    /// `request_data_restore`: reinsert previously-drained persistable items.
    pub fn request_data_restore(&mut self, items: Vec<RequestDataItem>) {
        self.request_data.extend(items);
    }

    /// Number of persistable slots currently attached (used by freeze's
    /// "both bags empty → noop" check).
    pub fn persistable_data_count(&self) -> usize {
        self.request_data.iter().filter(|i| i.persistable).count()
    }
}
