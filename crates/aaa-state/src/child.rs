// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The child-state adapter: nests a subrequest's session state under a
//! parent's request-data, so a stack of module invocations on the same
//! child request can each keep isolated session state.
//!
//! Unlike the registry, there is no token, no sweep, and no lock: a child
//! entry's lifetime is bound entirely to its parent's request-data slot.

use crate::attribute::SessionState;
use crate::request::{RequestContext, RequestDataItem, RequestDataKey};

/// A subrequest's session state, parked under the parent while the child
/// isn't actively holding it.
struct ChildEntry {
    ctx: SessionState,
    data: Vec<RequestDataItem>,
}

/// Move `child`'s session bag and persistable request-data into a new child
/// entry attached to `parent` under `key`, and give `child` a fresh empty
/// session bag. No-op if both are empty.
pub fn store_in_parent(parent: &mut RequestContext, child: &mut RequestContext, key: RequestDataKey) {
    let data = child.request_data_by_persistance();
    let ctx = child.session_state_ctx.take().unwrap_or_default();

    if ctx.is_empty() && data.is_empty() {
        child.session_state_ctx = Some(ctx);
        child.request_data_restore(data);
        return;
    }

    let entry = ChildEntry { ctx, data };
    parent.request_data_add(RequestDataItem::new(key, false, entry));
    child.session_state_ctx = Some(SessionState::new());
}

/// Remove the child entry under `key` from `parent` and restore its
/// contents onto `child`. Returns `false` (refusing, per the original's
/// assertion) if no entry is found under that key.
pub fn restore_to_child(parent: &mut RequestContext, child: &mut RequestContext, key: RequestDataKey) -> bool {
    let Some(item) = parent.request_data_get(key) else {
        tracing::error!("restore_to_child: no child entry under this key");
        return false;
    };
    let Ok(entry) = item.into_inner().downcast::<ChildEntry>() else {
        tracing::error!("restore_to_child: request-data slot was not a child entry");
        return false;
    };

    child.session_state_ctx = Some(entry.ctx);
    child.request_data_restore(entry.data);
    true
}

/// Remove and drop the child entry under `key` from `parent`, if present.
pub fn discard_child(parent: &mut RequestContext, key: RequestDataKey) {
    if let Some(item) = parent.request_data_get(key) {
        drop(item.into_inner().downcast::<ChildEntry>());
    }
}

#[cfg(test)]
#[path = "child_tests.rs"]
mod tests;
