// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The timeout frame: a guarded section with a wall-clock deadline that
//! cancels everything nested beneath it (but not itself) on expiry.
//!
//! Re-expressed as a small `pending -> expired | completed` state machine —
//! here, that state machine is simply the compiler-generated future produced
//! by this `async fn`, so no explicit frame bookkeeping is needed.

use std::future::Future;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

/// Outcome of a [`guarded`] section: `B` is the guarded body's result type,
/// `H` is the optional on-timeout handler's result type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeoutOutcome<B, H> {
    /// The body finished before the deadline; its result passes through
    /// unchanged, the "fired == false" branch of the original.
    Completed(B),
    /// The deadline fired first. Carries the handler's result if one was
    /// supplied and ran, standing in for the `MODULE_TIMEOUT` sentinel.
    Expired(Option<H>),
}

/// Run `body` under a deadline of `duration`, racing it against a timer.
///
/// `body` receives a child of `parent` — cancelled if and only if the
/// deadline fires first — so nested work can check it and unwind
/// cooperatively; `parent` itself is never cancelled by this frame, the
/// direct analogue of "frames are signalled strictly above the timeout
/// frame" so the frame's own teardown still runs. If the deadline fires and
/// `handler` is `Some`, it runs afterward with no further deadline of its
/// own.
pub async fn guarded<Body, BodyFut, B, Handler, HandlerFut, H>(
    duration: Duration,
    parent: &CancellationToken,
    body: Body,
    handler: Option<Handler>,
) -> TimeoutOutcome<B, H>
where
    Body: FnOnce(CancellationToken) -> BodyFut,
    BodyFut: Future<Output = B>,
    Handler: FnOnce() -> HandlerFut,
    HandlerFut: Future<Output = H>,
{
    let child = parent.child_token();
    let body_fut = body(child.clone());
    tokio::pin!(body_fut);

    tokio::select! {
        result = &mut body_fut => TimeoutOutcome::Completed(result),
        _ = tokio::time::sleep(duration) => {
            tracing::warn!(?duration, "timeout frame fired, cancelling nested frames");
            child.cancel();
            match handler {
                Some(h) => TimeoutOutcome::Expired(Some(h().await)),
                None => TimeoutOutcome::Expired(None),
            }
        }
    }
}

#[cfg(test)]
#[path = "timeout_frame_tests.rs"]
mod tests;
