// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::expect_used, clippy::unwrap_used)]

use proptest::prelude::*;

use aaa_state::{token, FreezeOutcome, ThawOutcome};
use aaa_state_specs::{issued_state, registry_with_context, request_echoing_state, request_with_session_state, roomy_registry};

proptest! {
    /// Invariant 4: `tries` after the n-th freeze/thaw cycle equals n.
    #[test]
    fn tries_advances_by_exactly_one_per_round(rounds in 1usize..8) {
        let registry = roomy_registry();
        let mut wire: Option<Vec<u8>> = None;

        for round in 1..=rounds {
            let mut request = match wire {
                Some(w) => {
                    let mut request = request_echoing_state(round as u64, w);
                    prop_assert_eq!(registry.thaw(&mut request), ThawOutcome::Restored);
                    request
                }
                None => request_with_session_state(round as u64, "Seed", b"x"),
            };
            prop_assert_eq!(registry.freeze(&mut request), FreezeOutcome::Ok);
            let issued = issued_state(&request).expect("freeze always appends State on Ok");
            prop_assert_eq!(token::tries(issued.as_slice().try_into().unwrap()) as usize, round);
            wire = Some(issued);
        }
    }

    /// Invariant 6: parse(emit(...)) round-trips back to the minted key for
    /// every context id, not just a hand-picked sample.
    #[test]
    fn context_round_trip_holds_for_arbitrary_context_ids(context_id in any::<u32>()) {
        let registry = registry_with_context(context_id);
        let mut request = request_with_session_state(1, "X", b"y");
        prop_assert_eq!(registry.freeze(&mut request), FreezeOutcome::Ok);
        let wire = issued_state(&request).unwrap();

        let mut redeem = request_echoing_state(2, wire);
        prop_assert_eq!(registry.thaw(&mut redeem), ThawOutcome::Restored);
    }

    /// Invariant 2: a token minted under one context is unknown under any
    /// other context.
    #[test]
    fn cross_context_redemption_always_fails(a in any::<u32>(), b in any::<u32>()) {
        prop_assume!(a != b);
        let minted_under = registry_with_context(a);
        let other = registry_with_context(b);

        let mut request = request_with_session_state(1, "X", b"y");
        prop_assert_eq!(minted_under.freeze(&mut request), FreezeOutcome::Ok);
        let wire = issued_state(&request).unwrap();

        let mut redeem = request_echoing_state(2, wire);
        prop_assert_eq!(other.thaw(&mut redeem), ThawOutcome::UnknownState);
    }

    /// Invariant 3: the session bag observed after thaw is byte-equal to
    /// the one owned before freeze, for arbitrary attribute payloads.
    #[test]
    fn session_state_round_trips_byte_for_byte(payload in prop::collection::vec(any::<u8>(), 0..64)) {
        let registry = roomy_registry();
        let mut first = request_with_session_state(1, "Payload", &payload);
        prop_assert_eq!(registry.freeze(&mut first), FreezeOutcome::Ok);
        let wire = issued_state(&first).unwrap();

        let mut second = request_echoing_state(2, wire);
        prop_assert_eq!(registry.thaw(&mut second), ThawOutcome::Restored);
        let restored = second.session_state_ctx.as_ref().unwrap().get("Payload").unwrap();
        prop_assert_eq!(&restored.value, &payload);
    }
}

/// Invariant 5: sweeping twice at the same instant is indistinguishable
/// from sweeping once (no double-counting of timed-out entries).
#[test]
fn sweep_at_the_same_instant_is_idempotent() {
    use aaa_state::FakeClock;
    use std::sync::Arc;
    use std::time::Duration;

    let clock = Arc::new(FakeClock::new());
    let registry = aaa_state::Registry::with_clock(
        aaa_state::RegistryConfig { timeout: Duration::from_millis(10), ..Default::default() },
        clock.clone(),
    )
    .unwrap();

    let mut first = request_with_session_state(1, "A", b"1");
    assert_eq!(registry.freeze(&mut first), FreezeOutcome::Ok);

    clock.advance(Duration::from_millis(50));

    // Two freezes back to back at the same (paused) instant: the second
    // sweep must find nothing left to reap.
    let mut second = request_with_session_state(2, "B", b"2");
    registry.freeze(&mut second);
    let timed_out_after_first_sweep = registry.count_timed_out();

    let mut third = request_with_session_state(3, "C", b"3");
    registry.freeze(&mut third);
    assert_eq!(registry.count_timed_out(), timed_out_after_first_sweep);
}
