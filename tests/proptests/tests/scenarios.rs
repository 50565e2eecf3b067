// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::expect_used, clippy::unwrap_used)]

use std::sync::Arc;
use std::time::Duration;

use aaa_state::{
    guarded, token, Attribute, FakeClock, FreezeOutcome, Registry, RegistryConfig, ThawOutcome, TimeoutOutcome,
};
use aaa_state_specs::{issued_state, request_echoing_state, request_with_session_state, roomy_registry};
use tokio_util::sync::CancellationToken;

#[test]
fn s1_first_challenge() {
    let registry = roomy_registry();
    let mut request = request_with_session_state(1, "Challenge", b"123456");

    assert_eq!(registry.freeze(&mut request), FreezeOutcome::Ok);
    let wire = issued_state(&request).expect("State attribute in reply");

    assert_eq!(wire.len(), 16);
    assert_eq!(registry.count_live(), 1);
    assert_eq!(registry.count_created(), 1);
}

#[test]
fn s2_second_round() {
    let registry = roomy_registry();
    let mut first = request_with_session_state(1, "Challenge", b"123456");
    registry.freeze(&mut first);
    let first_wire = issued_state(&first).unwrap();

    let mut second = request_echoing_state(2, first_wire.clone());
    assert_eq!(registry.thaw(&mut second), ThawOutcome::Restored);
    assert_eq!(
        second.session_state_ctx.as_ref().unwrap().get("Challenge").unwrap().value,
        b"123456"
    );

    second
        .session_state_ctx
        .as_mut()
        .unwrap()
        .insert(Attribute::new("Reply-Message", b"step2".to_vec()));
    assert_eq!(registry.freeze(&mut second), FreezeOutcome::Ok);

    let second_wire = issued_state(&second).unwrap();
    let second_token: [u8; 16] = second_wire.clone().try_into().unwrap();
    assert_eq!(token::tries(&second_token), 2);
    assert_eq!(second_token[1], 2 ^ 1);

    let first_token: [u8; 16] = first_wire.try_into().unwrap();
    assert_ne!(first_token[4..8], second_token[4..8], "the context field still differs round to round");
    assert_eq!(registry.count_live(), 1, "the entry was reused, not duplicated");
}

#[test]
fn s3_terminal_discard() {
    let registry = roomy_registry();
    let mut first = request_with_session_state(1, "Challenge", b"123456");
    registry.freeze(&mut first);
    let wire = issued_state(&first).unwrap();

    let mut second = request_echoing_state(2, wire);
    registry.thaw(&mut second);
    registry.discard(&mut second);

    assert_eq!(registry.count_live(), 0);
    assert!(issued_state(&second).is_none());
    assert!(second.session_state_ctx.as_ref().unwrap().is_empty());
}

#[test]
fn s4_expiry() {
    let clock = Arc::new(FakeClock::new());
    let registry = Registry::with_clock(
        RegistryConfig { max_sessions: 2, timeout: Duration::from_millis(100), ..Default::default() },
        clock.clone(),
    )
    .unwrap();

    let mut first = request_with_session_state(1, "A", b"1");
    assert_eq!(registry.freeze(&mut first), FreezeOutcome::Ok);
    let mut second = request_with_session_state(2, "B", b"2");
    assert_eq!(registry.freeze(&mut second), FreezeOutcome::Ok);

    clock.advance(Duration::from_millis(150));

    let mut third = request_with_session_state(3, "C", b"3");
    assert_eq!(registry.freeze(&mut third), FreezeOutcome::Ok);

    assert_eq!(registry.count_timed_out(), 2);
    assert_eq!(registry.count_live(), 1);
}

#[test]
fn s5_context_isolation() {
    let registry_a = Registry::new(RegistryConfig { context_id: 0x1111_1111, ..Default::default() }).unwrap();
    let registry_b = Registry::new(RegistryConfig { context_id: 0x2222_2222, ..Default::default() }).unwrap();

    let mut request = request_with_session_state(1, "A", b"1");
    registry_a.freeze(&mut request);
    let wire = issued_state(&request).unwrap();

    let mut redeem = request_echoing_state(2, wire);
    assert_eq!(registry_b.thaw(&mut redeem), ThawOutcome::UnknownState);
}

#[tokio::test(start_paused = true)]
async fn s6_timeout_frame() {
    let parent = CancellationToken::new();
    let outcome = guarded(
        Duration::from_millis(100),
        &parent,
        |child| async move {
            tokio::time::sleep(Duration::from_millis(500)).await;
            child.is_cancelled()
        },
        Some(|| async { "handler ran with MODULE_TIMEOUT semantics" }),
    )
    .await;

    match outcome {
        TimeoutOutcome::Expired(Some(handler_ran)) => assert_eq!(handler_ran, "handler ran with MODULE_TIMEOUT semantics"),
        other => panic!("expected the deadline to fire with a handler result, got {other:?}"),
    }
}

