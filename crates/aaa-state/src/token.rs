// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The 16-byte State token: layout, minting, and parsing.
//!
//! Field positions are semantic, not merely for obfuscation — see the offset
//! table in the crate-level spec this module implements. On the first round
//! the whole block is filled with CSPRNG output, then the structured fields
//! overwrite their positions; on later rounds the previous token is reused
//! verbatim except `tries`/`tx` advance.

use md5::{Digest, Md5};
use rand::RngCore;

/// Length of a State token in octets. ABI-visible: this is emitted verbatim
/// in the RADIUS State attribute and must round-trip byte-for-byte.
pub const LEN: usize = 16;

/// A State token: 16 opaque octets, primary key of a [`crate::entry::StateEntry`].
pub type StateToken = [u8; LEN];

const OFFSET_TRIES: usize = 0;
const OFFSET_TX: usize = 1;
const OFFSET_R0: usize = 2;
const OFFSET_SERVER_ID: usize = 3;
const OFFSET_CONTEXT_ID: std::ops::Range<usize> = 4..8;
const OFFSET_VX0: usize = 8;
const OFFSET_VX1: usize = 10;
const OFFSET_VX2: usize = 12;

/// Packed crate version, the direct analogue of the original's
/// `HEXIFY(RADIUSD_VERSION)`: `(major << 16) | (minor << 8) | patch`.
pub const BUILD_VERSION: u32 = {
    let major = parse_version_component(env!("CARGO_PKG_VERSION_MAJOR"));
    let minor = parse_version_component(env!("CARGO_PKG_VERSION_MINOR"));
    let patch = parse_version_component(env!("CARGO_PKG_VERSION_PATCH"));
    ((major as u32) << 16) | ((minor as u32) << 8) | (patch as u32)
};

const fn parse_version_component(s: &str) -> u8 {
    let bytes = s.as_bytes();
    let mut value: u32 = 0;
    let mut i = 0;
    while i < bytes.len() {
        value = value * 10 + (bytes[i] - b'0') as u32;
        i += 1;
    }
    (value & 0xff) as u8
}

/// XOR the 4-byte context-id field in place with `context_id` (big-endian).
///
/// Applied symmetrically on emit (after the wire copy is taken) and on parse,
/// so a token minted under one context id can never be redeemed under
/// another: the map is global, but the keys two contexts compute for the
/// same bytes differ.
fn xor_context(token: &mut StateToken, context_id: u32) {
    let mask = context_id.to_be_bytes();
    for (byte, m) in token[OFFSET_CONTEXT_ID].iter_mut().zip(mask) {
        *byte ^= m;
    }
}

/// Mint a State token for the next round.
///
/// Returns `(wire, key)`: `wire` is the unmasked value to place in the reply
/// attribute, `key` is the context-XORed value used as the registry's lookup
/// key. `prev` is `Some` when a request reuses an already-thawed entry.
pub fn emit(
    prev: Option<&StateToken>,
    server_id: u8,
    context_id: u32,
    rng: &mut impl RngCore,
) -> (StateToken, StateToken) {
    let mut token = match prev {
        Some(p) => *p,
        None => {
            let mut fresh = [0u8; LEN];
            rng.fill_bytes(&mut fresh);
            fresh
        }
    };

    let prev_tries = if prev.is_some() { token[OFFSET_TRIES] } else { 0 };
    let tries = prev_tries.wrapping_add(1);
    token[OFFSET_TRIES] = tries;
    token[OFFSET_TX] = tries ^ tries.wrapping_sub(1);
    token[OFFSET_SERVER_ID] = server_id;

    let r0 = token[OFFSET_R0];
    token[OFFSET_VX0] = r0 ^ (((BUILD_VERSION >> 16) & 0xff) as u8);
    token[OFFSET_VX1] = r0 ^ (((BUILD_VERSION >> 8) & 0xff) as u8);
    token[OFFSET_VX2] = r0 ^ ((BUILD_VERSION & 0xff) as u8);

    let wire = token;
    let mut key = token;
    xor_context(&mut key, context_id);
    (wire, key)
}

/// Parse an inbound State attribute's octets into a registry lookup key.
///
/// - Exactly 16 bytes: copied as-is.
/// - More than 16 bytes: reduced via MD5 — this path only exists for
///   interop with peers that echo oversized tokens, not for collision
///   resistance.
/// - Fewer than 16 bytes: copied and right-padded with zeros.
///
/// The context-id field is then XORed with `context_id`, mirroring [`emit`].
pub fn parse(input: &[u8], context_id: u32) -> StateToken {
    let mut key = [0u8; LEN];
    match input.len().cmp(&LEN) {
        std::cmp::Ordering::Equal => key.copy_from_slice(input),
        std::cmp::Ordering::Greater => {
            let digest = Md5::digest(input);
            key.copy_from_slice(&digest[..LEN]);
        }
        std::cmp::Ordering::Less => key[..input.len()].copy_from_slice(input),
    }
    xor_context(&mut key, context_id);
    key
}

/// The round counter carried in a token's `tries` byte.
pub fn tries(token: &StateToken) -> u8 {
    token[OFFSET_TRIES]
}

#[cfg(test)]
#[path = "token_tests.rs"]
mod tests;
