// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Registry configuration.
//!
//! The core owns no CLI flags, environment variables, or on-disk state —
//! those belong to whatever wires a [`RegistryConfig`] together (see the
//! `aaa-state-demo` binary). This type is plain data.

use std::fmt;
use std::time::Duration;

/// Name of the attribute used to carry the State token on the wire.
pub const DEFAULT_STATE_ATTRIBUTE: &str = "State";

/// Construction parameters for a [`crate::registry::Registry`].
#[derive(Debug, Clone)]
pub struct RegistryConfig {
    /// Maximum number of live entries tracked at once.
    pub max_sessions: u32,
    /// How long an entry may sit unthawed before it becomes reapable.
    pub timeout: Duration,
    /// Operator-chosen identifier embedded in minted tokens (debugging/affinity).
    pub server_id: u8,
    /// Hash of the issuing virtual context, XORed into tokens on mint and lookup.
    pub context_id: u32,
    /// Whether to guard registry mutations with a mutex. Kept as a documented
    /// knob mirroring the original's optional-mutex configuration; this crate
    /// does not offer an unlocked fast path (see `DESIGN.md`), so this only
    /// changes whether lock-discipline assertions are enforced in debug
    /// builds, not whether the lock is taken.
    pub thread_safe: bool,
    /// Name of the State attribute in the attribute dictionary.
    pub state_attribute: String,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            max_sessions: 4096,
            timeout: Duration::from_secs(30),
            server_id: 0,
            context_id: 0,
            thread_safe: true,
            state_attribute: DEFAULT_STATE_ATTRIBUTE.to_owned(),
        }
    }
}

impl RegistryConfig {
    /// Validate construction parameters, the same shape as the teacher's
    /// `Config::validate` for CLI-supplied configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_sessions == 0 {
            return Err(ConfigError::ZeroMaxSessions);
        }
        if self.timeout.is_zero() {
            return Err(ConfigError::ZeroTimeout);
        }
        if self.state_attribute.is_empty() {
            return Err(ConfigError::EmptyStateAttribute);
        }
        Ok(())
    }
}

/// Errors returned by [`RegistryConfig::validate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    ZeroMaxSessions,
    ZeroTimeout,
    EmptyStateAttribute,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ZeroMaxSessions => write!(f, "max_sessions must be greater than zero"),
            Self::ZeroTimeout => write!(f, "timeout must be greater than zero"),
            Self::EmptyStateAttribute => write!(f, "state_attribute must not be empty"),
        }
    }
}

impl std::error::Error for ConfigError {}
