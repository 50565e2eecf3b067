// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use clap::Parser;

/// Toy multi-round authentication walkthrough over an in-process registry.
#[derive(Debug, Parser)]
#[command(name = "aaa-state-demo", version, about)]
pub struct Config {
    /// Maximum number of live sessions the registry will track at once.
    #[arg(long, env = "AAA_STATE_MAX_SESSIONS", default_value = "4096")]
    pub max_sessions: u32,

    /// Per-entry timeout, in milliseconds, before it becomes reapable.
    #[arg(long, env = "AAA_STATE_TIMEOUT_MS", default_value = "30000")]
    pub timeout_ms: u64,

    /// Operator-chosen identifier embedded in minted tokens.
    #[arg(long, env = "AAA_STATE_SERVER_ID", default_value = "0")]
    pub server_id: u8,

    /// Hash of the issuing virtual context, XORed into tokens.
    #[arg(long, env = "AAA_STATE_CONTEXT_ID", default_value = "0")]
    pub context_id: u32,

    /// Deadline, in milliseconds, for the demo's guarded timeout-frame section.
    #[arg(long, env = "AAA_STATE_ROUND_DEADLINE_MS", default_value = "100")]
    pub round_deadline_ms: u64,

    /// Log format (json or text).
    #[arg(long, env = "AAA_STATE_LOG_FORMAT", default_value = "text")]
    pub log_format: String,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, env = "AAA_STATE_LOG_LEVEL", default_value = "info")]
    pub log_level: String,
}

impl Config {
    pub fn validate(&self) -> Result<(), String> {
        if self.max_sessions == 0 {
            return Err("max_sessions must be greater than zero".to_owned());
        }
        if self.timeout_ms == 0 {
            return Err("timeout_ms must be greater than zero".to_owned());
        }
        Ok(())
    }
}
