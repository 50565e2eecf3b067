// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

mod config;

use std::time::Duration;

use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use aaa_state::{Attribute, FreezeOutcome, Registry, RegistryConfig, RequestContext, SessionState, ThawOutcome};

#[tokio::main]
async fn main() {
    let config = config::Config::parse();

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log_level));
    if config.log_format == "json" {
        tracing_subscriber::fmt().json().with_env_filter(env_filter).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    }

    if let Err(e) = config.validate() {
        eprintln!("error: {e}");
        std::process::exit(2);
    }

    if let Err(e) = run(config).await {
        error!("fatal: {e}");
        std::process::exit(1);
    }
}

async fn run(config: config::Config) -> Result<(), String> {
    let registry = Registry::new(RegistryConfig {
        max_sessions: config.max_sessions,
        timeout: Duration::from_millis(config.timeout_ms),
        server_id: config.server_id,
        context_id: config.context_id,
        ..RegistryConfig::default()
    })
    .map_err(|e| e.to_string())?;

    info!("round 1: fresh request, no State attribute");
    let mut first = RequestContext::new(1);
    first.session_state_ctx = Some({
        let mut ctx = SessionState::new();
        ctx.insert(Attribute::new("Challenge", b"123456".to_vec()));
        ctx
    });
    match registry.freeze(&mut first) {
        FreezeOutcome::Ok => info!(live = registry.count_live(), "issued State for round 1"),
        other => return Err(format!("unexpected freeze outcome for round 1: {other:?}")),
    }
    let wire = first
        .reply_pairs
        .find_by_name("State")
        .ok_or_else(|| "round 1 did not produce a State attribute".to_owned())?
        .value
        .clone();

    info!("round 2: client echoes State back");
    let mut second = RequestContext::new(2);
    second.request_pairs.append(Attribute::new("State", wire));
    match registry.thaw(&mut second) {
        ThawOutcome::Restored => {
            let challenge = second
                .session_state_ctx
                .as_ref()
                .and_then(|s| s.get("Challenge"))
                .map(|a| a.value.clone());
            info!(?challenge, sequence = second.sequence, "thawed round 1's state");
        }
        other => return Err(format!("unexpected thaw outcome for round 2: {other:?}")),
    }
    registry.discard(&mut second);
    info!(live = registry.count_live(), "conversation complete, entry discarded");

    info!("running a guarded section with a deadline shorter than its body");
    let parent = CancellationToken::new();
    let outcome = aaa_state::guarded(
        Duration::from_millis(config.round_deadline_ms),
        &parent,
        |child| async move {
            tokio::time::sleep(Duration::from_millis(config.round_deadline_ms * 10)).await;
            child.is_cancelled()
        },
        Some(|| async { "ran the on-timeout handler" }),
    )
    .await;
    info!(?outcome, "guarded section result");

    info!(
        created = registry.count_created(),
        timed_out = registry.count_timed_out(),
        live = registry.count_live(),
        "final registry stats"
    );
    Ok(())
}
