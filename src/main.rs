// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 ® John Hauger Mitander <john@mitander.dev>

use alloy::signers::local::PrivateKeySigner;
use autoswap::app::cli::{Cli, prompt_run_mode};
use autoswap::app::config::GlobalSettings;
use autoswap::app::logging::setup_logging;
use autoswap::domain::catalog::default_catalog;
use autoswap::domain::error::AppError;
use autoswap::engine::clock::TokioClock;
use autoswap::engine::context::{SwapContext, SwapPolicy};
use autoswap::engine::rng::SwapRng;
use autoswap::engine::scheduler::{CycleScheduler, RunMode};
use autoswap::network::provider::ConnectionFactory;
use autoswap::network::rpc_gateway::RpcLedgerGateway;
use clap::Parser;
use std::str::FromStr;
use std::sync::Arc;
use tokio::io::BufReader;
use tokio_util::sync::CancellationToken;

#[tokio::main]
async fn main() -> Result<(), AppError> {
    let cli = Cli::parse();

    let settings = GlobalSettings::load_with_path(cli.config.as_deref())?;
    setup_logging(settings.log_level(), settings.log_json);
    tracing::debug!(target: "config", settings = ?settings, "Settings loaded");

    if let Err(e) = run(cli, settings).await {
        tracing::error!(target: "main", error = %e, "Run aborted");
        return Err(e);
    }
    Ok(())
}

async fn run(cli: Cli, settings: GlobalSettings) -> Result<(), AppError> {
    let signer = PrivateKeySigner::from_str(settings.private_key.trim())
        .map_err(|e| AppError::Config(format!("Invalid private key: {}", e)))?;
    let wallet = signer.address();

    let provider = ConnectionFactory::http(&settings.rpc_url)?;
    let gateway = Arc::new(RpcLedgerGateway::new(
        provider,
        signer,
        settings.chain_id,
        settings.receipt_poll_ms,
        settings.receipt_timeout_ms,
    ));

    let catalog = Arc::new(default_catalog());
    let rng = Arc::new(match settings.rng_seed {
        Some(seed) => SwapRng::seeded(seed),
        None => SwapRng::from_entropy(),
    });

    tracing::info!(
        target: "main",
        wallet = %wallet,
        chain_id = settings.chain_id,
        router = %catalog.router(),
        pairs = catalog.pairs().len(),
        recovery = if settings.enable_token_recovery { "enabled" } else { "disabled" },
        "AutoSwap starting"
    );

    let mode = match cli.run_mode()? {
        Some(mode) => mode,
        None => {
            let mut stdin = BufReader::new(tokio::io::stdin());
            let mut stdout = tokio::io::stdout();
            prompt_run_mode(&mut stdin, &mut stdout, settings.cycle_count).await?
        }
    };

    let ctx = SwapContext::new(
        catalog,
        gateway,
        Arc::new(TokioClock::new()),
        rng,
        SwapPolicy::new(settings.enable_token_recovery),
    );
    let scheduler = CycleScheduler::new(ctx);

    let shutdown = CancellationToken::new();
    let signal_token = shutdown.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!(target: "main", "Ctrl-C received; finishing current cycle");
            signal_token.cancel();
        }
    });

    let summary = scheduler.run(mode, shutdown).await;
    if let RunMode::Manual { cycles } = mode {
        tracing::info!(
            target: "main",
            requested = cycles,
            completed = summary.cycles,
            swaps_ok = summary.swaps_ok,
            swaps_failed = summary.swaps_failed,
            "AutoSwap finished"
        );
    }
    Ok(())
}
