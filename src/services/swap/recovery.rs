// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 ® John Hauger Mitander <john@oxidity.com>

use crate::common::error::AppError;
use crate::domain::catalog::TradingPair;
use crate::services::swap::context::SwapContext;
use crate::services::swap::executor::SwapExecutor;
use crate::services::swap::oracle::{BalanceOracle, format_amount};
use alloy::primitives::Address;
use std::sync::Arc;

/// Finds an alternate pair that produces a short token and swaps into it.
#[derive(Clone)]
pub struct RecoveryResolver {
    ctx: Arc<SwapContext>,
    oracle: BalanceOracle,
}

impl RecoveryResolver {
    pub fn new(ctx: Arc<SwapContext>) -> Self {
        let oracle = BalanceOracle::new(ctx.clone());
        Self { ctx, oracle }
    }

    /// One pass over the pairs producing `target`, in random order.
    ///
    /// Candidates whose own input is short are skipped; their swaps run with
    /// recovery off, so a recovery never triggers another recovery. A failed
    /// balance read is returned to the caller's attempt loop.
    pub async fn recover(
        &self,
        executor: &SwapExecutor,
        target: Address,
        max_retries: u32,
    ) -> Result<bool, AppError> {
        let target_name = self
            .ctx
            .catalog
            .token(target)
            .map(|t| t.name.clone())
            .unwrap_or_else(|_| format!("{target:#x}"));

        if !self.ctx.policy.enable_recovery {
            tracing::info!(target: "recovery", token = %target_name, "Token recovery disabled");
            return Ok(false);
        }

        let mut candidates: Vec<TradingPair> = self
            .ctx
            .catalog
            .pairs_producing(target)
            .into_iter()
            .cloned()
            .collect();
        self.ctx.rng.shuffle(&mut candidates);
        tracing::info!(
            target: "recovery",
            token = %target_name,
            candidates = candidates.len(),
            "Trying to acquire token via alternate pairs"
        );

        for pair in &candidates {
            let Ok(input) = self.ctx.catalog.token(pair.token_in) else {
                continue;
            };
            let balance = self.oracle.get_balance(pair.token_in).await?;
            let probe = self.oracle.random_swap_amount(input);
            if balance < probe {
                tracing::warn!(
                    target: "recovery",
                    pair = %pair,
                    available = %format_amount(input, balance),
                    needed = %format_amount(input, probe),
                    "Insufficient {} for recovery",
                    input.name
                );
                continue;
            }

            tracing::info!(target: "recovery", pair = %pair, "Swapping to recover {}", pair.out_name);
            if executor.swap_nested(pair, max_retries).await.is_success() {
                tracing::info!(target: "recovery", pair = %pair, "Recovered {}", pair.out_name);
                return Ok(true);
            }
        }

        tracing::warn!(target: "recovery", token = %target_name, "Could not acquire token via any alternate pair");
        Ok(false)
    }
}
