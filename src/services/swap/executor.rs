// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 ® John Hauger Mitander <john@oxidity.com>

use crate::common::error::AppError;
use crate::data::abi::SwapRouter;
use crate::domain::catalog::TradingPair;
use crate::domain::constants::{FEE_TIER_DEFAULT, FEE_TIER_STABLE, SWAP_DEADLINE_SECS};
use crate::services::swap::context::SwapContext;
use crate::services::swap::oracle::{BalanceOracle, format_amount};
use crate::services::swap::recovery::RecoveryResolver;
use alloy::primitives::aliases::U24;
use alloy::primitives::{Address, B256, U160, U256};
use alloy::sol_types::SolCall;
use futures::future::BoxFuture;
use std::sync::Arc;
use std::time::Duration;

/// Whether a swap may fall back to recovery when its input is short.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwapDepth {
    TopLevel,
    /// Issued by the recovery resolver; shortfalls abort instead of recovering again.
    Recovery,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    RecoveryDisabled,
    NotRecovered,
    /// Every allowed recovery for this call already ran and the input is still short.
    RecoveryBudgetSpent,
    NoNestedRecovery,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SwapOutcome {
    Confirmed { tx_hash: B256, attempt: u32 },
    Exhausted { attempts: u32 },
    /// Aborted on insufficient balance; no attempt was consumed by the abort.
    Skipped { reason: SkipReason },
}

impl SwapOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Confirmed { .. })
    }
}

/// Per-call bookkeeping, dropped when `swap` returns.
#[derive(Debug)]
struct Attempt {
    number: u32,
    max_retries: u32,
    recoveries: u32,
    waited: Duration,
}

#[derive(Debug)]
enum AttemptState {
    CheckBalance,
    Insufficient { balance: U256, required: U256 },
    Sufficient { amount_in: U256 },
    Failed(AppError),
}

enum Shortfall {
    Recovered,
    Abort(SkipReason),
    /// The recovery itself hit a ledger error; costs an attempt like any other failure.
    Failed(AppError),
}

enum BalanceCheck {
    Covered(U256),
    Short { balance: U256, required: U256 },
}

/// Retry state machine for one pair: check balance, optionally recover,
/// build params, estimate gas, submit, confirm.
#[derive(Clone)]
pub struct SwapExecutor {
    ctx: Arc<SwapContext>,
    oracle: BalanceOracle,
    resolver: RecoveryResolver,
}

impl SwapExecutor {
    pub fn new(ctx: Arc<SwapContext>) -> Self {
        Self {
            oracle: BalanceOracle::new(ctx.clone()),
            resolver: RecoveryResolver::new(ctx.clone()),
            ctx,
        }
    }

    pub async fn swap(&self, pair: &TradingPair, max_retries: u32) -> SwapOutcome {
        self.run(pair, max_retries, SwapDepth::TopLevel).await
    }

    /// Entry point for the recovery resolver. Boxed to break the
    /// executor -> resolver -> executor future cycle.
    pub fn swap_nested<'a>(
        &'a self,
        pair: &'a TradingPair,
        max_retries: u32,
    ) -> BoxFuture<'a, SwapOutcome> {
        Box::pin(self.run(pair, max_retries, SwapDepth::Recovery))
    }

    async fn run(&self, pair: &TradingPair, max_retries: u32, depth: SwapDepth) -> SwapOutcome {
        let mut attempt = Attempt {
            number: 1,
            max_retries: max_retries.max(1),
            recoveries: 0,
            waited: Duration::ZERO,
        };
        let mut state = AttemptState::CheckBalance;

        loop {
            state = match state {
                AttemptState::CheckBalance => {
                    tracing::info!(
                        target: "swap",
                        pair = %pair,
                        attempt = attempt.number,
                        max = attempt.max_retries,
                        "Swap attempt"
                    );
                    match self.check_balance(pair).await {
                        Ok(BalanceCheck::Covered(amount_in)) => AttemptState::Sufficient { amount_in },
                        Ok(BalanceCheck::Short { balance, required }) => {
                            AttemptState::Insufficient { balance, required }
                        }
                        Err(e) => AttemptState::Failed(e),
                    }
                }
                AttemptState::Insufficient { balance, required } => {
                    if let Ok(token) = self.ctx.catalog.token(pair.token_in) {
                        tracing::warn!(
                            target: "swap",
                            pair = %pair,
                            available = %format_amount(token, balance),
                            needed = %format_amount(token, required),
                            "Insufficient {} balance",
                            pair.in_name
                        );
                    }
                    match self.resolve_shortfall(pair, &mut attempt, depth).await {
                        Shortfall::Recovered => {
                            tracing::info!(target: "swap", pair = %pair, "Retrying after recovery");
                            AttemptState::CheckBalance
                        }
                        Shortfall::Abort(reason) => {
                            tracing::warn!(target: "swap", pair = %pair, ?reason, "Skipping pair");
                            return SwapOutcome::Skipped { reason };
                        }
                        Shortfall::Failed(e) => AttemptState::Failed(e),
                    }
                }
                AttemptState::Sufficient { amount_in } => {
                    match self.submit_swap(pair, amount_in).await {
                        Ok(tx_hash) => {
                            tracing::info!(
                                target: "swap",
                                pair = %pair,
                                hash = %format!("{:#x}", tx_hash),
                                attempt = attempt.number,
                                "Swap confirmed"
                            );
                            return SwapOutcome::Confirmed {
                                tx_hash,
                                attempt: attempt.number,
                            };
                        }
                        Err(e) => AttemptState::Failed(e),
                    }
                }
                AttemptState::Failed(e) => {
                    tracing::warn!(
                        target: "swap",
                        pair = %pair,
                        attempt = attempt.number,
                        error = %e,
                        "Swap attempt failed"
                    );
                    if attempt.number >= attempt.max_retries {
                        tracing::error!(
                            target: "swap",
                            pair = %pair,
                            attempts = attempt.number,
                            waited_secs = attempt.waited.as_secs(),
                            "Giving up on pair, moving on"
                        );
                        return SwapOutcome::Exhausted {
                            attempts: attempt.number,
                        };
                    }
                    let delay = self.ctx.policy.retry_delay;
                    self.ctx.clock.sleep(delay).await;
                    attempt.waited += delay;
                    attempt.number += 1;
                    AttemptState::CheckBalance
                }
            };
        }
    }

    async fn check_balance(&self, pair: &TradingPair) -> Result<BalanceCheck, AppError> {
        let token = self.ctx.catalog.token(pair.token_in)?;
        let balance = self.oracle.get_balance(pair.token_in).await?;
        let required = self.oracle.random_swap_amount(token);
        if balance < required {
            Ok(BalanceCheck::Short { balance, required })
        } else {
            Ok(BalanceCheck::Covered(required))
        }
    }

    /// A recovery never consumes an attempt: success re-checks the same
    /// attempt, a fruitless search aborts the pair.
    async fn resolve_shortfall(
        &self,
        pair: &TradingPair,
        attempt: &mut Attempt,
        depth: SwapDepth,
    ) -> Shortfall {
        if depth == SwapDepth::Recovery {
            return Shortfall::Abort(SkipReason::NoNestedRecovery);
        }
        if !self.ctx.policy.enable_recovery {
            tracing::info!(target: "swap", token = %pair.in_name, "Token recovery disabled");
            return Shortfall::Abort(SkipReason::RecoveryDisabled);
        }
        if attempt.recoveries >= attempt.max_retries {
            return Shortfall::Abort(SkipReason::RecoveryBudgetSpent);
        }
        attempt.recoveries += 1;
        match self
            .resolver
            .recover(self, pair.token_in, attempt.max_retries)
            .await
        {
            Ok(true) => Shortfall::Recovered,
            Ok(false) => Shortfall::Abort(SkipReason::NotRecovered),
            Err(e) => Shortfall::Failed(e),
        }
    }

    async fn submit_swap(&self, pair: &TradingPair, amount_in: U256) -> Result<B256, AppError> {
        let params = self.build_params(pair, amount_in);
        if let Ok(token) = self.ctx.catalog.token(pair.token_in) {
            tracing::info!(
                target: "swap",
                amount = %format_amount(token, amount_in),
                pair = %pair,
                fee_pct = f64::from(fee_tier(pair, self.ctx.catalog.stable_token())) / 10_000.0,
                recipient = %params.recipient,
                "Swap parameters"
            );
        }
        let data = SwapRouter::exactInputSingleCall { params }.abi_encode();
        let call = self.ctx.prepare_call(self.ctx.router(), data.into()).await?;
        let status = self.ctx.gateway.submit_and_wait(call).await?;
        status.into_confirmed()
    }

    /// Zero `amountOutMinimum` and `sqrtPriceLimitX96`: no slippage bound.
    pub fn build_params(
        &self,
        pair: &TradingPair,
        amount_in: U256,
    ) -> SwapRouter::ExactInputSingleParams {
        let fee = fee_tier(pair, self.ctx.catalog.stable_token());
        SwapRouter::ExactInputSingleParams {
            tokenIn: pair.token_in,
            tokenOut: pair.token_out,
            fee: U24::from(fee),
            recipient: self.ctx.wallet(),
            deadline: U256::from(self.ctx.clock.unix_now() + SWAP_DEADLINE_SECS),
            amountIn: amount_in,
            amountOutMinimum: U256::ZERO,
            sqrtPriceLimitX96: U160::ZERO,
        }
    }
}

/// Lower pool fee when selling the stable reference token.
pub fn fee_tier(pair: &TradingPair, stable_token: Address) -> u32 {
    if pair.token_in == stable_token {
        FEE_TIER_STABLE
    } else {
        FEE_TIER_DEFAULT
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::catalog::default_catalog;
    use crate::domain::constants::USDT_TOKEN_ADDRESS;

    #[test]
    fn stable_input_uses_low_fee_tier() {
        let catalog = default_catalog();
        for pair in catalog.pairs() {
            let expected = if pair.token_in == USDT_TOKEN_ADDRESS {
                100
            } else {
                500
            };
            assert_eq!(fee_tier(pair, catalog.stable_token()), expected, "{pair}");
        }
    }

    #[test]
    fn only_confirmed_is_success() {
        assert!(
            SwapOutcome::Confirmed {
                tx_hash: B256::ZERO,
                attempt: 1
            }
            .is_success()
        );
        assert!(!SwapOutcome::Exhausted { attempts: 5 }.is_success());
        assert!(
            !SwapOutcome::Skipped {
                reason: SkipReason::NotRecovered
            }
            .is_success()
        );
    }
}
