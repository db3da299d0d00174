// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 ® John Hauger Mitander <john@oxidity.com>

use crate::common::error::AppError;
use crate::domain::catalog::Token;
use crate::services::swap::context::SwapContext;
use crate::services::swap::rng::SwapRng;
use alloy::primitives::utils::format_units;
use alloy::primitives::{Address, U256};
use std::sync::Arc;

/// Read-only balance/allowance view of the wallet plus swap-size draws.
#[derive(Clone)]
pub struct BalanceOracle {
    ctx: Arc<SwapContext>,
}

impl BalanceOracle {
    pub fn new(ctx: Arc<SwapContext>) -> Self {
        Self { ctx }
    }

    pub async fn get_balance(&self, token: Address) -> Result<U256, AppError> {
        self.ctx.gateway.balance_of(token).await
    }

    /// Allowance the wallet has granted the router.
    pub async fn get_allowance(&self, token: Address) -> Result<U256, AppError> {
        self.ctx
            .gateway
            .allowance(token, self.ctx.router())
            .await
    }

    pub fn random_swap_amount(&self, token: &Token) -> U256 {
        random_swap_amount(token, &self.ctx.rng)
    }
}

/// Uniform draw inside `[swap_min, swap_max]` on the token's display grid,
/// returned in smallest units.
///
/// The draw is made over integer ticks of `10^-display_decimals`, bounded by
/// `ceil(min)` and `floor(max)` on that grid, so the result never leaves the
/// configured range. A range too narrow to hold a tick collapses to its
/// rounded minimum.
pub fn random_swap_amount(token: &Token, rng: &SwapRng) -> U256 {
    let scale = 10f64.powi(i32::from(token.display_decimals));
    let min_scaled = token.swap_min * scale;
    let max_scaled = token.swap_max * scale;
    let mut lo = snap(min_scaled, f64::ceil);
    let hi = snap(max_scaled, f64::floor);
    if lo > hi {
        lo = min_scaled.round() as u64;
    }
    let ticks = rng.between(lo, hi);
    let unit_shift = token.decimals.saturating_sub(token.display_decimals);
    U256::from(ticks) * U256::from(10u64).pow(U256::from(unit_shift))
}

// Absorb float error like 0.015 * 1e6 = 15000.000000000002 before rounding.
fn snap(value: f64, round: fn(f64) -> f64) -> u64 {
    let nearest = value.round();
    if (value - nearest).abs() < 1e-6 {
        nearest as u64
    } else {
        round(value) as u64
    }
}

/// Human rendering at the token's display precision, e.g. `0.012345`.
pub fn format_amount(token: &Token, amount: U256) -> String {
    let precision = usize::from(token.display_decimals);
    match format_units(amount, token.decimals) {
        Ok(text) => match text.parse::<f64>() {
            Ok(value) => format!("{value:.precision$}"),
            Err(_) => text,
        },
        Err(_) => amount.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::catalog::default_catalog;

    fn to_human(token: &Token, amount: U256) -> f64 {
        format_units(amount, token.decimals)
            .unwrap()
            .parse::<f64>()
            .unwrap()
    }

    #[test]
    fn draws_stay_in_range_on_display_grid() {
        let rng = SwapRng::seeded(7);
        for token in default_catalog().tokens() {
            let grid =
                U256::from(10u64).pow(U256::from(token.decimals - token.display_decimals));
            for _ in 0..500 {
                let amount = random_swap_amount(token, &rng);
                let human = to_human(token, amount);
                assert!(
                    human >= token.swap_min - 1e-12 && human <= token.swap_max + 1e-12,
                    "{} {} outside [{}, {}]",
                    token.name,
                    human,
                    token.swap_min,
                    token.swap_max
                );
                assert_eq!(amount % grid, U256::ZERO, "{} not on display grid", token.name);
            }
        }
    }

    #[test]
    fn degenerate_range_returns_the_single_value() {
        let token = Token::new(Address::ZERO, "FIX", 6, (2.5, 2.5), 1);
        let rng = SwapRng::seeded(3);
        assert_eq!(random_swap_amount(&token, &rng), U256::from(2_500_000u64));
    }

    #[test]
    fn formats_at_display_precision() {
        let catalog = default_catalog();
        let usdt = catalog.token(catalog.stable_token()).unwrap();
        let amount = U256::from(123_456u64) * U256::from(10u64).pow(U256::from(16u64));
        assert_eq!(format_amount(usdt, amount), "1234.56");
    }
}
