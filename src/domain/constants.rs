// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 ® John Hauger Mitander <john@oxidity.com>

use alloy::primitives::{Address, address};
use std::time::Duration;

// =============================================================================
// LEDGER IDENTIFIERS
// =============================================================================

pub const ROUTER_ADDRESS: Address = address!("b95B5953FF8ee5D5d9818CdbEfE363ff2191318c");

pub const BTC_TOKEN_ADDRESS: Address = address!("36f6414FF1df609214dDAbA71c84f18bcf00F67d");
pub const ETH_TOKEN_ADDRESS: Address = address!("0fE9B43625fA7EdD663aDcEC0728DD635e4AbF7c");
pub const USDT_TOKEN_ADDRESS: Address = address!("3ec8a8705be1d5ca90066b37ba62c4183b024ebf");

// =============================================================================
// SWAP PARAMETERS
// =============================================================================

/// 0.01% pool, used when the input side is the stable reference token.
pub const FEE_TIER_STABLE: u32 = 100;
/// 0.05% pool for every other input.
pub const FEE_TIER_DEFAULT: u32 = 500;

pub const SWAP_DEADLINE_SECS: u64 = 20 * 60;
pub const DEFAULT_MAX_RETRIES: u32 = 5;

// =============================================================================
// GAS & TRANSACTION CONSTANTS
// =============================================================================

pub const FALLBACK_GAS_LIMIT: u64 = 100_000;

/// Allowance at or above this many whole tokens counts as already approved.
pub const APPROVAL_THRESHOLD_WHOLE_TOKENS: u64 = 1_000_000;

// =============================================================================
// SCHEDULING
// =============================================================================

pub const RETRY_DELAY: Duration = Duration::from_secs(5);
pub const INTER_SWAP_PAUSE: Duration = Duration::from_secs(10);
pub const DAILY_PERIOD: Duration = Duration::from_secs(24 * 60 * 60);
pub const DAILY_BATCH_CYCLES: u32 = 3;

pub const DEFAULT_RECEIPT_POLL_MS: u64 = 1_000;
pub const DEFAULT_RECEIPT_TIMEOUT_MS: u64 = 180_000;

