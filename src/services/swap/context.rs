// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 ® John Hauger Mitander <john@oxidity.com>

use crate::common::error::AppError;
use crate::domain::catalog::PairCatalog;
use crate::domain::constants::{
    DEFAULT_MAX_RETRIES, FALLBACK_GAS_LIMIT, INTER_SWAP_PAUSE, RETRY_DELAY,
};
use crate::network::gateway::{CallRequest, LedgerGateway};
use crate::services::swap::clock::Clock;
use crate::services::swap::rng::SwapRng;
use alloy::primitives::{Address, Bytes};
use std::sync::Arc;
use std::time::Duration;

/// Run-wide knobs, fixed at startup.
#[derive(Debug, Clone)]
pub struct SwapPolicy {
    pub enable_recovery: bool,
    pub max_retries: u32,
    pub retry_delay: Duration,
    pub inter_swap_pause: Duration,
}

impl SwapPolicy {
    pub fn new(enable_recovery: bool) -> Self {
        Self {
            enable_recovery,
            ..Self::default()
        }
    }
}

impl Default for SwapPolicy {
    fn default() -> Self {
        Self {
            enable_recovery: true,
            max_retries: DEFAULT_MAX_RETRIES,
            retry_delay: RETRY_DELAY,
            inter_swap_pause: INTER_SWAP_PAUSE,
        }
    }
}

/// Everything a component needs, built once and handed out by `Arc`.
pub struct SwapContext {
    pub catalog: Arc<PairCatalog>,
    pub gateway: Arc<dyn LedgerGateway>,
    pub clock: Arc<dyn Clock>,
    pub rng: Arc<SwapRng>,
    pub policy: SwapPolicy,
}

impl SwapContext {
    pub fn new(
        catalog: Arc<PairCatalog>,
        gateway: Arc<dyn LedgerGateway>,
        clock: Arc<dyn Clock>,
        rng: Arc<SwapRng>,
        policy: SwapPolicy,
    ) -> Arc<Self> {
        Arc::new(Self {
            catalog,
            gateway,
            clock,
            rng,
            policy,
        })
    }

    pub fn wallet(&self) -> Address {
        self.gateway.wallet()
    }

    pub fn router(&self) -> Address {
        self.catalog.router()
    }

    /// Price and number a call: gas price, pending nonce, then a gas estimate.
    ///
    /// A failed estimate falls back to `FALLBACK_GAS_LIMIT`; price and nonce
    /// failures propagate.
    pub async fn prepare_call(&self, to: Address, data: Bytes) -> Result<CallRequest, AppError> {
        let gas_price = self.gateway.gas_price().await?;
        let nonce = self.gateway.pending_nonce().await?;
        let mut call = CallRequest {
            to,
            data,
            gas_price,
            gas_limit: FALLBACK_GAS_LIMIT,
            nonce,
        };
        match self.gateway.estimate_gas(&call).await {
            Ok(gas) => call.gas_limit = gas,
            Err(e) => {
                tracing::warn!(
                    target: "gateway",
                    error = %e,
                    fallback = FALLBACK_GAS_LIMIT,
                    "Gas estimation failed; using fallback gas limit"
                );
            }
        }
        Ok(call)
    }
}
