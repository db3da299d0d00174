// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 ® John Hauger Mitander <john@oxidity.com>

use crate::common::error::AppError;
use crate::common::retry::retry_async;
use crate::network::provider::HttpProvider;
use alloy::providers::Provider;
use std::time::Duration;

/// Legacy gas price source, queried fresh before every transaction.
#[derive(Clone)]
pub struct GasOracle {
    provider: HttpProvider,
}

impl GasOracle {
    pub fn new(provider: HttpProvider) -> Self {
        Self { provider }
    }

    pub async fn gas_price(&self) -> Result<u128, AppError> {
        let provider = self.provider.clone();
        let price = retry_async(
            "gas_price",
            move |_| {
                let provider = provider.clone();
                async move { provider.get_gas_price().await }
            },
            3,
            Duration::from_millis(100),
        )
        .await
        .map_err(|e| AppError::LedgerQuery(format!("Gas price failed: {}", e)))?;

        tracing::debug!(target: "gateway", gas_price = price, "Gas price fetched");
        Ok(price)
    }
}
