// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 ® John Hauger Mitander <john@mitander.dev>

use crate::common::error::AppError;
use crate::common::retry::retry_async;
use crate::network::provider::HttpProvider;
use alloy::primitives::Address;
use alloy::providers::Provider;
use std::time::Duration;

/// Reads the wallet's next nonce from the `pending` pool on every call.
///
/// Nothing is cached: each submission asks the node right before signing, so
/// ordering relies on the node reflecting our previous broadcast.
#[derive(Clone)]
pub struct NonceManager {
    provider: HttpProvider,
    address: Address,
}

impl NonceManager {
    pub fn new(provider: HttpProvider, address: Address) -> Self {
        Self { provider, address }
    }

    pub async fn get_next_nonce(&self) -> Result<u64, AppError> {
        let provider = self.provider.clone();
        let address = self.address;
        let nonce: u64 = retry_async(
            "pending_nonce",
            move |_| {
                let provider = provider.clone();
                async move { provider.get_transaction_count(address).pending().await }
            },
            3,
            Duration::from_millis(100),
        )
        .await
        .map_err(|e| AppError::LedgerQuery(format!("Failed to fetch nonce: {}", e)))?;

        tracing::debug!(target: "gateway", nonce, "Pending nonce fetched");
        Ok(nonce)
    }
}
