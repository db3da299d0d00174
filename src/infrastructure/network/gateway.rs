// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 ® John Hauger Mitander <john@oxidity.com>

use crate::common::error::AppError;
use alloy::primitives::{Address, B256, Bytes, U256};
use async_trait::async_trait;

/// A fully priced contract call ready for signing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallRequest {
    pub to: Address,
    pub data: Bytes,
    pub gas_price: u128,
    pub gas_limit: u64,
    pub nonce: u64,
}

/// What the ledger reported once a submitted transaction settled (or didn't).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReceiptStatus {
    ConfirmedSuccess(B256),
    ConfirmedRevert(B256),
    UnknownTimeout(B256),
}

impl ReceiptStatus {
    /// Collapse revert and timeout into a submission error.
    pub fn into_confirmed(self) -> Result<B256, AppError> {
        match self {
            Self::ConfirmedSuccess(hash) => Ok(hash),
            Self::ConfirmedRevert(hash) => Err(AppError::SwapSubmission {
                hash: Some(format!("{hash:#x}")),
                reason: "reverted on-chain".into(),
            }),
            Self::UnknownTimeout(hash) => Err(AppError::SwapSubmission {
                hash: Some(format!("{hash:#x}")),
                reason: "confirmation timed out".into(),
            }),
        }
    }
}

/// Everything the swap engine needs from the chain. Every call may fail or time out.
#[async_trait]
pub trait LedgerGateway: Send + Sync {
    /// Address of the signing wallet.
    fn wallet(&self) -> Address;

    async fn pending_nonce(&self) -> Result<u64, AppError>;

    async fn gas_price(&self) -> Result<u128, AppError>;

    /// Gas estimate for `call` sent from the wallet; `gas_limit` on the request is ignored.
    async fn estimate_gas(&self, call: &CallRequest) -> Result<u64, AppError>;

    async fn balance_of(&self, token: Address) -> Result<U256, AppError>;

    async fn allowance(&self, token: Address, spender: Address) -> Result<U256, AppError>;

    async fn decimals(&self, token: Address) -> Result<u8, AppError>;

    /// Sign, broadcast and wait for the receipt.
    async fn submit_and_wait(&self, call: CallRequest) -> Result<ReceiptStatus, AppError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_success_counts_as_confirmed() {
        let hash = B256::from([9u8; 32]);
        assert_eq!(
            ReceiptStatus::ConfirmedSuccess(hash).into_confirmed().unwrap(),
            hash
        );
        for status in [
            ReceiptStatus::ConfirmedRevert(hash),
            ReceiptStatus::UnknownTimeout(hash),
        ] {
            match status.into_confirmed() {
                Err(AppError::SwapSubmission { hash: Some(h), .. }) => {
                    assert_eq!(h, format!("{hash:#x}"))
                }
                other => panic!("unexpected {other:?}"),
            }
        }
    }
}
