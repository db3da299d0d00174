// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 ® John Hauger Mitander <john@oxidity.com>

use crate::common::error::AppError;
use crate::common::retry::retry_async;
use crate::data::abi::ERC20;
use crate::network::gas::GasOracle;
use crate::network::gateway::{CallRequest, LedgerGateway, ReceiptStatus};
use crate::network::nonce::NonceManager;
use crate::network::provider::HttpProvider;
use alloy::consensus::{SignableTransaction, TxEnvelope, TxLegacy};
use alloy::eips::eip2718::Encodable2718;
use alloy::network::TxSignerSync;
use alloy::primitives::{Address, B256, TxKind, U256};
use alloy::providers::Provider;
use alloy::rpc::types::eth::{TransactionInput, TransactionRequest};
use alloy::signers::local::PrivateKeySigner;
use async_trait::async_trait;
use std::time::{Duration, Instant};

/// JSON-RPC backed gateway signing legacy (EIP-155) transactions locally.
pub struct RpcLedgerGateway {
    provider: HttpProvider,
    signer: PrivateKeySigner,
    chain_id: u64,
    nonce_manager: NonceManager,
    gas_oracle: GasOracle,
    receipt_poll: Duration,
    receipt_timeout: Duration,
}

impl RpcLedgerGateway {
    pub fn new(
        provider: HttpProvider,
        signer: PrivateKeySigner,
        chain_id: u64,
        receipt_poll_ms: u64,
        receipt_timeout_ms: u64,
    ) -> Self {
        let nonce_manager = NonceManager::new(provider.clone(), signer.address());
        let gas_oracle = GasOracle::new(provider.clone());
        Self {
            provider,
            signer,
            chain_id,
            nonce_manager,
            gas_oracle,
            receipt_poll: Duration::from_millis(receipt_poll_ms.max(1)),
            receipt_timeout: Duration::from_millis(receipt_timeout_ms.max(1)),
        }
    }

    fn sign_legacy(&self, call: &CallRequest) -> Result<(Vec<u8>, B256), AppError> {
        let mut tx = TxLegacy {
            chain_id: Some(self.chain_id),
            nonce: call.nonce,
            gas_price: call.gas_price,
            gas_limit: call.gas_limit,
            to: TxKind::Call(call.to),
            value: U256::ZERO,
            input: call.data.clone(),
        };

        let sig = TxSignerSync::sign_transaction_sync(&self.signer, &mut tx)
            .map_err(|e| AppError::SwapSubmission {
                hash: None,
                reason: format!("Sign tx failed: {}", e),
            })?;
        let signed: TxEnvelope = tx.into_signed(sig).into();
        let raw = signed.encoded_2718();
        Ok((raw, *signed.tx_hash()))
    }

    async fn await_receipt(&self, hash: B256) -> ReceiptStatus {
        let started = Instant::now();
        while started.elapsed() < self.receipt_timeout {
            match self.provider.get_transaction_receipt(hash).await {
                Ok(Some(rcpt)) => {
                    return if rcpt.status() {
                        ReceiptStatus::ConfirmedSuccess(hash)
                    } else {
                        ReceiptStatus::ConfirmedRevert(hash)
                    };
                }
                Ok(None) => {}
                Err(e) => {
                    tracing::debug!(
                        target: "gateway",
                        error = %e,
                        hash = %format!("{:#x}", hash),
                        "Receipt lookup error; retrying"
                    );
                }
            }
            tokio::time::sleep(self.receipt_poll).await;
        }
        ReceiptStatus::UnknownTimeout(hash)
    }
}

#[async_trait]
impl LedgerGateway for RpcLedgerGateway {
    fn wallet(&self) -> Address {
        self.signer.address()
    }

    async fn pending_nonce(&self) -> Result<u64, AppError> {
        self.nonce_manager.get_next_nonce().await
    }

    async fn gas_price(&self) -> Result<u128, AppError> {
        self.gas_oracle.gas_price().await
    }

    async fn estimate_gas(&self, call: &CallRequest) -> Result<u64, AppError> {
        let request = TransactionRequest {
            from: Some(self.signer.address()),
            to: Some(TxKind::Call(call.to)),
            gas_price: Some(call.gas_price),
            input: TransactionInput::new(call.data.clone()),
            nonce: Some(call.nonce),
            chain_id: Some(self.chain_id),
            ..Default::default()
        };
        self.provider
            .estimate_gas(request)
            .await
            .map_err(|e| AppError::LedgerQuery(format!("estimate_gas failed: {e}")))
    }

    async fn balance_of(&self, token: Address) -> Result<U256, AppError> {
        let contract = ERC20::new(token, self.provider.clone());
        let owner = self.signer.address();
        retry_async(
            "balance_of",
            move |_| {
                let contract = contract.clone();
                async move { contract.balanceOf(owner).call().await }
            },
            3,
            Duration::from_millis(100),
        )
        .await
        .map_err(|e| AppError::LedgerQuery(format!("Token balance failed: {}", e)))
    }

    async fn allowance(&self, token: Address, spender: Address) -> Result<U256, AppError> {
        let contract = ERC20::new(token, self.provider.clone());
        let owner = self.signer.address();
        retry_async(
            "allowance",
            move |_| {
                let contract = contract.clone();
                async move { contract.allowance(owner, spender).call().await }
            },
            3,
            Duration::from_millis(100),
        )
        .await
        .map_err(|e| AppError::LedgerQuery(format!("Allowance failed: {}", e)))
    }

    async fn decimals(&self, token: Address) -> Result<u8, AppError> {
        let contract = ERC20::new(token, self.provider.clone());
        retry_async(
            "decimals",
            move |_| {
                let contract = contract.clone();
                async move { contract.decimals().call().await }
            },
            3,
            Duration::from_millis(100),
        )
        .await
        .map_err(|e| AppError::LedgerQuery(format!("Decimals failed: {}", e)))
    }

    async fn submit_and_wait(&self, call: CallRequest) -> Result<ReceiptStatus, AppError> {
        let (raw, hash) = self.sign_legacy(&call)?;
        let pending = self
            .provider
            .send_raw_transaction(&raw)
            .await
            .map_err(|e| AppError::SwapSubmission {
                hash: Some(format!("{hash:#x}")),
                reason: format!("broadcast failed: {e}"),
            })?;
        check_broadcast_hash(hash, *pending.tx_hash())?;
        tracing::info!(
            target: "gateway",
            hash = %format!("{:#x}", hash),
            nonce = call.nonce,
            gas_limit = call.gas_limit,
            "Transaction broadcast; waiting for receipt"
        );
        Ok(self.await_receipt(hash).await)
    }
}

/// The node must acknowledge the exact transaction that was signed locally.
fn check_broadcast_hash(local: B256, reported: B256) -> Result<(), AppError> {
    if local == reported {
        Ok(())
    } else {
        Err(AppError::SwapSubmission {
            hash: Some(format!("{reported:#x}")),
            reason: format!("node reported a different hash than signed {local:#x}"),
        })
    }
}
