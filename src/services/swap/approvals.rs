// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 ® John Hauger Mitander <john@mitander.dev>

use crate::common::error::AppError;
use crate::data::abi::ERC20;
use crate::domain::catalog::Token;
use crate::domain::constants::APPROVAL_THRESHOLD_WHOLE_TOKENS;
use crate::services::swap::context::SwapContext;
use crate::services::swap::oracle::BalanceOracle;
use alloy::primitives::{B256, U256};
use alloy::sol_types::SolCall;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApprovalAction {
    AlreadySufficient,
    Approved(B256),
}

/// Keeps router allowances topped up. Allowance is re-read on every call.
#[derive(Clone)]
pub struct ApprovalManager {
    ctx: Arc<SwapContext>,
    oracle: BalanceOracle,
}

impl ApprovalManager {
    pub fn new(ctx: Arc<SwapContext>) -> Self {
        let oracle = BalanceOracle::new(ctx.clone());
        Self { ctx, oracle }
    }

    /// `true` when the router may spend `token`, approving it first if needed.
    /// Failures are logged and reported as `false`; they never abort a cycle.
    pub async fn ensure_approved(&self, token: &Token) -> bool {
        match self.try_approve(token).await {
            Ok(ApprovalAction::AlreadySufficient) => {
                tracing::info!(target: "approvals", token = %token.name, "Allowance already sufficient");
                true
            }
            Ok(ApprovalAction::Approved(hash)) => {
                tracing::info!(
                    target: "approvals",
                    token = %token.name,
                    hash = %format!("{:#x}", hash),
                    "Approval confirmed"
                );
                true
            }
            Err(e) => {
                tracing::warn!(target: "approvals", token = %token.name, error = %e, "Approval failed");
                false
            }
        }
    }

    pub async fn try_approve(&self, token: &Token) -> Result<ApprovalAction, AppError> {
        let allowance = self.oracle.get_allowance(token.address).await?;
        let decimals = self.ctx.gateway.decimals(token.address).await?;
        if allowance >= approval_threshold(decimals) {
            return Ok(ApprovalAction::AlreadySufficient);
        }

        let data = ERC20::approveCall {
            spender: self.ctx.router(),
            amount: U256::MAX,
        }
        .abi_encode();
        let call = self.ctx.prepare_call(token.address, data.into()).await?;
        tracing::info!(
            target: "approvals",
            token = %token.name,
            nonce = call.nonce,
            "Submitting max approval for router"
        );
        let status = self
            .ctx
            .gateway
            .submit_and_wait(call)
            .await
            .map_err(|e| AppError::Approval {
                token: token.name.clone(),
                reason: e.to_string(),
            })?;
        let hash = status.into_confirmed().map_err(|e| AppError::Approval {
            token: token.name.clone(),
            reason: e.to_string(),
        })?;
        Ok(ApprovalAction::Approved(hash))
    }
}

/// `APPROVAL_THRESHOLD_WHOLE_TOKENS` expressed in smallest units.
pub fn approval_threshold(decimals: u8) -> U256 {
    U256::from(APPROVAL_THRESHOLD_WHOLE_TOKENS)
        .saturating_mul(U256::from(10u64).pow(U256::from(decimals)))
}
