// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 ® John Hauger Mitander <john@on1.no>
// In-memory ledger used by the integration suites. Tracks balances and
// allowances per token and records every submission it is handed.
#![allow(dead_code)]

use alloy::primitives::{Address, B256, U256};
use alloy::sol_types::SolCall;
use async_trait::async_trait;
use autoswap::data::abi::{ERC20, SwapRouter};
use autoswap::domain::catalog::{PairCatalog, Token};
use autoswap::domain::error::AppError;
use autoswap::engine::clock::{Clock, ManualClock};
use autoswap::engine::context::{SwapContext, SwapPolicy};
use autoswap::engine::rng::SwapRng;
use autoswap::network::gateway::{CallRequest, LedgerGateway, ReceiptStatus};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub const UNIX_BASE: u64 = 1_750_000_000;

pub fn big() -> U256 {
    U256::from(10u64).pow(U256::from(30u64))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Submitted {
    Approve {
        token: Address,
        gas_limit: u64,
    },
    Swap {
        token_in: Address,
        token_out: Address,
        amount_in: U256,
        fee: u32,
        recipient: Address,
        deadline: U256,
        amount_out_minimum: U256,
        gas_limit: u64,
        accepted: bool,
    },
}

#[derive(Default)]
pub struct LedgerState {
    pub balances: HashMap<Address, U256>,
    pub allowances: HashMap<Address, U256>,
    pub nonce: u64,
    pub submissions: Vec<Submitted>,
    pub balance_reads: Vec<Address>,
    pub allowance_reads_at: Vec<Duration>,
    /// Broadcast errors for every swap.
    pub reject_swaps: bool,
    /// Next N swaps confirm as reverted.
    pub revert_swaps_remaining: u32,
    pub fail_approvals: bool,
    pub fail_estimate: bool,
    /// Per-token scripted reads consumed before the stored balance;
    /// `None` makes that read fail.
    pub scripted_balances: HashMap<Address, VecDeque<Option<U256>>>,
    /// Next N gas price reads fail.
    pub gas_price_failures: u32,
    /// Next N nonce reads fail.
    pub nonce_failures: u32,
    /// Credited to the output token of every confirmed swap.
    pub swap_output: U256,
}

pub struct MockLedger {
    wallet: Address,
    clock: Option<Arc<ManualClock>>,
    pub state: Mutex<LedgerState>,
}

impl MockLedger {
    pub fn new(clock: Option<Arc<ManualClock>>) -> Self {
        Self {
            wallet: Address::from([0xAA; 20]),
            clock,
            state: Mutex::new(LedgerState {
                swap_output: big(),
                ..LedgerState::default()
            }),
        }
    }

    pub fn with_state(self, f: impl FnOnce(&mut LedgerState)) -> Self {
        f(&mut self.state.lock().unwrap());
        self
    }

    pub fn set_balance(&self, token: Address, amount: U256) {
        self.state.lock().unwrap().balances.insert(token, amount);
    }

    pub fn script_balance(&self, token: Address, reads: impl IntoIterator<Item = Option<U256>>) {
        self.state
            .lock()
            .unwrap()
            .scripted_balances
            .entry(token)
            .or_default()
            .extend(reads);
    }

    pub fn submissions(&self) -> Vec<Submitted> {
        self.state.lock().unwrap().submissions.clone()
    }

    pub fn swaps(&self) -> Vec<Submitted> {
        self.submissions()
            .into_iter()
            .filter(|s| matches!(s, Submitted::Swap { .. }))
            .collect()
    }

    pub fn approvals(&self) -> usize {
        self.submissions()
            .iter()
            .filter(|s| matches!(s, Submitted::Approve { .. }))
            .count()
    }

    pub fn balance_reads(&self) -> Vec<Address> {
        self.state.lock().unwrap().balance_reads.clone()
    }

    pub fn allowance_reads_at(&self) -> Vec<Duration> {
        self.state.lock().unwrap().allowance_reads_at.clone()
    }
}

fn hash_for(nonce: u64) -> B256 {
    B256::from(U256::from(nonce))
}

#[async_trait]
impl LedgerGateway for MockLedger {
    fn wallet(&self) -> Address {
        self.wallet
    }

    async fn pending_nonce(&self) -> Result<u64, AppError> {
        let mut state = self.state.lock().unwrap();
        if state.nonce_failures > 0 {
            state.nonce_failures -= 1;
            return Err(AppError::LedgerQuery("Failed to fetch nonce: timeout".into()));
        }
        Ok(state.nonce)
    }

    async fn gas_price(&self) -> Result<u128, AppError> {
        let mut state = self.state.lock().unwrap();
        if state.gas_price_failures > 0 {
            state.gas_price_failures -= 1;
            return Err(AppError::LedgerQuery("Gas price failed: timeout".into()));
        }
        Ok(1_000_000_000)
    }

    async fn estimate_gas(&self, _call: &CallRequest) -> Result<u64, AppError> {
        if self.state.lock().unwrap().fail_estimate {
            return Err(AppError::LedgerQuery("execution reverted".into()));
        }
        Ok(180_000)
    }

    async fn balance_of(&self, token: Address) -> Result<U256, AppError> {
        let mut state = self.state.lock().unwrap();
        state.balance_reads.push(token);
        if let Some(scripted) = state
            .scripted_balances
            .get_mut(&token)
            .and_then(|reads| reads.pop_front())
        {
            return scripted
                .ok_or_else(|| AppError::LedgerQuery("Token balance failed: timeout".into()));
        }
        Ok(state.balances.get(&token).copied().unwrap_or_default())
    }

    async fn allowance(&self, token: Address, _spender: Address) -> Result<U256, AppError> {
        let at = self.clock.as_ref().map(|c| c.now()).unwrap_or_default();
        let mut state = self.state.lock().unwrap();
        state.allowance_reads_at.push(at);
        Ok(state.allowances.get(&token).copied().unwrap_or_default())
    }

    async fn decimals(&self, _token: Address) -> Result<u8, AppError> {
        Ok(18)
    }

    async fn submit_and_wait(&self, call: CallRequest) -> Result<ReceiptStatus, AppError> {
        let mut state = self.state.lock().unwrap();
        let selector: [u8; 4] = call.data[..4].try_into().expect("selector");

        if selector == ERC20::approveCall::SELECTOR {
            let approve = ERC20::approveCall::abi_decode(&call.data).expect("approve calldata");
            state.submissions.push(Submitted::Approve {
                token: call.to,
                gas_limit: call.gas_limit,
            });
            if state.fail_approvals {
                return Err(AppError::SwapSubmission {
                    hash: None,
                    reason: "approval rejected".into(),
                });
            }
            state.allowances.insert(call.to, approve.amount);
            state.nonce += 1;
            return Ok(ReceiptStatus::ConfirmedSuccess(hash_for(state.nonce)));
        }

        let swap = SwapRouter::exactInputSingleCall::abi_decode(&call.data).expect("swap calldata");
        let p = swap.params;
        let accepted = !state.reject_swaps;
        state.submissions.push(Submitted::Swap {
            token_in: p.tokenIn,
            token_out: p.tokenOut,
            amount_in: p.amountIn,
            fee: p.fee.to::<u32>(),
            recipient: p.recipient,
            deadline: p.deadline,
            amount_out_minimum: p.amountOutMinimum,
            gas_limit: call.gas_limit,
            accepted,
        });
        if !accepted {
            return Err(AppError::SwapSubmission {
                hash: None,
                reason: "nonce too low".into(),
            });
        }
        state.nonce += 1;
        let hash = hash_for(state.nonce);
        if state.revert_swaps_remaining > 0 {
            state.revert_swaps_remaining -= 1;
            return Ok(ReceiptStatus::ConfirmedRevert(hash));
        }
        let balance_in = state.balances.get(&p.tokenIn).copied().unwrap_or_default();
        state
            .balances
            .insert(p.tokenIn, balance_in.saturating_sub(p.amountIn));
        let output = state.swap_output;
        *state.balances.entry(p.tokenOut).or_default() += output;
        Ok(ReceiptStatus::ConfirmedSuccess(hash))
    }
}

pub struct Harness {
    pub ctx: Arc<SwapContext>,
    pub ledger: Arc<MockLedger>,
    pub clock: Arc<ManualClock>,
}

pub fn harness(
    catalog: PairCatalog,
    policy: SwapPolicy,
    seed: u64,
    setup: impl FnOnce(&mut LedgerState),
) -> Harness {
    let clock = Arc::new(ManualClock::new(UNIX_BASE));
    let ledger = Arc::new(MockLedger::new(Some(clock.clone())).with_state(setup));
    let ctx = SwapContext::new(
        Arc::new(catalog),
        ledger.clone(),
        clock.clone(),
        Arc::new(SwapRng::seeded(seed)),
        policy,
    );
    Harness { ctx, ledger, clock }
}

pub fn token(byte: u8, name: &str) -> Token {
    Token::new(Address::from([byte; 20]), name, 18, (1.0, 5.0), 2)
}

pub fn fund_all(catalog: &PairCatalog, state: &mut LedgerState) {
    for t in catalog.tokens() {
        state.balances.insert(t.address, big());
    }
}
