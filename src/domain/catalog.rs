// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 ® John Hauger Mitander <john@oxidity.com>

use crate::domain::constants::{
    BTC_TOKEN_ADDRESS, ETH_TOKEN_ADDRESS, ROUTER_ADDRESS, USDT_TOKEN_ADDRESS,
};
use crate::domain::error::AppError;
use alloy::primitives::Address;
use std::collections::HashSet;
use std::fmt;

/// Static token metadata: ledger address plus the human-unit swap range.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub address: Address,
    pub name: String,
    pub decimals: u8,
    pub swap_min: f64,
    pub swap_max: f64,
    pub display_decimals: u8,
}

impl Token {
    pub fn new(
        address: Address,
        name: &str,
        decimals: u8,
        swap_range: (f64, f64),
        display_decimals: u8,
    ) -> Self {
        Self {
            address,
            name: name.to_string(),
            decimals,
            swap_min: swap_range.0,
            swap_max: swap_range.1,
            display_decimals,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TradingPair {
    pub token_in: Address,
    pub token_out: Address,
    pub in_name: String,
    pub out_name: String,
}

impl TradingPair {
    pub fn key(&self) -> (Address, Address) {
        (self.token_in, self.token_out)
    }
}

impl fmt::Display for TradingPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.in_name, self.out_name)
    }
}

/// Immutable registry of tokens, allowed pairs and the router they trade on.
#[derive(Debug, Clone)]
pub struct PairCatalog {
    router: Address,
    stable_token: Address,
    tokens: Vec<Token>,
    pairs: Vec<TradingPair>,
}

impl PairCatalog {
    /// Builds a catalog from token records and `(token_in, token_out)` addresses.
    pub fn new(
        router: Address,
        stable_token: Address,
        tokens: Vec<Token>,
        pair_addresses: &[(Address, Address)],
    ) -> Result<Self, AppError> {
        let mut seen_tokens = HashSet::new();
        for token in &tokens {
            if !seen_tokens.insert(token.address) {
                return Err(AppError::InvalidCatalog(format!(
                    "duplicate token {} ({:#x})",
                    token.name, token.address
                )));
            }
            if !(token.swap_min > 0.0 && token.swap_min <= token.swap_max) {
                return Err(AppError::InvalidCatalog(format!(
                    "{} swap range [{}, {}] is not a positive ordered range",
                    token.name, token.swap_min, token.swap_max
                )));
            }
            if token.display_decimals > token.decimals {
                return Err(AppError::InvalidCatalog(format!(
                    "{} display precision {} exceeds decimals {}",
                    token.name, token.display_decimals, token.decimals
                )));
            }
        }
        if !seen_tokens.contains(&stable_token) {
            return Err(AppError::UnknownToken(format!("{stable_token:#x}")));
        }

        let mut seen_pairs = HashSet::new();
        let mut pairs = Vec::with_capacity(pair_addresses.len());
        for &(token_in, token_out) in pair_addresses {
            if token_in == token_out {
                return Err(AppError::InvalidCatalog(format!(
                    "pair {token_in:#x} swaps a token into itself"
                )));
            }
            if !seen_pairs.insert((token_in, token_out)) {
                return Err(AppError::InvalidCatalog(format!(
                    "duplicate pair {token_in:#x} -> {token_out:#x}"
                )));
            }
            let in_name = lookup(&tokens, token_in)?.name.clone();
            let out_name = lookup(&tokens, token_out)?.name.clone();
            pairs.push(TradingPair {
                token_in,
                token_out,
                in_name,
                out_name,
            });
        }

        Ok(Self {
            router,
            stable_token,
            tokens,
            pairs,
        })
    }

    pub fn router(&self) -> Address {
        self.router
    }

    pub fn stable_token(&self) -> Address {
        self.stable_token
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub fn pairs(&self) -> &[TradingPair] {
        &self.pairs
    }

    pub fn token(&self, address: Address) -> Result<&Token, AppError> {
        lookup(&self.tokens, address)
    }

    /// Allow-listed pairs whose output side is `token`, in catalog order.
    pub fn pairs_producing(&self, token: Address) -> Vec<&TradingPair> {
        self.pairs.iter().filter(|p| p.token_out == token).collect()
    }
}

impl Default for PairCatalog {
    fn default() -> Self {
        default_catalog()
    }
}

fn lookup(tokens: &[Token], address: Address) -> Result<&Token, AppError> {
    tokens
        .iter()
        .find(|t| t.address == address)
        .ok_or_else(|| AppError::UnknownToken(format!("{address:#x}")))
}

/// BTC / ETH / USDT on the configured router, USDT as the stable reference.
pub fn default_catalog() -> PairCatalog {
    let tokens = vec![
        Token::new(BTC_TOKEN_ADDRESS, "BTC", 18, (0.001, 0.015), 6),
        Token::new(ETH_TOKEN_ADDRESS, "ETH", 18, (0.01, 0.1), 4),
        Token::new(USDT_TOKEN_ADDRESS, "USDT", 18, (60.0, 400.0), 2),
    ];
    let pairs = [
        (BTC_TOKEN_ADDRESS, USDT_TOKEN_ADDRESS),
        (BTC_TOKEN_ADDRESS, ETH_TOKEN_ADDRESS),
        (USDT_TOKEN_ADDRESS, ETH_TOKEN_ADDRESS),
        (USDT_TOKEN_ADDRESS, BTC_TOKEN_ADDRESS),
        (ETH_TOKEN_ADDRESS, USDT_TOKEN_ADDRESS),
    ];
    match PairCatalog::new(ROUTER_ADDRESS, USDT_TOKEN_ADDRESS, tokens, &pairs) {
        Ok(catalog) => catalog,
        Err(e) => unreachable!("built-in catalog is valid: {e}"),
    }
}
