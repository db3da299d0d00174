// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 ® John Hauger Mitander <john@oxidity.com>

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Connection failed to endpoint: {0}")]
    Connection(String),

    #[error("Ledger query failed: {0}")]
    LedgerQuery(String),

    #[error("Approval failed for {token}: {reason}")]
    Approval { token: String, reason: String },

    #[error("Swap submission failed: {hash:?}, reason: {reason}")]
    SwapSubmission { hash: Option<String>, reason: String },

    #[error("Unknown token {0}")]
    UnknownToken(String),

    #[error("Invalid pair catalog: {0}")]
    InvalidCatalog(String),
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        AppError::Config(err.to_string())
    }
}
