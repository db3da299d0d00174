// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 ® John Hauger Mitander <john@mitander.dev>

use crate::domain::constants::{DEFAULT_RECEIPT_POLL_MS, DEFAULT_RECEIPT_TIMEOUT_MS};
use crate::domain::error::AppError;
use config::{Config, ConfigBuilder, Environment, File, builder::DefaultState};
use serde::Deserialize;
use std::fmt;
use std::path::Path;
use url::Url;

#[derive(Deserialize, Clone)]
pub struct GlobalSettings {
    // General
    #[serde(default = "default_false")]
    pub debug: bool,
    #[serde(default = "default_false")]
    pub log_json: bool,

    // Network (camelCase aliases accept the legacy config.json; config may lowercase keys)
    #[serde(alias = "rpcUrl", alias = "rpcurl")]
    pub rpc_url: String,
    #[serde(alias = "chainId", alias = "chainid")]
    pub chain_id: u64,

    // Run
    #[serde(default = "default_cycle_count", alias = "cycleCount", alias = "cyclecount")]
    pub cycle_count: u32,
    #[serde(default = "default_true", alias = "enableTokenRecovery", alias = "enabletokenrecovery")]
    pub enable_token_recovery: bool,
    /// Fixed seed for pair order and amounts; entropy when unset.
    pub rng_seed: Option<u64>,

    // Receipts
    #[serde(default = "default_receipt_poll_ms")]
    pub receipt_poll_ms: u64,
    #[serde(default = "default_receipt_timeout_ms")]
    pub receipt_timeout_ms: u64,

    // Identity (from PRIVATE_KEY)
    #[serde(default)]
    pub private_key: String,
}

// Defaults
fn default_true() -> bool {
    true
}
fn default_false() -> bool {
    false
}
fn default_cycle_count() -> u32 {
    1
}
fn default_receipt_poll_ms() -> u64 {
    DEFAULT_RECEIPT_POLL_MS
}
fn default_receipt_timeout_ms() -> u64 {
    DEFAULT_RECEIPT_TIMEOUT_MS
}

impl fmt::Debug for GlobalSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GlobalSettings")
            .field("debug", &self.debug)
            .field("log_json", &self.log_json)
            .field("rpc_url", &self.rpc_url)
            .field("chain_id", &self.chain_id)
            .field("cycle_count", &self.cycle_count)
            .field("enable_token_recovery", &self.enable_token_recovery)
            .field("rng_seed", &self.rng_seed)
            .field("receipt_poll_ms", &self.receipt_poll_ms)
            .field("receipt_timeout_ms", &self.receipt_timeout_ms)
            .field("private_key", &"<redacted>")
            .finish()
    }
}

impl GlobalSettings {
    /// Loads `path` (or `config.{json,toml,...}` if present), then env/.env on top.
    pub fn load_with_path(path: Option<&str>) -> Result<Self, AppError> {
        // Load .env file if it exists
        dotenvy::dotenv().ok();

        let mut builder = Config::builder();
        if let Some(selected_path) = path {
            builder = builder.add_source(File::from(Path::new(selected_path)).required(true));
        } else {
            builder = builder.add_source(File::with_name("config").required(false));
        }
        // Deterministic precedence: CLI (in main) > env/.env > config file.
        builder = builder.add_source(Environment::default());

        Self::from_builder(builder)
    }

    pub fn from_builder(builder: ConfigBuilder<DefaultState>) -> Result<Self, AppError> {
        let settings: GlobalSettings = builder.build()?.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<(), AppError> {
        if self.private_key.trim().is_empty() {
            return Err(AppError::Config("PRIVATE_KEY is missing".to_string()));
        }
        Url::parse(&self.rpc_url)
            .map_err(|e| AppError::Config(format!("Invalid rpc_url {}: {}", self.rpc_url, e)))?;
        if self.cycle_count == 0 {
            return Err(AppError::Config("cycle_count must be greater than 0".into()));
        }
        Ok(())
    }

    pub fn log_level(&self) -> &'static str {
        if self.debug { "debug" } else { "info" }
    }
}
