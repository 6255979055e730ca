// src/config.rs

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

pub const DEFAULT_CONFIG_PATH: &str = "config/settings.json";
const PLACEHOLDER_API_KEY: &str = "your_binance_api_key";
const PLACEHOLDER_SECRET_KEY: &str = "your_binance_secret_key";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("Failed to write configuration: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to serialize configuration: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct BinanceConfig {
    pub api_key: String,
    pub secret_key: String,
    #[serde(default = "default_true")]
    pub testnet: bool,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct TradingConfig {
    pub symbol: String,
    pub initial_balance: f64,
    // "rsi" or "moving_average"; anything else falls back to moving average
    pub strategy: String,
    pub max_risk: f64,
    pub stop_loss: f64,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct BotConfig {
    pub interval_seconds: u64,
    #[serde(default = "default_true")]
    pub dry_run: bool,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Print the portfolio summary each time the trade count reaches a multiple of this.
    #[serde(default = "default_summary_every")]
    pub summary_every: usize,
    #[serde(default = "default_log_dir")]
    pub log_dir: String,
    #[serde(default)]
    pub mock_seed: Option<u64>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    pub binance: BinanceConfig,
    pub trading: TradingConfig,
    pub bot: BotConfig,
}

fn default_true() -> bool {
    true
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_summary_every() -> usize {
    10
}

fn default_log_dir() -> String {
    "logs".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            binance: BinanceConfig {
                api_key: PLACEHOLDER_API_KEY.to_string(),
                secret_key: PLACEHOLDER_SECRET_KEY.to_string(),
                testnet: true,
            },
            trading: TradingConfig {
                symbol: "BTCUSDT".to_string(),
                initial_balance: 10000.0,
                strategy: "moving_average".to_string(),
                max_risk: 0.02,
                stop_loss: 0.05,
            },
            bot: BotConfig {
                interval_seconds: 10,
                dry_run: true,
                log_level: default_log_level(),
                summary_every: default_summary_every(),
                log_dir: default_log_dir(),
                mock_seed: None,
            },
        }
    }
}

impl AppConfig {
    /// Loads `path`, then overlays `APP__<SECTION>__<KEY>` environment variables.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let builder = Config::builder()
            .add_source(File::from(path))
            .add_source(
                Environment::with_prefix("APP")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            );

        let config = builder.build()?;
        Ok(config.try_deserialize()?)
    }

    /// Writes the default settings as pretty JSON, creating parent directories.
    pub fn write_default(path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let data = serde_json::to_string_pretty(&AppConfig::default())?;
        std::fs::write(path, data)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.bot.dry_run {
            if self.binance.api_key.is_empty() || self.binance.api_key == PLACEHOLDER_API_KEY {
                return Err(ConfigError::Invalid("binance API key not configured".into()));
            }
            if self.binance.secret_key.is_empty()
                || self.binance.secret_key == PLACEHOLDER_SECRET_KEY
            {
                return Err(ConfigError::Invalid("binance secret key not configured".into()));
            }
        }

        if self.trading.symbol.trim().is_empty() {
            return Err(ConfigError::Invalid("trading symbol must not be empty".into()));
        }

        if !(self.trading.initial_balance > 0.0) {
            return Err(ConfigError::Invalid("initial balance must be positive".into()));
        }

        if !(self.trading.max_risk > 0.0 && self.trading.max_risk < 1.0) {
            return Err(ConfigError::Invalid("max risk must be between 0 and 1".into()));
        }

        if self.bot.interval_seconds == 0 {
            return Err(ConfigError::Invalid("interval seconds must be positive".into()));
        }

        if self.bot.summary_every == 0 {
            return Err(ConfigError::Invalid("summary_every must be positive".into()));
        }

        Ok(())
    }
}
