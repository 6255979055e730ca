// src/main.rs
use crate::config::{AppConfig, DEFAULT_CONFIG_PATH};
use crate::connectors::binance::BinanceClient;
use crate::connectors::mock::MockMarketData;
use crate::connectors::traits::{ExecutionHandler, MarketDataProvider};
use crate::core::engine::TradingEngine;
use crate::portfolio::Portfolio;
use crate::strategies::build_strategy;
use anyhow::Context;
use dotenvy::dotenv;
use std::env;
use std::path::PathBuf;
use tracing::info;

mod config;
mod connectors;
mod core;
mod portfolio;
mod strategies;
mod types;
mod utils;

async fn shutdown_signal() {
    let ctrl_c = async {
        if tokio::signal::ctrl_c().await.is_err() {
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(_) => std::future::pending::<()>().await,
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    // 1. Load Configuration
    let config_path = PathBuf::from(
        env::var("APP_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string()),
    );

    if !config_path.exists() {
        AppConfig::write_default(&config_path)
            .with_context(|| format!("Failed to create default config {}", config_path.display()))?;
        println!("Config file not found, created default config: {}", config_path.display());
        println!("Please edit it with your Binance API credentials");
        return Ok(());
    }

    let config = AppConfig::load(&config_path).context("Failed to load config")?;
    config.validate().context("Invalid configuration")?;

    let _log_guard = utils::logging::init_logging(&config.bot.log_level, &config.bot.log_dir);

    println!("========================================");
    println!("       TICK TRADER - v{}", env!("CARGO_PKG_VERSION"));
    println!("========================================");
    println!("Symbol:   {}", config.trading.symbol);
    println!("Strategy: {}", config.trading.strategy);
    println!(
        "Mode:     {}",
        if config.bot.dry_run {
            "DRY RUN"
        } else {
            "LIVE TRADING"
        }
    );
    println!("========================================");

    // 2. Initialize Components
    let strategy = build_strategy(&config.trading.strategy);
    let portfolio = Portfolio::new(config.trading.initial_balance);

    let (market_data, execution_handler): (
        Box<dyn MarketDataProvider>,
        Option<Box<dyn ExecutionHandler>>,
    ) = if config.bot.dry_run {
        let mock = MockMarketData::new(config.bot.mock_seed)?;
        (Box::new(mock) as Box<dyn MarketDataProvider>, None)
    } else {
        let client = BinanceClient::new(
            config.binance.api_key.clone(),
            config.binance.secret_key.clone(),
            config.binance.testnet,
        )?;
        (
            Box::new(client.clone()) as Box<dyn MarketDataProvider>,
            Some(Box::new(client) as Box<dyn ExecutionHandler>),
        )
    };

    // 3. Run Engine
    let mut engine =
        TradingEngine::new(config, strategy, portfolio, market_data, execution_handler);

    let stop = engine.stop_handle();
    tokio::spawn(async move {
        shutdown_signal().await;
        info!("Shutdown signal received");
        stop.stop();
    });

    engine.start().await?;
    info!("Goodbye");

    Ok(())
}
