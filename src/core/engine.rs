// src/core/engine.rs
use crate::config::AppConfig;
use crate::connectors::traits::{ExecutionHandler, MarketDataProvider};
use crate::portfolio::{Portfolio, PortfolioError, PortfolioSummary, Transaction};
use crate::strategies::traits::Strategy;
use crate::types::{Action, OrderResponse, OrderType, Side, Signal};
use anyhow::{Context, Result};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::Notify;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, warn};

const RECENT_TRADES_ON_EXIT: usize = 5;

#[derive(Error, Debug)]
pub enum TickError {
    #[error("error fetching market data: {0:#}")]
    DataFetch(anyhow::Error),

    #[error("failed to place {side} order: {reason:#}")]
    OrderExecution { side: Side, reason: anyhow::Error },

    #[error("ledger rejected trade: {0}")]
    Ledger(#[from] PortfolioError),
}

/// What happened during one tick.
#[derive(Debug, Clone)]
pub struct TickReport {
    pub price: f64,
    pub signal: Signal,
    pub indicator: Option<f64>,
    pub executed: Option<Transaction>,
    /// Set when this tick's trade brought the trade count to a multiple of `summary_every`.
    pub summary: Option<PortfolioSummary>,
}

/// Clears the engine's running flag and wakes the loop. The tick in flight
/// still completes.
#[derive(Debug, Clone)]
pub struct StopHandle {
    running: Arc<AtomicBool>,
    wake: Arc<Notify>,
}

impl StopHandle {
    pub fn stop(&self) {
        if self.running.swap(false, Ordering::SeqCst) {
            info!("Trading bot stopping...");
        }
        self.wake.notify_one();
    }
}

pub struct TradingEngine {
    config: AppConfig,
    strategy: Box<dyn Strategy>,
    portfolio: Portfolio,
    market_data: Box<dyn MarketDataProvider>,
    // None = dry run, trades only touch the local ledger
    execution_handler: Option<Box<dyn ExecutionHandler>>,
    running: Arc<AtomicBool>,
    wake: Arc<Notify>,
    tick_interval: Duration,
    last_prices: HashMap<String, f64>,
}

/// Quantity the exchange reports as ordered, when it parses to something usable.
fn confirmed_quantity(order: &OrderResponse) -> Option<f64> {
    order
        .quantity
        .parse::<f64>()
        .ok()
        .filter(|q| q.is_finite() && *q > 0.0)
}

impl TradingEngine {
    pub fn new(
        config: AppConfig,
        strategy: Box<dyn Strategy>,
        portfolio: Portfolio,
        market_data: Box<dyn MarketDataProvider>,
        execution_handler: Option<Box<dyn ExecutionHandler>>,
    ) -> Self {
        let tick_interval = Duration::from_secs(config.bot.interval_seconds);
        Self {
            config,
            strategy,
            portfolio,
            market_data,
            execution_handler,
            running: Arc::new(AtomicBool::new(true)),
            wake: Arc::new(Notify::new()),
            tick_interval,
            last_prices: HashMap::new(),
        }
    }

    #[cfg(test)]
    fn with_tick_interval(mut self, tick_interval: Duration) -> Self {
        self.tick_interval = tick_interval;
        self
    }

    #[cfg(test)]
    fn portfolio(&self) -> &Portfolio {
        &self.portfolio
    }

    pub fn is_live(&self) -> bool {
        self.execution_handler.is_some()
    }

    pub fn stop_handle(&self) -> StopHandle {
        StopHandle {
            running: self.running.clone(),
            wake: self.wake.clone(),
        }
    }

    /// Runs ticks on the configured interval until the stop handle is used.
    /// Only a failed exchange ping is fatal.
    pub async fn start(&mut self) -> Result<()> {
        info!(
            "Trading bot started (strategy: {}, dry run: {})",
            self.strategy.name(),
            !self.is_live()
        );

        if let Some(handler) = &self.execution_handler {
            if let Err(e) = handler.ping().await {
                self.running.store(false, Ordering::SeqCst);
                error!("Failed to connect to exchange: {:#}", e);
                return Err(e).context("exchange connectivity check failed");
            }
            info!("Connected to exchange API");
        }

        let mut ticker = tokio::time::interval(self.tick_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // interval fires immediately; the first decision waits one period
        ticker.tick().await;

        let wake = self.wake.clone();
        while self.running.load(Ordering::SeqCst) {
            tokio::select! {
                biased;
                _ = wake.notified() => {}
                _ = ticker.tick() => {
                    if !self.running.load(Ordering::SeqCst) {
                        break;
                    }
                    match self.process_tick().await {
                        Ok(report) => debug!(
                            price = report.price,
                            action = ?report.signal.action,
                            indicator = ?report.indicator,
                            traded = report.executed.is_some(),
                            "Tick processed"
                        ),
                        Err(e) => error!("Error processing tick: {}", e),
                    }
                }
            }
        }

        info!("Trading bot stopped");
        for tx in self.portfolio.recent_transactions(RECENT_TRADES_ON_EXIT) {
            info!(
                "{} {} {:.6} {} at ${:.2} (Total: ${:.2})",
                tx.timestamp.format("%Y-%m-%d %H:%M:%S"),
                tx.side,
                tx.amount,
                tx.symbol,
                tx.price,
                tx.total
            );
        }
        info!("\n{}", self.portfolio.summary(&self.last_prices));
        Ok(())
    }

    /// One fetch, analyze, execute cycle.
    pub async fn process_tick(&mut self) -> Result<TickReport, TickError> {
        let symbol = self.config.trading.symbol.clone();
        let data = self
            .market_data
            .fetch(&symbol)
            .await
            .map_err(TickError::DataFetch)?;

        let signal = self.strategy.analyze(&data);
        let indicator = self.strategy.indicator();
        if let Some(value) = indicator {
            debug!("{} = {:.2}", self.strategy.name(), value);
        }

        let executed = match signal.action {
            Action::Buy if self.portfolio.balance() >= signal.amount => {
                Some(self.execute(Side::Buy, &signal, data.price).await?)
            }
            Action::Sell if self.portfolio.position(&signal.symbol) >= signal.amount => {
                Some(self.execute(Side::Sell, &signal, data.price).await?)
            }
            Action::Buy | Action::Sell => {
                debug!(
                    action = ?signal.action,
                    amount = signal.amount,
                    "Signal skipped: not enough balance or position"
                );
                None
            }
            Action::Hold => None,
        };

        let current_prices = HashMap::from([(signal.symbol.clone(), data.price)]);
        self.last_prices.extend(current_prices.clone());

        let trades = self.portfolio.history().len();
        let summary = if executed.is_some() && trades % self.config.bot.summary_every == 0 {
            let summary = self.portfolio.summary(&current_prices);
            info!("\n{}", summary);
            Some(summary)
        } else {
            None
        };

        Ok(TickReport {
            price: data.price,
            signal,
            indicator,
            executed,
            summary,
        })
    }

    async fn execute(&mut self, side: Side, signal: &Signal, price: f64) -> Result<Transaction, TickError> {
        // Dollars for a buy, quantity for a sell, same as the signal
        let mut ledger_amount = signal.amount;

        if let Some(handler) = &self.execution_handler {
            // Buy signals carry dollars, the exchange wants a quantity
            let requested = match side {
                Side::Buy => signal.amount / price,
                Side::Sell => signal.amount,
            };
            let order = handler
                .place_order(
                    &self.config.trading.symbol,
                    side,
                    OrderType::Market,
                    requested,
                    None,
                )
                .await
                .map_err(|reason| TickError::OrderExecution { side, reason })?;
            info!(
                "Order confirmed: #{} {} ({})",
                order.order_id, order.symbol, order.status
            );

            // The exchange truncates to its lot step; book what it accepted
            let filled = confirmed_quantity(&order).unwrap_or(requested);
            if filled != requested {
                debug!(requested, filled, "Booking exchange-confirmed quantity");
            }
            ledger_amount = match side {
                Side::Buy => filled * price,
                Side::Sell => filled,
            };
        }

        let result = match side {
            Side::Buy => self.portfolio.buy(&signal.symbol, ledger_amount, price),
            Side::Sell => self.portfolio.sell(&signal.symbol, ledger_amount, price),
        };
        let transaction = match result {
            Ok(tx) => tx,
            Err(e) => {
                if self.is_live() {
                    warn!("Exchange filled {} but local ledger rejected it: {}", side, e);
                }
                return Err(e.into());
            }
        };

        info!(
            "{}: {:.6} {} at ${:.2} (Total: ${:.2})",
            transaction.side,
            transaction.amount,
            transaction.symbol,
            transaction.price,
            transaction.total
        );
        Ok(transaction)
    }
}
