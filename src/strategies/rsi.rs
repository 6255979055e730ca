// src/strategies/rsi.rs
use crate::strategies::traits::Strategy;
use crate::strategies::window::PriceWindow;
use crate::strategies::SIGNAL_SYMBOL;
use crate::types::{MarketData, Signal};
use tracing::debug;

const OVERBOUGHT: f64 = 70.0;
const OVERSOLD: f64 = 30.0;
const NEUTRAL_RSI: f64 = 50.0;
const BUY_DOLLARS: f64 = 500.0;
const SELL_QUANTITY: f64 = 0.3;

/// Mean-reversion on the Relative Strength Index.
///
/// Buys when RSI drops under 30, sells when it rises above 70.
/// Averages are simple means of the last `period` price deltas.
pub struct RsiStrategy {
    period: usize,
    overbought: f64,
    oversold: f64,
    window: PriceWindow,
    last_rsi: Option<f64>,
}

impl RsiStrategy {
    pub fn new(period: usize) -> Self {
        Self {
            period,
            overbought: OVERBOUGHT,
            oversold: OVERSOLD,
            window: PriceWindow::new(period + 10),
            last_rsi: None,
        }
    }

    /// Most recent RSI value, if enough data has been seen.
    pub fn rsi(&self) -> Option<f64> {
        self.last_rsi
    }

    fn calculate_rsi(&self) -> f64 {
        let deltas = self.window.deltas();
        if deltas.len() < self.period || self.period == 0 {
            return NEUTRAL_RSI;
        }

        let recent = &deltas[deltas.len() - self.period..];
        let avg_gain = recent.iter().map(|(gain, _)| gain).sum::<f64>() / self.period as f64;
        let avg_loss = recent.iter().map(|(_, loss)| loss).sum::<f64>() / self.period as f64;

        if avg_loss == 0.0 {
            return 100.0;
        }

        let rs = avg_gain / avg_loss;
        100.0 - (100.0 / (1.0 + rs))
    }
}

impl Strategy for RsiStrategy {
    fn name(&self) -> &'static str {
        "RSI"
    }

    fn indicator(&self) -> Option<f64> {
        self.rsi()
    }

    fn analyze(&mut self, data: &MarketData) -> Signal {
        self.window.push(data.price);

        if self.window.len() < self.period + 1 {
            return Signal::hold(data.symbol.as_str());
        }

        let rsi = self.calculate_rsi();
        self.last_rsi = Some(rsi);
        debug!(rsi, "RSI updated");

        if rsi < self.oversold {
            Signal::buy(SIGNAL_SYMBOL, BUY_DOLLARS)
        } else if rsi > self.overbought {
            Signal::sell(SIGNAL_SYMBOL, SELL_QUANTITY)
        } else {
            Signal::hold(data.symbol.as_str())
        }
    }
}
