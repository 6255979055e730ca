// src/strategies/mod.rs
pub mod moving_average;
pub mod rsi;
pub mod traits;
pub mod window;

use moving_average::MovingAverageStrategy;
use rsi::RsiStrategy;
use traits::Strategy;
use tracing::warn;

/// Every Buy/Sell signal targets this asset, whatever symbol is being traded.
pub const SIGNAL_SYMBOL: &str = "BTC";

/// Builds the strategy named in the config. Unknown names fall back to
/// the 20/50 moving average.
pub fn build_strategy(name: &str) -> Box<dyn Strategy> {
    match name {
        "rsi" => Box::new(RsiStrategy::new(14)),
        "moving_average" | "ma" => Box::new(MovingAverageStrategy::new(20, 50)),
        other => {
            warn!(strategy = other, "Unknown strategy, using moving average (20/50)");
            Box::new(MovingAverageStrategy::new(20, 50))
        }
    }
}
