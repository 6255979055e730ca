// src/strategies/traits.rs
use crate::types::{MarketData, Signal};

pub trait Strategy: Send {
    fn name(&self) -> &'static str;

    // Feed one observation, get this tick's decision
    fn analyze(&mut self, data: &MarketData) -> Signal;

    /// Latest indicator reading behind the last decision, if the strategy has one.
    fn indicator(&self) -> Option<f64> {
        None
    }
}
