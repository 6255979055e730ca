// src/strategies/moving_average.rs
use crate::strategies::traits::Strategy;
use crate::strategies::window::PriceWindow;
use crate::strategies::SIGNAL_SYMBOL;
use crate::types::{MarketData, Signal};

const BUY_DOLLARS: f64 = 1000.0;
const SELL_QUANTITY: f64 = 0.5;

/// Short/long simple moving average comparison.
pub struct MovingAverageStrategy {
    short_period: usize,
    long_period: usize,
    window: PriceWindow,
}

impl MovingAverageStrategy {
    /// Creates a new MovingAverageStrategy.
    ///
    /// # Arguments
    /// * `short_period` - Fast average length (e.g., 20).
    /// * `long_period` - Slow average length (e.g., 50). Should exceed `short_period`.
    pub fn new(short_period: usize, long_period: usize) -> Self {
        Self {
            short_period,
            long_period,
            window: PriceWindow::new(long_period + 10),
        }
    }
}

impl Strategy for MovingAverageStrategy {
    fn name(&self) -> &'static str {
        "MovingAverage"
    }

    fn analyze(&mut self, data: &MarketData) -> Signal {
        self.window.push(data.price);

        if self.window.len() < self.long_period {
            return Signal::hold(data.symbol.as_str());
        }

        let short_ma = self.window.mean_of_last(self.short_period);
        let long_ma = self.window.mean_of_last(self.long_period);

        if short_ma > long_ma {
            Signal::buy(SIGNAL_SYMBOL, BUY_DOLLARS)
        } else if short_ma < long_ma {
            Signal::sell(SIGNAL_SYMBOL, SELL_QUANTITY)
        } else {
            Signal::hold(data.symbol.as_str())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Action;

    fn tick(price: f64) -> MarketData {
        MarketData::new("BTCUSDT", price, 0.0)
    }

    #[test]
    fn holds_until_long_period_is_filled() {
        let mut strategy = MovingAverageStrategy::new(3, 5);
        for price in [1.0, 50.0, 2.0, 99.0] {
            let signal = strategy.analyze(&tick(price));
            assert_eq!(signal.action, Action::Hold);
            assert_eq!(signal.amount, 0.0);
            assert_eq!(signal.symbol, "BTCUSDT");
        }
    }

    #[test]
    fn rising_prices_produce_a_fixed_buy() {
        let mut strategy = MovingAverageStrategy::new(20, 50);
        let mut last = Signal::hold("BTCUSDT");
        for i in 0..60 {
            last = strategy.analyze(&tick(100.0 + i as f64));
        }
        assert_eq!(last, Signal::buy("BTC", 1000.0));
    }

    #[test]
    fn falling_prices_produce_a_fixed_sell() {
        let mut strategy = MovingAverageStrategy::new(2, 4);
        let mut last = Signal::hold("BTCUSDT");
        for price in [10.0, 9.0, 8.0, 7.0] {
            last = strategy.analyze(&tick(price));
        }
        assert_eq!(last, Signal::sell("BTC", 0.5));
    }

    #[test]
    fn flat_prices_hold_on_the_input_symbol() {
        let mut strategy = MovingAverageStrategy::new(2, 4);
        let mut last = Signal::buy("BTC", 1.0);
        for _ in 0..6 {
            last = strategy.analyze(&tick(42.0));
        }
        assert_eq!(last, Signal::hold("BTCUSDT"));
    }
}
