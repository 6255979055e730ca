// src/strategies/window.rs
use std::collections::VecDeque;

/// Bounded FIFO of the most recent prices.
#[derive(Debug, Clone)]
pub struct PriceWindow {
    prices: VecDeque<f64>,
    max_history: usize,
}

impl PriceWindow {
    pub fn new(max_history: usize) -> Self {
        Self {
            prices: VecDeque::with_capacity(max_history + 1),
            max_history,
        }
    }

    /// Appends a price, dropping the oldest one once over capacity.
    pub fn push(&mut self, price: f64) {
        self.prices.push_back(price);
        if self.prices.len() > self.max_history {
            self.prices.pop_front();
        }
    }

    pub fn len(&self) -> usize {
        self.prices.len()
    }

    #[cfg(test)]
    pub fn capacity(&self) -> usize {
        self.max_history
    }

    #[cfg(test)]
    pub fn iter(&self) -> impl Iterator<Item = &f64> + '_ {
        self.prices.iter()
    }

    /// Mean of the last `period` prices. Returns 0.0 when fewer are held;
    /// callers check `len()` first.
    pub fn mean_of_last(&self, period: usize) -> f64 {
        if period == 0 || self.prices.len() < period {
            return 0.0;
        }
        let sum: f64 = self.prices.iter().skip(self.prices.len() - period).sum();
        sum / period as f64
    }

    /// Per-step (gain, loss) pairs for every adjacent pair held.
    pub fn deltas(&self) -> Vec<(f64, f64)> {
        self.prices
            .iter()
            .zip(self.prices.iter().skip(1))
            .map(|(prev, next)| {
                let change = next - prev;
                if change > 0.0 {
                    (change, 0.0)
                } else {
                    (0.0, change.abs())
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retains_only_the_most_recent_prices() {
        let mut window = PriceWindow::new(5);
        for i in 0..12 {
            window.push(i as f64);
            assert!(window.len() <= window.capacity());
        }
        let kept: Vec<f64> = window.iter().copied().collect();
        assert_eq!(kept, vec![7.0, 8.0, 9.0, 10.0, 11.0]);
    }

    #[test]
    fn keeps_everything_below_capacity() {
        let mut window = PriceWindow::new(10);
        window.push(3.0);
        window.push(1.0);
        let kept: Vec<f64> = window.iter().copied().collect();
        assert_eq!(kept, vec![3.0, 1.0]);
    }

    #[test]
    fn mean_uses_the_tail_only() {
        let mut window = PriceWindow::new(10);
        for p in [1.0, 2.0, 3.0, 4.0, 5.0] {
            window.push(p);
        }
        assert_eq!(window.mean_of_last(2), 4.5);
        assert_eq!(window.mean_of_last(5), 3.0);
    }

    #[test]
    fn mean_is_zero_when_underfilled() {
        let mut window = PriceWindow::new(10);
        window.push(100.0);
        assert_eq!(window.mean_of_last(3), 0.0);
        assert_eq!(window.mean_of_last(0), 0.0);
    }

    #[test]
    fn deltas_split_gains_and_losses() {
        let mut window = PriceWindow::new(10);
        for p in [10.0, 12.0, 9.0, 9.0] {
            window.push(p);
        }
        assert_eq!(window.deltas(), vec![(2.0, 0.0), (0.0, 3.0), (0.0, 0.0)]);
    }
}
