// src/portfolio/mod.rs
use crate::types::Side;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PortfolioError {
    #[error("insufficient balance: have {have:.2}, need {need:.2}")]
    InsufficientBalance { have: f64, need: f64 },

    #[error("insufficient {symbol} position: have {have:.6}, trying to sell {requested:.6}")]
    InsufficientPosition {
        symbol: String,
        have: f64,
        requested: f64,
    },

    #[error("invalid {field}: {value}")]
    InvalidAmount { field: &'static str, value: f64 },
}

pub type Result<T> = std::result::Result<T, PortfolioError>;

/// A completed trade. `amount` is the asset quantity, `total` its dollar value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Transaction {
    pub timestamp: DateTime<Utc>,
    pub side: Side,
    pub symbol: String,
    pub amount: f64,
    pub price: f64,
    pub total: f64,
}

/// Cash, holdings and an append-only trade log.
///
/// Positions are always strictly positive; a holding that reaches zero
/// is removed.
#[derive(Debug, Clone)]
pub struct Portfolio {
    balance: f64,
    positions: BTreeMap<String, f64>,
    history: Vec<Transaction>,
}

fn ensure_positive(field: &'static str, value: f64) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(PortfolioError::InvalidAmount { field, value })
    }
}

impl Portfolio {
    pub fn new(initial_balance: f64) -> Self {
        Self {
            balance: initial_balance,
            positions: BTreeMap::new(),
            history: Vec::new(),
        }
    }

    pub fn balance(&self) -> f64 {
        self.balance
    }

    /// Held quantity; zero when the symbol is not held.
    pub fn position(&self, symbol: &str) -> f64 {
        self.positions.get(symbol).copied().unwrap_or(0.0)
    }

    pub fn history(&self) -> &[Transaction] {
        &self.history
    }

    /// Spends `dollar_amount` of cash on `symbol` at `price`.
    pub fn buy(&mut self, symbol: &str, dollar_amount: f64, price: f64) -> Result<Transaction> {
        ensure_positive("dollar amount", dollar_amount)?;
        ensure_positive("price", price)?;
        if dollar_amount > self.balance {
            return Err(PortfolioError::InsufficientBalance {
                have: self.balance,
                need: dollar_amount,
            });
        }

        let quantity = dollar_amount / price;
        self.balance -= dollar_amount;
        *self.positions.entry(symbol.to_string()).or_insert(0.0) += quantity;

        Ok(self.record(Side::Buy, symbol, quantity, price, dollar_amount))
    }

    /// Liquidates `quantity` units of `symbol` at `price`.
    pub fn sell(&mut self, symbol: &str, quantity: f64, price: f64) -> Result<Transaction> {
        ensure_positive("quantity", quantity)?;
        ensure_positive("price", price)?;
        let held = self.position(symbol);
        if held < quantity {
            return Err(PortfolioError::InsufficientPosition {
                symbol: symbol.to_string(),
                have: held,
                requested: quantity,
            });
        }

        let dollar_amount = quantity * price;
        let remaining = held - quantity;
        if remaining <= 0.0 {
            self.positions.remove(symbol);
        } else {
            self.positions.insert(symbol.to_string(), remaining);
        }
        self.balance += dollar_amount;

        Ok(self.record(Side::Sell, symbol, quantity, price, dollar_amount))
    }

    fn record(
        &mut self,
        side: Side,
        symbol: &str,
        quantity: f64,
        price: f64,
        total: f64,
    ) -> Transaction {
        let transaction = Transaction {
            timestamp: Utc::now(),
            side,
            symbol: symbol.to_string(),
            amount: quantity,
            price,
            total,
        };
        self.history.push(transaction.clone());
        transaction
    }

    /// Cash plus holdings valued at `current_prices`. Holdings without a
    /// quote are left out of the total.
    pub fn total_value(&self, current_prices: &HashMap<String, f64>) -> f64 {
        self.balance
            + self
                .positions
                .iter()
                .filter_map(|(symbol, quantity)| {
                    current_prices.get(symbol).map(|price| quantity * price)
                })
                .sum::<f64>()
    }

    /// The last `count` transactions, oldest first.
    pub fn recent_transactions(&self, count: usize) -> &[Transaction] {
        let start = self.history.len().saturating_sub(count);
        &self.history[start..]
    }

    pub fn summary(&self, current_prices: &HashMap<String, f64>) -> PortfolioSummary {
        let holdings = self
            .positions
            .iter()
            .map(|(symbol, &quantity)| {
                let price = current_prices.get(symbol).copied();
                Holding {
                    symbol: symbol.clone(),
                    quantity,
                    price,
                    value: price.map(|p| p * quantity),
                }
            })
            .collect();

        PortfolioSummary {
            balance: self.balance,
            holdings,
            total_value: self.total_value(current_prices),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Holding {
    pub symbol: String,
    pub quantity: f64,
    pub price: Option<f64>,
    pub value: Option<f64>,
}

/// Point-in-time view of the portfolio for reporting.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PortfolioSummary {
    pub balance: f64,
    pub holdings: Vec<Holding>,
    pub total_value: f64,
}

impl fmt::Display for PortfolioSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Portfolio Summary ===")?;
        writeln!(f, "Cash Balance: ${:.2}", self.balance)?;
        if !self.holdings.is_empty() {
            writeln!(f, "Holdings:")?;
            for holding in &self.holdings {
                match (holding.price, holding.value) {
                    (Some(price), Some(value)) => writeln!(
                        f,
                        "  {}: {:.6} (Value: ${:.2} at ${:.2})",
                        holding.symbol, holding.quantity, value, price
                    )?,
                    _ => writeln!(
                        f,
                        "  {}: {:.6} (Price unknown)",
                        holding.symbol, holding.quantity
                    )?,
                }
            }
        }
        writeln!(f, "Total Portfolio Value: ${:.2}", self.total_value)?;
        write!(f, "========================")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prices(entries: &[(&str, f64)]) -> HashMap<String, f64> {
        entries.iter().map(|(s, p)| (s.to_string(), *p)).collect()
    }

    #[test]
    fn buy_then_sell_round_trip() {
        let mut portfolio = Portfolio::new(1000.0);
        let bought = portfolio.buy("ETH", 100.0, 10.0).unwrap();
        assert_eq!(bought.amount, 10.0);
        assert_eq!(portfolio.position("ETH"), 10.0);

        let sold = portfolio.sell("ETH", 10.0, 20.0).unwrap();
        assert_eq!(sold.total, 200.0);

        assert_eq!(portfolio.balance(), 1100.0);
        assert!(portfolio.summary(&HashMap::new()).holdings.is_empty());
        let sides: Vec<Side> = portfolio.history().iter().map(|t| t.side).collect();
        assert_eq!(sides, vec![Side::Buy, Side::Sell]);
    }

    #[test]
    fn buy_over_balance_changes_nothing() {
        let mut portfolio = Portfolio::new(50.0);
        let err = portfolio.buy("BTC", 50.01, 100.0).unwrap_err();
        assert_eq!(
            err,
            PortfolioError::InsufficientBalance {
                have: 50.0,
                need: 50.01
            }
        );
        assert_eq!(portfolio.balance(), 50.0);
        assert_eq!(portfolio.position("BTC"), 0.0);
        assert!(portfolio.summary(&HashMap::new()).holdings.is_empty());
        assert!(portfolio.history().is_empty());
    }

    #[test]
    fn buy_of_entire_balance_is_allowed() {
        let mut portfolio = Portfolio::new(500.0);
        portfolio.buy("BTC", 500.0, 250.0).unwrap();
        assert_eq!(portfolio.balance(), 0.0);
        assert_eq!(portfolio.position("BTC"), 2.0);
    }

    #[test]
    fn sell_of_unknown_symbol_changes_nothing() {
        let mut portfolio = Portfolio::new(1000.0);
        let err = portfolio.sell("DOGE", 1.0, 0.1).unwrap_err();
        assert!(matches!(
            err,
            PortfolioError::InsufficientPosition { ref symbol, have, .. } if symbol == "DOGE" && have == 0.0
        ));
        assert_eq!(portfolio.balance(), 1000.0);
        assert!(portfolio.history().is_empty());
    }

    #[test]
    fn oversell_changes_nothing() {
        let mut portfolio = Portfolio::new(1000.0);
        portfolio.buy("BTC", 100.0, 100.0).unwrap();
        assert!(portfolio.sell("BTC", 1.5, 100.0).is_err());
        assert_eq!(portfolio.position("BTC"), 1.0);
        assert_eq!(portfolio.balance(), 900.0);
        assert_eq!(portfolio.history().len(), 1);
    }

    #[test]
    fn partial_sell_keeps_remainder() {
        let mut portfolio = Portfolio::new(1000.0);
        portfolio.buy("BTC", 400.0, 100.0).unwrap();
        portfolio.sell("BTC", 1.0, 150.0).unwrap();
        assert_eq!(portfolio.position("BTC"), 3.0);
        assert_eq!(portfolio.balance(), 750.0);
    }

    #[test]
    fn repeated_buys_accumulate() {
        let mut portfolio = Portfolio::new(1000.0);
        portfolio.buy("BTC", 100.0, 50.0).unwrap();
        portfolio.buy("BTC", 100.0, 25.0).unwrap();
        assert_eq!(portfolio.position("BTC"), 6.0);
    }

    #[test]
    fn rejects_degenerate_prices() {
        let mut portfolio = Portfolio::new(1000.0);
        assert!(matches!(
            portfolio.buy("BTC", 100.0, 0.0),
            Err(PortfolioError::InvalidAmount { field: "price", .. })
        ));
        assert!(matches!(
            portfolio.buy("BTC", f64::NAN, 10.0),
            Err(PortfolioError::InvalidAmount { .. })
        ));
        assert_eq!(portfolio.balance(), 1000.0);
        assert!(portfolio.history().is_empty());
    }

    #[test]
    fn total_value_skips_unpriced_holdings() {
        let mut portfolio = Portfolio::new(1000.0);
        portfolio.buy("BTC", 200.0, 100.0).unwrap();
        portfolio.buy("ETH", 300.0, 10.0).unwrap();

        assert_eq!(portfolio.total_value(&prices(&[("BTC", 150.0)])), 800.0);
        assert_eq!(portfolio.total_value(&prices(&[])), 500.0);
        assert_eq!(
            portfolio.total_value(&prices(&[("BTC", 100.0), ("ETH", 20.0)])),
            1300.0
        );
    }

    #[test]
    fn recent_transactions_clamps_to_history() {
        let mut portfolio = Portfolio::new(1000.0);
        assert!(portfolio.recent_transactions(5).is_empty());

        for price in [10.0, 20.0, 40.0] {
            portfolio.buy("BTC", 10.0, price).unwrap();
        }
        let recent: Vec<f64> = portfolio
            .recent_transactions(2)
            .iter()
            .map(|t| t.price)
            .collect();
        assert_eq!(recent, vec![20.0, 40.0]);
        assert_eq!(portfolio.recent_transactions(10).len(), 3);
        assert!(portfolio.recent_transactions(0).is_empty());
    }

    #[test]
    fn summary_marks_unknown_prices() {
        let mut portfolio = Portfolio::new(1000.0);
        portfolio.buy("BTC", 100.0, 50.0).unwrap();
        portfolio.buy("ETH", 100.0, 10.0).unwrap();

        let summary = portfolio.summary(&prices(&[("BTC", 60.0)]));
        assert_eq!(summary.total_value, 920.0);

        let text = summary.to_string();
        assert!(text.contains("Cash Balance: $800.00"));
        assert!(text.contains("BTC: 2.000000 (Value: $120.00 at $60.00)"));
        assert!(text.contains("ETH: 10.000000 (Price unknown)"));
        assert!(text.contains("Total Portfolio Value: $920.00"));
    }
}
