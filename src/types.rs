// src/types.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    pub fn as_str(&self) -> &'static str {
        match self {
            Side::Buy => "BUY",
            Side::Sell => "SELL",
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OrderType {
    Market,
    Limit,
}

impl OrderType {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderType::Market => "MARKET",
            OrderType::Limit => "LIMIT",
        }
    }
}

/// One price observation from a market data provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketData {
    pub symbol: String,
    pub price: f64,
    pub volume: f64,
    pub timestamp: DateTime<Utc>,
}

impl MarketData {
    pub fn new(symbol: impl Into<String>, price: f64, volume: f64) -> Self {
        Self {
            symbol: symbol.into(),
            price,
            volume,
            timestamp: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Buy,
    Sell,
    Hold,
}

/// A strategy's decision for one tick.
///
/// `amount` depends on `action`: dollars to spend for `Buy`,
/// asset quantity to liquidate for `Sell`, zero for `Hold`.
#[derive(Debug, Clone, PartialEq)]
pub struct Signal {
    pub action: Action,
    pub symbol: String,
    pub amount: f64,
}

impl Signal {
    pub fn hold(symbol: impl Into<String>) -> Self {
        Self {
            action: Action::Hold,
            symbol: symbol.into(),
            amount: 0.0,
        }
    }

    pub fn buy(symbol: impl Into<String>, dollars: f64) -> Self {
        Self {
            action: Action::Buy,
            symbol: symbol.into(),
            amount: dollars,
        }
    }

    pub fn sell(symbol: impl Into<String>, quantity: f64) -> Self {
        Self {
            action: Action::Sell,
            symbol: symbol.into(),
            amount: quantity,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderResponse {
    pub symbol: String,
    #[serde(rename = "orderId")]
    pub order_id: i64,
    #[serde(rename = "clientOrderId", default)]
    pub client_order_id: String,
    pub status: String,
    #[serde(rename = "type", default)]
    pub order_type: String,
    #[serde(default)]
    pub side: String,
    #[serde(rename = "origQty", default)]
    pub quantity: String,
    #[serde(default)]
    pub price: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn order_response_parses_exchange_fields() {
        let body = r#"{
            "symbol": "BTCUSDT",
            "orderId": 28,
            "clientOrderId": "6gCrw2kRUAF9CvJDGP16IP",
            "transactTime": 1507725176595,
            "price": "0.00000000",
            "origQty": "0.02000000",
            "status": "FILLED",
            "type": "MARKET",
            "side": "BUY"
        }"#;
        let resp: OrderResponse = serde_json::from_str(body).unwrap();
        assert_eq!(resp.order_id, 28);
        assert_eq!(resp.quantity, "0.02000000");
        assert_eq!(resp.order_type, "MARKET");
        assert_eq!(resp.status, "FILLED");
    }

    #[test]
    fn signal_constructors_carry_action_specific_amounts() {
        assert_eq!(Signal::hold("ETH").amount, 0.0);
        assert_eq!(Signal::buy("BTC", 1000.0).action, Action::Buy);
        let sell = Signal::sell("BTC", 0.5);
        assert_eq!(sell.action, Action::Sell);
        assert_eq!(sell.amount, 0.5);
    }

    #[test]
    fn sides_use_exchange_spelling() {
        assert_eq!(Side::Buy.to_string(), "BUY");
        assert_eq!(OrderType::Limit.as_str(), "LIMIT");
    }
}
