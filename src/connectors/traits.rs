// src/connectors/traits.rs
use crate::types::{MarketData, OrderResponse, OrderType, Side};
use anyhow::Result;
use async_trait::async_trait;

#[async_trait]
pub trait MarketDataProvider: Send {
    async fn fetch(&mut self, symbol: &str) -> Result<MarketData>;
}

#[async_trait]
pub trait ExecutionHandler: Send + Sync {
    // Connectivity check before the loop starts
    async fn ping(&self) -> Result<()>;

    /// `price` is required for `OrderType::Limit` and ignored for market orders.
    async fn place_order(
        &self,
        symbol: &str,
        side: Side,
        order_type: OrderType,
        quantity: f64,
        price: Option<f64>,
    ) -> Result<OrderResponse>;
}
