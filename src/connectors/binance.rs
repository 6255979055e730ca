// src/connectors/binance.rs
use crate::connectors::traits::{ExecutionHandler, MarketDataProvider};
use crate::types::{MarketData, OrderResponse, OrderType, Side};
use crate::utils::precision::{format_price, format_quantity};
use anyhow::{anyhow, bail, Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use hmac::{Hmac, Mac};
use reqwest::{Client, Method};
use serde::Deserialize;
use sha2::Sha256;
use std::time::Duration;
use tracing::{debug, info};
use url::Url;
use uuid::Uuid;

type HmacSha256 = Hmac<Sha256>;

const MAINNET_URL: &str = "https://api.binance.com";
const TESTNET_URL: &str = "https://testnet.binance.vision";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Spot REST client. Cheap to clone; clones share the connection pool.
#[derive(Clone)]
pub struct BinanceClient {
    api_key: String,
    secret_key: String,
    http_client: Client,
    base_url: Url,
}

#[derive(Debug, Deserialize)]
struct TickerPrice {
    price: String,
}

impl BinanceClient {
    pub fn new(api_key: String, secret_key: String, testnet: bool) -> Result<Self> {
        let base = if testnet { TESTNET_URL } else { MAINNET_URL };
        Self::with_base_url(api_key, secret_key, base)
    }

    pub fn with_base_url(api_key: String, secret_key: String, base_url: &str) -> Result<Self> {
        let http_client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .context("Failed to build HTTP client")?;
        let base_url =
            Url::parse(base_url).with_context(|| format!("Invalid base URL: {}", base_url))?;

        Ok(Self {
            api_key,
            secret_key,
            http_client,
            base_url,
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path)
            .with_context(|| format!("Invalid endpoint path: {}", path))
    }

    fn sign(&self, query_string: &str) -> Result<String> {
        let mut mac = HmacSha256::new_from_slice(self.secret_key.as_bytes())
            .context("Invalid secret key length")?;
        mac.update(query_string.as_bytes());
        Ok(hex::encode(mac.finalize().into_bytes()))
    }

    fn sign_and_build_query(&self, params: Vec<(&str, String)>) -> Result<String> {
        let mut params = params;
        let timestamp = Utc::now().timestamp_millis().to_string();
        params.push(("timestamp", timestamp));

        let query_string = serde_urlencoded::to_string(&params)?;
        let signature = self.sign(&query_string)?;

        Ok(format!("{}&signature={}", query_string, signature))
    }

    async fn send_signed_request<T: for<'de> Deserialize<'de>>(
        &self,
        method: Method,
        path: &str,
        params: Vec<(&str, String)>,
    ) -> Result<T> {
        let mut url = self.endpoint(path)?;
        url.set_query(Some(&self.sign_and_build_query(params)?));

        let response = self
            .http_client
            .request(method, url)
            .header("X-MBX-APIKEY", &self.api_key)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            bail!("binance API error ({}): {}", status, body);
        }

        Ok(response.json::<T>().await?)
    }
}

#[async_trait]
impl MarketDataProvider for BinanceClient {
    async fn fetch(&mut self, symbol: &str) -> Result<MarketData> {
        let url = self.endpoint("/api/v3/ticker/price")?;
        let ticker = self
            .http_client
            .get(url)
            .query(&[("symbol", symbol)])
            .send()
            .await?
            .error_for_status()?
            .json::<TickerPrice>()
            .await?;

        let price = ticker
            .price
            .parse::<f64>()
            .map_err(|e| anyhow!("Failed to parse price '{}' for {}: {}", ticker.price, symbol, e))?;

        debug!(symbol, price, "Fetched ticker price");
        Ok(MarketData::new(symbol, price, 0.0))
    }
}

#[async_trait]
impl ExecutionHandler for BinanceClient {
    async fn ping(&self) -> Result<()> {
        let url = self.endpoint("/api/v3/ping")?;
        let response = self.http_client.get(url).send().await?;
        if !response.status().is_success() {
            bail!("Failed to ping Binance API: status {}", response.status());
        }
        Ok(())
    }

    async fn place_order(
        &self,
        symbol: &str,
        side: Side,
        order_type: OrderType,
        quantity: f64,
        price: Option<f64>,
    ) -> Result<OrderResponse> {
        let quantity_str = format_quantity(quantity)
            .ok_or_else(|| anyhow!("Order quantity {} is below the exchange step", quantity))?;

        let mut params = vec![
            ("symbol", symbol.to_string()),
            ("side", side.as_str().to_string()),
            ("type", order_type.as_str().to_string()),
            ("quantity", quantity_str.clone()),
        ];

        if order_type == OrderType::Limit {
            let limit = price
                .and_then(format_price)
                .ok_or_else(|| anyhow!("LIMIT order requires a positive price"))?;
            params.push(("price", limit));
            params.push(("timeInForce", "GTC".to_string()));
        }
        params.push(("newClientOrderId", Uuid::new_v4().simple().to_string()));

        info!(
            "Sending Order: {} {} {} {}",
            side,
            order_type.as_str(),
            quantity_str,
            symbol
        );

        self.send_signed_request(Method::POST, "/api/v3/order", params)
            .await
    }
}
