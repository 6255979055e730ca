// src/connectors/mock.rs
use crate::connectors::traits::MarketDataProvider;
use crate::types::MarketData;
use anyhow::{Context, Result};
use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

const COINGECKO_URL: &str = "https://api.coingecko.com";
const BTC_BASE_PRICE: f64 = 45000.0;
const ALT_BASE_PRICE: f64 = 1000.0;

#[derive(Debug, Deserialize)]
struct CoinGeckoResponse {
    bitcoin: CoinGeckoQuote,
}

#[derive(Debug, Deserialize)]
struct CoinGeckoQuote {
    usd: f64,
}

/// Dry-run quote source. BTC pairs try the public CoinGecko price and fall
/// back to a synthetic quote; everything else is synthetic.
pub struct MockMarketData {
    rng: StdRng,
    http_client: Client,
    coingecko_url: String,
}

fn is_btc(symbol: &str) -> bool {
    matches!(symbol, "BTC/USD" | "BTCUSDT")
}

impl MockMarketData {
    /// `seed` makes the synthetic quotes reproducible.
    pub fn new(seed: Option<u64>) -> Result<Self> {
        Self::with_coingecko_url(seed, COINGECKO_URL)
    }

    pub fn with_coingecko_url(seed: Option<u64>, coingecko_url: &str) -> Result<Self> {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let http_client = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            rng,
            http_client,
            coingecko_url: coingecko_url.trim_end_matches('/').to_string(),
        })
    }

    /// Synthetic quote: BTC 45000 ± 1000, anything else 1000 ± 50.
    pub fn synthetic(&mut self, symbol: &str) -> MarketData {
        let (price, volume) = if is_btc(symbol) {
            (
                BTC_BASE_PRICE + (self.rng.gen::<f64>() - 0.5) * 2000.0,
                self.rng.gen::<f64>() * 1_000_000.0,
            )
        } else {
            (
                ALT_BASE_PRICE + (self.rng.gen::<f64>() - 0.5) * 100.0,
                self.rng.gen::<f64>() * 100_000.0,
            )
        };
        MarketData::new(symbol, price, volume)
    }

    async fn fetch_btc_price(&self) -> Result<f64> {
        let url = format!(
            "{}/api/v3/simple/price?ids=bitcoin&vs_currencies=usd",
            self.coingecko_url
        );
        let resp = self
            .http_client
            .get(&url)
            .send()
            .await?
            .error_for_status()?
            .json::<CoinGeckoResponse>()
            .await?;
        Ok(resp.bitcoin.usd)
    }
}

#[async_trait]
impl MarketDataProvider for MockMarketData {
    async fn fetch(&mut self, symbol: &str) -> Result<MarketData> {
        if !is_btc(symbol) {
            return Ok(self.synthetic(symbol));
        }

        match self.fetch_btc_price().await {
            Ok(price) => {
                debug!(price, "CoinGecko BTC price");
                let volume = self.rng.gen::<f64>() * 1_000_000.0;
                Ok(MarketData::new(symbol, price, volume))
            }
            Err(e) => {
                warn!("CoinGecko unavailable ({}), using synthetic quote", e);
                Ok(self.synthetic(symbol))
            }
        }
    }
}
