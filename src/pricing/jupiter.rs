use std::collections::HashMap;
use std::str::FromStr;

use reqwest::Client;
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::solana::types::WRAPPED_SOL_MINT;

use super::PriceSource;

pub const DEFAULT_JUPITER_PRICE_URL: &str = "https://lite-api.jup.ag/price/v2";

#[derive(Debug, Deserialize)]
struct PriceResponse {
    data: HashMap<String, Option<PriceEntry>>,
}

#[derive(Debug, Deserialize)]
struct PriceEntry {
    price: String,
}

/// Token prices quoted in SOL from the Jupiter price API.
#[derive(Debug, Clone)]
pub struct JupiterPriceSource {
    http: Client,
    base_url: String,
}

impl JupiterPriceSource {
    pub fn new(http: Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
        }
    }
}

#[async_trait::async_trait]
impl PriceSource for JupiterPriceSource {
    async fn current_price(&self, token: &str) -> anyhow::Result<Decimal> {
        let url = format!("{}?ids={}&vsToken={}", self.base_url, token, WRAPPED_SOL_MINT);

        let resp: PriceResponse = self
            .http
            .get(&url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        parse_price(&resp, token)
    }
}

fn parse_price(resp: &PriceResponse, token: &str) -> anyhow::Result<Decimal> {
    let entry = resp
        .data
        .get(token)
        .and_then(Option::as_ref)
        .ok_or_else(|| anyhow::anyhow!("Jupiter returned no price for {token}"))?;

    Decimal::from_str(&entry.price)
        .or_else(|_| Decimal::from_scientific(&entry.price))
        .map_err(|e| anyhow::anyhow!("invalid Jupiter price {:?} for {token}: {e}", entry.price))
}
