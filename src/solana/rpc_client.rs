use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use reqwest::Client;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};

use crate::ingestion::FeedError;

use super::types::{ParsedTransaction, RpcRequest, RpcResponse, SignatureInfo};

pub const DEFAULT_RPC_URL: &str = "https://api.mainnet-beta.solana.com";

/// Minimal Solana JSON-RPC client over HTTP.
#[derive(Debug, Clone)]
pub struct SolanaRpcClient {
    http: Client,
    rpc_url: String,
    next_id: Arc<AtomicU64>,
}

impl SolanaRpcClient {
    pub fn new(http: Client, rpc_url: impl Into<String>) -> Self {
        Self {
            http,
            rpc_url: rpc_url.into(),
            next_id: Arc::new(AtomicU64::new(1)),
        }
    }

    /// Most recent signatures touching `address`, newest first.
    pub async fn get_signatures_for_address(
        &self,
        address: &str,
        limit: usize,
    ) -> Result<Vec<SignatureInfo>, FeedError> {
        let result: Option<Vec<SignatureInfo>> = self
            .call("getSignaturesForAddress", json!([address, { "limit": limit }]))
            .await?;
        Ok(result.unwrap_or_default())
    }

    /// Parsed transaction by signature; `None` if the node no longer has it.
    pub async fn get_transaction(&self, signature: &str) -> Result<Option<ParsedTransaction>, FeedError> {
        self.call(
            "getTransaction",
            json!([
                signature,
                {
                    "encoding": "jsonParsed",
                    "maxSupportedTransactionVersion": 0,
                    "commitment": "confirmed"
                }
            ]),
        )
        .await
    }

    async fn call<T: DeserializeOwned>(&self, method: &str, params: Value) -> Result<Option<T>, FeedError> {
        let request = RpcRequest {
            jsonrpc: "2.0",
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
            method,
            params,
        };

        let resp: RpcResponse<T> = self
            .http
            .post(&self.rpc_url)
            .json(&request)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        if let Some(err) = resp.error {
            return Err(FeedError::Rpc {
                code: err.code,
                message: err.message,
            });
        }

        Ok(resp.result)
    }
}
