//! JSON-RPC helpers for the base chain.

use std::time::Duration;

use anyhow::Context;
use reqwest::{StatusCode, header::CONTENT_TYPE};
use serde_json::Value;
use url::Url;

use crate::error::DevnetError;

/// Default timeout for RPC requests.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Request id used for every call.
pub const REQUEST_ID: u64 = 74;

/// Create an HTTP client configured for JSON-RPC requests.
pub fn create_client() -> Result<reqwest::Client, anyhow::Error> {
    reqwest::Client::builder()
        .timeout(DEFAULT_TIMEOUT)
        .build()
        .context("Failed to create HTTP client")
}

/// Encode a JSON-RPC 2.0 request body.
pub fn request_body(method: &str, params: &[Value]) -> String {
    serde_json::json!({
        "jsonrpc": "2.0",
        "method": method,
        "params": params,
        "id": REQUEST_ID,
    })
    .to_string()
}

/// Facts about the base chain captured when the deploy config is generated.
///
/// Both values are kept exactly as the node returned them (`0x`-prefixed hex).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainFacts {
    pub block_tag: String,
    pub block_timestamp: String,
}

/// Minimal client for the base chain endpoint.
///
/// Unlike the readiness probe, these calls never retry: a connection error or a non-200 status
/// is fatal.
#[derive(Debug, Clone)]
pub struct L1Rpc {
    client: reqwest::Client,
    url: Url,
}

impl L1Rpc {
    pub fn new(url: &str) -> anyhow::Result<Self> {
        let url = Url::parse(url).with_context(|| format!("Invalid RPC URL: {url}"))?;

        Ok(Self {
            client: create_client()?,
            url,
        })
    }

    /// POST a single JSON-RPC call and return the whole response document.
    async fn call(&self, method: &str, params: &[Value]) -> anyhow::Result<Value> {
        let response = self
            .client
            .post(self.url.clone())
            .header(CONTENT_TYPE, "application/json")
            .body(request_body(method, params))
            .send()
            .await
            .with_context(|| format!("{method} connection to {} failed", self.url))?;

        let status = response.status();
        if status != StatusCode::OK {
            tracing::info!(method, status = status.as_u16(), "Response status code is not 200");
            return Err(DevnetError::RpcStatus {
                method: method.to_string(),
                status: status.as_u16(),
            }
            .into());
        }

        let body: Value = response
            .json()
            .await
            .with_context(|| format!("Failed to parse {method} response"))?;
        tracing::debug!(method, response = %body, "RPC response");

        Ok(body)
    }

    /// Current block number, as the hex tag returned by `eth_blockNumber`.
    pub async fn block_tag(&self) -> anyhow::Result<String> {
        let response = self.call("eth_blockNumber", &[]).await?;

        response
            .get("result")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| DevnetError::missing_key("result", "eth_blockNumber response").into())
    }

    /// Timestamp of the block at `block_tag`, as returned by `eth_getBlockByNumber`.
    pub async fn block_timestamp(&self, block_tag: &str) -> anyhow::Result<String> {
        let response = self
            .call(
                "eth_getBlockByNumber",
                &[Value::from(block_tag), Value::Bool(false)],
            )
            .await?;

        response
            .get("result")
            .and_then(|block| block.get("timestamp"))
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| {
                DevnetError::missing_key("result.timestamp", "eth_getBlockByNumber response")
                    .into()
            })
    }

    /// Query the current block tag, then that block's timestamp.
    pub async fn chain_facts(&self) -> anyhow::Result<ChainFacts> {
        let block_tag = self.block_tag().await?;
        tracing::info!(%block_tag, "L1 block tag");

        let block_timestamp = self.block_timestamp(&block_tag).await?;
        tracing::info!(%block_timestamp, "L1 block timestamp");

        Ok(ChainFacts {
            block_tag,
            block_timestamp,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_body() {
        let body: Value =
            serde_json::from_str(&request_body("eth_getBlockByNumber", &["0x10".into(), false.into()]))
                .unwrap();

        assert_eq!(
            body,
            serde_json::json!({
                "jsonrpc": "2.0",
                "method": "eth_getBlockByNumber",
                "params": ["0x10", false],
                "id": 74
            })
        );
    }

    #[tokio::test]
    async fn test_connection_failure_is_fatal() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let rpc = L1Rpc::new(&format!("http://127.0.0.1:{port}")).unwrap();
        let err = rpc.block_tag().await.unwrap_err();
        assert!(err.to_string().contains("connection"));
    }

    #[test]
    fn test_invalid_url() {
        assert!(L1Rpc::new("not a url").is_err());
    }
}
