use super::{ChainParams, TransactionRequest, WalletError, WalletProvider};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

#[derive(Debug, Serialize)]
struct RpcRequest<'a> {
    jsonrpc: &'static str,
    id: u64,
    method: &'a str,
    params: Value,
}

#[derive(Debug, Deserialize)]
struct RpcReply {
    #[serde(default)]
    result: Value,
    error: Option<RpcFault>,
}

#[derive(Debug, Deserialize)]
struct RpcFault {
    code: i64,
    #[serde(default)]
    message: String,
}

/// Wallet reached over JSON-RPC 2.0 (an EIP-1193 bridge or signer node).
pub struct JsonRpcWallet {
    client: reqwest::Client,
    endpoint: String,
    next_id: AtomicU64,
}

impl JsonRpcWallet {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, WalletError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
            next_id: AtomicU64::new(1),
        })
    }

    async fn call(&self, method: &str, params: Value) -> Result<Value, WalletError> {
        let request = RpcRequest {
            jsonrpc: "2.0",
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
            method,
            params,
        };
        tracing::debug!(method, id = request.id, "wallet call");
        let reply: RpcReply = self
            .client
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        if let Some(fault) = reply.error {
            return Err(WalletError::Rpc {
                code: fault.code,
                message: fault.message,
            });
        }
        Ok(reply.result)
    }
}

#[async_trait]
impl WalletProvider for JsonRpcWallet {
    async fn request_accounts(&self) -> Result<Vec<String>, WalletError> {
        let value = self.call("eth_requestAccounts", json!([])).await?;
        serde_json::from_value(value).map_err(|error| WalletError::Malformed(error.to_string()))
    }

    async fn switch_chain(&self, chain_id: &str) -> Result<(), WalletError> {
        self.call("wallet_switchEthereumChain", json!([{ "chainId": chain_id }]))
            .await?;
        Ok(())
    }

    async fn add_chain(&self, params: &ChainParams) -> Result<(), WalletError> {
        self.call("wallet_addEthereumChain", json!([params])).await?;
        Ok(())
    }

    async fn send_transaction(&self, request: &TransactionRequest) -> Result<String, WalletError> {
        let value = self.call("eth_sendTransaction", json!([request])).await?;
        match value {
            Value::String(tx_hash) => Ok(tx_hash),
            other => Err(WalletError::Malformed(format!(
                "unexpected transaction hash {other}"
            ))),
        }
    }
}
