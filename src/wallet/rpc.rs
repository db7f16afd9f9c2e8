use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use reqwest::Client;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::{json, Value};
use univote_protocol::{hex, Address, Signature};

use super::{WalletError, WalletSigner, USER_REJECTED};
use crate::{
    config::Config,
    logging::{log_failure, log_request, log_response},
};

/// A wallet reached through EIP-1193 JSON-RPC over HTTP, e.g. a desktop
/// wallet's local RPC port.
#[derive(Debug)]
pub struct RpcWallet {
    client: Client,
    url: String,
    next_id: AtomicU64,
}

#[derive(Debug, Serialize)]
struct RpcRequest<'a> {
    jsonrpc: &'static str,
    id: u64,
    method: &'a str,
    params: Value,
}

#[derive(Debug, Deserialize)]
struct RpcResponse {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<RpcErrorObject>,
}

#[derive(Debug, Deserialize)]
struct RpcErrorObject {
    code: i64,
    #[serde(default)]
    message: String,
}

impl From<RpcErrorObject> for WalletError {
    fn from(err: RpcErrorObject) -> Self {
        if err.code == USER_REJECTED {
            WalletError::Rejected
        } else {
            WalletError::Rpc {
                code: err.code,
                message: err.message,
            }
        }
    }
}

impl RpcWallet {
    pub fn new(url: impl Into<String>, config: &Config) -> Result<Self, WalletError> {
        let client = Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| WalletError::Unavailable(e.to_string()))?;
        Ok(Self {
            client,
            url: url.into(),
            next_id: AtomicU64::new(1),
        })
    }

    /// The wallet named by the configuration, if any.
    pub fn from_config(config: &Config) -> Result<Option<Self>, WalletError> {
        config
            .wallet_rpc_url()
            .map(|url| Self::new(url, config))
            .transpose()
    }

    /// Perform one JSON-RPC call and decode its result.
    async fn call<T: DeserializeOwned>(&self, method: &str, params: Value) -> Result<T, WalletError> {
        let request = RpcRequest {
            jsonrpc: "2.0",
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
            method,
            params,
        };
        let id = log_request(method, &self.url);
        let response = match self.client.post(&self.url).json(&request).send().await {
            Ok(response) => response,
            Err(e) => {
                log_failure(id, &self.url, &e);
                return Err(WalletError::Unavailable(e.to_string()));
            }
        };
        log_response(id, response.status(), &self.url);
        let body: RpcResponse = response
            .json()
            .await
            .map_err(|e| WalletError::Malformed(e.to_string()))?;
        decode_response(body)
    }
}

fn decode_response<T: DeserializeOwned>(body: RpcResponse) -> Result<T, WalletError> {
    if let Some(err) = body.error {
        return Err(err.into());
    }
    serde_json::from_value(body.result.unwrap_or(Value::Null))
        .map_err(|e| WalletError::Malformed(e.to_string()))
}

fn first_account(accounts: Vec<Address>) -> Result<Address, WalletError> {
    accounts
        .into_iter()
        .next()
        .ok_or_else(|| WalletError::Unavailable("wallet returned no accounts".to_string()))
}

#[async_trait]
impl WalletSigner for RpcWallet {
    async fn authorized_accounts(&self) -> Result<Vec<Address>, WalletError> {
        self.call("eth_accounts", json!([])).await
    }

    async fn request_permission(&self) -> Result<(), WalletError> {
        let _: Value = self
            .call("wallet_requestPermissions", json!([{ "eth_accounts": {} }]))
            .await?;
        let _: Vec<Address> = self.call("eth_requestAccounts", json!([])).await?;
        Ok(())
    }

    async fn active_address(&self) -> Result<Address, WalletError> {
        first_account(self.call("eth_requestAccounts", json!([])).await?)
    }

    async fn sign_personal_message(
        &self,
        signer: &Address,
        message: &[u8],
    ) -> Result<Signature, WalletError> {
        let signature: String = self
            .call(
                "personal_sign",
                json!([hex::encode(message), signer.to_lower_hex()]),
            )
            .await?;
        signature
            .parse()
            .map_err(|e| WalletError::Malformed(format!("signature {signature:?}: {e}")))
    }
}
