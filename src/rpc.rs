//! Thin JSON-RPC client over the provider endpoint, with an optional
//! fallback endpoint tried when the primary fails.

use crate::errors::ProposeError;
use alloy_primitives::{Address, U256};
use log::{debug, warn};
use serde_json::{json, Value};

#[derive(Clone, Debug)]
pub struct HttpRpcClient {
    http: reqwest::Client,
    provider_url: String,
    fallback_url: Option<String>,
}

impl HttpRpcClient {
    pub fn new(provider_url: &str, fallback_url: Option<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            provider_url: provider_url.to_string(),
            fallback_url,
        }
    }

    pub async fn eth_call(&self, to: &Address, data: &[u8]) -> Result<Vec<u8>, ProposeError> {
        let result = self
            .rpc_call(
                "eth_call",
                json!([{"to": format!("{to}"), "data": hex_blob(data)}, "latest"]),
            )
            .await?;
        decode_hex_blob(result_str(&result, "eth_call")?, "eth_call result")
    }

    pub async fn eth_gas_price(&self) -> Result<U256, ProposeError> {
        let result = self.rpc_call("eth_gasPrice", json!([])).await?;
        parse_hex_u256(result_str(&result, "eth_gasPrice")?, "eth_gasPrice")
    }

    pub async fn eth_block_number(&self) -> Result<u64, ProposeError> {
        let result = self.rpc_call("eth_blockNumber", json!([])).await?;
        parse_hex_u64(result_str(&result, "eth_blockNumber")?, "eth_blockNumber")
    }

    /// Submit a call through the node's own signer. Returns the tx hash.
    pub async fn eth_send_transaction(
        &self,
        from: &Address,
        to: &Address,
        data: &[u8],
        gas_price: U256,
    ) -> Result<String, ProposeError> {
        let result = self
            .rpc_call(
                "eth_sendTransaction",
                json!([{
                    "from": format!("{from}"),
                    "to": format!("{to}"),
                    "data": hex_blob(data),
                    "gasPrice": format!("0x{gas_price:x}"),
                }]),
            )
            .await?;
        let tx_hash = result_str(&result, "eth_sendTransaction")?;
        Ok(tx_hash.to_ascii_lowercase())
    }

    /// Block number the transaction was mined in, or `None` while pending.
    pub async fn eth_transaction_block(
        &self,
        tx_hash: &str,
    ) -> Result<Option<u64>, ProposeError> {
        let result = self
            .rpc_call("eth_getTransactionReceipt", json!([tx_hash]))
            .await?;
        receipt_block_number(&result)
    }

    async fn rpc_call(&self, method: &str, params: Value) -> Result<Value, ProposeError> {
        let body = json!({
            "jsonrpc": "2.0",
            "method": method,
            "params": params,
            "id": 1
        });
        debug!("rpc {method}");
        let response = self.post(&body).await?;
        if let Some(error) = response.get("error") {
            return Err(ProposeError::Rpc(format!(
                "rpc returned error for {method}: {error}"
            )));
        }
        response
            .get("result")
            .cloned()
            .ok_or_else(|| ProposeError::Rpc(format!("{method} result was missing")))
    }

    async fn post(&self, body: &Value) -> Result<Value, ProposeError> {
        match self.try_post(&self.provider_url, body).await {
            Ok(response) => Ok(response),
            Err(primary_error) => match self.fallback_url.as_deref() {
                None => Err(primary_error),
                Some(fallback_url) => {
                    warn!("primary rpc failed, trying fallback: {primary_error}");
                    self.try_post(fallback_url, body).await.map_err(|fallback_error| {
                        ProposeError::Rpc(format!(
                            "primary rpc failed: {primary_error}; fallback rpc failed: {fallback_error}"
                        ))
                    })
                }
            },
        }
    }

    async fn try_post(&self, url: &str, body: &Value) -> Result<Value, ProposeError> {
        let response = self
            .http
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(|error| ProposeError::Rpc(format!("rpc transport failed: {error}")))?;
        let status = response.status();
        if !status.is_success() {
            return Err(ProposeError::Rpc(format!("rpc returned status {status}")));
        }
        response
            .json::<Value>()
            .await
            .map_err(|error| ProposeError::Rpc(format!("rpc response was not JSON: {error}")))
    }
}

/// Pending transactions show up either as a null receipt or, on some nodes,
/// as a receipt whose `blockNumber` is still null. Both mean "not mined yet".
pub(crate) fn receipt_block_number(receipt: &Value) -> Result<Option<u64>, ProposeError> {
    if receipt.is_null() {
        return Ok(None);
    }
    match receipt.get("blockNumber") {
        None => Err(ProposeError::Rpc(
            "transaction receipt is missing blockNumber".to_string(),
        )),
        Some(Value::Null) => Ok(None),
        Some(Value::String(raw)) => parse_hex_u64(raw, "receipt blockNumber").map(Some),
        Some(other) => Err(ProposeError::Rpc(format!(
            "receipt blockNumber is not a hex string: {other}"
        ))),
    }
}

fn result_str<'a>(result: &'a Value, method: &str) -> Result<&'a str, ProposeError> {
    result
        .as_str()
        .ok_or_else(|| ProposeError::Rpc(format!("{method} result was not a string")))
}

fn hex_blob(data: &[u8]) -> String {
    format!("0x{}", hex::encode(data))
}

pub(crate) fn parse_hex_u64(raw: &str, field: &str) -> Result<u64, ProposeError> {
    let value = raw.trim();
    let without_prefix = value
        .strip_prefix("0x")
        .or_else(|| value.strip_prefix("0X"))
        .ok_or_else(|| ProposeError::Rpc(format!("{field} must be 0x-prefixed hex")))?;
    u64::from_str_radix(without_prefix, 16)
        .map_err(|error| ProposeError::Rpc(format!("failed to parse {field} as hex u64: {error}")))
}

pub(crate) fn parse_hex_u256(raw: &str, field: &str) -> Result<U256, ProposeError> {
    let value = raw.trim();
    let without_prefix = value
        .strip_prefix("0x")
        .or_else(|| value.strip_prefix("0X"))
        .ok_or_else(|| ProposeError::Rpc(format!("{field} must be 0x-prefixed hex")))?;
    U256::from_str_radix(without_prefix, 16)
        .map_err(|error| ProposeError::Rpc(format!("failed to parse {field} as hex u256: {error}")))
}

pub(crate) fn decode_hex_blob(raw: &str, field: &str) -> Result<Vec<u8>, ProposeError> {
    let value = raw.trim();
    let without_prefix = value
        .strip_prefix("0x")
        .ok_or_else(|| ProposeError::Rpc(format!("{field} must be 0x-prefixed hex")))?;
    hex::decode(without_prefix)
        .map_err(|error| ProposeError::Rpc(format!("{field} is not valid hex: {error}")))
}
