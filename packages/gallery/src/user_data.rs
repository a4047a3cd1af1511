//! Queries against the companion JSON-storage contract.
//!
//! The contract keeps one free-form JSON document per address. Only the
//! read side lives here; `update` needs a signing wallet.

use nft_gallery_types::message;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::gateway::QueryGateway;
use crate::Error;

const INVALID_JSON: &str = "Invalid JSON format";

/// Every address that has stored a document.
pub async fn get_users(gateway: &dyn QueryGateway, contract: &str) -> Result<Vec<String>, Error> {
    query(gateway, contract, &message::get_users(), "get_users").await
}

/// The raw document stored by `address`.
pub async fn get_value_by_user(
    gateway: &dyn QueryGateway,
    contract: &str,
    address: &str,
) -> Result<String, Error> {
    if address.trim().is_empty() {
        return Err(Error::InvalidInput("address is empty".into()));
    }
    query(
        gateway,
        contract,
        &message::get_value_by_user(address),
        "get_value_by_user",
    )
    .await
}

/// All `(address, document)` pairs.
pub async fn get_map(
    gateway: &dyn QueryGateway,
    contract: &str,
) -> Result<Vec<(String, String)>, Error> {
    query(gateway, contract, &message::get_map(), "get_map").await
}

async fn query<T: DeserializeOwned>(
    gateway: &dyn QueryGateway,
    contract: &str,
    msg: &Value,
    what: &str,
) -> Result<T, Error> {
    if contract.trim().is_empty() {
        return Err(Error::InvalidInput("contract address is empty".into()));
    }
    let response = gateway.query_smart(contract, msg).await?;
    serde_json::from_value(response).map_err(|e| Error::Parse(format!("{what}: {e}")))
}

/// Accept `text` only if it parses as JSON.
pub fn validate_json(text: &str) -> Result<(), Error> {
    serde_json::from_str::<Value>(text)
        .map(|_| ())
        .map_err(|_| Error::InvalidInput(INVALID_JSON.into()))
}

/// Pretty-print with two-space indentation; unparsable text comes back unchanged.
pub fn format_json(text: &str) -> String {
    serde_json::from_str::<Value>(text)
        .ok()
        .and_then(|value| serde_json::to_string_pretty(&value).ok())
        .unwrap_or_else(|| text.to_string())
}
