//! Hosted-checkout catalog client.
//!
//! Lists the NFTs a hosted-checkout collection offers for sale, so the
//! gallery can render purchase cards next to the on-chain listing.

use nft_gallery_types::{collection_locator, resolve_image_uri, TokenMetadata};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::time::Duration;
use tracing::{debug, warn};

use crate::Error;

const API_VERSION: &str = "2022-06-09";

/// One listing in a hosted-checkout collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogNft {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub metadata: TokenMetadata,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl CatalogNft {
    /// Metadata name, or a positional fallback (`NFT #1`, `NFT #2`, ...).
    pub fn title(&self, index: usize) -> String {
        match self.metadata.name.as_deref() {
            Some(name) if !name.trim().is_empty() => name.to_string(),
            _ => format!("NFT #{}", index + 1),
        }
    }

    pub fn image_url(&self, ipfs_gateway: &str) -> Option<String> {
        self.metadata
            .image
            .as_deref()
            .filter(|uri| !uri.is_empty())
            .map(|uri| resolve_image_uri(uri, ipfs_gateway))
    }

    /// Checkout locator for this listing within `collection_id`.
    pub fn locator(&self, collection_id: &str) -> String {
        collection_locator(collection_id, self.id.as_deref())
    }
}

pub struct CatalogClient {
    http: reqwest::Client,
    base_url: String,
    collection_id: String,
    api_key: String,
}

impl CatalogClient {
    pub fn new(
        base_url: &str,
        collection_id: &str,
        api_key: &str,
        timeout: Duration,
    ) -> Result<Self, Error> {
        if api_key.trim().is_empty() {
            return Err(Error::Config("checkout API key is empty".into()));
        }
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Config(format!("HTTP client: {e}")))?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            collection_id: collection_id.to_string(),
            api_key: api_key.to_string(),
        })
    }

    pub fn collection_id(&self) -> &str {
        &self.collection_id
    }

    pub fn collection_url(&self) -> String {
        format!(
            "{}/api/{API_VERSION}/collections/{}/nfts",
            self.base_url, self.collection_id
        )
    }

    pub async fn list_collection_nfts(&self) -> Result<Vec<CatalogNft>, Error> {
        let url = self.collection_url();
        debug!(url = %url, "Fetching checkout catalog");
        let resp = self
            .http
            .get(&url)
            .header("x-api-key", &self.api_key)
            .send()
            .await
            .map_err(|e| Error::Catalog(format!("request failed: {e}")))?;

        let status = resp.status();
        if !status.is_success() {
            warn!(%status, collection = %self.collection_id, "Checkout catalog request rejected");
            return Err(Error::Catalog(format!("Failed to fetch NFTs: {status}")));
        }

        let body: Value = resp
            .json()
            .await
            .map_err(|e| Error::Catalog(format!("unreadable response: {e}")))?;
        parse_catalog(body)
    }
}

/// Accepts a bare array or an object with an `nfts` array; a missing list is empty.
pub fn parse_catalog(body: Value) -> Result<Vec<CatalogNft>, Error> {
    let list = match body {
        Value::Array(_) => body,
        Value::Object(mut map) => match map.remove("nfts") {
            Some(Value::Null) | None => return Ok(Vec::new()),
            Some(list) => list,
        },
        other => {
            return Err(Error::Catalog(format!("unexpected catalog payload: {other}")));
        }
    };
    serde_json::from_value(list).map_err(|e| Error::Catalog(format!("catalog entries: {e}")))
}
