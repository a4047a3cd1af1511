//! Typed CW721 token records.
//!
//! Responses from the gateway are loosely shaped: the `extension` object of a
//! token varies from contract to contract. Known display fields are typed and
//! validated; everything else is kept in `extra`.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::{resolve_image_uri, MetadataError};

/// A single `attributes` entry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Trait {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trait_type: Option<String>,
    #[serde(default)]
    pub value: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_type: Option<String>,
}

/// Token metadata (the CW721 `extension`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TokenMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(
        default,
        deserialize_with = "null_as_empty",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub attributes: Vec<Trait>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One enriched token: identifier plus its on-chain info.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NftRecord {
    pub token_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_uri: Option<String>,
    #[serde(default)]
    pub metadata: TokenMetadata,
}

/// `extension` must be present, though it may be `null`.
#[derive(Deserialize)]
struct NftInfoResponse {
    #[serde(default)]
    token_uri: Option<String>,
    #[serde(deserialize_with = "present_or_null")]
    extension: Option<TokenMetadata>,
}

#[derive(Deserialize)]
struct OwnerAccess {
    owner: String,
}

#[derive(Deserialize)]
struct AllNftInfoResponse {
    access: OwnerAccess,
    info: NftInfoResponse,
}

#[derive(Deserialize)]
struct TokensResponse {
    #[serde(default, deserialize_with = "null_as_empty")]
    tokens: Vec<String>,
}

impl NftRecord {
    /// Parse an `nft_info` response. The owner is unknown at this level.
    pub fn from_nft_info(token_id: &str, response: Value) -> Result<Self, MetadataError> {
        let info: NftInfoResponse = serde_json::from_value(response)
            .map_err(|e| MetadataError::Malformed(format!("nft_info for {token_id}: {e}")))?;
        Ok(Self {
            token_id: token_id.to_string(),
            owner: None,
            token_uri: info.token_uri,
            metadata: info.extension.unwrap_or_default(),
        })
    }

    /// Parse an `all_nft_info` response (`access` + `info`).
    pub fn from_all_nft_info(token_id: &str, response: Value) -> Result<Self, MetadataError> {
        let all: AllNftInfoResponse = serde_json::from_value(response)
            .map_err(|e| MetadataError::Malformed(format!("all_nft_info for {token_id}: {e}")))?;
        Ok(Self {
            token_id: token_id.to_string(),
            owner: Some(all.access.owner),
            token_uri: all.info.token_uri,
            metadata: all.info.extension.unwrap_or_default(),
        })
    }

    /// Metadata name, or the token id when the name is missing or blank.
    pub fn display_name(&self) -> &str {
        match self.metadata.name.as_deref() {
            Some(name) if !name.trim().is_empty() => name,
            _ => &self.token_id,
        }
    }

    /// Renderable image URL, with content-addressed URIs rewritten.
    pub fn image_url(&self, ipfs_gateway: &str) -> Option<String> {
        self.metadata
            .image
            .as_deref()
            .filter(|uri| !uri.is_empty())
            .map(|uri| resolve_image_uri(uri, ipfs_gateway))
    }
}

/// Parse a `{ tokens: [...] }` page. A missing or null list is an empty page.
pub fn parse_token_page(response: Value) -> Result<Vec<String>, MetadataError> {
    let page: TokensResponse = serde_json::from_value(response)
        .map_err(|e| MetadataError::Malformed(format!("token page: {e}")))?;
    Ok(page.tokens)
}

fn present_or_null<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer)
}

fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}
