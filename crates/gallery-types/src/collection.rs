//! Static collection descriptors and their live enrichment.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{resolve_image_uri, MetadataError};

/// A collection as listed in the static configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionDescriptor {
    pub id: String,
    pub contract_address: String,
}

/// `get_collection_info_and_extension` response.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CollectionInfo {
    pub name: String,
    pub symbol: String,
    #[serde(default)]
    pub extension: Option<CollectionExtension>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct CollectionExtension {
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl CollectionInfo {
    pub fn parse(contract_address: &str, response: Value) -> Result<Self, MetadataError> {
        serde_json::from_value(response).map_err(|e| {
            MetadataError::Malformed(format!("collection info for {contract_address}: {e}"))
        })
    }
}

/// A descriptor with whatever live fields could be fetched for it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrichedCollection {
    pub id: String,
    pub contract_address: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub symbol: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

impl EnrichedCollection {
    /// The descriptor as-is, with no live fields.
    pub fn bare(descriptor: &CollectionDescriptor) -> Self {
        Self {
            id: descriptor.id.clone(),
            contract_address: descriptor.contract_address.clone(),
            name: None,
            symbol: None,
            description: None,
            image: None,
        }
    }

    pub fn enriched(descriptor: &CollectionDescriptor, info: CollectionInfo, ipfs_gateway: &str) -> Self {
        let extension = info.extension.unwrap_or_default();
        Self {
            name: Some(info.name),
            symbol: Some(info.symbol),
            description: extension.description,
            image: extension
                .image
                .filter(|uri| !uri.is_empty())
                .map(|uri| resolve_image_uri(&uri, ipfs_gateway)),
            ..Self::bare(descriptor)
        }
    }

    pub fn is_enriched(&self) -> bool {
        self.name.is_some()
    }
}

/// Parse the static descriptor list. Every entry needs a non-empty id and address.
pub fn parse_descriptors(json: &str) -> Result<Vec<CollectionDescriptor>, MetadataError> {
    let descriptors: Vec<CollectionDescriptor> = serde_json::from_str(json)
        .map_err(|e| MetadataError::InvalidInput(format!("collection list: {e}")))?;
    if let Some(bad) = descriptors
        .iter()
        .find(|d| d.id.trim().is_empty() || d.contract_address.trim().is_empty())
    {
        return Err(MetadataError::InvalidInput(format!(
            "collection entry missing id or contractAddress: {bad:?}"
        )));
    }
    Ok(descriptors)
}
