//! Response types for the gallery API.

use crate::catalog::CatalogNft;
use crate::pipeline::NftSlot;
use nft_gallery_types::{Cart, NftRecord};
use serde::{Deserialize, Serialize};

/// Response from the health endpoint.
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub contract_address: String,
    pub uptime_secs: u64,
    pub requests: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active_lcd: Option<String>,
    pub failovers: u64,
}

/// One listed token, with its image already resolved.
#[derive(Serialize)]
pub struct NftView {
    #[serde(flatten)]
    pub slot: NftSlot,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

impl NftView {
    pub fn new(slot: NftSlot, ipfs_gateway: &str) -> Self {
        let image_url = slot.record().and_then(|r| r.image_url(ipfs_gateway));
        Self { slot, image_url }
    }
}

/// Contract catalog: the listing plus the refresh it came from.
#[derive(Serialize)]
pub struct CatalogResponse {
    pub ticket: u64,
    pub total: usize,
    pub unavailable: usize,
    pub nfts: Vec<NftView>,
}

impl CatalogResponse {
    pub fn new(ticket: u64, slots: Vec<NftSlot>, ipfs_gateway: &str) -> Self {
        let unavailable = slots.iter().filter(|s| !s.is_ready()).count();
        Self {
            ticket,
            total: slots.len(),
            unavailable,
            nfts: slots
                .into_iter()
                .map(|slot| NftView::new(slot, ipfs_gateway))
                .collect(),
        }
    }
}

#[derive(Serialize)]
pub struct OwnedNftView {
    #[serde(flatten)]
    pub record: NftRecord,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

impl OwnedNftView {
    pub fn new(record: NftRecord, ipfs_gateway: &str) -> Self {
        Self {
            name: record.display_name().to_string(),
            image_url: record.image_url(ipfs_gateway),
            record,
        }
    }
}

#[derive(Serialize)]
pub struct OwnedNftsResponse {
    pub owner: String,
    pub nfts: Vec<OwnedNftView>,
}

/// A checkout listing ready to render.
#[derive(Serialize)]
pub struct CatalogNftView {
    pub title: String,
    pub locator: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(flatten)]
    pub nft: CatalogNft,
}

/// Request body for `POST /checkout`.
#[derive(Deserialize)]
pub struct CheckoutRequest {
    pub recipient: String,
    pub item_ids: Vec<String>,
    #[serde(default)]
    pub receipt_email: Option<String>,
}

impl CheckoutRequest {
    /// Selected ids, each once, in first-selected order.
    pub fn cart(&self) -> Cart {
        let mut cart = Cart::new();
        for id in self.item_ids.iter().filter(|id| !id.trim().is_empty()) {
            if !cart.contains(id) {
                cart.toggle(id);
            }
        }
        cart
    }
}

#[derive(Serialize)]
pub struct UsersResponse {
    pub users: Vec<String>,
}

#[derive(Serialize)]
pub struct UserValueResponse {
    pub address: String,
    /// Stored document, pretty-printed when it is valid JSON.
    pub value: String,
    pub valid_json: bool,
}

#[derive(Serialize)]
pub struct MapEntry {
    pub address: String,
    pub value: String,
    pub valid_json: bool,
}
