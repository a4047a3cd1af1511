//! # NFT Gallery
//!
//! Enumerates CW721 contracts through a smart-query gateway, enriches every
//! token and collection with its on-chain metadata, and prepares
//! hosted-checkout orders for selected tokens.
//!
//! ## Quick Start
//! ```bash
//! GALLERY_CONTRACT_ADDRESS=xion1... GALLERY_CROSSMINT_COLLECTION_ID=... cargo run --bin nft-gallery
//! ```
//!
//! ## Endpoints
//! - `GET /health` - Health check with gateway status
//! - `GET /metrics` - Prometheus metrics
//! - `GET /collections` - Static collections enriched with on-chain info
//! - `GET /nfts` - Refresh and return every token of the configured contract
//! - `GET /nfts/cached` - Last refreshed token listing
//! - `GET /owners/{owner}/nfts` - Tokens held by one wallet
//! - `POST /checkout` - Build a hosted-checkout order
//! - `GET /catalog` - Listings of the hosted-checkout collection
//! - `GET /users`, `GET /users/{address}/value`, `GET /map` - User-data contract reads

pub mod catalog;
pub mod config;
mod error;
pub mod gateway;
mod handlers;
pub mod latest;
pub mod metrics;
pub mod pipeline;
mod response;
mod router;
mod state;
pub mod user_data;

pub use config::Config;
pub use error::Error;
pub use gateway::{LcdGateway, QueryGateway};
pub use latest::LatestSlot;
pub use router::create as create_router;
pub use state::AppState;
