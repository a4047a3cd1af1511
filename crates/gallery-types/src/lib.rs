//! Shared types and pure-logic utilities for the NFT gallery.
//! No network dependency; usable by any query gateway and by tests.

mod checkout;
mod collection;
mod error;
mod image;
pub mod message;
mod token;

pub use checkout::{
    collection_locator, CallData, Cart, CheckoutOrder, CryptoPayment, FiatPayment, LineItem,
    PaymentOptions, Recipient, CHECKOUT_SCHEME, DEFAULT_TOTAL_PRICE,
};
pub use collection::{
    parse_descriptors, CollectionDescriptor, CollectionExtension, CollectionInfo,
    EnrichedCollection,
};
pub use error::MetadataError;
pub use image::{resolve_image_uri, DEFAULT_IPFS_GATEWAY, IPFS_SCHEME};
pub use token::{parse_token_page, NftRecord, TokenMetadata, Trait};
