//! Hosted-checkout order construction and the selection cart.

use serde::{Deserialize, Serialize};

use crate::{MetadataError, NftRecord};

/// Locator scheme understood by the hosted-checkout provider.
pub const CHECKOUT_SCHEME: &str = "crossmint";

/// Price attached to every line item unless overridden.
pub const DEFAULT_TOTAL_PRICE: &str = "1";

/// `crossmint:<collection>` or `crossmint:<collection>:<item>`.
pub fn collection_locator(collection_id: &str, item_id: Option<&str>) -> String {
    match item_id {
        Some(item) if !item.is_empty() => format!("{CHECKOUT_SCHEME}:{collection_id}:{item}"),
        _ => format!("{CHECKOUT_SCHEME}:{collection_id}"),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallData {
    pub total_price: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    pub collection_locator: String,
    pub call_data: CallData,
}

impl LineItem {
    pub fn new(collection_id: &str, item_id: Option<&str>) -> Self {
        Self {
            collection_locator: collection_locator(collection_id, item_id),
            call_data: CallData {
                total_price: DEFAULT_TOTAL_PRICE.to_string(),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CryptoPayment {
    pub enabled: bool,
    pub default_chain: String,
    pub default_currency: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FiatPayment {
    pub enabled: bool,
    pub default_currency: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentOptions {
    pub crypto: CryptoPayment,
    pub fiat: FiatPayment,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub receipt_email: Option<String>,
}

impl Default for PaymentOptions {
    fn default() -> Self {
        Self {
            crypto: CryptoPayment {
                enabled: true,
                default_chain: "base-sepolia".into(),
                default_currency: "usdc".into(),
            },
            fiat: FiatPayment {
                enabled: true,
                default_currency: "usd".into(),
            },
            receipt_email: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recipient {
    pub wallet_address: String,
}

/// Everything the hosted-checkout widget needs to open a purchase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutOrder {
    pub line_items: Vec<LineItem>,
    pub payment: PaymentOptions,
    pub recipient: Recipient,
    pub locale: String,
}

impl CheckoutOrder {
    /// One line item per selected item, delivered to `recipient_wallet`.
    pub fn new(
        collection_id: &str,
        item_ids: &[String],
        recipient_wallet: &str,
    ) -> Result<Self, MetadataError> {
        if collection_id.trim().is_empty() {
            return Err(MetadataError::InvalidInput("collection id is empty".into()));
        }
        if recipient_wallet.trim().is_empty() {
            return Err(MetadataError::InvalidInput("recipient wallet is empty".into()));
        }
        if item_ids.is_empty() {
            return Err(MetadataError::InvalidInput("cart is empty".into()));
        }

        Ok(Self {
            line_items: item_ids
                .iter()
                .map(|id| LineItem::new(collection_id, Some(id)))
                .collect(),
            payment: PaymentOptions::default(),
            recipient: Recipient {
                wallet_address: recipient_wallet.to_string(),
            },
            locale: "en-US".into(),
        })
    }

    pub fn with_receipt_email(mut self, email: impl Into<String>) -> Self {
        self.payment.receipt_email = Some(email.into());
        self
    }
}

/// Token ids selected for purchase, in the order they were added.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Cart {
    items: Vec<String>,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add the id if absent, remove it if present. Returns whether it is now in the cart.
    pub fn toggle(&mut self, token_id: &str) -> bool {
        if let Some(pos) = self.items.iter().position(|id| id == token_id) {
            self.items.remove(pos);
            false
        } else {
            self.items.push(token_id.to_string());
            true
        }
    }

    pub fn contains(&self, token_id: &str) -> bool {
        self.items.iter().any(|id| id == token_id)
    }

    pub fn items(&self) -> &[String] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Records whose token id is in the cart, in record order.
    pub fn selected<'a>(&self, records: &'a [NftRecord]) -> Vec<&'a NftRecord> {
        records.iter().filter(|r| self.contains(&r.token_id)).collect()
    }
}
