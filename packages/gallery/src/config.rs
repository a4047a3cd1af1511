//! Gallery configuration.

use serde::Deserialize;

/// Connection parameters and service settings. Loaded once at startup and
/// passed explicitly; nothing below the binary reads the environment.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default = "defaults::rest_url")]
    pub rest_url: String,

    #[serde(default)]
    pub fallback_rest_url: Option<String>,

    #[serde(default)]
    pub contract_address: String,

    /// Companion JSON-storage contract (`get_users`, `get_value_by_user`, `get_map`).
    #[serde(default)]
    pub user_data_contract: Option<String>,

    #[serde(default = "defaults::collections_path")]
    pub collections_path: String,

    #[serde(default = "defaults::ipfs_gateway")]
    pub ipfs_gateway: String,

    #[serde(default = "defaults::page_limit")]
    pub page_limit: u32,

    #[serde(default = "defaults::bind_address")]
    pub bind_address: String,

    #[serde(default = "defaults::request_timeout_ms")]
    pub request_timeout_ms: u64,

    /// Background catalog refresh period. `0` disables the refresher.
    #[serde(default = "defaults::refresh_interval_secs")]
    pub refresh_interval_secs: u64,

    #[serde(default = "defaults::crossmint_base_url")]
    pub crossmint_base_url: String,

    #[serde(default)]
    pub crossmint_collection_id: String,

    #[serde(default)]
    pub crossmint_api_key: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            rest_url: defaults::rest_url(),
            fallback_rest_url: None,
            contract_address: String::new(),
            user_data_contract: None,
            collections_path: defaults::collections_path(),
            ipfs_gateway: defaults::ipfs_gateway(),
            page_limit: defaults::page_limit(),
            bind_address: defaults::bind_address(),
            request_timeout_ms: defaults::request_timeout_ms(),
            refresh_interval_secs: defaults::refresh_interval_secs(),
            crossmint_base_url: defaults::crossmint_base_url(),
            crossmint_collection_id: String::new(),
            crossmint_api_key: None,
        }
    }
}

impl Config {
    /// Reject settings the service cannot start without.
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.contract_address.trim().is_empty() {
            return Err(crate::Error::Config(
                "contract_address is not set (GALLERY_CONTRACT_ADDRESS)".into(),
            ));
        }
        if self.crossmint_collection_id.trim().is_empty() {
            return Err(crate::Error::Config(
                "crossmint_collection_id is not set (GALLERY_CROSSMINT_COLLECTION_ID)".into(),
            ));
        }
        if self.page_limit == 0 {
            return Err(crate::Error::Config("page_limit must be positive".into()));
        }
        if self.rest_url.trim().is_empty() {
            return Err(crate::Error::Config("rest_url is empty".into()));
        }
        Ok(())
    }

    /// Fallback endpoint, or the primary when none is configured.
    pub fn fallback_url(&self) -> &str {
        self.fallback_rest_url
            .as_deref()
            .filter(|url| !url.is_empty())
            .unwrap_or(&self.rest_url)
    }
}

mod defaults {
    pub fn rest_url() -> String {
        "https://api.xion-testnet-2.burnt.com".into()
    }

    pub fn collections_path() -> String {
        "./collections.json".into()
    }

    pub fn ipfs_gateway() -> String {
        nft_gallery_types::DEFAULT_IPFS_GATEWAY.into()
    }

    pub fn page_limit() -> u32 {
        crate::pipeline::DEFAULT_PAGE_LIMIT
    }

    pub fn bind_address() -> String {
        "0.0.0.0:3050".into()
    }

    pub fn request_timeout_ms() -> u64 {
        10_000
    }

    pub fn refresh_interval_secs() -> u64 {
        60
    }

    pub fn crossmint_base_url() -> String {
        "https://staging.crossmint.com".into()
    }
}
