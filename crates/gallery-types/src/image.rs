//! Content-addressed image URI rewriting.

/// Scheme marker for content-addressed (IPFS) locators.
pub const IPFS_SCHEME: &str = "ipfs://";

/// Public HTTP gateway used when none is configured.
pub const DEFAULT_IPFS_GATEWAY: &str = "https://ipfs.io/ipfs/";

/// Rewrite `ipfs://<path>` to `<gateway>/<path>`. Any other URI is returned unchanged.
pub fn resolve_image_uri(uri: &str, gateway: &str) -> String {
    match uri.strip_prefix(IPFS_SCHEME) {
        Some(path) => format!("{}/{}", gateway.trim_end_matches('/'), path),
        None => uri.to_string(),
    }
}
