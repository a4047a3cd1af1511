//! Smart-query message construction for CW721 and companion contracts.
//!
//! Field order is stable (`serde_json` `preserve_order`), so messages
//! serialize identically on every call and encode to the same query path.

use serde_json::{json, Map, Value};

/// `{ all_tokens: { start_after?, limit } }`
pub fn all_tokens(start_after: Option<&str>, limit: u32) -> Value {
    json!({ "all_tokens": page_args(start_after, limit) })
}

/// `{ tokens: { owner, start_after?, limit } }`
pub fn owner_tokens(owner: &str, start_after: Option<&str>, limit: u32) -> Value {
    let mut args = Map::new();
    args.insert("owner".into(), json!(owner));
    args.extend(page_args(start_after, limit));
    json!({ "tokens": args })
}

/// `{ nft_info: { token_id } }`
pub fn nft_info(token_id: &str) -> Value {
    json!({ "nft_info": { "token_id": token_id } })
}

/// `{ all_nft_info: { token_id } }`
pub fn all_nft_info(token_id: &str) -> Value {
    json!({ "all_nft_info": { "token_id": token_id } })
}

/// `{ get_collection_info_and_extension: {} }`
pub fn collection_info() -> Value {
    json!({ "get_collection_info_and_extension": {} })
}

pub fn get_users() -> Value {
    json!({ "get_users": {} })
}

pub fn get_value_by_user(address: &str) -> Value {
    json!({ "get_value_by_user": { "address": address } })
}

pub fn get_map() -> Value {
    json!({ "get_map": {} })
}

fn page_args(start_after: Option<&str>, limit: u32) -> Map<String, Value> {
    let mut args = Map::new();
    if let Some(cursor) = start_after {
        args.insert("start_after".into(), json!(cursor));
    }
    args.insert("limit".into(), json!(limit));
    args
}
