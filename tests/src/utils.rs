//! In-memory chain for driving the gallery without a node.

use async_trait::async_trait;
use nft_gallery::{Error, QueryGateway};
use serde_json::{json, Value};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use tokio::sync::{Barrier, Notify};

pub const CONTRACT: &str = "xion1gallery";
pub const USER_DATA: &str = "xion1userdata";

#[derive(Clone)]
pub struct StubToken {
    pub id: String,
    pub owner: String,
    pub extension: Value,
}

/// One CW721-like contract.
#[derive(Default)]
pub struct StubContract {
    pub tokens: Vec<StubToken>,
    pub collection_info: Option<Value>,
    /// Token ids whose info queries fail.
    pub failing: HashSet<String>,
    pub user_data: Vec<(String, String)>,
}

impl StubContract {
    /// `count` tokens `t0..`, alternating between two owners.
    pub fn with_tokens(count: usize) -> Self {
        let tokens = (0..count)
            .map(|i| StubToken {
                id: format!("t{i}"),
                owner: if i % 2 == 0 { "xion1alice" } else { "xion1bob" }.to_string(),
                extension: json!({
                    "name": format!("Token {i}"),
                    "image": format!("ipfs://QmImage{i}"),
                    "attributes": [{ "trait_type": "rank", "value": i }]
                }),
            })
            .collect();
        Self {
            tokens,
            ..Self::default()
        }
    }
}

/// Scripted gateway over a set of contracts. Records every query it sees.
#[derive(Default)]
pub struct StubChain {
    contracts: HashMap<String, StubContract>,
    calls: Mutex<Vec<(String, Value)>>,
    info_barrier: Option<Arc<Barrier>>,
    page_gate: Mutex<Option<Arc<Notify>>>,
}

impl StubChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_contract(mut self, address: &str, contract: StubContract) -> Self {
        self.contracts.insert(address.to_string(), contract);
        self
    }

    /// Every info query waits until `n` of them are in flight.
    pub fn with_info_barrier(mut self, n: usize) -> Self {
        self.info_barrier = Some(Arc::new(Barrier::new(n)));
        self
    }

    /// The first page query waits on `gate` before answering.
    pub fn with_page_gate(self, gate: Arc<Notify>) -> Self {
        *self.page_gate.lock().unwrap() = Some(gate);
        self
    }

    pub fn calls(&self) -> Vec<(String, Value)> {
        self.calls.lock().unwrap().clone()
    }

    /// Number of recorded queries whose top-level key is `kind`.
    pub fn count(&self, kind: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|(_, msg)| msg.get(kind).is_some())
            .count()
    }

    fn contract(&self, address: &str) -> Result<&StubContract, Error> {
        self.contracts
            .get(address)
            .ok_or_else(|| Error::Query(format!("{address}: contract not found")))
    }
}

fn page(ids: Vec<&StubToken>, args: &Value) -> Value {
    let limit = args["limit"].as_u64().unwrap_or(10) as usize;
    let start = match args.get("start_after").and_then(Value::as_str) {
        Some(cursor) => ids.iter().position(|t| t.id == cursor).map_or(ids.len(), |i| i + 1),
        None => 0,
    };
    let tokens: Vec<&str> = ids.iter().skip(start).take(limit).map(|t| t.id.as_str()).collect();
    json!({ "tokens": tokens })
}

#[async_trait]
impl QueryGateway for StubChain {
    async fn query_smart(&self, contract: &str, msg: &Value) -> Result<Value, Error> {
        self.calls
            .lock()
            .unwrap()
            .push((contract.to_string(), msg.clone()));

        if msg.get("all_tokens").is_some() || msg.get("tokens").is_some() {
            let gate = self.page_gate.lock().unwrap().take();
            if let Some(gate) = gate {
                gate.notified().await;
            }
        }
        if msg.get("nft_info").is_some() || msg.get("all_nft_info").is_some() {
            if let Some(barrier) = &self.info_barrier {
                barrier.wait().await;
            }
        }

        let state = self.contract(contract)?;
        let (kind, args) = msg
            .as_object()
            .and_then(|m| m.iter().next())
            .ok_or_else(|| Error::Query("empty query message".into()))?;

        match kind.as_str() {
            "all_tokens" => Ok(page(state.tokens.iter().collect(), args)),
            "tokens" => {
                let owner = args["owner"].as_str().unwrap_or_default();
                Ok(page(
                    state.tokens.iter().filter(|t| t.owner == owner).collect(),
                    args,
                ))
            }
            "nft_info" | "all_nft_info" => {
                let id = args["token_id"].as_str().unwrap_or_default();
                let token = state
                    .tokens
                    .iter()
                    .find(|t| t.id == id)
                    .filter(|t| !state.failing.contains(&t.id))
                    .ok_or_else(|| Error::Query(format!("{contract}: token {id} not found")))?;
                let info = json!({ "token_uri": null, "extension": token.extension });
                Ok(if kind == "nft_info" {
                    info
                } else {
                    json!({ "access": { "owner": token.owner, "approvals": [] }, "info": info })
                })
            }
            "get_collection_info_and_extension" => state
                .collection_info
                .clone()
                .ok_or_else(|| Error::Query(format!("{contract}: unknown query"))),
            "get_users" => Ok(json!(state
                .user_data
                .iter()
                .map(|(addr, _)| addr.as_str())
                .collect::<Vec<_>>())),
            "get_value_by_user" => {
                let address = args["address"].as_str().unwrap_or_default();
                state
                    .user_data
                    .iter()
                    .find(|(addr, _)| addr == address)
                    .map(|(_, value)| json!(value))
                    .ok_or_else(|| Error::Query(format!("{address}: no value stored")))
            }
            "get_map" => Ok(json!(state.user_data)),
            other => Err(Error::Query(format!("{contract}: unknown query {other}"))),
        }
    }
}
