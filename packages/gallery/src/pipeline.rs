//! Token enumeration and enrichment pipeline.
//!
//! Three stages, all driven through a [`QueryGateway`]:
//! - the paginator walks `all_tokens` / `tokens` with a `start_after` cursor,
//!   strictly one page at a time;
//! - the enricher fans out one info query per token and joins on all of them;
//! - the aggregator fans out one collection-info query per static descriptor
//!   and keeps the bare descriptor for any that fail.
//!
//! Nothing here spawns tasks or reads ambient configuration; every parameter
//! is passed in by the caller.

use futures::future::{join_all, try_join_all};
use nft_gallery_types::{
    message, parse_token_page, CollectionDescriptor, CollectionInfo, EnrichedCollection,
    MetadataError, NftRecord,
};
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::Ordering;
use tracing::{debug, warn};

use crate::gateway::QueryGateway;
use crate::metrics::METRICS;
use crate::Error;

/// Page size used when the caller has no preference.
pub const DEFAULT_PAGE_LIMIT: u32 = 30;

/// Which token list the paginator walks.
#[derive(Clone, Copy)]
enum TokenScope<'a> {
    All,
    Owner(&'a str),
}

impl TokenScope<'_> {
    fn page_query(self, cursor: Option<&str>, limit: u32) -> Value {
        match self {
            TokenScope::All => message::all_tokens(cursor, limit),
            TokenScope::Owner(owner) => message::owner_tokens(owner, cursor, limit),
        }
    }
}

/// Per-token info query flavour.
#[derive(Clone, Copy)]
enum InfoQuery {
    NftInfo,
    AllNftInfo,
}

impl InfoQuery {
    fn message(self, token_id: &str) -> Value {
        match self {
            InfoQuery::NftInfo => message::nft_info(token_id),
            InfoQuery::AllNftInfo => message::all_nft_info(token_id),
        }
    }

    fn parse(self, token_id: &str, response: Value) -> Result<NftRecord, MetadataError> {
        match self {
            InfoQuery::NftInfo => NftRecord::from_nft_info(token_id, response),
            InfoQuery::AllNftInfo => NftRecord::from_all_nft_info(token_id, response),
        }
    }
}

/// Outcome for one position of a settled enrichment.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum NftSlot {
    Ready(NftRecord),
    Unavailable { token_id: String, reason: String },
}

impl NftSlot {
    pub fn token_id(&self) -> &str {
        match self {
            NftSlot::Ready(record) => &record.token_id,
            NftSlot::Unavailable { token_id, .. } => token_id,
        }
    }

    pub fn record(&self) -> Option<&NftRecord> {
        match self {
            NftSlot::Ready(record) => Some(record),
            NftSlot::Unavailable { .. } => None,
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, NftSlot::Ready(_))
    }
}

// --- Paginator ---

/// Every token id of `contract_address`, in the order the contract enumerates them.
///
/// Stops after the first page shorter than `limit`. A failed page query
/// propagates and discards the pages already collected.
pub async fn fetch_all_token_ids(
    gateway: &dyn QueryGateway,
    contract_address: &str,
    limit: u32,
) -> Result<Vec<String>, Error> {
    paginate(gateway, contract_address, TokenScope::All, limit).await
}

/// Token ids held by `owner`, walked the same way as [`fetch_all_token_ids`].
pub async fn fetch_owner_token_ids(
    gateway: &dyn QueryGateway,
    contract_address: &str,
    owner: &str,
    limit: u32,
) -> Result<Vec<String>, Error> {
    if owner.trim().is_empty() {
        return Err(Error::InvalidInput("owner address is empty".into()));
    }
    paginate(gateway, contract_address, TokenScope::Owner(owner), limit).await
}

async fn paginate(
    gateway: &dyn QueryGateway,
    contract_address: &str,
    scope: TokenScope<'_>,
    limit: u32,
) -> Result<Vec<String>, Error> {
    ensure_contract(contract_address)?;
    if limit == 0 {
        return Err(Error::InvalidInput("page limit must be positive".into()));
    }

    let mut tokens = Vec::new();
    let mut cursor: Option<String> = None;
    loop {
        let query = scope.page_query(cursor.as_deref(), limit);
        let page = parse_token_page(gateway.query_smart(contract_address, &query).await?)?;
        debug!(
            contract = contract_address,
            cursor = ?cursor,
            page_len = page.len(),
            "Fetched token page"
        );

        let full = page.len() == limit as usize;
        let last = page.last().cloned();
        tokens.extend(page);

        match last {
            Some(last) if full => {
                if cursor.as_deref() == Some(last.as_str()) {
                    return Err(Error::Parse(format!(
                        "{contract_address}: cursor did not advance past {last}"
                    )));
                }
                cursor = Some(last);
            }
            _ => break,
        }
    }
    Ok(tokens)
}

// --- Enricher ---

/// `all_nft_info` for every id, dispatched concurrently, returned in input order.
///
/// All-or-nothing: the first failed query fails the whole call. See
/// [`fetch_nft_infos_settled`] for per-token isolation.
pub async fn fetch_nft_infos(
    gateway: &dyn QueryGateway,
    contract_address: &str,
    token_ids: &[String],
) -> Result<Vec<NftRecord>, Error> {
    fetch_infos(gateway, contract_address, token_ids, InfoQuery::AllNftInfo).await
}

/// Like [`fetch_nft_infos`], but a failed token becomes [`NftSlot::Unavailable`]
/// instead of failing its siblings.
pub async fn fetch_nft_infos_settled(
    gateway: &dyn QueryGateway,
    contract_address: &str,
    token_ids: &[String],
) -> Result<Vec<NftSlot>, Error> {
    if token_ids.is_empty() {
        return Ok(Vec::new());
    }
    ensure_contract(contract_address)?;
    let distinct = distinct_ids(token_ids);
    let outcomes = join_all(
        distinct
            .iter()
            .map(|id| query_info(gateway, contract_address, InfoQuery::AllNftInfo, id)),
    )
    .await;

    let slots: Vec<NftSlot> = distinct
        .iter()
        .zip(outcomes)
        .map(|(id, outcome)| match outcome {
            Ok(record) => NftSlot::Ready(record),
            Err(e) => {
                METRICS.tokens_unavailable.fetch_add(1, Ordering::Relaxed);
                warn!(contract = contract_address, token_id = %id, error = %e, "Token info unavailable");
                NftSlot::Unavailable {
                    token_id: id.to_string(),
                    reason: e.to_string(),
                }
            }
        })
        .collect();

    Ok(spread(token_ids, &distinct, slots))
}

/// Tokens held by `owner`, each enriched with `nft_info`. All-or-nothing.
pub async fn fetch_owned_nfts(
    gateway: &dyn QueryGateway,
    contract_address: &str,
    owner: &str,
    limit: u32,
) -> Result<Vec<NftRecord>, Error> {
    let token_ids = fetch_owner_token_ids(gateway, contract_address, owner, limit).await?;
    let mut records = fetch_infos(gateway, contract_address, &token_ids, InfoQuery::NftInfo).await?;
    for record in &mut records {
        record.owner = Some(owner.to_string());
    }
    Ok(records)
}

/// Whole-contract listing: paginate, then settled enrichment.
pub async fn fetch_catalog(
    gateway: &dyn QueryGateway,
    contract_address: &str,
    limit: u32,
) -> Result<Vec<NftSlot>, Error> {
    let token_ids = fetch_all_token_ids(gateway, contract_address, limit).await?;
    fetch_nft_infos_settled(gateway, contract_address, &token_ids).await
}

async fn fetch_infos(
    gateway: &dyn QueryGateway,
    contract_address: &str,
    token_ids: &[String],
    kind: InfoQuery,
) -> Result<Vec<NftRecord>, Error> {
    if token_ids.is_empty() {
        return Ok(Vec::new());
    }
    ensure_contract(contract_address)?;

    let distinct = distinct_ids(token_ids);
    let records = try_join_all(
        distinct
            .iter()
            .map(|id| query_info(gateway, contract_address, kind, id)),
    )
    .await?;

    Ok(spread(token_ids, &distinct, records))
}

async fn query_info(
    gateway: &dyn QueryGateway,
    contract_address: &str,
    kind: InfoQuery,
    token_id: &str,
) -> Result<NftRecord, Error> {
    let response = gateway
        .query_smart(contract_address, &kind.message(token_id))
        .await?;
    Ok(kind.parse(token_id, response)?)
}

/// Ids in first-seen order, each once.
fn distinct_ids(token_ids: &[String]) -> Vec<&str> {
    let mut seen = std::collections::HashSet::with_capacity(token_ids.len());
    token_ids
        .iter()
        .map(String::as_str)
        .filter(|id| seen.insert(*id))
        .collect()
}

/// Map per-distinct-id results back onto every input position.
fn spread<T: Clone>(token_ids: &[String], distinct: &[&str], results: Vec<T>) -> Vec<T> {
    if distinct.len() == token_ids.len() {
        return results;
    }
    let by_id: HashMap<&str, T> = distinct.iter().copied().zip(results).collect();
    token_ids
        .iter()
        .filter_map(|id| by_id.get(id.as_str()).cloned())
        .collect()
}

// --- Aggregator ---

/// Enrich every descriptor with its live collection info.
///
/// Output matches the input in length and order. A descriptor whose query
/// fails is returned bare; the input slice is never modified.
pub async fn load_collections(
    gateway: &dyn QueryGateway,
    descriptors: &[CollectionDescriptor],
    ipfs_gateway: &str,
) -> Vec<EnrichedCollection> {
    join_all(
        descriptors
            .iter()
            .map(|descriptor| enrich_collection(gateway, descriptor, ipfs_gateway)),
    )
    .await
}

async fn enrich_collection(
    gateway: &dyn QueryGateway,
    descriptor: &CollectionDescriptor,
    ipfs_gateway: &str,
) -> EnrichedCollection {
    let contract = descriptor.contract_address.as_str();
    let info = async {
        let response = gateway
            .query_smart(contract, &message::collection_info())
            .await?;
        Ok::<_, Error>(CollectionInfo::parse(contract, response)?)
    }
    .await;

    match info {
        Ok(info) => EnrichedCollection::enriched(descriptor, info, ipfs_gateway),
        Err(e) => {
            METRICS.collection_fallbacks.fetch_add(1, Ordering::Relaxed);
            warn!(collection = %descriptor.id, contract, error = %e, "Collection info unavailable, using bare descriptor");
            EnrichedCollection::bare(descriptor)
        }
    }
}

fn ensure_contract(contract_address: &str) -> Result<(), Error> {
    if contract_address.trim().is_empty() {
        return Err(Error::InvalidInput("contract address is empty".into()));
    }
    Ok(())
}
