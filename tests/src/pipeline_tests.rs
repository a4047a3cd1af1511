//! Pipeline behaviour against the in-memory chain.

use anyhow::Result;
use nft_gallery::pipeline::{
    fetch_all_token_ids, fetch_catalog, fetch_nft_infos, fetch_owned_nfts, load_collections,
    NftSlot,
};
use nft_gallery::{AppState, Config, Error};
use nft_gallery_types::CollectionDescriptor;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;

use crate::utils::{StubChain, StubContract, CONTRACT};

const IPFS: &str = "https://ipfs.io/ipfs/";

fn chain(tokens: usize) -> StubChain {
    StubChain::new().with_contract(CONTRACT, StubContract::with_tokens(tokens))
}

fn config() -> Config {
    Config {
        contract_address: CONTRACT.into(),
        crossmint_collection_id: "col-1".into(),
        page_limit: 3,
        ..Config::default()
    }
}

#[tokio::test]
async fn test_paginator_query_counts() -> Result<()> {
    for (total, expected_pages) in [(0, 1), (2, 1), (3, 2), (5, 2), (6, 3), (7, 3)] {
        let chain = chain(total);
        let ids = fetch_all_token_ids(&chain, CONTRACT, 3).await?;
        assert_eq!(ids.len(), total);
        assert_eq!(chain.count("all_tokens"), expected_pages, "total={total}");
    }
    Ok(())
}

#[tokio::test]
async fn test_paginator_cursor_follows_last_id() -> Result<()> {
    let chain = chain(5);
    let ids = fetch_all_token_ids(&chain, CONTRACT, 2).await?;
    assert_eq!(ids, vec!["t0", "t1", "t2", "t3", "t4"]);

    let messages: Vec<_> = chain.calls().into_iter().map(|(_, msg)| msg).collect();
    assert_eq!(
        messages,
        vec![
            json!({ "all_tokens": { "limit": 2 } }),
            json!({ "all_tokens": { "start_after": "t1", "limit": 2 } }),
            json!({ "all_tokens": { "start_after": "t3", "limit": 2 } }),
        ]
    );
    Ok(())
}

#[tokio::test]
async fn test_unknown_contract_fails() {
    let chain = chain(1);
    let err = fetch_all_token_ids(&chain, "xion1missing", 30).await.unwrap_err();
    assert!(matches!(err, Error::Query(_)));
}

#[tokio::test]
async fn test_info_queries_run_concurrently() -> Result<()> {
    // Each info query blocks until all four are in flight.
    let chain = chain(4).with_info_barrier(4);
    let ids: Vec<String> = (0..4).map(|i| format!("t{i}")).collect();
    let records = tokio::time::timeout(
        Duration::from_secs(5),
        fetch_nft_infos(&chain, CONTRACT, &ids),
    )
    .await??;
    assert_eq!(records.len(), 4);
    assert_eq!(records[3].metadata.name.as_deref(), Some("Token 3"));
    assert_eq!(records[2].owner.as_deref(), Some("xion1alice"));
    Ok(())
}

#[tokio::test]
async fn test_catalog_marks_only_failing_token() -> Result<()> {
    let mut contract = StubContract::with_tokens(4);
    contract.failing.insert("t2".into());
    let chain = StubChain::new().with_contract(CONTRACT, contract);

    let slots = fetch_catalog(&chain, CONTRACT, 30).await?;
    assert_eq!(slots.len(), 4);
    let unavailable: Vec<&str> = slots
        .iter()
        .filter(|s| !s.is_ready())
        .map(NftSlot::token_id)
        .collect();
    assert_eq!(unavailable, vec!["t2"]);
    Ok(())
}

#[tokio::test]
async fn test_strict_enricher_fails_on_one_bad_token() {
    let mut contract = StubContract::with_tokens(3);
    contract.failing.insert("t1".into());
    let chain = StubChain::new().with_contract(CONTRACT, contract);
    let ids: Vec<String> = vec!["t0".into(), "t1".into(), "t2".into()];
    assert!(fetch_nft_infos(&chain, CONTRACT, &ids).await.is_err());
}

#[tokio::test]
async fn test_owned_nfts_filter_by_owner() -> Result<()> {
    let chain = chain(5);
    let records = fetch_owned_nfts(&chain, CONTRACT, "xion1bob", 30).await?;
    let ids: Vec<&str> = records.iter().map(|r| r.token_id.as_str()).collect();
    assert_eq!(ids, vec!["t1", "t3"]);
    assert!(records.iter().all(|r| r.owner.as_deref() == Some("xion1bob")));
    assert_eq!(chain.count("nft_info"), 2);
    assert_eq!(chain.count("all_nft_info"), 0);
    Ok(())
}

#[tokio::test]
async fn test_collections_keep_order_and_fallback() {
    let enriched = StubContract {
        collection_info: Some(json!({
            "name": "Passes",
            "symbol": "PASS",
            "extension": { "image": "ipfs://QmPass", "description": "Ledger passes" }
        })),
        ..StubContract::default()
    };
    let chain = StubChain::new().with_contract("xion1passes", enriched);
    let descriptors = vec![
        CollectionDescriptor {
            id: "missing".into(),
            contract_address: "xion1gone".into(),
        },
        CollectionDescriptor {
            id: "passes".into(),
            contract_address: "xion1passes".into(),
        },
    ];

    let collections = load_collections(&chain, &descriptors, IPFS).await;
    assert_eq!(collections.len(), 2);
    assert_eq!(collections[0].id, "missing");
    assert!(!collections[0].is_enriched());
    assert_eq!(collections[1].symbol.as_deref(), Some("PASS"));
    assert_eq!(collections[1].image.as_deref(), Some("https://ipfs.io/ipfs/QmPass"));
}

#[tokio::test]
async fn test_overlapping_refresh_keeps_latest_request() -> Result<()> {
    let gate = Arc::new(Notify::new());
    let chain = chain(2).with_page_gate(gate.clone());
    let state = AppState::with_gateway(config(), Arc::new(chain), Vec::new())?;

    // The first refresh stalls on its first page while a second one completes.
    let (first, second) = tokio::join!(state.refresh_catalog(), async {
        let second = state.refresh_catalog().await;
        gate.notify_one();
        second
    });
    let (first_ticket, first_slots) = first?;
    let (second_ticket, _) = second?;

    assert!(first_ticket < second_ticket);
    assert_eq!(first_slots.len(), 2);
    let (held, slots) = state.catalog.snapshot().expect("catalog committed");
    assert_eq!(held, second_ticket);
    assert_eq!(slots.len(), 2);
    Ok(())
}
