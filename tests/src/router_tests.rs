//! HTTP surface tests through the full router.

use anyhow::Result;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use nft_gallery::{create_router, AppState, Config};
use nft_gallery_types::CollectionDescriptor;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

use crate::utils::{StubChain, StubContract, CONTRACT, USER_DATA};

fn config() -> Config {
    Config {
        contract_address: CONTRACT.into(),
        crossmint_collection_id: "col-1".into(),
        ..Config::default()
    }
}

fn app_with(config: Config, chain: StubChain) -> Result<Router> {
    let descriptors = vec![CollectionDescriptor {
        id: "gallery".into(),
        contract_address: CONTRACT.into(),
    }];
    let state = AppState::with_gateway(config, Arc::new(chain), descriptors)?;
    Ok(create_router(Arc::new(state)))
}

fn app() -> Result<Router> {
    let mut contract = StubContract::with_tokens(3);
    contract.failing.insert("t1".into());
    contract.collection_info = Some(json!({ "name": "Gallery", "symbol": "GAL" }));
    app_with(config(), StubChain::new().with_contract(CONTRACT, contract))
}

async fn get(app: &Router, uri: &str) -> Result<(StatusCode, Value)> {
    let response = app
        .clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty())?)
        .await?;
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await?;
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    Ok((status, body))
}

async fn post_json(app: &Router, uri: &str, body: Value) -> Result<(StatusCode, Value)> {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(&body)?))?;
    let response = app.clone().oneshot(request).await?;
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await?;
    Ok((status, serde_json::from_slice(&bytes)?))
}

#[tokio::test]
async fn test_health_without_lcd() -> Result<()> {
    let (status, body) = get(&app()?, "/health").await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["contract_address"], CONTRACT);
    assert!(body.get("active_lcd").is_none());
    Ok(())
}

#[tokio::test]
async fn test_metrics_exposition() -> Result<()> {
    let response = app()?
        .oneshot(Request::builder().uri("/metrics").body(Body::empty())?)
        .await?;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()["content-type"],
        "text/plain; version=0.0.4"
    );
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await?;
    assert!(String::from_utf8(bytes.to_vec())?.contains("gallery_queries_total"));
    Ok(())
}

#[tokio::test]
async fn test_nfts_then_cached() -> Result<()> {
    let app = app()?;

    let (status, body) = get(&app, "/nfts/cached").await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);

    let (status, body) = get(&app, "/nfts").await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 3);
    assert_eq!(body["unavailable"], 1);
    assert_eq!(body["nfts"][0]["status"], "ready");
    assert_eq!(body["nfts"][0]["image_url"], "https://ipfs.io/ipfs/QmImage0");
    assert_eq!(body["nfts"][1]["status"], "unavailable");
    assert_eq!(body["nfts"][1]["token_id"], "t1");

    let (status, cached) = get(&app, "/nfts/cached").await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(cached["ticket"], body["ticket"]);
    Ok(())
}

#[tokio::test]
async fn test_owner_listing_is_all_or_nothing() -> Result<()> {
    let app = app()?;

    // xion1alice holds t0 and t2, both healthy.
    let (status, body) = get(&app, "/owners/xion1alice/nfts").await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["nfts"].as_array().map(Vec::len), Some(2));
    assert_eq!(body["nfts"][1]["name"], "Token 2");

    // xion1bob holds only the failing t1.
    let (status, body) = get(&app, "/owners/xion1bob/nfts").await?;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["success"], false);
    Ok(())
}

#[tokio::test]
async fn test_collections_enriched() -> Result<()> {
    let (status, body) = get(&app()?, "/collections").await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body[0]["id"], "gallery");
    assert_eq!(body[0]["contractAddress"], CONTRACT);
    assert_eq!(body[0]["name"], "Gallery");
    Ok(())
}

#[tokio::test]
async fn test_checkout_order() -> Result<()> {
    let app = app()?;
    let (status, body) = post_json(
        &app,
        "/checkout",
        json!({ "recipient": "xion1alice", "item_ids": ["t0", "t2"] }),
    )
    .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["lineItems"][1]["collectionLocator"], "crossmint:col-1:t2");
    assert_eq!(body["recipient"]["walletAddress"], "xion1alice");

    let (status, _) = post_json(
        &app,
        "/checkout",
        json!({ "recipient": "xion1alice", "item_ids": [] }),
    )
    .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn test_checkout_collapses_repeated_items() -> Result<()> {
    let app = app()?;
    let (status, body) = post_json(
        &app,
        "/checkout",
        json!({ "recipient": "xion1alice", "item_ids": ["t2", "t0", "t2", " ", "t0"] }),
    )
    .await?;
    assert_eq!(status, StatusCode::OK);
    let locators: Vec<&str> = body["lineItems"]
        .as_array()
        .map(|items| {
            items
                .iter()
                .filter_map(|item| item["collectionLocator"].as_str())
                .collect()
        })
        .unwrap_or_default();
    assert_eq!(locators, vec!["crossmint:col-1:t2", "crossmint:col-1:t0"]);

    let (status, _) = post_json(
        &app,
        "/checkout",
        json!({ "recipient": "xion1alice", "item_ids": ["", "  "] }),
    )
    .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn test_catalog_requires_api_key() -> Result<()> {
    let (status, body) = get(&app()?, "/catalog").await?;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["success"], false);
    Ok(())
}

#[tokio::test]
async fn test_user_data_routes() -> Result<()> {
    let (status, _) = get(&app()?, "/users").await?;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let store = StubContract {
        user_data: vec![
            ("xion1alice".into(), r#"{"theme":"dark"}"#.into()),
            ("xion1bob".into(), "not json".into()),
        ],
        ..StubContract::default()
    };
    let config = Config {
        user_data_contract: Some(USER_DATA.into()),
        ..config()
    };
    let app = app_with(config, StubChain::new().with_contract(USER_DATA, store))?;

    let (status, body) = get(&app, "/users").await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["users"], json!(["xion1alice", "xion1bob"]));

    let (_, body) = get(&app, "/users/xion1alice/value").await?;
    assert_eq!(body["value"], "{\n  \"theme\": \"dark\"\n}");
    assert_eq!(body["valid_json"], true);

    let (_, body) = get(&app, "/map").await?;
    assert_eq!(body[0]["valid_json"], true);
    assert_eq!(body[1]["address"], "xion1bob");
    assert_eq!(body[1]["value"], "not json");
    assert_eq!(body[1]["valid_json"], false);
    Ok(())
}
