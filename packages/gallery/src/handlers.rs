//! HTTP request handlers.

use crate::metrics::METRICS;
use crate::pipeline;
use crate::response::{
    CatalogNftView, CatalogResponse, CheckoutRequest, HealthResponse, MapEntry, OwnedNftView,
    OwnedNftsResponse, UserValueResponse, UsersResponse,
};
use crate::state::AppState;
use crate::user_data;
use crate::Error;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use nft_gallery_types::{CheckoutOrder, EnrichedCollection};
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::{info, warn};

fn count_request(state: &AppState) {
    state.request_count.fetch_add(1, Ordering::Relaxed);
    METRICS.requests.fetch_add(1, Ordering::Relaxed);
}

/// Health check with gateway status.
pub async fn health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let (status, active_lcd, failovers) = match &state.lcd {
        Some(lcd) => (
            lcd.health_check().await.unwrap_or("unavailable"),
            Some(lcd.active_url().to_string()),
            lcd.failover_count(),
        ),
        None => ("ok", None, 0),
    };

    Json(HealthResponse {
        status,
        contract_address: state.config.contract_address.clone(),
        uptime_secs: state.start_time.elapsed().as_secs(),
        requests: state.request_count.load(Ordering::Relaxed),
        active_lcd,
        failovers,
    })
}

/// Prometheus metrics in text exposition format.
pub async fn metrics() -> impl IntoResponse {
    (
        [(
            axum::http::header::CONTENT_TYPE,
            "text/plain; version=0.0.4",
        )],
        METRICS.render(),
    )
}

/// Static collections enriched with live collection info.
pub async fn collections(State(state): State<Arc<AppState>>) -> Json<Vec<EnrichedCollection>> {
    count_request(&state);
    let collections = pipeline::load_collections(
        state.gateway.as_ref(),
        &state.descriptors,
        &state.config.ipfs_gateway,
    )
    .await;
    Json(collections)
}

/// Refresh the contract catalog and return this refresh's result.
pub async fn nfts(State(state): State<Arc<AppState>>) -> Result<Json<CatalogResponse>, Error> {
    count_request(&state);
    let (ticket, slots) = state.refresh_catalog().await?;
    Ok(Json(CatalogResponse::new(
        ticket.get(),
        slots,
        &state.config.ipfs_gateway,
    )))
}

/// Last committed catalog, without touching the chain.
pub async fn nfts_cached(
    State(state): State<Arc<AppState>>,
) -> Result<Json<CatalogResponse>, Error> {
    count_request(&state);
    let (ticket, slots) = state
        .catalog
        .snapshot()
        .ok_or_else(|| Error::NotFound("catalog has not been loaded yet".into()))?;
    Ok(Json(CatalogResponse::new(
        ticket.get(),
        (*slots).clone(),
        &state.config.ipfs_gateway,
    )))
}

/// Tokens held by `owner`.
pub async fn owner_nfts(
    State(state): State<Arc<AppState>>,
    Path(owner): Path<String>,
) -> Result<Json<OwnedNftsResponse>, Error> {
    count_request(&state);
    let records = pipeline::fetch_owned_nfts(
        state.gateway.as_ref(),
        &state.config.contract_address,
        &owner,
        state.config.page_limit,
    )
    .await?;
    info!(owner = %owner, count = records.len(), "Loaded owned NFTs");

    let nfts = records
        .into_iter()
        .map(|record| OwnedNftView::new(record, &state.config.ipfs_gateway))
        .collect();
    Ok(Json(OwnedNftsResponse { owner, nfts }))
}

/// Build a hosted-checkout order for the selected items.
pub async fn checkout(
    State(state): State<Arc<AppState>>,
    Json(request): Json<CheckoutRequest>,
) -> Result<Json<CheckoutOrder>, Error> {
    count_request(&state);
    let cart = request.cart();
    let mut order = CheckoutOrder::new(
        &state.config.crossmint_collection_id,
        cart.items(),
        &request.recipient,
    )?;
    if let Some(email) = request.receipt_email.filter(|e| !e.is_empty()) {
        order = order.with_receipt_email(email);
    }
    info!(items = order.line_items.len(), recipient = %request.recipient, "Checkout order built");
    Ok(Json(order))
}

/// NFTs offered by the hosted-checkout collection.
pub async fn catalog(State(state): State<Arc<AppState>>) -> Result<Response, Error> {
    count_request(&state);
    let Some(client) = &state.checkout else {
        warn!("Checkout catalog requested but no API key is configured");
        let body = serde_json::json!({
            "success": false,
            "error": "checkout API key is not configured"
        });
        return Ok((StatusCode::SERVICE_UNAVAILABLE, Json(body)).into_response());
    };

    let nfts: Vec<CatalogNftView> = client
        .list_collection_nfts()
        .await?
        .into_iter()
        .enumerate()
        .map(|(index, nft)| CatalogNftView {
            title: nft.title(index),
            locator: nft.locator(client.collection_id()),
            image_url: nft.image_url(&state.config.ipfs_gateway),
            nft,
        })
        .collect();
    Ok(Json(nfts).into_response())
}

/// Addresses with a stored document.
pub async fn users(State(state): State<Arc<AppState>>) -> Result<Json<UsersResponse>, Error> {
    count_request(&state);
    let contract = state.user_data_contract()?;
    let users = user_data::get_users(state.gateway.as_ref(), contract).await?;
    Ok(Json(UsersResponse { users }))
}

/// Document stored by one address.
pub async fn user_value(
    State(state): State<Arc<AppState>>,
    Path(address): Path<String>,
) -> Result<Json<UserValueResponse>, Error> {
    count_request(&state);
    let contract = state.user_data_contract()?;
    let raw = user_data::get_value_by_user(state.gateway.as_ref(), contract, &address).await?;
    Ok(Json(UserValueResponse {
        valid_json: user_data::validate_json(&raw).is_ok(),
        value: user_data::format_json(&raw),
        address,
    }))
}

/// Every stored document.
pub async fn map(State(state): State<Arc<AppState>>) -> Result<Json<Vec<MapEntry>>, Error> {
    count_request(&state);
    let contract = state.user_data_contract()?;
    let entries = user_data::get_map(state.gateway.as_ref(), contract)
        .await?
        .into_iter()
        .map(|(address, value)| MapEntry {
            address,
            valid_json: user_data::validate_json(&value).is_ok(),
            value: user_data::format_json(&value),
        })
        .collect();
    Ok(Json(entries))
}
