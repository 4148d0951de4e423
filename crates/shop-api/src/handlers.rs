//! # Request Handlers
//!
//! Axum request handlers for the storefront API.
//! The checkout handler forwards the cart's line-item projection to the
//! payment provider and answers with the hosted checkout URL.

use crate::state::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use shop_core::{CheckoutLineItem, ShopError};
use tracing::{error, info, instrument};

// =============================================================================
// Request/Response Types
// =============================================================================

/// Checkout request: the cart's line-item projection
#[derive(Debug, Deserialize)]
pub struct CheckoutRequest {
    /// (price id, quantity) pairs, one per distinct cart entry
    pub line_items: Vec<CheckoutLineItem>,
}

/// Checkout response consumed by the storefront client
///
/// `checkoutUrl` is the wire name the client redirect reads.
#[derive(Debug, Serialize)]
pub struct CheckoutResponse {
    #[serde(rename = "checkoutUrl")]
    pub checkout_url: String,
}

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, code: u16) -> Self {
        Self {
            error: error.into(),
            code,
            details: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

fn shop_error_to_response(err: ShopError) -> (StatusCode, Json<ErrorResponse>) {
    let code = err.status_code();
    let response = ErrorResponse::new(err.to_string(), code).with_details(err.kind());
    (
        StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
        Json(response),
    )
}

// =============================================================================
// Handlers
// =============================================================================

/// Health check endpoint
pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "lightning-shop",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Create a checkout session from the submitted line items
///
/// Line items are forwarded to the provider untouched; an empty array
/// reaches the provider and its rejection comes back as a provider
/// error, the same path as any other upstream failure.
#[instrument(skip(state, request), fields(items = request.line_items.len()))]
pub async fn create_checkout(
    State(state): State<AppState>,
    Json(request): Json<CheckoutRequest>,
) -> Result<(StatusCode, Json<CheckoutResponse>), (StatusCode, Json<ErrorResponse>)> {
    info!("Creating checkout: {} line items", request.line_items.len());

    let session = state
        .provider
        .create_checkout_session(
            &request.line_items,
            &state.success_url(),
            &state.cancel_url(),
        )
        .await
        .map_err(|e| {
            error!("Failed to create checkout session: {}", e);
            shop_error_to_response(e)
        })?;

    info!("Created checkout session: {}", session.session_id);

    Ok((
        StatusCode::CREATED,
        Json(CheckoutResponse {
            checkout_url: session.checkout_url,
        }),
    ))
}

/// List the product catalog (revalidated snapshot)
pub async fn list_products(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, (StatusCode, Json<ErrorResponse>)> {
    let catalog = state
        .catalog
        .catalog(&state.provider)
        .await
        .map_err(|e| {
            error!("Failed to load catalog: {}", e);
            shop_error_to_response(e)
        })?;

    Ok(Json(serde_json::json!({
        "products": catalog.products,
        "count": catalog.len(),
        "fetched_at": catalog.fetched_at,
    })))
}

/// Get a single product
///
/// Served from the catalog snapshot when present; otherwise fetched
/// from the provider directly (new products appear before the next
/// revalidation this way).
pub async fn get_product(
    State(state): State<AppState>,
    Path(product_id): Path<String>,
) -> Result<impl IntoResponse, (StatusCode, Json<ErrorResponse>)> {
    let catalog = state
        .catalog
        .catalog(&state.provider)
        .await
        .map_err(shop_error_to_response)?;

    if let Some(product) = catalog.get(&product_id) {
        return Ok(Json(product.clone()));
    }

    let product = state
        .provider
        .retrieve_product(&product_id)
        .await
        .map_err(|e| {
            error!("Failed to retrieve product {}: {}", product_id, e);
            shop_error_to_response(e)
        })?;

    Ok(Json(product))
}

/// Success-page data: the summary of a completed checkout session
#[instrument(skip(state))]
pub async fn get_checkout_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<impl IntoResponse, (StatusCode, Json<ErrorResponse>)> {
    let summary = state
        .provider
        .retrieve_session(&session_id)
        .await
        .map_err(|e| {
            error!("Failed to retrieve session {}: {}", session_id, e);
            shop_error_to_response(e)
        })?;

    Ok(Json(summary))
}
