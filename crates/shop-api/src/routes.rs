//! # Routes
//!
//! Axum router configuration for the storefront API.

use crate::handlers;
use crate::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

/// Create the main application router
///
/// Routes:
/// - POST /api/checkout - Create a checkout session from cart line items
/// - GET  /api/checkout/sessions/{session_id} - Session summary (success page)
/// - GET  /api/products - List the catalog snapshot
/// - GET  /api/products/{product_id} - Get product by ID
/// - GET  /health - Health check
pub fn create_router(state: AppState) -> Router {
    // The storefront is served from its own origin
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_routes = Router::new()
        // Checkout
        .route("/checkout", post(handlers::create_checkout))
        .route(
            "/checkout/sessions/{session_id}",
            get(handlers::get_checkout_session),
        )
        // Products
        .route("/products", get(handlers::list_products))
        .route("/products/{product_id}", get(handlers::get_product));

    Router::new()
        // Health check at root
        .route("/health", get(handlers::health))
        .route("/", get(handlers::health))
        // API
        .nest("/api", api_routes)
        // Middleware
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        // State
        .with_state(state)
}
