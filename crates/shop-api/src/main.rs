//! # Lightning-Shop RS
//!
//! Storefront engine backed by the payment provider's catalog.
//!
//! ## Usage
//!
//! ```bash
//! # Set environment variables
//! export STRIPE_SECRET_KEY=sk_test_...
//! export BASE_URL=https://shop.example.com
//!
//! # Run the server
//! lightning-shop
//! ```

use shop_api::{routes, state::AppState};
use tracing::{info, warn, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(
            EnvFilter::builder()
                .with_default_directive(Level::INFO.into())
                .from_env_lossy(),
        )
        .init();

    // Print banner
    print_banner();

    // Initialize application state
    let state = AppState::new()?;

    let addr = state.config.socket_addr();
    let is_prod = state.config.is_production();

    info!("Environment: {}", state.config.environment);
    info!("Currency: {}", state.config.currency);
    info!("Payment provider: {}", state.provider.provider_name());

    // Warm the catalog before accepting traffic; a failure here is
    // retried on the first request rather than aborting startup
    match state.catalog.revalidate(&state.provider).await {
        Ok(catalog) => info!("Products loaded: {}", catalog.len()),
        Err(e) => warn!("Catalog warm-up failed: {}", e),
    }

    // Create router
    let app = routes::create_router(state);

    // Start server
    info!("⚡ Lightning-Shop starting on http://{}", addr);

    if !is_prod {
        info!("🛒 Checkout: POST http://{}/api/checkout", addr);
        info!("👕 Products: GET http://{}/api/products", addr);
    }

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn print_banner() {
    println!(
        r#"
  ⚡ Lightning-Shop RS ⚡
  ━━━━━━━━━━━━━━━━━━━━━━━
  Storefront engine
  Version: {}

"#,
        env!("CARGO_PKG_VERSION")
    );
}
