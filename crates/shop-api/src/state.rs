//! # Application State
//!
//! Shared state for the Axum application.
//! Contains the payment provider, the catalog cache, and configuration.

use crate::catalog::CatalogCache;
use shop_core::{BoxedPaymentProvider, CheckoutUrls, Currency};
use shop_stripe::StripeProvider;
use std::sync::Arc;
use tracing::warn;

/// Application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Host to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,
    /// Base URL of the storefront, for checkout redirects
    pub base_url: String,
    /// Environment (development, staging, production)
    pub environment: String,
    /// Currency prices are displayed in
    pub currency: Currency,
}

impl AppConfig {
    /// Load from environment variables
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let currency = match std::env::var("SHOP_CURRENCY") {
            Ok(code) => Currency::from_code(&code).unwrap_or_else(|| {
                warn!("Unknown SHOP_CURRENCY {:?}, falling back to BRL", code);
                Currency::default()
            }),
            Err(_) => Currency::default(),
        };

        Self {
            host: std::env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: std::env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8080),
            base_url: std::env::var("BASE_URL")
                .unwrap_or_else(|_| "http://localhost:8080".to_string()),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),
            currency,
        }
    }

    /// Get the socket address to bind to
    pub fn socket_addr(&self) -> std::net::SocketAddr {
        format!("{}:{}", self.host, self.port)
            .parse()
            .expect("Invalid socket address")
    }

    /// Check if running in production
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::from_env()
    }
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Payment provider (catalog source and checkout backend)
    pub provider: BoxedPaymentProvider,
    /// Revalidated catalog snapshot
    pub catalog: CatalogCache,
    /// Checkout redirect URLs
    pub urls: CheckoutUrls,
    /// Application config
    pub config: AppConfig,
}

impl AppState {
    /// Create state backed by Stripe, configured from the environment
    pub fn new() -> anyhow::Result<Self> {
        let config = AppConfig::from_env();

        let provider = StripeProvider::from_env()
            .map_err(|e| anyhow::anyhow!("Failed to initialize Stripe: {}", e))?
            .with_currency(config.currency);

        Ok(Self::with_provider(config, Arc::new(provider)))
    }

    /// Create state with an injected provider (tests, alternate backends)
    pub fn with_provider(config: AppConfig, provider: BoxedPaymentProvider) -> Self {
        let urls = CheckoutUrls::new(&config.base_url);

        Self {
            provider,
            catalog: CatalogCache::new(),
            urls,
            config,
        }
    }

    /// Success URL with the provider's session-id placeholder
    pub fn success_url(&self) -> String {
        self.urls.success_url_with_session()
    }

    /// Cancel URL (back to the storefront)
    pub fn cancel_url(&self) -> String {
        self.urls.cancel_url()
    }
}
