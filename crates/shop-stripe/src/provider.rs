//! # Stripe Provider
//!
//! The `PaymentProvider` implementation backed by the Stripe REST API.
//! Catalog reads live in [`crate::catalog`], checkout-session calls in
//! [`crate::checkout`]; this module owns the HTTP client and the trait
//! wiring.

use crate::config::StripeConfig;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use shop_core::{
    CheckoutLineItem, CheckoutSession, Currency, PaymentProvider, Product, SessionSummary,
    ShopError, ShopResult,
};
use tracing::{error, instrument};

/// Stripe-backed payment provider
///
/// Uses Stripe's hosted checkout page for secure payments and the
/// product/price catalog as the storefront inventory source.
pub struct StripeProvider {
    pub(crate) config: StripeConfig,
    pub(crate) client: Client,
    pub(crate) currency: Currency,
}

impl StripeProvider {
    /// Create a new Stripe provider displaying prices in `currency`
    pub fn new(config: StripeConfig, currency: Currency) -> Self {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            config,
            client,
            currency,
        }
    }

    /// Create from environment variables, with the default storefront currency
    pub fn from_env() -> ShopResult<Self> {
        let config = StripeConfig::from_env()?;
        Ok(Self::new(config, Currency::default()))
    }

    /// Builder: set the storefront currency
    pub fn with_currency(mut self, currency: Currency) -> Self {
        self.currency = currency;
        self
    }
}

#[async_trait]
impl PaymentProvider for StripeProvider {
    #[instrument(skip(self))]
    async fn list_products(&self) -> ShopResult<Vec<Product>> {
        self.fetch_all_products().await
    }

    #[instrument(skip(self))]
    async fn retrieve_product(&self, product_id: &str) -> ShopResult<Product> {
        self.fetch_product(product_id).await
    }

    #[instrument(skip(self, line_items), fields(items = line_items.len()))]
    async fn create_checkout_session(
        &self,
        line_items: &[CheckoutLineItem],
        success_url: &str,
        cancel_url: &str,
    ) -> ShopResult<CheckoutSession> {
        self.create_session(line_items, success_url, cancel_url)
            .await
    }

    #[instrument(skip(self))]
    async fn retrieve_session(&self, session_id: &str) -> ShopResult<SessionSummary> {
        self.fetch_session(session_id).await
    }

    fn provider_name(&self) -> &'static str {
        "stripe"
    }
}

// =============================================================================
// Stripe Error Parsing
// =============================================================================

#[derive(Debug, Deserialize)]
pub(crate) struct StripeErrorResponse {
    pub error: StripeErrorBody,
}

#[derive(Debug, Deserialize)]
pub(crate) struct StripeErrorBody {
    pub message: String,
}

/// Map a non-success Stripe response to a `ShopError`
pub(crate) fn stripe_api_error(status: StatusCode, body: &str) -> ShopError {
    error!("Stripe API error: status={}, body={}", status, body);

    // Parse Stripe's structured error when the body carries one
    if let Ok(error_response) = serde_json::from_str::<StripeErrorResponse>(body) {
        return ShopError::Provider {
            message: error_response.error.message,
        };
    }

    ShopError::Provider {
        message: format!("HTTP {}: {}", status, body),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_name() {
        let provider = StripeProvider::new(StripeConfig::new("sk_test_abc123"), Currency::BRL);
        assert_eq!(provider.provider_name(), "stripe");
    }

    #[test]
    fn test_stripe_api_error_structured() {
        let body = r#"{"error": {"message": "No such price: 'price_missing'", "type": "invalid_request_error"}}"#;
        let err = stripe_api_error(StatusCode::BAD_REQUEST, body);

        match err {
            ShopError::Provider { message } => assert!(message.contains("No such price")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_stripe_api_error_unstructured() {
        let err = stripe_api_error(StatusCode::BAD_GATEWAY, "upstream timeout");

        match err {
            ShopError::Provider { message } => assert!(message.contains("502")),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
