//! # Checkout API Client
//!
//! The client half of the `/api/checkout` contract: post the cart's
//! line-item projection, read back the hosted checkout URL.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use shop_core::{CheckoutLineItem, ShopError, ShopResult};
use tracing::debug;

/// Seam for the checkout endpoint; the flow and tests program against this
#[async_trait]
pub trait CheckoutApi: Send + Sync {
    /// POST the line items, returning the checkout redirect URL
    async fn create_checkout(&self, line_items: &[CheckoutLineItem]) -> ShopResult<String>;
}

/// Wire request for POST /api/checkout
#[derive(Debug, Serialize)]
struct CheckoutRequestBody<'a> {
    line_items: &'a [CheckoutLineItem],
}

/// Wire response; `checkoutUrl` is the contract field name
#[derive(Debug, Deserialize)]
struct CheckoutResponseBody {
    #[serde(rename = "checkoutUrl")]
    checkout_url: String,
}

/// HTTP implementation against the storefront API
pub struct HttpCheckoutApi {
    base_url: String,
    client: reqwest::Client,
}

impl HttpCheckoutApi {
    /// Create a client for the storefront at `base_url`
    pub fn new(base_url: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            base_url: base_url.into(),
            client,
        }
    }
}

#[async_trait]
impl CheckoutApi for HttpCheckoutApi {
    async fn create_checkout(&self, line_items: &[CheckoutLineItem]) -> ShopResult<String> {
        let url = format!("{}/api/checkout", self.base_url);
        debug!("Posting {} line items to {}", line_items.len(), url);

        let response = self
            .client
            .post(&url)
            .json(&CheckoutRequestBody { line_items })
            .send()
            .await
            .map_err(|e| ShopError::Network(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ShopError::Network(e.to_string()))?;

        if !status.is_success() {
            return Err(ShopError::Provider {
                message: format!("HTTP {}: {}", status, body),
            });
        }

        let parsed: CheckoutResponseBody = serde_json::from_str(&body).map_err(|e| {
            ShopError::MalformedResponse(format!("Failed to parse checkout response: {}", e))
        })?;

        Ok(parsed.checkout_url)
    }
}
