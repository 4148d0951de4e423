//! # Payment Provider Seam
//!
//! Trait for the payment provider boundary: catalog listing and hosted
//! checkout sessions. The storefront delegates inventory, pricing, and
//! order management wholesale to the implementation behind this trait.

use crate::cart::CheckoutLineItem;
use crate::error::ShopResult;
use crate::product::Product;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// A hosted checkout session created by the payment provider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutSession {
    /// Provider session identifier
    pub session_id: String,

    /// URL to redirect the shopper to for payment
    pub checkout_url: String,

    /// Created timestamp
    pub created_at: DateTime<Utc>,
}

impl CheckoutSession {
    /// Create a session record stamped now
    pub fn new(session_id: impl Into<String>, checkout_url: impl Into<String>) -> Self {
        Self {
            session_id: session_id.into(),
            checkout_url: checkout_url.into(),
            created_at: Utc::now(),
        }
    }
}

/// One purchased line of a completed session (success-page view)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PurchasedItem {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    pub quantity: u32,
}

/// Post-payment summary of a checkout session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSummary {
    /// Provider session identifier
    pub session_id: String,

    /// Customer display name, when the provider collected one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_name: Option<String>,

    /// Total charged, in minor currency units
    pub amount_total: i64,

    /// The purchased items
    pub items: Vec<PurchasedItem>,
}

/// Core trait for the payment provider boundary
///
/// One implementation per provider; the API layer and tests program
/// against this seam.
#[async_trait]
pub trait PaymentProvider: Send + Sync {
    /// Fetch the full product list with default prices expanded
    async fn list_products(&self) -> ShopResult<Vec<Product>>;

    /// Fetch a single product with its default price expanded
    async fn retrieve_product(&self, product_id: &str) -> ShopResult<Product>;

    /// Create a hosted checkout session for the given line items
    ///
    /// # Arguments
    /// * `line_items` - (price identifier, quantity) pairs, possibly empty
    /// * `success_url` - where the provider redirects after payment
    /// * `cancel_url` - where the provider redirects on cancel
    async fn create_checkout_session(
        &self,
        line_items: &[CheckoutLineItem],
        success_url: &str,
        cancel_url: &str,
    ) -> ShopResult<CheckoutSession>;

    /// Retrieve the summary of a (completed) checkout session
    async fn retrieve_session(&self, session_id: &str) -> ShopResult<SessionSummary>;

    /// Provider name (for logging)
    fn provider_name(&self) -> &'static str;
}

/// Type alias for a shared provider (dynamic dispatch)
pub type BoxedPaymentProvider = Arc<dyn PaymentProvider>;

/// URLs handed to the provider when creating a session
#[derive(Debug, Clone)]
pub struct CheckoutUrls {
    /// Base URL of the storefront (e.g., "https://shop.enginevector.io")
    pub base_url: String,
    /// Success page path
    pub success_path: String,
    /// Cancel path (back to the storefront)
    pub cancel_path: String,
}

impl CheckoutUrls {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            success_path: "/success".to_string(),
            cancel_path: "/".to_string(),
        }
    }

    pub fn success_url(&self) -> String {
        format!("{}{}", self.base_url, self.success_path)
    }

    pub fn cancel_url(&self) -> String {
        format!("{}{}", self.base_url, self.cancel_path)
    }

    /// Success URL with the provider's session-id placeholder appended
    pub fn success_url_with_session(&self) -> String {
        let success = self.success_url();
        if success.contains('?') {
            format!("{}&session_id={{CHECKOUT_SESSION_ID}}", success)
        } else {
            format!("{}?session_id={{CHECKOUT_SESSION_ID}}", success)
        }
    }
}

impl Default for CheckoutUrls {
    fn default() -> Self {
        Self::new("http://localhost:3000")
    }
}
