//! # Stripe Checkout Sessions
//!
//! Checkout-session creation and retrieval against `/v1/checkout/sessions`.
//! Sessions are created in `payment` mode from (price, quantity) pairs;
//! Stripe hosts the payment page and redirects back to the storefront.

use crate::catalog::StripeList;
use crate::provider::{stripe_api_error, StripeProvider};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use shop_core::{
    CheckoutLineItem, CheckoutSession, PurchasedItem, SessionSummary, ShopError, ShopResult,
};
use tracing::{debug, info, warn};
use uuid::Uuid;

impl StripeProvider {
    /// Create a hosted checkout session in `payment` mode
    ///
    /// Line items are forwarded as-is; Stripe validates the price ids
    /// and quantities and its rejection surfaces as a provider error.
    pub(crate) async fn create_session(
        &self,
        line_items: &[CheckoutLineItem],
        success_url: &str,
        cancel_url: &str,
    ) -> ShopResult<CheckoutSession> {
        debug!("Creating Stripe checkout session: {} items", line_items.len());

        let form_params = session_form_params(line_items, success_url, cancel_url);

        // Add idempotency key
        let idempotency_key = Uuid::new_v4().to_string();

        let url = format!("{}/v1/checkout/sessions", self.config.api_base_url);

        let response = self
            .client
            .post(&url)
            .header("Authorization", self.config.auth_header())
            .header("Stripe-Version", &self.config.api_version)
            .header("Idempotency-Key", &idempotency_key)
            .form(&form_params)
            .send()
            .await
            .map_err(|e| ShopError::Network(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ShopError::Network(e.to_string()))?;

        if !status.is_success() {
            return Err(stripe_api_error(status, &body));
        }

        let session_response: StripeSessionResponse = serde_json::from_str(&body).map_err(|e| {
            ShopError::MalformedResponse(format!("Failed to parse session response: {}", e))
        })?;

        let Some(checkout_url) = session_response.url else {
            return Err(ShopError::MalformedResponse(
                "Session response has no redirect url".to_string(),
            ));
        };

        info!(
            "Created Stripe checkout session: id={}, url={}",
            session_response.id, checkout_url
        );

        let created_at = session_response
            .created
            .and_then(|ts| DateTime::from_timestamp(ts, 0))
            .unwrap_or_else(Utc::now);

        Ok(CheckoutSession {
            session_id: session_response.id,
            checkout_url,
            created_at,
        })
    }

    /// Retrieve a session with its line items and products expanded
    pub(crate) async fn fetch_session(&self, session_id: &str) -> ShopResult<SessionSummary> {
        let url = format!(
            "{}/v1/checkout/sessions/{}",
            self.config.api_base_url, session_id
        );

        let response = self
            .client
            .get(&url)
            .header("Authorization", self.config.auth_header())
            .header("Stripe-Version", &self.config.api_version)
            .query(&[
                ("expand[]", "line_items"),
                ("expand[]", "line_items.data.price.product"),
            ])
            .send()
            .await
            .map_err(|e| ShopError::Network(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ShopError::Network(e.to_string()))?;

        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(ShopError::SessionNotFound {
                session_id: session_id.to_string(),
            });
        }

        if !status.is_success() {
            return Err(stripe_api_error(status, &body));
        }

        let raw: StripeSessionDetail = serde_json::from_str(&body)
            .map_err(|e| ShopError::MalformedResponse(format!("Failed to parse session: {}", e)))?;

        Ok(map_session(raw))
    }
}

/// Build the form-encoded body for session creation
///
/// Stripe's form encoding indexes nested fields:
/// `line_items[0][price]`, `line_items[0][quantity]`, ...
fn session_form_params(
    line_items: &[CheckoutLineItem],
    success_url: &str,
    cancel_url: &str,
) -> Vec<(String, String)> {
    let mut form_params: Vec<(String, String)> = vec![
        ("mode".to_string(), "payment".to_string()),
        ("success_url".to_string(), success_url.to_string()),
        ("cancel_url".to_string(), cancel_url.to_string()),
    ];

    for (i, item) in line_items.iter().enumerate() {
        form_params.push((format!("line_items[{}][price]", i), item.price.clone()));
        form_params.push((
            format!("line_items[{}][quantity]", i),
            item.quantity.to_string(),
        ));
    }

    form_params
}

fn map_session(raw: StripeSessionDetail) -> SessionSummary {
    let items = raw
        .line_items
        .map(|list| {
            list.data
                .into_iter()
                .filter_map(map_purchased_item)
                .collect()
        })
        .unwrap_or_default();

    SessionSummary {
        session_id: raw.id,
        customer_name: raw.customer_details.and_then(|details| details.name),
        amount_total: raw.amount_total.unwrap_or(0),
        items,
    }
}

fn map_purchased_item(raw: StripeSessionLineItem) -> Option<PurchasedItem> {
    let product = match raw.price.and_then(|price| price.product) {
        Some(StripeProductField::Expanded(product)) => product,
        Some(StripeProductField::Id(product_id)) => {
            warn!(product_id = %product_id, "line item product not expanded, skipping");
            return None;
        }
        None => {
            warn!("line item has no product, skipping");
            return None;
        }
    };

    Some(PurchasedItem {
        name: product.name,
        image: product.images.into_iter().next(),
        quantity: raw.quantity.unwrap_or(1),
    })
}

// =============================================================================
// Stripe API Types
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct StripeSessionResponse {
    pub id: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub created: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct StripeSessionDetail {
    pub id: String,
    #[serde(default)]
    pub amount_total: Option<i64>,
    #[serde(default)]
    pub customer_details: Option<StripeCustomerDetails>,
    #[serde(default)]
    pub line_items: Option<StripeList<StripeSessionLineItem>>,
}

#[derive(Debug, Deserialize)]
pub struct StripeCustomerDetails {
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct StripeSessionLineItem {
    #[serde(default)]
    pub quantity: Option<u32>,
    #[serde(default)]
    pub price: Option<StripeSessionPrice>,
}

#[derive(Debug, Deserialize)]
pub struct StripeSessionPrice {
    #[serde(default)]
    pub product: Option<StripeProductField>,
}

/// `product` is an id string unless the request expanded it
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum StripeProductField {
    Expanded(StripeSessionProduct),
    Id(String),
}

#[derive(Debug, Deserialize)]
pub struct StripeSessionProduct {
    pub name: String,
    #[serde(default)]
    pub images: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StripeConfig;
    use shop_core::{Currency, PaymentProvider};
    use wiremock::matchers::{body_string_contains, header, header_exists, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn provider_for(server_uri: &str) -> StripeProvider {
        let config = StripeConfig::new("sk_test_abc123").with_api_base_url(server_uri);
        StripeProvider::new(config, Currency::BRL)
    }

    fn line_items() -> Vec<CheckoutLineItem> {
        vec![
            CheckoutLineItem {
                price: "price_tee".to_string(),
                quantity: 2,
            },
            CheckoutLineItem {
                price: "price_mug".to_string(),
                quantity: 1,
            },
        ]
    }

    #[test]
    fn test_session_form_params_layout() {
        let params = session_form_params(&line_items(), "https://shop.test/success", "https://shop.test/");

        assert_eq!(params[0], ("mode".to_string(), "payment".to_string()));
        assert!(params.contains(&("line_items[0][price]".to_string(), "price_tee".to_string())));
        assert!(params.contains(&("line_items[0][quantity]".to_string(), "2".to_string())));
        assert!(params.contains(&("line_items[1][price]".to_string(), "price_mug".to_string())));
        assert!(params.contains(&("line_items[1][quantity]".to_string(), "1".to_string())));
    }

    #[test]
    fn test_session_form_params_empty_cart_has_no_line_items() {
        let params = session_form_params(&[], "https://shop.test/success", "https://shop.test/");

        assert_eq!(params.len(), 3);
        assert!(params.iter().all(|(key, _)| !key.starts_with("line_items")));
    }

    #[tokio::test]
    async fn test_create_session_posts_form_encoded_line_items() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/checkout/sessions"))
            .and(header("Authorization", "Bearer sk_test_abc123"))
            .and(header_exists("Idempotency-Key"))
            .and(body_string_contains("mode=payment"))
            .and(body_string_contains("line_items%5B0%5D%5Bprice%5D=price_tee"))
            .and(body_string_contains("line_items%5B0%5D%5Bquantity%5D=2"))
            .and(body_string_contains("line_items%5B1%5D%5Bprice%5D=price_mug"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "cs_test_123",
                "object": "checkout.session",
                "url": "https://checkout.stripe.com/c/pay/cs_test_123",
                "created": 1700000000
            })))
            .mount(&server)
            .await;

        let provider = provider_for(&server.uri());
        let session = provider
            .create_checkout_session(
                &line_items(),
                "https://shop.test/success?session_id={CHECKOUT_SESSION_ID}",
                "https://shop.test/",
            )
            .await
            .unwrap();

        assert_eq!(session.session_id, "cs_test_123");
        assert_eq!(
            session.checkout_url,
            "https://checkout.stripe.com/c/pay/cs_test_123"
        );
    }

    #[tokio::test]
    async fn test_create_session_maps_provider_rejection() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/checkout/sessions"))
            .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
                "error": {"message": "No such price: 'price_tee'", "type": "invalid_request_error"}
            })))
            .mount(&server)
            .await;

        let provider = provider_for(&server.uri());
        let err = provider
            .create_checkout_session(&line_items(), "https://shop.test/success", "https://shop.test/")
            .await
            .unwrap_err();

        match err {
            ShopError::Provider { message } => assert!(message.contains("No such price")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_create_session_requires_redirect_url() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/checkout/sessions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "cs_test_embedded",
                "object": "checkout.session",
                "url": null
            })))
            .mount(&server)
            .await;

        let provider = provider_for(&server.uri());
        let err = provider
            .create_checkout_session(&line_items(), "https://shop.test/success", "https://shop.test/")
            .await
            .unwrap_err();

        assert!(matches!(err, ShopError::MalformedResponse(_)));
    }

    #[tokio::test]
    async fn test_retrieve_session_maps_summary() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v1/checkout/sessions/cs_test_123"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "cs_test_123",
                "object": "checkout.session",
                "amount_total": 16970,
                "customer_details": {"name": "Ada Lovelace", "email": "ada@example.com"},
                "line_items": {
                    "object": "list",
                    "data": [
                        {
                            "quantity": 2,
                            "price": {
                                "id": "price_tee",
                                "product": {
                                    "id": "prod_tee",
                                    "name": "Ignite Tee",
                                    "images": ["https://files.stripe.com/tee.png"]
                                }
                            }
                        },
                        {
                            "quantity": 1,
                            "price": {"id": "price_mug", "product": "prod_mug"}
                        }
                    ],
                    "has_more": false
                }
            })))
            .mount(&server)
            .await;

        let provider = provider_for(&server.uri());
        let summary = provider.retrieve_session("cs_test_123").await.unwrap();

        assert_eq!(summary.session_id, "cs_test_123");
        assert_eq!(summary.customer_name.as_deref(), Some("Ada Lovelace"));
        assert_eq!(summary.amount_total, 16970);

        // The unexpanded second item is skipped
        assert_eq!(summary.items.len(), 1);
        assert_eq!(summary.items[0].name, "Ignite Tee");
        assert_eq!(summary.items[0].quantity, 2);
    }

    #[tokio::test]
    async fn test_retrieve_session_not_found() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v1/checkout/sessions/cs_missing"))
            .respond_with(ResponseTemplate::new(404).set_body_json(serde_json::json!({
                "error": {"message": "No such checkout.session: 'cs_missing'", "type": "invalid_request_error"}
            })))
            .mount(&server)
            .await;

        let provider = provider_for(&server.uri());
        let err = provider.retrieve_session("cs_missing").await.unwrap_err();

        assert!(matches!(err, ShopError::SessionNotFound { session_id } if session_id == "cs_missing"));
    }
}
