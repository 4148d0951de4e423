//! # Stripe Product Catalog
//!
//! Catalog reads against `/v1/products` with `expand[]=data.default_price`
//! so every product arrives with its default price inline. Products
//! without a usable default price are skipped with a warning rather than
//! failing the whole listing.

use crate::provider::{stripe_api_error, StripeProvider};
use serde::Deserialize;
use shop_core::{Currency, Product, ShopError, ShopResult};
use tracing::{debug, warn};

/// Stripe caps `limit` at 100 per page
const PRODUCTS_PAGE_LIMIT: u32 = 100;

impl StripeProvider {
    /// Fetch every product, following pagination
    pub(crate) async fn fetch_all_products(&self) -> ShopResult<Vec<Product>> {
        let mut products = Vec::new();
        let mut starting_after: Option<String> = None;

        loop {
            let page = self.fetch_products_page(starting_after.as_deref()).await?;

            // Cursor is the last raw product id, before any filtering
            let has_more = page.has_more;
            starting_after = page.data.last().map(|raw| raw.id.clone());

            products.extend(
                page.data
                    .into_iter()
                    .filter_map(|raw| map_product(raw, self.currency)),
            );

            if !has_more || starting_after.is_none() {
                break;
            }
        }

        debug!("Fetched {} products from Stripe", products.len());
        Ok(products)
    }

    async fn fetch_products_page(
        &self,
        starting_after: Option<&str>,
    ) -> ShopResult<StripeList<StripeProduct>> {
        let url = format!("{}/v1/products", self.config.api_base_url);

        let mut query: Vec<(String, String)> = vec![
            ("limit".to_string(), PRODUCTS_PAGE_LIMIT.to_string()),
            ("expand[]".to_string(), "data.default_price".to_string()),
        ];
        if let Some(after) = starting_after {
            query.push(("starting_after".to_string(), after.to_string()));
        }

        let response = self
            .client
            .get(&url)
            .header("Authorization", self.config.auth_header())
            .header("Stripe-Version", &self.config.api_version)
            .query(&query)
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

        serde_json::from_str(&body).map_err(|e| {
            ShopError::MalformedResponse(format!("Failed to parse product list: {}", e))
        })
    }

    /// Fetch one product with its default price expanded
    pub(crate) async fn fetch_product(&self, product_id: &str) -> ShopResult<Product> {
        let url = format!("{}/v1/products/{}", self.config.api_base_url, product_id);

        let response = self
            .client
            .get(&url)
            .header("Authorization", self.config.auth_header())
            .header("Stripe-Version", &self.config.api_version)
            .query(&[("expand[]", "default_price")])
            .send()
            .await
            .map_err(|e| ShopError::Network(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ShopError::Network(e.to_string()))?;

        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(ShopError::ProductNotFound {
                product_id: product_id.to_string(),
            });
        }

        if !status.is_success() {
            return Err(stripe_api_error(status, &body));
        }

        let raw: StripeProduct = serde_json::from_str(&body)
            .map_err(|e| ShopError::MalformedResponse(format!("Failed to parse product: {}", e)))?;

        map_product(raw, self.currency).ok_or_else(|| {
            ShopError::MalformedResponse(format!(
                "Product {} has no usable default price",
                product_id
            ))
        })
    }
}

// =============================================================================
// Stripe API Types
// =============================================================================

/// Generic Stripe list envelope
#[derive(Debug, Deserialize)]
pub struct StripeList<T> {
    pub data: Vec<T>,
    #[serde(default)]
    pub has_more: bool,
}

#[derive(Debug, Deserialize)]
pub struct StripeProduct {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub default_price: Option<StripePriceField>,
}

/// `default_price` is an id string unless the request expanded it
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum StripePriceField {
    Expanded(StripePrice),
    Id(String),
}

#[derive(Debug, Deserialize)]
pub struct StripePrice {
    pub id: String,
    #[serde(default)]
    pub unit_amount: Option<i64>,
    #[serde(default)]
    pub currency: Option<String>,
}

/// Map a raw Stripe product to the storefront shape
///
/// Returns `None` (after a warning) when the default price is missing,
/// unexpanded, or has no unit amount. Prices are displayed in the
/// storefront currency regardless of the price's own currency code.
fn map_product(raw: StripeProduct, currency: Currency) -> Option<Product> {
    let price = match raw.default_price {
        Some(StripePriceField::Expanded(price)) => price,
        Some(StripePriceField::Id(price_id)) => {
            warn!(
                product_id = %raw.id,
                price_id = %price_id,
                "default price not expanded, skipping product"
            );
            return None;
        }
        None => {
            warn!(product_id = %raw.id, "product has no default price, skipping");
            return None;
        }
    };

    let Some(unit_amount) = price.unit_amount else {
        warn!(
            product_id = %raw.id,
            price_id = %price.id,
            "default price has no unit amount, skipping product"
        );
        return None;
    };

    if let Some(code) = price.currency.as_deref() {
        if Currency::from_code(code) != Some(currency) {
            debug!(
                product_id = %raw.id,
                price_currency = %code,
                storefront_currency = %currency,
                "price currency differs from storefront currency"
            );
        }
    }

    let mut product = Product::new(raw.id, raw.name, unit_amount, price.id, currency);
    if let Some(image) = raw.images.into_iter().next() {
        product = product.with_image(image);
    }

    Some(product)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StripeConfig;
    use shop_core::PaymentProvider;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn provider_for(server_uri: &str) -> StripeProvider {
        let config = StripeConfig::new("sk_test_abc123").with_api_base_url(server_uri);
        StripeProvider::new(config, Currency::BRL)
    }

    fn product_json(id: &str, name: &str, amount: i64) -> serde_json::Value {
        serde_json::json!({
            "id": id,
            "object": "product",
            "name": name,
            "images": [format!("https://files.stripe.com/{}.png", id)],
            "default_price": {
                "id": format!("price_{}", id),
                "object": "price",
                "unit_amount": amount,
                "currency": "brl"
            }
        })
    }

    #[test]
    fn test_map_product_formats_display_price() {
        let raw: StripeProduct =
            serde_json::from_value(product_json("prod_tee", "Ignite Tee", 7990)).unwrap();
        let product = map_product(raw, Currency::BRL).unwrap();

        assert_eq!(product.id, "prod_tee");
        assert_eq!(product.price_id, "price_prod_tee");
        assert_eq!(product.display_price, "R$ 79,90");
        assert!(product.image.is_some());
    }

    #[test]
    fn test_map_product_skips_missing_price() {
        let raw: StripeProduct = serde_json::from_value(serde_json::json!({
            "id": "prod_draft",
            "name": "Draft"
        }))
        .unwrap();

        assert!(map_product(raw, Currency::BRL).is_none());
    }

    #[test]
    fn test_map_product_skips_unexpanded_price() {
        let raw: StripeProduct = serde_json::from_value(serde_json::json!({
            "id": "prod_flat",
            "name": "Flat",
            "default_price": "price_flat"
        }))
        .unwrap();

        assert!(map_product(raw, Currency::BRL).is_none());
    }

    #[tokio::test]
    async fn test_list_products_expands_default_price() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v1/products"))
            .and(query_param("limit", "100"))
            .and(query_param("expand[]", "data.default_price"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "object": "list",
                "data": [product_json("prod_tee", "Ignite Tee", 7990)],
                "has_more": false
            })))
            .mount(&server)
            .await;

        let provider = provider_for(&server.uri());
        let products = provider.list_products().await.unwrap();

        assert_eq!(products.len(), 1);
        assert_eq!(products[0].name, "Ignite Tee");
        assert_eq!(products[0].display_price, "R$ 79,90");
    }

    #[tokio::test]
    async fn test_list_products_follows_pagination() {
        let server = MockServer::start().await;

        // More specific mock first: wiremock picks the first match
        Mock::given(method("GET"))
            .and(path("/v1/products"))
            .and(query_param("starting_after", "prod_a"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "object": "list",
                "data": [product_json("prod_b", "Beanie", 4990)],
                "has_more": false
            })))
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/v1/products"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "object": "list",
                "data": [product_json("prod_a", "Tee", 7990)],
                "has_more": true
            })))
            .mount(&server)
            .await;

        let provider = provider_for(&server.uri());
        let products = provider.list_products().await.unwrap();

        assert_eq!(products.len(), 2);
        assert_eq!(products[0].id, "prod_a");
        assert_eq!(products[1].id, "prod_b");
    }

    #[tokio::test]
    async fn test_list_products_skips_priceless_entries() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v1/products"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "object": "list",
                "data": [
                    product_json("prod_tee", "Ignite Tee", 7990),
                    {"id": "prod_draft", "object": "product", "name": "Draft"}
                ],
                "has_more": false
            })))
            .mount(&server)
            .await;

        let provider = provider_for(&server.uri());
        let products = provider.list_products().await.unwrap();

        assert_eq!(products.len(), 1);
        assert_eq!(products[0].id, "prod_tee");
    }

    #[tokio::test]
    async fn test_list_products_maps_api_error() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v1/products"))
            .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({
                "error": {"message": "Invalid API Key provided", "type": "invalid_request_error"}
            })))
            .mount(&server)
            .await;

        let provider = provider_for(&server.uri());
        let err = provider.list_products().await.unwrap_err();

        match err {
            ShopError::Provider { message } => assert!(message.contains("Invalid API Key")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_retrieve_product() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v1/products/prod_tee"))
            .and(query_param("expand[]", "default_price"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(product_json("prod_tee", "Ignite Tee", 7990)),
            )
            .mount(&server)
            .await;

        let provider = provider_for(&server.uri());
        let product = provider.retrieve_product("prod_tee").await.unwrap();

        assert_eq!(product.name, "Ignite Tee");
        assert_eq!(product.unit_amount, 7990);
    }

    #[tokio::test]
    async fn test_retrieve_product_not_found() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v1/products/prod_missing"))
            .respond_with(ResponseTemplate::new(404).set_body_json(serde_json::json!({
                "error": {"message": "No such product: 'prod_missing'", "type": "invalid_request_error"}
            })))
            .mount(&server)
            .await;

        let provider = provider_for(&server.uri());
        let err = provider.retrieve_product("prod_missing").await.unwrap_err();

        assert!(matches!(err, ShopError::ProductNotFound { product_id } if product_id == "prod_missing"));
    }
}
