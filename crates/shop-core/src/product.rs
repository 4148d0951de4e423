//! # Product Types
//!
//! Catalog types for lightning-shop.
//! Products are sourced from the payment provider's catalog at
//! build/revalidation time and stay immutable until the next refresh.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// How long a catalog snapshot is served before it is refetched.
pub const CATALOG_REVALIDATE_SECS: i64 = 7200;

/// Supported storefront currencies (ISO 4217)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Currency {
    BRL,
    USD,
    EUR,
    GBP,
}

impl Currency {
    /// Returns the lowercase ISO 4217 currency code
    pub fn as_str(&self) -> &'static str {
        match self {
            Currency::BRL => "brl",
            Currency::USD => "usd",
            Currency::EUR => "eur",
            Currency::GBP => "gbp",
        }
    }

    /// Parse a currency code as the provider reports it (case-insensitive)
    pub fn from_code(code: &str) -> Option<Self> {
        match code.to_ascii_lowercase().as_str() {
            "brl" => Some(Currency::BRL),
            "usd" => Some(Currency::USD),
            "eur" => Some(Currency::EUR),
            "gbp" => Some(Currency::GBP),
            _ => None,
        }
    }

    /// Currency symbol used as a display prefix
    pub fn symbol(&self) -> &'static str {
        match self {
            Currency::BRL => "R$ ",
            Currency::USD => "$",
            Currency::EUR => "€",
            Currency::GBP => "£",
        }
    }

    fn group_separator(&self) -> char {
        match self {
            Currency::BRL => '.',
            _ => ',',
        }
    }

    fn decimal_separator(&self) -> char {
        match self {
            Currency::BRL => ',',
            _ => '.',
        }
    }

    /// Format an amount in minor units for the storefront locale
    /// (e.g., BRL 7990 -> "R$ 79,90", USD 7990 -> "$79.90")
    pub fn format(&self, amount_minor: i64) -> String {
        let sign = if amount_minor < 0 { "-" } else { "" };
        let abs = amount_minor.unsigned_abs();
        let major = group_digits(abs / 100, self.group_separator());
        format!(
            "{}{}{}{}{:02}",
            sign,
            self.symbol(),
            major,
            self.decimal_separator(),
            abs % 100
        )
    }
}

impl Default for Currency {
    fn default() -> Self {
        Currency::BRL
    }
}

impl std::fmt::Display for Currency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str().to_uppercase())
    }
}

/// Insert a thousands separator every three digits
fn group_digits(value: u64, separator: char) -> String {
    let digits = value.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i != 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(separator);
        }
        grouped.push(ch);
    }
    grouped
}

/// A product in the storefront catalog
///
/// Built from the provider's product listing with the default price
/// expanded; `display_price` is preformatted for the storefront currency.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    /// Provider product identifier (e.g., "prod_...")
    pub id: String,

    /// Display name
    pub name: String,

    /// First catalog image, if the product has one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,

    /// Unit price in minor currency units (centavos for BRL)
    pub unit_amount: i64,

    /// Provider-assigned price identifier (e.g., "price_...")
    pub price_id: String,

    /// Storefront currency the price is displayed in
    pub currency: Currency,

    /// Preformatted display price (e.g., "R$ 79,90")
    pub display_price: String,
}

impl Product {
    /// Create a product, formatting its display price for the currency
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        unit_amount: i64,
        price_id: impl Into<String>,
        currency: Currency,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            image: None,
            unit_amount,
            price_id: price_id.into(),
            currency,
            display_price: currency.format(unit_amount),
        }
    }

    /// Builder: set the image URL
    pub fn with_image(mut self, url: impl Into<String>) -> Self {
        self.image = Some(url.into());
        self
    }
}

/// An immutable catalog snapshot
///
/// Fetched from the provider in one pass; consumers hold it unchanged
/// until `is_stale` reports the revalidation interval has elapsed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Catalog {
    pub products: Vec<Product>,
    /// When this snapshot was fetched
    pub fetched_at: DateTime<Utc>,
}

impl Catalog {
    /// Create a snapshot fetched now
    pub fn new(products: Vec<Product>) -> Self {
        Self {
            products,
            fetched_at: Utc::now(),
        }
    }

    /// Find a product by provider id
    pub fn get(&self, product_id: &str) -> Option<&Product> {
        self.products.iter().find(|p| p.id == product_id)
    }

    /// Number of products in the snapshot
    pub fn len(&self) -> usize {
        self.products.len()
    }

    /// Check if the snapshot holds no products
    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    /// Age of the snapshot
    pub fn age(&self) -> Duration {
        Utc::now() - self.fetched_at
    }

    /// Whether the revalidation interval has elapsed since the fetch
    pub fn is_stale(&self) -> bool {
        self.age() >= Duration::seconds(CATALOG_REVALIDATE_SECS)
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_brl_formatting() {
        assert_eq!(Currency::BRL.format(7990), "R$ 79,90");
        assert_eq!(Currency::BRL.format(123_456), "R$ 1.234,56");
        assert_eq!(Currency::BRL.format(5), "R$ 0,05");
        assert_eq!(Currency::BRL.format(0), "R$ 0,00");
    }

    #[test]
    fn test_usd_formatting() {
        assert_eq!(Currency::USD.format(7990), "$79.90");
        assert_eq!(Currency::USD.format(1_234_567), "$12,345.67");
    }

    #[test]
    fn test_negative_amount_formatting() {
        assert_eq!(Currency::BRL.format(-7990), "-R$ 79,90");
    }

    #[test]
    fn test_currency_codes() {
        assert_eq!(Currency::BRL.as_str(), "brl");
        assert_eq!(Currency::from_code("BRL"), Some(Currency::BRL));
        assert_eq!(Currency::from_code("usd"), Some(Currency::USD));
        assert_eq!(Currency::from_code("xyz"), None);
        assert_eq!(Currency::BRL.to_string(), "BRL");
    }

    #[test]
    fn test_product_display_price() {
        let product = Product::new("prod_1", "Ignite Tee", 7990, "price_1", Currency::BRL)
            .with_image("https://files.example.com/tee.png");

        assert_eq!(product.display_price, "R$ 79,90");
        assert_eq!(product.image.as_deref(), Some("https://files.example.com/tee.png"));
    }

    #[test]
    fn test_catalog_lookup() {
        let catalog = Catalog::new(vec![
            Product::new("prod_1", "Tee", 7990, "price_1", Currency::BRL),
            Product::new("prod_2", "Mug", 4990, "price_2", Currency::BRL),
        ]);

        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.get("prod_2").map(|p| p.name.as_str()), Some("Mug"));
        assert!(catalog.get("prod_3").is_none());
    }

    #[test]
    fn test_catalog_staleness() {
        let fresh = Catalog::default();
        assert!(fresh.is_empty());
        assert!(!fresh.is_stale());

        let stale = Catalog {
            products: Vec::new(),
            fetched_at: Utc::now() - Duration::seconds(CATALOG_REVALIDATE_SECS + 1),
        };
        assert!(stale.is_stale());
    }
}
