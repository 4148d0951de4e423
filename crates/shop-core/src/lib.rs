//! # shop-core
//!
//! Core types and traits for the lightning-shop storefront engine.
//!
//! This crate provides:
//! - `Currency` and locale-aware price formatting
//! - `Product` and the `Catalog` snapshot (revalidated, never mutated)
//! - `CartStore`, an observable cart with an update+notify contract
//! - `CheckoutLineItem`, the projection sent to the payment provider
//! - `PaymentProvider` trait for the provider boundary
//! - `ShopError` for typed error handling
//!
//! ## Example
//!
//! ```rust,ignore
//! use shop_core::{CartStore, Currency, Product};
//!
//! // Map a catalog product (normally done by the provider client)
//! let product = Product::new("prod_tee", "Ignite Tee", 7990, "price_tee", Currency::BRL)
//!     .with_image("https://files.example.com/tee.png");
//!
//! // The cart merges by product id and increments quantity
//! let cart = CartStore::new(Currency::BRL);
//! cart.add(&product);
//! cart.add(&product);
//! assert_eq!(cart.entry_count(), 1);
//! assert_eq!(cart.unit_count(), 2);
//!
//! // Projected at submission time, one lock acquisition
//! let line_items = cart.line_items();
//! ```

pub mod cart;
pub mod error;
pub mod product;
pub mod provider;

// Re-exports for convenience
pub use cart::{CartEntry, CartSnapshot, CartStore, CheckoutLineItem, SubscriptionId};
pub use error::{ShopError, ShopResult};
pub use product::{Catalog, Currency, Product, CATALOG_REVALIDATE_SECS};
pub use provider::{
    BoxedPaymentProvider, CheckoutSession, CheckoutUrls, PaymentProvider, PurchasedItem,
    SessionSummary,
};
