//! # shop-client
//!
//! Storefront client for lightning-shop-rs: the checkout submission
//! flow, the `/api/checkout` client, and the cart view projection.
//!
//! This crate provides:
//! - `CheckoutFlow` - submission driver: project the cart, create the
//!   session, navigate to the hosted checkout page
//! - `CheckoutApi` / `HttpCheckoutApi` - the `/api/checkout` seam and
//!   its HTTP implementation
//! - `CartView` - shopping-bag panel data (distinct entry count,
//!   formatted totals, empty-state message)
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use shop_client::{CheckoutFlow, HttpCheckoutApi};
//! use shop_core::{CartStore, Currency};
//! use std::sync::Arc;
//!
//! let cart = CartStore::new(Currency::BRL);
//! cart.add(&product);
//!
//! let flow = CheckoutFlow::new(
//!     cart,
//!     Arc::new(HttpCheckoutApi::new("https://shop.example.com")),
//!     navigator,   // your Navigator impl (browser redirect, webview, ...)
//!     alerts,      // your AlertSink impl
//! );
//!
//! // No-op while a submission is in flight; re-enabled after failures
//! flow.submit().await;
//! ```

pub mod api;
pub mod flow;
pub mod view;

// Re-exports
pub use api::{CheckoutApi, HttpCheckoutApi};
pub use flow::{AlertSink, CheckoutFlow, Navigator, SubmissionState, CHECKOUT_FAILED_ALERT};
pub use view::{
    CartEntryView, CartView, CART_TITLE, CHECKOUT_BUTTON_LABEL, EMPTY_CART_MESSAGE,
};
