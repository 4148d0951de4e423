//! # shop-stripe
//!
//! Stripe client for the lightning-shop storefront: product catalog
//! reads and hosted checkout sessions over the Stripe REST API.
//!
//! This crate provides **StripeProvider**, the `PaymentProvider`
//! implementation the storefront runs against:
//!
//! - Product listing with `expand[]=data.default_price` (paginated)
//! - Single-product retrieval for the detail page
//! - Checkout-session creation in `payment` mode (form-encoded
//!   `line_items[i][price]` / `line_items[i][quantity]`)
//! - Session retrieval with purchased line items for the success page
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use shop_core::PaymentProvider;
//! use shop_stripe::StripeProvider;
//!
//! // Reads STRIPE_SECRET_KEY from the environment
//! let provider = StripeProvider::from_env()?;
//!
//! let products = provider.list_products().await?;
//!
//! let session = provider.create_checkout_session(
//!     &cart.line_items(),
//!     "https://shop.example.com/success?session_id={CHECKOUT_SESSION_ID}",
//!     "https://shop.example.com/",
//! ).await?;
//!
//! // Redirect the shopper to session.checkout_url
//! ```

pub mod catalog;
pub mod checkout;
pub mod config;
pub mod provider;

// Re-exports
pub use config::StripeConfig;
pub use provider::StripeProvider;
