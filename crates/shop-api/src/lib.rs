//! # shop-api
//!
//! HTTP API layer for lightning-shop-rs.
//!
//! This crate provides:
//! - Axum-based HTTP server
//! - REST endpoints for the catalog and checkout sessions
//! - The revalidating catalog cache
//!
//! ## Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | GET | `/health` | Health check |
//! | POST | `/api/checkout` | Create checkout session |
//! | GET | `/api/checkout/sessions/:id` | Session summary |
//! | GET | `/api/products` | List products |
//! | GET | `/api/products/:id` | Get product |

pub mod catalog;
pub mod handlers;
pub mod routes;
pub mod state;

pub use catalog::CatalogCache;
pub use routes::create_router;
pub use state::{AppConfig, AppState};
