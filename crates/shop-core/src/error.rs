//! # Storefront Error Types
//!
//! Typed error handling for the lightning-shop storefront engine.
//! All provider and store operations return `Result<T, ShopError>`.

use thiserror::Error;

/// Core error type for catalog, cart, and checkout operations
#[derive(Debug, Error)]
pub enum ShopError {
    /// Configuration errors (missing keys, invalid config)
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Invalid request data
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Product not found in the catalog
    #[error("Product not found: {product_id}")]
    ProductNotFound { product_id: String },

    /// Provider-side rejection (non-success status from the provider)
    #[error("Provider error: {message}")]
    Provider { message: String },

    /// Network/transport error reaching the provider or the API
    #[error("Network error: {0}")]
    Network(String),

    /// Response body did not match the expected shape
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    /// Checkout session unknown to the provider
    #[error("Session not found: {session_id}")]
    SessionNotFound { session_id: String },

    /// Internal error (should not happen)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ShopError {
    /// HTTP status code appropriate for this error
    pub fn status_code(&self) -> u16 {
        match self {
            ShopError::Configuration(_) => 500,
            ShopError::InvalidRequest(_) => 400,
            ShopError::ProductNotFound { .. } => 404,
            ShopError::Provider { .. } => 502,
            ShopError::Network(_) => 503,
            ShopError::MalformedResponse(_) => 502,
            ShopError::SessionNotFound { .. } => 404,
            ShopError::Internal(_) => 500,
        }
    }

    /// Stable tag identifying the failure kind
    ///
    /// The checkout flow collapses every failure into one user-visible
    /// alert; this tag is what gets logged before the collapse.
    pub fn kind(&self) -> &'static str {
        match self {
            ShopError::Configuration(_) => "configuration",
            ShopError::InvalidRequest(_) => "invalid_request",
            ShopError::ProductNotFound { .. } => "product_not_found",
            ShopError::Provider { .. } => "provider",
            ShopError::Network(_) => "network",
            ShopError::MalformedResponse(_) => "malformed_response",
            ShopError::SessionNotFound { .. } => "session_not_found",
            ShopError::Internal(_) => "internal",
        }
    }
}

/// Result type alias for storefront operations
pub type ShopResult<T> = Result<T, ShopError>;
