//! # Checkout Flow
//!
//! Drives checkout submission for the storefront: project the cart to
//! line items, create the session, and hand the shopper to the hosted
//! checkout page.
//!
//! One submission may be in flight at a time. The guard is the state
//! machine itself: `submit` is a no-op unless the current state allows
//! a new attempt.

use crate::api::CheckoutApi;
use shop_core::{CartStore, ShopError};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{error, info};

/// Message shown when a submission fails, whatever the cause
pub const CHECKOUT_FAILED_ALERT: &str = "Falha ao redirecionar ao checkout";

/// Lifecycle of a checkout submission
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionState {
    /// No attempt yet
    Idle,
    /// Request in flight; further submits are ignored
    Submitting,
    /// Navigation to the hosted page succeeded
    Redirected,
    /// Last attempt failed; submitting again is allowed
    Failed,
}

impl SubmissionState {
    /// Whether a new submission may start from this state
    pub fn can_submit(&self) -> bool {
        matches!(self, SubmissionState::Idle | SubmissionState::Failed)
    }
}

/// Seam for leaving the storefront (browser navigation, deep link)
pub trait Navigator: Send + Sync {
    /// Point the shopper at `url`; an error keeps the cart intact
    fn navigate(&self, url: &str) -> Result<(), ShopError>;
}

/// Seam for the uniform failure surface
pub trait AlertSink: Send + Sync {
    fn alert(&self, message: &str);
}

/// Checkout submission driver
///
/// Owns the submission state machine; the cart, API client, navigator,
/// and alert sink are injected so the flow is testable end to end.
pub struct CheckoutFlow {
    cart: CartStore,
    api: Arc<dyn CheckoutApi>,
    navigator: Arc<dyn Navigator>,
    alerts: Arc<dyn AlertSink>,
    state: Mutex<SubmissionState>,
}

impl CheckoutFlow {
    pub fn new(
        cart: CartStore,
        api: Arc<dyn CheckoutApi>,
        navigator: Arc<dyn Navigator>,
        alerts: Arc<dyn AlertSink>,
    ) -> Self {
        Self {
            cart,
            api,
            navigator,
            alerts,
            state: Mutex::new(SubmissionState::Idle),
        }
    }

    /// Current submission state
    pub fn state(&self) -> SubmissionState {
        *self.lock_state()
    }

    /// The cart this flow submits
    pub fn cart(&self) -> &CartStore {
        &self.cart
    }

    /// Submit the cart for checkout.
    ///
    /// Projects the cart into line items once, creates the session, and
    /// navigates to the returned URL. Every failure collapses into the
    /// same alert and re-enables submission. The cart is cleared only
    /// after navigation succeeded; a failed redirect keeps it intact.
    ///
    /// Returns the resulting state. When a submission is already in
    /// flight this is a no-op returning `Submitting`.
    pub async fn submit(&self) -> SubmissionState {
        {
            let mut state = self.lock_state();
            if !state.can_submit() {
                return *state;
            }
            *state = SubmissionState::Submitting;
        }

        // One projection per attempt; later cart edits don't leak in
        let line_items = self.cart.line_items();
        info!("Submitting checkout: {} line items", line_items.len());

        let next = match self.api.create_checkout(&line_items).await {
            Ok(checkout_url) => match self.navigator.navigate(&checkout_url) {
                Ok(()) => {
                    self.cart.clear();
                    SubmissionState::Redirected
                }
                Err(e) => self.fail(e),
            },
            Err(e) => self.fail(e),
        };

        *self.lock_state() = next;
        next
    }

    fn fail(&self, err: ShopError) -> SubmissionState {
        error!("Checkout submission failed ({}): {}", err.kind(), err);
        self.alerts.alert(CHECKOUT_FAILED_ALERT);
        SubmissionState::Failed
    }

    fn lock_state(&self) -> MutexGuard<'_, SubmissionState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
