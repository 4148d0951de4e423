//! # Cart Store
//!
//! The client-side cart: an observable shared-state object with a
//! defined update+notify contract. Entries are unique per product id;
//! adding an already-present product increments its quantity. Every
//! mutation notifies subscribers synchronously with a fresh snapshot.

use crate::product::{Currency, Product};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// A cart entry: the add-to-cart payload plus a positive quantity
///
/// Carries the product fields the display and the checkout projection
/// need, denormalized so the entry survives a catalog refresh.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartEntry {
    /// Product identifier (uniqueness key within the cart)
    pub product_id: String,

    /// Display name
    pub name: String,

    /// Product image, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,

    /// Unit price in minor currency units
    pub unit_amount: i64,

    /// Provider price identifier used at checkout
    pub price_id: String,

    /// Currency code carried with the payload
    pub currency: Currency,

    /// Quantity (always >= 1 while the entry exists)
    pub quantity: u32,
}

impl CartEntry {
    /// Create an entry for one unit of a catalog product
    pub fn from_product(product: &Product) -> Self {
        Self {
            product_id: product.id.clone(),
            name: product.name.clone(),
            image: product.image.clone(),
            unit_amount: product.unit_amount,
            price_id: product.price_id.clone(),
            currency: product.currency,
            quantity: 1,
        }
    }

    /// Line total in minor units
    pub fn total_amount(&self) -> i64 {
        self.unit_amount * i64::from(self.quantity)
    }

    /// Unit price formatted for display
    pub fn display_unit_price(&self) -> String {
        self.currency.format(self.unit_amount)
    }

    /// Line total formatted for display
    pub fn display_total(&self) -> String {
        self.currency.format(self.total_amount())
    }

    /// Project this entry to the checkout wire shape
    pub fn to_line_item(&self) -> CheckoutLineItem {
        CheckoutLineItem {
            price: self.price_id.clone(),
            quantity: self.quantity,
        }
    }
}

/// The (price identifier, quantity) pair sent to the payment provider
///
/// Derived from `CartEntry` at submission time; never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutLineItem {
    /// Provider price identifier
    pub price: String,
    /// Quantity
    pub quantity: u32,
}

/// A point-in-time view of the cart
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartSnapshot {
    /// Entries ordered by product id
    pub entries: Vec<CartEntry>,
    /// Storefront currency the totals are formatted in
    pub currency: Currency,
}

impl CartSnapshot {
    /// Number of distinct entries (NOT the sum of quantities)
    pub fn entry_count(&self) -> usize {
        self.entries.len()
    }

    /// Sum of quantities over all entries
    pub fn unit_count(&self) -> u32 {
        self.entries.iter().map(|e| e.quantity).sum()
    }

    /// Cart total in minor units
    pub fn total_amount(&self) -> i64 {
        self.entries.iter().map(CartEntry::total_amount).sum()
    }

    /// Cart total formatted for display
    pub fn formatted_total(&self) -> String {
        self.currency.format(self.total_amount())
    }

    /// Check if the cart holds no entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Project every entry to the checkout wire shape
    pub fn line_items(&self) -> Vec<CheckoutLineItem> {
        self.entries.iter().map(CartEntry::to_line_item).collect()
    }
}

/// Handle returned by `CartStore::subscribe`, used to unsubscribe
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubscriptionId(u64);

type SubscriberFn = Arc<dyn Fn(&CartSnapshot) + Send + Sync>;

/// The cart store
///
/// Cheaply cloneable handle over shared state; all handles mutate the
/// same cart. Subscribers are invoked synchronously after each mutation
/// with the post-mutation snapshot and must not mutate the store from
/// inside the callback.
#[derive(Clone)]
pub struct CartStore {
    inner: Arc<CartStoreInner>,
}

struct CartStoreInner {
    currency: Currency,
    entries: Mutex<BTreeMap<String, CartEntry>>,
    subscribers: Mutex<Vec<(u64, SubscriberFn)>>,
    next_subscription: AtomicU64,
}

impl CartStore {
    /// Create an empty cart for the storefront currency
    pub fn new(currency: Currency) -> Self {
        Self {
            inner: Arc::new(CartStoreInner {
                currency,
                entries: Mutex::new(BTreeMap::new()),
                subscribers: Mutex::new(Vec::new()),
                next_subscription: AtomicU64::new(0),
            }),
        }
    }

    /// The storefront currency totals are formatted in
    pub fn currency(&self) -> Currency {
        self.inner.currency
    }

    /// Add one unit of a product; merges by product id
    pub fn add(&self, product: &Product) {
        {
            let mut entries = self.lock_entries();
            entries
                .entry(product.id.clone())
                .and_modify(|e| e.quantity += 1)
                .or_insert_with(|| CartEntry::from_product(product));
        }
        self.notify();
    }

    /// Remove an entry, returning it if it existed
    pub fn remove(&self, product_id: &str) -> Option<CartEntry> {
        let removed = self.lock_entries().remove(product_id);
        if removed.is_some() {
            self.notify();
        }
        removed
    }

    /// Set an entry's quantity; zero removes the entry
    ///
    /// Returns false (and does not notify) when the product is not in
    /// the cart.
    pub fn set_quantity(&self, product_id: &str, quantity: u32) -> bool {
        let changed = {
            let mut entries = self.lock_entries();
            if quantity == 0 {
                entries.remove(product_id).is_some()
            } else if let Some(entry) = entries.get_mut(product_id) {
                entry.quantity = quantity;
                true
            } else {
                false
            }
        };
        if changed {
            self.notify();
        }
        changed
    }

    /// Remove every entry
    pub fn clear(&self) {
        self.lock_entries().clear();
        self.notify();
    }

    /// Look up an entry by product id
    pub fn get(&self, product_id: &str) -> Option<CartEntry> {
        self.lock_entries().get(product_id).cloned()
    }

    /// Take a point-in-time snapshot
    pub fn snapshot(&self) -> CartSnapshot {
        CartSnapshot {
            entries: self.lock_entries().values().cloned().collect(),
            currency: self.inner.currency,
        }
    }

    /// Number of distinct entries
    pub fn entry_count(&self) -> usize {
        self.lock_entries().len()
    }

    /// Sum of quantities over all entries
    pub fn unit_count(&self) -> u32 {
        self.lock_entries().values().map(|e| e.quantity).sum()
    }

    /// Cart total in minor units
    pub fn total_amount(&self) -> i64 {
        self.lock_entries().values().map(CartEntry::total_amount).sum()
    }

    /// Cart total formatted for display
    pub fn formatted_total(&self) -> String {
        self.inner.currency.format(self.total_amount())
    }

    /// Check if the cart holds no entries
    pub fn is_empty(&self) -> bool {
        self.lock_entries().is_empty()
    }

    /// Project the current entries to checkout line items
    ///
    /// Single lock acquisition: the result matches the cart exactly at
    /// the moment of the call, with no partial or stale view.
    pub fn line_items(&self) -> Vec<CheckoutLineItem> {
        self.lock_entries().values().map(CartEntry::to_line_item).collect()
    }

    /// Register a subscriber invoked after every mutation
    pub fn subscribe(&self, subscriber: impl Fn(&CartSnapshot) + Send + Sync + 'static) -> SubscriptionId {
        let id = self.inner.next_subscription.fetch_add(1, Ordering::Relaxed);
        self.lock_subscribers().push((id, Arc::new(subscriber)));
        SubscriptionId(id)
    }

    /// Remove a subscriber; returns false if the id is unknown
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut subscribers = self.lock_subscribers();
        let before = subscribers.len();
        subscribers.retain(|(sid, _)| *sid != id.0);
        subscribers.len() != before
    }

    fn notify(&self) {
        let snapshot = self.snapshot();
        let subscribers: Vec<SubscriberFn> = self
            .lock_subscribers()
            .iter()
            .map(|(_, f)| Arc::clone(f))
            .collect();
        for subscriber in subscribers {
            subscriber(&snapshot);
        }
    }

    fn lock_entries(&self) -> MutexGuard<'_, BTreeMap<String, CartEntry>> {
        self.inner.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_subscribers(&self) -> MutexGuard<'_, Vec<(u64, SubscriberFn)>> {
        self.inner.subscribers.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for CartStore {
    fn default() -> Self {
        Self::new(Currency::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    fn tee() -> Product {
        Product::new("prod_tee", "Ignite Tee", 7990, "price_tee", Currency::BRL)
            .with_image("https://files.example.com/tee.png")
    }

    fn mug() -> Product {
        Product::new("prod_mug", "Ignite Mug", 4990, "price_mug", Currency::BRL)
    }

    #[test]
    fn test_add_same_product_merges() {
        let cart = CartStore::new(Currency::BRL);
        cart.add(&tee());
        cart.add(&tee());

        assert_eq!(cart.entry_count(), 1);
        assert_eq!(cart.get("prod_tee").map(|e| e.quantity), Some(2));
        assert_eq!(cart.unit_count(), 2);
    }

    #[test]
    fn test_totals() {
        let cart = CartStore::new(Currency::BRL);
        cart.add(&tee());
        cart.add(&tee());
        cart.add(&mug());

        assert_eq!(cart.total_amount(), 2 * 7990 + 4990);
        assert_eq!(cart.formatted_total(), "R$ 209,70");
        assert_eq!(cart.entry_count(), 2);
        assert_eq!(cart.unit_count(), 3);
    }

    #[test]
    fn test_remove_and_clear() {
        let cart = CartStore::new(Currency::BRL);
        cart.add(&tee());
        cart.add(&mug());

        let removed = cart.remove("prod_tee");
        assert_eq!(removed.map(|e| e.name), Some("Ignite Tee".to_string()));
        assert_eq!(cart.entry_count(), 1);
        assert!(cart.remove("prod_tee").is_none());

        cart.clear();
        assert!(cart.is_empty());
        assert_eq!(cart.total_amount(), 0);
    }

    #[test]
    fn test_set_quantity() {
        let cart = CartStore::new(Currency::BRL);
        cart.add(&tee());

        assert!(cart.set_quantity("prod_tee", 5));
        assert_eq!(cart.get("prod_tee").map(|e| e.quantity), Some(5));

        // Zero removes the entry
        assert!(cart.set_quantity("prod_tee", 0));
        assert!(cart.is_empty());

        // Unknown product is a no-op
        assert!(!cart.set_quantity("prod_tee", 3));
    }

    #[test]
    fn test_line_items_match_entries() {
        let cart = CartStore::new(Currency::BRL);
        assert!(cart.line_items().is_empty());

        cart.add(&tee());
        cart.add(&tee());
        cart.add(&mug());

        let mut items = cart.line_items();
        items.sort_by(|a, b| a.price.cmp(&b.price));

        assert_eq!(items.len(), 2);
        assert_eq!(items[0], CheckoutLineItem { price: "price_mug".into(), quantity: 1 });
        assert_eq!(items[1], CheckoutLineItem { price: "price_tee".into(), quantity: 2 });
    }

    #[test]
    fn test_line_item_wire_shape() {
        let item = CheckoutLineItem {
            price: "price_tee".to_string(),
            quantity: 2,
        };

        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(json, serde_json::json!({ "price": "price_tee", "quantity": 2 }));
    }

    #[test]
    fn test_subscribers_see_every_mutation() {
        let cart = CartStore::new(Currency::BRL);
        let notifications = Arc::new(AtomicUsize::new(0));
        let last_count = Arc::new(AtomicUsize::new(usize::MAX));

        let n = Arc::clone(&notifications);
        let c = Arc::clone(&last_count);
        let id = cart.subscribe(move |snapshot| {
            n.fetch_add(1, Ordering::SeqCst);
            c.store(snapshot.entry_count(), Ordering::SeqCst);
        });

        cart.add(&tee());
        cart.add(&mug());
        cart.remove("prod_mug");
        cart.clear();

        assert_eq!(notifications.load(Ordering::SeqCst), 4);
        assert_eq!(last_count.load(Ordering::SeqCst), 0);

        assert!(cart.unsubscribe(id));
        assert!(!cart.unsubscribe(id));
        cart.add(&tee());
        assert_eq!(notifications.load(Ordering::SeqCst), 4);
    }

    #[test]
    fn test_snapshot_is_point_in_time() {
        let cart = CartStore::new(Currency::BRL);
        cart.add(&tee());

        let snapshot = cart.snapshot();
        cart.add(&mug());

        assert_eq!(snapshot.entry_count(), 1);
        assert_eq!(cart.entry_count(), 2);
        assert_eq!(snapshot.formatted_total(), "R$ 79,90");
    }

    #[test]
    fn test_shared_handles_mutate_one_cart() {
        let cart = CartStore::default();
        assert_eq!(cart.currency(), Currency::BRL);

        let handle = cart.clone();
        handle.add(&tee());
        assert_eq!(cart.entry_count(), 1);
    }
}
