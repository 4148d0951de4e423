//! # Cart View
//!
//! Presentation projection of the cart for the shopping-bag panel:
//! one row per distinct product, the distinct entry count (not the
//! unit sum) in the footer, and the formatted total.

use shop_core::CartSnapshot;

/// Panel title
pub const CART_TITLE: &str = "Sacola de Compras";

/// Message shown in place of rows when the cart has no entries
pub const EMPTY_CART_MESSAGE: &str = "O carrinho está vazio.";

/// Submit button label
pub const CHECKOUT_BUTTON_LABEL: &str = "Finalizar Compra";

/// One row of the cart panel
#[derive(Debug, Clone, PartialEq)]
pub struct CartEntryView {
    pub product_id: String,
    pub name: String,
    pub image: Option<String>,
    pub quantity: u32,
    /// Unit price, formatted (e.g., "R$ 79,90")
    pub display_unit_price: String,
    /// Line total, formatted
    pub display_total: String,
}

/// The cart panel's data, derived from a snapshot
#[derive(Debug, Clone, PartialEq)]
pub struct CartView {
    pub entries: Vec<CartEntryView>,
    /// Count of distinct products, the number the footer displays
    pub entry_count: usize,
    /// Formatted cart total
    pub formatted_total: String,
}

impl CartView {
    /// Project a snapshot into the panel's data
    pub fn from_snapshot(snapshot: &CartSnapshot) -> Self {
        let entries = snapshot
            .entries
            .iter()
            .map(|entry| CartEntryView {
                product_id: entry.product_id.clone(),
                name: entry.name.clone(),
                image: entry.image.clone(),
                quantity: entry.quantity,
                display_unit_price: entry.display_unit_price(),
                display_total: entry.display_total(),
            })
            .collect();

        Self {
            entries,
            entry_count: snapshot.entry_count(),
            formatted_total: snapshot.formatted_total(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Empty-state message, present only when there are no entries
    pub fn empty_message(&self) -> Option<&'static str> {
        self.is_empty().then_some(EMPTY_CART_MESSAGE)
    }

    /// Footer quantity line (distinct products, not unit sum)
    pub fn quantity_label(&self) -> String {
        format!("Quantidade: {}", self.entry_count)
    }

    /// Footer total line
    pub fn total_label(&self) -> String {
        format!("Valor total: {}", self.formatted_total)
    }
}
