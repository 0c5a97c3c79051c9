use serde::{Deserialize, Serialize};

use crate::domain::money::Money;
use crate::domain::pricing;
use crate::domain::product::{AddonOption, Product, SizeOption};

/// Wire identifier that addresses every line of the cart.
pub const ALL_ITEMS_ID: &str = "ALL";

/// Delta used by clients to drop a line regardless of its quantity.
pub const REMOVE_ENTIRELY: i64 = -9999;

/// One distinct (product, size, add-on set) entry in the cart.
///
/// The product is a snapshot taken when the line was created; later catalog
/// edits do not change lines already in a cart.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    #[serde(flatten)]
    pub product: Product,
    /// Always at least one while the line is in a cart.
    pub quantity: u32,
    pub selected_size: SizeOption,
    #[serde(default)]
    pub selected_addons: Vec<AddonOption>,
}

impl CartItem {
    pub fn new(
        product: Product,
        quantity: u32,
        selected_size: SizeOption,
        selected_addons: Vec<AddonOption>,
    ) -> Self {
        let mut unique: Vec<AddonOption> = Vec::with_capacity(selected_addons.len());
        for addon in selected_addons {
            if !unique.iter().any(|existing| existing.label == addon.label) {
                unique.push(addon);
            }
        }

        Self {
            product,
            quantity,
            selected_size,
            selected_addons: unique,
        }
    }

    /// Price of a single unit including size and add-on deltas.
    pub fn unit_price(&self) -> Money {
        self.product.price
            + self.selected_size.price
            + self.selected_addons
                .iter()
                .map(|addon| addon.price)
                .sum::<Money>()
    }

    /// Whether this line has the same merge identity as the given selection.
    pub fn same_selection(
        &self,
        product_id: &str,
        size: &SizeOption,
        addons: &[AddonOption],
    ) -> bool {
        self.product.id == product_id
            && self.selected_size.label == size.label
            && same_addon_set(&self.selected_addons, addons)
    }
}

fn same_addon_set(left: &[AddonOption], right: &[AddonOption]) -> bool {
    let mut left: Vec<&AddonOption> = left.iter().collect();
    let mut right: Vec<&AddonOption> = right.iter().collect();
    left.sort_by(|a, b| a.label.cmp(&b.label));
    left.dedup_by(|a, b| a.label == b.label);
    right.sort_by(|a, b| a.label.cmp(&b.label));
    right.dedup_by(|a, b| a.label == b.label);
    left == right
}

/// Which lines a quantity adjustment applies to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CartTarget {
    /// Every line; any delta clears the cart.
    All,
    /// Every line holding this product id.
    Product(String),
    /// Exactly one line by position.
    Index(usize),
}

impl CartTarget {
    /// Map the wire addressing (`"ALL"`, product id, optional index) to a target.
    pub fn from_wire(id: &str, index: Option<usize>) -> Self {
        if id == ALL_ITEMS_ID {
            return CartTarget::All;
        }
        match index {
            Some(index) => CartTarget::Index(index),
            None => CartTarget::Product(id.to_string()),
        }
    }
}

/// Ordered collection of line items for the current customer.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Cart {
    items: Vec<CartItem>,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn total(&self) -> Money {
        pricing::cart_total(&self.items)
    }

    pub fn count(&self) -> u32 {
        pricing::cart_count(&self.items)
    }

    /// Merge the selection into a matching line or append a new one.
    /// Returns the index of the affected line, or `None` for a zero quantity.
    pub fn add(
        &mut self,
        product: &Product,
        quantity: u32,
        size: SizeOption,
        addons: Vec<AddonOption>,
    ) -> Option<usize> {
        if quantity == 0 {
            return None;
        }

        if let Some(index) = self
            .items
            .iter()
            .position(|item| item.same_selection(&product.id, &size, &addons))
        {
            let item = &mut self.items[index];
            item.quantity = item.quantity.saturating_add(quantity);
            return Some(index);
        }

        self.items
            .push(CartItem::new(product.clone(), quantity, size, addons));
        Some(self.items.len() - 1)
    }

    /// Apply `delta` to the targeted lines and drop lines that reach zero.
    /// Unknown ids and out of range indexes leave the cart untouched.
    pub fn update_quantity(&mut self, target: &CartTarget, delta: i64) {
        let apply = |item: &mut CartItem| {
            let next = i64::from(item.quantity) + delta;
            item.quantity = u32::try_from(next.max(0)).unwrap_or(u32::MAX);
        };

        match target {
            CartTarget::All => {
                self.clear();
                return;
            }
            CartTarget::Product(id) => self
                .items
                .iter_mut()
                .filter(|item| &item.product.id == id)
                .for_each(apply),
            CartTarget::Index(index) => {
                if let Some(item) = self.items.get_mut(*index) {
                    apply(item);
                }
            }
        }

        self.items.retain(|item| item.quantity > 0);
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }
}
