//! Pure cart pricing.
//!
//! Amounts are whole cents, so summing lines is exact and the cart total needs
//! no further rounding.

use crate::domain::cart::CartItem;
use crate::domain::money::Money;

/// `(base + size delta + sum of add-on deltas) * quantity`.
pub fn line_total(item: &CartItem) -> Money {
    item.unit_price() * item.quantity
}

/// Sum of all line totals. An empty cart costs zero.
pub fn cart_total(items: &[CartItem]) -> Money {
    items.iter().map(line_total).sum()
}

/// Number of units across all lines, saturating at `u32::MAX`.
pub fn cart_count(items: &[CartItem]) -> u32 {
    items
        .iter()
        .fold(0u32, |count, item| count.saturating_add(item.quantity))
}
