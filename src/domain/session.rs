use serde::{Deserialize, Serialize};

use crate::domain::cart::Cart;
use crate::domain::money::Money;
use crate::domain::order::{NewOrder, OrderNumber};

/// How the customer wants to receive the order.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DiningMode {
    #[default]
    #[serde(alias = "DINE_IN")]
    EatIn,
    #[serde(alias = "PICK_UP")]
    TakeAway,
    Delivery,
}

impl DiningMode {
    pub fn requires_address(self) -> bool {
        matches!(self, DiningMode::Delivery)
    }

    pub fn label(self) -> &'static str {
        match self {
            DiningMode::EatIn => "Eat in",
            DiningMode::TakeAway => "Take away",
            DiningMode::Delivery => "Delivery",
        }
    }
}

/// Contact information collected before the final summary.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct UserDetails {
    pub name: String,
    pub phone: String,
    /// Only meaningful for delivery orders.
    #[serde(default)]
    pub address: String,
    pub dining_mode: DiningMode,
    /// Cash the customer will hand over on delivery.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cash_tendered: Option<Money>,
    /// Channel the order originated from, for example a messenger bot.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub platform: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub telegram_username: Option<String>,
}

impl UserDetails {
    /// Names of required fields that are still blank.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.name.trim().is_empty() {
            missing.push("name");
        }
        if self.phone.trim().is_empty() {
            missing.push("phone");
        }
        if self.dining_mode.requires_address() && self.address.trim().is_empty() {
            missing.push("address");
        }
        missing
    }

    /// Name and phone are present, plus the address for deliveries.
    pub fn is_valid(&self) -> bool {
        self.missing_fields().is_empty()
    }
}

/// Draft of the checkout in progress.
#[derive(Debug, Clone, Default, Serialize)]
pub struct OrderSession {
    details: UserDetails,
}

impl OrderSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn details(&self) -> &UserDetails {
        &self.details
    }

    pub fn dining_mode(&self) -> DiningMode {
        self.details.dining_mode
    }

    /// Switch the dining mode and drop fields that do not apply to it.
    pub fn select_dining_mode(&mut self, mode: DiningMode) {
        self.details.dining_mode = mode;
        if !mode.requires_address() {
            self.details.address.clear();
            self.details.cash_tendered = None;
        }
    }

    /// Replace the contact details. The dining mode chosen at checkout start
    /// wins over whatever the payload carries.
    pub fn set_details(&mut self, details: UserDetails) {
        let mode = self.details.dining_mode;
        self.details = details;
        self.select_dining_mode(mode);
    }

    pub fn can_continue(&self) -> bool {
        self.details.is_valid()
    }

    /// Change owed to a cash-on-delivery customer.
    pub fn change_due(&self, total: Money) -> Option<Money> {
        self.details
            .cash_tendered
            .map(|tendered| tendered.saturating_sub_floor(total))
    }

    /// Snapshot the cart and details into an immutable submission record.
    pub fn to_order_payload(&self, cart: &Cart, order_number: OrderNumber) -> NewOrder {
        NewOrder::new(
            order_number,
            self.details.clone(),
            cart.items().to_vec(),
            cart.total(),
        )
    }

    pub fn reset(&mut self) {
        self.details = UserDetails::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::product::{Product, SizeOption};

    fn filled(mode: DiningMode) -> UserDetails {
        UserDetails {
            name: "Ann".to_string(),
            phone: "+100".to_string(),
            address: String::new(),
            dining_mode: mode,
            ..UserDetails::default()
        }
    }

    #[test]
    fn name_and_phone_are_required() {
        let mut details = filled(DiningMode::EatIn);
        assert!(details.is_valid());

        details.phone = "  ".to_string();
        assert_eq!(details.missing_fields(), vec!["phone"]);
    }

    #[test]
    fn delivery_requires_address() {
        let mut session = OrderSession::new();
        session.select_dining_mode(DiningMode::Delivery);
        session.set_details(filled(DiningMode::Delivery));

        assert!(!session.can_continue());
        assert_eq!(session.details().missing_fields(), vec!["address"]);

        let mut details = filled(DiningMode::Delivery);
        details.address = "1 Main St".to_string();
        session.set_details(details);
        assert!(session.can_continue());
    }

    #[test]
    fn leaving_delivery_clears_address_and_cash() {
        let mut session = OrderSession::new();
        session.select_dining_mode(DiningMode::Delivery);
        let mut details = filled(DiningMode::Delivery);
        details.address = "1 Main St".to_string();
        details.cash_tendered = Some(Money::from_cents(5000));
        session.set_details(details);

        session.select_dining_mode(DiningMode::TakeAway);

        assert!(session.details().address.is_empty());
        assert!(session.details().cash_tendered.is_none());
    }

    #[test]
    fn set_details_keeps_selected_mode() {
        let mut session = OrderSession::new();
        session.select_dining_mode(DiningMode::TakeAway);
        session.set_details(filled(DiningMode::Delivery));
        assert_eq!(session.dining_mode(), DiningMode::TakeAway);
    }

    #[test]
    fn change_due_is_floored_at_zero() {
        let mut session = OrderSession::new();
        session.select_dining_mode(DiningMode::Delivery);
        let mut details = filled(DiningMode::Delivery);
        details.address = "1 Main St".to_string();
        details.cash_tendered = Some(Money::from_cents(2000));
        session.set_details(details);

        assert_eq!(
            session.change_due(Money::from_cents(1250)),
            Some(Money::from_cents(750))
        );
        assert_eq!(session.change_due(Money::from_cents(2500)), Some(Money::ZERO));
    }

    #[test]
    fn legacy_mode_names_are_accepted() {
        let mode: DiningMode = serde_json::from_str("\"DINE_IN\"").expect("alias");
        assert_eq!(mode, DiningMode::EatIn);
        let mode: DiningMode = serde_json::from_str("\"PICK_UP\"").expect("alias");
        assert_eq!(mode, DiningMode::TakeAway);
    }

    #[test]
    fn payload_snapshots_cart_and_total() {
        let mut cart = Cart::new();
        let product = Product::new("p", "P", Money::from_cents(1000), "MAIN");
        cart.add(&product, 2, SizeOption::new("Regular", Money::ZERO), Vec::new());

        let mut session = OrderSession::new();
        session.set_details(filled(DiningMode::EatIn));

        let payload = session.to_order_payload(&cart, OrderNumber::new(123));
        cart.clear();

        assert_eq!(payload.cart_items.len(), 1);
        assert_eq!(payload.total_price, Money::from_cents(2000));
        assert_eq!(payload.order_number.value(), 123);
        assert_eq!(payload.customer_details.name, "Ann");
    }
}
