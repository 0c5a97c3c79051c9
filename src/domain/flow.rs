//! Screen sequencer for the customer facing kiosk.
//!
//! Every edge of the wizard lives in [`transition`]; views never compare the
//! current screen ad hoc. Guarded edges consult [`FlowGuards`], a read-only
//! summary of the session taken right before the transition.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Screen currently shown by a kiosk.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, Default)]
#[serde(tag = "view", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum KioskView {
    #[default]
    Landing,
    Menu,
    ProductDetail {
        product_id: String,
    },
    Cart,
    /// Dining mode selection.
    Checkout,
    UserDetails,
    FinalSummary,
    OrderConfirmed,
    Tracker,
    Admin,
}

impl KioskView {
    pub fn name(&self) -> &'static str {
        match self {
            KioskView::Landing => "LANDING",
            KioskView::Menu => "MENU",
            KioskView::ProductDetail { .. } => "PRODUCT_DETAIL",
            KioskView::Cart => "CART",
            KioskView::Checkout => "CHECKOUT",
            KioskView::UserDetails => "USER_DETAILS",
            KioskView::FinalSummary => "FINAL_SUMMARY",
            KioskView::OrderConfirmed => "ORDER_CONFIRMED",
            KioskView::Tracker => "TRACKER",
            KioskView::Admin => "ADMIN",
        }
    }
}

/// User intent that may move the kiosk to another screen.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum KioskAction {
    Start,
    OpenProduct { product_id: String },
    /// A product was added from its detail screen.
    AddedToCart,
    OpenCart,
    Checkout,
    /// Dining mode picked on the checkout screen.
    ModeSelected,
    ConfirmDetails,
    /// The submission settled, successfully or not.
    OrderPlaced,
    TrackOrder,
    OpenAdmin,
    Back,
    Restart,
}

impl KioskAction {
    pub fn name(&self) -> &'static str {
        match self {
            KioskAction::Start => "start",
            KioskAction::OpenProduct { .. } => "open_product",
            KioskAction::AddedToCart => "added_to_cart",
            KioskAction::OpenCart => "open_cart",
            KioskAction::Checkout => "checkout",
            KioskAction::ModeSelected => "mode_selected",
            KioskAction::ConfirmDetails => "confirm_details",
            KioskAction::OrderPlaced => "order_placed",
            KioskAction::TrackOrder => "track_order",
            KioskAction::OpenAdmin => "open_admin",
            KioskAction::Back => "back",
            KioskAction::Restart => "restart",
        }
    }
}

/// Errors raised when an action is not allowed from the current screen or
/// the session does not satisfy the guard of the requested edge.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FlowError {
    #[error("cannot {action} from {from}")]
    IllegalTransition {
        from: &'static str,
        action: &'static str,
    },
    #[error("the cart is empty")]
    EmptyCart,
    #[error("missing required details: {}", .0.join(", "))]
    InvalidDetails(Vec<&'static str>),
    #[error("an order is already being submitted")]
    SubmissionInFlight,
    #[error("product `{0}` does not exist")]
    UnknownProduct(String),
    #[error("product `{0}` is currently unavailable")]
    ProductUnavailable(String),
    #[error("size `{size}` is not offered for product `{product_id}`")]
    UnknownSize { product_id: String, size: String },
    #[error("add-on `{addon}` is not offered for product `{product_id}`")]
    UnknownAddon { product_id: String, addon: String },
    #[error("ordering is closed today")]
    Closed,
}

/// Session facts consulted by guarded edges.
#[derive(Debug, Clone, Default)]
pub struct FlowGuards {
    pub cart_count: u32,
    /// Names of required contact fields still missing.
    pub missing_details: Vec<&'static str>,
    pub is_submitting: bool,
}

/// Compute the screen reached from `from` by `action`.
pub fn transition(
    from: &KioskView,
    action: &KioskAction,
    guards: &FlowGuards,
) -> Result<KioskView, FlowError> {
    use KioskAction as A;
    use KioskView as V;

    let next = match (from, action) {
        (V::Landing, A::Start) => V::Menu,

        (V::Menu, A::OpenProduct { product_id }) => V::ProductDetail {
            product_id: product_id.clone(),
        },
        (V::Menu, A::OpenCart) => V::Cart,
        (V::Menu, A::OpenAdmin) => V::Admin,
        (V::Menu, A::Restart) => V::Landing,

        (V::ProductDetail { .. }, A::AddedToCart) => V::Menu,
        (V::ProductDetail { .. }, A::Back) => V::Menu,

        (V::Cart, A::Back) => V::Menu,
        (V::Cart, A::Checkout) => {
            if guards.cart_count == 0 {
                return Err(FlowError::EmptyCart);
            }
            V::Checkout
        }

        (V::Checkout, A::Back) => V::Cart,
        (V::Checkout, A::ModeSelected) => V::UserDetails,

        (V::UserDetails, A::Back) => V::Checkout,
        (V::UserDetails, A::ConfirmDetails) => {
            if !guards.missing_details.is_empty() {
                return Err(FlowError::InvalidDetails(guards.missing_details.clone()));
            }
            if guards.cart_count == 0 {
                return Err(FlowError::EmptyCart);
            }
            V::FinalSummary
        }

        (V::FinalSummary, A::Back) => {
            if guards.is_submitting {
                return Err(FlowError::SubmissionInFlight);
            }
            V::UserDetails
        }
        (V::FinalSummary, A::OrderPlaced) => V::OrderConfirmed,

        (V::OrderConfirmed, A::TrackOrder) => V::Tracker,
        (V::OrderConfirmed, A::Restart) => V::Landing,
        (V::Tracker, A::Restart) => V::Landing,

        (V::Admin, A::Back) => V::Menu,

        (from, action) => {
            return Err(FlowError::IllegalTransition {
                from: from.name(),
                action: action.name(),
            });
        }
    };

    Ok(next)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn guards(cart_count: u32, missing: &[&'static str]) -> FlowGuards {
        FlowGuards {
            cart_count,
            missing_details: missing.to_vec(),
            is_submitting: false,
        }
    }

    #[test]
    fn happy_path_walks_every_screen() {
        let ok = guards(1, &[]);
        let steps = [
            KioskAction::Start,
            KioskAction::OpenProduct {
                product_id: "b1".to_string(),
            },
            KioskAction::AddedToCart,
            KioskAction::OpenCart,
            KioskAction::Checkout,
            KioskAction::ModeSelected,
            KioskAction::ConfirmDetails,
            KioskAction::OrderPlaced,
            KioskAction::TrackOrder,
            KioskAction::Restart,
        ];

        let mut view = KioskView::Landing;
        let mut visited = Vec::new();
        for action in &steps {
            view = transition(&view, action, &ok).expect("legal step");
            visited.push(view.name());
        }

        assert_eq!(
            visited,
            vec![
                "MENU",
                "PRODUCT_DETAIL",
                "MENU",
                "CART",
                "CHECKOUT",
                "USER_DETAILS",
                "FINAL_SUMMARY",
                "ORDER_CONFIRMED",
                "TRACKER",
                "LANDING",
            ]
        );
    }

    #[test]
    fn final_summary_requires_valid_details() {
        let result = transition(
            &KioskView::UserDetails,
            &KioskAction::ConfirmDetails,
            &guards(1, &["name"]),
        );
        assert_eq!(result, Err(FlowError::InvalidDetails(vec!["name"])));

        let result = transition(
            &KioskView::UserDetails,
            &KioskAction::ConfirmDetails,
            &guards(1, &["address"]),
        );
        assert!(matches!(result, Err(FlowError::InvalidDetails(_))));
    }

    #[test]
    fn checkout_requires_items() {
        let result = transition(&KioskView::Cart, &KioskAction::Checkout, &guards(0, &[]));
        assert_eq!(result, Err(FlowError::EmptyCart));
    }

    #[test]
    fn back_edges_mirror_forward_edges() {
        let ok = guards(1, &[]);
        let pairs = [
            (KioskView::Cart, KioskView::Menu),
            (KioskView::Checkout, KioskView::Cart),
            (KioskView::UserDetails, KioskView::Checkout),
            (KioskView::FinalSummary, KioskView::UserDetails),
            (KioskView::Admin, KioskView::Menu),
        ];
        for (from, expected) in pairs {
            assert_eq!(transition(&from, &KioskAction::Back, &ok), Ok(expected));
        }
    }

    #[test]
    fn illegal_edges_are_rejected() {
        let ok = guards(1, &[]);
        assert_eq!(
            transition(&KioskView::Landing, &KioskAction::Checkout, &ok),
            Err(FlowError::IllegalTransition {
                from: "LANDING",
                action: "checkout",
            })
        );
        assert!(transition(&KioskView::OrderConfirmed, &KioskAction::Back, &ok).is_err());
        assert!(transition(&KioskView::Menu, &KioskAction::OrderPlaced, &ok).is_err());
    }

    #[test]
    fn back_is_blocked_while_submitting() {
        let mut busy = guards(1, &[]);
        busy.is_submitting = true;
        assert_eq!(
            transition(&KioskView::FinalSummary, &KioskAction::Back, &busy),
            Err(FlowError::SubmissionInFlight)
        );
    }

    #[test]
    fn actions_deserialize_from_tagged_json() {
        let action: KioskAction =
            serde_json::from_str(r#"{"action":"open_product","product_id":"b1"}"#)
                .expect("tagged action");
        assert_eq!(
            action,
            KioskAction::OpenProduct {
                product_id: "b1".to_string()
            }
        );
    }
}
