use serde::Deserialize;

use crate::domain::order::OrderStatus;

/// Status change submitted from the kitchen board.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct ChangeStatusForm {
    pub status: OrderStatus,
}

/// Query parameters accepted by the admin orders list.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OrdersQuery {
    /// Include completed and cancelled orders.
    #[serde(default)]
    pub include_finished: bool,
    pub order_number: Option<i32>,
    pub page: Option<usize>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_form_rejects_unknown_status() {
        let parsed: Result<ChangeStatusForm, _> =
            serde_json::from_str(r#"{"status":"teleported"}"#);
        assert!(parsed.is_err());

        let parsed: ChangeStatusForm =
            serde_json::from_str(r#"{"status":"out_for_delivery"}"#).expect("valid status");
        assert_eq!(parsed.status, OrderStatus::OutForDelivery);
    }
}
