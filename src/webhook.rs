//! Outbound order notifications for the kitchen or the owner.
//!
//! Delivery is fire-and-forget: failures are logged and never reach the
//! customer or the admin.

use serde::Serialize;
use tera::{Context, Tera};

use crate::domain::cart::CartItem;
use crate::domain::order::Order;
use crate::domain::session::UserDetails;

const MESSAGE_TEMPLATE: &str = "\
New order #{{ order_number }}
Customer: {{ name }} ({{ phone }})
Mode: {{ mode }}
{% if address %}Address: {{ address }}
{% endif %}{% for line in lines %}- {{ line.quantity }} x {{ line.name }} ({{ line.size }}){% if line.addons %} + {{ line.addons | join(sep=\", \") }}{% endif %}: {{ line.total }}
{% endfor %}Total: {{ total }} {{ currency }}{% if change_due %}
Change due: {{ change_due }} {{ currency }}{% endif %}";

/// JSON body posted to the notification webhook.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct WebhookPayload {
    pub order_id: i32,
    pub order_number: i32,
    /// Pre-rendered human readable summary.
    pub message: String,
    pub customer_details: UserDetails,
    pub cart_items: Vec<CartItem>,
    /// Decimal amount in the store currency.
    pub total_price: f64,
    pub currency: String,
}

#[derive(Serialize)]
struct MessageLine {
    quantity: u32,
    name: String,
    size: String,
    addons: Vec<String>,
    total: String,
}

impl WebhookPayload {
    pub fn from_order(order: &Order, currency: &str) -> Self {
        Self {
            order_id: order.id,
            order_number: order.order_number.value(),
            message: render_message(order, currency),
            customer_details: order.customer_details.clone(),
            cart_items: order.cart_items.clone(),
            total_price: order.total_price.to_decimal(),
            currency: currency.to_string(),
        }
    }
}

/// Render the summary text, falling back to a fixed layout if the template
/// fails.
pub fn render_message(order: &Order, currency: &str) -> String {
    let details = &order.customer_details;
    let lines: Vec<MessageLine> = order
        .cart_items
        .iter()
        .map(|item| MessageLine {
            quantity: item.quantity,
            name: item.product.name.clone(),
            size: item.selected_size.label.clone(),
            addons: item
                .selected_addons
                .iter()
                .map(|addon| addon.label.clone())
                .collect(),
            total: (item.unit_price() * item.quantity).to_string(),
        })
        .collect();
    let change_due = details
        .cash_tendered
        .map(|tendered| tendered.saturating_sub_floor(order.total_price).to_string());

    let mut context = Context::new();
    context.insert("order_number", &order.order_number.value());
    context.insert("name", &details.name);
    context.insert("phone", &details.phone);
    context.insert("mode", details.dining_mode.label());
    context.insert("address", &details.address);
    context.insert("lines", &lines);
    context.insert("total", &order.total_price.to_string());
    context.insert("currency", currency);
    context.insert("change_due", &change_due);

    match Tera::one_off(MESSAGE_TEMPLATE, &context, false) {
        Ok(message) => message,
        Err(err) => {
            log::warn!("Failed to render webhook message: {err}");
            format!(
                "New order #{}\nCustomer: {} ({})\nTotal: {} {}",
                order.order_number.value(),
                details.name,
                details.phone,
                order.total_price,
                currency
            )
        }
    }
}

/// Sink for order notifications.
pub trait OrderNotifier {
    /// Queue `payload` for delivery to `url`. Must not block or fail.
    fn notify(&self, url: &str, payload: WebhookPayload);
}

/// Posts payloads with the actix HTTP client from a spawned task.
#[derive(Clone, Default)]
pub struct WebhookNotifier;

impl WebhookNotifier {
    pub fn new() -> Self {
        Self
    }
}

impl OrderNotifier for WebhookNotifier {
    fn notify(&self, url: &str, payload: WebhookPayload) {
        let url = url.to_string();
        actix_web::rt::spawn(async move {
            let client = awc::Client::default();
            match client.post(url.as_str()).send_json(&payload).await {
                Ok(response) if response.status().is_success() => {
                    log::info!("Webhook delivered for order #{}", payload.order_number);
                }
                Ok(response) => {
                    log::error!(
                        "Webhook for order #{} answered {}",
                        payload.order_number,
                        response.status()
                    );
                }
                Err(err) => {
                    log::error!(
                        "Failed to deliver webhook for order #{}: {err}",
                        payload.order_number
                    );
                }
            }
        });
    }
}
