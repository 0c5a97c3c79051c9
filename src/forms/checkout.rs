use serde::Deserialize;
use thiserror::Error;
use validator::{Validate, ValidationErrors};

use crate::domain::cart::{CartTarget, REMOVE_ENTIRELY};
use crate::domain::money::{Money, MoneyParseError};
use crate::domain::session::{DiningMode, UserDetails};
use crate::forms::{sanitize_inline, sanitize_optional};

/// Largest quantity accepted in a single add-to-cart request.
const MAX_ADD_QUANTITY: u32 = 99;

const NAME_MAX_LEN: u64 = 64;
const PHONE_MAX_LEN: u64 = 32;
const ADDRESS_MAX_LEN: u64 = 256;
const HANDLE_MAX_LEN: u64 = 64;

pub type CheckoutFormResult<T> = Result<T, CheckoutFormError>;

#[derive(Debug, Error)]
pub enum CheckoutFormError {
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationErrors),
    #[error("invalid cash amount: {0}")]
    InvalidCash(#[from] MoneyParseError),
    #[error("cash amount cannot be negative")]
    NegativeCash,
}

fn default_quantity() -> u32 {
    1
}

/// Product selection sent from the product detail screen.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AddToCartForm {
    #[validate(length(min = 1))]
    pub product_id: String,
    #[serde(default = "default_quantity")]
    #[validate(range(min = 1, max = MAX_ADD_QUANTITY))]
    pub quantity: u32,
    /// Size label. The product's first size is used when absent.
    #[serde(default)]
    pub size: Option<String>,
    #[serde(default)]
    pub addons: Vec<String>,
}

impl AddToCartForm {
    pub fn sanitized(self) -> CheckoutFormResult<Self> {
        self.validate()?;
        Ok(Self {
            product_id: self.product_id.trim().to_string(),
            quantity: self.quantity,
            size: sanitize_optional(self.size.as_deref()),
            addons: self
                .addons
                .iter()
                .map(|label| sanitize_inline(label))
                .filter(|label| !label.is_empty())
                .collect(),
        })
    }
}

/// Quantity adjustment from the cart screen.
///
/// `id` is a product id or `"ALL"`; `index` narrows the change to one line.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateQuantityForm {
    #[validate(length(min = 1))]
    pub id: String,
    #[validate(range(min = REMOVE_ENTIRELY, max = 99))]
    pub delta: i64,
    #[serde(default)]
    pub index: Option<usize>,
}

impl UpdateQuantityForm {
    pub fn into_target(self) -> CheckoutFormResult<(CartTarget, i64)> {
        self.validate()?;
        Ok((CartTarget::from_wire(self.id.trim(), self.index), self.delta))
    }
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiningModeForm {
    pub dining_mode: DiningMode,
}

/// Contact details entered on the user details screen.
///
/// Blank required fields are not an error here; they keep the checkout from
/// advancing instead.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UserDetailsForm {
    #[serde(default)]
    #[validate(length(max = NAME_MAX_LEN))]
    pub name: String,
    #[serde(default)]
    #[validate(length(max = PHONE_MAX_LEN))]
    pub phone: String,
    #[serde(default)]
    #[validate(length(max = ADDRESS_MAX_LEN))]
    pub address: String,
    /// Cash handed over on delivery, as typed by the customer.
    #[serde(default)]
    pub cash_tendered: Option<String>,
    #[serde(default)]
    #[validate(length(max = HANDLE_MAX_LEN))]
    pub platform: Option<String>,
    #[serde(default)]
    #[validate(length(max = HANDLE_MAX_LEN))]
    pub telegram_username: Option<String>,
}

impl UserDetailsForm {
    /// Sanitize into domain details. The dining mode is owned by the session
    /// and left at its default here.
    pub fn into_details(self) -> CheckoutFormResult<UserDetails> {
        self.validate()?;

        let cash_tendered = match self.cash_tendered.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(raw) => {
                let amount = Money::parse(raw)?;
                if amount.is_negative() {
                    return Err(CheckoutFormError::NegativeCash);
                }
                Some(amount)
            }
        };

        Ok(UserDetails {
            name: sanitize_inline(&self.name),
            phone: sanitize_inline(&self.phone),
            address: sanitize_inline(&self.address),
            dining_mode: DiningMode::default(),
            cash_tendered,
            platform: sanitize_optional(self.platform.as_deref()),
            telegram_username: sanitize_optional(self.telegram_username.as_deref()),
        })
    }
}
