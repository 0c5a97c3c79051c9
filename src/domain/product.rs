use serde::{Deserialize, Serialize};

use crate::domain::money::Money;

/// Label used for the implicit size of products that define no sizes.
pub const DEFAULT_SIZE_LABEL: &str = "Regular";

/// Selectable size of a product with its additive price delta.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, Hash)]
pub struct SizeOption {
    pub label: String,
    /// Delta added to the base price. Negative deltas are allowed.
    pub price: Money,
}

impl SizeOption {
    pub fn new(label: impl Into<String>, price: Money) -> Self {
        Self {
            label: label.into(),
            price,
        }
    }
}

/// Optional extra that can be added to a product.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, Hash)]
pub struct AddonOption {
    pub label: String,
    /// Delta added to the base price. Negative deltas are allowed.
    pub price: Money,
}

impl AddonOption {
    pub fn new(label: impl Into<String>, price: Money) -> Self {
        Self {
            label: label.into(),
            price,
        }
    }
}

/// Catalog entry that customers can order.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Stable identifier chosen by the admin.
    pub id: String,
    pub name: String,
    /// Base price before size and add-on deltas.
    pub price: Money,
    #[serde(default)]
    pub image: Option<String>,
    /// Identifier of the owning category.
    pub category_id: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub is_bestseller: bool,
    #[serde(default = "default_true")]
    pub is_available: bool,
    #[serde(default)]
    pub is_vegetarian: bool,
    /// Ordered size options. The first one is the default selection.
    #[serde(default)]
    pub sizes: Vec<SizeOption>,
    #[serde(default)]
    pub addons: Vec<AddonOption>,
}

fn default_true() -> bool {
    true
}

impl Product {
    /// Build an available product without sizes or add-ons.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        price: Money,
        category_id: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            price,
            image: None,
            category_id: category_id.into(),
            description: String::new(),
            is_bestseller: false,
            is_available: true,
            is_vegetarian: false,
            sizes: Vec::new(),
            addons: Vec::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_sizes(mut self, sizes: Vec<SizeOption>) -> Self {
        self.sizes = sizes;
        self
    }

    pub fn with_addons(mut self, addons: Vec<AddonOption>) -> Self {
        self.addons = addons;
        self
    }

    pub fn bestseller(mut self) -> Self {
        self.is_bestseller = true;
        self
    }

    pub fn vegetarian(mut self) -> Self {
        self.is_vegetarian = true;
        self
    }

    pub fn unavailable(mut self) -> Self {
        self.is_available = false;
        self
    }

    /// The size selected when the customer does not pick one.
    pub fn default_size(&self) -> SizeOption {
        self.sizes
            .first()
            .cloned()
            .unwrap_or_else(|| SizeOption::new(DEFAULT_SIZE_LABEL, Money::ZERO))
    }

    /// Resolve a size by label. `None` selects the default size.
    pub fn resolve_size(&self, label: Option<&str>) -> Option<SizeOption> {
        match label {
            None => Some(self.default_size()),
            Some(label) if self.sizes.is_empty() && label == DEFAULT_SIZE_LABEL => {
                Some(self.default_size())
            }
            Some(label) => self.sizes.iter().find(|size| size.label == label).cloned(),
        }
    }

    /// Resolve add-ons by label, dropping duplicate labels. Returns the first
    /// label that does not exist on the product as the error.
    pub fn resolve_addons<'a, I>(&self, labels: I) -> Result<Vec<AddonOption>, String>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut selected: Vec<AddonOption> = Vec::new();
        for label in labels {
            let Some(addon) = self.addons.iter().find(|addon| addon.label == label) else {
                return Err(label.to_string());
            };
            if !selected.iter().any(|existing| existing.label == addon.label) {
                selected.push(addon.clone());
            }
        }
        Ok(selected)
    }

    /// Case-insensitive match against name and description.
    pub fn matches_search(&self, term: &str) -> bool {
        let term = term.to_lowercase();
        self.name.to_lowercase().contains(&term) || self.description.to_lowercase().contains(&term)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn burger() -> Product {
        Product::new("b1", "Zinger", Money::from_cents(2195), "BURGERS")
            .with_description("The spicy classic")
            .with_sizes(vec![
                SizeOption::new("Regular", Money::ZERO),
                SizeOption::new("Large", Money::from_cents(200)),
            ])
            .with_addons(vec![
                AddonOption::new("Cheese", Money::from_cents(100)),
                AddonOption::new("Bacon", Money::from_cents(150)),
            ])
    }

    #[test]
    fn default_size_is_first_or_implicit_regular() {
        assert_eq!(burger().default_size().label, "Regular");

        let plain = Product::new("d1", "Cola", Money::from_cents(700), "DRINKS");
        let size = plain.default_size();
        assert_eq!(size.label, DEFAULT_SIZE_LABEL);
        assert_eq!(size.price, Money::ZERO);
        assert!(plain.resolve_size(Some(DEFAULT_SIZE_LABEL)).is_some());
    }

    #[test]
    fn resolve_size_rejects_unknown_label() {
        let product = burger();
        assert_eq!(
            product.resolve_size(Some("Large")).map(|size| size.price),
            Some(Money::from_cents(200))
        );
        assert!(product.resolve_size(Some("Huge")).is_none());
    }

    #[test]
    fn resolve_addons_drops_duplicates_and_reports_unknown() {
        let product = burger();
        let addons = product
            .resolve_addons(["Cheese", "Cheese", "Bacon"])
            .expect("known add-ons");
        assert_eq!(addons.len(), 2);

        assert_eq!(
            product.resolve_addons(["Cheese", "Pickles"]),
            Err("Pickles".to_string())
        );
    }

    #[test]
    fn search_is_case_insensitive_over_name_and_description() {
        let product = burger();
        assert!(product.matches_search("zING"));
        assert!(product.matches_search("spicy"));
        assert!(!product.matches_search("halloumi"));
    }
}
