use serde::{Deserialize, Serialize};

use crate::domain::product::Product;

/// Virtual category that lists bestseller products.
pub const RECOMMENDED_CATEGORY_ID: &str = "RECOMMENDED";

/// Menu section grouping products.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    /// Stable identifier referenced by products.
    pub id: String,
    /// Text shown on the category tab.
    pub label: String,
    /// Emoji or glyph shown next to the label.
    pub icon: String,
    /// Optional background image reference.
    #[serde(default)]
    pub background_image: Option<String>,
}

impl Category {
    pub fn new(id: impl Into<String>, label: impl Into<String>, icon: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            icon: icon.into(),
            background_image: None,
        }
    }
}

/// Filter applied when browsing the menu.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MenuQuery {
    /// Selected category. `RECOMMENDED` lists bestsellers.
    pub category: Option<String>,
    /// Free text search. When non-empty it overrides the category filter.
    pub search: Option<String>,
}

impl MenuQuery {
    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn search(mut self, term: impl Into<String>) -> Self {
        self.search = Some(term.into());
        self
    }

    /// Apply the query to `products`, hiding unavailable entries.
    pub fn apply<'a>(&self, products: &'a [Product]) -> Vec<&'a Product> {
        let available = products.iter().filter(|product| product.is_available);

        if let Some(term) = self.search.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
            return available
                .filter(|product| product.matches_search(term))
                .collect();
        }

        match self.category.as_deref() {
            None => available.collect(),
            Some(RECOMMENDED_CATEGORY_ID) => available
                .filter(|product| product.is_bestseller)
                .collect(),
            Some(category_id) => available
                .filter(|product| product.category_id == category_id)
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::money::Money;

    fn catalog() -> Vec<Product> {
        vec![
            Product::new("b1", "Zinger", Money::from_cents(2195), "BURGERS")
                .with_description("Spicy")
                .bestseller(),
            Product::new("b2", "Halloumi Burger", Money::from_cents(1695), "BURGERS"),
            Product::new("d1", "Cola", Money::from_cents(700), "DRINKS"),
            Product::new("d2", "Lemonade", Money::from_cents(700), "DRINKS").unavailable(),
        ]
    }

    fn ids(products: Vec<&Product>) -> Vec<&str> {
        products.iter().map(|product| product.id.as_str()).collect()
    }

    #[test]
    fn recommended_lists_bestsellers() {
        let products = catalog();
        let query = MenuQuery::default().category(RECOMMENDED_CATEGORY_ID);
        assert_eq!(ids(query.apply(&products)), vec!["b1"]);
    }

    #[test]
    fn category_filter_hides_unavailable_products() {
        let products = catalog();
        let query = MenuQuery::default().category("DRINKS");
        assert_eq!(ids(query.apply(&products)), vec!["d1"]);
    }

    #[test]
    fn search_overrides_category() {
        let products = catalog();
        let query = MenuQuery::default().category("DRINKS").search("burger");
        assert_eq!(ids(query.apply(&products)), vec!["b2"]);
    }

    #[test]
    fn blank_search_falls_back_to_category() {
        let products = catalog();
        let query = MenuQuery::default().category("BURGERS").search("   ");
        assert_eq!(ids(query.apply(&products)), vec!["b1", "b2"]);
    }
}
