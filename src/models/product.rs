use diesel::prelude::*;

use crate::domain::money::Money;
use crate::domain::product::Product as DomainProduct;
use crate::models::{decode_json, encode_json};

#[derive(Debug, Clone, Identifiable, Queryable, Selectable, Insertable)]
#[diesel(table_name = crate::schema::products)]
pub struct Product {
    pub id: String,
    pub name: String,
    pub price_cents: i64,
    pub category_id: String,
    pub description: String,
    pub image: Option<String>,
    pub is_bestseller: bool,
    pub is_available: bool,
    pub is_vegetarian: bool,
    pub sizes: String,
    pub addons: String,
    pub position: i32,
}

impl Product {
    /// Row for `product` listed at `position` within the catalog.
    pub fn from_domain(product: &DomainProduct, position: usize) -> Self {
        Self {
            id: product.id.clone(),
            name: product.name.clone(),
            price_cents: product.price.cents(),
            category_id: product.category_id.clone(),
            description: product.description.clone(),
            image: product.image.clone(),
            is_bestseller: product.is_bestseller,
            is_available: product.is_available,
            is_vegetarian: product.is_vegetarian,
            sizes: encode_json(&product.sizes, "products.sizes"),
            addons: encode_json(&product.addons, "products.addons"),
            position: i32::try_from(position).unwrap_or(i32::MAX),
        }
    }
}

impl From<Product> for DomainProduct {
    fn from(value: Product) -> Self {
        Self {
            id: value.id,
            name: value.name,
            price: Money::from_cents(value.price_cents),
            image: value.image,
            category_id: value.category_id,
            description: value.description,
            is_bestseller: value.is_bestseller,
            is_available: value.is_available,
            is_vegetarian: value.is_vegetarian,
            sizes: decode_json(&value.sizes, "products.sizes"),
            addons: decode_json(&value.addons, "products.addons"),
        }
    }
}
