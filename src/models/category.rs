use diesel::prelude::*;

use crate::domain::category::Category as DomainCategory;

#[derive(Debug, Clone, Identifiable, Queryable, Selectable, Insertable)]
#[diesel(table_name = crate::schema::categories)]
pub struct Category {
    pub id: String,
    pub label: String,
    pub icon: String,
    pub background_image: Option<String>,
    pub position: i32,
}

impl Category {
    /// Row for `category` shown at `position` in the menu.
    pub fn from_domain(category: &DomainCategory, position: usize) -> Self {
        Self {
            id: category.id.clone(),
            label: category.label.clone(),
            icon: category.icon.clone(),
            background_image: category.background_image.clone(),
            position: i32::try_from(position).unwrap_or(i32::MAX),
        }
    }
}

impl From<Category> for DomainCategory {
    fn from(value: Category) -> Self {
        Self {
            id: value.id,
            label: value.label,
            icon: value.icon,
            background_image: value.background_image,
        }
    }
}
