//! Catalog reference data: items and restaurants
//!
//! The order core only ever reads these records. Prices found here are the
//! authority for every order total.

use serde::{Deserialize, Serialize};

/// A menu item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    /// Externally assigned, unique (e.g. `mcd-001`)
    pub id: String,
    pub name: String,
    pub price: u64,
    /// Category tag such as `food`, `drink` or `dessert`
    #[serde(rename = "type", default)]
    pub item_type: String,
    pub restaurant_id: String,
}

/// A restaurant; its items are joined through `Item::restaurant_id`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Restaurant {
    pub id: String,
    pub name: String,
}

/// Name and price of a menu line, as listed on the restaurant overview
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MenuLine {
    pub name: String,
    pub price: u64,
}

/// A restaurant together with its menu
#[derive(Debug, Clone, Serialize)]
pub struct RestaurantMenu<T> {
    pub id: String,
    pub name: String,
    pub items: Vec<T>,
}

impl RestaurantMenu<Item> {
    /// Join a restaurant with its items
    pub fn new(restaurant: Restaurant, items: Vec<Item>) -> Self {
        Self {
            id: restaurant.id,
            name: restaurant.name,
            items,
        }
    }

    /// Reduce to the `{name, price}` overview form
    pub fn overview(self) -> RestaurantMenu<MenuLine> {
        RestaurantMenu {
            id: self.id,
            name: self.name,
            items: self
                .items
                .into_iter()
                .map(|item| MenuLine {
                    name: item.name,
                    price: item.price,
                })
                .collect(),
        }
    }
}

/// Criteria for `Catalog::find_items`; `None` fields match everything
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemFilter {
    pub restaurant_id: Option<String>,
    pub item_type: Option<String>,
}

impl ItemFilter {
    pub fn restaurant(restaurant_id: impl Into<String>) -> Self {
        Self {
            restaurant_id: Some(restaurant_id.into()),
            item_type: None,
        }
    }

    pub fn with_type(mut self, item_type: impl Into<String>) -> Self {
        self.item_type = Some(item_type.into());
        self
    }

    pub fn matches(&self, item: &Item) -> bool {
        self.restaurant_id
            .as_deref()
            .is_none_or(|rid| item.restaurant_id == rid)
            && self
                .item_type
                .as_deref()
                .is_none_or(|t| item.item_type == t)
    }
}
