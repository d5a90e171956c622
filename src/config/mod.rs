//! Configuration loading and management
//!
//! Every section has defaults, so an empty YAML document is a valid
//! configuration that serves the built-in demo menu on `127.0.0.1:3000`.

use crate::core::catalog::{Item, Restaurant};
use crate::core::error::{ConfigError, ServiceResult};
use chrono::FixedOffset;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use std::time::Duration;

/// Listening address
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
        }
    }
}

impl ServerConfig {
    /// `host:port`
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Staging cart settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CartConfig {
    /// Lifetime of a freshly created cart
    pub ttl_secs: u64,

    /// Session used when a request carries no `x-cart-session` header
    pub default_session: String,
}

impl Default for CartConfig {
    fn default() -> Self {
        Self {
            ttl_secs: 86_400,
            default_session: "default".to_string(),
        }
    }
}

impl CartConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }
}

/// Where calendar days begin
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CalendarConfig {
    /// Offset of the restaurant's local time from UTC, in minutes
    pub utc_offset_minutes: i32,
}

/// Sales report settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// Count orders past PAID (PREPARING, READY, COMPLETED) as sold
    pub include_fulfilled: bool,
}

/// Reference data served by the in-memory catalog
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    pub restaurants: Vec<Restaurant>,
    pub items: Vec<Item>,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        demo_menu()
    }
}

/// Complete configuration of the pickup service
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    pub server: ServerConfig,
    pub cart: CartConfig,
    pub calendar: CalendarConfig,
    pub report: ReportConfig,
    pub catalog: CatalogConfig,
}

impl ServiceConfig {
    /// Load and validate configuration from a YAML file
    pub fn from_yaml_file(path: impl AsRef<Path>) -> ServiceResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_yaml::from_str(&content).map_err(|e| ConfigError::ParseError {
            file: Some(path.display().to_string()),
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate configuration from a YAML string
    pub fn from_yaml_str(yaml: &str) -> ServiceResult<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Create a default configuration with the demo menu
    pub fn default_config() -> Self {
        Self::default()
    }

    /// Fixed offset for day boundaries
    pub fn offset(&self) -> Result<FixedOffset, ConfigError> {
        self.calendar
            .utc_offset_minutes
            .checked_mul(60)
            .and_then(FixedOffset::east_opt)
            .ok_or_else(|| ConfigError::InvalidValue {
                field: "calendar.utc_offset_minutes".to_string(),
                value: self.calendar.utc_offset_minutes.to_string(),
                message: "offset must lie strictly within ±24 hours".to_string(),
            })
    }

    /// Check the values serde cannot check
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(invalid("server.port", "0", "port must be non-zero"));
        }
        if self.cart.ttl_secs == 0 {
            return Err(invalid("cart.ttl_secs", "0", "cart ttl must be positive"));
        }
        if self.cart.default_session.trim().is_empty() {
            return Err(invalid(
                "cart.default_session",
                &self.cart.default_session,
                "default session must not be blank",
            ));
        }
        self.offset()?;

        let restaurants: HashSet<&str> = self
            .catalog
            .restaurants
            .iter()
            .map(|r| r.id.as_str())
            .collect();
        let mut seen = HashSet::new();
        for item in &self.catalog.items {
            if !seen.insert(item.id.as_str()) {
                return Err(invalid("catalog.items.id", &item.id, "duplicate item id"));
            }
            if !restaurants.contains(item.restaurant_id.as_str()) {
                return Err(invalid(
                    "catalog.items.restaurantId",
                    &item.restaurant_id,
                    "item references an undeclared restaurant",
                ));
            }
        }
        Ok(())
    }
}

fn invalid(field: &str, value: &str, message: &str) -> ConfigError {
    ConfigError::InvalidValue {
        field: field.to_string(),
        value: value.to_string(),
        message: message.to_string(),
    }
}

/// Five restaurants with five items each
fn demo_menu() -> CatalogConfig {
    let restaurant = |id: &str, name: &str| Restaurant {
        id: id.to_string(),
        name: name.to_string(),
    };
    let item = |id: &str, name: &str, price: u64, item_type: &str| Item {
        id: id.to_string(),
        name: name.to_string(),
        price,
        item_type: item_type.to_string(),
        restaurant_id: id.split('-').next().unwrap_or_default().to_string(),
    };

    CatalogConfig {
        restaurants: vec![
            restaurant("mcd", "McDonald's"),
            restaurant("kfc", "KFC"),
            restaurant("85c", "85°C Bakery Cafe"),
            restaurant("lunch", "A-Hua Bento"),
            restaurant("tea", "Tea Soup House"),
        ],
        items: vec![
            item("mcd-001", "Big Mac", 139, "food"),
            item("mcd-002", "McChicken", 99, "food"),
            item("mcd-003", "Large Fries", 65, "food"),
            item("mcd-004", "Coca-Cola (M)", 35, "drink"),
            item("mcd-005", "Vanilla Shake", 55, "drink"),
            item("kfc-001", "Spicy Chicken Burger", 119, "food"),
            item("kfc-002", "Original Recipe Chicken", 89, "food"),
            item("kfc-003", "Nuggets", 79, "food"),
            item("kfc-004", "Pepsi", 30, "drink"),
            item("kfc-005", "Egg Tart", 25, "dessert"),
            item("85c-001", "Sea Salt Coffee", 45, "drink"),
            item("85c-002", "Bubble Milk Tea", 55, "drink"),
            item("85c-003", "Taro Cake", 85, "dessert"),
            item("85c-004", "Ham & Egg Toast", 65, "food"),
            item("85c-005", "Brownie", 70, "dessert"),
            item("lunch-001", "Pork Chop Bento", 100, "food"),
            item("lunch-002", "Chicken Leg Bento", 110, "food"),
            item("lunch-003", "Braised Pork Bento", 90, "food"),
            item("lunch-004", "Black Tea", 15, "drink"),
            item("lunch-005", "Miso Soup", 20, "drink"),
            item("tea-001", "Brown Sugar Boba Milk", 70, "drink"),
            item("tea-002", "Oolong Latte", 65, "drink"),
            item("tea-003", "Mango Green Tea", 60, "drink"),
            item("tea-004", "Honey Lemon Tea", 55, "drink"),
            item("tea-005", "Taro Sago", 75, "drink"),
        ],
    }
}
