//! Collaborator traits consumed by the order core
//!
//! Implementations provide storage for orders, the catalog and the staging
//! cart cache. The core is agnostic to the underlying backend; failures are
//! reported through `anyhow` and surface as dependency errors.

use crate::core::calendar::DayWindow;
use crate::core::cart::Cart;
use crate::core::catalog::{Item, ItemFilter, Restaurant};
use crate::core::order::{Order, OrderStatus};
use anyhow::Result;
use async_trait::async_trait;
use std::time::Duration;
use uuid::Uuid;

/// Read-only source of item and restaurant data
#[async_trait]
pub trait Catalog: Send + Sync {
    /// Look up an item by its external id
    async fn find_item(&self, id: &str) -> Result<Option<Item>>;

    /// Items matching a filter, ordered by id
    async fn find_items(&self, filter: &ItemFilter) -> Result<Vec<Item>>;

    async fn find_restaurant(&self, id: &str) -> Result<Option<Restaurant>>;

    async fn list_restaurants(&self) -> Result<Vec<Restaurant>>;
}

/// Which timestamp an [`OrderQuery`] window applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateField {
    OrderDate,
    PaidAt,
}

/// Filter for `OrderStore::find` and `OrderStore::count`
#[derive(Debug, Clone, Default)]
pub struct OrderQuery {
    pub window: Option<(DateField, DayWindow)>,
    /// Empty means any status
    pub statuses: Vec<OrderStatus>,
}

impl OrderQuery {
    pub fn placed_within(window: DayWindow) -> Self {
        Self {
            window: Some((DateField::OrderDate, window)),
            statuses: Vec::new(),
        }
    }

    pub fn paid_within(window: DayWindow) -> Self {
        Self {
            window: Some((DateField::PaidAt, window)),
            statuses: Vec::new(),
        }
    }

    pub fn with_statuses(mut self, statuses: impl IntoIterator<Item = OrderStatus>) -> Self {
        self.statuses = statuses.into_iter().collect();
        self
    }

    pub fn matches(&self, order: &Order) -> bool {
        let in_window = match &self.window {
            None => true,
            Some((DateField::OrderDate, window)) => window.contains(order.order_date),
            Some((DateField::PaidAt, window)) => order.paid_at.is_some_and(|t| window.contains(t)),
        };
        in_window && (self.statuses.is_empty() || self.statuses.contains(&order.status))
    }
}

/// Outcome of a versioned write
#[derive(Debug, Clone)]
pub enum Replaced {
    /// The write committed; carries the stored order with its new version
    Committed(Order),
    /// Someone else wrote first; carries the current stored order
    Stale(Order),
}

/// Durable home of order records
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Insert a new order
    async fn create(&self, order: Order) -> Result<Order>;

    async fn find_by_id(&self, id: &Uuid) -> Result<Option<Order>>;

    /// Orders matching the query, in no particular order
    async fn find(&self, query: &OrderQuery) -> Result<Vec<Order>>;

    async fn count(&self, query: &OrderQuery) -> Result<usize>;

    /// Write `order` only if the stored version still equals `expected_version`
    ///
    /// Errors if the order does not exist.
    async fn replace(&self, order: Order, expected_version: u64) -> Result<Replaced>;
}

/// Key/value cache holding staging carts with a time-to-live
#[async_trait]
pub trait CartCache: Send + Sync {
    /// Current value, `None` if absent or expired
    async fn get(&self, key: &str) -> Result<Option<Cart>>;

    /// Store a value; `Some(ttl)` restarts the expiry, `None` keeps the
    /// existing one (an entry created without ttl never expires)
    async fn set(&self, key: &str, cart: Cart, ttl: Option<Duration>) -> Result<()>;

    async fn delete(&self, key: &str) -> Result<()>;
}

/// Hook invoked after a payment commits
#[async_trait]
pub trait PaymentObserver: Send + Sync {
    async fn on_paid(&self, order: &Order) -> Result<()>;
}
