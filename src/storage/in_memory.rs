//! In-memory implementations of the collaborator traits
//!
//! Useful for testing, demos and single-node deployments. Every store uses
//! an `RwLock` for thread-safe access; nothing survives a restart.

use crate::core::cart::Cart;
use crate::core::catalog::{Item, ItemFilter, Restaurant};
use crate::core::order::Order;
use crate::core::service::{CartCache, Catalog, OrderQuery, OrderStore, Replaced};
use anyhow::{Result, anyhow};
use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};
use uuid::Uuid;

// =============================================================================
// Catalog
// =============================================================================

/// Read-only catalog built from a fixed list of restaurants and items
#[derive(Clone)]
pub struct InMemoryCatalog {
    restaurants: Arc<BTreeMap<String, Restaurant>>,
    items: Arc<BTreeMap<String, Item>>,
}

impl InMemoryCatalog {
    pub fn new(restaurants: Vec<Restaurant>, items: Vec<Item>) -> Self {
        Self {
            restaurants: Arc::new(restaurants.into_iter().map(|r| (r.id.clone(), r)).collect()),
            items: Arc::new(items.into_iter().map(|i| (i.id.clone(), i)).collect()),
        }
    }
}

#[async_trait]
impl Catalog for InMemoryCatalog {
    async fn find_item(&self, id: &str) -> Result<Option<Item>> {
        Ok(self.items.get(id).cloned())
    }

    async fn find_items(&self, filter: &ItemFilter) -> Result<Vec<Item>> {
        Ok(self
            .items
            .values()
            .filter(|item| filter.matches(item))
            .cloned()
            .collect())
    }

    async fn find_restaurant(&self, id: &str) -> Result<Option<Restaurant>> {
        Ok(self.restaurants.get(id).cloned())
    }

    async fn list_restaurants(&self) -> Result<Vec<Restaurant>> {
        Ok(self.restaurants.values().cloned().collect())
    }
}

// =============================================================================
// Orders
// =============================================================================

/// In-memory order store with versioned writes
#[derive(Clone)]
pub struct InMemoryOrderStore {
    orders: Arc<RwLock<HashMap<Uuid, Order>>>,
}

impl InMemoryOrderStore {
    pub fn new() -> Self {
        Self {
            orders: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

impl Default for InMemoryOrderStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl OrderStore for InMemoryOrderStore {
    async fn create(&self, mut order: Order) -> Result<Order> {
        let mut orders = self
            .orders
            .write()
            .map_err(|e| anyhow!("Failed to acquire write lock: {}", e))?;

        if orders.contains_key(&order.id) {
            return Err(anyhow!("Order {} already exists", order.id));
        }
        order.version = 1;
        orders.insert(order.id, order.clone());

        Ok(order)
    }

    async fn find_by_id(&self, id: &Uuid) -> Result<Option<Order>> {
        let orders = self
            .orders
            .read()
            .map_err(|e| anyhow!("Failed to acquire read lock: {}", e))?;

        Ok(orders.get(id).cloned())
    }

    async fn find(&self, query: &OrderQuery) -> Result<Vec<Order>> {
        let orders = self
            .orders
            .read()
            .map_err(|e| anyhow!("Failed to acquire read lock: {}", e))?;

        Ok(orders
            .values()
            .filter(|order| query.matches(order))
            .cloned()
            .collect())
    }

    async fn count(&self, query: &OrderQuery) -> Result<usize> {
        let orders = self
            .orders
            .read()
            .map_err(|e| anyhow!("Failed to acquire read lock: {}", e))?;

        Ok(orders.values().filter(|order| query.matches(order)).count())
    }

    async fn replace(&self, mut order: Order, expected_version: u64) -> Result<Replaced> {
        let mut orders = self
            .orders
            .write()
            .map_err(|e| anyhow!("Failed to acquire write lock: {}", e))?;

        let current = orders
            .get_mut(&order.id)
            .ok_or_else(|| anyhow!("Order {} not found", order.id))?;
        if current.version != expected_version {
            return Ok(Replaced::Stale(current.clone()));
        }

        order.version = expected_version + 1;
        *current = order.clone();

        Ok(Replaced::Committed(order))
    }
}

// =============================================================================
// Cart cache
// =============================================================================

struct CachedCart {
    cart: Cart,
    expires_at: Option<Instant>,
}

impl CachedCart {
    fn is_live(&self, now: Instant) -> bool {
        self.expires_at.is_none_or(|deadline| now < deadline)
    }
}

/// Key/value cart cache with per-entry expiry
///
/// Expired entries are dropped lazily on access.
#[derive(Clone)]
pub struct InMemoryCartCache {
    entries: Arc<RwLock<HashMap<String, CachedCart>>>,
}

impl InMemoryCartCache {
    pub fn new() -> Self {
        Self {
            entries: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

impl Default for InMemoryCartCache {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CartCache for InMemoryCartCache {
    async fn get(&self, key: &str) -> Result<Option<Cart>> {
        let mut entries = self
            .entries
            .write()
            .map_err(|e| anyhow!("Failed to acquire write lock: {}", e))?;

        let now = Instant::now();
        if entries.get(key).is_some_and(|entry| !entry.is_live(now)) {
            entries.remove(key);
        }

        Ok(entries.get(key).map(|entry| entry.cart.clone()))
    }

    async fn set(&self, key: &str, cart: Cart, ttl: Option<Duration>) -> Result<()> {
        let mut entries = self
            .entries
            .write()
            .map_err(|e| anyhow!("Failed to acquire write lock: {}", e))?;

        let now = Instant::now();
        let expires_at = match ttl {
            Some(ttl) => Some(now + ttl),
            None => entries
                .get(key)
                .filter(|entry| entry.is_live(now))
                .and_then(|entry| entry.expires_at),
        };
        entries.insert(key.to_string(), CachedCart { cart, expires_at });

        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        let mut entries = self
            .entries
            .write()
            .map_err(|e| anyhow!("Failed to acquire write lock: {}", e))?;

        entries.remove(key);

        Ok(())
    }
}
