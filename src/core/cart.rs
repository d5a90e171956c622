//! Staging cart
//!
//! A cart is an unconfirmed selection `item id → {price, amount}` kept in a
//! TTL cache, one entry per session. Prices here are add-time snapshots for
//! display only; orders are always re-priced from the catalog.
//!
//! # Concurrency
//!
//! Every mutation is a read-modify-write against the cache without
//! compare-and-swap. Two concurrent `add_item`/`remove_one_unit` calls on the
//! same session can lose an update. Sessions never interfere with each other.

use crate::core::error::{NotFoundError, ServiceError, ServiceResult, ValidationError};
use crate::core::order::Order;
use crate::core::service::{CartCache, PaymentObserver};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

/// One staged selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartEntry {
    /// Unit price snapshot taken when the item was first added
    pub price: u64,
    /// Always at least 1
    pub amount: u32,
}

/// Mapping of item id to staged entry
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cart {
    entries: BTreeMap<String, CartEntry>,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn get(&self, item_id: &str) -> Option<&CartEntry> {
        self.entries.get(item_id)
    }

    pub fn entries(&self) -> impl Iterator<Item = (&String, &CartEntry)> {
        self.entries.iter()
    }

    /// Add `amount` units; an existing entry keeps its original price
    fn add(&mut self, item_id: String, price: u64, amount: u32) -> Result<(), ValidationError> {
        match self.entries.get_mut(&item_id) {
            Some(entry) => {
                entry.amount =
                    entry
                        .amount
                        .checked_add(amount)
                        .ok_or_else(|| ValidationError::FieldError {
                            field: "amount".to_string(),
                            message: "amount is too large".to_string(),
                        })?;
            }
            None => {
                self.entries.insert(item_id, CartEntry { price, amount });
            }
        }
        Ok(())
    }

    /// Take one unit away, dropping the entry instead of keeping it at 0
    ///
    /// Returns `false` if the item is not in the cart.
    fn remove_one(&mut self, item_id: &str) -> bool {
        let Some(entry) = self.entries.get_mut(item_id) else {
            return false;
        };
        if entry.amount <= 1 {
            self.entries.remove(item_id);
        } else {
            entry.amount -= 1;
        }
        true
    }
}

/// Body of an add-to-cart request
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddCartItem {
    pub item_id: Option<String>,
    pub price: Option<u64>,
    /// Defaults to 1
    pub amount: Option<i64>,
}

impl AddCartItem {
    pub fn new(item_id: impl Into<String>, price: u64, amount: i64) -> Self {
        Self {
            item_id: Some(item_id.into()),
            price: Some(price),
            amount: Some(amount),
        }
    }
}

/// Cart Store operations over a [`CartCache`]
pub struct CartService {
    cache: Arc<dyn CartCache>,
    ttl: Duration,
}

impl CartService {
    pub fn new(cache: Arc<dyn CartCache>, ttl: Duration) -> Self {
        Self { cache, ttl }
    }

    fn key(session: &str) -> String {
        format!("cart:{}", session)
    }

    /// Replace the session's cart with an empty one and restart its TTL
    pub async fn reset(&self, session: &str) -> ServiceResult<Cart> {
        let cart = Cart::new();
        self.cache
            .set(&Self::key(session), cart.clone(), Some(self.ttl))
            .await?;
        tracing::debug!(session, ttl_secs = self.ttl.as_secs(), "cart reset");
        Ok(cart)
    }

    /// Current cart; a missing cart reads as empty
    pub async fn get(&self, session: &str) -> ServiceResult<Cart> {
        Ok(self.cache.get(&Self::key(session)).await?.unwrap_or_default())
    }

    /// Cart if one exists, without defaulting
    pub async fn find(&self, session: &str) -> ServiceResult<Option<Cart>> {
        Ok(self.cache.get(&Self::key(session)).await?)
    }

    pub async fn add_item(&self, session: &str, request: AddCartItem) -> ServiceResult<Cart> {
        let (Some(item_id), Some(price)) = (
            request.item_id.filter(|id| !id.trim().is_empty()),
            request.price,
        ) else {
            return Err(ValidationError::MissingArgument {
                argument: "itemId and price".to_string(),
            }
            .into());
        };
        let amount = request
            .amount
            .unwrap_or(1)
            .try_into()
            .ok()
            .filter(|amount: &u32| *amount > 0)
            .ok_or_else(|| {
                ServiceError::field("amount", "amount must be a positive integer")
            })?;

        let key = Self::key(session);
        let existing = self.cache.get(&key).await?;
        let ttl = if existing.is_some() { None } else { Some(self.ttl) };
        let mut cart = existing.unwrap_or_default();
        cart.add(item_id.clone(), price, amount)?;
        self.cache.set(&key, cart.clone(), ttl).await?;

        tracing::debug!(session, item_id = %item_id, amount, "cart item added");
        Ok(cart)
    }

    pub async fn remove_one_unit(&self, session: &str, item_id: Option<&str>) -> ServiceResult<Cart> {
        let item_id = item_id
            .filter(|id| !id.trim().is_empty())
            .ok_or_else(|| ValidationError::MissingArgument {
                argument: "itemId".to_string(),
            })?;

        let key = Self::key(session);
        let mut cart = self
            .cache
            .get(&key)
            .await?
            .ok_or_else(|| NotFoundError::Cart {
                session: session.to_string(),
            })?;
        if !cart.remove_one(item_id) {
            return Err(NotFoundError::CartItem {
                item_id: item_id.to_string(),
            }
            .into());
        }
        self.cache.set(&key, cart.clone(), None).await?;

        tracing::debug!(session, item_id, "cart unit removed");
        Ok(cart)
    }

    /// Empty the session's cart
    pub async fn clear(&self, session: &str) -> ServiceResult<()> {
        let key = Self::key(session);
        let ttl = match self.cache.get(&key).await? {
            Some(_) => None,
            None => Some(self.ttl),
        };
        self.cache.set(&key, Cart::new(), ttl).await?;
        tracing::debug!(session, "cart cleared");
        Ok(())
    }
}

/// After payment, the cart that fed the order is emptied
#[async_trait]
impl PaymentObserver for CartService {
    async fn on_paid(&self, order: &Order) -> anyhow::Result<()> {
        if let Some(session) = &order.cart_session {
            self.clear(session).await?;
        }
        Ok(())
    }
}
