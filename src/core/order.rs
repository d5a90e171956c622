//! Order aggregate, lifecycle status and payment method

use crate::core::error::{ServiceError, StateError, ValidationError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Lifecycle status of an order
///
/// The order core drives only `DRAFT → CREATED → PAID` and cancellation of
/// unpaid orders. `PREPARING`, `READY` and `COMPLETED` belong to fulfillment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    Draft,
    Created,
    Paid,
    Preparing,
    Ready,
    Completed,
    Cancelled,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 7] = [
        OrderStatus::Draft,
        OrderStatus::Created,
        OrderStatus::Paid,
        OrderStatus::Preparing,
        OrderStatus::Ready,
        OrderStatus::Completed,
        OrderStatus::Cancelled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Draft => "DRAFT",
            OrderStatus::Created => "CREATED",
            OrderStatus::Paid => "PAID",
            OrderStatus::Preparing => "PREPARING",
            OrderStatus::Ready => "READY",
            OrderStatus::Completed => "COMPLETED",
            OrderStatus::Cancelled => "CANCELLED",
        }
    }

    /// Transitions the lifecycle engine may perform
    pub fn can_transition_to(self, next: OrderStatus) -> bool {
        matches!(
            (self, next),
            (OrderStatus::Draft, OrderStatus::Created)
                | (OrderStatus::Created, OrderStatus::Paid)
                | (OrderStatus::Draft, OrderStatus::Cancelled)
                | (OrderStatus::Created, OrderStatus::Cancelled)
        )
    }

    /// Statuses an order reaches once it has been paid
    pub fn has_progressed_past_payment(self) -> bool {
        matches!(
            self,
            OrderStatus::Paid | OrderStatus::Preparing | OrderStatus::Ready | OrderStatus::Completed
        )
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OrderStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| ValidationError::InvalidStatus {
                value: s.to_string(),
            })
    }
}

/// How the customer paid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    Cash,
    Card,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "cash",
            PaymentMethod::Card => "card",
        }
    }
}

impl FromStr for PaymentMethod {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "cash" => Ok(PaymentMethod::Cash),
            "card" => Ok(PaymentMethod::Card),
            other => Err(ValidationError::InvalidPaymentMethod {
                value: other.to_string(),
            }),
        }
    }
}

/// One priced line of an order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub item_id: String,
    pub quantity: u32,
    pub item_total_price: u64,
}

/// The order aggregate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: Uuid,
    pub items: Vec<OrderItem>,
    pub total_price: u64,
    pub status: OrderStatus,
    /// When the order became real: creation, or re-stamped at checkout
    pub order_date: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_method: Option<PaymentMethod>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pickup_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub paid_at: Option<DateTime<Utc>>,
    /// Cart session whose contents were attached to this order
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cart_session: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Optimistic concurrency token, bumped by the store on every write
    #[serde(skip)]
    pub version: u64,
}

impl Order {
    /// An empty draft with no items and zero total
    pub fn draft(now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            items: Vec::new(),
            total_price: 0,
            status: OrderStatus::Draft,
            order_date: now,
            payment_method: None,
            pickup_number: None,
            paid_at: None,
            cart_session: None,
            created_at: now,
            updated_at: now,
            version: 0,
        }
    }

    /// A priced order that skipped the draft stage
    pub fn created(items: Vec<OrderItem>, now: DateTime<Utc>) -> Result<Self, ValidationError> {
        let mut order = Self::draft(now);
        order.status = OrderStatus::Created;
        order.set_items(items)?;
        Ok(order)
    }

    /// Replace the line items and recompute the total from them
    ///
    /// Leaves the order untouched if the total does not fit in a `u64`.
    pub fn set_items(&mut self, items: Vec<OrderItem>) -> Result<(), ValidationError> {
        let total_price = line_total(&items).ok_or_else(|| ValidationError::FieldError {
            field: "items".to_string(),
            message: "order total is too large".to_string(),
        })?;
        self.items = items;
        self.total_price = total_price;
        Ok(())
    }

    /// `total_price` equals the sum of the line totals
    pub fn total_is_consistent(&self) -> bool {
        line_total(&self.items) == Some(self.total_price)
    }

    /// Guard a transition without applying it
    pub fn ensure_can_transition(
        &self,
        next: OrderStatus,
        action: &'static str,
    ) -> Result<(), StateError> {
        if self.status.can_transition_to(next) {
            Ok(())
        } else {
            Err(StateError::InvalidTransition {
                order_id: self.id,
                action,
                current: self.status,
            })
        }
    }

    /// Apply a transition allowed by the transition table
    pub fn transition(
        &mut self,
        next: OrderStatus,
        action: &'static str,
        now: DateTime<Utc>,
    ) -> Result<(), StateError> {
        self.ensure_can_transition(next, action)?;
        self.status = next;
        self.updated_at = now;
        Ok(())
    }
}

fn line_total(items: &[OrderItem]) -> Option<u64> {
    items
        .iter()
        .try_fold(0u64, |total, item| total.checked_add(item.item_total_price))
}

/// A client-declared order line, before validation
///
/// Any client-supplied price is ignored: totals always come from the catalog.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderLineRequest {
    pub item_id: Option<String>,
    pub quantity: Option<i64>,
}

impl OrderLineRequest {
    pub fn new(item_id: impl Into<String>, quantity: i64) -> Self {
        Self {
            item_id: Some(item_id.into()),
            quantity: Some(quantity),
        }
    }

    /// Check presence and positivity, yielding a line ready for pricing
    pub fn into_selection(self) -> Result<LineSelection, ValidationError> {
        let item_id = self
            .item_id
            .filter(|id| !id.trim().is_empty())
            .ok_or_else(|| ValidationError::FieldError {
                field: "itemId".to_string(),
                message: "Each item must have itemId and quantity".to_string(),
            })?;
        let quantity = self.quantity.ok_or_else(|| ValidationError::FieldError {
            field: "quantity".to_string(),
            message: "Each item must have itemId and quantity".to_string(),
        })?;
        let quantity = u32::try_from(quantity)
            .ok()
            .filter(|q| *q > 0)
            .ok_or_else(|| ValidationError::FieldError {
                field: "quantity".to_string(),
                message: "Quantity must be greater than 0".to_string(),
            })?;

        Ok(LineSelection { item_id, quantity })
    }
}

/// A validated `(item, quantity)` pair awaiting catalog pricing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineSelection {
    pub item_id: String,
    pub quantity: u32,
}

impl From<&OrderItem> for LineSelection {
    fn from(item: &OrderItem) -> Self {
        Self {
            item_id: item.item_id.clone(),
            quantity: item.quantity,
        }
    }
}

/// Parse an order identifier, distinguishing bad format from absence
pub fn parse_order_id(value: &str) -> Result<Uuid, ServiceError> {
    Uuid::parse_str(value).map_err(|_| {
        ServiceError::Validation(ValidationError::InvalidId {
            value: value.to_string(),
        })
    })
}
