//! # Pickup
//!
//! Backend for walk-up food ordering: customers build a cart, check out into
//! an order, pay, and receive a same-day pickup number; staff pull daily
//! sales reports.
//!
//! ## Features
//!
//! - **Lifecycle Engine**: closed `OrderStatus` enum with an explicit transition table
//! - **Server-side Pricing**: every total is recomputed from the catalog
//! - **Pickup Numbers**: gapless `001`, `002`, … per calendar day, allocated atomically
//! - **Per-session Carts**: TTL-backed staging carts keyed by `x-cart-session`
//! - **Sales Reports**: units sold per item and day, exported as xlsx
//! - **Configuration-Based**: server, calendar, cart and menu in one YAML file
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use pickup::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     ServerBuilder::new()
//!         .with_config(ServiceConfig::from_yaml_file("pickup.yaml")?)
//!         .serve(None)
//!         .await
//! }
//! ```

pub mod config;
pub mod core;
pub mod server;
pub mod storage;

/// Re-exports of commonly used types and traits
pub mod prelude {
    // === Core ===
    pub use crate::core::{
        calendar::{Calendar, Clock, DayWindow, ManualClock, SystemClock},
        cart::{AddCartItem, Cart, CartEntry, CartService},
        catalog::{Item, ItemFilter, Restaurant},
        error::{ServiceError, ServiceResult},
        lifecycle::OrderEngine,
        order::{Order, OrderItem, OrderLineRequest, OrderStatus, PaymentMethod},
        pickup::PickupNumber,
        report::{ReportAggregator, SalesReport},
        service::{CartCache, Catalog, OrderStore, PaymentObserver},
    };

    // === Storage ===
    pub use crate::storage::{InMemoryCartCache, InMemoryCatalog, InMemoryOrderStore};

    // === Config ===
    pub use crate::config::ServiceConfig;

    // === Server ===
    pub use crate::server::{RestExposure, ServerBuilder, ServerHost};

    // === External dependencies ===
    pub use anyhow::Result;
    pub use async_trait::async_trait;
    pub use chrono::{DateTime, Utc};
    pub use serde::{Deserialize, Serialize};
    pub use uuid::Uuid;

    // === Axum ===
    pub use axum::Router;
}
