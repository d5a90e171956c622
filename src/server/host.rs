//! Server host holding the wired service state
//!
//! The host is transport-agnostic: it owns the order engine, the cart
//! service, the report aggregator and the catalog, and the REST exposure
//! only borrows them.

use crate::config::ServiceConfig;
use crate::core::calendar::{Calendar, Clock};
use crate::core::cart::CartService;
use crate::core::lifecycle::OrderEngine;
use crate::core::report::ReportAggregator;
use crate::core::service::{CartCache, Catalog, OrderStore};
use anyhow::Result;
use std::sync::Arc;

/// Host context containing all service state
///
/// # Example
///
/// ```rust,ignore
/// let host = ServerHost::from_builder_components(
///     config,
///     catalog,
///     order_store,
///     cart_cache,
///     clock,
/// )?;
///
/// let app = RestExposure::build_router(Arc::new(host), vec![])?;
/// ```
pub struct ServerHost {
    pub config: Arc<ServiceConfig>,

    /// Read-only item and restaurant data
    pub catalog: Arc<dyn Catalog>,

    pub carts: Arc<CartService>,

    /// Order lifecycle; notifies `carts` after each payment
    pub orders: Arc<OrderEngine>,

    pub reports: Arc<ReportAggregator>,
}

impl ServerHost {
    /// Wire the service from its collaborators
    pub fn from_builder_components(
        config: ServiceConfig,
        catalog: Arc<dyn Catalog>,
        order_store: Arc<dyn OrderStore>,
        cart_cache: Arc<dyn CartCache>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self> {
        config.validate()?;
        let calendar = Calendar::new(clock, config.offset()?);

        let carts = Arc::new(CartService::new(cart_cache, config.cart.ttl()));
        let orders = OrderEngine::new(
            catalog.clone(),
            order_store.clone(),
            carts.clone(),
            calendar.clone(),
        )
        .with_observer(carts.clone());
        let reports = ReportAggregator::new(catalog.clone(), order_store, calendar)
            .include_fulfilled(config.report.include_fulfilled);

        Ok(Self {
            config: Arc::new(config),
            catalog,
            carts,
            orders: Arc::new(orders),
            reports: Arc::new(reports),
        })
    }

    /// Session used for requests without an `x-cart-session` header
    pub fn default_session(&self) -> &str {
        &self.config.cart.default_session
    }
}
