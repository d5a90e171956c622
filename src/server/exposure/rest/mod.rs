//! REST API exposure for the pickup service
//!
//! This module provides REST-specific routing and handlers. It consumes a
//! `ServerHost` and produces an Axum `Router`; the order core knows nothing
//! about HTTP.

mod cart;
mod catalog;
pub mod envelope;
mod orders;
mod reports;

pub use envelope::{CART_SESSION_HEADER, Envelope};

use super::super::host::ServerHost;
use anyhow::Result;
use axum::{
    Json, Router,
    routing::{delete, get, post},
};
use serde_json::{Value, json};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// REST API exposure implementation
pub struct RestExposure;

impl RestExposure {
    /// Build the REST router from a host
    ///
    /// Returns a router with health, cart, order, catalog and report routes,
    /// merged with `custom_routes`, wrapped in request tracing and a
    /// permissive CORS policy.
    pub fn build_router(host: Arc<ServerHost>, custom_routes: Vec<Router>) -> Result<Router> {
        let api_routes = Router::new()
            .merge(Self::cart_routes())
            .merge(Self::order_routes())
            .merge(Self::catalog_routes())
            .route("/api/reports/orders", get(reports::order_report))
            .with_state(host);

        let mut app = Self::health_routes().merge(api_routes);
        for custom_router in custom_routes {
            app = app.merge(custom_router);
        }

        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);

        Ok(app.layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        ))
    }

    fn cart_routes() -> Router<Arc<ServerHost>> {
        Router::new()
            .route("/api/cart/new", post(cart::reset_cart))
            .route(
                "/api/cart",
                get(cart::get_cart)
                    .post(cart::add_item)
                    .delete(cart::clear_cart),
            )
            .route("/api/cart/item", delete(cart::remove_item))
    }

    fn order_routes() -> Router<Arc<ServerHost>> {
        Router::new()
            .route(
                "/api/orders",
                get(orders::list_orders).post(orders::create_order),
            )
            .route("/api/orders/{id}", get(orders::get_order))
            .route("/api/orders/{id}/cart", post(orders::attach_cart))
            .route("/api/orders/{id}/checkout", post(orders::checkout))
            .route("/api/orders/{id}/payments", post(orders::pay))
            .route("/api/orders/{id}/cancel", post(orders::cancel))
    }

    fn catalog_routes() -> Router<Arc<ServerHost>> {
        Router::new()
            .route("/api/items/{id}", get(catalog::get_item))
            .route("/api/items/{restaurant_id}/{item_type}", get(catalog::list_items_by_type))
            .route("/api/restaurants", get(catalog::list_restaurants))
            .route("/api/restaurants/{id}", get(catalog::get_restaurant))
    }

    /// Build health check routes
    fn health_routes() -> Router {
        Router::new()
            .route("/", get(Self::root))
            .route("/health", get(Self::health_check))
            .route("/healthz", get(Self::health_check))
    }

    async fn root() -> Json<Value> {
        Json(json!({ "message": "API is working properly" }))
    }

    /// Health check endpoint handler
    async fn health_check() -> Json<Value> {
        Json(json!({
            "status": "ok",
            "service": "pickup-rs"
        }))
    }
}
