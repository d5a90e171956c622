//! ServerBuilder for fluent API to build HTTP servers

use super::exposure::RestExposure;
use super::host::ServerHost;
use crate::config::ServiceConfig;
use crate::core::calendar::{Clock, SystemClock};
use crate::core::service::{CartCache, Catalog, OrderStore};
use crate::storage::{InMemoryCartCache, InMemoryCatalog, InMemoryOrderStore};
use anyhow::Result;
use axum::Router;
use std::sync::Arc;
use tokio::net::TcpListener;

/// Builder for the pickup HTTP server
///
/// Every collaborator is optional: the catalog defaults to the configured
/// menu, orders and carts default to in-memory stores and time to the
/// system clock.
///
/// # Example
///
/// ```ignore
/// let app = ServerBuilder::new()
///     .with_config(ServiceConfig::from_yaml_file("pickup.yaml")?)
///     .with_order_store(InMemoryOrderStore::new())
///     .build()?;
/// ```
pub struct ServerBuilder {
    config: Option<ServiceConfig>,
    catalog: Option<Arc<dyn Catalog>>,
    order_store: Option<Arc<dyn OrderStore>>,
    cart_cache: Option<Arc<dyn CartCache>>,
    clock: Option<Arc<dyn Clock>>,
    custom_routes: Vec<Router>,
}

impl ServerBuilder {
    /// Create a new ServerBuilder
    pub fn new() -> Self {
        Self {
            config: None,
            catalog: None,
            order_store: None,
            cart_cache: None,
            clock: None,
            custom_routes: Vec::new(),
        }
    }

    pub fn with_config(mut self, config: ServiceConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Replace the catalog built from the configuration
    pub fn with_catalog(mut self, catalog: impl Catalog + 'static) -> Self {
        self.catalog = Some(Arc::new(catalog));
        self
    }

    pub fn with_order_store(mut self, store: impl OrderStore + 'static) -> Self {
        self.order_store = Some(Arc::new(store));
        self
    }

    pub fn with_cart_cache(mut self, cache: impl CartCache + 'static) -> Self {
        self.cart_cache = Some(Arc::new(cache));
        self
    }

    /// Inject the time source; tests pass a shared `ManualClock`
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Add custom routes to the server
    pub fn with_custom_routes(mut self, routes: Router) -> Self {
        self.custom_routes.push(routes);
        self
    }

    /// Build the transport-agnostic host
    pub fn build_host(mut self) -> Result<ServerHost> {
        let config = self.config.take().unwrap_or_default();
        let catalog = self.catalog.take().unwrap_or_else(|| {
            Arc::new(InMemoryCatalog::new(
                config.catalog.restaurants.clone(),
                config.catalog.items.clone(),
            ))
        });
        let order_store = self
            .order_store
            .take()
            .unwrap_or_else(|| Arc::new(InMemoryOrderStore::new()));
        let cart_cache = self
            .cart_cache
            .take()
            .unwrap_or_else(|| Arc::new(InMemoryCartCache::new()));
        let clock = self.clock.take().unwrap_or_else(|| Arc::new(SystemClock));

        ServerHost::from_builder_components(config, catalog, order_store, cart_cache, clock)
    }

    /// Build the final REST router
    pub fn build(mut self) -> Result<Router> {
        let custom_routes = std::mem::take(&mut self.custom_routes);
        let host = Arc::new(self.build_host()?);
        RestExposure::build_router(host, custom_routes)
    }

    /// Serve the application with graceful shutdown
    ///
    /// Binds to `addr`, or to the configured `server.host:server.port` when
    /// `addr` is `None`, and stops on SIGTERM or Ctrl+C.
    pub async fn serve(self, addr: Option<&str>) -> Result<()> {
        let addr = match addr {
            Some(addr) => addr.to_string(),
            None => self
                .config
                .as_ref()
                .map(|config| config.server.address())
                .unwrap_or_else(|| ServiceConfig::default().server.address()),
        };
        let app = self.build()?;
        let listener = TcpListener::bind(&addr).await?;

        tracing::info!("Server listening on {}", addr);

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("Server shutdown complete");
        Ok(())
    }
}

impl Default for ServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Wait for shutdown signal (SIGTERM or Ctrl+C)
async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C signal, initiating graceful shutdown...");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM signal, initiating graceful shutdown...");
        },
    }
}
