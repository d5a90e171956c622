//! Walk-up ordering server
//!
//! Serves the REST API on the configured address with the demo menu:
//!
//! ```text
//! PICKUP_CONFIG=pickup.yaml RUST_LOG=pickup=debug cargo run --example walkup
//! ```
//!
//! Without `PICKUP_CONFIG` the built-in defaults are used
//! (`127.0.0.1:3000`, UTC day boundaries, five demo restaurants).

use pickup::prelude::*;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("pickup=info,tower_http=info")),
        )
        .init();

    let config = match std::env::var("PICKUP_CONFIG") {
        Ok(path) => {
            tracing::info!(path = %path, "loading configuration");
            ServiceConfig::from_yaml_file(&path)?
        }
        Err(_) => ServiceConfig::default_config(),
    };

    tracing::info!(
        restaurants = config.catalog.restaurants.len(),
        items = config.catalog.items.len(),
        utc_offset_minutes = config.calendar.utc_offset_minutes,
        "menu loaded"
    );
    println!("🍔 Pickup API on http://{}", config.server.address());
    println!("   POST /api/orders                 create an order");
    println!("   POST /api/orders/{{id}}/payments   pay and get a pickup number");
    println!("   GET  /api/reports/orders?date=…  daily sales xlsx\n");

    ServerBuilder::new().with_config(config).serve(None).await
}
