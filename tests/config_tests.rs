//! Tests for configuration loading and how it shapes the running service

use chrono::{TimeDelta, TimeZone};
use pickup::core::error::ConfigError;
use pickup::prelude::*;
use std::io::Write;
use std::sync::Arc;
use tempfile::NamedTempFile;

fn write_config(yaml: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(yaml.as_bytes()).unwrap();
    file
}

const SMALL_MENU: &str = r#"
server:
  host: 0.0.0.0
  port: 8080
cart:
  ttl_secs: 600
  default_session: kiosk
calendar:
  utc_offset_minutes: 480
report:
  include_fulfilled: true
catalog:
  restaurants:
    - { id: noodle, name: Noodle Bar }
  items:
    - { id: noodle-001, name: Beef Noodles, price: 160, type: food, restaurantId: noodle }
    - { id: noodle-002, name: Iced Tea, price: 30, type: drink, restaurantId: noodle }
"#;

// =============================================================================
// File Loading Tests
// =============================================================================

mod file_loading_tests {
    use super::*;

    #[test]
    fn test_load_from_file() {
        let file = write_config(SMALL_MENU);
        let config = ServiceConfig::from_yaml_file(file.path()).unwrap();

        assert_eq!(config.server.address(), "0.0.0.0:8080");
        assert_eq!(config.cart.ttl_secs, 600);
        assert_eq!(config.cart.default_session, "kiosk");
        assert_eq!(config.calendar.utc_offset_minutes, 480);
        assert!(config.report.include_fulfilled);
        assert_eq!(config.catalog.items.len(), 2);
        assert_eq!(config.catalog.items[1].item_type, "drink");
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let file = write_config("server:\n  port: 4000\n");
        let config = ServiceConfig::from_yaml_file(file.path()).unwrap();

        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 4000);
        assert_eq!(config.catalog.restaurants.len(), 5);
    }

    #[test]
    fn test_parse_error_names_the_file() {
        let file = write_config("server: [unterminated");
        let err = ServiceConfig::from_yaml_file(file.path()).unwrap_err();

        match err {
            ServiceError::Config(ConfigError::ParseError { file: Some(name), .. }) => {
                assert_eq!(name, file.path().display().to_string());
            }
            other => panic!("Expected ParseError, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = ServiceConfig::from_yaml_file(dir.path().join("absent.yaml")).unwrap_err();

        assert!(matches!(
            err,
            ServiceError::Config(ConfigError::IoError { .. })
        ));
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        for yaml in [
            "server:\n  port: 0\n",
            "cart:\n  ttl_secs: 0\n",
            "cart:\n  default_session: \"  \"\n",
            "calendar:\n  utc_offset_minutes: 1440\n",
        ] {
            let file = write_config(yaml);
            assert!(
                matches!(
                    ServiceConfig::from_yaml_file(file.path()),
                    Err(ServiceError::Config(ConfigError::InvalidValue { .. }))
                ),
                "expected rejection of {:?}",
                yaml
            );
        }
    }

    #[test]
    fn test_duplicate_item_ids_are_rejected() {
        let yaml = r#"
catalog:
  restaurants:
    - { id: noodle, name: Noodle Bar }
  items:
    - { id: noodle-001, name: Beef Noodles, price: 160, type: food, restaurantId: noodle }
    - { id: noodle-001, name: Pork Noodles, price: 150, type: food, restaurantId: noodle }
"#;
        assert!(ServiceConfig::from_yaml_str(yaml).is_err());
    }
}

// =============================================================================
// Wiring Tests
// =============================================================================

mod wiring_tests {
    use super::*;

    #[tokio::test]
    async fn test_configured_menu_prices_orders() {
        let config = ServiceConfig::from_yaml_str(SMALL_MENU).unwrap();
        let host = ServerBuilder::new().with_config(config).build_host().unwrap();

        let order = host
            .orders
            .create(Some(vec![
                OrderLineRequest::new("noodle-001", 1),
                OrderLineRequest::new("noodle-002", 2),
            ]))
            .await
            .unwrap();
        assert_eq!(order.total_price, 220);

        // The demo menu is replaced, not merged
        assert!(
            host.orders
                .create(Some(vec![OrderLineRequest::new("mcd-001", 1)]))
                .await
                .is_err()
        );
        assert_eq!(host.default_session(), "kiosk");
    }

    #[tokio::test]
    async fn test_pickup_numbers_follow_local_midnight() {
        let config = ServiceConfig::from_yaml_str(SMALL_MENU).unwrap();
        // 23:30 local time at UTC+8
        let clock = Arc::new(ManualClock::new(
            Utc.with_ymd_and_hms(2024, 11, 2, 15, 30, 0).unwrap(),
        ));
        let host = ServerBuilder::new()
            .with_config(config)
            .with_clock(clock.clone())
            .build_host()
            .unwrap();

        let pay_one = || async {
            let order = host
                .orders
                .create(Some(vec![OrderLineRequest::new("noodle-002", 1)]))
                .await
                .unwrap();
            host.orders
                .pay(&order.id.to_string(), "card")
                .await
                .unwrap()
                .pickup_number
                .unwrap()
        };

        assert_eq!(pay_one().await, "001");
        assert_eq!(pay_one().await, "002");

        // 00:30 local on the next day, still Nov 2 in UTC
        clock.advance(TimeDelta::hours(1));
        assert_eq!(pay_one().await, "001");

        let orders = host.orders.list(Some("2024-11-03"), None).await.unwrap();
        assert_eq!(orders.len(), 1);
    }
}
