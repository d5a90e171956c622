//! Tests for the order lifecycle engine and pickup numbering
//!
//! These tests verify that:
//! - Totals always come from the catalog
//! - Status transitions are monotonic and cannot be skipped
//! - Pickup numbers are gapless per day and restart the next day
//! - Concurrent payments never share or skip a pickup number

use chrono::{FixedOffset, TimeDelta, TimeZone};
use futures::future::join_all;
use pickup::core::error::ValidationError;
use pickup::prelude::*;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

// =============================================================================
// Fixture
// =============================================================================

struct Shop {
    engine: OrderEngine,
    carts: Arc<CartService>,
    clock: Arc<ManualClock>,
}

fn shop() -> Shop {
    let config = ServiceConfig::default_config();
    let catalog = InMemoryCatalog::new(config.catalog.restaurants, config.catalog.items);
    let clock = Arc::new(ManualClock::new(
        Utc.with_ymd_and_hms(2024, 11, 2, 9, 0, 0).unwrap(),
    ));
    let carts = Arc::new(CartService::new(
        Arc::new(InMemoryCartCache::new()),
        Duration::from_secs(86_400),
    ));
    let engine = OrderEngine::new(
        Arc::new(catalog),
        Arc::new(InMemoryOrderStore::new()),
        carts.clone(),
        Calendar::new(clock.clone(), FixedOffset::east_opt(0).unwrap()),
    )
    .with_observer(carts.clone());

    Shop {
        engine,
        carts,
        clock,
    }
}

fn lines(items: &[(&str, i64)]) -> Option<Vec<OrderLineRequest>> {
    Some(
        items
            .iter()
            .map(|(id, quantity)| OrderLineRequest::new(*id, *quantity))
            .collect(),
    )
}

async fn paid_order(shop: &Shop) -> Order {
    let order = shop.engine.create(lines(&[("mcd-001", 1)])).await.unwrap();
    shop.engine
        .pay(&order.id.to_string(), "cash")
        .await
        .unwrap()
}

// =============================================================================
// End-to-end Scenarios
// =============================================================================

mod scenario_tests {
    use super::*;

    #[tokio::test]
    async fn test_direct_creation_prices_from_catalog() {
        let shop = shop();
        let order = shop.engine.create(lines(&[("mcd-001", 1)])).await.unwrap();

        assert_eq!(order.total_price, 139);
        assert_eq!(order.status, OrderStatus::Created);
    }

    #[tokio::test]
    async fn test_third_payment_of_day_gets_003() {
        let shop = shop();
        paid_order(&shop).await;
        paid_order(&shop).await;

        let order = shop.engine.create(lines(&[("mcd-001", 1)])).await.unwrap();
        let paid = shop
            .engine
            .pay(&order.id.to_string(), "cash")
            .await
            .unwrap();

        assert_eq!(paid.pickup_number.as_deref(), Some("003"));
        assert_eq!(paid.status, OrderStatus::Paid);
        assert_eq!(paid.payment_method, Some(PaymentMethod::Cash));
    }

    #[tokio::test]
    async fn test_second_payment_names_paid_status() {
        let shop = shop();
        let paid = paid_order(&shop).await;

        let err = shop
            .engine
            .pay(&paid.id.to_string(), "cash")
            .await
            .unwrap_err();

        assert!(matches!(err, ServiceError::InvalidState(_)));
        assert_eq!(err.status_code(), 400);
        assert!(err.to_string().contains("PAID"));
    }

    #[tokio::test]
    async fn test_list_by_date_and_status() {
        let shop = shop();

        // Nov 1: paid, must not appear
        shop.clock
            .set(Utc.with_ymd_and_hms(2024, 11, 1, 23, 59, 59).unwrap());
        paid_order(&shop).await;

        // Nov 2: two paid, one unpaid
        shop.clock
            .set(Utc.with_ymd_and_hms(2024, 11, 2, 0, 0, 0).unwrap());
        let early = paid_order(&shop).await;
        shop.clock.advance(TimeDelta::hours(5));
        shop.engine.create(lines(&[("kfc-001", 1)])).await.unwrap();
        shop.clock.advance(TimeDelta::hours(5));
        let late = paid_order(&shop).await;

        // Nov 3 00:00 is outside the window
        shop.clock
            .set(Utc.with_ymd_and_hms(2024, 11, 3, 0, 0, 0).unwrap());
        paid_order(&shop).await;

        let orders = shop
            .engine
            .list(Some("2024-11-02"), Some("PAID"))
            .await
            .unwrap();
        let ids: Vec<Uuid> = orders.iter().map(|o| o.id).collect();
        assert_eq!(ids, vec![late.id, early.id]);
        assert!(orders.iter().all(|o| o.status == OrderStatus::Paid));
    }
}

// =============================================================================
// Pickup Number Tests
// =============================================================================

mod pickup_number_tests {
    use super::*;

    #[tokio::test]
    async fn test_sequence_is_gapless() {
        let shop = shop();
        let mut numbers = Vec::new();
        for _ in 0..5 {
            numbers.push(paid_order(&shop).await.pickup_number.unwrap());
        }
        assert_eq!(numbers, vec!["001", "002", "003", "004", "005"]);
    }

    #[tokio::test]
    async fn test_failed_payment_leaves_no_gap() {
        let shop = shop();
        paid_order(&shop).await;

        let draft = shop.engine.create(None).await.unwrap();
        assert!(shop.engine.pay(&draft.id.to_string(), "cash").await.is_err());

        assert_eq!(paid_order(&shop).await.pickup_number.as_deref(), Some("002"));
    }

    #[tokio::test]
    async fn test_numbers_restart_each_day() {
        let shop = shop();
        assert_eq!(paid_order(&shop).await.pickup_number.as_deref(), Some("001"));
        assert_eq!(paid_order(&shop).await.pickup_number.as_deref(), Some("002"));

        shop.clock.advance(TimeDelta::days(1));
        assert_eq!(paid_order(&shop).await.pickup_number.as_deref(), Some("001"));
    }

    #[tokio::test]
    async fn test_concurrent_payments_get_distinct_numbers() {
        let shop = shop();
        let mut ids = Vec::new();
        for _ in 0..10 {
            let order = shop.engine.create(lines(&[("tea-001", 1)])).await.unwrap();
            ids.push(order.id.to_string());
        }

        let results = join_all(ids.iter().map(|id| shop.engine.pay(id, "card"))).await;

        let numbers: HashSet<String> = results
            .into_iter()
            .map(|r| r.unwrap().pickup_number.unwrap())
            .collect();
        let expected: HashSet<String> = (1..=10).map(|n| format!("{:03}", n)).collect();
        assert_eq!(numbers, expected);
    }

    #[tokio::test]
    async fn test_concurrent_pays_on_one_order_allocate_once() {
        let shop = shop();
        let order = shop.engine.create(lines(&[("85c-002", 2)])).await.unwrap();
        let id = order.id.to_string();

        let results = join_all((0..4).map(|_| shop.engine.pay(&id, "cash"))).await;

        let successes = results.iter().filter(|r| r.is_ok()).count();
        assert_eq!(successes, 1);
        assert!(
            results
                .iter()
                .filter_map(|r| r.as_ref().err())
                .all(|e| matches!(e, ServiceError::InvalidState(_)))
        );

        // The next order continues the sequence without a gap
        assert_eq!(paid_order(&shop).await.pickup_number.as_deref(), Some("002"));
    }
}

// =============================================================================
// State Machine Tests
// =============================================================================

mod state_tests {
    use super::*;

    #[tokio::test]
    async fn test_pay_on_draft_is_invalid_state() {
        let shop = shop();
        let draft = shop.engine.create(None).await.unwrap();
        let err = shop
            .engine
            .pay(&draft.id.to_string(), "cash")
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::InvalidState(_)));
        assert!(err.to_string().contains("DRAFT"));
    }

    #[tokio::test]
    async fn test_checkout_twice_is_rejected() {
        let shop = shop();
        shop.carts
            .add_item("s1", AddCartItem::new("kfc-002", 89, 2))
            .await
            .unwrap();
        let draft = shop.engine.create(None).await.unwrap();
        let id = draft.id.to_string();
        shop.engine.attach_cart(&id, "s1").await.unwrap();

        let created = shop.engine.checkout(&id).await.unwrap();
        assert_eq!(created.total_price, 178);

        let err = shop.engine.checkout(&id).await.unwrap_err();
        assert!(matches!(err, ServiceError::InvalidState(_)));
        assert_eq!(shop.engine.get(&id).await.unwrap().total_price, 178);
    }

    #[tokio::test]
    async fn test_checkout_on_created_order_is_rejected() {
        let shop = shop();
        let order = shop.engine.create(lines(&[("mcd-002", 1)])).await.unwrap();
        assert!(matches!(
            shop.engine.checkout(&order.id.to_string()).await,
            Err(ServiceError::InvalidState(_))
        ));
    }

    #[tokio::test]
    async fn test_checkout_reprices_at_current_catalog_price() {
        let shop = shop();
        // Cart snapshot claims a stale price
        shop.carts
            .add_item("s1", AddCartItem::new("mcd-001", 1, 3))
            .await
            .unwrap();
        let draft = shop.engine.create(None).await.unwrap();
        let id = draft.id.to_string();

        let attached = shop.engine.attach_cart(&id, "s1").await.unwrap();
        assert_eq!(attached.total_price, 3);

        let created = shop.engine.checkout(&id).await.unwrap();
        assert_eq!(created.items[0].item_total_price, 417);
        assert_eq!(created.total_price, 417);
    }

    #[tokio::test]
    async fn test_payment_clears_attached_cart_only() {
        let shop = shop();
        shop.carts
            .add_item("s1", AddCartItem::new("tea-002", 65, 1))
            .await
            .unwrap();
        shop.carts
            .add_item("s2", AddCartItem::new("tea-003", 60, 1))
            .await
            .unwrap();
        let draft = shop.engine.create(None).await.unwrap();
        let id = draft.id.to_string();
        shop.engine.attach_cart(&id, "s1").await.unwrap();
        shop.engine.checkout(&id).await.unwrap();
        shop.engine.pay(&id, "card").await.unwrap();

        assert!(shop.carts.get("s1").await.unwrap().is_empty());
        assert_eq!(shop.carts.get("s2").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_total_invariant_holds_in_every_state() {
        let shop = shop();
        let order = shop
            .engine
            .create(lines(&[("lunch-001", 2), ("lunch-004", 3), ("lunch-001", 1)]))
            .await
            .unwrap();
        assert_eq!(order.total_price, 200 + 45 + 100);

        let id = order.id.to_string();
        let paid = shop.engine.pay(&id, "cash").await.unwrap();
        let stored = shop.engine.get(&id).await.unwrap();
        for order in [order, paid, stored] {
            let sum: u64 = order.items.iter().map(|i| i.item_total_price).sum();
            assert_eq!(order.total_price, sum);
        }
    }

    #[tokio::test]
    async fn test_rejected_input_writes_nothing() {
        let shop = shop();
        let result = shop
            .engine
            .create(lines(&[("mcd-001", 1), ("ghost-001", 1)]))
            .await;
        assert!(matches!(
            result,
            Err(ServiceError::Validation(ValidationError::ItemNotFound { .. }))
        ));

        let result = shop.engine.create(lines(&[("mcd-001", 0)])).await;
        assert!(matches!(result, Err(ServiceError::Validation(_))));

        assert!(shop.engine.list(None, None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_bad_id_is_distinct_from_missing() {
        let shop = shop();
        let bad = shop.engine.get("12345").await.unwrap_err();
        let missing = shop.engine.get(&Uuid::new_v4().to_string()).await.unwrap_err();

        assert_eq!(bad.status_code(), 400);
        assert_eq!(bad.to_string(), "Invalid order ID format");
        assert_eq!(missing.status_code(), 404);
        assert_eq!(missing.to_string(), "Order not found");
    }
}
