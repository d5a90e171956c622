//! Order lifecycle engine
//!
//! Owns every status transition of an order and the invariants around it:
//! totals are always recomputed from the catalog, transitions follow the
//! table in [`OrderStatus::can_transition_to`], and each order receives at
//! most one pickup number.
//!
//! All validation happens before the first write. Writes go through
//! [`OrderStore::replace`] with the version that was read, so two concurrent
//! transitions on the same order cannot both commit.

use crate::core::calendar::Calendar;
use crate::core::cart::CartService;
use crate::core::error::{
    NotFoundError, ServiceError, ServiceResult, StateError, ValidationError,
};
use crate::core::order::{
    parse_order_id, LineSelection, Order, OrderItem, OrderLineRequest, OrderStatus,
    PaymentMethod,
};
use crate::core::pickup::PickupAllocator;
use crate::core::service::{Catalog, OrderQuery, OrderStore, PaymentObserver, Replaced};
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

/// Validates and performs order transitions
pub struct OrderEngine {
    catalog: Arc<dyn Catalog>,
    store: Arc<dyn OrderStore>,
    carts: Arc<CartService>,
    pickups: PickupAllocator,
    calendar: Calendar,
    observers: Vec<Arc<dyn PaymentObserver>>,
}

impl OrderEngine {
    pub fn new(
        catalog: Arc<dyn Catalog>,
        store: Arc<dyn OrderStore>,
        carts: Arc<CartService>,
        calendar: Calendar,
    ) -> Self {
        Self {
            pickups: PickupAllocator::new(store.clone(), calendar.clone()),
            catalog,
            store,
            carts,
            calendar,
            observers: Vec::new(),
        }
    }

    /// Register a hook that runs after every committed payment
    pub fn with_observer(mut self, observer: Arc<dyn PaymentObserver>) -> Self {
        self.observers.push(observer);
        self
    }

    pub fn calendar(&self) -> &Calendar {
        &self.calendar
    }

    /// Create an order
    ///
    /// Without items this yields an empty DRAFT. With items, the lines are
    /// priced from the catalog and the order starts out CREATED.
    pub async fn create(&self, items: Option<Vec<OrderLineRequest>>) -> ServiceResult<Order> {
        let now = self.calendar.now();
        let order = match items {
            None => Order::draft(now),
            Some(lines) => {
                if lines.is_empty() {
                    return Err(ValidationError::EmptyItems.into());
                }
                let selections = lines
                    .into_iter()
                    .map(OrderLineRequest::into_selection)
                    .collect::<Result<Vec<_>, _>>()?;
                Order::created(self.price_lines(&selections).await?, now)?
            }
        };

        let order = self.store.create(order).await?;
        info!(
            order_id = %order.id,
            status = %order.status,
            total_price = order.total_price,
            "order created"
        );
        Ok(order)
    }

    /// Price each line at the catalog's current price
    ///
    /// Shared by direct creation and checkout; client-declared prices never
    /// reach this point.
    pub async fn price_lines(&self, lines: &[LineSelection]) -> ServiceResult<Vec<OrderItem>> {
        let mut priced = Vec::with_capacity(lines.len());
        for line in lines {
            let item = self
                .catalog
                .find_item(&line.item_id)
                .await?
                .ok_or_else(|| ValidationError::ItemNotFound {
                    item_id: line.item_id.clone(),
                })?;
            let item_total_price = item
                .price
                .checked_mul(u64::from(line.quantity))
                .ok_or_else(|| ServiceError::field("quantity", "line total is too large"))?;
            priced.push(OrderItem {
                item_id: item.id,
                quantity: line.quantity,
                item_total_price,
            });
        }
        Ok(priced)
    }

    /// Copy a session's staging cart onto a DRAFT order
    ///
    /// Line totals use the cart's snapshot prices; checkout re-prices them.
    pub async fn attach_cart(&self, id: &str, session: &str) -> ServiceResult<Order> {
        let mut order = self.load(parse_order_id(id)?).await?;
        order.ensure_can_transition(OrderStatus::Created, "attach a cart to")?;

        let cart = self
            .carts
            .find(session)
            .await?
            .ok_or_else(|| NotFoundError::Cart {
                session: session.to_string(),
            })?;
        if cart.is_empty() {
            return Err(ServiceError::field("cart", "Cannot attach an empty cart"));
        }

        let items = cart
            .entries()
            .map(|(item_id, entry)| -> ServiceResult<OrderItem> {
                let item_total_price = entry
                    .price
                    .checked_mul(u64::from(entry.amount))
                    .ok_or_else(|| ServiceError::field("amount", "line total is too large"))?;
                Ok(OrderItem {
                    item_id: item_id.clone(),
                    quantity: entry.amount,
                    item_total_price,
                })
            })
            .collect::<ServiceResult<Vec<_>>>()?;

        order.set_items(items)?;
        order.cart_session = Some(session.to_string());
        order.updated_at = self.calendar.now();

        let order = self.commit(order, "attach a cart to").await?;
        info!(order_id = %order.id, session, lines = order.items.len(), "cart attached");
        Ok(order)
    }

    /// DRAFT → CREATED, re-pricing every line and re-stamping `order_date`
    pub async fn checkout(&self, id: &str) -> ServiceResult<Order> {
        let mut order = self.load(parse_order_id(id)?).await?;
        order.ensure_can_transition(OrderStatus::Created, "checkout")?;
        if order.items.is_empty() {
            return Err(ValidationError::EmptyCheckout.into());
        }

        let selections: Vec<LineSelection> = order.items.iter().map(LineSelection::from).collect();
        let priced = self.price_lines(&selections).await?;

        let now = self.calendar.now();
        order.set_items(priced)?;
        order.order_date = now;
        order.transition(OrderStatus::Created, "checkout", now)?;

        let order = self.commit(order, "checkout").await?;
        info!(order_id = %order.id, total_price = order.total_price, "order checked out");
        Ok(order)
    }

    /// CREATED → PAID, issuing today's next pickup number
    pub async fn pay(&self, id: &str, method: &str) -> ServiceResult<Order> {
        let method: PaymentMethod = method.parse()?;
        let id = parse_order_id(id)?;
        self.load(id)
            .await?
            .ensure_can_transition(OrderStatus::Paid, "pay for")?;

        // Payments are serialized from here until the write settles
        let reservation = self.pickups.reserve().await?;
        let mut order = self.load(id).await?;
        let paid_at = reservation.issued_at();
        order.transition(OrderStatus::Paid, "pay for", paid_at)?;
        order.payment_method = Some(method);
        order.pickup_number = Some(reservation.number().to_string());
        order.paid_at = Some(paid_at);

        let order = self.commit(order, "pay for").await?;
        let number = reservation.commit();
        info!(
            order_id = %order.id,
            pickup_number = %number,
            method = method.as_str(),
            total_price = order.total_price,
            "order paid"
        );

        self.notify_paid(&order).await;
        Ok(order)
    }

    /// DRAFT or CREATED → CANCELLED
    pub async fn cancel(&self, id: &str) -> ServiceResult<Order> {
        let mut order = self.load(parse_order_id(id)?).await?;
        order.transition(OrderStatus::Cancelled, "cancel", self.calendar.now())?;

        let order = self.commit(order, "cancel").await?;
        info!(order_id = %order.id, "order cancelled");
        Ok(order)
    }

    pub async fn get(&self, id: &str) -> ServiceResult<Order> {
        self.load(parse_order_id(id)?).await
    }

    /// Orders placed on `date` (default today), newest first
    pub async fn list(&self, date: Option<&str>, status: Option<&str>) -> ServiceResult<Vec<Order>> {
        let window = self.calendar.window_for_param(date)?;
        let mut query = OrderQuery::placed_within(window);
        if let Some(status) = status {
            query = query.with_statuses([status.parse::<OrderStatus>()?]);
        }

        let mut orders = self.store.find(&query).await?;
        orders.sort_by(|a, b| b.order_date.cmp(&a.order_date));
        Ok(orders)
    }

    async fn load(&self, id: Uuid) -> ServiceResult<Order> {
        self.store
            .find_by_id(&id)
            .await?
            .ok_or_else(|| NotFoundError::Order { id }.into())
    }

    /// Versioned write; a concurrent writer wins and we report the status it left
    async fn commit(&self, order: Order, action: &'static str) -> ServiceResult<Order> {
        let expected = order.version;
        match self.store.replace(order, expected).await? {
            Replaced::Committed(order) => Ok(order),
            Replaced::Stale(current) => {
                warn!(order_id = %current.id, action, current = %current.status, "stale order write");
                Err(StateError::ConcurrentModification {
                    order_id: current.id,
                    action,
                    current: current.status,
                }
                .into())
            }
        }
    }

    async fn notify_paid(&self, order: &Order) {
        for observer in &self.observers {
            if let Err(e) = observer.on_paid(order).await {
                warn!(order_id = %order.id, error = %e, "payment observer failed");
            }
        }
    }
}
