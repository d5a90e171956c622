//! Order lifecycle endpoints under `/api/orders`

use super::envelope::{Envelope, cart_session, parse_body};
use crate::core::error::ServiceResult;
use crate::core::order::{Order, OrderLineRequest};
use crate::server::host::ServerHost;
use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use serde::Deserialize;
use std::sync::Arc;

/// Body of `POST /api/orders`; omitting `items` creates a draft
#[derive(Debug, Default, Deserialize)]
pub struct CreateOrderRequest {
    pub items: Option<Vec<OrderLineRequest>>,
}

#[derive(Debug, Default, Deserialize)]
pub struct PayRequest {
    pub method: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ListOrdersParams {
    pub date: Option<String>,
    pub status: Option<String>,
}

/// `POST /api/orders`
pub async fn create_order(
    State(host): State<Arc<ServerHost>>,
    body: Bytes,
) -> ServiceResult<Envelope<Order>> {
    let request: CreateOrderRequest = parse_body(&body)?;
    let order = host.orders.create(request.items).await?;
    Ok(Envelope::data(order)
        .with_message("Order created")
        .with_status(StatusCode::CREATED))
}

/// `POST /api/orders/{id}/cart`
pub async fn attach_cart(
    State(host): State<Arc<ServerHost>>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> ServiceResult<Envelope<Order>> {
    let session = cart_session(&headers, &host);
    let order = host.orders.attach_cart(&id, &session).await?;
    Ok(Envelope::data(order).with_message("Cart attached"))
}

/// `POST /api/orders/{id}/checkout`
pub async fn checkout(
    State(host): State<Arc<ServerHost>>,
    Path(id): Path<String>,
) -> ServiceResult<Envelope<Order>> {
    let order = host.orders.checkout(&id).await?;
    Ok(Envelope::data(order).with_message("Order checked out"))
}

/// `POST /api/orders/{id}/payments`
pub async fn pay(
    State(host): State<Arc<ServerHost>>,
    Path(id): Path<String>,
    body: Bytes,
) -> ServiceResult<Envelope<Order>> {
    let request: PayRequest = parse_body(&body)?;
    let order = host
        .orders
        .pay(&id, request.method.as_deref().unwrap_or_default())
        .await?;
    let message = format!(
        "Payment successful. Your pickup number is {}",
        order.pickup_number.as_deref().unwrap_or_default()
    );
    Ok(Envelope::data(order).with_message(message))
}

/// `POST /api/orders/{id}/cancel`
pub async fn cancel(
    State(host): State<Arc<ServerHost>>,
    Path(id): Path<String>,
) -> ServiceResult<Envelope<Order>> {
    let order = host.orders.cancel(&id).await?;
    Ok(Envelope::data(order).with_message("Order cancelled"))
}

/// `GET /api/orders/{id}`
pub async fn get_order(
    State(host): State<Arc<ServerHost>>,
    Path(id): Path<String>,
) -> ServiceResult<Envelope<Order>> {
    Ok(Envelope::data(host.orders.get(&id).await?))
}

/// `GET /api/orders?date=YYYY-MM-DD&status=PAID`
pub async fn list_orders(
    State(host): State<Arc<ServerHost>>,
    Query(params): Query<ListOrdersParams>,
) -> ServiceResult<Envelope<Vec<Order>>> {
    let orders = host
        .orders
        .list(params.date.as_deref(), params.status.as_deref())
        .await?;
    let count = orders.len();
    Ok(Envelope::data(orders).with_count(count))
}
