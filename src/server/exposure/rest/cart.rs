//! Staging cart endpoints under `/api/cart`

use super::envelope::{Envelope, cart_session, parse_body};
use crate::core::cart::{AddCartItem, Cart};
use crate::core::error::ServiceResult;
use crate::server::host::ServerHost;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::HeaderMap;
use serde::Deserialize;
use std::sync::Arc;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoveCartItem {
    pub item_id: Option<String>,
}

/// `POST /api/cart/new`
pub async fn reset_cart(
    State(host): State<Arc<ServerHost>>,
    headers: HeaderMap,
) -> ServiceResult<Envelope<Cart>> {
    let cart = host.carts.reset(&cart_session(&headers, &host)).await?;
    Ok(Envelope::data(cart).with_message("Cart initialized"))
}

/// `GET /api/cart`
pub async fn get_cart(
    State(host): State<Arc<ServerHost>>,
    headers: HeaderMap,
) -> ServiceResult<Envelope<Cart>> {
    let cart = host.carts.get(&cart_session(&headers, &host)).await?;
    Ok(Envelope::data(cart))
}

/// `POST /api/cart`
pub async fn add_item(
    State(host): State<Arc<ServerHost>>,
    headers: HeaderMap,
    body: Bytes,
) -> ServiceResult<Envelope<Cart>> {
    let request: AddCartItem = parse_body(&body)?;
    let cart = host
        .carts
        .add_item(&cart_session(&headers, &host), request)
        .await?;
    Ok(Envelope::data(cart))
}

/// `DELETE /api/cart/item`
pub async fn remove_item(
    State(host): State<Arc<ServerHost>>,
    headers: HeaderMap,
    body: Bytes,
) -> ServiceResult<Envelope<Cart>> {
    let request: RemoveCartItem = parse_body(&body)?;
    let cart = host
        .carts
        .remove_one_unit(&cart_session(&headers, &host), request.item_id.as_deref())
        .await?;
    Ok(Envelope::data(cart))
}

/// `DELETE /api/cart`
pub async fn clear_cart(
    State(host): State<Arc<ServerHost>>,
    headers: HeaderMap,
) -> ServiceResult<Envelope<()>> {
    host.carts.clear(&cart_session(&headers, &host)).await?;
    Ok(Envelope::message("Cart cleared"))
}
