//! Read-only catalog endpoints

use super::envelope::Envelope;
use crate::core::catalog::{Item, ItemFilter, MenuLine, RestaurantMenu};
use crate::core::error::{NotFoundError, ServiceResult};
use crate::server::host::ServerHost;
use axum::extract::{Path, State};
use std::sync::Arc;

/// `GET /api/items/{id}`
pub async fn get_item(
    State(host): State<Arc<ServerHost>>,
    Path(id): Path<String>,
) -> ServiceResult<Envelope<Item>> {
    let item = host
        .catalog
        .find_item(&id)
        .await?
        .ok_or_else(|| NotFoundError::Item { id: id.clone() })?;
    Ok(Envelope::data(item))
}

/// `GET /api/items/{restaurantId}/{type}`
pub async fn list_items_by_type(
    State(host): State<Arc<ServerHost>>,
    Path((restaurant_id, item_type)): Path<(String, String)>,
) -> ServiceResult<Envelope<Vec<Item>>> {
    let filter = ItemFilter::restaurant(restaurant_id).with_type(item_type);
    let items = host.catalog.find_items(&filter).await?;
    let count = items.len();
    Ok(Envelope::data(items).with_count(count))
}

/// `GET /api/restaurants`
pub async fn list_restaurants(
    State(host): State<Arc<ServerHost>>,
) -> ServiceResult<Envelope<Vec<RestaurantMenu<MenuLine>>>> {
    let mut menus = Vec::new();
    for restaurant in host.catalog.list_restaurants().await? {
        let items = host
            .catalog
            .find_items(&ItemFilter::restaurant(restaurant.id.clone()))
            .await?;
        menus.push(RestaurantMenu::new(restaurant, items).overview());
    }
    let count = menus.len();
    Ok(Envelope::data(menus).with_count(count))
}

/// `GET /api/restaurants/{id}`
pub async fn get_restaurant(
    State(host): State<Arc<ServerHost>>,
    Path(id): Path<String>,
) -> ServiceResult<Envelope<RestaurantMenu<Item>>> {
    let restaurant = host
        .catalog
        .find_restaurant(&id)
        .await?
        .ok_or_else(|| NotFoundError::Restaurant { id: id.clone() })?;
    let items = host
        .catalog
        .find_items(&ItemFilter::restaurant(restaurant.id.clone()))
        .await?;
    Ok(Envelope::data(RestaurantMenu::new(restaurant, items)))
}
