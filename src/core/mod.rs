//! Core module: the order lifecycle, pickup allocation, staging cart and
//! sales report, plus the collaborator traits they consume

pub mod calendar;
pub mod cart;
pub mod catalog;
pub mod error;
pub mod lifecycle;
pub mod order;
pub mod pickup;
pub mod report;
pub mod service;

pub use calendar::{Calendar, Clock, DayWindow, ManualClock, SystemClock};
pub use cart::{AddCartItem, Cart, CartEntry, CartService};
pub use catalog::{Item, ItemFilter, MenuLine, Restaurant, RestaurantMenu};
pub use error::{ServiceError, ServiceResult};
pub use lifecycle::OrderEngine;
pub use order::{Order, OrderItem, OrderLineRequest, OrderStatus, PaymentMethod};
pub use pickup::{PickupAllocator, PickupNumber};
pub use report::{ReportAggregator, ReportRow, SalesReport};
pub use service::{CartCache, Catalog, OrderQuery, OrderStore, PaymentObserver, Replaced};
