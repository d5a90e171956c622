//! Typed error handling for the pickup service
//!
//! Every operation of the order core returns a [`ServiceError`] so that the
//! HTTP layer can map failures onto the status-code contract without string
//! matching.
//!
//! # Error Categories
//!
//! - [`ValidationError`]: malformed, missing or out-of-range input (400)
//! - [`NotFoundError`]: referenced order, item, restaurant or cart is absent (404)
//! - [`StateError`]: operation illegal for the current lifecycle status (400),
//!   or lost to a concurrent write on the same order (409)
//! - [`DependencyError`]: catalog, cart or order store failed (500)
//! - [`ConfigError`]: configuration parsing and validation
//!
//! # Example
//!
//! ```rust,ignore
//! match engine.pay(&id, "cash").await {
//!     Ok(order) => println!("pickup {}", order.pickup_number.unwrap_or_default()),
//!     Err(ServiceError::InvalidState(StateError::InvalidTransition { current, .. })) => {
//!         println!("order is already {}", current);
//!     }
//!     Err(e) => eprintln!("payment failed: {}", e),
//! }
//! ```

use crate::core::order::OrderStatus;
use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use std::fmt;
use uuid::Uuid;

/// Message returned to clients for every 5xx failure
const GENERIC_FAILURE: &str = "Internal server error";

/// The main error type for the pickup service
#[derive(Debug)]
pub enum ServiceError {
    /// Client input was rejected
    Validation(ValidationError),

    /// A referenced record does not exist
    NotFound(NotFoundError),

    /// The order is in the wrong lifecycle status for the operation
    InvalidState(StateError),

    /// A collaborator (catalog, cart cache, order store) failed
    Dependency(DependencyError),

    /// Configuration errors
    Config(ConfigError),

    /// Internal errors (should not happen in normal operation)
    Internal(String),
}

impl fmt::Display for ServiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServiceError::Validation(e) => write!(f, "{}", e),
            ServiceError::NotFound(e) => write!(f, "{}", e),
            ServiceError::InvalidState(e) => write!(f, "{}", e),
            ServiceError::Dependency(e) => write!(f, "{}", e),
            ServiceError::Config(e) => write!(f, "{}", e),
            ServiceError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for ServiceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ServiceError::Validation(e) => Some(e),
            ServiceError::NotFound(e) => Some(e),
            ServiceError::InvalidState(e) => Some(e),
            ServiceError::Dependency(e) => Some(e),
            ServiceError::Config(e) => Some(e),
            ServiceError::Internal(_) => None,
        }
    }
}

/// Failure body of the uniform response envelope
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Always `false`
    pub success: bool,
    /// Human-readable error message, safe to show to clients
    pub message: String,
    /// Error code for programmatic handling
    pub code: String,
}

impl ServiceError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            ServiceError::Validation(_) => StatusCode::BAD_REQUEST,
            ServiceError::NotFound(_) => StatusCode::NOT_FOUND,
            ServiceError::InvalidState(e) => e.status_code(),
            ServiceError::Dependency(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ServiceError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ServiceError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the error code for this error
    pub fn error_code(&self) -> &'static str {
        match self {
            ServiceError::Validation(e) => e.error_code(),
            ServiceError::NotFound(e) => e.error_code(),
            ServiceError::InvalidState(e) => e.error_code(),
            ServiceError::Dependency(_) => "DEPENDENCY_ERROR",
            ServiceError::Config(_) => "CONFIG_ERROR",
            ServiceError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Message that may be shown to the client
    ///
    /// Server-side failures collapse to a generic message; their detail only
    /// goes to the log.
    pub fn public_message(&self) -> String {
        if self.status_code().is_server_error() {
            GENERIC_FAILURE.to_string()
        } else {
            self.to_string()
        }
    }

    /// Convert to an error response
    pub fn to_response(&self) -> ErrorResponse {
        ErrorResponse {
            success: false,
            message: self.public_message(),
            code: self.error_code().to_string(),
        }
    }

    /// Shorthand for a single-field validation failure
    pub fn field(field: impl Into<String>, message: impl Into<String>) -> Self {
        ServiceError::Validation(ValidationError::FieldError {
            field: field.into(),
            message: message.into(),
        })
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, code = self.error_code(), "request failed");
        } else {
            tracing::debug!(error = %self, status = status.as_u16(), "request rejected");
        }
        (status, Json(self.to_response())).into_response()
    }
}

// =============================================================================
// Validation Errors
// =============================================================================

/// Errors related to input validation
#[derive(Debug)]
pub enum ValidationError {
    /// Single field validation error
    FieldError { field: String, message: String },

    /// Missing required argument
    MissingArgument { argument: String },

    /// Order creation without any line item
    EmptyItems,

    /// Checkout of a draft that holds no items
    EmptyCheckout,

    /// A line item references an item the catalog does not know
    ItemNotFound { item_id: String },

    /// Identifier is syntactically invalid (distinct from "not found")
    InvalidId { value: String },

    /// Date is not a zero-padded `YYYY-MM-DD` calendar date
    InvalidDate { value: String },

    /// Status string outside the fixed enumeration
    InvalidStatus { value: String },

    /// Payment method other than `cash` or `card`
    InvalidPaymentMethod { value: String },

    /// Invalid JSON format
    InvalidJson { message: String },
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::FieldError { field, message } => {
                write!(f, "Validation error for field '{}': {}", field, message)
            }
            ValidationError::MissingArgument { argument } => {
                write!(f, "{} is required", argument)
            }
            ValidationError::EmptyItems => write!(f, "Cannot create order with empty items"),
            ValidationError::EmptyCheckout => write!(f, "Cannot checkout empty cart"),
            ValidationError::ItemNotFound { item_id } => {
                write!(f, "Item {} not found", item_id)
            }
            ValidationError::InvalidId { .. } => write!(f, "Invalid order ID format"),
            ValidationError::InvalidDate { value } => {
                write!(f, "Invalid date format '{}'. Use YYYY-MM-DD", value)
            }
            ValidationError::InvalidStatus { value } => write!(f, "Invalid status '{}'", value),
            ValidationError::InvalidPaymentMethod { .. } => {
                write!(f, "Invalid payment method. Must be \"cash\" or \"card\"")
            }
            ValidationError::InvalidJson { message } => write!(f, "Invalid JSON: {}", message),
        }
    }
}

impl std::error::Error for ValidationError {}

impl ValidationError {
    pub fn error_code(&self) -> &'static str {
        match self {
            ValidationError::FieldError { .. } => "VALIDATION_ERROR",
            ValidationError::MissingArgument { .. } => "MISSING_ARGUMENT",
            ValidationError::EmptyItems => "EMPTY_ITEMS",
            ValidationError::EmptyCheckout => "EMPTY_CHECKOUT",
            ValidationError::ItemNotFound { .. } => "ITEM_NOT_FOUND",
            ValidationError::InvalidId { .. } => "INVALID_ID",
            ValidationError::InvalidDate { .. } => "INVALID_DATE",
            ValidationError::InvalidStatus { .. } => "INVALID_STATUS",
            ValidationError::InvalidPaymentMethod { .. } => "INVALID_PAYMENT_METHOD",
            ValidationError::InvalidJson { .. } => "INVALID_JSON",
        }
    }
}

impl From<ValidationError> for ServiceError {
    fn from(err: ValidationError) -> Self {
        ServiceError::Validation(err)
    }
}

// =============================================================================
// Not Found Errors
// =============================================================================

/// A referenced record is absent
#[derive(Debug)]
pub enum NotFoundError {
    Order { id: Uuid },
    Item { id: String },
    Restaurant { id: String },
    /// No cart exists for the session
    Cart { session: String },
    /// The cart exists but does not hold the item
    CartItem { item_id: String },
}

impl fmt::Display for NotFoundError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NotFoundError::Order { .. } => write!(f, "Order not found"),
            NotFoundError::Item { id } => write!(f, "Item '{}' not found", id),
            NotFoundError::Restaurant { id } => write!(f, "Restaurant '{}' not found", id),
            NotFoundError::Cart { .. } => write!(f, "Cart not found"),
            NotFoundError::CartItem { item_id } => {
                write!(f, "Item '{}' is not in the cart", item_id)
            }
        }
    }
}

impl std::error::Error for NotFoundError {}

impl NotFoundError {
    pub fn error_code(&self) -> &'static str {
        match self {
            NotFoundError::Order { .. } => "ORDER_NOT_FOUND",
            NotFoundError::Item { .. } => "ITEM_NOT_FOUND",
            NotFoundError::Restaurant { .. } => "RESTAURANT_NOT_FOUND",
            NotFoundError::Cart { .. } => "CART_NOT_FOUND",
            NotFoundError::CartItem { .. } => "CART_ITEM_NOT_FOUND",
        }
    }
}

impl From<NotFoundError> for ServiceError {
    fn from(err: NotFoundError) -> Self {
        ServiceError::NotFound(err)
    }
}

// =============================================================================
// State Errors
// =============================================================================

/// Lifecycle violations
#[derive(Debug)]
pub enum StateError {
    /// The action is not allowed from the order's current status
    InvalidTransition {
        order_id: Uuid,
        action: &'static str,
        current: OrderStatus,
    },

    /// Another request wrote the order between our read and our write
    ConcurrentModification {
        order_id: Uuid,
        action: &'static str,
        current: OrderStatus,
    },
}

impl fmt::Display for StateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StateError::InvalidTransition {
                action, current, ..
            } => write!(f, "Cannot {} order with status {}", action, current),
            StateError::ConcurrentModification {
                action, current, ..
            } => write!(
                f,
                "Order was modified concurrently and is now {}; retry {}",
                current, action
            ),
        }
    }
}

impl std::error::Error for StateError {}

impl StateError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            StateError::InvalidTransition { .. } => StatusCode::BAD_REQUEST,
            StateError::ConcurrentModification { .. } => StatusCode::CONFLICT,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            StateError::InvalidTransition { .. } => "INVALID_STATE",
            StateError::ConcurrentModification { .. } => "CONCURRENT_MODIFICATION",
        }
    }
}

impl From<StateError> for ServiceError {
    fn from(err: StateError) -> Self {
        ServiceError::InvalidState(err)
    }
}

// =============================================================================
// Dependency Errors
// =============================================================================

/// Errors raised by collaborators of the order core
#[derive(Debug)]
pub enum DependencyError {
    /// Backend failure reported by a collaborator
    Backend { message: String },
}

impl fmt::Display for DependencyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DependencyError::Backend { message } => write!(f, "Backend error: {}", message),
        }
    }
}

impl std::error::Error for DependencyError {}

impl From<DependencyError> for ServiceError {
    fn from(err: DependencyError) -> Self {
        ServiceError::Dependency(err)
    }
}

// =============================================================================
// Config Errors
// =============================================================================

/// Errors related to configuration
#[derive(Debug)]
pub enum ConfigError {
    /// Failed to parse configuration file
    ParseError {
        file: Option<String>,
        message: String,
    },

    /// Invalid value in configuration
    InvalidValue {
        field: String,
        value: String,
        message: String,
    },

    /// IO error while reading configuration
    IoError { message: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::ParseError { file, message } => {
                if let Some(file) = file {
                    write!(f, "Failed to parse config file '{}': {}", file, message)
                } else {
                    write!(f, "Failed to parse config: {}", message)
                }
            }
            ConfigError::InvalidValue {
                field,
                value,
                message,
            } => {
                write!(
                    f,
                    "Invalid value '{}' for field '{}': {}",
                    value, field, message
                )
            }
            ConfigError::IoError { message } => write!(f, "IO error: {}", message),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<ConfigError> for ServiceError {
    fn from(err: ConfigError) -> Self {
        ServiceError::Config(err)
    }
}

// =============================================================================
// Conversions from external errors
// =============================================================================

impl From<serde_json::Error> for ServiceError {
    fn from(err: serde_json::Error) -> Self {
        ServiceError::Validation(ValidationError::InvalidJson {
            message: err.to_string(),
        })
    }
}

impl From<std::io::Error> for ServiceError {
    fn from(err: std::io::Error) -> Self {
        ServiceError::Config(ConfigError::IoError {
            message: err.to_string(),
        })
    }
}

impl From<serde_yaml::Error> for ServiceError {
    fn from(err: serde_yaml::Error) -> Self {
        ServiceError::Config(ConfigError::ParseError {
            file: None,
            message: err.to_string(),
        })
    }
}

/// Collaborator traits report failures through `anyhow`
impl From<anyhow::Error> for ServiceError {
    fn from(err: anyhow::Error) -> Self {
        ServiceError::Dependency(DependencyError::Backend {
            message: format!("{:#}", err),
        })
    }
}

// =============================================================================
// Result type alias
// =============================================================================

/// A specialized Result type for pickup service operations
pub type ServiceResult<T> = Result<T, ServiceError>;
