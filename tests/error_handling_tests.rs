//! Tests for the typed error handling system
//!
//! These tests verify that:
//! - Errors return correct HTTP status codes
//! - Error responses are properly formatted
//! - Server-side failures never leak their detail to clients
//! - Error conversions work correctly

use axum::body::to_bytes;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use pickup::core::error::{
    ConfigError, DependencyError, NotFoundError, StateError, ValidationError,
};
use pickup::core::order::parse_order_id;
use pickup::prelude::*;
use serde_json::Value;

// =============================================================================
// HTTP Status Code Tests
// =============================================================================

mod status_code_tests {
    use super::*;

    #[test]
    fn test_order_not_found_returns_404() {
        let err = ServiceError::NotFound(NotFoundError::Order { id: Uuid::new_v4() });
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_cart_item_not_found_returns_404() {
        let err = ServiceError::NotFound(NotFoundError::CartItem {
            item_id: "mcd-001".to_string(),
        });
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_invalid_id_returns_400() {
        let err = ServiceError::Validation(ValidationError::InvalidId {
            value: "12345".to_string(),
        });
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_unknown_item_on_order_returns_400() {
        let err = ServiceError::Validation(ValidationError::ItemNotFound {
            item_id: "ghost-001".to_string(),
        });
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_invalid_transition_returns_400() {
        let err = ServiceError::InvalidState(StateError::InvalidTransition {
            order_id: Uuid::new_v4(),
            action: "pay for",
            current: OrderStatus::Paid,
        });
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_concurrent_modification_returns_409() {
        let err = ServiceError::InvalidState(StateError::ConcurrentModification {
            order_id: Uuid::new_v4(),
            action: "pay for",
            current: OrderStatus::Cancelled,
        });
        assert_eq!(err.status_code(), StatusCode::CONFLICT);
        assert_eq!(err.to_response().code, "CONCURRENT_MODIFICATION");
    }

    #[test]
    fn test_dependency_error_returns_500() {
        let err = ServiceError::Dependency(DependencyError::Backend {
            message: "cart cache timed out".to_string(),
        });
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_config_error_returns_500() {
        let err = ServiceError::Config(ConfigError::IoError {
            message: "missing".to_string(),
        });
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}

// =============================================================================
// Error Response Format Tests
// =============================================================================

mod error_response_tests {
    use super::*;

    #[test]
    fn test_invalid_transition_names_current_status() {
        let err = ServiceError::InvalidState(StateError::InvalidTransition {
            order_id: Uuid::nil(),
            action: "pay for",
            current: OrderStatus::Paid,
        });

        let response = err.to_response();

        assert!(!response.success);
        assert_eq!(response.code, "INVALID_STATE");
        assert_eq!(response.message, "Cannot pay for order with status PAID");
    }

    #[test]
    fn test_empty_checkout_message() {
        let err: ServiceError = ValidationError::EmptyCheckout.into();
        let response = err.to_response();

        assert_eq!(response.code, "EMPTY_CHECKOUT");
        assert_eq!(response.message, "Cannot checkout empty cart");
    }

    #[test]
    fn test_missing_argument_message() {
        let err: ServiceError = ValidationError::MissingArgument {
            argument: "date".to_string(),
        }
        .into();

        assert_eq!(err.to_response().message, "date is required");
    }

    #[test]
    fn test_server_errors_use_generic_message() {
        let err = ServiceError::Dependency(DependencyError::Backend {
            message: "connection refused at 10.0.0.7".to_string(),
        });

        let response = err.to_response();

        assert_eq!(response.message, "Internal server error");
        assert_eq!(response.code, "DEPENDENCY_ERROR");
    }

    #[tokio::test]
    async fn test_into_response_writes_envelope() {
        let err = ServiceError::NotFound(NotFoundError::Order { id: Uuid::new_v4() });

        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["success"], false);
        assert_eq!(body["message"], "Order not found");
        assert_eq!(body["code"], "ORDER_NOT_FOUND");
    }

    #[tokio::test]
    async fn test_internal_error_response_hides_detail() {
        let err = ServiceError::Internal("xlsx writer exploded".to_string());

        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["message"], "Internal server error");
    }
}

// =============================================================================
// Error Conversion Tests
// =============================================================================

mod error_conversion_tests {
    use super::*;

    #[test]
    fn test_serde_json_error_converts_to_invalid_json() {
        let json_err = serde_json::from_str::<Value>("{not json").unwrap_err();

        let err: ServiceError = json_err.into();

        assert!(matches!(
            err,
            ServiceError::Validation(ValidationError::InvalidJson { .. })
        ));
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_yaml_error_converts_to_config_error() {
        let yaml_err = serde_yaml::from_str::<Value>("a: [1, 2").unwrap_err();

        let err: ServiceError = yaml_err.into();

        assert!(matches!(
            err,
            ServiceError::Config(ConfigError::ParseError { .. })
        ));
    }

    #[test]
    fn test_anyhow_error_converts_to_dependency_error() {
        let err: ServiceError = anyhow::anyhow!("cache offline").into();

        assert!(matches!(err, ServiceError::Dependency(_)));
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_not_found_error_converts() {
        let err: ServiceError = NotFoundError::Restaurant {
            id: "nowhere".to_string(),
        }
        .into();

        assert!(matches!(
            err,
            ServiceError::NotFound(NotFoundError::Restaurant { .. })
        ));
        assert_eq!(err.to_string(), "Restaurant 'nowhere' not found");
    }
}

// =============================================================================
// Error Pattern Matching Tests
// =============================================================================

mod error_matching_tests {
    use super::*;

    #[test]
    fn test_parse_order_id_rejects_malformed_ids() {
        for value in ["12345", "", "not-a-uuid"] {
            match parse_order_id(value) {
                Err(ServiceError::Validation(ValidationError::InvalidId { .. })) => {}
                other => panic!("Expected InvalidId for {:?}, got {:?}", value, other),
            }
        }
    }

    #[test]
    fn test_parse_order_id_accepts_uuid() {
        let id = Uuid::new_v4();
        assert_eq!(parse_order_id(&id.to_string()).unwrap(), id);
    }

    #[tokio::test]
    async fn test_engine_returns_typed_not_found() {
        let host = ServerBuilder::new().build_host().unwrap();
        let missing = Uuid::new_v4();

        match host.orders.get(&missing.to_string()).await {
            Err(ServiceError::NotFound(NotFoundError::Order { id })) => {
                assert_eq!(id, missing);
            }
            other => panic!("Expected NotFoundError::Order, got {:?}", other),
        }
    }
}
