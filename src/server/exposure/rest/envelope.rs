//! Response envelope and request helpers shared by the REST handlers

use crate::core::error::ServiceResult;
use crate::server::host::ServerHost;
use axum::Json;
use axum::body::Bytes;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use serde::de::DeserializeOwned;

/// Header selecting the caller's staging cart
pub const CART_SESSION_HEADER: &str = "x-cart-session";

/// Uniform success body: `{success, data?, message?, count?}`
///
/// Failures use [`ErrorResponse`](crate::core::error::ErrorResponse) with
/// the same `success`/`message` keys.
#[derive(Debug, Serialize)]
pub struct Envelope<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
    #[serde(skip)]
    status: StatusCode,
}

impl<T: Serialize> Envelope<T> {
    pub fn data(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
            count: None,
            status: StatusCode::OK,
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn with_count(mut self, count: usize) -> Self {
        self.count = Some(count);
        self
    }

    pub fn with_status(mut self, status: StatusCode) -> Self {
        self.status = status;
        self
    }
}

impl Envelope<()> {
    /// Body with a message and no data
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            success: true,
            data: None,
            message: Some(message.into()),
            count: None,
            status: StatusCode::OK,
        }
    }
}

impl<T: Serialize> IntoResponse for Envelope<T> {
    fn into_response(self) -> Response {
        (self.status, Json(self)).into_response()
    }
}

/// Decode an optional JSON body; an empty body decodes as `T::default()`
///
/// Malformed JSON becomes a 400 with the failure envelope instead of axum's
/// plain-text rejection.
pub fn parse_body<T: DeserializeOwned + Default>(body: &Bytes) -> ServiceResult<T> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(T::default());
    }
    Ok(serde_json::from_slice(body)?)
}

/// Cart session named by the request, falling back to the configured default
pub fn cart_session(headers: &HeaderMap, host: &ServerHost) -> String {
    headers
        .get(CART_SESSION_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|session| !session.is_empty())
        .unwrap_or(host.default_session())
        .to_string()
}
