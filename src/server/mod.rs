//! HTTP server for the pickup service
//!
//! `ServerBuilder` wires the collaborators into a `ServerHost`, and the REST
//! exposure turns the host into an axum `Router`.

pub mod builder;
pub mod exposure;
pub mod host;

pub use builder::ServerBuilder;
pub use exposure::RestExposure;
pub use host::ServerHost;
