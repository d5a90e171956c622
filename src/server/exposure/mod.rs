//! API exposure for the pickup service
//!
//! An exposure consumes a `ServerHost` and produces a Router for its
//! protocol. REST is the only one today.

pub mod rest;

pub use rest::RestExposure;
