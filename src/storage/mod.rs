//! Storage implementations for the order core's collaborators

pub mod in_memory;

pub use in_memory::{InMemoryCartCache, InMemoryCatalog, InMemoryOrderStore};
