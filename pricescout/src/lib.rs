#![deny(clippy::all)]

pub mod aggregator;
pub mod cache;
pub mod connectors;
pub mod domain;
pub mod error;
pub mod history;
pub mod orchestrator;
pub mod ports;
pub mod query;
pub mod registry;
pub mod service;

#[cfg(test)]
pub(crate) mod testing;

pub use shared::config::ProductOrdering;
