//! Cache backends for search aggregates.

pub mod moka_cache;

pub use moka_cache::MokaEntryStore;
