// shared/src/lib.rs

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("cache backend unavailable: {0}")]
    Unavailable(String),
}

// The cache backend is the only fallible shared resource
pub type CacheError = Error;
pub type Result<T> = std::result::Result<T, Error>;

pub mod config;
