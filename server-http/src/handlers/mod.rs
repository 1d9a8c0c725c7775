pub mod cache_admin;
pub mod health;
pub mod search;
pub mod searches;

pub use cache_admin::{cache_stats, invalidate_cache};
pub use health::health_check;
pub use search::{refresh, scrape};
pub use searches::popular_searches;
