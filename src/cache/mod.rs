//! Disk snapshots of fetched data for instant startup rendering.

pub mod manager;

pub use manager::{CacheManager, CachedData};
