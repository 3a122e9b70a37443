//! 存储模块
//!
//! 提供内存缓存和磁盘持久化缓存。

pub mod disk;
pub mod memory;

pub use disk::{DiskCache, DiskCacheEntry};
pub use memory::{generate_cache_key, CacheEntry, CacheStats, MemoryCache};
