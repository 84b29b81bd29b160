//! Response cache with per-category TTL support.
//!
//! This crate provides the in-memory cache that sits in front of the
//! GraphQL client:
//! - Each entry carries an absolute expiry computed from its category's TTL
//! - Expired entries are evicted lazily on read, or in bulk via `cleanup`
//! - All access is serialized under one lock, so the cache can be shared
//!   freely between tasks and threads
//!
//! # Example
//!
//! ```rust,ignore
//! use leetlens_cache::{TtlCache, TtlPolicy, category};
//!
//! let cache: TtlCache<String> = TtlCache::new(TtlPolicy::default());
//! cache.set("user:alice", "payload".to_string(), category::PROFILE);
//! assert_eq!(cache.get("user:alice").as_deref(), Some("payload"));
//! ```

mod cache;
mod error;
mod policy;

pub use cache::{CacheEntry, CacheStats, TtlCache};
pub use error::{Error, Result};
pub use policy::{DEFAULT_TTL, MAX_TTL, TtlPolicy, category};
