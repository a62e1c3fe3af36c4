//! Runtime caches used by application services.
//!
//! - [`ttl::TtlCache`]: ledger snapshots with TTL-based expiration

pub mod ttl;

pub use ttl::TtlCache;
