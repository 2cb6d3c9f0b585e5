//! Cache module for widget data fetched over the network
//!
//! Entries are stored through a `KeyValueStore`, one slot per cache key,
//! stamped with the time they were written and a fingerprint of the request
//! parameters that produced them. A lookup is served from cache only while
//! the entry is younger than the caller's TTL and was produced by the same
//! parameters; otherwise the caller's fetcher runs and its result replaces
//! the entry.

mod clock;
mod entry;
mod fingerprint;
mod manager;

pub use clock::{Clock, ManualClock, SystemClock};
pub use entry::CacheEntry;
pub use fingerprint::fingerprint;
pub use manager::{CacheManager, CacheStatus};
