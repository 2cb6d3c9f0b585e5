//! devtab core library
//!
//! The two pieces of the devtab dashboard with real behavior behind them: the
//! per-widget settings store and the TTL fetch cache used by the weather and
//! GitHub widgets, plus the HTTP clients that feed the cache.

pub mod cache;
pub mod cli;
pub mod data;
pub mod settings;
pub mod storage;
