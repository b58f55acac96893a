//! Memo Cache - Function memoization with TTL expiration
//!
//! Wraps functions so results are cached by argument key, with optional
//! max age, custom key derivation and pluggable backing stores. Sync,
//! fallible and async functions are supported; overlapping async calls
//! share one in-flight computation.

pub mod cache;
pub mod config;
pub mod error;
pub mod key;
pub mod memoize;
pub mod registry;
pub mod tasks;

pub use cache::{CacheEntry, CacheStats, CacheStore, MemoryStore, WeakStore};
pub use config::Config;
pub use error::{MemoizeError, Result};
pub use key::{derive_key, json_key, Arg, KeyArg, KeyArgs, Ref, DEFAULT_KEY};
pub use memoize::{
    memoize, memoize_async, memoize_try, AsyncMemoizedMethod, MaxAge, MemoFn, MemoFuture,
    MemoizedMethod, Options, TryMemoizedMethod,
};
pub use registry::{clear, name_of, stats_of};
