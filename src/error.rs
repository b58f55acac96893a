//! Error types for the memoization layer
//!
//! Provides unified error handling using thiserror. Errors produced by a
//! memoized function are never converted into these; they reach the caller
//! unchanged.

use thiserror::Error;

// == Memoize Error Enum ==
/// Errors raised by the clear protocol.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MemoizeError {
    /// The value was never produced by one of the memoize functions
    #[error("can't clear a function that was not memoized")]
    InvalidArgument,

    /// The backing store has no clear capability
    #[error("the cache store can't be cleared")]
    Unsupported,
}

// == Result Type Alias ==
/// Convenience Result type for the memoization layer.
pub type Result<T> = std::result::Result<T, MemoizeError>;
