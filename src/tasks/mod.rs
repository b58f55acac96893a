//! Background Tasks Module
//!
//! Contains the tasks that run on the tokio runtime on behalf of memoized
//! functions.
//!
//! # Tasks
//! - Expiry timer: removes one cache entry when its max age elapses

mod expiry;

pub use expiry::{spawn_expiry_timer, Expire};
