//! Argument Values
//!
//! Identity handles and dynamically typed arguments.

use std::any::Any;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::Deref;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

static NEXT_REF_ID: AtomicU64 = AtomicU64::new(1);

// == Ref ==
/// A shared reference with a process-unique identity.
///
/// Clones share the identity of the original; two separately created `Ref`s
/// never compare equal, even when their contents do. Default cache keys
/// use the identity, never the contents.
pub struct Ref<T: ?Sized> {
    id: u64,
    inner: Arc<T>,
}

impl<T> Ref<T> {
    /// Wraps `value` under a fresh identity.
    pub fn new(value: T) -> Self {
        Self::from_arc(Arc::new(value))
    }
}

impl<T: ?Sized> Ref<T> {
    /// Wraps an existing `Arc` under a fresh identity.
    pub fn from_arc(inner: Arc<T>) -> Self {
        Self {
            id: NEXT_REF_ID.fetch_add(1, Ordering::Relaxed),
            inner,
        }
    }

    /// Returns the identity of this reference.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Returns a weak handle on the referenced value.
    pub fn downgrade(&self) -> Weak<T> {
        Arc::downgrade(&self.inner)
    }

    /// Returns the underlying `Arc`.
    pub fn as_arc(&self) -> &Arc<T> {
        &self.inner
    }
}

impl<T: Any + Send + Sync> Ref<T> {
    /// Erases the value type, keeping the identity.
    pub fn into_any(self) -> Ref<dyn Any + Send + Sync> {
        Ref {
            id: self.id,
            inner: self.inner,
        }
    }
}

impl<T: ?Sized> Clone for Ref<T> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: ?Sized> Deref for Ref<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.inner
    }
}

impl<T: ?Sized> PartialEq for Ref<T> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl<T: ?Sized> Eq for Ref<T> {}

impl<T: ?Sized> Hash for Ref<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl<T: ?Sized> fmt::Debug for Ref<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Ref(#{})", self.id)
    }
}

// == Arg ==
/// A dynamically typed argument.
#[derive(Debug, Clone)]
pub enum Arg {
    /// No value at all
    Undefined,
    /// An explicit empty value
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    /// Anything passed by reference: objects, callbacks, unique tokens
    Ref(Ref<dyn Any + Send + Sync>),
}

impl From<bool> for Arg {
    fn from(value: bool) -> Self {
        Arg::Bool(value)
    }
}

impl From<f64> for Arg {
    fn from(value: f64) -> Self {
        Arg::Number(value)
    }
}

impl From<i32> for Arg {
    fn from(value: i32) -> Self {
        Arg::Number(f64::from(value))
    }
}

impl From<&str> for Arg {
    fn from(value: &str) -> Self {
        Arg::String(value.to_string())
    }
}

impl From<String> for Arg {
    fn from(value: String) -> Self {
        Arg::String(value)
    }
}

impl<T: Any + Send + Sync> From<Ref<T>> for Arg {
    fn from(value: Ref<T>) -> Self {
        Arg::Ref(value.into_any())
    }
}
