//! Memoization Wrapper
//!
//! Wraps a function so results are cached by argument key, with optional
//! max age, a custom key function and a pluggable store.
//!
//! Functions with several parameters take them as one tuple:
//!
//! ```
//! use memo_cache::{memoize, Options};
//!
//! let add = memoize(|(a, b): (i32, i32)| a + b, Options::new());
//! assert_eq!(add((1, 2)), 3);
//! ```

mod memoizer;
mod method;
mod options;

pub use method::{AsyncMemoizedMethod, MemoizedMethod, TryMemoizedMethod};
pub use options::{MaxAge, Options};

use std::any::type_name;
use std::future::Future;
use std::sync::Arc;

use futures::future::{BoxFuture, Shared};

use self::memoizer::Memoizer;
use crate::registry::{self, Registered};

/// A memoized function.
///
/// A new callable distinct from the original. Clones share one cache; the
/// registry recognises any clone as the same function.
pub type MemoFn<A, R> = Arc<dyn Fn(A) -> R + Send + Sync>;

/// Result handle of a memoized async function.
///
/// Every call that hits the same pending computation receives a clone of
/// the same shared future and observes the same outcome.
pub type MemoFuture<T, E> = Shared<BoxFuture<'static, Result<T, E>>>;

fn wrap<A, V, K, R>(
    memoizer: Arc<Memoizer<A, V, K>>,
    call: impl Fn(&Arc<Memoizer<A, V, K>>, A) -> R + Send + Sync + 'static,
) -> MemoFn<A, R>
where
    A: 'static,
    V: Clone + 'static,
    K: Clone + Send + Sync + 'static,
    R: 'static,
{
    let registered: Arc<dyn Registered> = memoizer.clone();
    let wrapped: MemoFn<A, R> = Arc::new(move |args: A| call(&memoizer, args));
    registry::register(&wrapped, Arc::downgrade(&registered));
    wrapped
}

// == Memoize ==
/// Memoizes an infallible function.
///
/// The first call with a given key invokes `func`; later calls with the
/// same key return a clone of the stored result until it expires.
pub fn memoize<A, R, K, F>(func: F, options: Options<A, R, K>) -> MemoFn<A, R>
where
    F: Fn(A) -> R + Send + Sync + 'static,
    A: 'static,
    R: Clone + 'static,
    K: Clone + Send + Sync + 'static,
{
    let memoizer = Arc::new(Memoizer::new(options, type_name::<F>()));
    wrap(memoizer, move |memoizer, args| memoizer.call(args, &func))
}

// == Memoize Try ==
/// Memoizes a fallible function.
///
/// Only `Ok` results are cached. An `Err` removes whatever was cached under
/// the call's key and is returned unchanged, so the next call recomputes.
pub fn memoize_try<A, T, E, K, F>(func: F, options: Options<A, T, K>) -> MemoFn<A, Result<T, E>>
where
    F: Fn(A) -> Result<T, E> + Send + Sync + 'static,
    A: 'static,
    T: Clone + 'static,
    E: 'static,
    K: Clone + Send + Sync + 'static,
{
    let memoizer = Arc::new(Memoizer::new(options, type_name::<F>()));
    wrap(memoizer, move |memoizer, args| memoizer.try_call(args, &func))
}

// == Memoize Async ==
/// Memoizes an async function.
///
/// The returned future is cached before it settles: overlapping calls with
/// the same key share one computation. A computation that fails removes its
/// entry before any caller observes the error.
pub fn memoize_async<A, T, E, K, F, Fut>(
    func: F,
    options: Options<A, MemoFuture<T, E>, K>,
) -> MemoFn<A, MemoFuture<T, E>>
where
    F: Fn(A) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<T, E>> + Send + 'static,
    A: 'static,
    T: Clone + Send + Sync + 'static,
    E: Clone + Send + Sync + 'static,
    K: Clone + Send + Sync + 'static,
{
    let memoizer = Arc::new(Memoizer::new(options, type_name::<F>()));
    wrap(memoizer, move |memoizer, args| {
        memoizer.call_async(args, &func)
    })
}
