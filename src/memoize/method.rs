//! Memoized Methods
//!
//! Per-instance memoization of one method. Each receiving instance gets its
//! own cache the first time the method is called on it, so results are never
//! shared between instances.

use std::any::type_name;
use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Weak};

use futures::future::BoxFuture;
use futures::FutureExt;
use parking_lot::Mutex;
use tracing::debug;

use crate::cache::CacheStats;
use crate::error::Result;
use crate::key::{KeyArgs, Ref};
use crate::memoize::memoizer::Memoizer;
use crate::memoize::{MemoFuture, Options};

type Method<S, A, O> = Arc<dyn Fn(&S, A) -> O + Send + Sync>;
type OptionsFactory<A, R, K> = Arc<dyn Fn() -> Options<A, R, K> + Send + Sync>;

/// A memoized fallible method: only `Ok` results are cached.
pub type TryMemoizedMethod<S, A, T, E, K = String> =
    MemoizedMethod<S, A, T, K, std::result::Result<T, E>>;

/// A memoized async method: overlapping calls on one instance share one
/// pending computation.
pub type AsyncMemoizedMethod<S, A, T, E, K = String> =
    MemoizedMethod<S, A, MemoFuture<T, E>, K, BoxFuture<'static, std::result::Result<T, E>>>;

// == Memoized Method ==
/// A method descriptor, usually kept in a `static`:
///
/// ```
/// use std::sync::atomic::{AtomicU32, Ordering};
///
/// use memo_cache::{MemoizedMethod, Ref};
/// use once_cell::sync::Lazy;
///
/// struct Counter {
///     count: AtomicU32,
/// }
///
/// static NEXT: Lazy<MemoizedMethod<Counter, (), u32>> =
///     Lazy::new(|| MemoizedMethod::new(|this: &Counter, ()| this.count.fetch_add(1, Ordering::SeqCst)));
///
/// let counter = Ref::new(Counter { count: AtomicU32::new(0) });
/// assert_eq!(NEXT.call(&counter, ()), 0);
/// assert_eq!(NEXT.call(&counter, ()), 0);
/// ```
///
/// `R` is the cached value and `O` what the method itself returns: `R` for
/// plain methods, `Result<R, E>` for [`TryMemoizedMethod`] and a boxed
/// future for [`AsyncMemoizedMethod`].
pub struct MemoizedMethod<S: ?Sized, A, R, K = String, O = R> {
    method: Method<S, A, O>,
    options: OptionsFactory<A, R, K>,
    name: String,
    /// One memoizer per live instance, by instance identity
    instances: Mutex<HashMap<u64, (Weak<S>, Arc<Memoizer<A, R, K>>)>>,
}

impl<S, A, R> MemoizedMethod<S, A, R, String, R>
where
    S: ?Sized,
    A: KeyArgs + 'static,
    R: Clone + Send + 'static,
{
    /// Memoizes `method` with default options for every instance.
    pub fn new<F>(method: F) -> Self
    where
        F: Fn(&S, A) -> R + Send + Sync + 'static,
    {
        Self::with_options(method, Options::new)
    }
}

impl<S, A, T, E> MemoizedMethod<S, A, T, String, std::result::Result<T, E>>
where
    S: ?Sized,
    A: KeyArgs + 'static,
    T: Clone + Send + 'static,
    E: 'static,
{
    /// Memoizes a fallible `method` with default options.
    pub fn new_try<F>(method: F) -> Self
    where
        F: Fn(&S, A) -> std::result::Result<T, E> + Send + Sync + 'static,
    {
        Self::try_with_options(method, Options::new)
    }
}

impl<S, A, T, E> AsyncMemoizedMethod<S, A, T, E, String>
where
    S: ?Sized,
    A: KeyArgs + 'static,
    T: Clone + Send + Sync + 'static,
    E: Clone + Send + Sync + 'static,
{
    /// Memoizes an async `method` with default options.
    pub fn new_async<F, Fut>(method: F) -> Self
    where
        F: Fn(&S, A) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = std::result::Result<T, E>> + Send + 'static,
    {
        Self::async_with_options(method, Options::new)
    }
}

impl<S, A, R, K, O> MemoizedMethod<S, A, R, K, O>
where
    S: ?Sized,
    A: 'static,
    R: Clone + 'static,
    K: Clone + Send + Sync + 'static,
{
    fn build(method: Method<S, A, O>, options: OptionsFactory<A, R, K>, name: &str) -> Self {
        Self {
            method,
            options,
            name: name.to_string(),
            instances: Mutex::new(HashMap::new()),
        }
    }

    fn memoizer_for(&self, this: &Ref<S>) -> Arc<Memoizer<A, R, K>> {
        let mut instances = self.instances.lock();
        if let Some((_, memoizer)) = instances.get(&this.id()) {
            return Arc::clone(memoizer);
        }

        instances.retain(|_, (owner, _)| owner.strong_count() > 0);
        let memoizer = Arc::new(Memoizer::new((self.options)(), &self.name));
        instances.insert(this.id(), (this.downgrade(), Arc::clone(&memoizer)));
        debug!(method = %self.name, instance = this.id(), "Memoizing method for new instance");
        memoizer
    }

    /// Clears the cache of one instance.
    ///
    /// An instance the method was never called on has nothing to clear.
    pub fn clear(&self, this: &Ref<S>) -> Result<()> {
        let memoizer = self.instances.lock().get(&this.id()).map(|(_, m)| Arc::clone(m));
        match memoizer {
            Some(memoizer) => memoizer.clear(),
            None => Ok(()),
        }
    }

    /// Returns the cache statistics of one instance.
    pub fn stats(&self, this: &Ref<S>) -> Option<CacheStats> {
        let memoizer = self.instances.lock().get(&this.id()).map(|(_, m)| Arc::clone(m));
        memoizer.map(|memoizer| memoizer.stats())
    }
}

impl<S, A, R, K> MemoizedMethod<S, A, R, K, R>
where
    S: ?Sized,
    A: 'static,
    R: Clone + 'static,
    K: Clone + Send + Sync + 'static,
{
    /// Memoizes `method`; `options` builds the configuration of each
    /// instance's cache.
    pub fn with_options<F, O>(method: F, options: O) -> Self
    where
        F: Fn(&S, A) -> R + Send + Sync + 'static,
        O: Fn() -> Options<A, R, K> + Send + Sync + 'static,
    {
        Self::build(Arc::new(method), Arc::new(options), type_name::<F>())
    }

    // == Call ==
    /// Invokes the method on `this`, answering from `this`'s cache.
    pub fn call(&self, this: &Ref<S>, args: A) -> R {
        let memoizer = self.memoizer_for(this);
        memoizer.call(args, |args| (self.method)(&**this, args))
    }
}

impl<S, A, T, E, K> MemoizedMethod<S, A, T, K, std::result::Result<T, E>>
where
    S: ?Sized,
    A: 'static,
    T: Clone + 'static,
    K: Clone + Send + Sync + 'static,
{
    /// Memoizes a fallible `method` with per-instance `options`.
    pub fn try_with_options<F, O>(method: F, options: O) -> Self
    where
        F: Fn(&S, A) -> std::result::Result<T, E> + Send + Sync + 'static,
        O: Fn() -> Options<A, T, K> + Send + Sync + 'static,
    {
        Self::build(Arc::new(method), Arc::new(options), type_name::<F>())
    }

    // == Try Call ==
    /// Like `call`; an `Err` is returned unchanged and never cached.
    pub fn try_call(&self, this: &Ref<S>, args: A) -> std::result::Result<T, E> {
        let memoizer = self.memoizer_for(this);
        memoizer.try_call(args, |args| (self.method)(&**this, args))
    }
}

impl<S, A, T, E, K> AsyncMemoizedMethod<S, A, T, E, K>
where
    S: ?Sized,
    A: 'static,
    T: Clone + Send + Sync + 'static,
    E: Clone + Send + Sync + 'static,
    K: Clone + Send + Sync + 'static,
{
    /// Memoizes an async `method` with per-instance `options`.
    pub fn async_with_options<F, Fut, O>(method: F, options: O) -> Self
    where
        F: Fn(&S, A) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = std::result::Result<T, E>> + Send + 'static,
        O: Fn() -> Options<A, MemoFuture<T, E>, K> + Send + Sync + 'static,
    {
        let name = type_name::<F>();
        let boxed: Method<S, A, BoxFuture<'static, std::result::Result<T, E>>> =
            Arc::new(move |this: &S, args: A| method(this, args).boxed());
        Self::build(boxed, Arc::new(options), name)
    }

    // == Call Async ==
    /// Starts or joins the computation for `args` on `this`.
    pub fn call_async(&self, this: &Ref<S>, args: A) -> MemoFuture<T, E> {
        let memoizer = self.memoizer_for(this);
        memoizer.call_async(args, |args| (self.method)(&**this, args))
    }
}
