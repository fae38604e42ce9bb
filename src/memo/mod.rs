//! Memoization of asynchronous functions.
//!
//! [`memoize`] wraps a function returning a fallible future. Calls that map to
//! the same cache key share one invocation: a call made while an earlier one
//! is still in flight waits on the same future instead of starting another.
//! Successful outputs stay cached until [`Memoized::clear`]. Failures are
//! evicted, so the next call with that key invokes the function again.
//!
//! The cache is single-threaded: [`Memoized`] and its futures are `!Send`.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::hash::Hash;
use std::pin::Pin;
use std::rc::Rc;
use std::task::{Context, Poll};

mod shared;

use shared::Shared;

type Cache<K, Fut> = Rc<RefCell<HashMap<K, Shared<Fut>>>>;

/// Memoize `f`, keying each call on `cache_key(&args)`.
///
/// # Examples
///
/// ```
/// use futures_flow::memo::memoize;
/// use std::cell::Cell;
///
/// futures_flow::runtime::block_on(async {
///     let calls = Cell::new(0);
///     let lookup = memoize(
///         |id: u32| {
///             calls.set(calls.get() + 1);
///             async move { Ok::<_, String>(format!("user-{id}")) }
///         },
///         |id: &u32| *id,
///     );
///
///     assert_eq!(lookup.call(7).await, Ok("user-7".to_string()));
///     assert_eq!(lookup.call(7).await, Ok("user-7".to_string()));
///     assert_eq!(calls.get(), 1);
/// });
/// ```
pub fn memoize<A, K, F, KF, Fut>(f: F, cache_key: KF) -> Memoized<F, KF, K, Fut>
where
    F: Fn(A) -> Fut,
    KF: Fn(&A) -> K,
    K: Eq + Hash + Clone,
    Fut: Future,
{
    Memoized {
        f,
        cache_key,
        cache: Rc::new(RefCell::new(HashMap::new())),
    }
}

/// A memoized asynchronous function.
///
/// This `struct` is created by [`memoize`]. See its documentation for more.
pub struct Memoized<F, KF, K, Fut: Future> {
    f: F,
    cache_key: KF,
    cache: Cache<K, Fut>,
}

impl<F, KF, K, Fut> Memoized<F, KF, K, Fut>
where
    K: Eq + Hash + Clone,
    Fut: Future,
{
    /// Call the function, or join the cached call for the same key.
    pub fn call<A>(&self, args: A) -> Memo<K, Fut>
    where
        F: Fn(A) -> Fut,
        KF: Fn(&A) -> K,
    {
        let key = (self.cache_key)(&args);
        let cached = self.cache.borrow().get(&key).cloned();
        let shared = match cached {
            Some(shared) => {
                tracing::trace!("memo hit");
                shared
            }
            None => {
                tracing::trace!("memo miss");
                // `f` may call back into this cache, so no borrow is held.
                let shared = Shared::new((self.f)(args));
                self.cache.borrow_mut().insert(key.clone(), shared.clone());
                shared
            }
        };
        Memo {
            shared,
            key: Some(key),
            cache: Rc::clone(&self.cache),
        }
    }

    /// Drop every cached entry. Calls already in flight still resolve.
    pub fn clear(&self) {
        self.cache.borrow_mut().clear();
    }

    /// The number of cached entries, settled or not.
    pub fn len(&self) -> usize {
        self.cache.borrow().len()
    }

    /// Returns `true` if nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.cache.borrow().is_empty()
    }
}

impl<F, KF, K, Fut: Future> fmt::Debug for Memoized<F, KF, K, Fut> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Memoized")
            .field("cached", &self.cache.borrow().len())
            .finish()
    }
}

/// The future returned by [`Memoized::call`].
#[must_use = "futures do nothing unless polled or .awaited"]
pub struct Memo<K, Fut: Future> {
    shared: Shared<Fut>,
    key: Option<K>,
    cache: Cache<K, Fut>,
}

// The key is never pinned.
impl<K, Fut: Future> Unpin for Memo<K, Fut> {}

impl<K, Fut, T, E> Future for Memo<K, Fut>
where
    K: Eq + Hash,
    Fut: Future<Output = Result<T, E>>,
    T: Clone,
    E: Clone,
{
    type Output = Result<T, E>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = &mut *self;
        let output = match Pin::new(&mut this.shared).poll(cx) {
            Poll::Ready(output) => output,
            Poll::Pending => return Poll::Pending,
        };
        if output.is_err() {
            if let Some(key) = this.key.take() {
                let mut cache = this.cache.borrow_mut();
                // Only evict our own entry, the key may have been cleared and
                // called again since.
                if cache.get(&key).is_some_and(|cached| cached.ptr_eq(&this.shared)) {
                    tracing::debug!("memoized call failed, evicting");
                    cache.remove(&key);
                }
            }
        }
        Poll::Ready(output)
    }
}

impl<K, Fut: Future> fmt::Debug for Memo<K, Fut> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Memo").field("shared", &self.shared).finish()
    }
}
