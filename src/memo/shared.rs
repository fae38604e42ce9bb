use std::cell::RefCell;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;
use std::sync::{Arc, Mutex, PoisonError};
use std::task::{Context, Poll, Wake, Waker};

use slab::Slab;

/// A cloneable handle to a future that is polled at most once to completion.
///
/// Every handle resolves with a clone of the same output. Whichever handle is
/// polled drives the inner future; the others are woken when it finishes.
pub(crate) struct Shared<Fut: Future> {
    inner: Rc<Inner<Fut>>,
    slot: usize,
}

struct Inner<Fut: Future> {
    state: RefCell<State<Fut>>,
    notifier: Arc<Notifier>,
}

enum State<Fut: Future> {
    Pending(Pin<Box<Fut>>),
    Done(Fut::Output),
}

/// Wakes every handle that is waiting on the inner future.
#[derive(Default)]
struct Notifier {
    wakers: Mutex<Slab<Option<Waker>>>,
}

impl Notifier {
    fn register(&self) -> usize {
        self.lock().insert(None)
    }

    fn unregister(&self, slot: usize) {
        self.lock().try_remove(slot);
    }

    fn store(&self, slot: usize, waker: &Waker) {
        if let Some(stored) = self.lock().get_mut(slot) {
            match stored {
                Some(old) if old.will_wake(waker) => {}
                _ => *stored = Some(waker.clone()),
            }
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Slab<Option<Waker>>> {
        self.wakers.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Wake for Notifier {
    fn wake(self: Arc<Self>) {
        self.wake_by_ref();
    }

    fn wake_by_ref(self: &Arc<Self>) {
        // Wake outside the lock, a waker may poll a handle right away.
        let wakers: Vec<Waker> = self
            .lock()
            .iter_mut()
            .filter_map(|(_, waker)| waker.take())
            .collect();
        for waker in wakers {
            waker.wake();
        }
    }
}

impl<Fut: Future> Shared<Fut> {
    pub(crate) fn new(future: Fut) -> Self {
        let notifier = Arc::new(Notifier::default());
        let slot = notifier.register();
        Self {
            inner: Rc::new(Inner {
                state: RefCell::new(State::Pending(Box::pin(future))),
                notifier,
            }),
            slot,
        }
    }

    /// Returns `true` if both handles point at the same inner future.
    pub(crate) fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl<Fut: Future> Clone for Shared<Fut> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
            slot: self.inner.notifier.register(),
        }
    }
}

impl<Fut: Future> Drop for Shared<Fut> {
    fn drop(&mut self) {
        self.inner.notifier.unregister(self.slot);
    }
}

impl<Fut: Future> Unpin for Shared<Fut> {}

impl<Fut> Future for Shared<Fut>
where
    Fut: Future,
    Fut::Output: Clone,
{
    type Output = Fut::Output;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let inner = &self.inner;
        inner.notifier.store(self.slot, cx.waker());

        // Another handle is polling the inner future further up this stack.
        let Ok(mut state) = inner.state.try_borrow_mut() else {
            return Poll::Pending;
        };
        let output = match &mut *state {
            State::Done(output) => return Poll::Ready(output.clone()),
            State::Pending(future) => {
                let waker = Waker::from(Arc::clone(&inner.notifier));
                match future.as_mut().poll(&mut Context::from_waker(&waker)) {
                    Poll::Ready(output) => output,
                    Poll::Pending => return Poll::Pending,
                }
            }
        };
        *state = State::Done(output.clone());
        drop(state);
        Wake::wake_by_ref(&inner.notifier);
        Poll::Ready(output)
    }
}

impl<Fut: Future> fmt::Debug for Shared<Fut> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let done = matches!(
            self.inner.state.try_borrow().as_deref(),
            Ok(State::Done(_))
        );
        f.debug_struct("Shared")
            .field("done", &done)
            .field("handles", &Rc::strong_count(&self.inner))
            .finish()
    }
}
