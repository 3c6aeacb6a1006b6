use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::thread::{self, ThreadId};

use crate::Value;
use crate::deferred::{DeferredRef, UnwrapError};

type Init = Box<dyn FnOnce() -> Option<Arc<dyn Value>> + Send>;

enum State {
    Pending(Init),
    Forcing(ThreadId),
    Ready(Option<Arc<dyn Value>>),
    Poisoned,
}

/// A memoizing holder, initialized on first use.
///
/// The memoized value is itself unwrapped, so a lazy holder of a provider
/// yields the provider's value.
///
/// Forcing a holder from inside its own initializer is reported as
/// [`UnwrapError::Reentrant`]. Other threads forcing it meanwhile wait for
/// the first initialization to finish.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use stash_bean::deferred::Lazy;
///
/// let classpath = Lazy::new(|| Some(Arc::new(String::from("lib/a.jar"))));
///
/// let first = classpath.force().unwrap().unwrap();
/// let again = classpath.force().unwrap().unwrap();
/// assert!(Arc::ptr_eq(&first, &again));
/// ```
pub struct Lazy {
    state: Mutex<State>,
    ready: Condvar,
}

impl Lazy {
    /// Creates a holder initialized by `init`.
    pub fn new<F>(init: F) -> Self
    where
        F: FnOnce() -> Option<Arc<dyn Value>> + Send + 'static,
    {
        Self {
            state: Mutex::new(State::Pending(Box::new(init))),
            ready: Condvar::new(),
        }
    }

    /// Creates an already initialized holder.
    pub fn ready(value: Option<Arc<dyn Value>>) -> Self {
        Self {
            state: Mutex::new(State::Ready(value)),
            ready: Condvar::new(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Returns `true` if the value has been computed.
    pub fn is_initialized(&self) -> bool {
        matches!(*self.lock(), State::Ready(_))
    }

    /// Returns the memoized value, computing it on first use.
    pub fn force(&self) -> Result<Option<Arc<dyn Value>>, UnwrapError> {
        let mut state = self.lock();
        loop {
            match &*state {
                State::Ready(value) => return Ok(value.clone()),
                State::Poisoned => return Err(UnwrapError::Poisoned),
                State::Forcing(owner) if *owner == thread::current().id() => {
                    return Err(UnwrapError::Reentrant { kind: "lazy value" });
                }
                State::Forcing(_) => {
                    state = self
                        .ready
                        .wait(state)
                        .unwrap_or_else(PoisonError::into_inner);
                }
                State::Pending(_) => break,
            }
        }

        let State::Pending(init) =
            core::mem::replace(&mut *state, State::Forcing(thread::current().id()))
        else {
            unreachable!("checked by the loop above");
        };
        drop(state);

        let guard = PoisonOnUnwind { lazy: self };
        let value = init();
        core::mem::forget(guard);

        *self.lock() = State::Ready(value.clone());
        self.ready.notify_all();
        Ok(value)
    }
}

// Wakes up waiting threads if the initializer panics.
struct PoisonOnUnwind<'a> {
    lazy: &'a Lazy,
}

impl Drop for PoisonOnUnwind<'_> {
    fn drop(&mut self) {
        *self.lazy.lock() = State::Poisoned;
        self.lazy.ready.notify_all();
    }
}

impl Value for Lazy {
    #[inline]
    fn as_deferred(&self) -> Option<DeferredRef<'_>> {
        Some(DeferredRef::Lazy(self))
    }
}

impl core::fmt::Debug for Lazy {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let state = match &*self.lock() {
            State::Pending(_) => "pending",
            State::Forcing(_) => "forcing",
            State::Ready(_) => "ready",
            State::Poisoned => "poisoned",
        };
        f.debug_struct("Lazy").field("state", &state).finish()
    }
}

#[cfg(test)]
mod tests {
    use core::sync::atomic::{AtomicU32, Ordering};
    use std::sync::{Arc, Barrier};
    use std::thread;

    use super::Lazy;
    use crate::Value;
    use crate::deferred::UnwrapError;

    #[test]
    fn initializer_runs_once() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();
        let lazy = Lazy::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
            Some(Arc::new(7_u8) as Arc<dyn Value>)
        });

        assert!(!lazy.is_initialized());
        for _ in 0..3 {
            let value = lazy.force().unwrap().unwrap();
            assert_eq!(value.downcast_ref::<u8>(), Some(&7));
        }
        assert!(lazy.is_initialized());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn concurrent_force_waits_for_first() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();
        let lazy = Arc::new(Lazy::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
            thread::sleep(core::time::Duration::from_millis(20));
            Some(Arc::new(1_u16) as Arc<dyn Value>)
        }));
        let barrier = Arc::new(Barrier::new(4));

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let lazy = lazy.clone();
                let barrier = barrier.clone();
                thread::spawn(move || {
                    barrier.wait();
                    lazy.force().map(|v| v.is_some())
                })
            })
            .collect();

        for handle in handles {
            assert_eq!(handle.join().unwrap(), Ok(true));
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn self_forcing_is_reentrant() {
        let slot: Arc<std::sync::OnceLock<Arc<Lazy>>> = Arc::default();
        let inner = slot.clone();
        let lazy = Arc::new(Lazy::new(move || {
            let me = inner.get().unwrap();
            assert_eq!(
                me.force().unwrap_err(),
                UnwrapError::Reentrant { kind: "lazy value" }
            );
            None
        }));
        slot.set(lazy.clone()).unwrap();

        assert!(lazy.force().unwrap().is_none());
    }

    #[test]
    fn panicking_initializer_poisons() {
        let lazy = Arc::new(Lazy::new(|| panic!("boom")));
        let forced = lazy.clone();
        assert!(thread::spawn(move || forced.force()).join().is_err());

        assert_eq!(lazy.force().unwrap_err(), UnwrapError::Poisoned);
    }
}
