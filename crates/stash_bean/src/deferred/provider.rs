use std::sync::Arc;

use crate::Value;
use crate::deferred::DeferredRef;

type ProviderFn = dyn Fn() -> Option<Arc<dyn Value>> + Send + Sync;
type ProducerFn = dyn Fn() -> Arc<dyn Value> + Send + Sync;

// -----------------------------------------------------------------------------
// Provider

/// A provider of an optional current value, computed on every query.
///
/// Cloning a provider shares the computation; clones have the same
/// identity during unwrapping.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use stash_bean::deferred::Provider;
///
/// let version = Provider::new(|| Some(Arc::new("1.2.0")));
/// let absent = Provider::absent();
///
/// assert!(version.get().is_some());
/// assert!(absent.get().is_none());
/// ```
#[derive(Clone)]
pub struct Provider {
    func: Arc<ProviderFn>,
}

impl Provider {
    /// Creates a provider computing its value with `func`.
    pub fn new<F>(func: F) -> Self
    where
        F: Fn() -> Option<Arc<dyn Value>> + Send + Sync + 'static,
    {
        Self {
            func: Arc::new(func),
        }
    }

    /// Creates a provider of a fixed value.
    pub fn of(value: impl Value) -> Self {
        let value: Arc<dyn Value> = Arc::new(value);
        Self::new(move || Some(value.clone()))
    }

    /// Creates a provider without value.
    pub fn absent() -> Self {
        Self::new(|| None)
    }

    /// Returns a provider applying `map` to the present values of this one.
    pub fn map<F>(&self, map: F) -> Self
    where
        F: Fn(Arc<dyn Value>) -> Option<Arc<dyn Value>> + Send + Sync + 'static,
    {
        let source = self.clone();
        Self::new(move || source.get().and_then(&map))
    }

    /// Queries the current value.
    #[inline]
    pub fn get(&self) -> Option<Arc<dyn Value>> {
        (self.func)()
    }

    pub(crate) fn identity(&self) -> usize {
        Arc::as_ptr(&self.func).cast::<()>().addr()
    }
}

impl Value for Provider {
    #[inline]
    fn as_deferred(&self) -> Option<DeferredRef<'_>> {
        Some(DeferredRef::Provider(self))
    }
}

impl core::fmt::Debug for Provider {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Provider").finish_non_exhaustive()
    }
}

// -----------------------------------------------------------------------------
// Producer

/// A zero-argument callable whose result is the value.
///
/// Unlike [`Provider`], a producer always yields something; an absent result
/// is expressed by producing an absent value such as `None::<T>`.
///
/// # Examples
///
/// ```
/// use stash_bean::deferred::Producer;
///
/// let jobs = Producer::new(|| 4_u32);
/// assert_eq!(jobs.call().downcast_ref::<u32>(), Some(&4));
/// ```
#[derive(Clone)]
pub struct Producer {
    func: Arc<ProducerFn>,
}

impl Producer {
    /// Creates a producer of the values returned by `func`.
    pub fn new<T, F>(func: F) -> Self
    where
        T: Value,
        F: Fn() -> T + Send + Sync + 'static,
    {
        Self::new_shared(move || Arc::new(func()) as Arc<dyn Value>)
    }

    /// Creates a producer of already shared values.
    pub fn new_shared<F>(func: F) -> Self
    where
        F: Fn() -> Arc<dyn Value> + Send + Sync + 'static,
    {
        Self {
            func: Arc::new(func),
        }
    }

    /// Invokes the producer.
    #[inline]
    pub fn call(&self) -> Arc<dyn Value> {
        (self.func)()
    }

    pub(crate) fn identity(&self) -> usize {
        Arc::as_ptr(&self.func).cast::<()>().addr()
    }
}

impl Value for Producer {
    #[inline]
    fn as_deferred(&self) -> Option<DeferredRef<'_>> {
        Some(DeferredRef::Producer(self))
    }
}

impl core::fmt::Debug for Producer {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Producer").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use core::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    use super::{Producer, Provider};
    use crate::Value;

    #[test]
    fn provider_is_queried_every_time() {
        let counter = Arc::new(AtomicU32::new(0));
        let source = counter.clone();
        let provider =
            Provider::new(move || Some(Arc::new(source.fetch_add(1, Ordering::Relaxed)) as _));

        assert_eq!(provider.get().unwrap().downcast_ref::<u32>(), Some(&0));
        assert_eq!(provider.get().unwrap().downcast_ref::<u32>(), Some(&1));
        assert_eq!(counter.load(Ordering::Relaxed), 2);
    }

    #[test]
    fn map_skips_absent_values() {
        let doubled = Provider::of(21_i64).map(|v| {
            let v = *v.downcast_ref::<i64>()?;
            Some(Arc::new(v * 2) as Arc<dyn Value>)
        });
        let absent = Provider::absent().map(|v| Some(v));

        assert_eq!(doubled.get().unwrap().downcast_ref::<i64>(), Some(&42));
        assert!(absent.get().is_none());
    }

    #[test]
    fn clones_share_identity() {
        let provider = Provider::absent();
        let producer = Producer::new(|| 1_u8);

        assert_eq!(provider.identity(), provider.clone().identity());
        assert_eq!(producer.identity(), producer.clone().identity());
        assert_ne!(provider.identity(), Provider::absent().identity());
    }
}
