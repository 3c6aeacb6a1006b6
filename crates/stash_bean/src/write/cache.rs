use core::any::TypeId;
use std::sync::{Arc, PoisonError, RwLock};

use stash_utils::TypeIdMap;

use crate::bean::FieldResolver;
use crate::write::BeanPropertyWriter;

/// Bean writers by type, built on first use.
///
/// Lookups only take a read lock once the writer of a type exists. Types
/// which are not beans are resolved again on every lookup, so beans
/// registered later are still found.
///
/// # Examples
///
/// ```
/// use core::any::TypeId;
/// use stash_bean::bean::BeanRegistry;
/// use stash_bean::derive::Bean;
/// use stash_bean::write::BeanWriterCache;
///
/// #[derive(Bean)]
/// struct Archive {
///     base_name: String,
/// }
///
/// let mut registry = BeanRegistry::new();
/// registry.register::<Archive>();
///
/// let cache = BeanWriterCache::new(registry);
/// let first = cache.get(TypeId::of::<Archive>()).unwrap();
/// let again = cache.get(TypeId::of::<Archive>()).unwrap();
///
/// assert!(std::sync::Arc::ptr_eq(&first, &again));
/// assert!(cache.get(TypeId::of::<String>()).is_none());
/// ```
pub struct BeanWriterCache {
    resolver: Box<dyn FieldResolver>,
    writers: RwLock<TypeIdMap<Arc<BeanPropertyWriter>>>,
}

impl BeanWriterCache {
    /// Creates an empty cache over `resolver`.
    pub fn new(resolver: impl FieldResolver) -> Self {
        Self {
            resolver: Box::new(resolver),
            writers: RwLock::new(TypeIdMap::new()),
        }
    }

    /// Returns the writer of the type, building it if needed.
    ///
    /// Returns `None` if the resolver does not know the type.
    pub fn get(&self, type_id: TypeId) -> Option<Arc<BeanPropertyWriter>> {
        {
            let writers = self.writers.read().unwrap_or_else(PoisonError::into_inner);
            if let Some(writer) = writers.get(&type_id) {
                return Some(writer.clone());
            }
        }

        let descriptor = self.resolver.fields_of(type_id)?;

        let mut writers = self.writers.write().unwrap_or_else(PoisonError::into_inner);
        // Another thread may have been faster, keep its writer.
        let writer = writers.get_or_insert(type_id, || Arc::new(BeanPropertyWriter::new(descriptor)));
        Some(writer.clone())
    }

    /// Returns `true` if the writer of the type is already built.
    pub fn contains(&self, type_id: TypeId) -> bool {
        self.writers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(&type_id)
    }

    /// Returns the number of built writers.
    pub fn len(&self) -> usize {
        self.writers.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Returns `true` if no writer is built yet.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl core::fmt::Debug for BeanWriterCache {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("BeanWriterCache")
            .field("writers", &self.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use core::any::TypeId;
    use core::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::thread;

    use crate::bean::{BeanDescriptor, FieldResolver};
    use crate::write::BeanWriterCache;

    struct Point {
        x: i32,
    }

    crate::impl_value!(Point);

    #[derive(Default)]
    struct CountingResolver {
        calls: AtomicUsize,
    }

    impl FieldResolver for CountingResolver {
        fn fields_of(&self, type_id: TypeId) -> Option<Arc<BeanDescriptor>> {
            self.calls.fetch_add(1, Ordering::Relaxed);
            (type_id == TypeId::of::<Point>()).then(|| {
                let descriptor = BeanDescriptor::builder::<Point>()
                    .field("x", |p| &p.x)
                    .build()
                    .unwrap();
                Arc::new(descriptor)
            })
        }
    }

    #[test]
    fn writers_are_shared_between_threads() {
        let resolver = Arc::new(CountingResolver::default());
        let cache = BeanWriterCache::new(resolver.clone());

        let writers: Vec<_> = thread::scope(|scope| {
            let handles: Vec<_> = (0..4)
                .map(|_| scope.spawn(|| cache.get(TypeId::of::<Point>()).unwrap()))
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        for writer in &writers[1..] {
            assert!(Arc::ptr_eq(&writers[0], writer));
        }
        assert_eq!(cache.len(), 1);

        let calls = resolver.calls.load(Ordering::Relaxed);
        assert!((1..=4).contains(&calls));

        // Built writers no longer reach the resolver.
        cache.get(TypeId::of::<Point>()).unwrap();
        assert_eq!(resolver.calls.load(Ordering::Relaxed), calls);
    }

    #[test]
    fn unknown_types_are_not_cached() {
        let resolver = Arc::new(CountingResolver::default());
        let cache = BeanWriterCache::new(resolver.clone());

        assert!(cache.get(TypeId::of::<String>()).is_none());
        assert!(cache.get(TypeId::of::<String>()).is_none());
        assert!(cache.is_empty());
        assert!(!cache.contains(TypeId::of::<String>()));
        assert_eq!(resolver.calls.load(Ordering::Relaxed), 2);
    }
}
