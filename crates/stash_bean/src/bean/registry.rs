use core::any::TypeId;
use std::sync::{Arc, OnceLock, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use stash_utils::TypeIdMap;
use stash_utils::hash::{FixedHashState, HashMap};

use crate::bean::{Bean, BeanDescriptor};

// -----------------------------------------------------------------------------
// FieldResolver

/// Resolves the relevant fields of a type.
///
/// Must be deterministic: the same type always yields the same fields in
/// the same order.
pub trait FieldResolver: Send + Sync + 'static {
    /// Returns the descriptor of the type, or `None` if it is not a bean.
    fn fields_of(&self, type_id: TypeId) -> Option<Arc<BeanDescriptor>>;
}

impl<T: FieldResolver + ?Sized> FieldResolver for Arc<T> {
    #[inline]
    fn fields_of(&self, type_id: TypeId) -> Option<Arc<BeanDescriptor>> {
        (**self).fields_of(type_id)
    }
}

// -----------------------------------------------------------------------------
// BeanRegistry

enum Registration {
    Deferred {
        type_path: &'static str,
        build: fn() -> BeanDescriptor,
        descriptor: OnceLock<Arc<BeanDescriptor>>,
    },
    Ready(Arc<BeanDescriptor>),
}

impl Registration {
    fn type_path(&self) -> &'static str {
        match self {
            Self::Deferred { type_path, .. } => *type_path,
            Self::Ready(descriptor) => descriptor.type_path(),
        }
    }

    fn descriptor(&self) -> Arc<BeanDescriptor> {
        match self {
            Self::Deferred {
                build, descriptor, ..
            } => descriptor.get_or_init(|| Arc::new(build())).clone(),
            Self::Ready(descriptor) => descriptor.clone(),
        }
    }
}

/// A registry of bean types.
///
/// [Registering](BeanRegistry::register) a type only records how to build
/// its descriptor; the descriptor is built on first lookup and then shared.
///
/// # Examples
///
/// ```
/// use core::any::TypeId;
/// use stash_bean::bean::{BeanRegistry, FieldResolver};
/// use stash_bean::derive::Bean;
///
/// #[derive(Bean)]
/// #[bean(type_path = "demo::Jar")]
/// struct Jar {
///     name: String,
/// }
///
/// let mut registry = BeanRegistry::new();
/// assert!(registry.register::<Jar>());
/// assert!(!registry.register::<Jar>());
///
/// let descriptor = registry.fields_of(TypeId::of::<Jar>()).unwrap();
/// assert_eq!(descriptor.type_path(), "demo::Jar");
/// assert!(registry.get_with_type_path("demo::Jar").is_some());
/// ```
pub struct BeanRegistry {
    registrations: TypeIdMap<Registration>,
    type_path_to_id: HashMap<&'static str, TypeId>,
}

impl Default for BeanRegistry {
    /// See [`BeanRegistry::new`] .
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl BeanRegistry {
    /// Creates an empty registry.
    #[inline]
    pub const fn new() -> Self {
        Self {
            registrations: TypeIdMap::new(),
            type_path_to_id: HashMap::with_hasher(FixedHashState),
        }
    }

    /// Registers `B` if it is not registered yet.
    ///
    /// Returns `false` if `B` was already registered.
    pub fn register<B: Bean>(&mut self) -> bool {
        let type_path = B::bean_type_path();
        let inserted = self.registrations.try_insert(TypeId::of::<B>(), || {
            Registration::Deferred {
                type_path,
                build: B::bean_descriptor,
                descriptor: OnceLock::new(),
            }
        });
        if inserted {
            self.type_path_to_id.insert(type_path, TypeId::of::<B>());
        }
        inserted
    }

    /// Registers an already built descriptor if its type is not registered yet.
    ///
    /// Returns `false` if the type was already registered.
    pub fn try_insert(&mut self, descriptor: BeanDescriptor) -> bool {
        let type_id = descriptor.type_id();
        let type_path = descriptor.type_path();
        let inserted = self
            .registrations
            .try_insert(type_id, || Registration::Ready(Arc::new(descriptor)));
        if inserted {
            self.type_path_to_id.insert(type_path, type_id);
        }
        inserted
    }

    /// Registers every non-generic type annotated with `#[bean(auto_register)]`.
    ///
    /// Repeated calls are cheap and will not insert duplicates.
    ///
    /// Returns `true` if automatic registration is supported on the current
    /// platform. Always returns `false` without the `auto_register` feature.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use core::any::TypeId;
    /// use stash_bean::bean::BeanRegistry;
    /// use stash_bean::derive::Bean;
    ///
    /// #[derive(Bean)]
    /// #[bean(auto_register)]
    /// struct Test {
    ///     filter: String,
    /// }
    ///
    /// let mut registry = BeanRegistry::new();
    /// assert!(registry.auto_register());
    /// assert!(registry.contains(TypeId::of::<Test>()));
    /// ```
    #[cfg_attr(not(feature = "auto_register"), inline(always))]
    pub fn auto_register(&mut self) -> bool {
        #[cfg(feature = "auto_register")]
        {
            use crate::__macro_exports::auto_register;
            // Reduce the cost of duplicate registrations.
            if self.contains(TypeId::of::<auto_register::__AvailFlag>()) {
                return true;
            }
            auto_register::__register_beans(self);
            self.contains(TypeId::of::<auto_register::__AvailFlag>())
        }
        #[cfg(not(feature = "auto_register"))]
        {
            false
        }
    }

    /// Whether the type with given [`TypeId`] has been registered.
    #[inline]
    pub fn contains(&self, type_id: TypeId) -> bool {
        self.registrations.contains(&type_id)
    }

    /// Returns the descriptor of the type with the given [`TypeId`], building
    /// it on first use.
    pub fn get(&self, type_id: TypeId) -> Option<Arc<BeanDescriptor>> {
        self.registrations.get(&type_id).map(Registration::descriptor)
    }

    /// Returns the descriptor of the type with the given type path.
    pub fn get_with_type_path(&self, type_path: &str) -> Option<Arc<BeanDescriptor>> {
        // Manual inline
        match self.type_path_to_id.get(type_path) {
            Some(id) => self.get(*id),
            None => None,
        }
    }

    /// Returns the [`TypeId`] registered under a type path.
    pub fn type_id_of(&self, type_path: &str) -> Option<TypeId> {
        self.type_path_to_id.get(type_path).copied()
    }

    /// Returns the number of registered types.
    #[inline]
    pub fn len(&self) -> usize {
        self.registrations.len()
    }

    /// Returns `true` if no type is registered.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.registrations.is_empty()
    }

    /// Returns an iterator over the type paths of the registered types.
    pub fn type_paths(&self) -> impl ExactSizeIterator<Item = &'static str> + '_ {
        self.registrations.values().map(Registration::type_path)
    }
}

impl FieldResolver for BeanRegistry {
    #[inline]
    fn fields_of(&self, type_id: TypeId) -> Option<Arc<BeanDescriptor>> {
        self.get(type_id)
    }
}

impl core::fmt::Debug for BeanRegistry {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_set().entries(self.type_paths()).finish()
    }
}

// -----------------------------------------------------------------------------
// BeanRegistryArc

/// A shared [`BeanRegistry`], registrable after it was handed out.
#[derive(Clone, Default)]
pub struct BeanRegistryArc {
    /// The wrapped [`BeanRegistry`].
    pub internal: Arc<RwLock<BeanRegistry>>,
}

impl BeanRegistryArc {
    /// Takes a read lock on the underlying [`BeanRegistry`].
    pub fn read(&self) -> RwLockReadGuard<'_, BeanRegistry> {
        self.internal.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Takes a write lock on the underlying [`BeanRegistry`].
    pub fn write(&self) -> RwLockWriteGuard<'_, BeanRegistry> {
        self.internal
            .write()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl From<BeanRegistry> for BeanRegistryArc {
    fn from(registry: BeanRegistry) -> Self {
        Self {
            internal: Arc::new(RwLock::new(registry)),
        }
    }
}

impl FieldResolver for BeanRegistryArc {
    #[inline]
    fn fields_of(&self, type_id: TypeId) -> Option<Arc<BeanDescriptor>> {
        self.read().get(type_id)
    }
}

impl core::fmt::Debug for BeanRegistryArc {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Debug::fmt(&*self.read(), f)
    }
}

#[cfg(test)]
mod tests {
    use core::any::TypeId;
    use core::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;
    use std::thread;

    use super::{BeanRegistry, BeanRegistryArc, FieldResolver};
    use crate::Value;
    use crate::bean::{Bean, BeanDescriptor};

    static BUILDS: AtomicU32 = AtomicU32::new(0);

    struct Counted {
        id: u32,
    }

    impl Value for Counted {}

    impl Bean for Counted {
        fn bean_type_path() -> &'static str {
            "test::Counted"
        }

        fn bean_descriptor() -> BeanDescriptor {
            BUILDS.fetch_add(1, Ordering::SeqCst);
            BeanDescriptor::builder::<Self>()
                .type_path(Self::bean_type_path())
                .field("id", |c| &c.id)
                .build()
                .unwrap()
        }
    }

    struct Manual {
        flag: bool,
    }

    impl Value for Manual {}

    #[test]
    fn descriptors_are_built_once_on_lookup() {
        let registry = BeanRegistryArc::default();
        assert!(registry.write().register::<Counted>());
        assert_eq!(BUILDS.load(Ordering::SeqCst), 0);

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let registry = registry.clone();
                thread::spawn(move || registry.fields_of(TypeId::of::<Counted>()).unwrap())
            })
            .collect();
        let descriptors: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

        assert_eq!(BUILDS.load(Ordering::SeqCst), 1);
        assert!(descriptors.windows(2).all(|w| Arc::ptr_eq(&w[0], &w[1])));
        assert_eq!(descriptors[0].fields()[0].name(), "id");
    }

    #[test]
    fn built_descriptors_can_be_inserted() {
        let mut registry = BeanRegistry::default();
        let descriptor = || {
            BeanDescriptor::builder::<Manual>()
                .type_path("test::Manual")
                .field("flag", |m| &m.flag)
                .build()
                .unwrap()
        };

        assert!(registry.try_insert(descriptor()));
        assert!(!registry.try_insert(descriptor()));
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.type_id_of("test::Manual"), Some(TypeId::of::<Manual>()));
        assert_eq!(registry.type_paths().collect::<Vec<_>>(), ["test::Manual"]);
        assert!(registry.fields_of(TypeId::of::<u8>()).is_none());
    }
}
