use std::sync::{Arc, PoisonError, RwLock};

use stash_utils::hash::{FixedHashState, HashMap};

use crate::Value;
use crate::deferred::Provider;

/// A bean supplying fallback values for its absent properties.
///
/// The writer only asks for a convention value after the field's own value
/// unwrapped to absence. The returned value is unwrapped as well, so
/// returning a [`Provider`] or any other deferred container is fine.
pub trait ConventionAware {
    /// Returns the fallback value of `property`.
    fn convention_value(&self, property: &str) -> Option<Arc<dyn Value>>;
}

impl<T: ConventionAware + ?Sized> ConventionAware for &T {
    #[inline]
    fn convention_value(&self, property: &str) -> Option<Arc<dyn Value>> {
        (**self).convention_value(property)
    }
}

impl<T: ConventionAware + ?Sized> ConventionAware for Arc<T> {
    #[inline]
    fn convention_value(&self, property: &str) -> Option<Arc<dyn Value>> {
        (**self).convention_value(property)
    }
}

/// A table of convention providers by property name.
///
/// Beans usually embed one and forward [`ConventionAware`] to it.
///
/// # Examples
///
/// ```
/// use stash_bean::bean::{ConventionAware, ConventionMapping};
/// use stash_bean::deferred::{self, Provider};
///
/// let conventions = ConventionMapping::new();
/// conventions.map("jobs", Provider::of(4_u32));
///
/// let jobs = conventions.convention_value("jobs").unwrap();
/// let jobs = deferred::unwrap(Some(&*jobs), |v| v.unwrap().downcast_ref::<u32>().copied());
/// assert_eq!(jobs, Ok(Some(4)));
///
/// assert!(conventions.convention_value("debug").is_none());
/// ```
pub struct ConventionMapping {
    providers: RwLock<HashMap<String, Provider>>,
}

impl ConventionMapping {
    /// Creates an empty mapping.
    pub const fn new() -> Self {
        Self {
            providers: RwLock::new(HashMap::with_hasher(FixedHashState)),
        }
    }

    /// Maps `property` to `provider`, replacing any previous mapping.
    pub fn map(&self, property: impl Into<String>, provider: Provider) {
        self.providers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(property.into(), provider);
    }

    /// Maps `property` to a fixed value.
    pub fn map_value(&self, property: impl Into<String>, value: impl Value) {
        self.map(property, Provider::of(value));
    }

    /// Removes the mapping of `property`.
    pub fn unmap(&self, property: &str) -> Option<Provider> {
        self.providers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(property)
    }

    /// Returns the provider mapped to `property`.
    pub fn get(&self, property: &str) -> Option<Provider> {
        self.providers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(property)
            .cloned()
    }

    /// Returns `true` if `property` is mapped.
    pub fn contains(&self, property: &str) -> bool {
        self.providers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(property)
    }
}

impl Default for ConventionMapping {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl ConventionAware for ConventionMapping {
    fn convention_value(&self, property: &str) -> Option<Arc<dyn Value>> {
        let provider = self.get(property)?;
        Some(Arc::new(provider))
    }
}

impl core::fmt::Debug for ConventionMapping {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let providers = self.providers.read().unwrap_or_else(PoisonError::into_inner);
        let mut names: Vec<_> = providers.keys().collect();
        names.sort_unstable();
        f.debug_struct("ConventionMapping")
            .field("properties", &names)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::{ConventionAware, ConventionMapping};
    use crate::deferred::{self, Provider};

    fn resolve(conventions: &dyn ConventionAware, property: &str) -> Option<String> {
        let value = conventions.convention_value(property)?;
        deferred::unwrap(Some(&*value), |v| {
            v.and_then(|v| v.downcast_ref::<String>()).cloned()
        })
        .unwrap()
    }

    #[test]
    fn mapped_providers_are_unwrapped() {
        let conventions = ConventionMapping::default();
        conventions.map_value("archiveName", "app.jar".to_owned());
        conventions.map("classifier", Provider::absent());

        assert_eq!(resolve(&conventions, "archiveName").as_deref(), Some("app.jar"));
        assert!(conventions.contains("classifier"));
        assert_eq!(resolve(&conventions, "classifier"), None);
        assert_eq!(resolve(&conventions, "unmapped"), None);
    }

    #[test]
    fn later_mappings_win() {
        let conventions = ConventionMapping::new();
        conventions.map_value("version", "1.0".to_owned());
        conventions.map_value("version", "2.0".to_owned());
        assert_eq!(resolve(&conventions, "version").as_deref(), Some("2.0"));

        assert!(conventions.unmap("version").is_some());
        assert!(!conventions.contains("version"));
        assert_eq!(format!("{conventions:?}"), "ConventionMapping { properties: [] }");
    }
}
