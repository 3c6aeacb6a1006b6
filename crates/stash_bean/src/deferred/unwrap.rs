use thiserror::Error;

use crate::Value;
use crate::deferred::Step;

/// Deferred values nested deeper than this are rejected.
const MAX_DEPTH: usize = 256;

/// An error that occurs when unwrapping a deferred value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UnwrapError {
    /// The same container was met twice on one unwrapping chain.
    #[error("re-entrant unwrapping of the same {kind}")]
    Reentrant { kind: &'static str },
    /// The chain of containers is too long.
    #[error("deferred values are nested deeper than {depth} levels")]
    TooDeep { depth: usize },
    /// The initializer of a lazy value panicked.
    #[error("the initializer of a lazy value panicked")]
    Poisoned,
}

/// Unwraps `value` until a non-deferred value or absence is reached, then
/// calls `f` with it.
///
/// Values produced along the way are kept alive while `f` runs, so the
/// terminal value can be borrowed even if no container owns it.
///
/// # Examples
///
/// ```
/// use std::path::PathBuf;
/// use stash_bean::deferred::{self, FileProperty, Provider};
///
/// let output = FileProperty::directory();
/// output.set("/out");
/// let provider = Provider::of(Some(output));
///
/// let path = deferred::unwrap(Some(&provider), |v| {
///     v.and_then(|v| v.downcast_ref::<PathBuf>()).cloned()
/// });
/// assert_eq!(path, Ok(Some(PathBuf::from("/out"))));
///
/// let absent = deferred::unwrap(Some(&Provider::absent()), |v| v.is_none());
/// assert_eq!(absent, Ok(true));
/// ```
pub fn unwrap<R>(
    value: Option<&dyn Value>,
    f: impl FnOnce(Option<&dyn Value>) -> R,
) -> Result<R, UnwrapError> {
    Unwrapper::default().run(value, f)
}

/// Performs one unwrapping step.
///
/// Returns `None` if `value` is not deferred.
pub fn unwrap_step(value: &dyn Value) -> Result<Option<Step<'_>>, UnwrapError> {
    match value.as_deferred() {
        Some(deferred) => deferred.resolve().map(Some),
        None => Ok(None),
    }
}

#[derive(Default)]
struct Unwrapper {
    chain: Vec<usize>,
    depth: usize,
}

impl Unwrapper {
    fn run<R, F>(&mut self, value: Option<&dyn Value>, f: F) -> Result<R, UnwrapError>
    where
        F: FnOnce(Option<&dyn Value>) -> R,
    {
        let Some(value) = value else {
            return Ok(f(None));
        };
        let Some(deferred) = value.as_deferred() else {
            return Ok(f(Some(value)));
        };

        self.depth += 1;
        if self.depth > MAX_DEPTH {
            return Err(UnwrapError::TooDeep { depth: MAX_DEPTH });
        }
        if let Some(identity) = deferred.identity() {
            if self.chain.contains(&identity) {
                return Err(UnwrapError::Reentrant {
                    kind: deferred.kind_name(),
                });
            }
            self.chain.push(identity);
        }

        match deferred.resolve()? {
            Step::Absent => Ok(f(None)),
            Step::Value(next) => self.run(Some(next), f),
            Step::Shared(next) => self.run(Some(&*next), f),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;
    use std::sync::Arc;

    use super::{UnwrapError, unwrap, unwrap_step};
    use crate::Value;
    use crate::deferred::{FileProperty, Lazy, Producer, Property, Provider, Step};

    fn terminal_path(value: &dyn Value) -> Option<PathBuf> {
        unwrap(Some(value), |v| v.and_then(|v| v.downcast_ref::<PathBuf>()).cloned()).unwrap()
    }

    fn manual_path(value: &dyn Value) -> Option<PathBuf> {
        match unwrap_step(value).unwrap() {
            None => value.downcast_ref::<PathBuf>().cloned(),
            Some(Step::Absent) => None,
            Some(Step::Value(next)) => manual_path(next),
            Some(Step::Shared(next)) => manual_path(&*next),
        }
    }

    #[test]
    fn plain_values_are_terminal() {
        assert_eq!(unwrap(Some(&5_i32), |v| v.unwrap().downcast_ref::<i32>().copied()), Ok(Some(5)));
        assert!(unwrap_step(&5_i32).unwrap().is_none());
        assert_eq!(unwrap(None, |v| v.is_none()), Ok(true));
    }

    #[test]
    fn nested_layers_compose() {
        let file = FileProperty::file().with_base("/work");
        file.set("app.jar");
        let provider = Provider::of(Some(file));
        let lazy = Lazy::new(move || Some(Arc::new(provider) as Arc<dyn Value>));

        let expected = Some(PathBuf::from("/work/app.jar"));
        assert_eq!(terminal_path(&lazy), expected);
        assert_eq!(manual_path(&lazy), expected);
    }

    #[test]
    fn absence_is_not_an_error() {
        let empty = Property::new();
        let nested = Provider::of(None::<String>);
        let unset = Provider::of(FileProperty::file());

        for value in [&empty as &dyn Value, &nested, &unset] {
            assert_eq!(unwrap(Some(value), |v| v.is_none()), Ok(true));
        }
    }

    #[test]
    fn producers_are_invoked() {
        let producer = Producer::new(|| Some(7_u64));
        let value = unwrap(Some(&producer), |v| v.unwrap().downcast_ref::<u64>().copied());

        assert_eq!(value, Ok(Some(7)));
    }

    #[test]
    fn self_referencing_property_is_reentrant() {
        let property = Arc::new(Property::new());
        property.set_shared(property.clone());

        let result = unwrap(Some(&*property), |_| ());
        assert_eq!(result, Err(UnwrapError::Reentrant { kind: "property" }));

        // Break the cycle.
        property.clear();
    }

    #[test]
    fn self_returning_provider_is_reentrant() {
        let slot: Arc<std::sync::OnceLock<Provider>> = Arc::default();
        let inner = slot.clone();
        let provider = Provider::new(move || {
            inner.get().map(|me| Arc::new(me.clone()) as Arc<dyn Value>)
        });
        slot.set(provider.clone()).unwrap();

        let result = unwrap(Some(&provider), |_| ());
        assert_eq!(result, Err(UnwrapError::Reentrant { kind: "provider" }));
    }

    #[test]
    fn same_container_twice_in_a_row_is_fine() {
        let shared = Arc::new(Property::of(3_u8));
        let first = Provider::of(shared.clone() as Arc<dyn Value>);

        for _ in 0..2 {
            let value = unwrap(Some(&first), |v| v.unwrap().downcast_ref::<u8>().copied());
            assert_eq!(value, Ok(Some(3)));
        }
    }
}
