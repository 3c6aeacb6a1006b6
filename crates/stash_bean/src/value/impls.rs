use std::borrow::Cow;
use std::path::PathBuf;
use std::sync::Arc;

use crate::Value;
use crate::deferred::DeferredRef;
use crate::value::Sequence;

crate::impl_value!(
    (), bool, char,
    u8, u16, u32, u64, u128, usize,
    i8, i16, i32, i64, i128, isize,
    f32, f64,
    String, &'static str, Cow<'static, str>,
    PathBuf,
);

// -----------------------------------------------------------------------------
// Containers

/// `None` is the absent value, `Some` unwraps to its content.
impl<T: Value> Value for Option<T> {
    #[inline]
    fn as_deferred(&self) -> Option<DeferredRef<'_>> {
        Some(DeferredRef::Optional(self.as_ref().map(|v| v as &dyn Value)))
    }
}

/// Boxed values are transparent.
impl Value for Box<dyn Value> {
    fn value_type_path(&self) -> &'static str {
        (**self).value_type_path()
    }

    #[inline]
    fn as_deferred(&self) -> Option<DeferredRef<'_>> {
        Some(DeferredRef::Optional(Some(&**self)))
    }
}

/// Shared values are transparent.
impl Value for Arc<dyn Value> {
    fn value_type_path(&self) -> &'static str {
        (**self).value_type_path()
    }

    #[inline]
    fn as_deferred(&self) -> Option<DeferredRef<'_>> {
        Some(DeferredRef::Optional(Some(&**self)))
    }
}

impl<T: Value> Value for Vec<T> {
    fn as_sequence(&self) -> Option<Sequence<'_>> {
        Some(Box::new(self.iter().map(|v| v as &dyn Value)))
    }
}

impl<T: Value, const N: usize> Value for [T; N] {
    fn as_sequence(&self) -> Option<Sequence<'_>> {
        Some(Box::new(self.iter().map(|v| v as &dyn Value)))
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use crate::Value;
    use crate::deferred::DeferredRef;

    #[test]
    fn option_is_an_optional_shape() {
        let some: &dyn Value = &Some(3_i32);
        let none: &dyn Value = &None::<i32>;

        match some.as_deferred() {
            Some(DeferredRef::Optional(Some(inner))) => {
                assert_eq!(inner.downcast_ref::<i32>(), Some(&3));
            }
            _ => panic!("expected a present optional"),
        }
        assert!(matches!(
            none.as_deferred(),
            Some(DeferredRef::Optional(None))
        ));
    }

    #[test]
    fn shared_values_report_inner_type() {
        let shared: Arc<dyn Value> = Arc::new(String::from("a"));
        let value: &dyn Value = &shared;

        assert_eq!(value.value_type_path(), "alloc::string::String");
        assert!(value.is::<Arc<dyn Value>>());
    }

    #[test]
    fn vec_is_a_sequence() {
        let value: &dyn Value = &vec![1_u8, 2, 3];
        let items: Vec<u8> = value
            .as_sequence()
            .unwrap()
            .map(|v| *v.downcast_ref::<u8>().unwrap())
            .collect();

        assert_eq!(items, [1, 2, 3]);
        assert!(value.as_deferred().is_none());
    }
}
