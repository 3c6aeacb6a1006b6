//! Items used by the code generated by `stash_bean_derive`. Not public API.

#![doc(hidden)]

pub use crate::bean::{Bean, BeanDescriptor, ConventionAware, FieldDescriptor};
pub use crate::Value;

#[cfg(feature = "auto_register")]
pub mod auto_register {
    use crate::Value;
    use crate::bean::{Bean, BeanDescriptor};

    pub use crate::bean::BeanRegistry;
    pub use inventory;

    /// A registration function submitted by `#[bean(auto_register)]`.
    pub struct __AutoRegisterFunc(pub fn(&mut BeanRegistry));

    inventory::collect!(__AutoRegisterFunc);

    /// Runs every submitted registration function.
    pub fn __register_beans(registry: &mut BeanRegistry) {
        for func in inventory::iter::<__AutoRegisterFunc> {
            (func.0)(registry);
        }
    }

    /// Registered through `inventory` like user types; its presence tells
    /// whether collection works on the current platform.
    pub struct __AvailFlag;

    impl Value for __AvailFlag {}

    impl Bean for __AvailFlag {
        fn bean_descriptor() -> BeanDescriptor {
            BeanDescriptor::from_fields::<Self>(Self::bean_type_path(), Vec::new())
        }
    }

    fn register_avail_flag(registry: &mut BeanRegistry) {
        registry.register::<__AvailFlag>();
    }

    inventory::submit! {
        __AutoRegisterFunc(register_avail_flag)
    }
}
