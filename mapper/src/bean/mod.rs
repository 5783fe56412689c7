//! Introspection model
//!
//! Rust has no runtime reflection, so every type taking part in a mapping describes
//! itself: beans through `#[derive(Bean)]`, leaf values through
//! [`scalar_property!`](crate::scalar_property), and `Option`, `Box` and the std
//! collections through the blanket impls in this module.

mod bean_type;
mod collection;
mod property;
mod scalar;
mod type_key;

use std::any::Any;
use std::fmt;

pub use bean_type::BeanType;
pub use bean_type::BeanTypeBuilder;
pub use bean_type::BeanTypeRef;
pub use bean_type::DeclaredType;
pub use bean_type::ParentLink;
pub use bean_type::PropertyDecl;
pub use bean_type::PropertyMetadata;
pub use collection::CollectionKind;
pub use collection::CollectionSlot;
pub use collection::CollectionStrategy;
pub use collection::ElementFill;
pub use property::OptionalSlot;
pub use property::Property;
pub use property::PropertyView;
pub use property::PropertyViewMut;
pub use scalar::Scalar;
pub use scalar::ScalarSlot;
pub use type_key::TypeKey;

/// A structured value whose properties can be enumerated, read and written by name
///
/// Implemented by `#[derive(Bean)]`. Property names resolve through the embedded
/// ancestor when the type declares one.
pub trait Bean: Any + Send + Sync {
    /// Static description of the concrete type
    fn bean_type(&self) -> &'static BeanType;

    /// Read view of a readable property
    fn property(&self, name: &str) -> Option<PropertyView<'_>>;

    /// Write slot of a writable property
    fn property_mut(&mut self, name: &str) -> Option<PropertyViewMut<'_>>;

    /// Borrow as `Any` for downcasting
    fn as_any(&self) -> &dyn Any;

    /// Borrow mutably as `Any` for downcasting
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// Static access to a bean type's description
pub trait BeanClass: Bean + Property + Sized {
    /// Description of `Self`
    fn class() -> &'static BeanType;
}

impl fmt::Debug for dyn Bean {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Bean").field(&self.bean_type().name()).finish()
    }
}

impl dyn Bean {
    /// Downcast to a concrete bean type
    pub fn downcast_ref<T: Bean>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }

    /// Downcast mutably to a concrete bean type
    pub fn downcast_mut<T: Bean>(&mut self) -> Option<&mut T> {
        self.as_any_mut().downcast_mut::<T>()
    }

    /// Address of the instance, used as its identity within one mapping call
    pub fn address(&self) -> usize {
        std::ptr::from_ref(self).cast::<()>() as usize
    }
}
