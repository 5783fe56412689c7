//! Read views and write slots over property values
//!
//! The engine never sees concrete field types. Reading a property yields a
//! [`PropertyView`]; writing goes through a [`PropertyViewMut`] slot. Optional values
//! hand out their content lazily so that nested intermediates are only constructed
//! when something is actually written through them.

use std::fmt;

use super::Bean;
use super::CollectionSlot;
use super::DeclaredType;
use super::Scalar;
use super::ScalarSlot;

/// A type that can appear as a bean property
pub trait Property: Send + Sync + 'static {
    /// Static description of this type
    fn declared_type() -> DeclaredType
    where
        Self: Sized;

    /// A freshly constructed value, or `None` when the type has no default constructor
    fn instantiate() -> Option<Self>
    where
        Self: Sized;

    /// Read view over the current value
    fn view(&self) -> PropertyView<'_>;

    /// Write slot over the current value
    fn view_mut(&mut self) -> PropertyViewMut<'_>;
}

/// Read-only view of a property value
#[derive(Clone)]
pub enum PropertyView<'a> {
    /// No value (`None`)
    Null,
    /// A leaf value
    Scalar(&'a dyn Scalar),
    /// A nested bean
    Bean(&'a dyn Bean),
    /// The elements of a collection, in iteration order
    Collection(Vec<PropertyView<'a>>),
}

impl<'a> PropertyView<'a> {
    /// Whether the view holds no value
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// The nested bean, if this is a bean view
    pub fn as_bean(&self) -> Option<&'a dyn Bean> {
        match self {
            Self::Bean(bean) => Some(*bean),
            _ => None,
        }
    }

    /// Downcast a scalar view to a concrete type
    pub fn downcast_ref<T: 'static>(&self) -> Option<&'a T> {
        match self {
            Self::Scalar(value) => Scalar::as_any(*value).downcast_ref::<T>(),
            _ => None,
        }
    }

    /// Short name of the view kind, used in logs
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Scalar(_) => "scalar",
            Self::Bean(_) => "bean",
            Self::Collection(_) => "collection",
        }
    }
}

impl fmt::Debug for PropertyView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("Null"),
            Self::Scalar(value) => f.debug_tuple("Scalar").field(value).finish(),
            Self::Bean(bean) => f
                .debug_tuple("Bean")
                .field(&bean.bean_type().name())
                .finish(),
            Self::Collection(elements) => f.debug_tuple("Collection").field(elements).finish(),
        }
    }
}

/// Writable slot over a property value
pub enum PropertyViewMut<'a> {
    /// A leaf value
    Scalar(&'a mut dyn ScalarSlot),
    /// A nested bean that is always present
    Bean(&'a mut dyn Bean),
    /// A value that may be absent
    Optional(&'a mut dyn OptionalSlot),
    /// A collection
    Collection(&'a mut dyn CollectionSlot),
}

impl PropertyViewMut<'_> {
    /// Declared type of the value behind this slot
    pub fn declared_type(&self) -> DeclaredType {
        match self {
            Self::Scalar(slot) => DeclaredType::Scalar(slot.slot_type()),
            Self::Bean(bean) => DeclaredType::Bean(bean.bean_type().type_ref()),
            Self::Optional(slot) => DeclaredType::Optional(Box::new(slot.inner_type())),
            Self::Collection(slot) => DeclaredType::Collection {
                kind:    slot.kind(),
                element: Box::new(slot.element_type()),
            },
        }
    }
}

/// Slot over an `Option<T>`
pub trait OptionalSlot: Send + Sync {
    /// Declared type of `T`
    fn inner_type(&self) -> DeclaredType;

    /// Whether a value is present
    fn is_present(&self) -> bool;

    /// Slot over the present value, if any
    fn present(&mut self) -> Option<PropertyViewMut<'_>>;

    /// Slot over the present value, constructing one first when absent.
    ///
    /// Returns `None` when `T` cannot be instantiated.
    fn get_or_instantiate(&mut self) -> Option<PropertyViewMut<'_>>;

    /// Drop the present value
    fn clear(&mut self);
}

impl<T: Property> Property for Option<T> {
    fn declared_type() -> DeclaredType {
        DeclaredType::Optional(Box::new(T::declared_type()))
    }

    fn instantiate() -> Option<Self> {
        Some(None)
    }

    fn view(&self) -> PropertyView<'_> {
        match self {
            Some(value) => value.view(),
            None => PropertyView::Null,
        }
    }

    fn view_mut(&mut self) -> PropertyViewMut<'_> {
        PropertyViewMut::Optional(self)
    }
}

impl<T: Property> OptionalSlot for Option<T> {
    fn inner_type(&self) -> DeclaredType {
        T::declared_type()
    }

    fn is_present(&self) -> bool {
        self.is_some()
    }

    fn present(&mut self) -> Option<PropertyViewMut<'_>> {
        self.as_mut().map(|value| value.view_mut())
    }

    fn get_or_instantiate(&mut self) -> Option<PropertyViewMut<'_>> {
        if self.is_none() {
            *self = Some(T::instantiate()?);
        }
        self.as_mut().map(|value| value.view_mut())
    }

    fn clear(&mut self) {
        *self = None;
    }
}

impl<T: Property> Property for Box<T> {
    fn declared_type() -> DeclaredType {
        T::declared_type()
    }

    fn instantiate() -> Option<Self> {
        T::instantiate().map(Self::new)
    }

    fn view(&self) -> PropertyView<'_> {
        (**self).view()
    }

    fn view_mut(&mut self) -> PropertyViewMut<'_> {
        (**self).view_mut()
    }
}
