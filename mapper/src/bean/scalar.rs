//! Leaf values
//!
//! A scalar is any value the engine copies as a whole rather than descending into.
//! Every `Clone + Debug + Send + Sync + 'static` type is a [`Scalar`]; only types
//! registered through [`scalar_property!`](crate::scalar_property) can appear as bean
//! properties.

use std::any::Any;
use std::fmt;

use super::TypeKey;

/// Type-erased leaf value
pub trait Scalar: Any + Send + Sync + fmt::Debug {
    /// Key of the concrete type
    fn type_key(&self) -> TypeKey;

    /// Clone into a new boxed scalar
    fn clone_scalar(&self) -> Box<dyn Scalar>;

    /// Borrow as `Any` for downcasting
    fn as_any(&self) -> &dyn Any;

    /// Convert into `Any` for owned downcasting
    fn into_any(self: Box<Self>) -> Box<dyn Any>;
}

impl<T> Scalar for T
where
    T: Any + Clone + Send + Sync + fmt::Debug,
{
    fn type_key(&self) -> TypeKey {
        TypeKey::of::<T>()
    }

    fn clone_scalar(&self) -> Box<dyn Scalar> {
        Box::new(self.clone())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any> {
        self
    }
}

/// Writable location holding one scalar
pub trait ScalarSlot: Send + Sync {
    /// Key of the type this slot accepts
    fn slot_type(&self) -> TypeKey;

    /// Replace the held value. Returns `false` (dropping `value`) on a type mismatch.
    fn assign(&mut self, value: Box<dyn Scalar>) -> bool;
}

impl<T> ScalarSlot for T
where
    T: Any + Clone + Send + Sync + fmt::Debug,
{
    fn slot_type(&self) -> TypeKey {
        TypeKey::of::<T>()
    }

    fn assign(&mut self, value: Box<dyn Scalar>) -> bool {
        match value.into_any().downcast::<T>() {
            Ok(value) => {
                *self = *value;
                true
            }
            Err(_) => false,
        }
    }
}

/// Registers leaf types as bean properties.
///
/// Types listed plainly are instantiated through `Default`; the `=>` form supplies an
/// `Option<Self>` expression instead.
///
/// ```ignore
/// #[derive(Clone, Debug, Default)]
/// enum Gender { #[default] Unknown, Female, Male }
///
/// beanmapper::scalar_property!(Gender);
/// beanmapper::scalar_property!(Instant => Some(Instant::now()));
/// ```
#[macro_export]
macro_rules! scalar_property {
    (@impl $ty:ty, $init:expr) => {
        impl $crate::Property for $ty {
            fn declared_type() -> $crate::DeclaredType {
                $crate::DeclaredType::Scalar($crate::TypeKey::of::<$ty>())
            }

            fn instantiate() -> ::core::option::Option<Self> {
                $init
            }

            fn view(&self) -> $crate::PropertyView<'_> {
                $crate::PropertyView::Scalar(self)
            }

            fn view_mut(&mut self) -> $crate::PropertyViewMut<'_> {
                $crate::PropertyViewMut::Scalar(self)
            }
        }
    };
    ($ty:ty => $init:expr) => {
        $crate::scalar_property!(@impl $ty, $init);
    };
    ($($ty:ty),+ $(,)?) => {
        $(
            $crate::scalar_property!(
                @impl $ty,
                ::core::option::Option::Some(<$ty as ::core::default::Default>::default())
            );
        )+
    };
}

crate::scalar_property!(
    bool, char, i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32, f64, String,
);

crate::scalar_property!(chrono::NaiveDate => chrono::NaiveDate::from_ymd_opt(1970, 1, 1));
crate::scalar_property!(chrono::NaiveTime => chrono::NaiveTime::from_hms_opt(0, 0, 0));
crate::scalar_property!(
    chrono::NaiveDateTime => chrono::NaiveDate::from_ymd_opt(1970, 1, 1)
        .and_then(|date| date.and_hms_opt(0, 0, 0))
);
