//! Collection properties
//!
//! Sequences and sets expose a [`CollectionSlot`] so the reconciler can clear, reset
//! and refill them without knowing the element type.

use std::collections::BTreeSet;
use std::collections::HashSet;
use std::collections::VecDeque;
use std::hash::Hash;

use error_stack::Report;
use serde::Deserialize;
use serde::Serialize;
use strum::Display;

use super::DeclaredType;
use super::Property;
use super::PropertyView;
use super::PropertyViewMut;
use crate::error::Error;
use crate::error::Result;

/// Shape of a collection property
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display)]
#[strum(serialize_all = "snake_case")]
pub enum CollectionKind {
    /// `Vec<T>`
    List,
    /// `VecDeque<T>`
    Deque,
    /// `BTreeSet<T>`
    SortedSet,
    /// `HashSet<T>`
    Set,
}

/// How a target collection is reconciled with the mapped source elements
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Display, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum CollectionStrategy {
    /// Assign a fresh collection holding the mapped elements
    #[default]
    Replace,
    /// Empty the existing collection in place and append the mapped elements
    #[serde(alias = "clear")]
    ClearAndRefill,
}

/// Callback that fills a freshly instantiated element. Returns whether to keep it.
pub type ElementFill<'f> = dyn FnMut(PropertyViewMut<'_>) -> Result<bool> + 'f;

/// Writable collection
pub trait CollectionSlot: Send + Sync {
    /// Shape of the collection
    fn kind(&self) -> CollectionKind;

    /// Declared element type
    fn element_type(&self) -> DeclaredType;

    /// Number of elements held
    fn len(&self) -> usize;

    /// Whether no elements are held
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Remove all elements, keeping the collection instance and its allocation
    fn clear(&mut self);

    /// Replace the collection with a new, empty instance sized for `capacity` elements
    fn reset(&mut self, capacity: usize);

    /// Instantiate one element, let `fill` populate it, and append it when `fill`
    /// returns `true`
    fn push_with(&mut self, fill: &mut ElementFill<'_>) -> Result<bool>;
}

fn instantiate_element<E: Property>() -> Result<E> {
    E::instantiate().ok_or_else(|| {
        Report::new(Error::instantiation(E::declared_type().to_string()))
            .attach("collection element")
    })
}

macro_rules! collection_property {
    ($collection:ident <$element:ident $(: $bound:path)*>, $kind:expr, $push:ident, $with_capacity:expr) => {
        impl<$element: Property $(+ $bound)*> Property for $collection<$element> {
            fn declared_type() -> DeclaredType {
                DeclaredType::Collection {
                    kind:    $kind,
                    element: Box::new($element::declared_type()),
                }
            }

            fn instantiate() -> Option<Self> {
                Some(Self::new())
            }

            fn view(&self) -> PropertyView<'_> {
                PropertyView::Collection(self.iter().map(|element| element.view()).collect())
            }

            fn view_mut(&mut self) -> PropertyViewMut<'_> {
                PropertyViewMut::Collection(self)
            }
        }

        impl<$element: Property $(+ $bound)*> CollectionSlot for $collection<$element> {
            fn kind(&self) -> CollectionKind {
                $kind
            }

            fn element_type(&self) -> DeclaredType {
                $element::declared_type()
            }

            fn len(&self) -> usize {
                $collection::len(self)
            }

            fn clear(&mut self) {
                $collection::clear(self);
            }

            fn reset(&mut self, capacity: usize) {
                let with_capacity: fn(usize) -> Self = $with_capacity;
                *self = with_capacity(capacity);
            }

            fn push_with(&mut self, fill: &mut ElementFill<'_>) -> Result<bool> {
                let mut element = instantiate_element::<$element>()?;
                if !fill(element.view_mut())? {
                    return Ok(false);
                }
                self.$push(element);
                Ok(true)
            }
        }
    };
}

collection_property!(Vec<E>, CollectionKind::List, push, Vec::with_capacity);
collection_property!(VecDeque<E>, CollectionKind::Deque, push_back, VecDeque::with_capacity);
collection_property!(BTreeSet<E: Ord>, CollectionKind::SortedSet, insert, |_| BTreeSet::new());
collection_property!(HashSet<E: Eq: Hash>, CollectionKind::Set, insert, HashSet::with_capacity);
