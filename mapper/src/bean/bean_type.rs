//! Static descriptions of bean types
//!
//! `#[derive(Bean)]` builds one [`BeanType`] per struct, once, behind a `OnceLock`.
//! It records the struct's own property declarations with their declarative
//! metadata, the embedded ancestor (if any) and how to construct a fresh instance.

use std::fmt;

use super::Bean;
use super::BeanClass;
use super::CollectionKind;
use super::CollectionStrategy;
use super::Property;
use super::TypeKey;

/// Description of a property's type
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DeclaredType {
    /// A leaf value
    Scalar(TypeKey),
    /// A nested bean
    Bean(BeanTypeRef),
    /// `Option<T>`
    Optional(Box<DeclaredType>),
    /// A sequence or set
    Collection {
        /// Shape of the collection
        kind:    CollectionKind,
        /// Declared type of each element
        element: Box<DeclaredType>,
    },
}

impl DeclaredType {
    /// This type with any `Option` wrappers removed
    pub fn required(&self) -> &Self {
        match self {
            Self::Optional(inner) => inner.required(),
            other => other,
        }
    }

    /// The bean type behind this declaration, looking through `Option`
    pub fn bean_type(&self) -> Option<&'static BeanType> {
        match self.required() {
            Self::Bean(bean_ref) => Some(bean_ref.get()),
            _ => None,
        }
    }
}

impl fmt::Display for DeclaredType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scalar(key) => write!(f, "{key}"),
            Self::Bean(bean_ref) => f.write_str(bean_ref.get().name()),
            Self::Optional(inner) => write!(f, "Option<{inner}>"),
            Self::Collection { kind, element } => write!(f, "{kind}<{element}>"),
        }
    }
}

/// Lazily resolved reference to a [`BeanType`]
///
/// Declarations refer to other bean types through their accessor function so that
/// self-referential types never need their own description while it is being built.
#[derive(Clone, Copy)]
pub struct BeanTypeRef(fn() -> &'static BeanType);

impl BeanTypeRef {
    /// Wrap a bean type accessor
    pub const fn new(accessor: fn() -> &'static BeanType) -> Self {
        Self(accessor)
    }

    /// Resolve the bean type
    pub fn get(&self) -> &'static BeanType {
        (self.0)()
    }
}

impl PartialEq for BeanTypeRef {
    fn eq(&self, other: &Self) -> bool {
        self.get().key() == other.get().key()
    }
}

impl Eq for BeanTypeRef {}

impl fmt::Debug for BeanTypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.get().name())
    }
}

/// Declarative metadata attached to one property on one side of a mapping
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PropertyMetadata {
    /// Never read (as source) or written (as target)
    pub ignore:     bool,
    /// Binding key used instead of the field name; dots name a nested path
    pub alias:      Option<&'static str>,
    /// Literal applied when no source value is found
    pub default:    Option<&'static str>,
    /// Reconciliation strategy for collection properties
    pub collection: Option<CollectionStrategy>,
    /// Nested bean is flattened (as source) or encapsulated (as target)
    pub unwrap:     bool,
}

/// One property as declared on a bean type
#[derive(Clone, Debug)]
pub struct PropertyDecl {
    name:          &'static str,
    declared_type: DeclaredType,
    readable:      bool,
    writable:      bool,
    metadata:      PropertyMetadata,
}

impl PropertyDecl {
    /// Declare a readable and writable property of type `T`
    pub fn new<T: Property>(name: &'static str) -> Self {
        Self {
            name,
            declared_type: T::declared_type(),
            readable: true,
            writable: true,
            metadata: PropertyMetadata::default(),
        }
    }

    /// Mark as ignored
    #[must_use]
    pub fn ignored(mut self) -> Self {
        self.metadata.ignore = true;
        self
    }

    /// Bind under another name
    #[must_use]
    pub fn alias(mut self, alias: &'static str) -> Self {
        self.metadata.alias = Some(alias);
        self
    }

    /// Default literal
    #[must_use]
    pub fn default_value(mut self, literal: &'static str) -> Self {
        self.metadata.default = Some(literal);
        self
    }

    /// Collection reconciliation strategy
    #[must_use]
    pub fn collection(mut self, strategy: CollectionStrategy) -> Self {
        self.metadata.collection = Some(strategy);
        self
    }

    /// Mark the nested bean as flattened/encapsulated
    #[must_use]
    pub fn unwrap_nested(mut self) -> Self {
        self.metadata.unwrap = true;
        self
    }

    /// Not writable
    #[must_use]
    pub fn read_only(mut self) -> Self {
        self.writable = false;
        self
    }

    /// Not readable
    #[must_use]
    pub fn write_only(mut self) -> Self {
        self.readable = false;
        self
    }

    /// Field name
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Declared type
    pub const fn declared_type(&self) -> &DeclaredType {
        &self.declared_type
    }

    /// Whether the property can be read
    pub const fn readable(&self) -> bool {
        self.readable
    }

    /// Whether the property can be written
    pub const fn writable(&self) -> bool {
        self.writable
    }

    /// Declarative metadata
    pub const fn metadata(&self) -> &PropertyMetadata {
        &self.metadata
    }
}

/// Link from a bean type to its embedded ancestor
#[derive(Clone, Copy, Debug)]
pub struct ParentLink {
    /// Field holding the ancestor
    pub field:     &'static str,
    /// The ancestor's type
    pub bean_type: BeanTypeRef,
}

/// Static description of a bean type
pub struct BeanType {
    name:        &'static str,
    key:         TypeKey,
    type_ref:    BeanTypeRef,
    parent:      Option<ParentLink>,
    properties:  Vec<PropertyDecl>,
    constructor: Option<fn() -> Box<dyn Bean>>,
}

impl BeanType {
    /// Start describing `T`
    pub fn builder<T: BeanClass>(name: &'static str) -> BeanTypeBuilder {
        BeanTypeBuilder {
            bean_type: Self {
                name,
                key: TypeKey::of::<T>(),
                type_ref: BeanTypeRef::new(T::class),
                parent: None,
                properties: Vec::new(),
                constructor: None,
            },
        }
    }

    /// Struct name
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Type identity
    pub const fn key(&self) -> TypeKey {
        self.key
    }

    /// Lazy reference to this type
    pub const fn type_ref(&self) -> BeanTypeRef {
        self.type_ref
    }

    /// Embedded ancestor, if any
    pub const fn parent(&self) -> Option<&ParentLink> {
        self.parent.as_ref()
    }

    /// Properties declared directly on this type, in declaration order
    pub fn declared_properties(&self) -> &[PropertyDecl] {
        &self.properties
    }

    /// Whether instances can be constructed
    pub const fn is_instantiable(&self) -> bool {
        self.constructor.is_some()
    }

    /// Construct a fresh instance, or `None` when the type has no default constructor
    pub fn instantiate(&self) -> Option<Box<dyn Bean>> {
        self.constructor.map(|construct| construct())
    }
}

impl fmt::Debug for BeanType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BeanType")
            .field("name", &self.name)
            .field("parent", &self.parent)
            .field("properties", &self.properties)
            .field("instantiable", &self.is_instantiable())
            .finish_non_exhaustive()
    }
}

/// Incremental construction of a [`BeanType`]
pub struct BeanTypeBuilder {
    bean_type: BeanType,
}

impl BeanTypeBuilder {
    /// Embed an ancestor stored in `field`
    #[must_use]
    pub fn parent(mut self, field: &'static str, bean_type: BeanTypeRef) -> Self {
        self.bean_type.parent = Some(ParentLink { field, bean_type });
        self
    }

    /// Append a property declaration
    #[must_use]
    pub fn property(mut self, property: PropertyDecl) -> Self {
        self.bean_type.properties.push(property);
        self
    }

    /// Provide the default constructor
    #[must_use]
    pub fn constructor(mut self, construct: fn() -> Box<dyn Bean>) -> Self {
        self.bean_type.constructor = Some(construct);
        self
    }

    /// Finish
    pub fn build(self) -> BeanType {
        self.bean_type
    }
}
