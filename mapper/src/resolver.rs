//! Property discovery
//!
//! Flattens a bean type and its embedded ancestors into one ordered list of property
//! descriptors. Ancestor properties come first; a descendant redeclaring a name
//! replaces the ancestor's descriptor in place.

use std::sync::Arc;

use crate::bean::BeanType;
use crate::bean::DeclaredType;
use crate::bean::PropertyDecl;
use crate::bean::PropertyMetadata;
use crate::cache;

/// One accessible property of a bean type, including inherited ones
#[derive(Clone, Debug)]
pub struct PropertyDescriptor {
    /// Field name
    pub name:           &'static str,
    /// Declared type of the field
    pub declared_type:  DeclaredType,
    /// Whether the property can be read
    pub readable:       bool,
    /// Whether the property can be written
    pub writable:       bool,
    /// Name of the bean type declaring the field
    pub declaring_type: &'static str,
    /// Declarative metadata of the declaring type
    pub metadata:       PropertyMetadata,
}

impl PropertyDescriptor {
    fn declared_on(bean_type: &BeanType, decl: &PropertyDecl) -> Self {
        Self {
            name:           decl.name(),
            declared_type:  decl.declared_type().clone(),
            readable:       decl.readable(),
            writable:       decl.writable(),
            declaring_type: bean_type.name(),
            metadata:       decl.metadata().clone(),
        }
    }

    /// Key under which the property binds: its alias, or its name
    pub fn binding_key(&self) -> &'static str {
        self.metadata.alias.unwrap_or(self.name)
    }
}

/// All properties of `bean_type`, ancestors first, cached for the process lifetime
pub fn properties_of(bean_type: &'static BeanType) -> Arc<[PropertyDescriptor]> {
    cache::global_cache().properties(bean_type.key(), || resolve(bean_type))
}

/// Look up a single property by field name
pub fn property_of(bean_type: &'static BeanType, name: &str) -> Option<PropertyDescriptor> {
    properties_of(bean_type)
        .iter()
        .find(|descriptor| descriptor.name == name)
        .cloned()
}

fn resolve(bean_type: &'static BeanType) -> Arc<[PropertyDescriptor]> {
    let mut properties: Vec<PropertyDescriptor> = bean_type
        .parent()
        .map(|link| properties_of(link.bean_type.get()).to_vec())
        .unwrap_or_default();

    for decl in bean_type.declared_properties() {
        let descriptor = PropertyDescriptor::declared_on(bean_type, decl);
        match properties
            .iter_mut()
            .find(|existing| existing.name == descriptor.name)
        {
            Some(existing) => *existing = descriptor,
            None => properties.push(descriptor),
        }
    }

    tracing::debug!(
        bean_type = bean_type.name(),
        count = properties.len(),
        "Resolved bean properties"
    );
    properties.into()
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used)]

    use super::*;
    use crate::Bean;
    use crate::BeanClass;

    #[derive(Bean, Default)]
    struct Base {
        id:   i64,
        name: String,
    }

    #[derive(Bean, Default)]
    struct Derived {
        #[bean(parent)]
        base:   Base,
        street: String,
        #[bean(name = "label")]
        name:   Option<String>,
    }

    #[derive(Bean, Default)]
    struct Empty {}

    #[test]
    fn ancestors_come_first() {
        let names: Vec<_> = properties_of(Derived::class())
            .iter()
            .map(|descriptor| descriptor.name)
            .collect();

        assert_eq!(names, vec!["id", "name", "street"]);
    }

    #[test]
    fn redeclared_properties_override_in_place() {
        let name = property_of(Derived::class(), "name").expect("name is declared");
        assert_eq!(name.declaring_type, "Derived");
        assert_eq!(name.binding_key(), "label");

        let id = property_of(Derived::class(), "id").expect("id is inherited");
        assert_eq!(id.declaring_type, "Base");
        assert!(id.readable && id.writable);
    }

    #[test]
    fn a_type_without_properties_is_not_an_error() {
        assert!(properties_of(Empty::class()).is_empty());
    }

    #[test]
    fn descriptors_are_cached() {
        let first = properties_of(Base::class());
        let second = properties_of(Base::class());
        assert!(Arc::ptr_eq(&first, &second));
    }
}
