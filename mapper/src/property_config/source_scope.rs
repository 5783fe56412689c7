//! Source-side key index
//!
//! A [`SourceScope`] answers "which source property feeds binding key `k`?" for one
//! source bean type. Besides the type's own properties it exposes:
//!
//! - virtual groups for dotted aliases (`monteur.name` creates group `monteur` holding
//!   key `name`)
//! - the entries of every `unwrap` property, flattened with the property's name
//!   prefixed to their path
//!
//! Direct keys take precedence over groups, and groups over flattened entries. Within
//! each tier the first declaration wins.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;

use itertools::Itertools;

use crate::bean::Bean;
use crate::bean::BeanType;
use crate::bean::DeclaredType;
use crate::bean::PropertyMetadata;
use crate::bean::PropertyView;
use crate::bean::TypeKey;
use crate::cache;
use crate::resolver::PropertyDescriptor;
use crate::resolver::properties_of;

static NEXT_SCOPE_ID: AtomicU64 = AtomicU64::new(1);

/// Where an entry of a scope came from
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EntryOrigin {
    /// A property of the scope's own type (or its ancestors)
    Direct,
    /// A virtual group created by dotted aliases
    Group,
    /// An entry of an `unwrap` property's type
    Flattened,
}

/// One key visible in a [`SourceScope`]
#[derive(Clone, Debug)]
pub struct SourceEntry {
    key:           &'static str,
    path:          Vec<&'static str>,
    declared_type: Option<DeclaredType>,
    metadata:      PropertyMetadata,
    origin:        EntryOrigin,
    group:         Option<Arc<SourceScope>>,
}

impl SourceEntry {
    fn direct(key: &'static str, descriptor: &PropertyDescriptor) -> Self {
        Self {
            key,
            path: vec![descriptor.name],
            declared_type: Some(descriptor.declared_type.clone()),
            metadata: descriptor.metadata.clone(),
            origin: EntryOrigin::Direct,
            group: None,
        }
    }

    fn new_group(key: &'static str, scope: SourceScope) -> Self {
        Self {
            key,
            path: Vec::new(),
            declared_type: None,
            metadata: PropertyMetadata::default(),
            origin: EntryOrigin::Group,
            group: Some(Arc::new(scope)),
        }
    }

    fn flattened_under(mut self, prefix: &'static str) -> Self {
        self.path.insert(0, prefix);
        self.origin = EntryOrigin::Flattened;
        self
    }

    /// Binding key
    pub const fn key(&self) -> &'static str {
        self.key
    }

    /// Property names leading from the scope's node to the value. For a group this is
    /// the node the group's own paths start from.
    pub fn path(&self) -> &[&'static str] {
        &self.path
    }

    /// Declared type of the source property; `None` for groups
    pub const fn declared_type(&self) -> Option<&DeclaredType> {
        self.declared_type.as_ref()
    }

    /// Source-side declarative metadata
    pub const fn metadata(&self) -> &PropertyMetadata {
        &self.metadata
    }

    /// Where the entry came from
    pub const fn origin(&self) -> EntryOrigin {
        self.origin
    }

    /// Whether the source marks this property as ignored
    pub const fn is_ignored(&self) -> bool {
        self.metadata.ignore
    }

    /// The scope holding the entries of a virtual group
    pub fn group(&self) -> Option<&Arc<SourceScope>> {
        self.group.as_ref()
    }
}

/// Resolution of a (possibly dotted) binding key against a scope
#[derive(Clone, Debug)]
pub struct SourceBinding {
    /// Property names from the scope's node to the value, or to the group's node
    pub path:          Vec<&'static str>,
    /// Declared type of the source property; `None` for groups
    pub declared_type: Option<DeclaredType>,
    /// Source-side metadata of the final entry
    pub metadata:      PropertyMetadata,
    /// Whether any entry along the key is ignored on the source side
    pub ignored:       bool,
    /// Virtual group reached by the key
    pub group:         Option<Arc<SourceScope>>,
}

impl SourceBinding {
    fn from_entry(entry: &SourceEntry) -> Self {
        Self {
            path:          entry.path.clone(),
            declared_type: entry.declared_type.clone(),
            metadata:      entry.metadata.clone(),
            ignored:       entry.is_ignored(),
            group:         entry.group.clone(),
        }
    }

    fn descend(self, segment: &str) -> Option<Self> {
        let nested = match (&self.group, &self.declared_type) {
            (Some(group), _) => Arc::clone(group),
            (None, Some(declared)) => scope_of(declared.bean_type()?),
            (None, None) => return None,
        };
        let entry = nested.entry(segment)?;

        let mut path = self.path;
        path.extend_from_slice(&entry.path);
        Some(Self {
            path,
            declared_type: entry.declared_type.clone(),
            metadata: entry.metadata.clone(),
            ignored: self.ignored || entry.is_ignored(),
            group: entry.group.clone(),
        })
    }
}

/// Index of every binding key a source bean type can feed
#[derive(Debug)]
pub struct SourceScope {
    id:        u64,
    bean_type: &'static BeanType,
    entries:   Vec<SourceEntry>,
    index:     HashMap<&'static str, usize>,
}

impl SourceScope {
    fn new(bean_type: &'static BeanType, entries: EntryIndex) -> Self {
        Self {
            id: NEXT_SCOPE_ID.fetch_add(1, Ordering::Relaxed),
            bean_type,
            entries: entries.entries,
            index: entries.index,
        }
    }

    /// Unique id, used to key cached plans
    pub const fn id(&self) -> u64 {
        self.id
    }

    /// Source bean type the scope was built for
    pub const fn bean_type(&self) -> &'static BeanType {
        self.bean_type
    }

    /// All entries in precedence order
    pub fn entries(&self) -> &[SourceEntry] {
        &self.entries
    }

    /// Entry bound to a single key segment
    pub fn entry(&self, key: &str) -> Option<&SourceEntry> {
        self.index.get(key).map(|&position| &self.entries[position])
    }

    /// Resolve a binding key. Dotted keys descend through groups and nested beans.
    pub fn lookup(&self, key: &str) -> Option<SourceBinding> {
        let mut segments = key.split('.');
        let first = self.entry(segments.next()?)?;
        segments.try_fold(SourceBinding::from_entry(first), SourceBinding::descend)
    }
}

#[derive(Default)]
struct EntryIndex {
    entries: Vec<SourceEntry>,
    index:   HashMap<&'static str, usize>,
}

impl EntryIndex {
    fn insert(&mut self, entry: SourceEntry) {
        if self.index.contains_key(entry.key) {
            tracing::trace!(
                key = entry.key,
                path = %entry.path.iter().join("."),
                "Source key already bound, entry shadowed"
            );
            return;
        }
        self.index.insert(entry.key, self.entries.len());
        self.entries.push(entry);
    }
}

/// Scope of `bean_type`, cached for the process lifetime
pub fn scope_of(bean_type: &'static BeanType) -> Arc<SourceScope> {
    cache::global_cache().scope(bean_type.key(), || {
        let scope = build(bean_type, &mut Vec::new());
        tracing::debug!(
            bean_type = bean_type.name(),
            scope = scope.id(),
            keys = %scope.entries().iter().map(SourceEntry::key).join(", "),
            "Built source scope"
        );
        Arc::new(scope)
    })
}

/// Read the value at `path` below `node`
///
/// Returns `None` when a nested bean along the way is absent.
pub fn read_path<'s>(node: &'s dyn Bean, path: &[&str]) -> Option<PropertyView<'s>> {
    let (last, hops) = path.split_last()?;
    resolve_node(node, hops)?.property(last)
}

/// The nested bean at `path` below `node`; `node` itself for an empty path
pub fn resolve_node<'s>(node: &'s dyn Bean, path: &[&str]) -> Option<&'s dyn Bean> {
    path.iter()
        .try_fold(node, |current, hop| current.property(hop)?.as_bean())
}

/// Builds a scope without consulting the cache for unwrapped types, so the result
/// does not depend on which type of an unwrap cycle was scoped first.
fn build(bean_type: &'static BeanType, unwrapping: &mut Vec<TypeKey>) -> SourceScope {
    unwrapping.push(bean_type.key());

    let properties = properties_of(bean_type);
    let readable: Vec<&PropertyDescriptor> = properties
        .iter()
        .filter(|descriptor| descriptor.readable)
        .collect();

    let mut entries = EntryIndex::default();

    let (dotted, plain): (Vec<&&PropertyDescriptor>, Vec<&&PropertyDescriptor>) = readable
        .iter()
        .partition(|descriptor| descriptor.binding_key().contains('.'));

    for descriptor in plain {
        entries.insert(SourceEntry::direct(descriptor.binding_key(), descriptor));
    }

    let members = dotted
        .into_iter()
        .map(|descriptor| (descriptor.binding_key().split('.').collect(), *descriptor))
        .collect();
    for group in build_groups(bean_type, members) {
        entries.insert(group);
    }

    for descriptor in readable
        .iter()
        .filter(|descriptor| descriptor.metadata.unwrap && !descriptor.metadata.ignore)
    {
        let Some(nested_type) = descriptor.declared_type.bean_type() else {
            tracing::warn!(
                bean_type = bean_type.name(),
                property = descriptor.name,
                declared_type = %descriptor.declared_type,
                "unwrap on a property that is not a bean, ignoring"
            );
            continue;
        };
        if unwrapping.contains(&nested_type.key()) {
            tracing::debug!(
                bean_type = bean_type.name(),
                property = descriptor.name,
                nested_type = nested_type.name(),
                "Cyclic unwrap, not flattening"
            );
            continue;
        }

        let nested = build(nested_type, unwrapping);
        for entry in nested.entries {
            entries.insert(entry.flattened_under(descriptor.name));
        }
    }

    unwrapping.pop();
    SourceScope::new(bean_type, entries)
}

/// Groups dotted aliases by their first segment, recursively, in declaration order
fn build_groups(
    bean_type: &'static BeanType,
    members: Vec<(Vec<&'static str>, &PropertyDescriptor)>,
) -> Vec<SourceEntry> {
    let mut groups: Vec<(&'static str, Vec<(Vec<&'static str>, &PropertyDescriptor)>)> =
        Vec::new();
    for (mut segments, descriptor) in members {
        if segments.is_empty() {
            continue;
        }
        let head = segments.remove(0);
        match groups.iter_mut().find(|(key, _)| *key == head) {
            Some((_, nested)) => nested.push((segments, descriptor)),
            None => groups.push((head, vec![(segments, descriptor)])),
        }
    }

    groups
        .into_iter()
        .map(|(key, nested)| {
            let mut entries = EntryIndex::default();
            let (leaves, deeper): (Vec<_>, Vec<_>) = nested
                .into_iter()
                .partition(|(segments, _)| segments.len() == 1);

            for (segments, descriptor) in leaves {
                entries.insert(SourceEntry::direct(segments[0], descriptor));
            }
            for group in build_groups(bean_type, deeper) {
                entries.insert(group);
            }
            SourceEntry::new_group(key, SourceScope::new(bean_type, entries))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used)]

    use super::*;
    use crate::Bean;
    use crate::BeanClass;

    #[derive(Bean, Default)]
    struct Car {
        brand:  String,
        wheels: i32,
    }

    #[derive(Bean, Default)]
    struct Driver {
        name:         String,
        #[bean(unwrap)]
        car:          Car,
        #[bean(name = "monteur.name")]
        monteur_name: String,
        #[bean(name = "monteur.shop.city")]
        monteur_city: String,
        #[bean(ignore)]
        secret:       String,
    }

    #[derive(Bean, Default)]
    struct Loop {
        label: String,
        #[bean(unwrap)]
        back:  Option<Box<Pool>>,
    }

    #[derive(Bean, Default)]
    struct Pool {
        depth: i32,
        #[bean(unwrap)]
        back:  Option<Box<Loop>>,
    }

    fn keys(scope: &SourceScope) -> Vec<&'static str> {
        scope.entries().iter().map(SourceEntry::key).collect()
    }

    #[test]
    fn direct_then_groups_then_flattened() {
        let scope = scope_of(Driver::class());
        assert_eq!(
            keys(&scope),
            vec!["name", "car", "secret", "monteur", "brand", "wheels"]
        );

        let brand = scope.entry("brand").expect("flattened from car");
        assert_eq!(brand.path(), ["car", "brand"]);
        assert_eq!(brand.origin(), EntryOrigin::Flattened);
    }

    #[test]
    fn dotted_aliases_form_nested_groups() {
        let scope = scope_of(Driver::class());

        let name = scope.lookup("monteur.name").expect("grouped alias");
        assert_eq!(name.path, ["monteur_name"]);

        let city = scope.lookup("monteur.shop.city").expect("nested group");
        assert_eq!(city.path, ["monteur_city"]);

        assert!(scope.lookup("monteur.missing").is_none());
    }

    #[test]
    fn dotted_lookups_descend_into_beans() {
        let scope = scope_of(Driver::class());
        let wheels = scope.lookup("car.wheels").expect("car is a bean");
        assert_eq!(wheels.path, ["car", "wheels"]);
    }

    #[test]
    fn ignored_entries_stay_flagged() {
        let scope = scope_of(Driver::class());
        let secret = scope.lookup("secret").expect("indexed");
        assert!(secret.ignored);
    }

    #[test]
    fn cyclic_unwraps_are_cut() {
        let looped = scope_of(Loop::class());
        assert_eq!(keys(&looped), vec!["label", "back", "depth"]);

        let pooled = scope_of(Pool::class());
        assert_eq!(keys(&pooled), vec!["depth", "back", "label"]);
    }

    #[test]
    fn paths_read_through_nested_beans() {
        let driver = Driver {
            name: "driverName".to_string(),
            car: Car {
                brand:  "Opel".to_string(),
                wheels: 4,
            },
            ..Driver::default()
        };

        let brand = read_path(&driver, &["car", "brand"]).expect("present");
        assert_eq!(brand.downcast_ref::<String>().map(String::as_str), Some("Opel"));
        assert!(read_path(&driver, &["car", "missing"]).is_none());
        assert!(read_path(&driver, &[]).is_none());
    }

    #[test]
    fn absent_intermediates_read_as_missing() {
        let looped = Loop::default();
        assert!(read_path(&looped, &["back", "depth"]).is_none());
        assert!(resolve_node(&looped, &["back"]).is_none());
        assert!(resolve_node(&looped, &[]).is_some());
    }
}
