//! Per-property mapping configuration
//!
//! A plan is the list of [`PropertyConfig`] records for one (source scope, target
//! type) pair, in target declaration order. Each record merges the declarative
//! metadata of both sides and carries the resolved source binding, so the mapper never
//! looks at metadata directly.

mod source_scope;

use std::sync::Arc;

pub use source_scope::EntryOrigin;
pub use source_scope::SourceBinding;
pub use source_scope::SourceEntry;
pub use source_scope::SourceScope;
pub use source_scope::read_path;
pub use source_scope::resolve_node;
pub use source_scope::scope_of;

use crate::bean::BeanType;
use crate::bean::CollectionStrategy;
use crate::bean::DeclaredType;
use crate::cache;
use crate::resolver::PropertyDescriptor;
use crate::resolver::properties_of;

/// Resolved configuration of one target property for one source scope
#[derive(Clone, Debug)]
pub struct PropertyConfig {
    /// Target field name
    pub name:                &'static str,
    /// Key the target expects to be fed under (its alias, or its name)
    pub key:                 &'static str,
    /// Declared type of the target property
    pub target_type:         DeclaredType,
    /// The target never receives a value
    pub ignore_on_target:    bool,
    /// The source property feeding this key is ignored
    pub ignore_on_source:    bool,
    /// Alias declared on the source property
    pub source_alias:        Option<&'static str>,
    /// Alias declared on the target property
    pub target_alias:        Option<&'static str>,
    /// Default literal declared on the source property
    pub source_default:      Option<&'static str>,
    /// Default literal declared on the target property
    pub target_default:      Option<&'static str>,
    /// Collection reconciliation strategy; target side wins
    pub collection_strategy: Option<CollectionStrategy>,
    /// Target bean is built from the same source node (target-side `unwrap`)
    pub encapsulate:         bool,
    /// Source property or group feeding this key, if any
    pub source:              Option<SourceBinding>,
}

impl PropertyConfig {
    fn resolve(scope: &SourceScope, target_type: &BeanType, descriptor: &PropertyDescriptor) -> Self {
        let target = &descriptor.metadata;
        let encapsulate = target.unwrap && descriptor.declared_type.bean_type().is_some();
        if target.unwrap && !encapsulate {
            tracing::warn!(
                bean_type = target_type.name(),
                property = descriptor.name,
                declared_type = %descriptor.declared_type,
                "unwrap on a property that is not a bean, ignoring"
            );
        }

        let key = descriptor.binding_key();
        let source = if encapsulate {
            None
        } else {
            scope.lookup(key)
        };
        let source_metadata = source.as_ref().map(|binding| &binding.metadata);

        Self {
            name: descriptor.name,
            key,
            target_type: descriptor.declared_type.clone(),
            ignore_on_target: target.ignore,
            ignore_on_source: source.as_ref().is_some_and(|binding| binding.ignored),
            source_alias: source_metadata.and_then(|metadata| metadata.alias),
            target_alias: target.alias,
            source_default: source_metadata.and_then(|metadata| metadata.default),
            target_default: target.default,
            collection_strategy: target
                .collection
                .or_else(|| source_metadata.and_then(|metadata| metadata.collection)),
            encapsulate,
            source,
        }
    }

    /// Default literal that applies when no source value is found: the target's, then
    /// the source's
    pub fn default_literal(&self) -> Option<&'static str> {
        self.target_default.or(self.source_default)
    }

    /// Whether some source property, group or the enclosing node feeds this property
    pub const fn is_matched(&self) -> bool {
        self.encapsulate || self.source.is_some()
    }

    /// Configuration with no source binding and no metadata
    pub const fn unbound(name: &'static str, target_type: DeclaredType) -> Self {
        Self {
            name,
            key: name,
            target_type,
            ignore_on_target: false,
            ignore_on_source: false,
            source_alias: None,
            target_alias: None,
            source_default: None,
            target_default: None,
            collection_strategy: None,
            encapsulate: false,
            source: None,
        }
    }
}

/// Plan for mapping from `scope` into `target_type`, cached per pair
pub fn configs_for(scope: &SourceScope, target_type: &'static BeanType) -> Arc<[PropertyConfig]> {
    cache::global_cache().plan((scope.id(), target_type.key()), || {
        let plan: Arc<[PropertyConfig]> = properties_of(target_type)
            .iter()
            .filter(|descriptor| descriptor.writable)
            .map(|descriptor| PropertyConfig::resolve(scope, target_type, descriptor))
            .collect();
        tracing::debug!(
            source_type = scope.bean_type().name(),
            scope = scope.id(),
            target_type = target_type.name(),
            properties = plan.len(),
            "Resolved mapping plan"
        );
        plan
    })
}

/// Configuration of one target property when mapping from `source_type`
pub fn config_for(
    source_type: &'static BeanType,
    target_type: &'static BeanType,
    property: &str,
) -> Option<PropertyConfig> {
    configs_for(&scope_of(source_type), target_type)
        .iter()
        .find(|config| config.name == property)
        .cloned()
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used)]

    use super::*;
    use crate::Bean;
    use crate::BeanClass;

    #[derive(Bean, Default)]
    struct IgnoreSource {
        #[bean(ignore)]
        both_ignore:   Option<String>,
        #[bean(ignore)]
        source_ignore: Option<String>,
        target_ignore: Option<String>,
        no_ignore:     Option<String>,
    }

    #[derive(Bean, Default)]
    struct IgnoreTarget {
        #[bean(ignore)]
        both_ignore:   Option<String>,
        source_ignore: Option<String>,
        #[bean(ignore)]
        target_ignore: Option<String>,
        no_ignore:     Option<String>,
    }

    #[derive(Bean, Default)]
    struct SourceWithDefaults {
        #[bean(default = "bothdefault1")]
        both_default:   Option<String>,
        #[bean(default = "sourcedefault")]
        source_default: Option<String>,
        #[bean(name = "renamed", collection = "clear")]
        tags:           Vec<String>,
    }

    #[derive(Bean, Default)]
    struct TargetWithDefaults {
        #[bean(default = "bothdefault2")]
        both_default:   Option<String>,
        source_default: Option<String>,
        #[bean(default = "targetdefault")]
        target_default: Option<String>,
        #[bean(name = "renamed")]
        labels:         Vec<String>,
        #[bean(read_only)]
        computed:       String,
    }

    fn config(source: &'static BeanType, target: &'static BeanType, name: &str) -> PropertyConfig {
        config_for(source, target, name).expect("property is planned")
    }

    #[test]
    fn ignore_is_unioned_across_sides() {
        let (source, target) = (IgnoreSource::class(), IgnoreTarget::class());

        let both = config(source, target, "both_ignore");
        assert!(both.ignore_on_source && both.ignore_on_target);

        let source_only = config(source, target, "source_ignore");
        assert!(source_only.ignore_on_source && !source_only.ignore_on_target);

        let target_only = config(source, target, "target_ignore");
        assert!(!target_only.ignore_on_source && target_only.ignore_on_target);

        let neither = config(source, target, "no_ignore");
        assert!(!neither.ignore_on_source && !neither.ignore_on_target);
    }

    #[test]
    fn target_default_wins_over_source_default() {
        let (source, target) = (SourceWithDefaults::class(), TargetWithDefaults::class());

        assert_eq!(
            config(source, target, "both_default").default_literal(),
            Some("bothdefault2")
        );
        assert_eq!(
            config(source, target, "source_default").default_literal(),
            Some("sourcedefault")
        );
        let unmatched = config(source, target, "target_default");
        assert_eq!(unmatched.default_literal(), Some("targetdefault"));
        assert!(!unmatched.is_matched());
    }

    #[test]
    fn aliases_and_collection_strategy_come_from_both_sides() {
        let labels = config(SourceWithDefaults::class(), TargetWithDefaults::class(), "labels");

        assert_eq!(labels.key, "renamed");
        assert_eq!(labels.source_alias, Some("renamed"));
        assert_eq!(labels.target_alias, Some("renamed"));
        assert_eq!(
            labels.collection_strategy,
            Some(CollectionStrategy::ClearAndRefill)
        );
        assert_eq!(
            labels.source.as_ref().map(|binding| binding.path.clone()),
            Some(vec!["tags"])
        );
    }

    #[test]
    fn read_only_targets_are_not_planned() {
        assert!(
            config_for(
                SourceWithDefaults::class(),
                TargetWithDefaults::class(),
                "computed"
            )
            .is_none()
        );
    }

    #[test]
    fn plans_are_cached_per_scope_and_target() {
        let scope = scope_of(IgnoreSource::class());
        let first = configs_for(&scope, IgnoreTarget::class());
        let second = configs_for(&scope, IgnoreTarget::class());
        assert!(Arc::ptr_eq(&first, &second));
    }
}
