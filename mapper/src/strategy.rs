//! Strategy selection
//!
//! Decides, per target property, how it gets populated. Resolution is pure: it only
//! looks at the property's configuration, the shape of the source value and the
//! converter registry.

use std::sync::Arc;

use strum::Display;

use crate::bean::Bean;
use crate::bean::BeanTypeRef;
use crate::bean::CollectionStrategy;
use crate::bean::DeclaredType;
use crate::bean::PropertyView;
use crate::bean::Scalar;
use crate::converter::Converter;
use crate::converter::ConverterRegistry;
use crate::property_config::PropertyConfig;
use crate::property_config::SourceScope;

/// How a target property is populated
#[derive(Clone, Debug)]
pub enum Strategy {
    /// Leave the target untouched
    Skip(SkipReason),
    /// Same scalar type, copy the value
    Direct,
    /// Different scalar types, apply the registered converter
    Converted(Converter),
    /// Nested bean, construct the target if absent and map recursively
    Recurse(BeanTypeRef),
    /// Collection, map every element and reconcile
    CollectionCopy(CollectionStrategy),
}

/// Why a target property was left untouched
#[derive(Clone, Copy, Debug, PartialEq, Eq, Display)]
#[strum(serialize_all = "snake_case")]
pub enum SkipReason {
    /// The target marks the property as ignored
    IgnoredOnTarget,
    /// The source marks the feeding property as ignored
    IgnoredOnSource,
    /// No source property is bound to the target's key
    Unmatched,
    /// The source property holds no value
    NoValue,
    /// Source and target shapes are not mappable and no converter is registered
    Incompatible,
}

impl SkipReason {
    /// Whether a declared default may fill in for the missing value
    pub const fn accepts_default(self) -> bool {
        matches!(self, Self::IgnoredOnSource | Self::Unmatched | Self::NoValue)
    }
}

/// What the source offers for one target property
pub enum SourceValue<'s> {
    /// Nothing: unmatched, ignored on the source, or behind an absent nested bean
    Absent,
    /// A value read from the source; [`PropertyView::Null`] when empty
    Found(PropertyView<'s>),
    /// A virtual group of dotted aliases rooted at `node`
    Group {
        /// Node the group's paths start from
        node:  &'s dyn Bean,
        /// The group's entries
        scope: Arc<SourceScope>,
    },
    /// The enclosing source node itself, for target-side encapsulation
    Enclosing,
}

impl SourceValue<'_> {
    /// Short name used in logs
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Absent => "absent",
            Self::Found(view) => view.kind(),
            Self::Group { .. } => "group",
            Self::Enclosing => "enclosing",
        }
    }
}

/// Chooses a [`Strategy`] for target properties and collection elements
#[derive(Clone, Copy, Debug)]
pub struct StrategyResolver<'r> {
    converters:         &'r ConverterRegistry,
    default_collection: CollectionStrategy,
}

impl<'r> StrategyResolver<'r> {
    /// Create a resolver over a converter registry
    pub const fn new(
        converters: &'r ConverterRegistry,
        default_collection: CollectionStrategy,
    ) -> Self {
        Self {
            converters,
            default_collection,
        }
    }

    /// Strategy for a target property given what the source offers
    ///
    /// Defaults are not considered here; the caller substitutes a default literal when
    /// the returned skip [accepts one](SkipReason::accepts_default).
    pub fn strategy_for(&self, config: &PropertyConfig, source: &SourceValue<'_>) -> Strategy {
        if config.ignore_on_target {
            return Strategy::Skip(SkipReason::IgnoredOnTarget);
        }

        match source {
            SourceValue::Absent if config.ignore_on_source => {
                Strategy::Skip(SkipReason::IgnoredOnSource)
            }
            SourceValue::Absent => Strategy::Skip(SkipReason::Unmatched),
            SourceValue::Group { .. } | SourceValue::Enclosing => {
                match config.target_type.required() {
                    DeclaredType::Bean(bean_type) => Strategy::Recurse(*bean_type),
                    _ => Strategy::Skip(SkipReason::Incompatible),
                }
            }
            SourceValue::Found(view) => {
                self.for_value(view, &config.target_type, config.collection_strategy)
            }
        }
    }

    /// Strategy for writing `value` into a slot declared as `target`
    pub fn for_value(
        &self,
        value: &PropertyView<'_>,
        target: &DeclaredType,
        collection: Option<CollectionStrategy>,
    ) -> Strategy {
        match (value, target.required()) {
            (PropertyView::Null, _) => Strategy::Skip(SkipReason::NoValue),
            (PropertyView::Scalar(scalar), DeclaredType::Scalar(target_key)) => {
                let source_key = Scalar::type_key(*scalar);
                if source_key == *target_key {
                    Strategy::Direct
                } else if let Some(converter) = self.converters.get(source_key, *target_key) {
                    Strategy::Converted(converter.clone())
                } else {
                    Strategy::Skip(SkipReason::Incompatible)
                }
            }
            (PropertyView::Bean(_), DeclaredType::Bean(bean_type)) => Strategy::Recurse(*bean_type),
            (PropertyView::Collection(_), DeclaredType::Collection { .. }) => {
                Strategy::CollectionCopy(collection.unwrap_or(self.default_collection))
            }
            _ => Strategy::Skip(SkipReason::Incompatible),
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::panic)]

    use chrono::NaiveDate;

    use super::*;
    use crate::Property;
    use crate::bean::CollectionKind;
    use crate::bean::TypeKey;

    fn string_config(name: &'static str) -> PropertyConfig {
        PropertyConfig::unbound(name, <Option<String> as Property>::declared_type())
    }

    #[test]
    fn ignore_on_target_beats_everything() {
        let registry = ConverterRegistry::new();
        let resolver = StrategyResolver::new(&registry, CollectionStrategy::Replace);
        let mut config = string_config("both_ignore");
        config.ignore_on_target = true;

        let value = String::from("bothIgnore");
        let strategy = resolver.strategy_for(&config, &SourceValue::Found(value.view()));
        assert!(matches!(
            strategy,
            Strategy::Skip(SkipReason::IgnoredOnTarget)
        ));
    }

    #[test]
    fn absent_sources_explain_themselves() {
        let registry = ConverterRegistry::new();
        let resolver = StrategyResolver::new(&registry, CollectionStrategy::Replace);
        let mut config = string_config("source_ignore");

        assert!(matches!(
            resolver.strategy_for(&config, &SourceValue::Absent),
            Strategy::Skip(SkipReason::Unmatched)
        ));

        config.ignore_on_source = true;
        let strategy = resolver.strategy_for(&config, &SourceValue::Absent);
        assert!(matches!(
            strategy,
            Strategy::Skip(SkipReason::IgnoredOnSource)
        ));
        if let Strategy::Skip(reason) = strategy {
            assert!(reason.accepts_default());
        }
    }

    #[test]
    fn same_scalar_type_copies_directly() {
        let registry = ConverterRegistry::new();
        let resolver = StrategyResolver::new(&registry, CollectionStrategy::Replace);

        let value = String::from("Henk");
        let strategy = resolver.for_value(
            &value.view(),
            &<Option<String> as Property>::declared_type(),
            None,
        );
        assert!(matches!(strategy, Strategy::Direct));
    }

    #[test]
    fn differing_scalars_need_a_converter() {
        let empty = ConverterRegistry::new();
        let defaults = ConverterRegistry::with_defaults();
        let date = NaiveDate::from_ymd_opt(2015, 4, 1);
        let target = DeclaredType::Scalar(TypeKey::of::<String>());

        let without = StrategyResolver::new(&empty, CollectionStrategy::Replace);
        assert!(matches!(
            without.for_value(&date.view(), &target, None),
            Strategy::Skip(SkipReason::Incompatible)
        ));

        let with = StrategyResolver::new(&defaults, CollectionStrategy::Replace);
        let Strategy::Converted(converter) = with.for_value(&date.view(), &target, None) else {
            panic!("date to string is a default conversion");
        };
        assert_eq!(converter.source(), TypeKey::of::<NaiveDate>());
    }

    #[test]
    fn collections_fall_back_to_the_default_strategy() {
        let registry = ConverterRegistry::new();
        let resolver = StrategyResolver::new(&registry, CollectionStrategy::ClearAndRefill);
        let items = vec![1_i32, 2, 3];
        let target = DeclaredType::Collection {
            kind:    CollectionKind::List,
            element: Box::new(DeclaredType::Scalar(TypeKey::of::<i64>())),
        };

        assert!(matches!(
            resolver.for_value(&items.view(), &target, None),
            Strategy::CollectionCopy(CollectionStrategy::ClearAndRefill)
        ));
        assert!(matches!(
            resolver.for_value(&items.view(), &target, Some(CollectionStrategy::Replace)),
            Strategy::CollectionCopy(CollectionStrategy::Replace)
        ));
    }

    #[test]
    fn null_values_are_not_written() {
        let registry = ConverterRegistry::new();
        let resolver = StrategyResolver::new(&registry, CollectionStrategy::Replace);
        let absent: Option<String> = None;

        assert!(matches!(
            resolver.for_value(&absent.view(), &DeclaredType::Scalar(TypeKey::of::<String>()), None),
            Strategy::Skip(SkipReason::NoValue)
        ));
    }

    #[test]
    fn shape_mismatches_are_skipped() {
        let registry = ConverterRegistry::with_defaults();
        let resolver = StrategyResolver::new(&registry, CollectionStrategy::Replace);
        let items = vec![String::from("a")];

        assert!(matches!(
            resolver.for_value(&items.view(), &DeclaredType::Scalar(TypeKey::of::<String>()), None),
            Strategy::Skip(SkipReason::Incompatible)
        ));
    }
}
