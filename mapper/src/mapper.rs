//! The mapping engine
//!
//! [`BeanMapper`] walks the target type's plan, resolves each property against the
//! source scope, picks a strategy and applies it, recursing into nested beans and
//! collection elements. One [`MappingContext`] is created per top-level call.

use std::fmt;
use std::sync::Arc;

use error_stack::Report;

use crate::bean::Bean;
use crate::bean::BeanClass;
use crate::bean::BeanType;
use crate::bean::CollectionSlot;
use crate::bean::CollectionStrategy;
use crate::bean::PropertyView;
use crate::bean::PropertyViewMut;
use crate::bean::Scalar;
use crate::context::MappingContext;
use crate::context::VisitKey;
use crate::converter::ConverterRegistry;
use crate::error::Error;
use crate::error::Result;
use crate::property_config::PropertyConfig;
use crate::property_config::SourceScope;
use crate::property_config::configs_for;
use crate::property_config::read_path;
use crate::property_config::resolve_node;
use crate::property_config::scope_of;
use crate::reconcile::reconcile;
use crate::settings::MapperSettings;
use crate::strategy::SkipReason;
use crate::strategy::SourceValue;
use crate::strategy::Strategy;
use crate::strategy::StrategyResolver;

/// Maps beans onto other bean types
///
/// A mapper is immutable once built and can be shared between threads. Type-level
/// metadata is cached process-wide, so creating several mappers is cheap.
///
/// ```
/// use beanmapper::Bean;
/// use beanmapper::BeanMapper;
///
/// #[derive(Bean, Default)]
/// struct Person {
///     name:         String,
///     bank_account: String,
/// }
///
/// #[derive(Bean, Default)]
/// struct PersonView {
///     name: String,
/// }
///
/// # fn main() -> beanmapper::Result<()> {
/// let person = Person {
///     name:         "Henk".to_string(),
///     bank_account: "THX-1138-l33t-call".to_string(),
/// };
/// let view: PersonView = BeanMapper::new().map(&person)?;
/// assert_eq!(view.name, "Henk");
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct BeanMapper {
    settings:   MapperSettings,
    converters: Arc<ConverterRegistry>,
}

impl BeanMapper {
    /// Mapper with default settings and the built-in converters
    pub fn new() -> Self {
        Self {
            settings:   MapperSettings::default(),
            converters: Arc::new(ConverterRegistry::with_defaults()),
        }
    }

    /// Start configuring a mapper
    pub fn builder() -> BeanMapperBuilder {
        BeanMapperBuilder::default()
    }

    /// Settings in effect
    pub const fn settings(&self) -> &MapperSettings {
        &self.settings
    }

    /// Converters in effect
    pub fn converters(&self) -> &ConverterRegistry {
        &self.converters
    }

    /// Map `source` into a new instance of `T`
    ///
    /// Fails with [`Error::Instantiation`] when `T` has no default constructor.
    pub fn map<T: BeanClass>(&self, source: &dyn Bean) -> Result<T> {
        let mut target = <T as crate::bean::Property>::instantiate()
            .ok_or_else(|| Report::new(Error::instantiation(T::class().name())))?;
        self.map_dyn(source, &mut target)?;
        Ok(target)
    }

    /// Map `source` into an existing instance, returning that same instance
    ///
    /// Target properties without a source counterpart keep their values. On failure
    /// the target may be partially updated.
    pub fn map_into<'t, T: Bean>(&self, source: &dyn Bean, target: &'t mut T) -> Result<&'t mut T> {
        self.map_dyn(source, target)?;
        Ok(target)
    }

    /// Map `source` into a new instance of a type known only at runtime
    pub fn map_to_type(&self, source: &dyn Bean, target_type: &'static BeanType) -> Result<Box<dyn Bean>> {
        let mut target = target_type
            .instantiate()
            .ok_or_else(|| Report::new(Error::instantiation(target_type.name())))?;
        self.map_dyn(source, target.as_mut())?;
        Ok(target)
    }

    /// Map every source into a new instance of `T`
    pub fn map_all<'s, T, S, I>(&self, sources: I) -> Result<Vec<T>>
    where
        T: BeanClass,
        S: Bean,
        I: IntoIterator<Item = &'s S>,
    {
        sources
            .into_iter()
            .map(|source| self.map::<T>(source))
            .collect()
    }

    /// Target properties that nothing in `source_type` feeds and that declare no
    /// default, in target declaration order
    pub fn unmatched_properties(
        &self,
        source_type: &'static BeanType,
        target_type: &'static BeanType,
    ) -> Vec<&'static str> {
        configs_for(&scope_of(source_type), target_type)
            .iter()
            .filter(|config| !config.ignore_on_target && !config.encapsulate)
            .filter(|config| config.source.is_none() || config.ignore_on_source)
            .filter(|config| config.default_literal().is_none())
            .map(|config| config.name)
            .collect()
    }

    fn map_dyn(&self, source: &dyn Bean, target: &mut dyn Bean) -> Result<()> {
        let source_type = source.bean_type();
        let target_type = target.bean_type();
        tracing::debug!(
            source_type = source_type.name(),
            target_type = target_type.name(),
            "Mapping started"
        );

        let scope = scope_of(source_type);
        let mut mapping = Mapping {
            strategies:    StrategyResolver::new(
                &self.converters,
                self.settings.default_collection_strategy,
            ),
            clear_on_null: self.settings.clear_on_null,
            context:       MappingContext::new(self.settings.max_depth),
        };
        let written = mapping.map_bean(source, &scope, target)?;

        tracing::debug!(
            source_type = source_type.name(),
            target_type = target_type.name(),
            written,
            "Mapping finished"
        );
        Ok(())
    }
}

impl Default for BeanMapper {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for BeanMapper {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BeanMapper")
            .field("settings", &self.settings)
            .field("converters", &self.converters.len())
            .finish()
    }
}

/// Configures a [`BeanMapper`]
#[derive(Debug, Default)]
pub struct BeanMapperBuilder {
    settings:   MapperSettings,
    converters: ConverterRegistry,
}

impl BeanMapperBuilder {
    /// Replace all settings
    #[must_use]
    pub fn settings(mut self, settings: MapperSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Maximum nesting depth
    #[must_use]
    pub const fn max_depth(mut self, max_depth: usize) -> Self {
        self.settings.max_depth = max_depth;
        self
    }

    /// Strategy for collection properties that declare none
    #[must_use]
    pub const fn default_collection_strategy(mut self, strategy: CollectionStrategy) -> Self {
        self.settings.default_collection_strategy = strategy;
        self
    }

    /// Whether the built-in converters are registered
    #[must_use]
    pub const fn default_converters(mut self, enabled: bool) -> Self {
        self.settings.default_converters = enabled;
        self
    }

    /// Whether a matched null source clears an optional target
    #[must_use]
    pub const fn clear_on_null(mut self, enabled: bool) -> Self {
        self.settings.clear_on_null = enabled;
        self
    }

    /// Register a conversion; it takes precedence over a built-in one for the same pair
    #[must_use]
    pub fn converter<S, T>(mut self, convert: impl Fn(&S) -> T + Send + Sync + 'static) -> Self
    where
        S: Scalar,
        T: Scalar,
    {
        self.converters.register(convert);
        self
    }

    /// Register a conversion that may reject its input
    #[must_use]
    pub fn fallible_converter<S, T, E>(
        mut self,
        convert: impl Fn(&S) -> std::result::Result<T, E> + Send + Sync + 'static,
    ) -> Self
    where
        S: Scalar,
        T: Scalar,
        E: fmt::Display,
    {
        self.converters.register_fallible(convert);
        self
    }

    /// Validate the settings and build the mapper
    pub fn build(self) -> Result<BeanMapper> {
        self.settings.validate()?;

        let mut converters = if self.settings.default_converters {
            ConverterRegistry::with_defaults()
        } else {
            ConverterRegistry::new()
        };
        converters.merge(&self.converters);

        tracing::debug!(
            settings = ?self.settings,
            converters = converters.len(),
            "Built bean mapper"
        );
        Ok(BeanMapper {
            settings:   self.settings,
            converters: Arc::new(converters),
        })
    }
}

/// State of one top-level mapping call
struct Mapping<'m> {
    strategies:    StrategyResolver<'m>,
    clear_on_null: bool,
    context:       MappingContext,
}

impl Mapping<'_> {
    /// Maps every target property of `target`. Returns whether any source value was
    /// written.
    fn map_bean(
        &mut self,
        node: &dyn Bean,
        scope: &Arc<SourceScope>,
        target: &mut dyn Bean,
    ) -> Result<bool> {
        let target_type = target.bean_type();
        let key = VisitKey::new(node, scope.id(), target_type.key());
        if !self.context.enter(key, target_type.name())? {
            tracing::debug!(
                source_type = scope.bean_type().name(),
                target_type = target_type.name(),
                "Cyclic mapping, short-circuiting"
            );
            return Ok(false);
        }

        let mut written = false;
        for config in configs_for(scope, target_type).iter() {
            written |= self
                .map_property(node, scope, target, config)
                .map_err(|report| {
                    report.attach(format!("while mapping {}.{}", target_type.name(), config.name))
                })?;
        }

        self.context.leave(&key);
        Ok(written)
    }

    fn map_property(
        &mut self,
        node: &dyn Bean,
        scope: &Arc<SourceScope>,
        target: &mut dyn Bean,
        config: &PropertyConfig,
    ) -> Result<bool> {
        let source = source_value(node, config);
        let strategy = self.strategies.strategy_for(config, &source);
        tracing::trace!(
            property = config.name,
            key = config.key,
            source = source.kind(),
            ?strategy,
            depth = self.context.depth().get(),
            "Resolved strategy"
        );

        let Some(slot) = target.property_mut(config.name) else {
            return Ok(false);
        };

        match (strategy, source) {
            (Strategy::Skip(reason), _) => {
                self.fallback(config, reason, slot);
                Ok(false)
            }
            (Strategy::Recurse(bean_type), SourceValue::Group { node: anchor, scope: group }) => {
                self.recurse(anchor, &group, slot, bean_type.get(), false)
            }
            (Strategy::Recurse(bean_type), SourceValue::Enclosing) => {
                self.recurse(node, scope, slot, bean_type.get(), false)
            }
            (strategy, SourceValue::Found(value)) => self.write(&value, slot, strategy),
            _ => Ok(false),
        }
    }

    /// Applies a default or clears the target when the source offered nothing usable
    fn fallback(
        &mut self,
        config: &PropertyConfig,
        reason: SkipReason,
        slot: PropertyViewMut<'_>,
    ) {
        if !reason.accepts_default() {
            tracing::trace!(property = config.name, %reason, "Property skipped");
            return;
        }

        if let Some(literal) = config.default_literal() {
            self.apply_default(config, literal, slot);
            return;
        }

        if reason == SkipReason::NoValue && self.clear_on_null {
            clear_optional(config, slot);
        }
    }

    fn apply_default(&mut self, config: &PropertyConfig, literal: &'static str, slot: PropertyViewMut<'_>) {
        let text = literal.to_string();
        let value = PropertyView::Scalar(&text);

        let strategy = self.strategies.for_value(&value, &config.target_type, None);
        if !matches!(strategy, Strategy::Direct | Strategy::Converted(_)) {
            tracing::warn!(
                property = config.name,
                literal,
                target_type = %config.target_type,
                "Default literal cannot be coerced to the property type"
            );
            return;
        }

        match self.write(&value, slot, strategy) {
            Ok(_) => tracing::trace!(property = config.name, literal, "Applied default"),
            Err(report) => tracing::warn!(
                property = config.name,
                literal,
                error = %report.current_context(),
                "Default literal rejected by converter"
            ),
        }
    }

    /// Writes a source value into a slot following `strategy`. Returns whether anything
    /// was written.
    fn write(
        &mut self,
        value: &PropertyView<'_>,
        slot: PropertyViewMut<'_>,
        strategy: Strategy,
    ) -> Result<bool> {
        match (strategy, value) {
            (Strategy::Direct, PropertyView::Scalar(scalar)) => {
                Ok(assign(slot, Scalar::clone_scalar(*scalar)))
            }
            (Strategy::Converted(converter), PropertyView::Scalar(scalar)) => {
                let converted = converter.convert(*scalar)?;
                Ok(assign(slot, converted))
            }
            (Strategy::Recurse(bean_type), PropertyView::Bean(bean)) => {
                let scope = scope_of(bean.bean_type());
                self.recurse(*bean, &scope, slot, bean_type.get(), true)
            }
            (Strategy::CollectionCopy(strategy), PropertyView::Collection(elements)) => {
                self.copy_collection(elements, slot, strategy)
            }
            _ => Ok(false),
        }
    }

    /// Maps `node` into the bean behind `slot`. An empty `Option` is filled with a
    /// constructed bean. When `node` is a group anchor or the enclosing bean rather than
    /// a `found` source value, the constructed bean is kept only if something was
    /// written into it. A found source bean always counts as written.
    fn recurse(
        &mut self,
        node: &dyn Bean,
        scope: &Arc<SourceScope>,
        slot: PropertyViewMut<'_>,
        target_type: &'static BeanType,
        found: bool,
    ) -> Result<bool> {
        let key = VisitKey::new(node, scope.id(), target_type.key());
        if self.context.is_in_progress(&key) {
            tracing::debug!(
                source_type = scope.bean_type().name(),
                target_type = target_type.name(),
                "Cyclic reference, leaving target untouched"
            );
            return Ok(false);
        }

        match slot {
            PropertyViewMut::Bean(bean) => Ok(self.map_bean(node, scope, bean)? || found),
            PropertyViewMut::Optional(optional) => {
                let was_present = optional.is_present();
                let written = match optional.get_or_instantiate() {
                    Some(PropertyViewMut::Bean(bean)) => self.map_bean(node, scope, bean)?,
                    Some(_) => false,
                    None => return Err(Report::new(Error::instantiation(target_type.name()))),
                };
                if !written && !was_present && !found {
                    tracing::trace!(
                        target_type = target_type.name(),
                        "Nothing written, dropping constructed intermediate"
                    );
                    optional.clear();
                    return Ok(false);
                }
                Ok(written || found)
            }
            PropertyViewMut::Scalar(_) | PropertyViewMut::Collection(_) => Ok(false),
        }
    }

    fn copy_collection(
        &mut self,
        elements: &[PropertyView<'_>],
        slot: PropertyViewMut<'_>,
        strategy: CollectionStrategy,
    ) -> Result<bool> {
        let collection: &mut dyn CollectionSlot = match slot {
            PropertyViewMut::Collection(collection) => collection,
            PropertyViewMut::Optional(optional) => {
                let type_name = optional.inner_type().to_string();
                match optional.get_or_instantiate() {
                    Some(PropertyViewMut::Collection(collection)) => collection,
                    Some(_) => return Ok(false),
                    None => return Err(Report::new(Error::instantiation(type_name))),
                }
            }
            PropertyViewMut::Scalar(_) | PropertyViewMut::Bean(_) => return Ok(false),
        };

        reconcile(
            collection,
            elements,
            strategy,
            &mut |element: &PropertyView<'_>, slot: PropertyViewMut<'_>| {
                self.map_element(element, slot)
            },
        )?;
        Ok(true)
    }

    fn map_element(&mut self, element: &PropertyView<'_>, slot: PropertyViewMut<'_>) -> Result<bool> {
        match self.strategies.for_value(element, &slot.declared_type(), None) {
            Strategy::Skip(_) if element.is_null() && matches!(slot, PropertyViewMut::Optional(_)) => {
                tracing::trace!("Kept null collection element");
                Ok(true)
            }
            Strategy::Skip(reason) => {
                tracing::trace!(%reason, element = element.kind(), "Collection element skipped");
                Ok(false)
            }
            strategy => self.write(element, slot, strategy),
        }
    }
}

/// What the source offers for `config`, read relative to `node`
fn source_value<'s>(node: &'s dyn Bean, config: &PropertyConfig) -> SourceValue<'s> {
    if config.encapsulate {
        return SourceValue::Enclosing;
    }
    let Some(binding) = config.source.as_ref().filter(|binding| !binding.ignored) else {
        return SourceValue::Absent;
    };

    match &binding.group {
        Some(group) => resolve_node(node, &binding.path).map_or(SourceValue::Absent, |anchor| {
            SourceValue::Group {
                node:  anchor,
                scope: Arc::clone(group),
            }
        }),
        None => read_path(node, &binding.path).map_or(SourceValue::Absent, SourceValue::Found),
    }
}

fn clear_optional(config: &PropertyConfig, slot: PropertyViewMut<'_>) {
    let PropertyViewMut::Optional(optional) = slot else {
        return;
    };
    if optional.is_present() {
        tracing::trace!(property = config.name, "Cleared by null source value");
        optional.clear();
    }
}

/// Assigns a scalar, filling an empty `Option` first
fn assign(slot: PropertyViewMut<'_>, value: Box<dyn Scalar>) -> bool {
    match slot {
        PropertyViewMut::Scalar(scalar) => scalar.assign(value),
        PropertyViewMut::Optional(optional) => optional
            .get_or_instantiate()
            .is_some_and(|inner| assign(inner, value)),
        PropertyViewMut::Bean(_) | PropertyViewMut::Collection(_) => false,
    }
}
