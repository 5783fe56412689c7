//! Mapper configuration

use error_stack::Report;
use serde::Deserialize;
use serde::Serialize;

use crate::bean::CollectionStrategy;
use crate::constants::DEFAULT_CLEAR_ON_NULL;
use crate::constants::DEFAULT_MAX_DEPTH;
use crate::constants::DEFAULT_REGISTER_DEFAULT_CONVERTERS;
use crate::error::Error;
use crate::error::Result;

/// Behaviour switches of a [`BeanMapper`](crate::BeanMapper)
///
/// Every field is optional when deserializing; missing fields take their defaults.
///
/// ```
/// # fn main() -> beanmapper::Result<()> {
/// let settings = beanmapper::MapperSettings::from_json(
///     r#"{ "max_depth": 8, "default_collection_strategy": "clear" }"#,
/// )?;
/// assert_eq!(settings.max_depth, 8);
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MapperSettings {
    /// Nesting depth beyond which mapping fails with a recursion limit error
    pub max_depth:                   usize,
    /// Strategy for collection properties that declare none
    pub default_collection_strategy: CollectionStrategy,
    /// Seed the converter registry with the built-in conversions
    pub default_converters:          bool,
    /// A matched source property holding no value clears an optional target
    pub clear_on_null:               bool,
}

impl Default for MapperSettings {
    fn default() -> Self {
        Self {
            max_depth:                   DEFAULT_MAX_DEPTH,
            default_collection_strategy: CollectionStrategy::default(),
            default_converters:          DEFAULT_REGISTER_DEFAULT_CONVERTERS,
            clear_on_null:               DEFAULT_CLEAR_ON_NULL,
        }
    }
}

impl MapperSettings {
    /// Parse settings from a JSON document
    pub fn from_json(json: &str) -> Result<Self> {
        let settings: Self = serde_json::from_str(json)
            .map_err(|e| Report::new(Error::cannot("parse mapper settings", e)))?;
        settings.validate()?;
        Ok(settings)
    }

    /// Check the settings for values the mapper cannot work with
    pub fn validate(&self) -> Result<()> {
        if self.max_depth == 0 {
            return Err(Report::new(Error::invalid(
                "max_depth",
                "must allow at least the top-level bean",
            )));
        }
        Ok(())
    }
}
