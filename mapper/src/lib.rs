//! # beanmapper
//!
//! Copies, converts and reshapes values between bean types. A bean is a struct that
//! describes its properties through `#[derive(Bean)]`; the mapper matches target
//! properties to source properties by name, converts scalars where the types differ,
//! recurses into nested beans and rebuilds collections element by element.
//!
//! Matching is steered declaratively with `#[bean(...)]` field attributes:
//! renaming (including dotted paths into nested beans), ignoring, default literals,
//! flattening nested beans (`unwrap`), inheriting properties from an embedded
//! ancestor (`parent`) and choosing how target collections are reconciled.
//!
//! ```
//! use beanmapper::Bean;
//! use beanmapper::BeanMapper;
//!
//! #[derive(Bean, Default)]
//! struct Address {
//!     street: String,
//!     number: i32,
//! }
//!
//! #[derive(Bean, Default)]
//! struct House {
//!     name:    String,
//!     address: Address,
//! }
//!
//! #[derive(Bean, Default)]
//! struct HouseView {
//!     name:   String,
//!     #[bean(name = "address.street")]
//!     street: String,
//!     #[bean(name = "address.number")]
//!     number: String,
//! }
//!
//! # fn main() -> beanmapper::Result<()> {
//! let house = House {
//!     name:    "housename".to_string(),
//!     address: Address {
//!         street: "denneweg".to_string(),
//!         number: 1,
//!     },
//! };
//!
//! let view: HouseView = BeanMapper::new().map(&house)?;
//! assert_eq!(view.street, "denneweg");
//! assert_eq!(view.number, "1");
//! # Ok(())
//! # }
//! ```
//!
//! ## Logging
//!
//! The crate emits `tracing` events and never installs a subscriber: `debug` for
//! mapping calls, type resolution and cycles, `trace` for per-property decisions and
//! `warn` for default literals that cannot be coerced.

extern crate self as beanmapper;

mod bean;
mod cache;
mod constants;
mod context;
mod converter;
mod error;
mod mapper;
mod property_config;
mod reconcile;
mod resolver;
mod settings;
mod strategy;

pub use bean::Bean;
pub use bean::BeanClass;
pub use bean::BeanType;
pub use bean::BeanTypeBuilder;
pub use bean::BeanTypeRef;
pub use bean::CollectionKind;
pub use bean::CollectionSlot;
pub use bean::CollectionStrategy;
pub use bean::DeclaredType;
pub use bean::ElementFill;
pub use bean::OptionalSlot;
pub use bean::ParentLink;
pub use bean::Property;
pub use bean::PropertyDecl;
pub use bean::PropertyMetadata;
pub use bean::PropertyView;
pub use bean::PropertyViewMut;
pub use bean::Scalar;
pub use bean::ScalarSlot;
pub use bean::TypeKey;
pub use beanmapper_macros::Bean;
pub use cache::clear_caches;
pub use constants::DEFAULT_MAX_DEPTH;
pub use constants::RecursionDepth;
pub use converter::Converter;
pub use converter::ConverterRegistry;
pub use error::Error;
pub use error::Result;
pub use mapper::BeanMapper;
pub use mapper::BeanMapperBuilder;
pub use property_config::EntryOrigin;
pub use property_config::PropertyConfig;
pub use property_config::SourceBinding;
pub use property_config::SourceEntry;
pub use property_config::SourceScope;
pub use property_config::config_for;
pub use property_config::configs_for;
pub use property_config::scope_of;
pub use reconcile::MapElement;
pub use reconcile::reconcile;
pub use resolver::PropertyDescriptor;
pub use resolver::properties_of;
pub use resolver::property_of;
pub use settings::MapperSettings;
pub use strategy::SkipReason;
pub use strategy::SourceValue;
pub use strategy::Strategy;
pub use strategy::StrategyResolver;
