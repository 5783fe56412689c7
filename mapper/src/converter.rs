//! Scalar converter registry
//!
//! Maps a (source scalar type, target scalar type) pair to a conversion function. The
//! engine consults the registry only when source and target types differ.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use error_stack::Report;

use crate::bean::Scalar;
use crate::bean::TypeKey;
use crate::error::Error;
use crate::error::Result;

type ConvertFn = dyn Fn(&dyn Scalar) -> std::result::Result<Box<dyn Scalar>, String> + Send + Sync;

/// A registered conversion between two scalar types
#[derive(Clone)]
pub struct Converter {
    source:  TypeKey,
    target:  TypeKey,
    convert: Arc<ConvertFn>,
}

impl Converter {
    /// Type the converter accepts
    pub const fn source(&self) -> TypeKey {
        self.source
    }

    /// Type the converter produces
    pub const fn target(&self) -> TypeKey {
        self.target
    }

    /// Convert `value`, failing with [`Error::Conversion`]
    pub fn convert(&self, value: &dyn Scalar) -> Result<Box<dyn Scalar>> {
        (self.convert)(value)
            .map_err(|reason| Report::new(Error::conversion(self.source, self.target, reason)))
    }
}

impl fmt::Debug for Converter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Converter({} -> {})", self.source, self.target)
    }
}

/// Registry of scalar converters keyed by (source type, target type)
#[derive(Clone, Default)]
pub struct ConverterRegistry {
    converters: HashMap<(TypeKey, TypeKey), Converter>,
}

impl ConverterRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry holding the built-in conversions
    ///
    /// - every built-in scalar to `String` through `Display`
    /// - `String` to every built-in scalar through `FromStr` (used to coerce default
    ///   literals)
    /// - lossless numeric widenings through `From`
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        register_defaults(&mut registry);
        registry
    }

    /// Register an infallible conversion from `S` to `T`, replacing any previous one
    pub fn register<S, T>(&mut self, convert: impl Fn(&S) -> T + Send + Sync + 'static) -> &mut Self
    where
        S: Scalar,
        T: Scalar,
    {
        self.register_fallible::<S, T, std::convert::Infallible>(move |value| Ok(convert(value)))
    }

    /// Register a conversion from `S` to `T` that may reject its input
    pub fn register_fallible<S, T, E>(
        &mut self,
        convert: impl Fn(&S) -> std::result::Result<T, E> + Send + Sync + 'static,
    ) -> &mut Self
    where
        S: Scalar,
        T: Scalar,
        E: fmt::Display,
    {
        let source = TypeKey::of::<S>();
        let target = TypeKey::of::<T>();
        let convert: Arc<ConvertFn> = Arc::new(move |value: &dyn Scalar| {
            let Some(value) = Scalar::as_any(value).downcast_ref::<S>() else {
                return Err(format!("expected a value of type {source}"));
            };
            convert(value)
                .map(|converted| Box::new(converted) as Box<dyn Scalar>)
                .map_err(|error| error.to_string())
        });

        tracing::trace!(%source, %target, "Registering converter");
        self.converters.insert(
            (source, target),
            Converter {
                source,
                target,
                convert,
            },
        );
        self
    }

    /// Add every converter of `other`, replacing converters registered for the same pair
    pub fn merge(&mut self, other: &Self) -> &mut Self {
        self.converters.extend(
            other
                .converters
                .iter()
                .map(|(pair, converter)| (*pair, converter.clone())),
        );
        self
    }

    /// Converter for the pair, if one is registered
    pub fn get(&self, source: TypeKey, target: TypeKey) -> Option<&Converter> {
        self.converters.get(&(source, target))
    }

    /// Whether a converter is registered for the pair
    pub fn contains(&self, source: TypeKey, target: TypeKey) -> bool {
        self.converters.contains_key(&(source, target))
    }

    /// Number of registered converters
    pub fn len(&self) -> usize {
        self.converters.len()
    }

    /// Whether no converters are registered
    pub fn is_empty(&self) -> bool {
        self.converters.is_empty()
    }
}

macro_rules! display_and_parse {
    ($registry:ident; $($ty:ty),+ $(,)?) => {
        $(
            $registry.register::<$ty, String>(<$ty as ToString>::to_string);
            $registry.register_fallible::<String, $ty, _>(|text: &String| text.parse::<$ty>());
        )+
    };
}

macro_rules! widen {
    ($registry:ident; $from:ty => $($to:ty),+ $(,)?) => {
        $($registry.register::<$from, $to>(|value: &$from| <$to>::from(*value));)+
    };
}

fn register_defaults(registry: &mut ConverterRegistry) {
    display_and_parse!(
        registry;
        bool,
        char,
        i8,
        i16,
        i32,
        i64,
        i128,
        isize,
        u8,
        u16,
        u32,
        u64,
        u128,
        usize,
        f32,
        f64,
        chrono::NaiveDate,
        chrono::NaiveTime,
        chrono::NaiveDateTime,
    );

    widen!(registry; i8 => i16, i32, i64, i128, f32, f64);
    widen!(registry; i16 => i32, i64, i128, f32, f64);
    widen!(registry; i32 => i64, i128, f64);
    widen!(registry; i64 => i128);
    widen!(registry; u8 => u16, u32, u64, u128, i16, i32, i64, i128, f32, f64);
    widen!(registry; u16 => u32, u64, u128, i32, i64, i128, f32, f64);
    widen!(registry; u32 => u64, u128, i64, i128, f64);
    widen!(registry; u64 => u128, i128);
    widen!(registry; f32 => f64);

    tracing::debug!(count = registry.len(), "Registered default converters");
}

impl fmt::Debug for ConverterRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.converters.values()).finish()
    }
}
