use error_stack::Report;
use thiserror::Error;

use crate::bean::TypeKey;

// Error message prefixes
const MSG_CANNOT_PREFIX: &str = "Cannot";
const MSG_INVALID_PREFIX: &str = "Invalid";

/// Result type for the `beanmapper` library
pub type Result<T> = std::result::Result<T, Report<Error>>;

/// Failures that abort a mapping call.
///
/// Unmatched or unconvertible properties are not errors; they are skipped silently.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// A target type (top-level or nested intermediate) could not be constructed.
    #[error("Cannot instantiate {type_name}: no default constructor")]
    Instantiation {
        /// Name of the type that has no constructor
        type_name: String,
    },

    /// A registered converter rejected its input.
    #[error("Conversion from {source_type} to {target_type} failed: {reason}")]
    Conversion {
        /// Name of the value's type
        source_type: String,
        /// Name of the requested type
        target_type: String,
        /// Message produced by the converter
        reason:      String,
    },

    /// The object graph is deeper than the configured limit.
    #[error("Recursion limit of {limit} exceeded while mapping into {type_name}")]
    RecursionLimit {
        /// Configured maximum depth
        limit:     usize,
        /// Bean type that would have been entered
        type_name: String,
    },

    /// Settings or declarative metadata could not be interpreted.
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl Error {
    /// Create an instantiation failure for the named type
    pub fn instantiation(type_name: impl Into<String>) -> Self {
        Self::Instantiation {
            type_name: type_name.into(),
        }
    }

    /// Create a conversion failure between two scalar types
    pub fn conversion(source: TypeKey, target: TypeKey, reason: impl std::fmt::Display) -> Self {
        Self::Conversion {
            source_type: source.name().to_string(),
            target_type: target.name().to_string(),
            reason:      reason.to_string(),
        }
    }

    /// Create a recursion limit failure
    pub fn recursion_limit(limit: usize, type_name: impl Into<String>) -> Self {
        Self::RecursionLimit {
            limit,
            type_name: type_name.into(),
        }
    }

    /// Create a "Cannot X" configuration error
    pub fn cannot(action: &str, reason: impl std::fmt::Display) -> Self {
        Self::Configuration(format!("{MSG_CANNOT_PREFIX} {action}: {reason}"))
    }

    /// Create an "Invalid X" configuration error
    pub fn invalid(what: &str, details: impl std::fmt::Display) -> Self {
        Self::Configuration(format!("{MSG_INVALID_PREFIX} {what}: {details}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_types_involved() {
        let error = Error::conversion(
            TypeKey::of::<String>(),
            TypeKey::of::<i32>(),
            "invalid digit found in string",
        );
        assert_eq!(
            error.to_string(),
            "Conversion from alloc::string::String to i32 failed: invalid digit found in string"
        );

        let error = Error::instantiation("Person");
        assert_eq!(
            error.to_string(),
            "Cannot instantiate Person: no default constructor"
        );
    }

    #[test]
    fn configuration_helpers_use_prefixes() {
        assert_eq!(
            Error::invalid("settings", "expected a number").to_string(),
            "Configuration error: Invalid settings: expected a number"
        );
        assert_eq!(
            Error::cannot("parse settings", "eof").to_string(),
            "Configuration error: Cannot parse settings: eof"
        );
    }
}
