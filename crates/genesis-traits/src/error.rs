//! Trait system errors.

use thiserror::Error;

/// Errors raised by trait definitions, trait handlers and trait fields.
#[derive(Debug, Error)]
pub enum TraitError {
    /// A mandatory field is missing from a trait definition
    #[error("Trait '{trait_type}' requires field '{field}'")]
    Validation {
        /// Trait type being validated
        trait_type: String,
        /// Missing field
        field: String,
    },

    /// No trait type registered under this name
    #[error("Unknown trait type: {0}")]
    UnknownTraitType(String),

    /// Trait definition is not a field mapping
    #[error("Invalid trait definition: {0}")]
    InvalidInput(String),

    /// Misuse of the trait handler
    #[error("Trait handler: {0}")]
    Management(String),

    /// Field is neither stored nor declared
    #[error("Trait has no field '{0}'")]
    FieldNotFound(String),

    /// Undeclared field on a trait type without extra properties
    #[error("Trait type '{trait_type}' does not accept extra field '{field}'")]
    ExtraNotAllowed {
        /// Trait type
        trait_type: String,
        /// Rejected field
        field: String,
    },

    /// Field may not be changed or deleted
    #[error("Field '{0}' is read-only")]
    ReadOnlyField(String),

    /// Stored value has the wrong shape for the accessor
    #[error("Field '{field}' holds an invalid value: {value}")]
    InvalidValue {
        /// Field name
        field: String,
        /// Offending value
        value: String,
    },

    /// Stored data could not be interpreted as trait records
    #[error("Corrupt trait record '{key}': {reason}")]
    CorruptRecord {
        /// Trait key (or the attribute key for the whole mapping)
        key: String,
        /// What was wrong with it
        reason: String,
    },
}

impl TraitError {
    /// Returns true for errors caused by a bad trait definition.
    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::Validation { .. } | Self::UnknownTraitType(_) | Self::InvalidInput(_)
        )
    }

    /// Returns true for errors caused by misusing the handler.
    #[must_use]
    pub fn is_management(&self) -> bool {
        matches!(self, Self::Management(_))
    }
}

/// Result type for trait operations.
pub type TraitResult<T> = Result<T, TraitError>;
