//! Trait kinds and the registry of trait types.

use crate::error::{TraitError, TraitResult};
use crate::schema::{FieldDefault, TraitSchema};
use ahash::AHashMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use tracing::debug;

/// Field holding the free-form value of a plain trait.
pub const VALUE_FIELD: &str = "value";
/// Base value of numeric traits.
pub const BASE_FIELD: &str = "base";
/// Modifier added on top of `base`.
pub const MOD_FIELD: &str = "mod";
/// Current value of counters and gauges.
pub const CURRENT_FIELD: &str = "current";
/// Lower bound, `null` for unbounded.
pub const MIN_FIELD: &str = "min_value";
/// Upper bound, `null` for unbounded.
pub const MAX_FIELD: &str = "max_value";

/// Behaviour family of a trait type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TraitKind {
    /// Free-form `value`
    Trait,
    /// Single `base` number
    Numeric,
    /// `base` plus `mod`
    Static,
    /// Bounded counter
    Counter,
    /// Bounded gauge that can be refilled
    Gauge,
}

impl TraitKind {
    /// All built-in kinds.
    pub const ALL: [Self; 5] = [
        Self::Trait,
        Self::Numeric,
        Self::Static,
        Self::Counter,
        Self::Gauge,
    ];

    /// Name used in the `trait_type` field.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Trait => "trait",
            Self::Numeric => "numeric",
            Self::Static => "static",
            Self::Counter => "counter",
            Self::Gauge => "gauge",
        }
    }

    /// Whether `base` is declared.
    #[must_use]
    pub const fn is_numeric(self) -> bool {
        !matches!(self, Self::Trait)
    }

    /// Whether `mod` is declared.
    #[must_use]
    pub const fn has_mod(self) -> bool {
        matches!(self, Self::Static | Self::Counter | Self::Gauge)
    }

    /// Whether `current`, `min_value` and `max_value` are declared.
    #[must_use]
    pub const fn is_bounded(self) -> bool {
        matches!(self, Self::Counter | Self::Gauge)
    }

    /// Field schema for this kind.
    #[must_use]
    pub fn schema(self) -> TraitSchema {
        let schema = TraitSchema::new();
        match self {
            Self::Trait => schema.with_field(VALUE_FIELD, FieldDefault::null()),
            Self::Numeric => schema.with_field(BASE_FIELD, FieldDefault::int(0)),
            Self::Static => schema
                .with_field(BASE_FIELD, FieldDefault::int(0))
                .with_field(MOD_FIELD, FieldDefault::int(0)),
            Self::Counter | Self::Gauge => schema
                .with_field(BASE_FIELD, FieldDefault::int(0))
                .with_field(MOD_FIELD, FieldDefault::int(0))
                .with_field(CURRENT_FIELD, FieldDefault::int(0))
                .with_field(MAX_FIELD, FieldDefault::null())
                .with_field(MIN_FIELD, FieldDefault::null()),
        }
    }
}

impl fmt::Display for TraitKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TraitKind {
    type Err = TraitError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| TraitError::UnknownTraitType(s.to_owned()))
    }
}

/// A registered trait type: its name, behaviour and field schema.
#[derive(Debug, Clone, PartialEq)]
pub struct TraitType {
    name: String,
    kind: TraitKind,
    schema: TraitSchema,
}

impl TraitType {
    /// Creates a trait type.
    #[must_use]
    pub fn new(name: impl Into<String>, kind: TraitKind, schema: TraitSchema) -> Self {
        Self {
            name: name.into(),
            kind,
            schema,
        }
    }

    /// The built-in type for a kind.
    #[must_use]
    pub fn builtin(kind: TraitKind) -> Self {
        Self::new(kind.as_str(), kind, kind.schema())
    }

    /// Value of the `trait_type` field.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Behaviour family.
    #[must_use]
    pub const fn kind(&self) -> TraitKind {
        self.kind
    }

    /// Field schema.
    #[must_use]
    pub const fn schema(&self) -> &TraitSchema {
        &self.schema
    }
}

/// Lookup table from `trait_type` name to trait type.
#[derive(Debug, Clone)]
pub struct TraitRegistry {
    types: AHashMap<String, Arc<TraitType>>,
}

impl Default for TraitRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl TraitRegistry {
    /// Creates a registry holding the built-in types.
    #[must_use]
    pub fn new() -> Self {
        let mut registry = Self::empty();
        for kind in TraitKind::ALL {
            registry.register(TraitType::builtin(kind));
        }
        registry
    }

    /// Creates a registry with no types at all.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            types: AHashMap::new(),
        }
    }

    /// Registers a type, replacing any type of the same name.
    pub fn register(&mut self, trait_type: TraitType) {
        debug!(
            "Registering trait type '{}' ({})",
            trait_type.name(),
            trait_type.kind()
        );
        self.types
            .insert(trait_type.name().to_owned(), Arc::new(trait_type));
    }

    /// Looks up a type by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<Arc<TraitType>> {
        self.types.get(name).cloned()
    }

    /// Looks up a type by name, failing for unknown names.
    pub fn resolve(&self, name: &str) -> TraitResult<Arc<TraitType>> {
        self.get(name)
            .ok_or_else(|| TraitError::UnknownTraitType(name.to_owned()))
    }

    /// Number of registered types.
    #[must_use]
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Returns true if nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}
