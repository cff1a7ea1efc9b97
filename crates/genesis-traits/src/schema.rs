//! Field schemas for trait types.
//!
//! A schema lists the fields a trait type declares, which of them are
//! mandatory and what the optional ones default to. Validation runs in a
//! fixed order: mandatory check, default filling, extras filtering.

use crate::error::{TraitError, TraitResult};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A trait record: field name to value.
pub type TraitData = Map<String, Value>;

/// Display label field, mandatory on every trait.
pub const NAME_FIELD: &str = "name";

/// Type discriminator field, mandatory on every trait.
pub const TYPE_FIELD: &str = "trait_type";

/// Default of a declared field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FieldDefault {
    /// Field must be supplied.
    Mandatory,
    /// Field falls back to this value.
    Value(Value),
}

impl FieldDefault {
    /// Optional field defaulting to `null`.
    #[must_use]
    pub const fn null() -> Self {
        Self::Value(Value::Null)
    }

    /// Optional field defaulting to an integer.
    #[must_use]
    pub fn int(value: i64) -> Self {
        Self::Value(Value::from(value))
    }
}

/// A declared field.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldSpec {
    /// Field name
    pub name: String,
    /// Default or mandatory marker
    pub default: FieldDefault,
}

/// Declared fields of a trait type.
#[derive(Debug, Clone, PartialEq)]
pub struct TraitSchema {
    fields: Vec<FieldSpec>,
    allow_extra_properties: bool,
}

impl Default for TraitSchema {
    fn default() -> Self {
        Self::new()
    }
}

impl TraitSchema {
    /// Creates a schema declaring only `name` and `trait_type`.
    /// Extra properties are allowed.
    #[must_use]
    pub fn new() -> Self {
        Self {
            fields: vec![
                FieldSpec {
                    name: NAME_FIELD.to_owned(),
                    default: FieldDefault::Mandatory,
                },
                FieldSpec {
                    name: TYPE_FIELD.to_owned(),
                    default: FieldDefault::Mandatory,
                },
            ],
            allow_extra_properties: true,
        }
    }

    /// Declares a field, replacing an earlier declaration of the same name.
    #[must_use]
    pub fn with_field(mut self, name: impl Into<String>, default: FieldDefault) -> Self {
        let name = name.into();
        if let Some(spec) = self.fields.iter_mut().find(|spec| spec.name == name) {
            // name and trait_type stay mandatory
            if spec.name != NAME_FIELD && spec.name != TYPE_FIELD {
                spec.default = default;
            }
        } else {
            self.fields.push(FieldSpec { name, default });
        }
        self
    }

    /// Declares a mandatory field.
    #[must_use]
    pub fn with_mandatory(self, name: impl Into<String>) -> Self {
        self.with_field(name, FieldDefault::Mandatory)
    }

    /// Declares an optional field with a default.
    #[must_use]
    pub fn with_optional(self, name: impl Into<String>, default: Value) -> Self {
        self.with_field(name, FieldDefault::Value(default))
    }

    /// Sets whether undeclared fields survive validation.
    #[must_use]
    pub fn allow_extra_properties(mut self, allow: bool) -> Self {
        self.allow_extra_properties = allow;
        self
    }

    /// Returns whether undeclared fields are kept.
    #[must_use]
    pub const fn allows_extra_properties(&self) -> bool {
        self.allow_extra_properties
    }

    /// Iterates declared fields in declaration order.
    pub fn fields(&self) -> impl Iterator<Item = &FieldSpec> + '_ {
        self.fields.iter()
    }

    /// Looks up a declared field.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|spec| spec.name == name)
    }

    /// Returns true if the field is declared.
    #[must_use]
    pub fn is_declared(&self, name: &str) -> bool {
        self.field(name).is_some()
    }

    /// Returns true if the field is declared mandatory.
    #[must_use]
    pub fn is_mandatory(&self, name: &str) -> bool {
        matches!(
            self.field(name),
            Some(FieldSpec {
                default: FieldDefault::Mandatory,
                ..
            })
        )
    }

    /// Default value of an optional declared field.
    #[must_use]
    pub fn default_for(&self, name: &str) -> Option<&Value> {
        match self.field(name) {
            Some(FieldSpec {
                default: FieldDefault::Value(value),
                ..
            }) => Some(value),
            _ => None,
        }
    }

    /// Checks a candidate record against this schema.
    ///
    /// Returns a new record with declared fields first (missing optional ones
    /// filled with their defaults) followed by extra fields, which are dropped
    /// when the schema does not allow them. The input is never modified.
    pub fn validate_input(&self, data: &TraitData) -> TraitResult<TraitData> {
        let mut validated = TraitData::new();

        for spec in &self.fields {
            match (data.get(&spec.name), &spec.default) {
                (Some(value), _) => {
                    validated.insert(spec.name.clone(), value.clone());
                },
                (None, FieldDefault::Value(default)) => {
                    validated.insert(spec.name.clone(), default.clone());
                },
                (None, FieldDefault::Mandatory) => {
                    return Err(TraitError::Validation {
                        trait_type: data
                            .get(TYPE_FIELD)
                            .and_then(Value::as_str)
                            .unwrap_or("<untyped>")
                            .to_owned(),
                        field: spec.name.clone(),
                    });
                },
            }
        }

        if self.allow_extra_properties {
            for (key, value) in data {
                if !self.is_declared(key) {
                    validated.insert(key.clone(), value.clone());
                }
            }
        }

        Ok(validated)
    }
}
