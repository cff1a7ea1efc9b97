//! Trait handler configuration.
//!
//! Controls where a handler keeps its records and which trait types exist
//! besides the built-ins. Loaded from TOML:
//!
//! ```toml
//! db_attribute_key = "traits"
//! category = "traits"
//!
//! [[trait_types]]
//! trait_type = "resource"
//! behaves_as = "gauge"
//! mandatory = ["owner"]
//!
//! [trait_types.fields]
//! regen = 1
//! ```

use crate::kind::{TraitKind, TraitRegistry, TraitType};
use genesis_common::GenesisResult;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fs;
use std::path::Path;
use tracing::{info, warn};

/// Default attribute key holding all traits of an entity.
pub const DEFAULT_DB_ATTRIBUTE_KEY: &str = "traits";

/// Default attribute category.
pub const DEFAULT_CATEGORY: &str = "traits";

/// A trait type declared in configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomTraitType {
    /// Value of the `trait_type` field
    pub trait_type: String,
    /// Built-in kind whose fields and computed values this type uses
    pub behaves_as: TraitKind,
    /// Whether undeclared fields are kept
    #[serde(default = "default_true")]
    pub allow_extra_properties: bool,
    /// Additional mandatory fields
    #[serde(default)]
    pub mandatory: Vec<String>,
    /// Additional optional fields and their defaults
    #[serde(default)]
    pub fields: Map<String, Value>,
}

fn default_true() -> bool {
    true
}

impl CustomTraitType {
    /// Builds the registry entry for this type.
    #[must_use]
    pub fn to_trait_type(&self) -> TraitType {
        let mut schema = self
            .behaves_as
            .schema()
            .allow_extra_properties(self.allow_extra_properties);
        for (field, default) in &self.fields {
            schema = schema.with_optional(field.clone(), default.clone());
        }
        for field in &self.mandatory {
            schema = schema.with_mandatory(field.clone());
        }
        TraitType::new(self.trait_type.clone(), self.behaves_as, schema)
    }
}

/// Settings for a [`TraitHandler`](crate::TraitHandler).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TraitHandlerConfig {
    /// Attribute key the trait mapping is stored under
    pub db_attribute_key: String,
    /// Attribute category
    pub category: String,
    /// Extra trait types registered on top of the built-ins
    pub trait_types: Vec<CustomTraitType>,
}

impl Default for TraitHandlerConfig {
    fn default() -> Self {
        Self {
            db_attribute_key: DEFAULT_DB_ATTRIBUTE_KEY.to_owned(),
            category: DEFAULT_CATEGORY.to_owned(),
            trait_types: Vec::new(),
        }
    }
}

impl TraitHandlerConfig {
    /// Parses configuration from TOML text.
    pub fn from_toml_str(contents: &str) -> GenesisResult<Self> {
        let mut config: Self = toml::from_str(contents)?;
        config.validate();
        Ok(config)
    }

    /// Loads configuration from a file.
    /// Returns defaults if the file doesn't exist or is invalid.
    pub fn load_from<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();

        if !path.exists() {
            info!("Trait config not found at {}, using defaults", path.display());
            return Self::default();
        }

        let contents = match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) => {
                warn!("Failed to read trait config: {e}");
                return Self::default();
            },
        };

        match Self::from_toml_str(&contents) {
            Ok(config) => {
                info!("Loaded trait config from {}", path.display());
                config
            },
            Err(e) => {
                warn!("Failed to parse trait config: {e}");
                Self::default()
            },
        }
    }

    /// Saves configuration to a file.
    pub fn save_to<P: AsRef<Path>>(&self, path: P) -> GenesisResult<()> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)?;
        fs::write(path, contents)?;

        info!("Saved trait config to {}", path.display());
        Ok(())
    }

    /// Restores blank keys to their defaults.
    pub fn validate(&mut self) {
        if self.db_attribute_key.trim().is_empty() {
            warn!("Empty db_attribute_key, using '{DEFAULT_DB_ATTRIBUTE_KEY}'");
            self.db_attribute_key = DEFAULT_DB_ATTRIBUTE_KEY.to_owned();
        }
        if self.category.trim().is_empty() {
            warn!("Empty category, using '{DEFAULT_CATEGORY}'");
            self.category = DEFAULT_CATEGORY.to_owned();
        }
        self.trait_types.retain(|custom| {
            let keep = !custom.trait_type.trim().is_empty();
            if !keep {
                warn!("Dropping custom trait type with empty name");
            }
            keep
        });
    }

    /// Built-in types plus the configured custom types.
    #[must_use]
    pub fn registry(&self) -> TraitRegistry {
        let mut registry = TraitRegistry::new();
        for custom in &self.trait_types {
            registry.register(custom.to_trait_type());
        }
        registry
    }
}
