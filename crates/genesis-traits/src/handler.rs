//! Per-entity trait handler.
//!
//! All traits of an entity live in one attribute of the entity's
//! [`AttributeStore`]: a mapping from trait key to trait record. The handler
//! reads that mapping on demand, wraps records in [`Trait`]s as they are
//! requested and writes every change straight back. The store stays the single
//! source of truth; the handler only memoizes the wrappers and checks them
//! against the stored record on every lookup.
//!
//! Mutations go through [`AttributeStore::update`], so the read-modify-write
//! of the mapping is one step for stores that lock.

use crate::config::TraitHandlerConfig;
use crate::error::{TraitError, TraitResult};
use crate::kind::TraitRegistry;
use crate::schema::{TraitData, TYPE_FIELD};
use crate::traits::Trait;
use ahash::AHashMap;
use genesis_common::AttributeStore;
use serde_json::Value;
use std::ops::Deref;
use std::sync::Arc;
use tracing::{debug, warn};

/// Manages the traits of one entity.
pub struct TraitHandler<S: AttributeStore> {
    store: Arc<S>,
    config: TraitHandlerConfig,
    registry: TraitRegistry,
    cache: AHashMap<String, Trait>,
}

impl<S: AttributeStore> std::fmt::Debug for TraitHandler<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TraitHandler")
            .field("owner", &self.store.owner())
            .field("config", &self.config)
            .field("cached", &self.cache.len())
            .finish_non_exhaustive()
    }
}

impl<S: AttributeStore> TraitHandler<S> {
    /// Creates a handler with the default configuration.
    #[must_use]
    pub fn new(store: Arc<S>) -> Self {
        Self::with_config(store, TraitHandlerConfig::default())
    }

    /// Creates a handler; trait types come from the configuration.
    #[must_use]
    pub fn with_config(store: Arc<S>, config: TraitHandlerConfig) -> Self {
        let registry = config.registry();
        Self::with_registry(store, config, registry)
    }

    /// Creates a handler with an explicit registry.
    #[must_use]
    pub fn with_registry(
        store: Arc<S>,
        config: TraitHandlerConfig,
        registry: TraitRegistry,
    ) -> Self {
        Self {
            store,
            config,
            registry,
            cache: AHashMap::new(),
        }
    }

    /// The backing attribute store.
    #[must_use]
    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Handler configuration.
    #[must_use]
    pub fn config(&self) -> &TraitHandlerConfig {
        &self.config
    }

    /// Registered trait types.
    #[must_use]
    pub fn registry(&self) -> &TraitRegistry {
        &self.registry
    }

    /// Number of stored traits.
    #[must_use]
    pub fn len(&self) -> usize {
        self.stored_lossy().len()
    }

    /// Returns true if no traits are stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Keys of all stored traits, in the order they were added.
    #[must_use]
    pub fn all(&self) -> Vec<String> {
        self.stored_lossy().keys().cloned().collect()
    }

    /// Returns true if a trait is stored under `key`.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.stored_lossy().contains_key(key)
    }

    /// Validates a trait definition and stores it under `key`.
    ///
    /// `fields` must be an object holding at least `name` and `trait_type`.
    /// An existing trait with the same key is replaced.
    pub fn add(&mut self, key: &str, fields: Value) -> TraitResult<()> {
        self.insert(key, fields, true)
    }

    /// Like [`TraitHandler::add`], but fails if `key` is already taken.
    pub fn add_unique(&mut self, key: &str, fields: Value) -> TraitResult<()> {
        self.insert(key, fields, false)
    }

    /// Returns the trait stored under `key`, or `None` if there is none.
    pub fn get(&mut self, key: &str) -> TraitResult<Option<&Trait>> {
        if !self.ensure_cached(key)? {
            return Ok(None);
        }
        Ok(self.cache.get(key))
    }

    /// Returns a guard for modifying the trait stored under `key`.
    /// Every change made through the guard is written to the store at once.
    pub fn get_mut(&mut self, key: &str) -> TraitResult<Option<TraitMut<'_, S>>> {
        if !self.ensure_cached(key)? {
            return Ok(None);
        }
        let Self {
            ref store,
            ref config,
            ref mut cache,
            ..
        } = *self;
        Ok(cache.get_mut(key).map(move |entry| TraitMut {
            entry,
            store: &**store,
            config,
        }))
    }

    /// Deletes the trait stored under `key`.
    pub fn remove(&mut self, key: &str) -> TraitResult<()> {
        let removed = modify_traits(&*self.store, &self.config, |traits| {
            match traits.shift_remove(key) {
                Some(_) => Ok(()),
                None => Err(TraitError::Management(format!(
                    "trait '{key}' not found, nothing to remove"
                ))),
            }
        });
        self.cache.remove(key);
        removed?;
        debug!("Removed trait '{key}' from entity {}", self.store.owner());
        Ok(())
    }

    /// Deletes every trait.
    pub fn clear(&mut self) {
        self.store.add(
            &self.config.db_attribute_key,
            Value::Object(TraitData::new()),
            &self.config.category,
        );
        self.cache.clear();
        debug!("Cleared traits of entity {}", self.store.owner());
    }

    /// Traits cannot be assigned through the handler; this always fails.
    /// Use [`TraitHandler::add`] or modify a trait via [`TraitHandler::get_mut`].
    pub fn set(&self, key: &str, _value: Value) -> TraitResult<()> {
        Err(TraitError::Management(format!(
            "cannot assign '{key}' on the trait handler, use add() or change the trait itself"
        )))
    }

    fn insert(&mut self, key: &str, fields: Value, replace: bool) -> TraitResult<()> {
        if key.trim().is_empty() {
            return Err(TraitError::Management("trait key cannot be empty".to_owned()));
        }
        let fields = match fields {
            Value::Object(fields) => fields,
            other => {
                return Err(TraitError::InvalidInput(format!(
                    "trait '{key}' must be defined by an object, got {other}"
                )))
            },
        };

        let type_name = match fields.get(TYPE_FIELD) {
            Some(Value::String(name)) => name.as_str(),
            Some(other) => {
                return Err(TraitError::InvalidInput(format!(
                    "trait_type must be a string, got {other}"
                )))
            },
            None => {
                return Err(TraitError::Validation {
                    trait_type: "<untyped>".to_owned(),
                    field: TYPE_FIELD.to_owned(),
                })
            },
        };
        let trait_type = self.registry.resolve(type_name)?;
        let validated = Trait::validate_input(&trait_type, &fields)?;
        let dropped = fields
            .keys()
            .filter(|field| !validated.contains_key(*field))
            .count();
        if dropped > 0 {
            warn!("Trait '{key}': dropped {dropped} extra field(s) not accepted by '{type_name}'");
        }

        let owner = self.store.owner();
        modify_traits(&*self.store, &self.config, |traits| {
            if traits.contains_key(key) {
                if !replace {
                    return Err(TraitError::Management(format!(
                        "trait '{key}' already exists"
                    )));
                }
                warn!("Replacing trait '{key}' on entity {owner}");
            }
            traits.insert(key.to_owned(), Value::Object(validated));
            Ok(())
        })?;
        self.cache.remove(key);

        debug!(
            "Added {type_name} trait '{key}' to entity {}",
            self.store.owner()
        );
        Ok(())
    }

    /// Brings the cache entry for `key` in line with the store.
    /// Returns false if nothing is stored.
    fn ensure_cached(&mut self, key: &str) -> TraitResult<bool> {
        let stored = match read_traits(&*self.store, &self.config) {
            Ok(mut traits) => traits.shift_remove(key),
            Err(e) => {
                self.cache.remove(key);
                return Err(e);
            },
        };
        let Some(record) = stored else {
            if self.cache.remove(key).is_some() {
                debug!("Evicted trait '{key}' of entity {}, no longer stored", self.store.owner());
            }
            return Ok(false);
        };
        let unchanged = self
            .cache
            .get(key)
            .is_some_and(|cached| record.as_object() == Some(cached.data()));
        if unchanged {
            return Ok(true);
        }

        match self.load(key, record) {
            Ok(loaded) => {
                debug!("Cached trait '{key}' of entity {}", self.store.owner());
                self.cache.insert(key.to_owned(), loaded);
                Ok(true)
            },
            Err(e) => {
                self.cache.remove(key);
                Err(e)
            },
        }
    }

    /// Wraps a stored record in its registered type.
    fn load(&self, key: &str, record: Value) -> TraitResult<Trait> {
        let Value::Object(record) = record else {
            return Err(TraitError::CorruptRecord {
                key: key.to_owned(),
                reason: "record is not an object".to_owned(),
            });
        };
        let Some(type_name) = record.get(TYPE_FIELD).and_then(Value::as_str) else {
            return Err(TraitError::CorruptRecord {
                key: key.to_owned(),
                reason: "record has no trait_type".to_owned(),
            });
        };
        let trait_type = self.registry.resolve(type_name)?;
        Trait::from_record(key, trait_type, record)
    }

    /// Stored mapping for read-only queries; unreadable data counts as empty.
    fn stored_lossy(&self) -> TraitData {
        read_traits(&*self.store, &self.config).unwrap_or_else(|e| {
            warn!("Ignoring unreadable traits of entity {}: {e}", self.store.owner());
            TraitData::new()
        })
    }
}

/// Mutable access to a cached trait; changes are persisted immediately.
pub struct TraitMut<'a, S: AttributeStore> {
    entry: &'a mut Trait,
    store: &'a S,
    config: &'a TraitHandlerConfig,
}

impl<S: AttributeStore> TraitMut<'_, S> {
    /// Writes a field. See [`Trait::set`].
    pub fn set(&mut self, field: &str, value: Value) -> TraitResult<()> {
        self.update(|t| t.set(field, value))
    }

    /// Deletes a field. See [`Trait::delete`].
    pub fn delete(&mut self, field: &str) -> TraitResult<()> {
        self.update(|t| t.delete(field))
    }

    /// Applies `change` to the trait and persists the result.
    ///
    /// `change` runs on the record as currently stored, inside one
    /// [`AttributeStore::update`], so fields written by others in the
    /// meantime are kept. If `change` fails nothing is written and the trait
    /// is left as it was. `change` must not touch the same store.
    pub fn update<R>(
        &mut self,
        change: impl FnOnce(&mut Trait) -> TraitResult<R>,
    ) -> TraitResult<R> {
        let key = self.entry.key().to_owned();
        let trait_type = Arc::clone(self.entry.type_handle());
        let mut working = None;
        let result = modify_traits(self.store, self.config, |traits| {
            let record = match traits.get(&key) {
                Some(Value::Object(record)) => record.clone(),
                Some(_) => {
                    return Err(TraitError::CorruptRecord {
                        key: key.clone(),
                        reason: "record is not an object".to_owned(),
                    })
                },
                None => {
                    return Err(TraitError::Management(format!(
                        "trait '{key}' is no longer stored"
                    )))
                },
            };
            if record.get(TYPE_FIELD).and_then(Value::as_str) != Some(trait_type.name()) {
                return Err(TraitError::Management(format!(
                    "trait '{key}' was replaced in storage, fetch it again"
                )));
            }

            let mut fresh = Trait::from_record(key.as_str(), Arc::clone(&trait_type), record)?;
            let result = change(&mut fresh)?;
            traits.insert(key.clone(), Value::Object(fresh.data().clone()));
            working = Some(fresh);
            Ok(result)
        })?;
        if let Some(fresh) = working {
            *self.entry = fresh;
        }
        Ok(result)
    }
}

impl<S: AttributeStore> Deref for TraitMut<'_, S> {
    type Target = Trait;

    fn deref(&self) -> &Trait {
        &*self.entry
    }
}

fn read_traits<S: AttributeStore + ?Sized>(
    store: &S,
    config: &TraitHandlerConfig,
) -> TraitResult<TraitData> {
    match store.get(&config.db_attribute_key, &config.category) {
        None | Some(Value::Null) => Ok(TraitData::new()),
        Some(Value::Object(traits)) => Ok(traits),
        Some(other) => Err(TraitError::CorruptRecord {
            key: config.db_attribute_key.clone(),
            reason: format!("expected a mapping of traits, found {other}"),
        }),
    }
}

/// Runs `change` on the stored mapping in a single store update.
/// Nothing is written when `change` fails.
fn modify_traits<S: AttributeStore + ?Sized, R>(
    store: &S,
    config: &TraitHandlerConfig,
    change: impl FnOnce(&mut TraitData) -> TraitResult<R>,
) -> TraitResult<R> {
    let mut change = Some(change);
    let mut outcome = None;
    store.update(&config.db_attribute_key, &config.category, &mut |stored| {
        let Some(change) = change.take() else {
            return;
        };
        let mut traits = match stored {
            Value::Null => TraitData::new(),
            Value::Object(traits) => traits.clone(),
            other => {
                outcome = Some(Err(TraitError::CorruptRecord {
                    key: config.db_attribute_key.clone(),
                    reason: format!("expected a mapping of traits, found {other}"),
                }));
                return;
            },
        };
        let result = change(&mut traits);
        if result.is_ok() {
            *stored = Value::Object(traits);
        }
        outcome = Some(result);
    });
    outcome.unwrap_or_else(|| {
        Err(TraitError::Management(
            "attribute store did not apply the update".to_owned(),
        ))
    })
}
