//! Per-entity attribute storage.
//!
//! Attributes are JSON values addressed by `(key, category)`. Gameplay
//! subsystems never own the storage; they are handed an [`AttributeStore`]
//! belonging to an entity and read/write through it.

use crate::error::GenesisResult;
use crate::ids::EntityId;
use ahash::AHashMap;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

/// Storage contract for entity attributes.
///
/// Methods take `&self`: implementations are shared handles and guard their
/// own state.
pub trait AttributeStore: Send + Sync {
    /// The entity this store belongs to.
    fn owner(&self) -> EntityId;

    /// Returns the attribute stored under `key` in `category`, if any.
    fn get(&self, key: &str, category: &str) -> Option<Value>;

    /// Stores `value` under `key` in `category`, replacing any previous value.
    fn add(&self, key: &str, value: Value, category: &str);

    /// Removes the attribute, returning the previous value.
    fn remove(&self, key: &str, category: &str) -> Option<Value>;

    /// Applies `change` to the attribute in place.
    ///
    /// A missing attribute is presented as [`Value::Null`]; leaving it null
    /// stores nothing. The default reads and writes separately, so stores
    /// shared between writers should run the change under one lock.
    fn update(&self, key: &str, category: &str, change: &mut dyn FnMut(&mut Value)) {
        let mut value = self.get(key, category).unwrap_or(Value::Null);
        change(&mut value);
        if !value.is_null() {
            self.add(key, value, category);
        }
    }
}

/// Snapshot entry used when dumping a store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct AttributeEntry {
    key: String,
    category: String,
    value: Value,
}

/// In-memory attribute store for a single entity.
#[derive(Debug)]
pub struct MemoryAttributeStore {
    owner: EntityId,
    attributes: RwLock<AHashMap<(String, String), Value>>,
}

impl MemoryAttributeStore {
    /// Creates an empty store for the given entity.
    #[must_use]
    pub fn new(owner: EntityId) -> Self {
        Self {
            owner,
            attributes: RwLock::new(AHashMap::new()),
        }
    }

    /// Number of attributes across all categories.
    #[must_use]
    pub fn len(&self) -> usize {
        self.attributes.read().len()
    }

    /// Returns true if no attributes are stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.attributes.read().is_empty()
    }

    /// Serializes all attributes to a JSON string.
    pub fn to_json(&self) -> GenesisResult<String> {
        let attributes = self.attributes.read();
        let mut entries: Vec<AttributeEntry> = attributes
            .iter()
            .map(|((key, category), value)| AttributeEntry {
                key: key.clone(),
                category: category.clone(),
                value: value.clone(),
            })
            .collect();
        entries.sort_by(|a, b| (&a.category, &a.key).cmp(&(&b.category, &b.key)));
        Ok(serde_json::to_string(&entries)?)
    }

    /// Restores a store from [`MemoryAttributeStore::to_json`] output.
    pub fn from_json(owner: EntityId, json: &str) -> GenesisResult<Self> {
        let entries: Vec<AttributeEntry> = serde_json::from_str(json)?;
        let store = Self::new(owner);
        {
            let mut attributes = store.attributes.write();
            for entry in entries {
                attributes.insert((entry.key, entry.category), entry.value);
            }
        }
        debug!("Restored {} attributes for entity {owner}", store.len());
        Ok(store)
    }
}

impl AttributeStore for MemoryAttributeStore {
    fn owner(&self) -> EntityId {
        self.owner
    }

    fn get(&self, key: &str, category: &str) -> Option<Value> {
        self.attributes
            .read()
            .get(&(key.to_owned(), category.to_owned()))
            .cloned()
    }

    fn add(&self, key: &str, value: Value, category: &str) {
        self.attributes
            .write()
            .insert((key.to_owned(), category.to_owned()), value);
    }

    fn remove(&self, key: &str, category: &str) -> Option<Value> {
        self.attributes
            .write()
            .remove(&(key.to_owned(), category.to_owned()))
    }

    fn update(&self, key: &str, category: &str, change: &mut dyn FnMut(&mut Value)) {
        let slot = (key.to_owned(), category.to_owned());
        let mut attributes = self.attributes.write();
        let mut value = attributes.remove(&slot).unwrap_or(Value::Null);
        change(&mut value);
        if !value.is_null() {
            attributes.insert(slot, value);
        }
    }
}
