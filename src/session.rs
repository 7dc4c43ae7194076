//! Session collaborators: flash vs persistent key-value storage.
//!
//! `flash` data survives exactly one more request and is cleared after
//! that; `set` data persists until explicitly removed. Setting any key to
//! `Value::Null` removes it.

use serde_json::Value;
use std::collections::HashMap;

/// Store key under which flash data rides along in the backing store.
const FLASH_KEY: &str = "shunt.internal.flash";

/// Session contract consumed by handlers.
pub trait Session {
    /// Get data from the session. Lookup order: persistent values, then
    /// the previous request's flash data, then flash data written during
    /// the current request.
    fn get(&self, key: &str) -> Option<Value>;

    /// Get several keys at once; missing keys yield `Value::Null`.
    fn get_many(&self, keys: &[&str]) -> HashMap<String, Value>;

    /// Assign a value to a key. A `Value::Null` value clears the key.
    fn set(&mut self, key: &str, value: Value);

    /// Set multiple key-value pairs at once.
    fn set_many(&mut self, data: HashMap<String, Value>);

    /// Same as `set`, but the key survives only one more request.
    fn flash(&mut self, key: &str, value: Value);

    /// Same as `set_many`, for flash data.
    fn flash_many(&mut self, data: HashMap<String, Value>);
}

/// In-process session backed by a plain map, with explicit store
/// round-tripping: `from_store` splits out the previous request's flash
/// data, `into_store` persists values plus the flash written since.
#[derive(Debug, Default)]
pub struct MemorySession {
    values: HashMap<String, Value>,
    old_flash: HashMap<String, Value>,
    new_flash: HashMap<String, Value>,
}

impl MemorySession {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Rehydrate from a backing store produced by [`MemorySession::into_store`].
    #[must_use]
    pub fn from_store(mut store: HashMap<String, Value>) -> Self {
        let old_flash = match store.remove(FLASH_KEY) {
            Some(Value::Object(map)) => map.into_iter().collect(),
            _ => HashMap::new(),
        };
        Self {
            values: store,
            old_flash,
            new_flash: HashMap::new(),
        }
    }

    /// Persist back to the backing store. Flash written during this
    /// request survives into the next round-trip; the previous request's
    /// flash is dropped here.
    #[must_use]
    pub fn into_store(self) -> HashMap<String, Value> {
        let mut store = self.values;
        if !self.new_flash.is_empty() {
            store.insert(
                FLASH_KEY.to_string(),
                Value::Object(self.new_flash.into_iter().collect()),
            );
        }
        store
    }
}

fn set_many_to(target: &mut HashMap<String, Value>, data: HashMap<String, Value>) {
    for (key, value) in data {
        if value.is_null() {
            target.remove(&key);
        } else {
            target.insert(key, value);
        }
    }
}

impl Session for MemorySession {
    fn get(&self, key: &str) -> Option<Value> {
        [&self.values, &self.old_flash, &self.new_flash]
            .into_iter()
            .find_map(|source| source.get(key).cloned())
    }

    fn get_many(&self, keys: &[&str]) -> HashMap<String, Value> {
        keys.iter()
            .map(|&key| (key.to_string(), self.get(key).unwrap_or(Value::Null)))
            .collect()
    }

    fn set(&mut self, key: &str, value: Value) {
        set_many_to(&mut self.values, HashMap::from([(key.to_string(), value)]));
    }

    fn set_many(&mut self, data: HashMap<String, Value>) {
        set_many_to(&mut self.values, data);
    }

    fn flash(&mut self, key: &str, value: Value) {
        set_many_to(&mut self.new_flash, HashMap::from([(key.to_string(), value)]));
    }

    fn flash_many(&mut self, data: HashMap<String, Value>) {
        set_many_to(&mut self.new_flash, data);
    }
}
