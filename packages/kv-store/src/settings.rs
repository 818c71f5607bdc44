use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::{Error, KeyValueStore};

/// A namespaced view of a [`KeyValueStore`] holding JSON values.
///
/// Keys are stored as `prefix:key`. Strings are stored as-is; any other
/// value is stored as its JSON text. Reading parses JSON and falls back to
/// the raw string when the stored text is not JSON.
pub struct SettingStore<'a, S: KeyValueStore + ?Sized> {
    store: &'a mut S,
    prefix: String,
}

impl<'a, S: KeyValueStore + ?Sized> SettingStore<'a, S> {
    pub fn new(store: &'a mut S, prefix: impl Into<String>) -> Self {
        Self {
            store,
            prefix: prefix.into(),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    fn make_key(&self, key: &str) -> String {
        format!("{}:{}", self.prefix, key)
    }

    pub fn get(&self, key: &str) -> Option<Value> {
        let raw = self.store.get(&self.make_key(key))?;
        Some(serde_json::from_str(&raw).unwrap_or(Value::String(raw)))
    }

    /// Read and deserialize a setting.
    pub fn get_as<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, Error> {
        match self.get(key) {
            Some(value) => Ok(Some(serde_json::from_value(value)?)),
            None => Ok(None),
        }
    }

    pub fn set<T: Serialize + ?Sized>(&mut self, key: &str, value: &T) -> Result<(), Error> {
        let key = self.make_key(key);
        match serde_json::to_value(value)? {
            Value::String(text) => self.store.set(&key, &text),
            other => self.store.set(&key, &serde_json::to_string(&other)?),
        }
    }

    pub fn remove(&mut self, key: &str) -> Result<(), Error> {
        let key = self.make_key(key);
        self.store.remove(&key)
    }

    /// Remove every setting under this prefix. Returns how many were removed.
    pub fn clear(&mut self) -> Result<usize, Error> {
        let keys = self.store.keys_with_prefix(&format!("{}:", self.prefix));
        for key in &keys {
            self.store.remove(key)?;
        }
        Ok(keys.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::InMemoryStore;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct Interval {
        seconds: u32,
    }

    #[test]
    fn strings_are_stored_raw() {
        let mut store = InMemoryStore::new();
        SettingStore::new(&mut store, "app").set("name", "notes").unwrap();
        assert_eq!(store.get("app:name").as_deref(), Some("notes"));
    }

    #[test]
    fn structured_values_round_trip_as_json() {
        let mut store = InMemoryStore::new();
        let mut settings = SettingStore::new(&mut store, "sync");

        settings.set("interval", &Interval { seconds: 10 }).unwrap();
        assert_eq!(settings.get("interval"), Some(json!({"seconds": 10})));
        assert_eq!(
            settings.get_as::<Interval>("interval").unwrap(),
            Some(Interval { seconds: 10 })
        );
        assert_eq!(store.get("sync:interval").as_deref(), Some(r#"{"seconds":10}"#));
    }

    #[test]
    fn unparsable_text_reads_as_string() {
        let mut store = InMemoryStore::new();
        store.set("app:greeting", "hello world").unwrap();

        let settings = SettingStore::new(&mut store, "app");
        assert_eq!(settings.get("greeting"), Some(json!("hello world")));
        assert_eq!(settings.get("missing"), None);
    }

    #[test]
    fn clear_only_touches_own_prefix() {
        let mut store: InMemoryStore = [
            ("app:a", "1"),
            ("app:b", "2"),
            ("apple:c", "3"),
            ("other", "4"),
        ]
        .into_iter()
        .collect();

        let removed = SettingStore::new(&mut store, "app").clear().unwrap();
        assert_eq!(removed, 2);
        assert_eq!(store.keys(), vec!["apple:c", "other"]);
    }

    #[test]
    fn remove_single_setting() {
        let mut store = InMemoryStore::new();
        let mut settings = SettingStore::new(&mut store, "app");
        settings.set("flag", &true).unwrap();
        assert_eq!(settings.get("flag"), Some(json!(true)));

        settings.remove("flag").unwrap();
        assert_eq!(settings.get("flag"), None);
    }
}
