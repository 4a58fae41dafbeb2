#![forbid(unsafe_code)]

//! Persisted corpus selection.
//!
//! One key, one base-10 integer value. Loading never fails: a missing,
//! unreadable or unparsable value degrades to the configured default.

use std::collections::HashMap;

use tracing::{debug, warn};

use crate::config::BridgeConfig;
use crate::error::{BridgeError, Result};

/// Synchronous string key-value store (e.g. `localStorage`).
pub trait StorageBackend {
    fn get_item(&self, key: &str) -> Result<Option<String>>;
    fn set_item(&mut self, key: &str, value: &str) -> Result<()>;
}

/// In-process storage for native hosts and tests.
#[derive(Debug, Default, Clone)]
pub struct MemoryStorage {
    items: HashMap<String, String>,
}

impl MemoryStorage {
    #[must_use]
    pub fn with_item(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.items.insert(key.into(), value.into());
        self
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.items.get(key).map(String::as_str)
    }
}

impl StorageBackend for MemoryStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        Ok(self.items.get(key).cloned())
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<()> {
        self.items.insert(key.to_owned(), value.to_owned());
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct PersistenceAdapter<S> {
    storage: S,
    key: String,
    default_index: i64,
}

impl<S: StorageBackend> PersistenceAdapter<S> {
    #[must_use]
    pub fn new(storage: S, config: &BridgeConfig) -> Self {
        Self {
            storage,
            key: config.storage_key.clone(),
            default_index: config.default_corpus,
        }
    }

    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    #[must_use]
    pub const fn default_index(&self) -> i64 {
        self.default_index
    }

    #[must_use]
    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Read the stored index, falling back to the default.
    #[must_use]
    pub fn load(&self) -> i64 {
        let raw = match self.storage.get_item(&self.key) {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                debug!(key = %self.key, "no stored corpus; using default");
                return self.default_index;
            }
            Err(err) => {
                warn!(key = %self.key, error = %err, "corpus read failed; using default");
                return self.default_index;
            }
        };

        parse_leading_int(&raw).unwrap_or_else(|| {
            debug!(key = %self.key, raw = %raw, "stored corpus is not an integer; using default");
            self.default_index
        })
    }

    /// Write `index` verbatim. Range checks belong to the core.
    pub fn save(&mut self, index: i64) -> Result<()> {
        debug!(key = %self.key, index, "persisting corpus");
        self.storage.set_item(&self.key, &index.to_string())
    }
}

/// `parseInt(s, 10)`-style parse: skip leading whitespace, accept an
/// optional sign, then take the longest run of ASCII digits. Anything after
/// the digits is ignored. `None` when there are no digits or the value
/// overflows `i64`.
fn parse_leading_int(s: &str) -> Option<i64> {
    let s = s.trim_start();
    let (negative, rest) = match s.as_bytes().first()? {
        b'-' => (true, &s[1..]),
        b'+' => (false, &s[1..]),
        _ => (false, s),
    };
    let digits_len = rest.bytes().take_while(u8::is_ascii_digit).count();
    if digits_len == 0 {
        return None;
    }

    let digits = &rest[..digits_len];
    let parsed = if negative {
        format!("-{digits}").parse::<i64>()
    } else {
        digits.parse::<i64>()
    };
    parsed.ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    struct FailingStorage;

    impl StorageBackend for FailingStorage {
        fn get_item(&self, _key: &str) -> Result<Option<String>> {
            Err(BridgeError::storage("read", "SecurityError"))
        }

        fn set_item(&mut self, _key: &str, _value: &str) -> Result<()> {
            Err(BridgeError::storage("write", "QuotaExceededError"))
        }
    }

    fn adapter(storage: MemoryStorage) -> PersistenceAdapter<MemoryStorage> {
        PersistenceAdapter::new(storage, &BridgeConfig::default())
    }

    #[test]
    fn missing_key_loads_default() {
        assert_eq!(adapter(MemoryStorage::default()).load(), 6);
    }

    #[test]
    fn corrupt_values_load_default() {
        for raw in ["", "   ", "abc", "-", "+", "x12", "99999999999999999999"] {
            let storage = MemoryStorage::default().with_item("infinitype:chosen_corpus", raw);
            assert_eq!(adapter(storage).load(), 6, "raw={raw:?}");
        }
    }

    #[test]
    fn lenient_prefix_parse_matches_parse_int() {
        for (raw, expected) in [("3", 3), (" 4", 4), ("12abc", 12), ("-2", -2), ("+7", 7), ("0", 0), ("5.9", 5)] {
            let storage = MemoryStorage::default().with_item("infinitype:chosen_corpus", raw);
            assert_eq!(adapter(storage).load(), expected, "raw={raw:?}");
        }
    }

    #[test]
    fn read_failure_degrades_to_default() {
        let adapter = PersistenceAdapter::new(FailingStorage, &BridgeConfig::default());
        assert_eq!(adapter.load(), 6);
    }

    #[test]
    fn write_failure_is_reported() {
        let mut adapter = PersistenceAdapter::new(FailingStorage, &BridgeConfig::default());
        let err = adapter.save(3).unwrap_err();
        assert!(matches!(err, BridgeError::Storage { op: "write", .. }));
    }

    #[test]
    fn save_writes_the_decimal_string_under_the_fixed_key() {
        let mut adapter = adapter(MemoryStorage::default());
        adapter.save(-12).unwrap();
        assert_eq!(adapter.storage().get("infinitype:chosen_corpus"), Some("-12"));
    }

    #[test]
    fn custom_key_and_default_are_honored() {
        let config = BridgeConfig::default()
            .with_storage_key("custom")
            .with_default_corpus(0);
        let mut adapter = PersistenceAdapter::new(MemoryStorage::default(), &config);
        assert_eq!(adapter.load(), 0);
        adapter.save(9).unwrap();
        assert_eq!(adapter.storage().get("custom"), Some("9"));
    }

    proptest! {
        #[test]
        fn save_then_load_roundtrips(index in any::<i64>()) {
            let mut adapter = adapter(MemoryStorage::default());
            adapter.save(index).unwrap();
            prop_assert_eq!(adapter.load(), index);
        }

        #[test]
        fn load_never_panics_on_arbitrary_text(raw in "\\PC{0,24}") {
            let storage = MemoryStorage::default().with_item("infinitype:chosen_corpus", raw);
            let _ = adapter(storage).load();
        }
    }
}
