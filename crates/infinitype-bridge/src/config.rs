#![forbid(unsafe_code)]

//! Static bridge configuration.
//!
//! Every field has a default, so hosts may pass a partial JSON object (or
//! nothing at all). Key sets keep their first-seen order and drop duplicates.

use serde::{Deserialize, Serialize};

/// Storage key under which the corpus index is persisted.
pub const DEFAULT_STORAGE_KEY: &str = "infinitype:chosen_corpus";

/// Corpus index used when nothing valid is stored.
pub const DEFAULT_CORPUS: i64 = 6;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BridgeConfig {
    /// Keys forwarded as commands when Ctrl or Meta is held.
    pub command_keys: Vec<String>,
    /// Keys whose default action is suppressed when no command modifier is held.
    pub prevented_keys: Vec<String>,
    pub storage_key: String,
    pub default_corpus: i64,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            command_keys: vec!["p".to_owned()],
            prevented_keys: vec!["ArrowLeft".to_owned(), "ArrowRight".to_owned()],
            storage_key: DEFAULT_STORAGE_KEY.to_owned(),
            default_corpus: DEFAULT_CORPUS,
        }
    }
}

impl BridgeConfig {
    /// Parse a (possibly partial) camelCase JSON config.
    pub fn from_json_str(s: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str::<Self>(s).map(Self::normalized)
    }

    #[must_use]
    pub fn with_command_keys<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.command_keys = dedup_ordered(keys.into_iter().map(Into::into));
        self
    }

    #[must_use]
    pub fn with_prevented_keys<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.prevented_keys = dedup_ordered(keys.into_iter().map(Into::into));
        self
    }

    #[must_use]
    pub fn with_storage_key(mut self, key: impl Into<String>) -> Self {
        self.storage_key = key.into();
        self
    }

    #[must_use]
    pub fn with_default_corpus(mut self, index: i64) -> Self {
        self.default_corpus = index;
        self
    }

    /// Drop duplicate keys while keeping first-seen order.
    #[must_use]
    pub fn normalized(mut self) -> Self {
        self.command_keys = dedup_ordered(std::mem::take(&mut self.command_keys));
        self.prevented_keys = dedup_ordered(std::mem::take(&mut self.prevented_keys));
        self
    }
}

fn dedup_ordered(keys: impl IntoIterator<Item = String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for key in keys {
        if !out.contains(&key) {
            out.push(key);
        }
    }
    out
}
