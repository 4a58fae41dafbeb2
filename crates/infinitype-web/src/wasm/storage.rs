#![forbid(unsafe_code)]

//! `window.localStorage` as a [`StorageBackend`].

use infinitype_bridge::{BridgeError, Result, StorageBackend};
use tracing::warn;
use web_sys::{Storage, Window};

use super::describe_js;

/// `localStorage` may be missing (sandboxed iframes, some private modes).
/// Without it reads fail and `load()` falls back to the default corpus;
/// writes fail and are contained by the handler guard.
#[derive(Debug, Clone)]
pub struct LocalStorageBackend {
    storage: Option<Storage>,
}

impl LocalStorageBackend {
    #[must_use]
    pub fn from_window(window: &Window) -> Self {
        let storage = match window.local_storage() {
            Ok(storage) => storage,
            Err(err) => {
                warn!(error = %describe_js(&err), "localStorage unavailable");
                None
            }
        };
        Self { storage }
    }

    fn storage(&self, op: &'static str) -> Result<&Storage> {
        self.storage
            .as_ref()
            .ok_or_else(|| BridgeError::storage(op, "localStorage unavailable"))
    }
}

impl StorageBackend for LocalStorageBackend {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        self.storage("read")?
            .get_item(key)
            .map_err(|err| BridgeError::storage("read", describe_js(&err)))
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<()> {
        self.storage("write")?
            .set_item(key, value)
            .map_err(|err| BridgeError::storage("write", describe_js(&err)))
    }
}
