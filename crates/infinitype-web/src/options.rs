#![forbid(unsafe_code)]

//! Host options accepted by `boot`.
//!
//! Shape (camelCase, every key optional):
//! `{ inputElementId, commandKeys, preventedKeys, storageKey, defaultCorpus }`

use infinitype_bridge::{BridgeConfig, BridgeError};
use serde::Deserialize;

/// Id of the text input that receives IME composition events.
pub const DEFAULT_INPUT_ELEMENT_ID: &str = "infinitype";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct WebOptions {
    pub input_element_id: String,
    #[serde(flatten)]
    pub bridge: BridgeConfig,
}

impl Default for WebOptions {
    fn default() -> Self {
        Self {
            input_element_id: DEFAULT_INPUT_ELEMENT_ID.to_owned(),
            bridge: BridgeConfig::default(),
        }
    }
}

impl WebOptions {
    /// Parse options serialized by the host (`JSON.stringify(options)`).
    ///
    /// `None`, an empty string, and `"null"` all mean "use defaults".
    pub fn from_json(json: Option<&str>) -> Result<Self, BridgeError> {
        let Some(json) = json.map(str::trim).filter(|s| !s.is_empty() && *s != "null") else {
            return Ok(Self::default());
        };
        let mut options: Self = serde_json::from_str(json)?;
        options.bridge = options.bridge.normalized();
        Ok(options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn missing_options_use_defaults() {
        for json in [None, Some(""), Some("null"), Some("{}")] {
            assert_eq!(WebOptions::from_json(json).unwrap(), WebOptions::default());
        }
    }

    #[test]
    fn bridge_fields_are_read_from_the_top_level() {
        let options = WebOptions::from_json(Some(
            r#"{"inputElementId":"typing","commandKeys":["p","p","s"],"defaultCorpus":2}"#,
        ))
        .unwrap();
        assert_eq!(options.input_element_id, "typing");
        assert_eq!(options.bridge.command_keys, vec!["p", "s"]);
        assert_eq!(options.bridge.default_corpus, 2);
        assert_eq!(options.bridge.storage_key, "infinitype:chosen_corpus");
    }

    #[test]
    fn malformed_options_are_a_config_error() {
        let err = WebOptions::from_json(Some("{ nope")).unwrap_err();
        assert!(matches!(err, BridgeError::Config(_)));
    }
}
