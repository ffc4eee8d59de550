//! Session configuration.

use serde::{Deserialize, Serialize};

use crate::dispatcher::prepare;
use crate::tokenizer::tokenize;

/// Script a fresh editor session starts from: orbital controls and white
/// ambient light.
pub const DEFAULT_SCRIPT: &str = "2:0:0:^n|1:0:0:#FFFFFF";

fn default_initial_script() -> String {
    DEFAULT_SCRIPT.to_string()
}

fn default_auto_start() -> bool {
    true
}

/// Settings for a builder session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionConfig {
    /// Script the session is seeded with.
    #[serde(default = "default_initial_script")]
    pub initial_script: String,

    /// Start rendering after every rebuild.
    #[serde(default = "default_auto_start")]
    pub auto_start: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            initial_script: default_initial_script(),
            auto_start: default_auto_start(),
        }
    }
}

impl SessionConfig {
    /// Parse a config from JSON text.
    pub fn from_json(content: &str) -> Result<Self, String> {
        serde_json::from_str(content).map_err(|e| format!("Failed to parse config: {}", e))
    }

    /// Load a config from a JSON file.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn from_file(path: &std::path::Path) -> Result<Self, String> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config file {:?}: {}", path, e))?;
        serde_json::from_str(&content)
            .map_err(|e| format!("Failed to parse config file {:?}: {}", path, e))
    }

    /// Check that the initial script decodes and every command in it
    /// resolves to a well-formed operation.
    pub fn validate(&self) -> Result<(), String> {
        let commands = tokenize(&self.initial_script)
            .map_err(|e| format!("Initial script: {}", e))?;
        for (position, command) in commands.iter().enumerate() {
            prepare(position, command).map_err(|e| format!("Initial script: {}", e))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_from_empty_object() {
        let config = SessionConfig::from_json("{}").unwrap();
        assert_eq!(config, SessionConfig::default());
        assert_eq!(config.initial_script, DEFAULT_SCRIPT);
        assert!(config.auto_start);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_camel_case_fields() {
        let config =
            SessionConfig::from_json(r#"{"initialScript": "", "autoStart": false}"#).unwrap();
        assert_eq!(config.initial_script, "");
        assert!(!config.auto_start);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_script() {
        let config = SessionConfig {
            initial_script: "2:0:0:^n|9:0:0:".to_string(),
            ..SessionConfig::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.contains("9:0:0"), "{}", err);

        let config = SessionConfig {
            initial_script: "2:0".to_string(),
            ..SessionConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_malformed_json() {
        assert!(SessionConfig::from_json("{").is_err());
    }
}
