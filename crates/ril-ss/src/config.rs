//! Layer configuration.
//!
//! ```yaml
//! modem: modem0
//! log_payloads: false
//! ```

use std::path::Path;

use serde::Deserialize;

use crate::error::SsResult;

/// Configuration for a [`UssdLayer`](crate::UssdLayer).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct UssdConfig {
    /// Modem identifier, used as the `modem` metric label.
    pub modem: String,
    /// Whether decoded USSD text may appear in debug logs.
    pub log_payloads: bool,
}

impl Default for UssdConfig {
    fn default() -> Self {
        UssdConfig {
            modem: "modem0".to_string(),
            log_payloads: false,
        }
    }
}

impl UssdConfig {
    /// Parse configuration from a YAML string.
    pub fn from_yaml_str(yaml: &str) -> SsResult<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Load configuration from a YAML file.
    pub fn load(path: impl AsRef<Path>) -> SsResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = UssdConfig::default();
        assert_eq!(config.modem, "modem0");
        assert!(!config.log_payloads);
    }

    #[test]
    fn test_from_yaml() {
        let config = UssdConfig::from_yaml_str("modem: xmm6262\nlog_payloads: true\n")
            .expect("valid config");
        assert_eq!(config.modem, "xmm6262");
        assert!(config.log_payloads);
    }

    #[test]
    fn test_partial_yaml_uses_defaults() {
        let config = UssdConfig::from_yaml_str("log_payloads: true").expect("valid config");
        assert_eq!(config.modem, "modem0");
        assert!(config.log_payloads);
    }

    #[test]
    fn test_invalid_yaml() {
        assert!(UssdConfig::from_yaml_str("log_payloads: [nope").is_err());
    }
}
