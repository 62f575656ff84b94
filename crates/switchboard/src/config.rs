//! Dispatcher and broker configuration
//!
//! Configuration is optional: every type here has a `Default` that matches the
//! engine's plain behavior. A YAML document can override any subset of fields:
//!
//! ```yaml
//! channel:
//!   reset_collector_before_dispatch: true
//!   trace_invocations: false
//!   default_policy: retain
//!   default_priority: back
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::Result;
use crate::subscription::{InsertPriority, SubscriptionPolicy};

/// Per-dispatcher settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DispatcherConfig {
    /// Reset the collector at the start of every dispatch pass
    pub reset_collector_before_dispatch: bool,
    /// Emit a `trace!` record for every invocation and skip
    pub trace_invocations: bool,
    /// Policy used by `subscribe_default`
    pub default_policy: SubscriptionPolicy,
    /// Priority used by `subscribe_default`
    pub default_priority: InsertPriority,
}

/// Broker settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BrokerConfig {
    /// Configuration applied to every channel dispatcher the broker creates
    pub channel: DispatcherConfig,
}

/// Loads [`BrokerConfig`] from YAML
pub struct ConfigLoader;

impl ConfigLoader {
    /// Parse a YAML document. A blank document yields the defaults.
    pub fn from_yaml_str(yaml: &str) -> Result<BrokerConfig> {
        if yaml.trim().is_empty() {
            return Ok(BrokerConfig::default());
        }
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Load configuration from a file
    ///
    /// A missing file is not an error: the defaults are returned.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load_from_path(path: &Path) -> Result<BrokerConfig> {
        if !path.exists() {
            debug!(path = %path.display(), "No broker configuration file, using defaults");
            return Ok(BrokerConfig::default());
        }

        let content = fs::read_to_string(path)?;
        let config = Self::from_yaml_str(&content)?;
        debug!(path = %path.display(), ?config, "Loaded broker configuration");
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;
    use crate::error::SwitchboardError;

    #[test]
    fn test_blank_document_is_default() {
        let config = ConfigLoader::from_yaml_str("  \n").unwrap();
        assert_eq!(config, BrokerConfig::default());
    }

    #[test]
    fn test_partial_document_keeps_other_defaults() {
        let yaml = "channel:\n  reset_collector_before_dispatch: true\n";
        let config = ConfigLoader::from_yaml_str(yaml).unwrap();

        assert!(config.channel.reset_collector_before_dispatch);
        assert!(!config.channel.trace_invocations);
        assert_eq!(config.channel.default_policy, SubscriptionPolicy::Replace);
        assert_eq!(config.channel.default_priority, InsertPriority::Back);
    }

    #[test]
    fn test_policy_and_priority_fields() {
        let yaml = "channel:\n  default_policy: retain\n  default_priority: front\n";
        let config = ConfigLoader::from_yaml_str(yaml).unwrap();

        assert_eq!(config.channel.default_policy, SubscriptionPolicy::Retain);
        assert_eq!(config.channel.default_priority, InsertPriority::Front);
    }

    #[test]
    fn test_malformed_yaml_is_reported() {
        let result = ConfigLoader::from_yaml_str("channel: [unterminated");
        assert!(matches!(result, Err(SwitchboardError::SerializationError(_))));
    }

    #[test]
    fn test_missing_file_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let config = ConfigLoader::load_from_path(&dir.path().join("broker.yaml")).unwrap();
        assert_eq!(config, BrokerConfig::default());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broker.yaml");
        let mut file = fs::File::create(&path).unwrap();
        writeln!(file, "channel:\n  trace_invocations: true").unwrap();

        let config = ConfigLoader::load_from_path(&path).unwrap();
        assert!(config.channel.trace_invocations);
    }
}
