//! Serializable configuration for the masker and the logger.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{
    level::Level,
    masking::{TriggerRule, DEFAULT_MASK_SYMBOL},
};

/// Default bound on masking recursion depth.
pub const DEFAULT_MAX_DEPTH: usize = 10;

/// Default number of notifications allowed in flight at once.
pub const DEFAULT_MAX_IN_FLIGHT_NOTIFICATIONS: usize = 64;

/// Invalid or unreadable configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid configuration value for `{field}`: {reason}")]
    Invalid {
        field: &'static str,
        reason: &'static str,
    },
}

/// Masker settings: recursion bound, mask symbol and the trigger map.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MaskerConfig {
    #[serde(alias = "max_depth")]
    pub max_depth: usize,
    #[serde(alias = "mask_symbol")]
    pub mask_symbol: char,
    pub triggers: BTreeMap<String, TriggerRule>,
}

impl Default for MaskerConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            mask_symbol: DEFAULT_MASK_SYMBOL,
            triggers: BTreeMap::new(),
        }
    }
}

impl MaskerConfig {
    /// Adds or replaces the rule for `key`.
    #[must_use]
    pub fn with_trigger(mut self, key: impl Into<String>, rule: TriggerRule) -> Self {
        self.triggers.insert(key.into(), rule);
        self
    }

    #[must_use]
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }
}

/// Logger settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LoggerConfig {
    /// Origin reported in notifications.
    pub source: String,
    /// Calls below this level are dropped.
    pub level: Level,
    #[serde(alias = "jsonSecurity", alias = "json_security")]
    pub masker: MaskerConfig,
    /// Notifications dispatched but not yet finished. Further notifications
    /// are dropped until one completes.
    #[serde(alias = "max_in_flight_notifications")]
    pub max_in_flight_notifications: usize,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            source: "None".to_string(),
            level: Level::default(),
            masker: MaskerConfig::default(),
            max_in_flight_notifications: DEFAULT_MAX_IN_FLIGHT_NOTIFICATIONS,
        }
    }
}

impl LoggerConfig {
    /// Parses and validates a JSON configuration document.
    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Byte counterpart of [`LoggerConfig::from_json_str`].
    pub fn from_json_slice(bytes: &[u8]) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_slice(bytes)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_in_flight_notifications == 0 {
            return Err(ConfigError::Invalid {
                field: "maxInFlightNotifications",
                reason: "must be greater than zero",
            });
        }
        if self.masker.mask_symbol.is_whitespace() {
            return Err(ConfigError::Invalid {
                field: "masker.maskSymbol",
                reason: "must not be whitespace",
            });
        }
        Ok(())
    }
}
