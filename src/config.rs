//! Scope configuration.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Options for a [`Scope`](crate::Scope).
///
/// Missing fields fall back to their defaults when deserializing:
///
/// ```
/// use tally::ScopeConfig;
///
/// let config: ScopeConfig = serde_json::from_str(r#"{ "label": "app" }"#).unwrap();
/// assert_eq!(config.label, "app");
/// assert_eq!(config.max_notify_depth, 32);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScopeConfig {
    /// Name attached to log events from this scope.
    pub label: String,
    /// How many notification rounds may nest when observers write signals.
    pub max_notify_depth: usize,
}

impl ScopeConfig {
    pub const DEFAULT_MAX_NOTIFY_DEPTH: usize = 32;

    /// Config with the given label and default limits.
    pub fn labeled(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_notify_depth == 0 {
            return Err(Error::InvalidConfig(
                "max_notify_depth must be at least 1".to_string(),
            ));
        }
        if self.label.trim().is_empty() {
            return Err(Error::InvalidConfig("label must not be empty".to_string()));
        }
        Ok(())
    }
}

impl Default for ScopeConfig {
    fn default() -> Self {
        Self {
            label: "default".to_string(),
            max_notify_depth: Self::DEFAULT_MAX_NOTIFY_DEPTH,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = ScopeConfig::default();
        assert_eq!(config.label, "default");
        assert_eq!(config.max_notify_depth, 32);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn zero_depth_is_rejected() {
        let config = ScopeConfig {
            max_notify_depth: 0,
            ..ScopeConfig::default()
        };
        assert!(matches!(config.validate(), Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn blank_label_is_rejected() {
        assert!(ScopeConfig::labeled("  ").validate().is_err());
    }

    #[test]
    fn partial_json_uses_defaults() {
        let config: ScopeConfig = serde_json::from_str(r#"{ "max_notify_depth": 4 }"#).unwrap();
        assert_eq!(config.max_notify_depth, 4);
        assert_eq!(config.label, "default");
    }
}
