//! Executor configuration.
//!
//! Fields are validated newtypes, so a configuration that deserializes is a
//! configuration that works.

use serde::{Deserialize, Serialize};

use crate::errors::ConfigError;
use crate::logging::LogLevel;
use crate::types::ScopeLabel;

/// Configuration of a [`ScopedExecutor`](super::ScopedExecutor).
///
/// Missing fields take their defaults, so `{}` is a complete document.
///
/// ```rust
/// use scoped::{LogLevel, ScopedExecutorConfig};
///
/// let config = ScopedExecutorConfig::from_json(
///     r#"{ "label": "ledger", "suppressed_error_level": "info" }"#,
/// )
/// .unwrap();
///
/// assert_eq!(config.label.as_ref(), "ledger");
/// assert_eq!(config.suppressed_error_level, LogLevel::Info);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScopedExecutorConfig {
    /// Name attached to the tracing span of each invocation.
    pub label: ScopeLabel,

    /// Level at which a failure suppressed by `exit` is logged.
    pub suppressed_error_level: LogLevel,
}

impl ScopedExecutorConfig {
    /// Parse a configuration from a JSON document.
    pub fn from_json(document: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(document)?)
    }

    /// Set the scope label.
    #[must_use]
    pub fn with_label(mut self, label: ScopeLabel) -> Self {
        self.label = label;
        self
    }

    /// Set the level used for suppressed failures.
    #[must_use]
    pub const fn with_suppressed_error_level(mut self, level: LogLevel) -> Self {
        self.suppressed_error_level = level;
        self
    }
}
