//! Configurable log levels for scope events.
//!
//! `tracing` macros take their level as a constant, so a level chosen at
//! runtime goes through `event_at!`, which dispatches to the matching macro.

use serde::{Deserialize, Serialize};
use tracing::Level;

/// Log level enumeration for configurable scope events
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Very fine-grained diagnostics
    Trace,
    /// Diagnostics useful while debugging
    Debug,
    /// Normal operation
    Info,
    /// Something unexpected that was handled
    #[default]
    Warn,
    /// A failure
    Error,
}

impl From<LogLevel> for Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Trace => Self::TRACE,
            LogLevel::Debug => Self::DEBUG,
            LogLevel::Info => Self::INFO,
            LogLevel::Warn => Self::WARN,
            LogLevel::Error => Self::ERROR,
        }
    }
}

/// Emit a tracing event at a [`LogLevel`] chosen at runtime.
macro_rules! event_at {
    ($level:expr, $($arg:tt)+) => {
        match $level {
            $crate::logging::LogLevel::Trace => ::tracing::trace!($($arg)+),
            $crate::logging::LogLevel::Debug => ::tracing::debug!($($arg)+),
            $crate::logging::LogLevel::Info => ::tracing::info!($($arg)+),
            $crate::logging::LogLevel::Warn => ::tracing::warn!($($arg)+),
            $crate::logging::LogLevel::Error => ::tracing::error!($($arg)+),
        }
    };
}

pub(crate) use event_at;
