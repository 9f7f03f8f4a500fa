//! Severity levels shared by records and notifications.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Log severity, ordered from least to most severe.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    #[serde(alias = "Debug", alias = "DEBUG")]
    Debug,
    #[default]
    #[serde(alias = "Info", alias = "INFO")]
    Info,
    #[serde(alias = "Warn", alias = "WARN", alias = "warning")]
    Warn,
    #[serde(alias = "Error", alias = "ERROR")]
    Error,
    #[serde(alias = "Critical", alias = "CRITICAL", alias = "fatal")]
    Critical,
}

impl Level {
    pub fn as_str(self) -> &'static str {
        match self {
            Level::Debug => "Debug",
            Level::Info => "Info",
            Level::Warn => "Warn",
            Level::Error => "Error",
            Level::Critical => "Critical",
        }
    }

    /// The matching `slog` level.
    pub fn as_slog(self) -> slog::Level {
        match self {
            Level::Debug => slog::Level::Debug,
            Level::Info => slog::Level::Info,
            Level::Warn => slog::Level::Warning,
            Level::Error => slog::Level::Error,
            Level::Critical => slog::Level::Critical,
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<Level> for slog::Level {
    fn from(level: Level) -> Self {
        level.as_slog()
    }
}
