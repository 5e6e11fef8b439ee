//! Severity definitions

use super::error::LoggerError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Message severity. Lower discriminant means higher priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[derive(Default)]
pub enum Severity {
    Error = 0,
    Warning = 1,
    #[default]
    Info = 2,
}

impl Severity {
    pub const ALL: [Severity; 3] = [Severity::Error, Severity::Warning, Severity::Info];

    /// Name written between the brackets of a formatted line.
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Error => "Error",
            Severity::Warning => "Warning",
            Severity::Info => "Info",
        }
    }

    /// Lower-case keyword accepted on the command line.
    pub fn keyword(&self) -> &'static str {
        match self {
            Severity::Error => "error",
            Severity::Warning => "warning",
            Severity::Info => "info",
        }
    }

    /// Strict, case-sensitive keyword parse used for startup configuration.
    pub fn from_keyword(s: &str) -> Result<Self, LoggerError> {
        Self::ALL
            .into_iter()
            .find(|level| level.keyword() == s)
            .ok_or_else(|| LoggerError::InvalidLevel(s.to_string()))
    }

    /// Whether a message at this level is accepted under `threshold`.
    #[inline]
    pub fn passes(self, threshold: Severity) -> bool {
        self <= threshold
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Severity {
    type Err = LoggerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "error" => Ok(Severity::Error),
            "warning" => Ok(Severity::Warning),
            "info" => Ok(Severity::Info),
            _ => Err(LoggerError::InvalidLevel(s.to_string())),
        }
    }
}
