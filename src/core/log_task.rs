//! Unit of work carried from producers to the dispatch worker

use super::log_level::Severity;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogTask {
    pub message: String,
    pub level: Severity,
}

impl LogTask {
    pub fn new(message: impl Into<String>, level: Severity) -> Self {
        Self {
            message: message.into(),
            level,
        }
    }
}
