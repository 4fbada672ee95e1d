use std::fmt;

use serde::{Deserialize, Serialize};

/// Scheduling urgency of an operation.
///
/// Variants are declared most urgent first, so the derived ordering puts
/// `Urgent < Command < ... < Idle`. A scheduler serves lower values first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriorityLevel {
    /// Emergency commands (e.g. lane closures).
    Urgent,
    /// Operator commands (camera moves, presets).
    Command,
    /// Storing device settings.
    Settings,
    /// Bulk downloads (fonts, graphics, timing plans).
    Download,
    /// Frequent status polling.
    ShortPoll,
    /// Infrequent status polling.
    LongPoll,
    /// Diagnostics and self tests.
    Diagnostic,
    /// Background work with no deadline.
    Idle,
}

impl PriorityLevel {
    /// True if `self` should be served before `other`.
    pub fn is_more_urgent_than(self, other: PriorityLevel) -> bool {
        self < other
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PriorityLevel::Urgent => "urgent",
            PriorityLevel::Command => "command",
            PriorityLevel::Settings => "settings",
            PriorityLevel::Download => "download",
            PriorityLevel::ShortPoll => "short_poll",
            PriorityLevel::LongPoll => "long_poll",
            PriorityLevel::Diagnostic => "diagnostic",
            PriorityLevel::Idle => "idle",
        }
    }
}

impl fmt::Display for PriorityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
