//! Core types for the structured log store.
//!
//! This module provides:
//! - [`LogLevel`] — Severity levels for log entries
//! - [`LogEntry`] — Structured log entry with metadata
//! - [`LogFilter`] — Query filters for searching logs

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Log severity levels, ordered from least to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Debugging information
    Debug = 0,
    /// General information
    Info = 1,
    /// Warning conditions
    Warn = 2,
    /// Error conditions
    Error = 3,
    /// Fatal conditions; the process is about to exit
    Fatal = 4,
}

impl LogLevel {
    /// Returns true if this level is at least as severe as the given level.
    #[must_use]
    pub fn is_at_least(&self, level: Self) -> bool {
        *self >= level
    }

    /// Returns the string representation of this level.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
            Self::Fatal => "fatal",
        }
    }

    /// Parses a level from its string form.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "debug" => Some(Self::Debug),
            "info" => Some(Self::Info),
            "warn" => Some(Self::Warn),
            "error" => Some(Self::Error),
            "fatal" => Some(Self::Fatal),
            _ => None,
        }
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A structured log entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    /// Unix timestamp in milliseconds.
    pub timestamp: i64,
    /// Severity level.
    pub level: LogLevel,
    /// The service that produced the entry.
    pub service: String,
    /// The log message.
    pub message: String,
    /// Additional structured fields.
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub metadata: HashMap<String, serde_json::Value>,
    /// Optional trace correlation identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trace_id: Option<String>,
}

impl LogEntry {
    /// Creates a new entry stamped with the current time.
    #[must_use]
    pub fn now(level: LogLevel, service: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            timestamp: chrono::Utc::now().timestamp_millis(),
            level,
            service: service.into(),
            message: message.into(),
            metadata: HashMap::new(),
            trace_id: None,
        }
    }

    /// Attaches a metadata field and returns self for chaining.
    #[must_use]
    pub fn meta(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }

    /// Attaches a trace identifier.
    #[must_use]
    pub fn trace(mut self, trace_id: impl Into<String>) -> Self {
        self.trace_id = Some(trace_id.into());
        self
    }

    /// Checks if this entry matches the given filter.
    #[must_use]
    pub fn matches(&self, filter: &LogFilter) -> bool {
        if let Some(level) = filter.level {
            if self.level != level {
                return false;
            }
        }

        if let Some(ref service) = filter.service {
            if &self.service != service {
                return false;
            }
        }

        if let Some(start) = filter.start_time {
            if self.timestamp < start {
                return false;
            }
        }
        if let Some(end) = filter.end_time {
            if self.timestamp > end {
                return false;
            }
        }

        true
    }
}

/// Filter criteria for querying logs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogFilter {
    /// Filter by exact level.
    pub level: Option<LogLevel>,
    /// Filter by service name.
    pub service: Option<String>,
    /// Inclusive start of the time range (epoch millis).
    pub start_time: Option<i64>,
    /// Inclusive end of the time range (epoch millis).
    pub end_time: Option<i64>,
}
