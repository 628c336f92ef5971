//! Configuration validation issues.
//!
//! Loading never fails on a semantically odd value: the value is normalized
//! and a [`ConfigIssue`] is reported so the caller can warn about it.

/// Severity level of a configuration issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Fatal: the configuration cannot work at all.
    Error,
    /// Non-fatal: the configuration works but may not behave as expected.
    Warning,
}

/// Identifies a specific configuration issue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigIssueCode {
    /// A numeric value is below its minimum and was raised.
    BelowMinimum { field: String, value: u64, min: u64 },
    /// A string value is not one of the accepted values.
    InvalidEnumValue {
        field: String,
        value: String,
        valid_values: Vec<String>,
    },
    /// A value required by the selected provider is missing.
    MissingValue { field: String },
}

/// A detected issue in the configuration.
#[derive(Debug, Clone)]
pub struct ConfigIssue {
    pub severity: Severity,
    pub code: ConfigIssueCode,
    pub message: String,
}

impl ConfigIssue {
    pub fn below_minimum(field: &str, value: u64, min: u64) -> Self {
        Self {
            severity: Severity::Warning,
            code: ConfigIssueCode::BelowMinimum {
                field: field.to_string(),
                value,
                min,
            },
            message: format!("{}: {} is below the minimum, using {}", field, value, min),
        }
    }

    pub fn missing(field: &str, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            code: ConfigIssueCode::MissingValue {
                field: field.to_string(),
            },
            message: message.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}
