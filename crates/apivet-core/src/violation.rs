//! Violations produced from change records
//!
//! IMPORTANT: Reason strings are stable and appear verbatim in reports and
//! accepted-changes workflows. Do not reword them.

use serde::{Deserialize, Serialize};

use crate::change::ApiChange;

/// Why a change record was flagged as a violation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ViolationReason {
    /// Breaks callers compiled against the old version
    #[serde(rename = "not binary compatible")]
    NotBinaryCompatible,

    /// Breaks callers upon recompilation against the new version
    #[serde(rename = "not source compatible")]
    NotSourceCompatible,

    /// The superclass reference changed in a way that itself breaks
    /// binary compatibility
    #[serde(rename = "binary incompatible due to superclass change")]
    BreakingSuperclassChange,
}

impl ViolationReason {
    /// Get the reason as its stable report string
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotBinaryCompatible => "not binary compatible",
            Self::NotSourceCompatible => "not source compatible",
            Self::BreakingSuperclassChange => "binary incompatible due to superclass change",
        }
    }
}

impl std::fmt::Display for ViolationReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Severity of a classified violation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Unaccepted incompatibility; fails the run
    Error,

    /// Caller-declared, intentionally-tolerated incompatibility
    Accepted,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Error => write!(f, "error"),
            Self::Accepted => write!(f, "accepted"),
        }
    }
}

/// A reportable violation.
///
/// Created during classification with severity `Error`; the severity policy
/// may downgrade it to `Accepted`. Consumed by the consistency audit and by
/// report emission, then discarded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violation {
    /// The underlying change record
    pub change: ApiChange,

    /// Why the record was flagged
    pub reason: ViolationReason,

    /// Assigned severity
    pub severity: Severity,
}

impl Violation {
    /// Create a violation with the initial `Error` severity
    pub fn new(change: ApiChange, reason: ViolationReason) -> Self {
        Self {
            change,
            reason,
            severity: Severity::Error,
        }
    }

    /// Fully-qualified identity of the flagged record
    pub fn identity(&self) -> String {
        self.change.fully_qualified_name()
    }

    /// Whether this violation fails the run
    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reason_strings_are_stable() {
        assert_eq!(ViolationReason::NotBinaryCompatible.as_str(), "not binary compatible");
        assert_eq!(ViolationReason::NotSourceCompatible.as_str(), "not source compatible");
        assert_eq!(
            ViolationReason::BreakingSuperclassChange.as_str(),
            "binary incompatible due to superclass change"
        );
    }

    #[test]
    fn reason_serializes_to_report_string() {
        let json = serde_json::to_string(&ViolationReason::NotBinaryCompatible).unwrap();
        assert_eq!(json, "\"not binary compatible\"");
    }

    #[test]
    fn severity_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Severity::Error).unwrap(), "\"error\"");
        assert_eq!(serde_json::to_string(&Severity::Accepted).unwrap(), "\"accepted\"");
    }

    #[test]
    fn new_violations_start_as_errors() {
        let violation = Violation::new(
            ApiChange::method("com.acme.Widget", "render").not_binary_compatible(),
            ViolationReason::NotBinaryCompatible,
        );

        assert!(violation.is_error());
        assert_eq!(violation.identity(), "com.acme.Widget#render");
    }
}
