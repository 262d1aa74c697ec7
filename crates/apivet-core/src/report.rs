//! Report schema (stable v1)
//!
//! This schema is STABLE and VERSIONED.
//! Breaking changes require a new version.

use serde::{Deserialize, Serialize};

use crate::violation::{Severity, Violation, ViolationReason};

/// Report schema version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportVersion {
    /// Major version (breaking changes)
    pub major: u32,

    /// Minor version (backward-compatible additions)
    pub minor: u32,
}

impl ReportVersion {
    /// Current report schema version
    pub const CURRENT: ReportVersion = ReportVersion { major: 1, minor: 0 };
}

impl std::fmt::Display for ReportVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

/// Summary statistics for a report
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportSummary {
    /// Total number of violations
    pub total: usize,

    /// Number of unaccepted violations
    pub errors: usize,

    /// Number of accepted violations
    pub accepted: usize,
}

/// One violation entry as handed to reporting collaborators
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViolationEntry {
    /// Fully-qualified identity of the flagged class or member
    pub identity: String,

    /// Why the record was flagged
    pub reason: ViolationReason,

    /// Assigned severity
    pub severity: Severity,
}

impl From<&Violation> for ViolationEntry {
    fn from(violation: &Violation) -> Self {
        Self {
            identity: violation.identity(),
            reason: violation.reason,
            severity: violation.severity,
        }
    }
}

/// Compatibility report (report.json v1)
///
/// This is the stable output format. Rendering to anything richer than JSON
/// is a reporting collaborator's concern.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompatReport {
    /// Schema version
    pub version: ReportVersion,

    /// Timestamp (ISO 8601)
    pub timestamp: String,

    /// Version label the check ran against
    pub baseline: String,

    /// Version label of the artifact under check
    pub candidate: String,

    /// Summary statistics
    pub summary: ReportSummary,

    /// All violations, sorted by fully-qualified identity
    pub violations: Vec<ViolationEntry>,
}

impl CompatReport {
    /// Create a report from a run's classified violations
    pub fn from_violations(
        baseline: impl Into<String>,
        candidate: impl Into<String>,
        violations: &[Violation],
    ) -> Self {
        let summary = ReportSummary {
            total: violations.len(),
            errors: violations.iter().filter(|v| v.severity == Severity::Error).count(),
            accepted: violations.iter().filter(|v| v.severity == Severity::Accepted).count(),
        };

        Self {
            version: ReportVersion::CURRENT,
            timestamp: chrono::Utc::now().to_rfc3339(),
            baseline: baseline.into(),
            candidate: candidate.into(),
            summary,
            violations: violations.iter().map(ViolationEntry::from).collect(),
        }
    }

    /// Check if the report has any unaccepted violations
    pub fn has_errors(&self) -> bool {
        self.summary.errors > 0
    }

    /// Serialize to JSON string
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Save to file
    pub fn save_to_file(&self, path: &std::path::Path) -> Result<(), std::io::Error> {
        let json = self
            .to_json()
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;
        std::fs::write(path, json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::change::ApiChange;

    fn sample_violations() -> Vec<Violation> {
        let mut accepted = Violation::new(
            ApiChange::class("com.acme.Gadget").not_source_compatible(),
            ViolationReason::NotSourceCompatible,
        );
        accepted.severity = Severity::Accepted;

        vec![
            Violation::new(
                ApiChange::method("com.acme.Widget", "render").not_binary_compatible(),
                ViolationReason::NotBinaryCompatible,
            ),
            accepted,
        ]
    }

    #[test]
    fn empty_report() {
        let report = CompatReport::from_violations("1.2.0", "1.3.0", &[]);

        assert_eq!(report.version, ReportVersion::CURRENT);
        assert_eq!(report.summary.total, 0);
        assert!(!report.has_errors());
    }

    #[test]
    fn report_counts_severities() {
        let report = CompatReport::from_violations("1.2.0", "1.3.0", &sample_violations());

        assert_eq!(report.summary.total, 2);
        assert_eq!(report.summary.errors, 1);
        assert_eq!(report.summary.accepted, 1);
        assert!(report.has_errors());
    }

    #[test]
    fn report_serialization() {
        let report = CompatReport::from_violations("1.2.0", "1.3.0", &sample_violations());
        let json = report.to_json().unwrap();

        assert!(json.contains("\"baseline\": \"1.2.0\""));
        assert!(json.contains("\"identity\": \"com.acme.Widget#render\""));
        assert!(json.contains("\"reason\": \"not binary compatible\""));
        assert!(json.contains("\"severity\": \"error\""));
    }

    #[test]
    fn version_displays_as_major_minor() {
        assert_eq!(ReportVersion::CURRENT.to_string(), "1.0");
    }
}
