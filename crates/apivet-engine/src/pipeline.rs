//! Compatibility check pipeline
//!
//! Sequences diff, classification, severity policy, and the accepted-set
//! audit into a single pass over the change records produced by a diff
//! collaborator. The pipeline never retries or resumes; a stale accepted
//! entry or a diff failure short-circuits the run.

use std::path::PathBuf;

use apivet_core::{AcceptedChanges, ApiChange, Violation};

use crate::audit::{audit, AuditResult};
use crate::filter::ScopeFilter;
use crate::policy::SeverityPolicy;
use crate::rules::classify_forest;

/// One resolved artifact handed to the diff collaborator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    /// Version label, used in reports
    pub version: String,

    /// Location of the artifact, when the differ needs one
    pub path: Option<PathBuf>,
}

impl Artifact {
    /// Create an artifact with a version label only
    pub fn new(version: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            path: None,
        }
    }

    /// Attach the artifact's location
    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }
}

impl std::fmt::Display for Artifact {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.version)
    }
}

/// Trait for diff collaborators that produce raw change records
///
/// Implementations own artifact access entirely. Any failure to produce
/// records is opaque to the pipeline and fails the run.
pub trait ApiDiff {
    /// Get the differ name (e.g., "japicmp", "json-report")
    fn name(&self) -> &'static str;

    /// Compare two artifacts and produce the raw change records
    fn diff(&self, old: &Artifact, new: &Artifact) -> anyhow::Result<Vec<ApiChange>>;
}

/// Pipeline stages, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Idle,
    Diffing,
    Classifying,
    PolicyApplied,
    Audited,
    Passed,
    Failed,
}

impl PipelineState {
    /// Get the stable string identifier for this state
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Diffing => "diffing",
            Self::Classifying => "classifying",
            Self::PolicyApplied => "policy-applied",
            Self::Audited => "audited",
            Self::Passed => "passed",
            Self::Failed => "failed",
        }
    }
}

impl std::fmt::Display for PipelineState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Final pass/fail signal of a completed run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Passed,
    Failed,
}

/// Everything a completed run hands to reporting collaborators
#[derive(Debug, Clone)]
pub struct CheckOutcome {
    /// Pass/fail signal
    pub verdict: Verdict,

    /// All violations with severities, sorted by fully-qualified identity
    pub violations: Vec<Violation>,

    /// Audit bookkeeping for the accepted-changes set
    pub audit: AuditResult,
}

impl CheckOutcome {
    /// Whether the run passed
    pub fn passed(&self) -> bool {
        self.verdict == Verdict::Passed
    }

    /// Number of unaccepted violations
    pub fn error_count(&self) -> usize {
        self.violations.iter().filter(|v| v.is_error()).count()
    }

    /// Number of accepted violations
    pub fn accepted_count(&self) -> usize {
        self.violations.len() - self.error_count()
    }
}

/// Pipeline error types
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error(
        "The following elements are listed as 'accepted' but are not actually violations:\n- {}",
        .entries.join("\n- ")
    )]
    StaleAcceptedEntries { entries: Vec<String> },

    #[error("API diff failed")]
    Diff(#[source] anyhow::Error),
}

/// Single-pass compatibility check over two artifacts
pub struct CompatPipeline<D> {
    differ: D,
    accepted: AcceptedChanges,
    filter: ScopeFilter,
}

impl<D: ApiDiff> CompatPipeline<D> {
    /// Create a pipeline over a differ and an accepted-changes set
    pub fn new(differ: D, accepted: AcceptedChanges) -> Self {
        Self {
            differ,
            accepted,
            filter: ScopeFilter::default(),
        }
    }

    /// Use a scope filter to drop excluded packages before classification
    pub fn with_filter(mut self, filter: ScopeFilter) -> Self {
        self.filter = filter;
        self
    }

    /// Run the check against two artifacts
    pub fn run(&self, old: &Artifact, new: &Artifact) -> Result<CheckOutcome, PipelineError> {
        let mut state = PipelineState::Idle;

        transition(&mut state, PipelineState::Diffing);
        let mut changes = match self.differ.diff(old, new) {
            Ok(changes) => changes,
            Err(e) => {
                transition(&mut state, PipelineState::Failed);
                return Err(PipelineError::Diff(e));
            }
        };
        tracing::debug!(differ = self.differ.name(), records = changes.len(), "diff complete");
        self.filter.retain(&mut changes);

        transition(&mut state, PipelineState::Classifying);
        let mut violations = classify_forest(&changes);

        transition(&mut state, PipelineState::PolicyApplied);
        let policy = SeverityPolicy::new(&self.accepted);
        let used = policy.apply(&mut violations);

        transition(&mut state, PipelineState::Audited);
        let audit = audit(&self.accepted, &used);
        if !audit.is_clean() {
            transition(&mut state, PipelineState::Failed);
            return Err(PipelineError::StaleAcceptedEntries {
                entries: audit.stale(),
            });
        }

        // Deterministic presentation order regardless of traversal order
        violations.sort_by(|a, b| {
            a.identity()
                .cmp(&b.identity())
                .then_with(|| a.reason.as_str().cmp(b.reason.as_str()))
        });

        let verdict = if violations.iter().any(Violation::is_error) {
            transition(&mut state, PipelineState::Failed);
            Verdict::Failed
        } else {
            transition(&mut state, PipelineState::Passed);
            Verdict::Passed
        };

        Ok(CheckOutcome {
            verdict,
            violations,
            audit,
        })
    }
}

fn transition(state: &mut PipelineState, next: PipelineState) {
    tracing::debug!(from = state.as_str(), to = next.as_str(), "pipeline transition");
    *state = next;
}

#[cfg(test)]
mod tests {
    use super::*;

    struct StaticDiff(Vec<ApiChange>);

    impl ApiDiff for StaticDiff {
        fn name(&self) -> &'static str {
            "static"
        }

        fn diff(&self, _old: &Artifact, _new: &Artifact) -> anyhow::Result<Vec<ApiChange>> {
            Ok(self.0.clone())
        }
    }

    struct FailingDiff;

    impl ApiDiff for FailingDiff {
        fn name(&self) -> &'static str {
            "failing"
        }

        fn diff(&self, _old: &Artifact, _new: &Artifact) -> anyhow::Result<Vec<ApiChange>> {
            anyhow::bail!("malformed artifact")
        }
    }

    fn artifacts() -> (Artifact, Artifact) {
        (Artifact::new("1.2.0"), Artifact::new("1.3.0"))
    }

    #[test]
    fn test_empty_diff_passes() {
        let pipeline = CompatPipeline::new(StaticDiff(Vec::new()), AcceptedChanges::new());
        let (old, new) = artifacts();

        let outcome = pipeline.run(&old, &new).unwrap();

        assert!(outcome.passed());
        assert!(outcome.violations.is_empty());
        assert!(outcome.audit.is_clean());
    }

    #[test]
    fn test_diff_failure_short_circuits() {
        let pipeline = CompatPipeline::new(FailingDiff, AcceptedChanges::new());
        let (old, new) = artifacts();

        let err = pipeline.run(&old, &new).unwrap_err();

        assert!(matches!(err, PipelineError::Diff(_)));
    }

    #[test]
    fn test_stale_entry_message_format() {
        let accepted =
            AcceptedChanges::from_entries(["com.acme.Unused#method", "com.acme.AlsoUnused"]);
        let pipeline = CompatPipeline::new(StaticDiff(Vec::new()), accepted);
        let (old, new) = artifacts();

        let err = pipeline.run(&old, &new).unwrap_err();

        assert_eq!(
            err.to_string(),
            "The following elements are listed as 'accepted' but are not actually violations:\n\
             - com.acme.AlsoUnused\n\
             - com.acme.Unused#method"
        );
    }

    #[test]
    fn test_violations_sorted_by_identity() {
        let changes = vec![
            ApiChange::method("com.acme.Zeta", "omega").not_binary_compatible(),
            ApiChange::method("com.acme.Alpha", "first").not_binary_compatible(),
            ApiChange::method("com.acme.Alpha", "apply").not_source_compatible(),
        ];
        let pipeline = CompatPipeline::new(StaticDiff(changes), AcceptedChanges::new());
        let (old, new) = artifacts();

        let outcome = pipeline.run(&old, &new).unwrap();
        let identities: Vec<String> =
            outcome.violations.iter().map(|v| v.identity()).collect();

        assert_eq!(
            identities,
            vec![
                "com.acme.Alpha#apply".to_string(),
                "com.acme.Alpha#first".to_string(),
                "com.acme.Zeta#omega".to_string(),
            ]
        );
    }

    #[test]
    fn test_excluded_packages_never_classified() {
        let changes = vec![
            ApiChange::method("com.acme.shadow.vendored.Util", "merge").not_binary_compatible(),
        ];
        let pipeline = CompatPipeline::new(StaticDiff(changes), AcceptedChanges::new())
            .with_filter(ScopeFilter::new(["*.shadow.*"]));
        let (old, new) = artifacts();

        let outcome = pipeline.run(&old, &new).unwrap();

        assert!(outcome.passed());
        assert!(outcome.violations.is_empty());
    }
}
