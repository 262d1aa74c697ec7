//! Consistency audit for the accepted-changes set
//!
//! A stale accepted entry means either the incompatibility it suppressed
//! was fixed (the entry should be deleted) or the entry never matched
//! anything (a typo). Both are configuration errors, so the audit fails
//! the run instead of warning.

use std::collections::BTreeSet;

use apivet_core::AcceptedChanges;

/// Outcome of auditing the accepted-changes set against one run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditResult {
    /// Entries that matched at least one violation
    pub used_entries: BTreeSet<String>,

    /// Every entry in the configured set
    pub all_entries: BTreeSet<String>,
}

impl AuditResult {
    /// Entries that matched nothing, in sorted order
    pub fn stale(&self) -> Vec<String> {
        self.all_entries
            .difference(&self.used_entries)
            .cloned()
            .collect()
    }

    /// Whether every configured entry was used
    pub fn is_clean(&self) -> bool {
        self.all_entries.is_subset(&self.used_entries)
    }
}

/// Audit the configured entries against the ones a run consumed
pub fn audit(accepted: &AcceptedChanges, used: &BTreeSet<String>) -> AuditResult {
    AuditResult {
        used_entries: used.clone(),
        all_entries: accepted.iter().map(str::to_string).collect(),
    }
}
