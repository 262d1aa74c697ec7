//! Severity policy for classified violations
//!
//! Matches each violation against the caller-supplied accepted-changes set
//! by exact string comparison on the record's fully-qualified member and
//! class identities. Matching is case-sensitive and never partial.

use std::collections::BTreeSet;

use apivet_core::{AcceptedChanges, ApiChange, Severity, Violation};

/// Assigns severities from the accepted-changes set
///
/// The policy is a pure function over the set; the entries consumed by a
/// run are returned to the caller so the audit can check for stale ones
/// without re-running classification.
#[derive(Debug)]
pub struct SeverityPolicy<'a> {
    accepted: &'a AcceptedChanges,
}

impl<'a> SeverityPolicy<'a> {
    /// Create a policy over an accepted-changes set
    pub fn new(accepted: &'a AcceptedChanges) -> Self {
        Self { accepted }
    }

    /// Accepted entries that exactly equal one of the record's candidate
    /// identities
    ///
    /// A member record has two candidates (`Class#member` and `Class`); a
    /// class record has one. Every entry that matches is reported, so a
    /// narrower member entry coexisting with a broader class entry counts
    /// both as used.
    pub fn matched_entries(&self, change: &ApiChange) -> Vec<String> {
        let member_identity = change.fully_qualified_name();
        let class_identity = change.fully_qualified_class_name();

        let mut matched = Vec::new();
        if self.accepted.contains(&member_identity) {
            matched.push(member_identity.clone());
        }
        if class_identity != member_identity && self.accepted.contains(class_identity) {
            matched.push(class_identity.to_string());
        }
        matched
    }

    /// Severity the policy assigns to a record
    pub fn severity_of(&self, change: &ApiChange) -> Severity {
        if self.matched_entries(change).is_empty() {
            Severity::Error
        } else {
            Severity::Accepted
        }
    }

    /// Assign severities in place and collect the entries that matched
    pub fn apply(&self, violations: &mut [Violation]) -> BTreeSet<String> {
        let mut used = BTreeSet::new();

        for violation in violations.iter_mut() {
            let matched = self.matched_entries(&violation.change);
            if matched.is_empty() {
                violation.severity = Severity::Error;
            } else {
                violation.severity = Severity::Accepted;
                used.extend(matched);
            }
        }

        used
    }
}
