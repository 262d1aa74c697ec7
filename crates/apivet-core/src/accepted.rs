//! Accepted-exceptions set: caller-declared, intentionally-tolerated
//! incompatibilities

use std::collections::BTreeSet;
use std::path::Path;

/// The set of accepted incompatibilities for one pipeline run.
///
/// Each entry is either a fully-qualified class name (`com.acme.Widget`) or
/// a fully-qualified member name (`com.acme.Widget#render`). Membership is
/// exact-string and case-sensitive. The set is immutable for the duration
/// of a run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AcceptedChanges {
    entries: BTreeSet<String>,
}

impl AcceptedChanges {
    /// Create an empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a set from explicit entries
    pub fn from_entries<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            entries: entries.into_iter().map(Into::into).collect(),
        }
    }

    /// Parse a set from text: one entry per line, surrounding whitespace
    /// trimmed, blank lines filtered out
    pub fn from_lines(text: &str) -> Self {
        Self {
            entries: text
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .map(str::to_owned)
                .collect(),
        }
    }

    /// Load a set from a text file
    pub fn from_file(path: &Path) -> Result<Self, AcceptedChangesError> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| AcceptedChangesError::IoError(format!("{}: {}", path.display(), e)))?;
        Ok(Self::from_lines(&text))
    }

    /// Keep only entries within one module's namespace.
    ///
    /// A shared accepted-changes file covers every module of a project;
    /// each check run narrows it to the lines starting with the module's
    /// own package prefix.
    pub fn retain_prefix(&mut self, prefix: &str) {
        self.entries.retain(|entry| entry.starts_with(prefix));
    }

    /// Exact-string, case-sensitive membership test
    pub fn contains(&self, identity: &str) -> bool {
        self.entries.contains(identity)
    }

    /// Entries in sorted order
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(String::as_str)
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the set has no entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Accepted-changes loading errors
#[derive(Debug, thiserror::Error)]
pub enum AcceptedChangesError {
    #[error("IO error: {0}")]
    IoError(String),
}
