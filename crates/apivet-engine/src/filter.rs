//! Scope filtering for change records
//!
//! Drops records for classes in excluded packages (for example shadowed
//! third-party packages) before classification runs.

use apivet_core::ApiChange;

/// Excludes classes whose package matches one of the configured patterns
#[derive(Debug, Clone, Default)]
pub struct ScopeFilter {
    excluded: Vec<String>,
}

impl ScopeFilter {
    /// Create a filter from exclusion patterns (supports `*`)
    pub fn new<I, S>(excluded: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            excluded: excluded.into_iter().map(Into::into).collect(),
        }
    }

    /// Whether a fully-qualified class name is excluded
    pub fn excludes(&self, class_name: &str) -> bool {
        self.excluded
            .iter()
            .any(|pattern| pattern_matches(pattern, class_name))
    }

    /// Remove excluded record trees in place
    pub fn retain(&self, changes: &mut Vec<ApiChange>) {
        if self.excluded.is_empty() {
            return;
        }
        changes.retain(|change| !self.excludes(change.fully_qualified_class_name()));
    }
}

/// Wildcard matching with any number of `*` segments
fn pattern_matches(pattern: &str, text: &str) -> bool {
    if !pattern.contains('*') {
        return pattern == text;
    }

    let segments: Vec<&str> = pattern.split('*').collect();
    let last = segments.len() - 1;
    let mut rest = text;

    for (i, segment) in segments.iter().enumerate() {
        if segment.is_empty() {
            continue;
        }
        if i == 0 {
            match rest.strip_prefix(segment) {
                Some(stripped) => rest = stripped,
                None => return false,
            }
        } else if i == last {
            return rest.ends_with(segment);
        } else {
            match rest.find(segment) {
                Some(pos) => rest = &rest[pos + segment.len()..],
                None => return false,
            }
        }
    }

    true
}
