//! API change records and fully-qualified identities

use serde::{Deserialize, Serialize};

/// Granularity of a detected API change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ChangeKind {
    /// A class, interface, enum, or annotation declaration
    Class,

    /// A method of a class
    Method,

    /// A constructor of a class
    Constructor,

    /// A field of a class
    Field,

    /// A "class X implements interface Y" relationship
    ImplementedInterface,
}

impl ChangeKind {
    /// Get the kind as a stable string identifier
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Class => "class",
            Self::Method => "method",
            Self::Constructor => "constructor",
            Self::Field => "field",
            Self::ImplementedInterface => "implemented-interface",
        }
    }

    /// Whether this record describes a member of a class rather than the
    /// class declaration itself
    pub fn is_member(&self) -> bool {
        matches!(self, Self::Method | Self::Constructor | Self::Field)
    }
}

impl std::fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One detected API-level difference between two versions of a library.
///
/// Records are produced by an external bytecode-diffing tool and consumed
/// as-is; the core never recomputes compatibility flags. A class record
/// aggregates its finer-grained differences as `children`: member records
/// plus class-detail change descriptors. A class whose own declaration
/// changed in a breaking way must carry that as an incompatible child
/// descriptor, otherwise the class record is considered fully described by
/// its children and is dropped as redundant during classification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiChange {
    /// Granularity of the change
    pub kind: ChangeKind,

    /// Fully-qualified name of the class the member belongs to
    /// (for class-level records, the class itself)
    pub owning_class: String,

    /// Method or field name; `None` for class-level records
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub member_name: Option<String>,

    /// Whether callers compiled against the old version keep working
    #[serde(default = "default_true")]
    pub binary_compatible: bool,

    /// Whether callers recompiled against the new version keep working
    #[serde(default = "default_true")]
    pub source_compatible: bool,

    /// False when the class or member was added in the new version
    #[serde(default = "default_true")]
    pub present_in_old: bool,

    /// False when the class or member was removed in the new version
    #[serde(default = "default_true")]
    pub present_in_new: bool,

    /// Class-level only: the superclass reference changed and that change
    /// is itself flagged incompatible
    #[serde(default)]
    pub superclass_changed: bool,

    /// Nested finer-grained records, in the order the diff tool emitted them
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<ApiChange>,
}

fn default_true() -> bool {
    true
}

impl ApiChange {
    fn new(kind: ChangeKind, owning_class: impl Into<String>, member_name: Option<String>) -> Self {
        Self {
            kind,
            owning_class: owning_class.into(),
            member_name,
            binary_compatible: true,
            source_compatible: true,
            present_in_old: true,
            present_in_new: true,
            superclass_changed: false,
            children: Vec::new(),
        }
    }

    /// Create a class-level record with compatible defaults
    pub fn class(name: impl Into<String>) -> Self {
        Self::new(ChangeKind::Class, name, None)
    }

    /// Create a method-level record
    pub fn method(owning_class: impl Into<String>, name: impl Into<String>) -> Self {
        Self::new(ChangeKind::Method, owning_class, Some(name.into()))
    }

    /// Create a constructor-level record
    pub fn constructor(owning_class: impl Into<String>, name: impl Into<String>) -> Self {
        Self::new(ChangeKind::Constructor, owning_class, Some(name.into()))
    }

    /// Create a field-level record
    pub fn field(owning_class: impl Into<String>, name: impl Into<String>) -> Self {
        Self::new(ChangeKind::Field, owning_class, Some(name.into()))
    }

    /// Create an implemented-interface record for `owning_class`
    pub fn implemented_interface(
        owning_class: impl Into<String>,
        interface: impl Into<String>,
    ) -> Self {
        Self::new(ChangeKind::ImplementedInterface, owning_class, Some(interface.into()))
    }

    /// Mark the record as breaking binary compatibility
    pub fn not_binary_compatible(mut self) -> Self {
        self.binary_compatible = false;
        self
    }

    /// Mark the record as breaking source compatibility
    pub fn not_source_compatible(mut self) -> Self {
        self.source_compatible = false;
        self
    }

    /// Mark the record as absent from the old version (added API surface)
    pub fn added(mut self) -> Self {
        self.present_in_old = false;
        self
    }

    /// Mark the record as absent from the new version (removed API surface)
    pub fn removed(mut self) -> Self {
        self.present_in_new = false;
        self
    }

    /// Mark the class record as having an incompatible superclass change
    pub fn with_superclass_changed(mut self) -> Self {
        self.superclass_changed = true;
        self
    }

    /// Attach nested finer-grained records
    pub fn with_children(mut self, children: Vec<ApiChange>) -> Self {
        self.children = children;
        self
    }

    /// Fully-qualified identity: `Class` for class-level records,
    /// `Class#member` for member-level records
    pub fn fully_qualified_name(&self) -> String {
        match &self.member_name {
            Some(member) if self.kind.is_member() => {
                format!("{}#{}", self.owning_class, member)
            }
            _ => self.owning_class.clone(),
        }
    }

    /// Fully-qualified name of the owning class
    pub fn fully_qualified_class_name(&self) -> &str {
        &self.owning_class
    }

    /// Whether any direct child change breaks binary or source compatibility
    pub fn has_incompatible_child(&self) -> bool {
        self.children
            .iter()
            .any(|child| !child.binary_compatible || !child.source_compatible)
    }
}

impl std::fmt::Display for ApiChange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.kind, self.fully_qualified_name())
    }
}
