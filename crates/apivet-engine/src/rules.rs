//! Classification rules for detected API changes
//!
//! This module implements the ordered rule chain that decides whether a
//! change record independently constitutes a reportable violation, is
//! redundant (covered by a more specific record), or is exempt because it
//! belongs to newly added API surface. Rules are evaluated in order and
//! the first match wins.

use apivet_core::{ApiChange, ChangeKind, Violation, ViolationReason};
use std::collections::HashSet;

/// Outcome of classifying one change record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    /// The record is a reportable violation
    Violation(ViolationReason),

    /// The breakage, if any, is reported through a more specific record
    Redundant,

    /// The record belongs to newly added API surface
    Exempt,

    /// Nothing about the record breaks compatibility
    Clean,
}

/// Context handed to rules alongside the record under classification
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClassContext {
    /// True when the record lives inside a class absent from the old version
    pub in_new_class: bool,
}

type RuleCheck = fn(&ApiChange, ClassContext) -> Option<Classification>;

/// One entry in the ordered rule chain
pub struct ClassificationRule {
    /// Rule name, used in trace output
    pub name: &'static str,

    check: RuleCheck,
}

impl ClassificationRule {
    /// Evaluate this rule against a record
    pub fn evaluate(&self, change: &ApiChange, ctx: ClassContext) -> Option<Classification> {
        (self.check)(change, ctx)
    }
}

/// The rule chain, in evaluation order
pub const RULES: &[ClassificationRule] = &[
    ClassificationRule {
        name: "implemented-interface",
        check: implemented_interface_is_redundant,
    },
    ClassificationRule {
        name: "new-class",
        check: new_class_is_exempt,
    },
    ClassificationRule {
        name: "clean-class",
        check: clean_class_is_redundant,
    },
    ClassificationRule {
        name: "superclass-change",
        check: breaking_superclass_change,
    },
    ClassificationRule {
        name: "binary-compatibility",
        check: binary_incompatible,
    },
    ClassificationRule {
        name: "source-compatibility",
        check: source_incompatible,
    },
];

/// Interface-implementation changes are reported through the method-level
/// records of the interface itself
fn implemented_interface_is_redundant(
    change: &ApiChange,
    _ctx: ClassContext,
) -> Option<Classification> {
    if change.kind == ChangeKind::ImplementedInterface {
        Some(Classification::Redundant)
    } else {
        None
    }
}

/// Adding new API surface is never a breaking change
fn new_class_is_exempt(change: &ApiChange, ctx: ClassContext) -> Option<Classification> {
    let newly_added_class = change.kind == ChangeKind::Class && !change.present_in_old;

    if newly_added_class || ctx.in_new_class {
        Some(Classification::Exempt)
    } else {
        None
    }
}

/// A class record without incompatible children and without a superclass
/// change carries no breakage of its own; reporting it would double-count
/// what its children already report
fn clean_class_is_redundant(change: &ApiChange, _ctx: ClassContext) -> Option<Classification> {
    if change.kind == ChangeKind::Class
        && !change.superclass_changed
        && !change.has_incompatible_child()
    {
        Some(Classification::Redundant)
    } else {
        None
    }
}

/// A superclass change only counts when the class exists in both versions,
/// otherwise the breakage is an artifact of class addition or removal
fn breaking_superclass_change(change: &ApiChange, _ctx: ClassContext) -> Option<Classification> {
    if change.kind == ChangeKind::Class
        && change.superclass_changed
        && change.present_in_old
        && change.present_in_new
    {
        Some(Classification::Violation(
            ViolationReason::BreakingSuperclassChange,
        ))
    } else {
        None
    }
}

fn binary_incompatible(change: &ApiChange, _ctx: ClassContext) -> Option<Classification> {
    if !change.binary_compatible {
        Some(Classification::Violation(ViolationReason::NotBinaryCompatible))
    } else {
        None
    }
}

fn source_incompatible(change: &ApiChange, _ctx: ClassContext) -> Option<Classification> {
    if !change.source_compatible {
        Some(Classification::Violation(ViolationReason::NotSourceCompatible))
    } else {
        None
    }
}

/// Classify a single change record against the rule chain
pub fn classify(change: &ApiChange, ctx: ClassContext) -> Classification {
    for rule in RULES {
        if let Some(classification) = rule.evaluate(change, ctx) {
            tracing::trace!(
                rule = rule.name,
                change = %change,
                ?classification,
                "rule matched"
            );
            return classification;
        }
    }

    Classification::Clean
}

/// Classify a forest of change records, recursing into children
///
/// Violations are collected in traversal order; the pipeline sorts them
/// before presentation. Members of newly added classes are exempt whether
/// they arrive nested under the class record or as flat top-level records,
/// so the names of new classes are collected up front.
pub fn classify_forest(changes: &[ApiChange]) -> Vec<Violation> {
    let new_classes = collect_new_classes(changes);
    let mut violations = Vec::new();
    for change in changes {
        classify_into(change, ClassContext::default(), &new_classes, &mut violations);
    }
    violations
}

/// Names of classes absent from the old version, anywhere in the forest
fn collect_new_classes(changes: &[ApiChange]) -> HashSet<&str> {
    let mut names = HashSet::new();
    let mut stack: Vec<&ApiChange> = changes.iter().collect();
    while let Some(change) = stack.pop() {
        if change.kind == ChangeKind::Class && !change.present_in_old {
            names.insert(change.owning_class.as_str());
        }
        stack.extend(&change.children);
    }
    names
}

fn classify_into(
    change: &ApiChange,
    ctx: ClassContext,
    new_classes: &HashSet<&str>,
    out: &mut Vec<Violation>,
) {
    let ctx = ClassContext {
        in_new_class: ctx.in_new_class || new_classes.contains(change.owning_class.as_str()),
    };

    if let Classification::Violation(reason) = classify(change, ctx) {
        out.push(Violation::new(change.clone(), reason));
    }

    for child in &change.children {
        classify_into(child, ctx, new_classes, out);
    }
}
