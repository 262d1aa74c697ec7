//! ApiVet Core
//!
//! Core domain model with stable, versioned types.
//! Never rename violation reason strings - they are part of the public API.

pub mod accepted;
pub mod change;
pub mod config;
pub mod report;
pub mod violation;

pub use accepted::{AcceptedChanges, AcceptedChangesError};
pub use change::{ApiChange, ChangeKind};
pub use config::{CompatConfig, ConfigError};
pub use report::{CompatReport, ReportSummary, ReportVersion, ViolationEntry};
pub use violation::{Severity, Violation, ViolationReason};
