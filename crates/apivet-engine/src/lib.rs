//! ApiVet engine - Core business logic
//!
//! This crate implements the main business logic for ApiVet:
//! - Classification rule chain
//! - Severity policy over the accepted-changes set
//! - Consistency audit for stale accepted entries
//! - Check pipeline

pub mod audit;
pub mod filter;
pub mod pipeline;
pub mod policy;
pub mod rules;

pub use audit::{audit, AuditResult};
pub use filter::ScopeFilter;
pub use pipeline::{
    ApiDiff, Artifact, CheckOutcome, CompatPipeline, PipelineError, PipelineState, Verdict,
};
pub use policy::SeverityPolicy;
pub use rules::{classify, classify_forest, ClassContext, Classification, ClassificationRule, RULES};
