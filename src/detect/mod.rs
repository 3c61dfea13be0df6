//! Detection passes that run directly over raw file content.
//!
//! None of these depend on the extracted definitions; each takes the file
//! text (and name, where the language matters) and returns its findings.

mod complexity;
mod imports;
mod security;
mod types;

pub use complexity::{
    calc_complexity, BranchCounts, ComplexityLevel, ComplexityScore, ComplexityThresholds,
};
pub use imports::detect_imports;
pub use security::detect_security;
pub use types::{SecurityIssue, SecurityRule, Severity};
