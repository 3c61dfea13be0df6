//! codelens - best-effort multi-language static analysis.
//!
//! Given one file's content and name, codelens extracts function and
//! variable definitions, import targets, a call graph among the file's own
//! functions, a text-level complexity score and heuristic security findings.
//! Nothing is resolved across files.
//!
//! # Architecture
//!
//! - `analysis`: Definition extraction (tree-sitter for ECMAScript, regex
//!   tables for everything else), call and usage resolution
//! - `detect`: Passes over raw content: complexity, security, imports
//! - `config`: YAML configuration
//! - `score`: Health score over a set of analyzed files
//! - `report`: Output formatting (pretty, JSON)
//!
//! # Example
//!
//! ```
//! let defs = codelens::extract("def run():\n    return 1\n", "job.py");
//! assert_eq!(defs[0].name, "run");
//! ```

pub mod analysis;
pub mod cli;
pub mod config;
pub mod detect;
pub mod logging;
pub mod report;
pub mod score;

pub use analysis::{
    analyze_source, apply_calls, apply_usages, extract, extract_detailed, extract_variables,
    find_calls, find_variable_usages, is_code, strip_typescript, AnalysisContext, CallMap,
    FileAnalysis, FunctionDef, Language, Provenance, UsageMap, VariableDef,
};
pub use config::Config;
pub use detect::{calc_complexity, detect_imports, detect_security, SecurityIssue, Severity};
pub use score::HealthScore;
