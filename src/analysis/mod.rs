//! Single-file source analysis.
//!
//! Definitions are extracted in two tiers:
//!
//! ```text
//! ┌──────────────┐  ECMAScript   ┌──────────────┐  Ok   ┌────────────────┐
//! │ (content,    │──────────────▶│ StrictParse  │──────▶│ structural     │
//! │  filename)   │               │ (tree-sitter)│       │ walkers        │
//! └──────────────┘               └──────────────┘       └────────────────┘
//!        │ other languages              │ ParseError
//!        ▼                              ▼
//!                ┌──────────────────────────┐
//!                │ PatternFallback (regex)  │
//!                └──────────────────────────┘
//! ```
//!
//! Every definition carries its [`Provenance`]. The call and usage passes
//! then fill call counts and reference lines in place.

mod calls;
mod context;
mod extract;
mod facts;
mod fallback;
mod language;
mod sanitize;
mod structural;
mod syntax;
mod usages;

pub use calls::{apply_calls, find_calls};
pub use context::{
    analyze_source, analyze_source_with, AnalysisContext, AnalysisOptions, FileAnalysis,
};
pub use extract::{
    extract, extract_detailed, extract_variables, extract_variables_detailed, Extraction,
};
pub use facts::{
    CallEdge, CallMap, CallSite, FunctionDef, FunctionType, Provenance, ReturnType, UsageEntry,
    UsageMap, ValueType, VariableDef, VariableKind,
};
pub use language::{is_code, Language, CODE_EXTENSIONS};
pub use sanitize::strip_typescript;
pub use syntax::ParseError;
pub use usages::{apply_usages, find_variable_usages};
