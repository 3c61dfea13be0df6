//! Two-tier definition extraction.
//!
//! A strict structural parse is attempted first. When it yields a typed
//! failure, or when the language has no structural parser, the pattern
//! tables take over. The outcome records which tier produced the entities
//! and why the first tier was skipped.

use serde::Serialize;
use tracing::{debug, warn};

use super::facts::{FunctionDef, Provenance, VariableDef};
use super::fallback;
use super::language::Language;
use super::structural;
use super::syntax::{self, ParseError, Program};

/// Result of the structural tier for one file.
pub type StrictParse = Result<Program, ParseError>;

/// Entities extracted from one file together with their provenance.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Extraction<T> {
    pub items: Vec<T>,
    pub source: Provenance,
    /// Why the structural tier did not produce the items, if it was tried.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parse_error: Option<String>,
}

impl<T> Extraction<T> {
    pub fn is_degraded(&self) -> bool {
        self.source == Provenance::Pattern && self.parse_error.is_some()
    }
}

/// Attempt the structural tier.
pub fn strict_parse(content: &str, language: Language) -> StrictParse {
    syntax::parse(content, language)
}

/// Extract function definitions. Never fails; parse errors degrade to the
/// pattern tables.
pub fn extract(content: &str, filename: &str) -> Vec<FunctionDef> {
    extract_detailed(content, filename).items
}

/// Like [`extract`], also reporting provenance.
pub fn extract_detailed(content: &str, filename: &str) -> Extraction<FunctionDef> {
    let language = Language::from_filename(filename);
    let parsed = strict_parse(content, language);
    functions_from(&parsed, content, filename, language)
}

/// Extract variable declarations. Never fails.
pub fn extract_variables(content: &str, filename: &str) -> Vec<VariableDef> {
    extract_variables_detailed(content, filename).items
}

pub fn extract_variables_detailed(content: &str, filename: &str) -> Extraction<VariableDef> {
    let language = Language::from_filename(filename);
    let parsed = strict_parse(content, language);
    variables_from(&parsed, content, filename)
}

/// Function extraction over an already attempted parse.
pub fn functions_from(
    parsed: &StrictParse,
    content: &str,
    filename: &str,
    language: Language,
) -> Extraction<FunctionDef> {
    match parsed {
        Ok(program) => Extraction {
            items: structural::functions(program, content, filename),
            source: Provenance::Structural,
            parse_error: None,
        },
        Err(err) => {
            let items = fallback::functions(content, filename, language);
            report_degradation(filename, err, items.len());
            Extraction {
                items,
                source: Provenance::Pattern,
                parse_error: degradation_reason(err),
            }
        }
    }
}

/// Variable extraction over an already attempted parse.
pub fn variables_from(
    parsed: &StrictParse,
    content: &str,
    filename: &str,
) -> Extraction<VariableDef> {
    match parsed {
        Ok(program) => Extraction {
            items: structural::variables(program, filename),
            source: Provenance::Structural,
            parse_error: None,
        },
        Err(err) => Extraction {
            items: fallback::variables(content, filename),
            source: Provenance::Pattern,
            parse_error: degradation_reason(err),
        },
    }
}

/// Languages without a structural parser are not degraded, they simply
/// take the pattern path.
fn degradation_reason(err: &ParseError) -> Option<String> {
    match err {
        ParseError::Unsupported(_) => None,
        other => Some(other.to_string()),
    }
}

fn report_degradation(filename: &str, err: &ParseError, recovered: usize) {
    match err {
        ParseError::Unsupported(language) => {
            debug!(file = filename, %language, "using pattern extraction");
        }
        _ => {
            warn!(
                file = filename,
                error = %err,
                recovered,
                "structural parse failed, falling back to pattern extraction"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::facts::{FunctionType, ReturnType};

    #[test]
    fn test_non_ecmascript_takes_pattern_path_without_error() {
        let out = extract_detailed("def run():\n    return 1\n", "job.py");
        assert_eq!(out.source, Provenance::Pattern);
        assert!(out.parse_error.is_none());
        assert!(!out.is_degraded());
        assert_eq!(out.items.len(), 1);
        assert_eq!(out.items[0].name, "run");
    }

    #[test]
    fn test_extract_is_idempotent() {
        let src = "def a():\n    pass\ndef b():\n    pass\n";
        assert_eq!(extract(src, "x.py"), extract(src, "x.py"));
    }

    #[test]
    fn test_empty_content() {
        assert!(extract("", "empty.rs").is_empty());
        assert!(extract_variables("", "empty.rs").is_empty());
    }

    #[cfg(feature = "tree-sitter")]
    mod parsed {
        use super::*;

        #[test]
        fn test_add_function() {
            let defs = extract("function add(a,b){return a+b;}", "f.js");
            assert_eq!(defs.len(), 1);
            let add = &defs[0];
            assert_eq!(add.name, "add");
            assert_eq!(add.kind, FunctionType::Function);
            assert_eq!(add.params, vec!["a", "b"]);
            assert!(add.returns_value);
            assert_eq!(add.return_type, ReturnType::Value);
            assert!(add.is_top_level);
            assert_eq!(add.line, 1);
            assert_eq!(add.source, Provenance::Structural);
        }

        #[test]
        fn test_arrow_function() {
            let defs = extract("const f = (x) => x*2;", "f.js");
            assert_eq!(defs.len(), 1);
            assert_eq!(defs[0].name, "f");
            assert_eq!(defs[0].kind, FunctionType::Arrow);
            assert!(defs[0].returns_value);
        }

        #[test]
        fn test_malformed_input_degrades() {
            let src = "function ok() {\n  return 1;\n}\nfunction broken() {\n  if (x {\n";
            let out = extract_detailed(src, "broken.js");
            assert_eq!(out.source, Provenance::Pattern);
            assert!(out.is_degraded());
            let names: Vec<&str> = out.items.iter().map(|d| d.name.as_str()).collect();
            assert_eq!(names, vec!["ok", "broken"]);
            assert!(out.items.iter().all(|d| d.source == Provenance::Pattern));
        }

        #[test]
        fn test_typescript_arrow_extracts_structurally() {
            let src = "const greet = (name: string): string => `hi ${name}`;\n";
            let out = extract_detailed(src, "greet.ts");
            assert_eq!(out.source, Provenance::Structural);
            assert_eq!(out.items.len(), 1);
            assert_eq!(out.items[0].kind, FunctionType::Arrow);
            assert_eq!(out.items[0].params, vec!["name"]);
        }

        #[test]
        fn test_variables_degrade_with_functions() {
            let vars = extract_variables_detailed("const a = 1;\nlet b = {;\n", "v.js");
            assert_eq!(vars.source, Provenance::Pattern);
            let names: Vec<&str> = vars.items.iter().map(|v| v.name.as_str()).collect();
            assert_eq!(names, vec!["a", "b"]);
        }
    }
}
