//! Regex-based definition extraction.
//!
//! Used for languages without a structural parser and for ECMAScript files
//! whose structural parse failed. The tables are intentionally permissive;
//! parameters and return behavior cannot be recovered this way.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::Regex;

use super::facts::{
    code_slice, FunctionDef, FunctionType, Provenance, ReturnType, VariableDef, VariableKind,
};
use super::language::Language;

/// Names the permissive C-family and Java patterns pick up from control flow.
const CONTROL_KEYWORDS: &[&str] = &["if", "for", "while", "switch"];

/// A definition pattern. The name is the first participating capture group.
struct DefinitionPattern {
    regex: Regex,
    kind: FunctionType,
}

impl DefinitionPattern {
    fn new(pattern: &str, kind: FunctionType) -> Self {
        Self {
            regex: Regex::new(pattern).unwrap(),
            kind,
        }
    }
}

static DEFINITION_PATTERNS: Lazy<HashMap<Language, DefinitionPattern>> = Lazy::new(|| {
    let js = r#"(?:function\s*\*?\s*([A-Za-z_$][\w$]*)\s*\(|(?:const|let|var)\s+([A-Za-z_$][\w$]*)\s*=\s*(?:async\s*)?(?:function\b|\([^)]*\)\s*=>|[A-Za-z_$][\w$]*\s*=>))"#;

    let mut table = HashMap::new();
    table.insert(
        Language::Python,
        DefinitionPattern::new(
            r"(?m)^[ \t]*(?:async\s+)?def\s+([a-zA-Z_][a-zA-Z0-9_]*)\s*\(",
            FunctionType::Function,
        ),
    );
    table.insert(
        Language::Go,
        DefinitionPattern::new(
            r"(?m)^func\s+(?:\([^)]+\)\s*)?([a-zA-Z_][a-zA-Z0-9_]*)\s*(?:\[[^\]]*\])?\s*\(",
            FunctionType::Function,
        ),
    );
    table.insert(
        Language::Java,
        DefinitionPattern::new(
            r"(?:public|private|protected|static|\s)\s+[\w<>\[\]]+\s+([a-zA-Z_][a-zA-Z0-9_]*)\s*\([^)]*\)\s*\{",
            FunctionType::Method,
        ),
    );
    table.insert(
        Language::Rust,
        DefinitionPattern::new(
            r#"(?m)^[ \t]*(?:pub(?:\([^)]*\))?\s+)?(?:const\s+)?(?:async\s+)?(?:unsafe\s+)?(?:extern\s+"[^"]*"\s+)?fn\s+([a-zA-Z_][a-zA-Z0-9_]*)"#,
            FunctionType::Function,
        ),
    );
    table.insert(
        Language::Ruby,
        DefinitionPattern::new(
            r"(?m)^[ \t]*def\s+(?:self\.)?([a-zA-Z_][a-zA-Z0-9_]*[?!]?)",
            FunctionType::Function,
        ),
    );
    table.insert(
        Language::Php,
        DefinitionPattern::new(
            r"(?m)^[ \t]*(?:(?:public|private|protected|static|abstract|final)\s+)*function\s+&?([a-zA-Z_][a-zA-Z0-9_]*)",
            FunctionType::Function,
        ),
    );
    table.insert(
        Language::CFamily,
        DefinitionPattern::new(
            r"(?m)^(?:[a-zA-Z_][a-zA-Z0-9_:<>]*[ \t*&]+)+([a-zA-Z_][a-zA-Z0-9_]*)\s*\(",
            FunctionType::Method,
        ),
    );
    table.insert(
        Language::JavaScript,
        DefinitionPattern::new(js, FunctionType::Function),
    );
    table.insert(
        Language::TypeScript,
        DefinitionPattern::new(js, FunctionType::Function),
    );
    table
});

lazy_static::lazy_static! {
    static ref VARIABLE_RE: Regex =
        Regex::new(r"(?m)^[ \t]*(const|let|var)\s+([A-Za-z_$][\w$]*)").unwrap();
}

/// Extract function definitions with the language's pattern table.
pub fn functions(content: &str, file: &str, language: Language) -> Vec<FunctionDef> {
    let Some(pattern) = DEFINITION_PATTERNS.get(&language) else {
        return Vec::new();
    };
    let lines: Vec<&str> = content.split('\n').collect();
    let mut defs = Vec::new();

    for caps in pattern.regex.captures_iter(content) {
        let Some(name) = caps.iter().skip(1).flatten().next() else {
            continue;
        };
        if CONTROL_KEYWORDS.contains(&name.as_str()) {
            continue;
        }

        let line = line_at(content, name.start());
        // Judged on the raw match: patterns without a line anchor start at
        // the keyword, so an indented `function` still counts as top-level.
        let is_top_level = language.is_indentation_insignificant()
            || !caps
                .get(0)
                .is_some_and(|m| m.as_str().starts_with([' ', '\t']));

        defs.push(FunctionDef {
            name: name.as_str().to_string(),
            file: file.to_string(),
            line,
            code: code_slice(&lines, line, None),
            kind: pattern.kind,
            is_top_level,
            is_class_method: None,
            params: Vec::new(),
            returns_value: false,
            return_type: ReturnType::Void,
            total_calls: None,
            call_sites: None,
            source: Provenance::Pattern,
        });
    }

    defs
}

/// Extract `const`/`let`/`var` declarations that start a line.
///
/// Nesting is not observable here, so every match counts as top-level.
pub fn variables(content: &str, file: &str) -> Vec<VariableDef> {
    VARIABLE_RE
        .captures_iter(content)
        .map(|caps| {
            let keyword = caps.get(1).unwrap();
            VariableDef {
                name: caps[2].to_string(),
                file: file.to_string(),
                line: line_at(content, keyword.start()),
                kind: VariableKind::parse(keyword.as_str()),
                value_type: None,
                is_top_level: true,
                total_usages: None,
                usage_lines: None,
                source: Provenance::Pattern,
            }
        })
        .collect()
}

/// 1-indexed line containing a byte offset.
fn line_at(content: &str, offset: usize) -> usize {
    content[..offset].matches('\n').count() + 1
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(defs: &[FunctionDef]) -> Vec<&str> {
        defs.iter().map(|d| d.name.as_str()).collect()
    }

    #[test]
    fn test_python_definitions() {
        let src = "import os\n\ndef load(path):\n    pass\n\nclass A:\n    def method(self):\n        pass\n";
        let defs = functions(src, "a.py", Language::Python);
        assert_eq!(names(&defs), vec!["load", "method"]);
        assert_eq!(defs[0].line, 3);
        assert!(defs[0].is_top_level);
        assert_eq!(defs[1].line, 7);
        assert!(!defs[1].is_top_level);
        assert!(defs.iter().all(|d| d.kind == FunctionType::Function));
        assert!(defs.iter().all(|d| d.source == Provenance::Pattern));
    }

    #[test]
    fn test_go_definitions_with_receivers() {
        let src = "package main\n\nfunc (s *Server) Start() error {\n\treturn nil\n}\n\nfunc main() {\n}\n";
        let defs = functions(src, "main.go", Language::Go);
        assert_eq!(names(&defs), vec!["Start", "main"]);
        assert_eq!(defs[0].line, 3);
        assert!(defs.iter().all(|d| d.is_top_level));
    }

    #[test]
    fn test_rust_definitions() {
        let src = "pub fn run() {}\n\nimpl A {\n    pub(crate) async fn fetch(&self) {}\n}\n";
        let defs = functions(src, "lib.rs", Language::Rust);
        assert_eq!(names(&defs), vec!["run", "fetch"]);
        assert!(defs[0].is_top_level);
        assert!(!defs[1].is_top_level);
        assert_eq!(defs[1].line, 4);
    }

    #[test]
    fn test_java_definitions_are_methods() {
        let src = "public class A {\n    public int add(int a, int b) {\n        return a + b;\n    }\n}\n";
        let defs = functions(src, "A.java", Language::Java);
        assert_eq!(names(&defs), vec!["add"]);
        assert_eq!(defs[0].kind, FunctionType::Method);
        assert_eq!(defs[0].line, 2);
        // the match starts at the modifier, not the indentation
        assert!(defs[0].is_top_level);
    }

    #[test]
    fn test_c_family_skips_control_keywords() {
        let src = "int main(void) {\n    return 0;\n}\nstatic void helper(int x) {\n}\nelse if (x) {\n}\n";
        let defs = functions(src, "main.c", Language::CFamily);
        assert_eq!(names(&defs), vec!["main", "helper"]);
        assert!(defs.iter().all(|d| d.is_top_level && d.kind == FunctionType::Method));
    }

    #[test]
    fn test_ruby_and_php() {
        let rb = functions("class A\n  def greet\n  end\nend\n", "a.rb", Language::Ruby);
        assert_eq!(names(&rb), vec!["greet"]);
        let php = functions(
            "<?php\nclass A {\n    public function handle($req) {}\n}\n",
            "a.php",
            Language::Php,
        );
        assert_eq!(names(&php), vec!["handle"]);
        assert_eq!(php[0].line, 3);
    }

    #[test]
    fn test_javascript_dual_pattern() {
        let src = "function a() {}\nconst b = async () => {};\nlet c = function () {};\nconst d = x => x;\nconst e = 5;\n";
        let defs = functions(src, "a.js", Language::JavaScript);
        assert_eq!(names(&defs), vec!["a", "b", "c", "d"]);
        assert!(defs.iter().all(|d| d.params.is_empty() && !d.returns_value));
    }

    #[test]
    fn test_top_level_follows_raw_match() {
        let src = "if (x) {\n  function inner() {}\n  const later = () => 1;\n}\n";
        let defs = functions(src, "a.js", Language::JavaScript);
        assert_eq!(names(&defs), vec!["inner", "later"]);
        assert_eq!(defs[0].line, 2);
        assert!(defs.iter().all(|d| d.is_top_level));

        let py = functions("class A:\n\tdef run(self):\n\t\tpass\n", "a.py", Language::Python);
        assert!(!py[0].is_top_level);
    }

    #[test]
    fn test_code_covers_following_lines() {
        let src = (1..=20).map(|i| format!("line{}", i)).collect::<Vec<_>>().join("\n");
        let src = format!("def f():\n{}", src);
        let defs = functions(&src, "a.py", Language::Python);
        assert_eq!(defs[0].code.lines().count(), 11);
        assert!(defs[0].code.starts_with("def f():"));
    }

    #[test]
    fn test_unknown_language_yields_nothing() {
        assert!(functions("fun main() {}", "a.kt", Language::Other).is_empty());
    }

    #[test]
    fn test_variable_fallback() {
        let src = "const a = 1;\nfunction f() {\n  let b = 2;\n}\nvar c;\n";
        let vars = variables(src, "a.js");
        let got: Vec<(&str, usize, VariableKind)> =
            vars.iter().map(|v| (v.name.as_str(), v.line, v.kind)).collect();
        assert_eq!(
            got,
            vec![
                ("a", 1, VariableKind::Const),
                ("b", 3, VariableKind::Let),
                ("c", 5, VariableKind::Var)
            ]
        );
        assert!(vars.iter().all(|v| v.is_top_level));
    }
}
