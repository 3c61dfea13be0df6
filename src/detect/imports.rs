//! Import extraction from source files.
//!
//! Targets are returned as raw strings, exactly as written, de-duplicated in
//! order of first appearance. Nothing is resolved against other files.

use std::collections::HashSet;

use regex::Regex;

use crate::analysis::Language;

/// Extract raw import targets from `content`.
pub fn detect_imports(content: &str, filename: &str) -> Vec<String> {
    let found = match Language::from_filename(filename) {
        Language::JavaScript | Language::TypeScript => extract_js_imports(content),
        Language::Python => extract_python_imports(content),
        Language::Go => extract_go_imports(content),
        Language::Rust => extract_rust_imports(content),
        Language::Java => extract_java_imports(content),
        _ => Vec::new(),
    };
    dedupe_in_order(found)
}

/// Sort `(offset, target)` pairs by position and drop repeats.
fn dedupe_in_order(mut found: Vec<(usize, String)>) -> Vec<String> {
    found.sort_by_key(|(offset, _)| *offset);
    let mut seen = HashSet::new();
    found
        .into_iter()
        .filter_map(|(_, target)| seen.insert(target.clone()).then_some(target))
        .collect()
}

fn captures_at(re: &Regex, content: &str) -> Vec<(usize, String)> {
    re.captures_iter(content)
        .filter_map(|caps| caps.get(1))
        .map(|m| (m.start(), m.as_str().to_string()))
        .collect()
}

/// `import x from 'a'`, `import 'a'`, `export * from 'a'`, `import('a')` and
/// `require('a')`.
fn extract_js_imports(content: &str) -> Vec<(usize, String)> {
    lazy_static::lazy_static! {
        static ref FROM_RE: Regex = Regex::new(r#"\b(?:import|from)\s+['"]([^'"]+)['"]"#).unwrap();
        static ref DYNAMIC_RE: Regex = Regex::new(r#"\bimport\s*\(\s*['"]([^'"]+)['"]\s*\)"#).unwrap();
        static ref REQUIRE_RE: Regex = Regex::new(r#"\brequire\(\s*['"]([^'"]+)['"]\s*\)"#).unwrap();
    }

    let mut found = captures_at(&FROM_RE, content);
    found.extend(captures_at(&DYNAMIC_RE, content));
    found.extend(captures_at(&REQUIRE_RE, content));
    found
}

/// `import a.b` and `from a.b import c` at the start of a line. Relative
/// imports keep their dots; indented imports are not seen.
fn extract_python_imports(content: &str) -> Vec<(usize, String)> {
    lazy_static::lazy_static! {
        static ref IMPORT_RE: Regex = Regex::new(r"(?m)^(?:from|import)\s+([a-zA-Z0-9_.]+)").unwrap();
    }

    captures_at(&IMPORT_RE, content)
}

/// Single `import "a"` statements and every path in `import ( ... )` blocks.
fn extract_go_imports(content: &str) -> Vec<(usize, String)> {
    lazy_static::lazy_static! {
        static ref SINGLE_IMPORT_RE: Regex =
            Regex::new(r#"(?m)^[ \t]*import\s+(?:[\w.]+\s+)?["`]([^"`]+)["`]"#).unwrap();
        static ref IMPORT_BLOCK_RE: Regex = Regex::new(r#"(?s)\bimport\s*\((.*?)\)"#).unwrap();
        static ref BLOCK_ITEM_RE: Regex = Regex::new(r#"(?m)^[ \t]*(?:[\w.]+\s+)?["`]([^"`]+)["`]"#).unwrap();
    }

    let mut found = captures_at(&SINGLE_IMPORT_RE, content);
    for block in IMPORT_BLOCK_RE.captures_iter(content) {
        let Some(body) = block.get(1) else {
            continue;
        };
        found.extend(
            captures_at(&BLOCK_ITEM_RE, body.as_str())
                .into_iter()
                .map(|(offset, path)| (body.start() + offset, path)),
        );
    }
    found
}

/// `use a::b` and `extern crate a`, up to the first brace or glob.
fn extract_rust_imports(content: &str) -> Vec<(usize, String)> {
    lazy_static::lazy_static! {
        static ref USE_RE: Regex = Regex::new(
            r"(?m)^[ \t]*(?:pub(?:\([^)]*\))?\s+)?(?:use|extern\s+crate)\s+((?:::)?[A-Za-z_]\w*(?:::[A-Za-z_]\w*)*)"
        ).unwrap();
    }

    captures_at(&USE_RE, content)
}

fn extract_java_imports(content: &str) -> Vec<(usize, String)> {
    lazy_static::lazy_static! {
        static ref IMPORT_RE: Regex =
            Regex::new(r"(?m)^[ \t]*(?:import|using)\s+(?:static\s+)?([A-Za-z_][\w.]*(?:\.\*)?)\s*;").unwrap();
    }

    captures_at(&IMPORT_RE, content)
}
