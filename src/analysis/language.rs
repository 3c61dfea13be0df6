//! Filename classification: which files are source code, and which language
//! family drives extraction for them.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Extensions recognized as source code (matched case-insensitively).
pub const CODE_EXTENSIONS: &[&str] = &[
    ".js", ".jsx", ".ts", ".tsx", ".mjs", ".cjs", ".py", ".java", ".go", ".rb", ".php", ".vue",
    ".svelte", ".rs", ".c", ".cpp", ".cc", ".h", ".hpp", ".cs", ".swift", ".kt", ".kts",
    ".scala", ".clj", ".ex", ".exs", ".erl", ".hs", ".lua", ".r", ".jl", ".dart", ".elm", ".fs",
    ".fsx", ".ml", ".pl", ".pm", ".sh", ".bash", ".zsh", ".fish", ".ps1", ".psm1", ".groovy",
    ".gradle",
];

/// Check whether a filename looks like source code.
pub fn is_code(filename: &str) -> bool {
    let lower = filename.to_lowercase();
    CODE_EXTENSIONS.iter().any(|ext| lower.ends_with(ext))
}

/// Coarse language family, used to select an extraction strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    JavaScript,
    /// ECMAScript with optional static type annotations.
    TypeScript,
    Python,
    Go,
    /// Java and C#.
    Java,
    Rust,
    Ruby,
    Php,
    /// C and C++.
    CFamily,
    Other,
}

impl Language {
    /// Derive the language family from a filename suffix.
    pub fn from_filename(filename: &str) -> Self {
        let lower = filename.to_lowercase();
        let has = |exts: &[&str]| exts.iter().any(|ext| lower.ends_with(ext));

        if has(&[".js", ".jsx", ".mjs", ".cjs"]) {
            Language::JavaScript
        } else if has(&[".ts", ".tsx"]) {
            Language::TypeScript
        } else if has(&[".py"]) {
            Language::Python
        } else if has(&[".go"]) {
            Language::Go
        } else if has(&[".java", ".cs"]) {
            Language::Java
        } else if has(&[".rs"]) {
            Language::Rust
        } else if has(&[".rb"]) {
            Language::Ruby
        } else if has(&[".php"]) {
            Language::Php
        } else if has(&[".c", ".cpp", ".cc", ".h", ".hpp"]) {
            Language::CFamily
        } else {
            Language::Other
        }
    }

    /// ECMAScript family (with or without type annotations).
    pub fn is_ecmascript(&self) -> bool {
        matches!(self, Language::JavaScript | Language::TypeScript)
    }

    /// Whether type syntax must be erased before structural parsing.
    pub fn needs_sanitizing(&self) -> bool {
        matches!(self, Language::TypeScript)
    }

    /// Families where indentation says nothing about nesting.
    pub fn is_indentation_insignificant(&self) -> bool {
        matches!(self, Language::Go | Language::CFamily)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Language::JavaScript => "javascript",
            Language::TypeScript => "typescript",
            Language::Python => "python",
            Language::Go => "go",
            Language::Java => "java",
            Language::Rust => "rust",
            Language::Ruby => "ruby",
            Language::Php => "php",
            Language::CFamily => "cfamily",
            Language::Other => "other",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
