//! Fact structures produced by single-file analysis.
//!
//! Field names serialize in camelCase, which is what the rendering layer reads.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Where an extracted entity came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provenance {
    /// Walked from a syntax tree.
    Structural,
    /// Matched by the per-language regex table.
    Pattern,
}

impl fmt::Display for Provenance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Provenance::Structural => write!(f, "structural"),
            Provenance::Pattern => write!(f, "pattern"),
        }
    }
}

/// Shape of a function definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FunctionType {
    Function,
    Arrow,
    Method,
}

impl FunctionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            FunctionType::Function => "function",
            FunctionType::Arrow => "arrow",
            FunctionType::Method => "method",
        }
    }
}

impl fmt::Display for FunctionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReturnType {
    Value,
    Void,
}

impl From<bool> for ReturnType {
    fn from(returns_value: bool) -> Self {
        if returns_value {
            ReturnType::Value
        } else {
            ReturnType::Void
        }
    }
}

/// A location where a known function is invoked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallSite {
    pub line: usize,
    /// Innermost enclosing named function, when it could be determined.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caller: Option<String>,
}

/// All calls to a single function.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallEdge {
    pub total_calls: usize,
    pub call_sites: Vec<CallSite>,
}

impl CallEdge {
    pub fn record(&mut self, line: usize, caller: Option<String>) {
        self.total_calls += 1;
        self.call_sites.push(CallSite { line, caller });
    }
}

/// Callee name -> calls.
pub type CallMap = BTreeMap<String, CallEdge>;

/// References to a single variable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageEntry {
    pub total: usize,
    pub lines: Vec<usize>,
}

/// Variable name -> references.
pub type UsageMap = BTreeMap<String, UsageEntry>;

/// A function, arrow function, or method definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FunctionDef {
    pub name: String,
    pub file: String,
    /// Line number (1-indexed).
    pub line: usize,
    /// Verbatim source lines of the definition.
    pub code: String,
    #[serde(rename = "type")]
    pub kind: FunctionType,
    pub is_top_level: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_class_method: Option<bool>,
    /// Rendered parameter descriptors. Empty for pattern-derived definitions.
    pub params: Vec<String>,
    pub returns_value: bool,
    pub return_type: ReturnType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_calls: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub call_sites: Option<Vec<CallSite>>,
    pub source: Provenance,
}

/// Declaration keyword of a variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VariableKind {
    Const,
    Let,
    Var,
    Unknown,
}

impl VariableKind {
    pub fn parse(keyword: &str) -> Self {
        match keyword {
            "const" => VariableKind::Const,
            "let" => VariableKind::Let,
            "var" => VariableKind::Var,
            _ => VariableKind::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            VariableKind::Const => "const",
            VariableKind::Let => "let",
            VariableKind::Var => "var",
            VariableKind::Unknown => "unknown",
        }
    }
}

/// Heuristic tag for the initializer of a variable, one level deep.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueType {
    String,
    Number,
    Boolean,
    BigInt,
    /// Object literals, `null` and regular expression literals.
    Object,
    Array,
    Function,
    Call,
    Instance,
}

impl ValueType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ValueType::String => "string",
            ValueType::Number => "number",
            ValueType::Boolean => "boolean",
            ValueType::BigInt => "bigint",
            ValueType::Object => "object",
            ValueType::Array => "array",
            ValueType::Function => "function",
            ValueType::Call => "call",
            ValueType::Instance => "instance",
        }
    }
}

/// A variable declaration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VariableDef {
    pub name: String,
    pub file: String,
    pub line: usize,
    pub kind: VariableKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value_type: Option<ValueType>,
    pub is_top_level: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_usages: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage_lines: Option<Vec<usize>>,
    pub source: Provenance,
}

/// Join source lines `start..=end` (1-indexed), clamped to the file.
///
/// When no end line is known the slice covers the next ten lines.
pub fn code_slice(lines: &[&str], start: usize, end: Option<usize>) -> String {
    let from = start.saturating_sub(1).min(lines.len());
    let to = end.unwrap_or(start + 10).min(lines.len()).max(from);
    lines[from..to].join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_slice_clamps() {
        let lines = vec!["a", "b", "c"];
        assert_eq!(code_slice(&lines, 2, Some(3)), "b\nc");
        assert_eq!(code_slice(&lines, 2, Some(99)), "b\nc");
        assert_eq!(code_slice(&lines, 3, None), "c");
        assert_eq!(code_slice(&lines, 1, Some(1)), "a");
    }

    #[test]
    fn test_call_edge_record() {
        let mut edge = CallEdge::default();
        edge.record(3, Some("main".to_string()));
        edge.record(7, None);
        assert_eq!(edge.total_calls, 2);
        assert_eq!(edge.call_sites[0].caller.as_deref(), Some("main"));
        assert_eq!(edge.call_sites[1].line, 7);
    }

    #[test]
    fn test_function_def_serializes_camel_case() {
        let def = FunctionDef {
            name: "add".to_string(),
            file: "f.js".to_string(),
            line: 1,
            code: "function add(a, b) {}".to_string(),
            kind: FunctionType::Function,
            is_top_level: true,
            is_class_method: None,
            params: vec!["a".to_string(), "b".to_string()],
            returns_value: false,
            return_type: ReturnType::Void,
            total_calls: None,
            call_sites: None,
            source: Provenance::Structural,
        };
        let json = serde_json::to_value(&def).unwrap();
        assert_eq!(json["type"], "function");
        assert_eq!(json["isTopLevel"], true);
        assert_eq!(json["returnType"], "void");
        assert_eq!(json["source"], "structural");
        assert!(json.get("isClassMethod").is_none());
        assert!(json.get("totalCalls").is_none());
    }
}
