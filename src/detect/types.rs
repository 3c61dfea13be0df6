//! Core types for detection results.

use serde::{Deserialize, Serialize};

/// Severity levels for security issues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    High,
    Medium,
    Low,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::High => write!(f, "high"),
            Severity::Medium => write!(f, "medium"),
            Severity::Low => write!(f, "low"),
        }
    }
}

impl std::str::FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "high" => Ok(Severity::High),
            "medium" => Ok(Severity::Medium),
            "low" => Ok(Severity::Low),
            _ => Err(format!("unknown severity: {}", s)),
        }
    }
}

/// The heuristic that produced a security issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SecurityRule {
    #[serde(rename = "hardcoded_secret")]
    HardcodedSecret,
    #[serde(rename = "sql_injection")]
    SqlInjection,
    #[serde(rename = "xss")]
    Xss,
    #[serde(rename = "dynamic_code_execution")]
    DynamicCodeExecution,
}

impl SecurityRule {
    pub fn as_str(&self) -> &'static str {
        match self {
            SecurityRule::HardcodedSecret => "hardcoded_secret",
            SecurityRule::SqlInjection => "sql_injection",
            SecurityRule::Xss => "xss",
            SecurityRule::DynamicCodeExecution => "dynamic_code_execution",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            SecurityRule::HardcodedSecret => "Hardcoded Secret",
            SecurityRule::SqlInjection => "SQL Injection Risk",
            SecurityRule::Xss => "XSS Risk",
            SecurityRule::DynamicCodeExecution => "Dynamic Code Execution",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            SecurityRule::HardcodedSecret => "Potential hardcoded credential detected.",
            SecurityRule::SqlInjection => "Potential SQL injection via string concatenation.",
            SecurityRule::Xss => "Usage of dangerouslySetInnerHTML can lead to XSS.",
            SecurityRule::DynamicCodeExecution => "Use of eval() or new Function() is dangerous.",
        }
    }

    pub fn severity(&self) -> Severity {
        match self {
            SecurityRule::Xss => Severity::Medium,
            _ => Severity::High,
        }
    }
}

impl std::fmt::Display for SecurityRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single heuristic security finding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecurityIssue {
    pub severity: Severity,
    pub title: String,
    pub file: String,
    /// Same as `file`; kept for consumers that key on `path`.
    pub path: String,
    pub line: usize,
    pub desc: String,
    /// The offending line, trimmed.
    pub code: String,
}

impl SecurityIssue {
    pub fn new(rule: SecurityRule, file: &str, line: usize, code: &str) -> Self {
        Self {
            severity: rule.severity(),
            title: rule.title().to_string(),
            file: file.to_string(),
            path: file.to_string(),
            line,
            desc: rule.description().to_string(),
            code: code.trim().to_string(),
        }
    }
}
