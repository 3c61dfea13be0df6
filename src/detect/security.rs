//! Line-level security heuristics.
//!
//! Each line is checked against every rule independently, so a single line
//! can produce several issues. Matches inside strings and comments count.

use regex::Regex;

use super::types::{SecurityIssue, SecurityRule};

lazy_static::lazy_static! {
    static ref SECRET_RE: Regex = Regex::new(
        r#"(?i)(?:password|passwd|pwd|secret|api_key|apikey|token|auth)\s*[=:]\s*['"][^'"]{8,}['"]"#
    ).unwrap();
    /// Lines reading from the environment or a config object are not literals.
    static ref SECRET_SOURCE_RE: Regex = Regex::new(r"process\.env|config\.").unwrap();
    static ref SQL_RE: Regex =
        Regex::new(r"(?i)(?:query|execute|select|insert|update|delete).*(?:\+|\$\{)").unwrap();
    static ref XSS_RE: Regex = Regex::new(r"dangerouslySetInnerHTML").unwrap();
    static ref EVAL_RE: Regex = Regex::new(r"\beval\s*\(|\bnew\s+Function\s*\(").unwrap();
}

/// Scan `content` for hardcoded secrets, SQL built by concatenation, raw HTML
/// injection and dynamic code execution.
pub fn detect_security(content: &str, filename: &str) -> Vec<SecurityIssue> {
    let mut issues = Vec::new();

    for (idx, line) in content.split('\n').enumerate() {
        let line_num = idx + 1;
        for rule in matching_rules(line) {
            issues.push(SecurityIssue::new(rule, filename, line_num, line));
        }
    }

    issues
}

fn matching_rules(line: &str) -> Vec<SecurityRule> {
    let mut rules = Vec::new();
    if SECRET_RE.is_match(line) && !SECRET_SOURCE_RE.is_match(line) {
        rules.push(SecurityRule::HardcodedSecret);
    }
    if SQL_RE.is_match(line) {
        rules.push(SecurityRule::SqlInjection);
    }
    if XSS_RE.is_match(line) {
        rules.push(SecurityRule::Xss);
    }
    if EVAL_RE.is_match(line) {
        rules.push(SecurityRule::DynamicCodeExecution);
    }
    rules
}
