//! Text-level cyclomatic complexity.
//!
//! Decision points are counted over the raw text of a whole file, so the
//! score is language-agnostic and also counts keywords inside strings and
//! comments.
//!
//! Complexity is calculated as:
//! - 0 for empty content, otherwise start at 1
//! - Add 1 for each: if, else if, while, for, case, catch, ?:, &&, ||

use regex::Regex;
use serde::{Deserialize, Serialize};

lazy_static::lazy_static! {
    static ref IF_RE: Regex = Regex::new(r"\bif\s*\(").unwrap();
    static ref ELSE_IF_RE: Regex = Regex::new(r"\belse\s+if\s*\(").unwrap();
    static ref WHILE_RE: Regex = Regex::new(r"\bwhile\s*\(").unwrap();
    static ref FOR_RE: Regex = Regex::new(r"\bfor\s*\(").unwrap();
    static ref CASE_RE: Regex = Regex::new(r"\bcase\s+").unwrap();
    static ref CATCH_RE: Regex = Regex::new(r"\bcatch\s*\(").unwrap();
    /// `cond ? a : b` on a single line.
    static ref TERNARY_RE: Regex = Regex::new(r"\?\s*[^:\n]+\s*:").unwrap();
    static ref AND_RE: Regex = Regex::new(r"&&").unwrap();
    static ref OR_RE: Regex = Regex::new(r"\|\|").unwrap();
}

/// Decision-point counts for a piece of source text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BranchCounts {
    /// `if (` that is not part of an `else if (`.
    pub if_count: usize,
    pub else_if_count: usize,
    /// `while (` and `for (`.
    pub loop_count: usize,
    pub case_count: usize,
    pub catch_count: usize,
    pub ternary_count: usize,
    pub and_count: usize,
    pub or_count: usize,
}

impl BranchCounts {
    pub fn scan(content: &str) -> Self {
        let else_if_count = ELSE_IF_RE.find_iter(content).count();
        Self {
            if_count: IF_RE.find_iter(content).count().saturating_sub(else_if_count),
            else_if_count,
            loop_count: WHILE_RE.find_iter(content).count() + FOR_RE.find_iter(content).count(),
            case_count: CASE_RE.find_iter(content).count(),
            catch_count: CATCH_RE.find_iter(content).count(),
            ternary_count: TERNARY_RE.find_iter(content).count(),
            and_count: AND_RE.find_iter(content).count(),
            or_count: OR_RE.find_iter(content).count(),
        }
    }

    pub fn decision_points(&self) -> usize {
        self.if_count
            + self.else_if_count
            + self.loop_count
            + self.case_count
            + self.catch_count
            + self.ternary_count
            + self.and_count
            + self.or_count
    }

    /// CC = 1 + decision_points
    pub fn cyclomatic_complexity(&self) -> i32 {
        1 + self.decision_points() as i32
    }
}

/// Heuristic complexity of a whole file.
pub fn calc_complexity(content: &str) -> i32 {
    if content.is_empty() {
        return 0;
    }
    BranchCounts::scan(content).cyclomatic_complexity()
}

/// Scores above `medium` are medium, scores above `high` are high.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComplexityThresholds {
    pub medium: i32,
    pub high: i32,
}

impl Default for ComplexityThresholds {
    fn default() -> Self {
        Self {
            medium: 10,
            high: 20,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComplexityLevel {
    Low,
    Medium,
    High,
}

impl ComplexityLevel {
    pub fn classify(score: i32, thresholds: &ComplexityThresholds) -> Self {
        if score > thresholds.high {
            ComplexityLevel::High
        } else if score > thresholds.medium {
            ComplexityLevel::Medium
        } else {
            ComplexityLevel::Low
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ComplexityLevel::Low => "low",
            ComplexityLevel::Medium => "medium",
            ComplexityLevel::High => "high",
        }
    }
}

impl std::fmt::Display for ComplexityLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A file's complexity score and its level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComplexityScore {
    pub score: i32,
    pub level: ComplexityLevel,
}

impl ComplexityScore {
    pub fn of(content: &str, thresholds: &ComplexityThresholds) -> Self {
        let score = calc_complexity(content);
        Self {
            score,
            level: ComplexityLevel::classify(score, thresholds),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_content_is_zero() {
        assert_eq!(calc_complexity(""), 0);
    }

    #[test]
    fn test_straight_line_code_is_one() {
        assert_eq!(calc_complexity("const a = 1;\nconsole.log(a);\n"), 1);
    }

    #[test]
    fn test_else_if_counts_once() {
        assert_eq!(calc_complexity("if(a){} else if(b){} while(c){}"), 4);
        let counts = BranchCounts::scan("if(a){} else if(b){} while(c){}");
        assert_eq!(counts.if_count, 1);
        assert_eq!(counts.else_if_count, 1);
        assert_eq!(counts.loop_count, 1);
    }

    #[test]
    fn test_all_decision_points() {
        let src = r#"
for (let i = 0; i < n; i++) {
  switch (x) {
    case 1: break;
    case 2: break;
  }
}
try { run(); } catch (e) {}
const y = ok ? 1 : 2;
if (a && b || c) {}
"#;
        let counts = BranchCounts::scan(src);
        assert_eq!(counts.loop_count, 1);
        assert_eq!(counts.case_count, 2);
        assert_eq!(counts.catch_count, 1);
        assert_eq!(counts.ternary_count, 1);
        assert_eq!(counts.if_count, 1);
        assert_eq!(counts.and_count, 1);
        assert_eq!(counts.or_count, 1);
        assert_eq!(calc_complexity(src), 9);
    }

    #[test]
    fn test_identifiers_containing_keywords() {
        assert_eq!(calc_complexity("notify(x); before(y); showcase(z);"), 1);
    }

    #[test]
    fn test_classify() {
        let t = ComplexityThresholds::default();
        assert_eq!(ComplexityLevel::classify(10, &t), ComplexityLevel::Low);
        assert_eq!(ComplexityLevel::classify(11, &t), ComplexityLevel::Medium);
        assert_eq!(ComplexityLevel::classify(20, &t), ComplexityLevel::Medium);
        assert_eq!(ComplexityLevel::classify(21, &t), ComplexityLevel::High);
    }

    #[test]
    fn test_score_of() {
        let t = ComplexityThresholds { medium: 1, high: 3 };
        let score = ComplexityScore::of("if (a) {} if (b) {}", &t);
        assert_eq!(score.score, 3);
        assert_eq!(score.level, ComplexityLevel::Medium);
    }
}
