//! Scoring and grading for codelens.
//!
//! Calculates a health score (0-100, higher is healthier) by subtracting
//! penalty points for security findings and complexity hotspots.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::analysis::FileAnalysis;
use crate::detect::{ComplexityLevel, Severity};

/// Penalty points per finding.
pub mod points {
    pub const SECURITY_HIGH: i32 = 10;
    pub const SECURITY_MEDIUM: i32 = 5;
    pub const SECURITY_LOW: i32 = 2;
    pub const COMPLEXITY_HIGH: i32 = 5;
    pub const COMPLEXITY_MEDIUM: i32 = 2;
}

/// Default threshold when the configuration doesn't specify one.
pub const DEFAULT_THRESHOLD: i32 = 60;

/// Grade thresholds (minimum score for each grade).
pub mod grades {
    pub const A_PLUS_MIN: i32 = 90;
    pub const A_MIN: i32 = 80;
    pub const B_MIN: i32 = 70;
    pub const C_MIN: i32 = 60;
    pub const D_MIN: i32 = 50;
}

/// The calculated health score.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthScore {
    /// Score from 0-100, higher = healthier
    pub score: i32,
    /// Letter grade: "A+", "A", "B", "C", "D" or "F"
    pub grade: String,
    /// Penalty points by category
    pub breakdown: HashMap<String, i32>,
    /// Whether the check passed (score >= threshold)
    pub passed: bool,
    /// The threshold used
    pub threshold: i32,
}

impl HealthScore {
    /// Get the total penalty before clamping at 0.
    pub fn total_penalty(&self) -> i32 {
        self.breakdown.values().sum()
    }
}

fn security_category(severity: Severity) -> (&'static str, i32) {
    match severity {
        Severity::High => ("security_high", points::SECURITY_HIGH),
        Severity::Medium => ("security_medium", points::SECURITY_MEDIUM),
        Severity::Low => ("security_low", points::SECURITY_LOW),
    }
}

fn complexity_category(level: ComplexityLevel) -> Option<(&'static str, i32)> {
    match level {
        ComplexityLevel::High => Some(("complexity_high", points::COMPLEXITY_HIGH)),
        ComplexityLevel::Medium => Some(("complexity_medium", points::COMPLEXITY_MEDIUM)),
        ComplexityLevel::Low => None,
    }
}

/// Determine the letter grade from a score.
pub fn calculate_grade(score: i32) -> String {
    match score {
        s if s >= grades::A_PLUS_MIN => "A+".to_string(),
        s if s >= grades::A_MIN => "A".to_string(),
        s if s >= grades::B_MIN => "B".to_string(),
        s if s >= grades::C_MIN => "C".to_string(),
        s if s >= grades::D_MIN => "D".to_string(),
        _ => "F".to_string(),
    }
}

/// Calculate the health score over a set of analyzed files.
pub fn calculate(analyses: &[FileAnalysis], threshold: i32) -> HealthScore {
    let mut breakdown: HashMap<String, i32> = HashMap::new();

    for analysis in analyses {
        for issue in &analysis.security {
            let (category, penalty) = security_category(issue.severity);
            *breakdown.entry(category.to_string()).or_insert(0) += penalty;
        }
        if let Some((category, penalty)) = complexity_category(analysis.complexity.level) {
            *breakdown.entry(category.to_string()).or_insert(0) += penalty;
        }
    }

    let penalty: i32 = breakdown.values().sum();
    let score = (100 - penalty).max(0);

    HealthScore {
        score,
        grade: calculate_grade(score),
        breakdown,
        passed: score >= threshold,
        threshold,
    }
}
