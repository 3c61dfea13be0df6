//! Output formatting for codelens results.
//!
//! Supports two output formats:
//! - Pretty: colored terminal output for human readability
//! - JSON: structured output for programmatic consumption

use colored::*;
use serde::Serialize;

use crate::analysis::FileAnalysis;
use crate::detect::{ComplexityLevel, SecurityIssue, Severity};
use crate::score::HealthScore;

// =============================================================================
// JSON Format
// =============================================================================

/// JSON report structure.
#[derive(Serialize)]
pub struct JsonReport<'a> {
    pub version: String,
    pub path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config: Option<String>,
    pub score: i32,
    pub grade: String,
    pub threshold: i32,
    pub passed: bool,
    pub files_scanned: usize,
    pub totals: Totals,
    pub hotspots: Vec<Hotspot>,
    /// Files whose structural parse failed and fell back to pattern extraction.
    pub degraded: Vec<String>,
    pub breakdown: Vec<BreakdownEntry>,
    pub files: &'a [FileAnalysis],
}

/// Counts across every scanned file.
#[derive(Debug, Default, PartialEq, Eq, Serialize)]
pub struct Totals {
    pub functions: usize,
    pub variables: usize,
    pub imports: usize,
    pub calls: usize,
    pub security_issues: usize,
}

/// A file whose complexity is above the medium threshold.
#[derive(Debug, PartialEq, Eq, Serialize)]
pub struct Hotspot {
    pub file: String,
    pub score: i32,
    pub level: ComplexityLevel,
}

/// Breakdown entry for score details.
#[derive(Debug, PartialEq, Eq, Serialize)]
pub struct BreakdownEntry {
    pub category: String,
    pub points: i32,
}

/// Build the JSON report without printing it.
pub fn build_json_report<'a>(
    path: &str,
    config_path: Option<&str>,
    analyses: &'a [FileAnalysis],
    score: &HealthScore,
) -> JsonReport<'a> {
    JsonReport {
        version: env!("CARGO_PKG_VERSION").to_string(),
        path: path.to_string(),
        config: config_path.map(str::to_string),
        score: score.score,
        grade: score.grade.clone(),
        threshold: score.threshold,
        passed: score.passed,
        files_scanned: analyses.len(),
        totals: totals(analyses),
        hotspots: hotspots(analyses),
        degraded: analyses
            .iter()
            .filter(|a| a.is_degraded())
            .map(|a| a.file.clone())
            .collect(),
        breakdown: sorted_breakdown(score),
        files: analyses,
    }
}

/// Write results in JSON format.
pub fn write_json(
    path: &str,
    config_path: Option<&str>,
    analyses: &[FileAnalysis],
    score: &HealthScore,
) -> anyhow::Result<()> {
    let report = build_json_report(path, config_path, analyses, score);
    let json = serde_json::to_string_pretty(&report)?;
    println!("{}", json);
    Ok(())
}

pub fn totals(analyses: &[FileAnalysis]) -> Totals {
    analyses.iter().fold(Totals::default(), |mut t, a| {
        t.functions += a.functions.len();
        t.variables += a.variables.len();
        t.imports += a.imports.len();
        t.calls += a.calls.values().map(|e| e.total_calls).sum::<usize>();
        t.security_issues += a.security.len();
        t
    })
}

/// Files above the medium complexity threshold, most complex first.
pub fn hotspots(analyses: &[FileAnalysis]) -> Vec<Hotspot> {
    let mut spots: Vec<Hotspot> = analyses
        .iter()
        .filter(|a| a.complexity.level != ComplexityLevel::Low)
        .map(|a| Hotspot {
            file: a.file.clone(),
            score: a.complexity.score,
            level: a.complexity.level,
        })
        .collect();
    spots.sort_by(|a, b| b.score.cmp(&a.score).then_with(|| a.file.cmp(&b.file)));
    spots
}

/// Categories by points descending.
fn sorted_breakdown(score: &HealthScore) -> Vec<BreakdownEntry> {
    let mut entries: Vec<BreakdownEntry> = score
        .breakdown
        .iter()
        .map(|(category, points)| BreakdownEntry {
            category: category.clone(),
            points: *points,
        })
        .collect();
    entries.sort_by(|a, b| b.points.cmp(&a.points).then_with(|| a.category.cmp(&b.category)));
    entries
}

// =============================================================================
// Pretty Format
// =============================================================================

/// Write results in colored terminal format.
pub fn write_pretty(
    path: &str,
    config_path: Option<&str>,
    analyses: &[FileAnalysis],
    score: &HealthScore,
) {
    // Header
    println!();
    print!("  ");
    print!("{}", "codelens".cyan().bold());
    println!(" v{}", env!("CARGO_PKG_VERSION"));
    println!();

    // Scan info
    print!("  {}", "Scanning: ".dimmed());
    println!("{}", path);
    if let Some(config) = config_path {
        print!("  {}", "Config:   ".dimmed());
        println!("{}", config);
    }
    println!();

    write_result_summary(score, analyses);
    println!();

    let spots = hotspots(analyses);
    if !spots.is_empty() {
        write_hotspots(&spots);
        println!();
    }

    let issues: Vec<&SecurityIssue> = analyses.iter().flat_map(|a| &a.security).collect();
    if !issues.is_empty() {
        write_security_issues(&issues);
        println!();
    }

    let degraded: Vec<&FileAnalysis> = analyses.iter().filter(|a| a.is_degraded()).collect();
    if !degraded.is_empty() {
        write_degraded(&degraded);
        println!();
    }

    if !score.breakdown.is_empty() {
        write_breakdown(score);
        println!();
    }

    write_final_status(score);
    println!();
}

fn write_result_summary(score: &HealthScore, analyses: &[FileAnalysis]) {
    if score.passed {
        print!("  {}", "✓ PASS".green());
    } else {
        print!("  {}", "✗ FAIL".red());
    }

    print!("  Health: ");
    write_colored_score(score.score);
    print!("  Grade: ");
    write_colored_grade(&score.grade);
    println!();

    let t = totals(analyses);
    println!(
        "  {}",
        format!(
            "{} files, {} functions, {} variables, {} imports, {} calls",
            analyses.len(),
            t.functions,
            t.variables,
            t.imports,
            t.calls
        )
        .dimmed()
    );
}

fn write_colored_score(s: i32) {
    match s {
        s if s >= 80 => print!("{}", s.to_string().green()),
        s if s >= 60 => print!("{}", s.to_string().blue()),
        s if s >= 40 => print!("{}", s.to_string().yellow()),
        _ => print!("{}", s.to_string().red()),
    }
}

fn write_colored_grade(grade: &str) {
    match grade {
        "A+" => print!("{}", grade.green().bold()),
        "A" | "B" => print!("{}", grade.green()),
        "C" => print!("{}", grade.yellow()),
        "D" => print!("{}", grade.yellow().bold()),
        _ => print!("{}", grade.red()),
    }
}

fn write_hotspots(spots: &[Hotspot]) {
    println!("  {} ({}):", "Complexity hotspots".bold(), spots.len());
    println!();

    for spot in spots {
        let level = match spot.level {
            ComplexityLevel::High => "HIGH".red(),
            _ => "MED ".yellow(),
        };
        println!("    {}  {:>4}  {}", level, spot.score, spot.file.blue());
    }
}

fn write_security_issues(issues: &[&SecurityIssue]) {
    println!("  {} ({}):", "Security".bold(), issues.len());
    println!();

    for issue in issues {
        write_severity_tag(&issue.severity);
        print!("   ");
        print!("{:<24}", issue.title.dimmed());
        print!("{}", issue.file.blue());
        print!("{}", format!(":{}", issue.line).dimmed());
        println!();

        // Evidence on next line, indented
        println!("            {}", issue.code);
        println!();
    }
}

fn write_severity_tag(severity: &Severity) {
    match severity {
        Severity::High => print!("    {} ", "HIGH".red()),
        Severity::Medium => print!("    {} ", "MED ".yellow()),
        Severity::Low => print!("    {} ", "LOW ".blue()),
    }
}

fn write_degraded(degraded: &[&FileAnalysis]) {
    println!(
        "  {} ({}):",
        "Pattern fallback".dimmed(),
        degraded.len()
    );
    for analysis in degraded {
        let reason = analysis.parse_error.as_deref().unwrap_or("parse failed");
        println!("    {}  {}", analysis.file.blue(), reason.dimmed());
    }
}

fn write_breakdown(score: &HealthScore) {
    println!("  {}", "Breakdown:".bold());

    for entry in sorted_breakdown(score) {
        println!("    {:<20} -{:>3} pts", entry.category, entry.points);
    }
}

fn write_final_status(score: &HealthScore) {
    print!("  {}", format!("Threshold: {}", score.threshold).dimmed());
    print!("  Score: ");
    write_colored_score(score.score);
    print!("  ");

    if score.passed {
        print!("{}", "PASSED".green());
    } else {
        print!("{}", "FAILED".red());
    }
    println!();
}
