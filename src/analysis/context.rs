//! Whole-file analysis and the file-reading context around it.
//!
//! [`analyze_source`] runs every pass over one file's content, parsing it
//! at most once. [`AnalysisContext`] adds:
//! - Reading files relative to a base directory
//! - Size limits from the configuration
//! - Caching of results
//! - Parallel analysis of independent files

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use serde::Serialize;
use tracing::debug;

use super::calls::{apply_calls, calls_from};
use super::extract::{functions_from, strict_parse, variables_from};
use super::facts::{CallMap, FunctionDef, Provenance, UsageMap, VariableDef};
use super::language::Language;
use super::usages::{apply_usages, find_variable_usages};
use crate::config::Config;
use crate::detect::{
    detect_imports, detect_security, ComplexityScore, ComplexityThresholds, SecurityIssue,
};

/// Knobs for a single-file analysis.
#[derive(Debug, Clone)]
pub struct AnalysisOptions {
    pub complexity: ComplexityThresholds,
    pub security: bool,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self {
            complexity: ComplexityThresholds::default(),
            security: true,
        }
    }
}

impl From<&Config> for AnalysisOptions {
    fn from(config: &Config) -> Self {
        Self {
            complexity: config.complexity,
            security: config.security.enabled,
        }
    }
}

/// Everything extracted from one file.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileAnalysis {
    pub file: String,
    pub language: Language,
    /// Which extraction tier produced the definitions.
    pub source: Provenance,
    /// Set when the structural parse failed and extraction degraded.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parse_error: Option<String>,
    pub functions: Vec<FunctionDef>,
    pub variables: Vec<VariableDef>,
    pub imports: Vec<String>,
    pub calls: CallMap,
    pub usages: UsageMap,
    pub complexity: ComplexityScore,
    pub security: Vec<SecurityIssue>,
}

impl FileAnalysis {
    pub fn is_degraded(&self) -> bool {
        self.parse_error.is_some()
    }
}

/// Analyze one file's content with default options.
pub fn analyze_source(content: &str, filename: &str) -> FileAnalysis {
    analyze_source_with(content, filename, &AnalysisOptions::default())
}

/// Analyze one file's content.
pub fn analyze_source_with(
    content: &str,
    filename: &str,
    options: &AnalysisOptions,
) -> FileAnalysis {
    let language = Language::from_filename(filename);
    let parsed = strict_parse(content, language);

    let functions = functions_from(&parsed, content, filename, language);
    let variables = variables_from(&parsed, content, filename);

    let mut defs = functions.items;
    let calls = calls_from(&parsed, content, &defs);
    apply_calls(&mut defs, &calls);

    let mut vars = variables.items;
    let usages = find_variable_usages(content, &vars);
    apply_usages(&mut vars, &usages);

    let security = if options.security {
        detect_security(content, filename)
    } else {
        Vec::new()
    };

    let analysis = FileAnalysis {
        file: filename.to_string(),
        language,
        source: functions.source,
        parse_error: functions.parse_error,
        functions: defs,
        variables: vars,
        imports: detect_imports(content, filename),
        calls,
        usages,
        complexity: ComplexityScore::of(content, &options.complexity),
        security,
    };

    debug!(
        file = filename,
        language = %language,
        source = %analysis.source,
        functions = analysis.functions.len(),
        variables = analysis.variables.len(),
        complexity = analysis.complexity.score,
        issues = analysis.security.len(),
        "analyzed file"
    );

    analysis
}

/// Analysis context for a set of files.
///
/// Caches results so a file analyzed twice during a run is read once.
pub struct AnalysisContext {
    /// Base directory for relative path resolution.
    base_dir: PathBuf,
    options: AnalysisOptions,
    max_file_bytes: u64,
    /// Cached results, keyed by absolute path.
    cache: RwLock<HashMap<PathBuf, FileAnalysis>>,
}

impl AnalysisContext {
    /// Create a new analysis context.
    pub fn new<P: AsRef<Path>>(base_dir: P, config: &Config) -> Self {
        Self {
            base_dir: base_dir.as_ref().to_path_buf(),
            options: AnalysisOptions::from(config),
            max_file_bytes: config.max_file_bytes,
            cache: RwLock::new(HashMap::new()),
        }
    }

    /// Get the base directory.
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base_dir.join(path)
        }
    }

    fn relative(&self, abs_path: &Path) -> String {
        abs_path
            .strip_prefix(&self.base_dir)
            .unwrap_or(abs_path)
            .to_string_lossy()
            .to_string()
    }

    /// Analyze a file and cache the results.
    ///
    /// Returns cached results if already analyzed. Fails for unreadable,
    /// non-UTF-8 or oversized files.
    pub fn analyze_file<P: AsRef<Path>>(&self, path: P) -> anyhow::Result<FileAnalysis> {
        let abs_path = self.resolve(path.as_ref());

        // Check cache first
        {
            let cache = self
                .cache
                .read()
                .map_err(|_| anyhow::anyhow!("analysis cache poisoned"))?;
            if let Some(analysis) = cache.get(&abs_path) {
                return Ok(analysis.clone());
            }
        }

        let rel_path = self.relative(&abs_path);
        let size = fs::metadata(&abs_path)?.len();
        if size > self.max_file_bytes {
            anyhow::bail!(
                "{} is {} bytes, larger than max_file_bytes ({})",
                rel_path,
                size,
                self.max_file_bytes
            );
        }

        let content = fs::read_to_string(&abs_path)
            .map_err(|e| anyhow::anyhow!("reading {}: {}", rel_path, e))?;
        let analysis = analyze_source_with(&content, &rel_path, &self.options);

        {
            let mut cache = self
                .cache
                .write()
                .map_err(|_| anyhow::anyhow!("analysis cache poisoned"))?;
            cache.insert(abs_path, analysis.clone());
        }

        Ok(analysis)
    }

    /// Analyze multiple files in parallel.
    ///
    /// Uses rayon for parallel processing. Files that fail are logged and
    /// skipped. Results are sorted by path.
    pub fn analyze_files_parallel(&self, paths: &[PathBuf]) -> Vec<FileAnalysis> {
        use rayon::prelude::*;

        let results: Vec<_> = paths
            .par_iter()
            .map(|p| (p, self.analyze_file(p)))
            .collect();

        let mut analyses = Vec::new();
        for (path, result) in results {
            match result {
                Ok(analysis) => analyses.push(analysis),
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "skipping file");
                }
            }
        }

        // Sort by path for deterministic ordering
        analyses.sort_by(|a, b| a.file.cmp(&b.file));
        analyses
    }

    /// Get cached results for a file.
    pub fn cached<P: AsRef<Path>>(&self, path: P) -> Option<FileAnalysis> {
        let abs_path = self.resolve(path.as_ref());
        self.cache.read().ok()?.get(&abs_path).cloned()
    }
}
