//! Command-line interface for codelens.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::analysis::{is_code, AnalysisContext};
use crate::config::{self, Config, DEFAULT_TEMPLATE};
use crate::report;
use crate::score;

/// Exit codes.
pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_FAILED: i32 = 1;
pub const EXIT_ERROR: i32 = 2;

/// Directories never descended into.
const SKIPPED_DIRS: &[&str] = &["node_modules", "vendor", "target", "__pycache__"];

/// Best-effort static analysis for mixed-language repositories.
///
/// Extracts functions, variables, imports and call graphs, scores complexity
/// and flags common security smells. JavaScript and TypeScript are parsed
/// structurally; everything else is matched with per-language patterns.
#[derive(Parser)]
#[command(name = "codelens")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Emit logs as JSON on stderr
    #[arg(long, global = true)]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Analyze a file or directory
    #[command(visible_alias = "scan")]
    Analyze(AnalyzeArgs),
    /// Write the default configuration file
    Init(InitArgs),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Pretty,
    Json,
}

/// Arguments for the analyze command.
#[derive(Parser)]
pub struct AnalyzeArgs {
    /// Path to analyze (file or directory)
    pub path: PathBuf,

    /// Path to configuration YAML file (default: auto-discover)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "pretty")]
    pub format: OutputFormat,

    /// Minimum acceptable health score (exit non-zero below it)
    #[arg(short, long)]
    pub threshold: Option<i32>,
}

/// Arguments for the init command.
#[derive(Parser)]
pub struct InitArgs {
    /// Output file path
    #[arg(short, long, default_value = "codelens.yaml")]
    pub output: PathBuf,
}

/// Collect analyzable files under `root`.
///
/// Skips hidden directories (unless configured), dependency and build
/// directories, excluded globs, non-code files and oversized files.
pub fn collect_files(root: &Path, config: &Config) -> anyhow::Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for entry in WalkDir::new(root)
        .follow_links(true)
        .into_iter()
        .filter_entry(|e| {
            if e.depth() == 0 || !e.file_type().is_dir() {
                return true;
            }
            let name = e.file_name().to_string_lossy();
            if name.starts_with('.') && !config.include_hidden {
                return false;
            }
            !SKIPPED_DIRS.contains(&name.as_ref())
        })
    {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.path();
        let rel = path.strip_prefix(root).unwrap_or(path);
        if config.is_path_excluded(rel) {
            continue;
        }
        let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
        if !is_code(name) {
            continue;
        }
        if entry.metadata()?.len() > config.max_file_bytes {
            tracing::debug!(path = %rel.display(), "skipping oversized file");
            continue;
        }
        files.push(path.to_path_buf());
    }

    files.sort();
    Ok(files)
}

/// Run the analyze command.
pub fn run_analyze(args: &AnalyzeArgs) -> anyhow::Result<i32> {
    // Resolve path
    let abs_path = match args.path.canonicalize() {
        Ok(p) => p,
        Err(e) => {
            eprintln!("Error: cannot access path {:?}: {}", args.path, e);
            return Ok(EXIT_ERROR);
        }
    };

    let cwd = std::env::current_dir()?;
    let (config, config_path) = match config::load(args.config.as_deref(), &cwd) {
        Ok(loaded) => loaded,
        Err(e) => {
            eprintln!("Error: invalid config: {}", e);
            return Ok(EXIT_ERROR);
        }
    };

    let threshold = args
        .threshold
        .or(config.threshold.map(|t| t as i32))
        .unwrap_or(score::DEFAULT_THRESHOLD);
    if !(0..=100).contains(&threshold) {
        eprintln!("Error: invalid threshold {}, must be between 0 and 100", threshold);
        return Ok(EXIT_ERROR);
    }

    // Collect files to analyze
    let (base, files) = if abs_path.is_dir() {
        let files = collect_files(&abs_path, &config)?;
        (abs_path.clone(), files)
    } else {
        let base = abs_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| abs_path.clone());
        (base, vec![abs_path.clone()])
    };

    if files.is_empty() {
        eprintln!("Warning: no files to analyze");
        return Ok(EXIT_SUCCESS);
    }

    tracing::info!(files = files.len(), path = %abs_path.display(), "analyzing");

    let ctx = AnalysisContext::new(&base, &config);
    let analyses = ctx.analyze_files_parallel(&files);
    let health = score::calculate(&analyses, threshold);

    let path_str = args.path.to_string_lossy().to_string();
    let config_str = config_path.map(|p| p.to_string_lossy().to_string());

    match args.format {
        OutputFormat::Json => {
            report::write_json(&path_str, config_str.as_deref(), &analyses, &health)?;
        }
        OutputFormat::Pretty => {
            report::write_pretty(&path_str, config_str.as_deref(), &analyses, &health);
        }
    }

    // Return appropriate exit code
    if health.passed {
        Ok(EXIT_SUCCESS)
    } else {
        Ok(EXIT_FAILED)
    }
}

/// Run the init command.
pub fn run_init(args: &InitArgs) -> anyhow::Result<i32> {
    // Check if output already exists
    if args.output.exists() {
        eprintln!("Error: file already exists: {}", args.output.display());
        eprintln!("Remove it or use --output to specify a different path");
        return Ok(EXIT_ERROR);
    }

    // Create output directory if needed
    if let Some(parent) = args.output.parent() {
        if !parent.as_os_str().is_empty() && parent != Path::new(".") {
            if let Err(e) = std::fs::create_dir_all(parent) {
                eprintln!("Error: failed to create directory: {}", e);
                return Ok(EXIT_ERROR);
            }
        }
    }

    if let Err(e) = std::fs::write(&args.output, DEFAULT_TEMPLATE) {
        eprintln!("Error: failed to write config: {}", e);
        return Ok(EXIT_ERROR);
    }

    println!("Created {}", args.output.display());
    println!();
    println!("Next steps:");
    println!("  1. Edit {} to customize for your project", args.output.display());
    println!("  2. Run: codelens analyze . --config {}", args.output.display());

    Ok(EXIT_SUCCESS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn touch(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn names(root: &Path, files: &[PathBuf]) -> Vec<String> {
        files
            .iter()
            .map(|f| f.strip_prefix(root).unwrap().to_string_lossy().replace('\\', "/"))
            .collect()
    }

    #[test]
    fn test_collect_files_filters() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        touch(root, "src/app.js", "const a = 1;");
        touch(root, "src/util.PY", "def f(): pass");
        touch(root, "README.md", "# readme");
        touch(root, "node_modules/dep/index.js", "x");
        touch(root, ".git/hooks/pre-commit.sh", "x");
        touch(root, "dist/bundle.js", "x");
        touch(root, "big.js", &"x".repeat(100));

        let config = Config {
            excluded_paths: vec!["dist/**".to_string()],
            max_file_bytes: 50,
            ..Config::default()
        };
        let files = collect_files(root, &config).unwrap();
        assert_eq!(names(root, &files), vec!["src/app.js", "src/util.PY"]);
    }

    #[test]
    fn test_collect_files_include_hidden() {
        let temp = TempDir::new().unwrap();
        touch(temp.path(), ".config/setup.sh", "echo hi");
        let config = Config {
            include_hidden: true,
            ..Config::default()
        };
        let files = collect_files(temp.path(), &config).unwrap();
        assert_eq!(names(temp.path(), &files), vec![".config/setup.sh"]);
    }

    #[test]
    fn test_init_writes_template_once() {
        let temp = TempDir::new().unwrap();
        let args = InitArgs {
            output: temp.path().join("nested/codelens.yaml"),
        };
        assert_eq!(run_init(&args).unwrap(), EXIT_SUCCESS);
        let written = fs::read_to_string(&args.output).unwrap();
        assert_eq!(written, DEFAULT_TEMPLATE);
        assert_eq!(run_init(&args).unwrap(), EXIT_ERROR);
    }
}
