use crate::commit::{commit, CommitOptions, CommitOutcome};
use crate::constants::{BACKUP_SUFFIX, PROGRESS_BAR_TEMPLATE};
use crate::eligibility::{check_eligibility, Eligibility, SkipReason};
use crate::error::{OptimizeError, Result};
use crate::inspect::inspect_size;
use crate::profile::{ExtensionPolicy, OptimizationProfile};
use crate::report::{BatchSummary, OptimizationResult, Outcome};
use crate::transform::{transform, Codec};
use glob::glob;
use indicatif::{ProgressBar, ProgressStyle};
use log::{error, info, warn};
use rayon::prelude::*;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;
use walkdir::WalkDir;

/// Everything one run needs. Built once by the caller and never mutated.
#[derive(Debug, Clone)]
pub struct BatchConfig {
    /// Files, directories or glob patterns, in the order given.
    pub inputs: Vec<String>,
    pub profile: OptimizationProfile,
    pub backup: bool,
    pub overwrite_backup: bool,
    pub dry_run: bool,
    /// 1 runs sequentially; 0 means one worker per CPU.
    pub jobs: usize,
    pub show_progress: bool,
}

impl BatchConfig {
    /// Defaults for `profile`: its backup setting, backups overwritten,
    /// sequential, no progress bar.
    pub fn new(inputs: Vec<String>, profile: OptimizationProfile) -> Self {
        Self {
            inputs,
            backup: profile.backup,
            profile,
            overwrite_backup: true,
            dry_run: false,
            jobs: 1,
            show_progress: false,
        }
    }

    pub fn commit_options(&self) -> CommitOptions {
        CommitOptions {
            backup: self.backup,
            overwrite_backup: self.overwrite_backup,
            dry_run: self.dry_run,
        }
    }

    pub fn worker_count(&self) -> usize {
        match self.jobs {
            0 => num_cpus::get(),
            n => n,
        }
    }
}

/// One collected input: an existing file, or a path that turned out not to
/// exist (reported as a skip rather than aborting the run).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchInput {
    File(PathBuf),
    Missing(PathBuf),
}

impl BatchInput {
    pub fn path(&self) -> &Path {
        match self {
            BatchInput::File(path) | BatchInput::Missing(path) => path,
        }
    }
}

/// Expands the raw inputs into the ordered list of files to process.
///
/// Directories are listed one level deep, sorted by name, keeping only the
/// extensions `policy` recognizes. Explicit files are kept whatever their
/// extension so the eligibility filter can report them. A path seen twice is
/// processed once.
pub fn collect_inputs(inputs: &[String], policy: ExtensionPolicy) -> Result<Vec<BatchInput>> {
    let mut collected = Vec::new();
    let mut any_found = false;

    for input in inputs {
        let path = Path::new(input);

        if path.is_dir() {
            any_found = true;
            collected.extend(list_directory(path, policy)?.into_iter().map(BatchInput::File));
        } else if path.is_file() {
            any_found = true;
            collected.push(BatchInput::File(path.to_path_buf()));
        } else if is_glob_pattern(input) {
            let matches = expand_glob(input, policy);
            if matches.is_empty() {
                warn!("⚠️  No files match {}", input);
                collected.push(BatchInput::Missing(path.to_path_buf()));
            } else {
                any_found = true;
                collected.extend(matches.into_iter().map(BatchInput::File));
            }
        } else {
            collected.push(BatchInput::Missing(path.to_path_buf()));
        }
    }

    if !any_found {
        return Err(OptimizeError::NoInputs);
    }

    let mut seen = HashSet::new();
    collected.retain(|input| {
        let key = fs::canonicalize(input.path()).unwrap_or_else(|_| input.path().to_path_buf());
        seen.insert(key)
    });

    Ok(collected)
}

fn list_directory(dir: &Path, policy: ExtensionPolicy) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    let walker = WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name();

    for entry in walker {
        let entry = entry?;
        let path = entry.path();
        if entry.file_type().is_file() && !is_hidden(path) && is_listed_image(path, policy) {
            files.push(path.to_path_buf());
        }
    }

    Ok(files)
}

fn expand_glob(pattern: &str, policy: ExtensionPolicy) -> Vec<PathBuf> {
    let Ok(paths) = glob(pattern) else {
        warn!("⚠️  Invalid glob pattern: {}", pattern);
        return Vec::new();
    };

    let mut files: Vec<PathBuf> = paths
        .flatten()
        .filter(|p| p.is_file() && !is_hidden(p) && is_listed_image(p, policy))
        .collect();
    files.sort();
    files
}

fn is_glob_pattern(input: &str) -> bool {
    input.contains(['*', '?', '['])
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .map(|name| name.starts_with('.'))
        .unwrap_or(false)
}

/// Whether a directory listing should pick up `path`.
pub fn is_listed_image(path: &Path, policy: ExtensionPolicy) -> bool {
    path.extension()
        .and_then(|s| s.to_str())
        .map(|ext| {
            let ext = ext.to_lowercase();
            ext != BACKUP_SUFFIX && policy.listed_extensions().contains(&ext.as_str())
        })
        .unwrap_or(false)
}

/// Runs one file through inspect → eligibility → read → transform → commit.
/// Never fails: every error becomes the file's outcome.
pub fn process_file(path: &Path, config: &BatchConfig, codec: &dyn Codec) -> OptimizationResult {
    let path_buf = path.to_path_buf();

    let size = match inspect_size(path) {
        Ok(size) => size,
        Err(e @ OptimizeError::NotFound(_)) => {
            return OptimizationResult::skipped(path_buf, Outcome::SkippedMissing, None, e.to_string())
        }
        Err(e) => return OptimizationResult::failed(path_buf, None, e.to_string()),
    };

    let source = match check_eligibility(path, size, &config.profile) {
        Eligibility::Proceed(source) => source,
        Eligibility::Skip(reason) => {
            let outcome = match reason {
                SkipReason::UnsupportedFormat(_) => Outcome::SkippedUnsupported,
                SkipReason::BelowSizeThreshold { .. } => Outcome::SkippedBelowSizeThreshold,
            };
            return OptimizationResult::skipped(
                path_buf,
                outcome,
                Some(size.bytes),
                reason.to_string(),
            );
        }
    };

    let original = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(err) => {
            let e = OptimizeError::Read {
                path: path_buf.clone(),
                source: err,
            };
            return OptimizationResult::failed(path_buf, Some(size.bytes), e.to_string());
        }
    };

    let transformed = match transform(&original, &source, &config.profile, codec) {
        Ok(transformed) => transformed,
        Err(e) => {
            return OptimizationResult::failed(path_buf, Some(original.len() as u64), e.to_string())
        }
    };
    if transformed.fell_back {
        warn!(
            "⚠️  {}: WebP conversion failed, optimized as PNG instead",
            path.display()
        );
    }

    match commit(path, &original, &transformed, &config.commit_options()) {
        Ok(CommitOutcome::Committed(c)) => {
            OptimizationResult::committed(path_buf, c.original_size, c.optimized_size, transformed.target)
                .with_new_path(c.new_path)
                .with_backup_path(c.backup_path)
        }
        Ok(CommitOutcome::NoImprovement {
            original_size,
            optimized_size,
        }) => OptimizationResult::no_improvement(
            path_buf,
            original_size,
            optimized_size,
            transformed.target,
        ),
        Err(e) => OptimizationResult::failed(path_buf, Some(original.len() as u64), e.to_string()),
    }
}

fn log_result(result: &OptimizationResult) {
    match result.outcome {
        Outcome::Committed => info!("{}", result.log_line()),
        Outcome::Failed => error!("{}", result.log_line()),
        _ => warn!("{}", result.log_line()),
    }
}

fn progress_bar(len: usize, visible: bool) -> ProgressBar {
    if !visible {
        return ProgressBar::hidden();
    }
    let style = ProgressStyle::with_template(PROGRESS_BAR_TEMPLATE)
        .map(|style| style.progress_chars("#>-"))
        .unwrap_or_else(|_| ProgressStyle::default_bar());
    ProgressBar::new(len as u64).with_style(style)
}

/// Processes every input and folds the results into a summary.
///
/// `abort` is checked before each file starts. Files already in flight finish
/// (including their atomic write); files not yet started are left out of the
/// summary entirely.
///
/// # Returns
/// * `Ok(BatchSummary)` once every file has an outcome
/// * `Err(OptimizeError)` only for an invalid profile, no usable inputs, an
///   unreadable input directory or a worker pool that cannot be built
pub fn run_batch(
    config: &BatchConfig,
    codec: &dyn Codec,
    abort: &AtomicBool,
) -> Result<BatchSummary> {
    config.profile.validate()?;
    let start_time = Instant::now();

    let inputs = collect_inputs(&config.inputs, config.profile.extension_policy)?;
    let workers = config.worker_count();
    info!(
        "🚀 Optimizing {} file(s) with the {} profile{}",
        inputs.len(),
        config.profile.name,
        if config.dry_run { " (dry run)" } else { "" }
    );

    let progress = progress_bar(inputs.len(), config.show_progress);

    let worker = |input: &BatchInput| -> Option<OptimizationResult> {
        if abort.load(Ordering::SeqCst) {
            return None;
        }
        let result = match input {
            BatchInput::File(path) => process_file(path, config, codec),
            BatchInput::Missing(path) => OptimizationResult::skipped(
                path.clone(),
                Outcome::SkippedMissing,
                None,
                OptimizeError::NotFound(path.clone()).to_string(),
            ),
        };
        progress.suspend(|| log_result(&result));
        progress.inc(1);
        Some(result)
    };

    let results: Vec<OptimizationResult> = if workers <= 1 {
        inputs.iter().filter_map(worker).collect()
    } else {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(workers)
            .build()?;
        pool.install(|| inputs.par_iter().filter_map(worker).collect())
    };

    progress.finish_and_clear();

    let aborted = abort.load(Ordering::SeqCst);
    if aborted {
        warn!(
            "⚠️  Aborted after {} of {} file(s)",
            results.len(),
            inputs.len()
        );
    }

    Ok(BatchSummary::from_results(
        config.profile.name,
        results,
        aborted,
        config.dry_run,
        start_time.elapsed(),
    ))
}
