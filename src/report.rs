//! Per-file results and the batch summary built from them.
//!
//! Results are collected in input order and folded into a [`BatchSummary`]
//! only after every file is done, so the totals never depend on how the work
//! was scheduled.

use crate::constants::{ERROR_PREFIX, SKIP_PREFIX, SUCCESS_PREFIX, SUMMARY_PREFIX};
use crate::error::Result;
use crate::formats::TargetFormat;
use crate::profile::ProfileName;
use crate::utils::{format_file_size, format_mb, reduction_percent};
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Outcome {
    Committed,
    SkippedUnsupported,
    SkippedBelowSizeThreshold,
    SkippedNoImprovement,
    SkippedMissing,
    Failed,
}

impl Outcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::Committed => "committed",
            Outcome::SkippedUnsupported => "skipped-unsupported",
            Outcome::SkippedBelowSizeThreshold => "skipped-below-size-threshold",
            Outcome::SkippedNoImprovement => "skipped-no-improvement",
            Outcome::SkippedMissing => "skipped-missing",
            Outcome::Failed => "failed",
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What happened to one input path.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OptimizationResult {
    pub path: PathBuf,
    pub outcome: Outcome,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_size: Option<u64>,
    /// Absent when the file was skipped before it was transformed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub optimized_size: Option<u64>,
    /// Only present for committed files.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reduction_percent: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<TargetFormat>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_path: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backup_path: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl OptimizationResult {
    fn bare(path: PathBuf, outcome: Outcome) -> Self {
        Self {
            path,
            outcome,
            original_size: None,
            optimized_size: None,
            reduction_percent: None,
            target: None,
            new_path: None,
            backup_path: None,
            reason: None,
        }
    }

    pub fn committed(
        path: PathBuf,
        original_size: u64,
        optimized_size: u64,
        target: TargetFormat,
    ) -> Self {
        Self {
            original_size: Some(original_size),
            optimized_size: Some(optimized_size),
            reduction_percent: Some(reduction_percent(original_size, optimized_size)),
            target: Some(target),
            ..Self::bare(path, Outcome::Committed)
        }
    }

    pub fn skipped(
        path: PathBuf,
        outcome: Outcome,
        original_size: Option<u64>,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            original_size,
            reason: Some(reason.into()),
            ..Self::bare(path, outcome)
        }
    }

    pub fn no_improvement(
        path: PathBuf,
        original_size: u64,
        optimized_size: u64,
        target: TargetFormat,
    ) -> Self {
        Self {
            original_size: Some(original_size),
            optimized_size: Some(optimized_size),
            target: Some(target),
            reason: Some("no smaller than existing file".to_string()),
            ..Self::bare(path, Outcome::SkippedNoImprovement)
        }
    }

    pub fn failed(path: PathBuf, original_size: Option<u64>, reason: impl Into<String>) -> Self {
        Self {
            original_size,
            reason: Some(reason.into()),
            ..Self::bare(path, Outcome::Failed)
        }
    }

    pub fn with_new_path(mut self, new_path: Option<PathBuf>) -> Self {
        self.new_path = new_path;
        self
    }

    pub fn with_backup_path(mut self, backup_path: Option<PathBuf>) -> Self {
        self.backup_path = backup_path;
        self
    }

    /// The per-file line printed while the batch runs.
    pub fn log_line(&self) -> String {
        let name = self.path.display();
        match self.outcome {
            Outcome::Committed => format!(
                "{} {}: {} → {} ({:.1}% reduction)",
                SUCCESS_PREFIX,
                name,
                format_mb(self.original_size.unwrap_or(0)),
                format_mb(self.optimized_size.unwrap_or(0)),
                self.reduction_percent.unwrap_or(0.0)
            ),
            Outcome::Failed => format!(
                "{} {}: {}",
                ERROR_PREFIX,
                name,
                self.reason.as_deref().unwrap_or("failed")
            ),
            _ => format!(
                "{} {}: {}",
                SKIP_PREFIX,
                name,
                self.reason.as_deref().unwrap_or(self.outcome.as_str())
            ),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Conversion {
    pub from: PathBuf,
    pub to: PathBuf,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SkipCounts {
    pub unsupported: usize,
    pub below_size_threshold: usize,
    pub no_improvement: usize,
    pub missing: usize,
}

impl SkipCounts {
    pub fn total(&self) -> usize {
        self.unsupported + self.below_size_threshold + self.no_improvement + self.missing
    }
}

/// Aggregate over one batch. Byte totals cover committed files only.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchSummary {
    pub profile: ProfileName,
    pub attempted: usize,
    pub committed: usize,
    pub skipped: SkipCounts,
    pub failed: usize,
    pub total_original_bytes: u64,
    pub total_optimized_bytes: u64,
    pub saved_bytes: u64,
    pub reduction_percent: f64,
    pub conversions: Vec<Conversion>,
    pub aborted: bool,
    pub dry_run: bool,
    #[serde(serialize_with = "serialize_secs")]
    pub elapsed: Duration,
    pub results: Vec<OptimizationResult>,
}

fn serialize_secs<S: serde::Serializer>(
    elapsed: &Duration,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    serializer.serialize_f64(elapsed.as_secs_f64())
}

impl BatchSummary {
    pub fn from_results(
        profile: ProfileName,
        results: Vec<OptimizationResult>,
        aborted: bool,
        dry_run: bool,
        elapsed: Duration,
    ) -> Self {
        let mut summary = Self {
            profile,
            attempted: results.len(),
            committed: 0,
            skipped: SkipCounts::default(),
            failed: 0,
            total_original_bytes: 0,
            total_optimized_bytes: 0,
            saved_bytes: 0,
            reduction_percent: 0.0,
            conversions: Vec::new(),
            aborted,
            dry_run,
            elapsed,
            results: Vec::new(),
        };

        for result in &results {
            match result.outcome {
                Outcome::Committed => {
                    summary.committed += 1;
                    summary.total_original_bytes += result.original_size.unwrap_or(0);
                    summary.total_optimized_bytes += result.optimized_size.unwrap_or(0);
                    if let Some(to) = &result.new_path {
                        summary.conversions.push(Conversion {
                            from: result.path.clone(),
                            to: to.clone(),
                        });
                    }
                }
                Outcome::SkippedUnsupported => summary.skipped.unsupported += 1,
                Outcome::SkippedBelowSizeThreshold => summary.skipped.below_size_threshold += 1,
                Outcome::SkippedNoImprovement => summary.skipped.no_improvement += 1,
                Outcome::SkippedMissing => summary.skipped.missing += 1,
                Outcome::Failed => summary.failed += 1,
            }
        }

        summary.saved_bytes = summary
            .total_original_bytes
            .saturating_sub(summary.total_optimized_bytes);
        summary.reduction_percent =
            reduction_percent(summary.total_original_bytes, summary.total_optimized_bytes);
        summary.results = results;
        summary
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Human-readable summary block.
    pub fn render_text(&self) -> String {
        let mut out = Vec::new();
        let title = if self.dry_run {
            "Optimization Summary (dry run)"
        } else {
            "Optimization Summary"
        };
        out.push(format!("{} {} [{}]:", SUMMARY_PREFIX, title, self.profile));
        out.push(format!("  📁 Files attempted: {}", self.attempted));
        out.push(format!("  ✅ Committed: {}", self.committed));
        out.push(format!(
            "  ⏭️  Skipped: {} (unsupported {}, already small {}, no improvement {}, missing {})",
            self.skipped.total(),
            self.skipped.unsupported,
            self.skipped.below_size_threshold,
            self.skipped.no_improvement,
            self.skipped.missing
        ));
        out.push(format!("  ❌ Failed: {}", self.failed));
        out.push(format!(
            "  📊 Original size: {}",
            format_file_size(self.total_original_bytes)
        ));
        out.push(format!(
            "  📊 Optimized size: {}",
            format_file_size(self.total_optimized_bytes)
        ));
        out.push(format!(
            "  🎯 Saved: {} ({:.1}% reduction)",
            format_file_size(self.saved_bytes),
            self.reduction_percent
        ));

        if !self.conversions.is_empty() {
            out.push("  🔄 Conversions:".to_string());
            for conversion in &self.conversions {
                out.push(format!(
                    "     {} → {}",
                    conversion.from.display(),
                    conversion.to.display()
                ));
            }
        }

        out.push(format!("  ⏱️  Total time: {:.2?}", self.elapsed));
        if self.aborted {
            out.push("  ⚠️  Aborted: remaining files were not processed".to_string());
        }
        out.join("\n")
    }
}
