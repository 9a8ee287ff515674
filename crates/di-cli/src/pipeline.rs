//! Workbook processing pipeline with explicit stages.
//!
//! The pipeline follows these stages in order:
//! 1. **Load**: read the source workbook (and the region lookup, if given)
//! 2. **Clean**: validate and clean every data sheet, skipping mismatches
//! 3. **Aggregate**: stack the cleaned sheets into the unified table
//! 4. **Output**: write the unified table and, optionally, the cleaned workbook
//!
//! Each stage takes the output of the previous stage and returns typed results.

use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use di_ingest::{
    CleanReport, RegionLookup, Workbook, clean_workbook, load_region_lookup, load_workbook,
};
use di_model::{OutputFormat, PipelineConfig, load_config};
use di_report::{write_cleaned_workbook, write_unified};
use di_transform::{AggregateReport, UnifiedTable, build_unified_table};
use polars::prelude::DataFrame;
use tracing::{info, info_span, warn};

/// Inputs of one `process` run.
#[derive(Debug, Clone)]
pub struct ProcessOptions {
    pub workbook: PathBuf,
    pub lookup: Option<PathBuf>,
    /// Unified table path; the extension follows `format`.
    pub output: Option<PathBuf>,
    pub format: OutputFormat,
    pub cleaned_output: Option<PathBuf>,
    pub dry_run: bool,
}

impl ProcessOptions {
    pub fn new(workbook: impl Into<PathBuf>) -> Self {
        Self {
            workbook: workbook.into(),
            lookup: None,
            output: None,
            format: OutputFormat::default(),
            cleaned_output: None,
            dry_run: false,
        }
    }

    /// `<dir>/<stem>_unified.<ext>` next to the source workbook.
    pub fn resolved_output(&self) -> PathBuf {
        self.output.clone().unwrap_or_else(|| {
            let stem = self
                .workbook
                .file_stem()
                .map(|stem| stem.to_string_lossy().into_owned())
                .unwrap_or_else(|| "workbook".to_string());
            self.workbook
                .with_file_name(format!("{stem}_unified.{}", self.format.extension()))
        })
    }
}

/// Outcome of one `process` run.
#[derive(Debug)]
pub struct ProcessResult {
    pub workbook: PathBuf,
    pub clean: CleanReport,
    pub aggregate: AggregateReport,
    pub table: DataFrame,
    /// Unified table path; `None` on a dry run.
    pub output: Option<PathBuf>,
    pub cleaned_output: Option<PathBuf>,
    pub elapsed_ms: u128,
}

impl ProcessResult {
    /// True when any sheet was skipped.
    pub fn has_errors(&self) -> bool {
        self.clean.has_skipped()
    }
}

/// Reads the configuration file, or the defaults when none is given.
pub fn resolve_config(path: Option<&Path>) -> Result<PipelineConfig> {
    match path {
        Some(path) => {
            load_config(path).with_context(|| format!("load config {}", path.display()))
        }
        None => Ok(PipelineConfig::default()),
    }
}

// ============================================================================
// Stage 1: Load
// ============================================================================

pub fn load(
    options: &ProcessOptions,
    config: &PipelineConfig,
) -> Result<(Workbook, Option<RegionLookup>)> {
    let workbook = load_workbook(&options.workbook)
        .with_context(|| format!("load workbook {}", options.workbook.display()))?;
    info!(sheets = workbook.sheets.len(), "workbook loaded");

    let lookup = options
        .lookup
        .as_deref()
        .map(|path| {
            load_region_lookup(path, &config.lookup)
                .with_context(|| format!("load region lookup {}", path.display()))
        })
        .transpose()?;
    if let Some(lookup) = &lookup {
        if lookup.is_empty() {
            warn!("region lookup has no entries, every row will be dropped by the join");
        }
        info!(entries = lookup.len(), "region lookup loaded");
    }
    Ok((workbook, lookup))
}

// ============================================================================
// Stage 2: Clean
// ============================================================================

pub fn clean(workbook: &mut Workbook, config: &PipelineConfig) -> CleanReport {
    clean_workbook(workbook, &config.layout, config.skip_leading_sheets)
}

// ============================================================================
// Stage 3: Aggregate
// ============================================================================

pub fn aggregate(
    workbook: &Workbook,
    report: &CleanReport,
    config: &PipelineConfig,
    lookup: Option<&RegionLookup>,
) -> Result<UnifiedTable> {
    build_unified_table(workbook, &report.cleaned, config, lookup).context("build unified table")
}

// ============================================================================
// Stage 4: Output
// ============================================================================

/// Written paths: the unified table, then the cleaned workbook if requested.
pub fn output(
    table: &DataFrame,
    workbook: &Workbook,
    options: &ProcessOptions,
) -> Result<(PathBuf, Option<PathBuf>)> {
    let unified = write_unified(table, &options.resolved_output(), options.format)
        .context("write unified table")?;
    let cleaned = match &options.cleaned_output {
        Some(path) => {
            write_cleaned_workbook(workbook, path)
                .with_context(|| format!("write cleaned workbook {}", path.display()))?;
            Some(path.clone())
        }
        None => None,
    };
    Ok((unified, cleaned))
}

/// Runs every stage. Skipped sheets are reported, not fatal.
///
/// When every data sheet is skipped the result carries an empty table and
/// nothing is written, so the skip reasons still reach the summary.
pub fn run_process(options: &ProcessOptions, config: &PipelineConfig) -> Result<ProcessResult> {
    let span = info_span!("process", workbook = %options.workbook.display());
    let _guard = span.enter();
    let start = Instant::now();

    let (mut workbook, lookup) = load(options, config)?;
    let clean_report = clean(&mut workbook, config);
    if clean_report.cleaned.is_empty() && clean_report.has_skipped() {
        warn!(
            skipped = clean_report.skipped.len(),
            "every data sheet was skipped, no files written"
        );
        return Ok(ProcessResult {
            workbook: options.workbook.clone(),
            clean: clean_report,
            aggregate: AggregateReport::default(),
            table: DataFrame::empty(),
            output: None,
            cleaned_output: None,
            elapsed_ms: start.elapsed().as_millis(),
        });
    }
    let UnifiedTable { frame, report } =
        aggregate(&workbook, &clean_report, config, lookup.as_ref())?;

    let (unified_path, cleaned_output) = if options.dry_run {
        info!("dry run, no files written");
        (None, None)
    } else {
        let (unified, cleaned) = output(&frame, &workbook, options)?;
        (Some(unified), cleaned)
    };

    Ok(ProcessResult {
        workbook: options.workbook.clone(),
        clean: clean_report,
        aggregate: report,
        table: frame,
        output: unified_path,
        cleaned_output,
        elapsed_ms: start.elapsed().as_millis(),
    })
}
