//! End-to-end orchestration.
//!
//! [`reconcile`] is the pure core: three datasets in, four outputs out, no
//! I/O. [`execute`] wraps it for the `run` command: it loads every input,
//! reconciles, and only then creates the output directory and writes the
//! files, so an ingestion failure never leaves partial output behind.

use std::{fs, path::Path};

use anyhow::{Context, Result};
use log::info;
use serde::Serialize;

use crate::{
    changelog::ChangeLog,
    cli::RunArgs,
    dataset::Dataset,
    error::ReconError,
    io_utils,
    merge::{MergeOutcome, merge_sources},
    normalize::normalize_source,
    reconcile::RecordOutcome,
    schema::{KEY_COLUMNS, RenameMap},
    workbook,
};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunStats {
    pub source_one_rows: usize,
    pub source_two_rows: usize,
    pub combined_rows: usize,
    pub duplicates_removed: usize,
    pub merged_rows: usize,
    pub mismatched: usize,
    pub unmatched: usize,
    pub matching: usize,
    pub field_changes: usize,
}

/// Everything one reconciliation pass produces.
#[derive(Debug, Clone)]
pub struct Outputs {
    /// Normalized and deduplicated; no reconciliation applied.
    pub merged: Dataset,
    /// Merged values plus the `Mismatch` flag.
    pub highlighted: Dataset,
    /// Authoritative values applied plus `Mismatch` and `Type of Change`.
    pub updated: Dataset,
    pub change_log: ChangeLog,
    pub outcomes: Vec<RecordOutcome>,
    pub stats: RunStats,
}

pub fn reconcile(
    source_one: &Dataset,
    source_two: &Dataset,
    authoritative: &Dataset,
    renames: &RenameMap,
) -> Result<Outputs, ReconError> {
    authoritative.require_columns(KEY_COLUMNS)?;
    let first = normalize_source(source_one, &authoritative.headers, renames)?;
    let second = normalize_source(source_two, &authoritative.headers, renames)?;
    first.require_columns(KEY_COLUMNS)?;
    second.require_columns(KEY_COLUMNS)?;

    let MergeOutcome {
        merged,
        combined_rows,
        duplicates_removed,
    } = merge_sources(&first, &second, "merged");

    let reconciliation = crate::reconcile::reconcile(&merged, authoritative);
    let change_log = ChangeLog::from_outcomes(&reconciliation.outcomes);

    let mismatched = reconciliation.mismatched();
    let unmatched = reconciliation.unmatched();
    let stats = RunStats {
        source_one_rows: source_one.len(),
        source_two_rows: source_two.len(),
        combined_rows,
        duplicates_removed,
        merged_rows: merged.len(),
        mismatched,
        unmatched,
        matching: merged.len() - mismatched - unmatched,
        field_changes: change_log.len(),
    };

    Ok(Outputs {
        merged,
        highlighted: reconciliation.highlighted,
        updated: reconciliation.updated,
        change_log,
        outcomes: reconciliation.outcomes,
        stats,
    })
}

pub fn execute(args: &RunArgs) -> Result<()> {
    let inputs = &args.inputs;
    let encoding = io_utils::resolve_encoding(inputs.input_encoding.as_deref())?;
    let renames = inputs.rename_map();

    let source_one_path = inputs.source_one_path();
    let source_two_path = inputs.source_two_path();
    let workbook_path = inputs.workbook_path();

    info!("Loading CSV files...");
    let source_one = load_source(&source_one_path, inputs.delimiter, encoding)?;
    let source_two = load_source(&source_two_path, inputs.delimiter, encoding)?;

    info!("Loading authoritative workbook...");
    let authoritative = workbook::load_sheet(&workbook_path, &inputs.sheet, &inputs.sheet)
        .with_context(|| format!("Loading sheet '{}' from {workbook_path:?}", inputs.sheet))?;

    info!("Merging and cross-referencing...");
    let outputs = reconcile(&source_one, &source_two, &authoritative, &renames)
        .context("Reconciling source exports")?;
    if outputs.change_log.is_empty() {
        info!("No changes to report");
    }

    fs::create_dir_all(&args.output_dir)
        .with_context(|| format!("Creating output directory {:?}", args.output_dir))?;
    let delimiter = inputs.delimiter.unwrap_or(io_utils::DEFAULT_CSV_DELIMITER);
    let change_log = outputs.change_log.to_dataset();
    for (name, dataset) in [
        (&args.merged_name, &outputs.merged),
        (&args.highlighted_name, &outputs.highlighted),
        (&args.updated_name, &outputs.updated),
        (&args.summary_name, &change_log),
    ] {
        let path = args.output_dir.join(name);
        let output_delimiter = io_utils::resolve_output_delimiter(&path, delimiter);
        io_utils::write_dataset(&path, dataset, output_delimiter)?;
        info!("Saved: {name} ({} row(s))", dataset.len());
    }

    let stats = &outputs.stats;
    info!(
        "Processing complete: {} merged row(s), {} mismatched, {} not in {}, {} field change(s) -> {:?}",
        stats.merged_rows,
        stats.mismatched,
        stats.unmatched,
        authoritative.name,
        stats.field_changes,
        args.output_dir
    );
    Ok(())
}

fn load_source(
    path: &Path,
    delimiter: Option<u8>,
    encoding: &'static encoding_rs::Encoding,
) -> Result<Dataset> {
    let name = path
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    let delimiter = io_utils::resolve_input_delimiter(path, delimiter);
    io_utils::load_csv(path, &name, delimiter, encoding)
        .with_context(|| format!("Loading source export {path:?}"))
}
