use std::path::PathBuf;

use thiserror::Error;

/// Failure kinds raised by the reconciliation engine and its loaders.
///
/// Per-record outcomes (no match, differing values) are never errors; only
/// problems that make the whole run meaningless end up here.
#[derive(Debug, Error)]
pub enum ReconError {
    #[error("{table}: required column '{column}' is missing")]
    MissingColumn { table: String, column: String },

    #[error("{table}: no header row found")]
    EmptyTable { table: String },

    #[error("sheet '{sheet}' not found in workbook {path:?} (available: {available})")]
    MissingSheet {
        path: PathBuf,
        sheet: String,
        available: String,
    },

    #[error("failed to read workbook {path:?}: {message}")]
    Workbook { path: PathBuf, message: String },

    #[error("{table}: renaming '{from}' to '{to}' collides with an existing column")]
    SchemaCollision {
        table: String,
        from: String,
        to: String,
    },
}
