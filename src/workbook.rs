//! Authoritative sheet ingestion through `calamine`.
//!
//! The first row of the sheet is the header row. Cells are typed from the
//! workbook's own cell types rather than re-parsed: integral floats become
//! integers (Excel stores every number as a double), dates become timestamps,
//! error cells (`#N/A`, `#REF!`, ...) and null tokens become null. Rows with no
//! value at all are skipped.

use std::path::Path;

use calamine::{Data, Reader, open_workbook_auto};
use log::{debug, info};

use crate::{
    data::{Value, is_null_token, value_from_float},
    dataset::Dataset,
    error::ReconError,
    schema,
};

pub const DEFAULT_SHEET: &str = "CAISO Update";

pub fn sheet_names(path: &Path) -> Result<Vec<String>, ReconError> {
    let workbook = open_workbook_auto(path).map_err(|err| workbook_error(path, err))?;
    Ok(workbook.sheet_names().to_vec())
}

/// Loads one sheet of a workbook (xlsx, xls, xlsb, ods) into a dataset.
pub fn load_sheet(path: &Path, sheet: &str, name: &str) -> Result<Dataset, ReconError> {
    let mut workbook = open_workbook_auto(path).map_err(|err| workbook_error(path, err))?;
    let available = workbook.sheet_names().to_vec();
    if !available.iter().any(|candidate| candidate == sheet) {
        return Err(ReconError::MissingSheet {
            path: path.to_path_buf(),
            sheet: sheet.to_string(),
            available: available.join(", "),
        });
    }

    let range = workbook
        .worksheet_range(sheet)
        .map_err(|err| workbook_error(path, err))?;
    let mut rows = range.rows();
    let header_row = rows.next().ok_or_else(|| ReconError::EmptyTable {
        table: name.to_string(),
    })?;
    let headers = schema::clean_headers(header_row.iter().map(header_text).collect());

    let mut records = Vec::new();
    let mut skipped = 0usize;
    for row in rows {
        let cells: Vec<Option<Value>> = row.iter().map(cell_value).collect();
        if cells.iter().all(Option::is_none) {
            skipped += 1;
            continue;
        }
        records.push(cells);
    }
    if skipped > 0 {
        debug!("Skipped {skipped} blank row(s) in sheet '{sheet}'");
    }

    info!("Loaded {name}: {} row(s)", records.len());
    debug!(
        "Columns: {:?}",
        headers.iter().take(10).collect::<Vec<_>>()
    );
    Ok(Dataset::from_rows(name, headers, records))
}

fn header_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        Data::Float(f) => value_from_float(*f)
            .map(|v| v.as_display())
            .unwrap_or_default(),
        other => other.to_string(),
    }
}

pub fn cell_value(cell: &Data) -> Option<Value> {
    match cell {
        Data::Empty | Data::Error(_) => None,
        Data::String(s) if is_null_token(s) => None,
        Data::String(s) => Some(Value::Text(s.clone())),
        Data::Float(f) => value_from_float(*f),
        Data::Int(i) => Some(Value::Integer(*i)),
        Data::Bool(b) => Some(Value::Boolean(*b)),
        Data::DateTime(dt) => match dt.as_datetime() {
            Some(parsed) => Some(Value::DateTime(parsed)),
            None => value_from_float(dt.as_f64()),
        },
        Data::DateTimeIso(s) | Data::DurationIso(s) => Some(Value::Text(s.clone())),
    }
}

fn workbook_error(path: &Path, err: calamine::Error) -> ReconError {
    ReconError::Workbook {
        path: path.to_path_buf(),
        message: err.to_string(),
    }
}
