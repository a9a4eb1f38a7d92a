//! Column listing for the three inputs.
//!
//! Each input is inspected on its own: an unreadable file is reported as a
//! warning and the remaining inputs are still listed.

use std::path::PathBuf;

use anyhow::{Context, Result};
use log::{info, warn};
use serde::Serialize;

use crate::{cli::ColumnsArgs, io_utils, table, workbook};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnListing {
    pub input: String,
    pub path: PathBuf,
    pub columns: Vec<String>,
}

pub fn list_columns(args: &ColumnsArgs) -> Result<Vec<ColumnListing>> {
    let inputs = &args.inputs;
    let encoding = io_utils::resolve_encoding(inputs.input_encoding.as_deref())?;
    let mut listings = Vec::new();

    for (label, path) in [
        ("source one", inputs.source_one_path()),
        ("source two", inputs.source_two_path()),
    ] {
        let delimiter = io_utils::resolve_input_delimiter(&path, inputs.delimiter);
        match io_utils::read_csv_headers(&path, delimiter, encoding) {
            Ok(columns) => listings.push(ColumnListing {
                input: label.to_string(),
                path,
                columns,
            }),
            Err(err) => warn!("Skipping {label} {path:?}: {err:#}"),
        }
    }

    let workbook_path = inputs.workbook_path();
    match workbook::load_sheet(&workbook_path, &inputs.sheet, &inputs.sheet) {
        Ok(sheet) => listings.push(ColumnListing {
            input: format!("sheet '{}'", inputs.sheet),
            path: workbook_path,
            columns: sheet.headers,
        }),
        Err(err) => warn!("Skipping workbook {workbook_path:?}: {err}"),
    }

    Ok(listings)
}

pub fn execute(args: &ColumnsArgs) -> Result<()> {
    let listings = list_columns(args)?;
    if args.json {
        let rendered =
            serde_json::to_string_pretty(&listings).context("Serializing column listing")?;
        println!("{rendered}");
    } else {
        for listing in &listings {
            println!("--- {} ({}) ---", listing.input, listing.path.display());
            let rows: Vec<Vec<String>> = listing
                .columns
                .iter()
                .enumerate()
                .map(|(idx, column)| vec![(idx + 1).to_string(), column.clone()])
                .collect();
            table::print_table(&["#", "column"], &rows);
        }
    }
    info!("Listed columns for {} of 3 input(s)", listings.len());
    Ok(())
}
