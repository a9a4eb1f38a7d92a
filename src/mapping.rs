//! Spot check of the rename map against a single record.
//!
//! Picks one record from the first source export, finds the authoritative row
//! with the same identifier, and shows each renamed column side by side with
//! its authoritative counterpart. Columns only the authoritative sheet carries
//! (the `Low Rating` set, for instance) are listed afterwards.

use anyhow::{Context, Result, anyhow};
use log::info;

use crate::{
    cli::MappingArgs,
    compare::values_equal,
    data::{Value, parse_cell},
    dataset::{Dataset, Record},
    io_utils,
    matcher::AuthoritativeIndex,
    schema::{ANNOTATION_COLUMNS, KEY_COLUMNS, RenameMap},
    table, workbook,
};

#[derive(Debug, Clone, PartialEq)]
pub struct MappedColumn {
    pub source_column: String,
    pub authoritative_column: String,
    pub source_value: Option<Value>,
    pub authoritative_value: Option<Value>,
    pub matches: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MappingReport {
    pub identifier: Value,
    pub mapped: Vec<MappedColumn>,
    pub authoritative_only: Vec<(String, Option<Value>)>,
}

/// Builds the report for the record with `oid`, or for the second record of
/// `source` (the first when there is only one) when no OID is given.
pub fn build_report(
    source: &Dataset,
    authoritative: &Dataset,
    renames: &RenameMap,
    oid: Option<&str>,
) -> Result<MappingReport> {
    let record = select_record(source, oid)?;
    let identifier = record
        .identifier()
        .cloned()
        .ok_or_else(|| anyhow!("Selected record in {} has no OID", source.name))?;

    let index = AuthoritativeIndex::new(authoritative);
    let counterpart = index
        .find_by_identifier(&identifier)
        .ok_or_else(|| anyhow!("OID {identifier} not found in {}", authoritative.name))?
        .record;

    let mapped = renames
        .iter()
        .map(|(from, to)| {
            let source_value = record.get(from).cloned();
            let authoritative_value = counterpart.get(to).cloned();
            MappedColumn {
                source_column: from.to_string(),
                authoritative_column: to.to_string(),
                matches: values_equal(source_value.as_ref(), authoritative_value.as_ref()),
                source_value,
                authoritative_value,
            }
        })
        .collect();

    let authoritative_only = authoritative
        .headers
        .iter()
        .filter(|column| !source.has_column(column))
        .filter(|column| !renames.iter().any(|(_, to)| to == column.as_str()))
        .filter(|column| {
            !KEY_COLUMNS.contains(&column.as_str()) && !ANNOTATION_COLUMNS.contains(&column.as_str())
        })
        .map(|column| (column.clone(), counterpart.get(column).cloned()))
        .collect();

    Ok(MappingReport {
        identifier,
        mapped,
        authoritative_only,
    })
}

fn select_record<'a>(source: &'a Dataset, oid: Option<&str>) -> Result<&'a Record> {
    match oid {
        Some(raw) => {
            let wanted = parse_cell(raw.trim())
                .ok_or_else(|| anyhow!("OID '{raw}' is empty"))?
                .key();
            source
                .records
                .iter()
                .find(|record| record.identifier().is_some_and(|id| id.key() == wanted))
                .ok_or_else(|| anyhow!("OID {raw} not found in {}", source.name))
        }
        None => source
            .records
            .get(1)
            .or_else(|| source.records.first())
            .ok_or_else(|| anyhow!("{} has no rows", source.name)),
    }
}

fn display(value: Option<&Value>) -> String {
    value.map(Value::as_display).unwrap_or_else(|| "null".to_string())
}

pub fn execute(args: &MappingArgs) -> Result<()> {
    let inputs = &args.inputs;
    let encoding = io_utils::resolve_encoding(inputs.input_encoding.as_deref())?;
    let source_path = inputs.source_one_path();
    let delimiter = io_utils::resolve_input_delimiter(&source_path, inputs.delimiter);
    let source = io_utils::load_csv(&source_path, "source one", delimiter, encoding)
        .with_context(|| format!("Loading source export {source_path:?}"))?;
    let workbook_path = inputs.workbook_path();
    let authoritative = workbook::load_sheet(&workbook_path, &inputs.sheet, &inputs.sheet)
        .with_context(|| format!("Loading sheet '{}' from {workbook_path:?}", inputs.sheet))?;

    let report = build_report(
        &source,
        &authoritative,
        &inputs.rename_map(),
        args.oid.as_deref(),
    )?;

    println!("Mapped columns for OID {}", report.identifier);
    let rows: Vec<Vec<String>> = report
        .mapped
        .iter()
        .map(|column| {
            vec![
                if column.matches { "MATCH" } else { "DIFF" }.to_string(),
                column.source_column.clone(),
                column.authoritative_column.clone(),
                display(column.source_value.as_ref()),
                display(column.authoritative_value.as_ref()),
            ]
        })
        .collect();
    table::print_table(&["status", "source", "authoritative", "csv", "workbook"], &rows);

    if !report.authoritative_only.is_empty() {
        println!();
        println!("Columns only in {}", authoritative.name);
        let rows: Vec<Vec<String>> = report
            .authoritative_only
            .iter()
            .map(|(column, value)| vec![column.clone(), display(value.as_ref())])
            .collect();
        table::print_table(&["column", "value"], &rows);
    }

    let differing = report.mapped.iter().filter(|c| !c.matches).count();
    info!(
        "{} mapped column(s), {differing} differing",
        report.mapped.len()
    );
    Ok(())
}
