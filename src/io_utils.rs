//! CSV ingestion and output.
//!
//! All CSV traffic in substation-recon flows through this module:
//!
//! - **Delimiter resolution**: extension-based (`.csv` → comma, `.tsv` → tab)
//!   with manual override support.
//! - **Encoding**: input decoding via `encoding_rs`, defaulting to UTF-8.
//! - **Loading**: [`load_csv`] reads a whole export into a [`Dataset`], typing
//!   each cell and cleaning header names.
//! - **Writing**: [`write_dataset`] replaces the target file wholesale.

use std::{
    fs::File,
    io::{BufReader, BufWriter, Read, Write},
    path::Path,
};

use anyhow::{Context, Result, anyhow};
use csv::QuoteStyle;
use encoding_rs::{Encoding, UTF_8};
use log::info;

use crate::{
    data::{Value, parse_cell},
    dataset::Dataset,
    error::ReconError,
    schema,
};

pub const DEFAULT_CSV_DELIMITER: u8 = b',';
pub const DEFAULT_TSV_DELIMITER: u8 = b'\t';

pub fn resolve_encoding(label: Option<&str>) -> Result<&'static Encoding> {
    if let Some(value) = label {
        Encoding::for_label(value.trim().as_bytes())
            .ok_or_else(|| anyhow!("Unknown encoding '{value}'"))
    } else {
        Ok(UTF_8)
    }
}

pub fn resolve_input_delimiter(path: &Path, provided: Option<u8>) -> u8 {
    provided.unwrap_or_else(|| match path.extension().and_then(|ext| ext.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("tsv") => DEFAULT_TSV_DELIMITER,
        _ => DEFAULT_CSV_DELIMITER,
    })
}

pub fn resolve_output_delimiter(path: &Path, fallback: u8) -> u8 {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("tsv") => DEFAULT_TSV_DELIMITER,
        Some(ext) if ext.eq_ignore_ascii_case("csv") => DEFAULT_CSV_DELIMITER,
        _ => fallback,
    }
}

pub fn open_csv_reader<R>(reader: R, delimiter: u8) -> csv::Reader<R>
where
    R: Read,
{
    let mut builder = csv::ReaderBuilder::new();
    builder
        .has_headers(true)
        .delimiter(delimiter)
        .double_quote(true)
        .flexible(true);
    builder.from_reader(reader)
}

pub fn open_csv_reader_from_path(path: &Path, delimiter: u8) -> Result<csv::Reader<BufReader<File>>> {
    let reader =
        BufReader::new(File::open(path).with_context(|| format!("Opening input file {path:?}"))?);
    Ok(open_csv_reader(reader, delimiter))
}

pub fn open_csv_writer(path: &Path, delimiter: u8) -> Result<csv::Writer<Box<dyn Write>>> {
    let writer: Box<dyn Write> = Box::new(BufWriter::new(
        File::create(path).with_context(|| format!("Creating output file {path:?}"))?,
    ));
    let mut builder = csv::WriterBuilder::new();
    builder
        .delimiter(delimiter)
        .quote_style(QuoteStyle::Necessary)
        .double_quote(true);
    Ok(builder.from_writer(writer))
}

pub fn decode_bytes(bytes: &[u8], encoding: &'static Encoding) -> Result<String> {
    let (text, _, had_errors) = encoding.decode(bytes);
    if had_errors {
        Err(anyhow!(
            "Failed to decode text with encoding {}",
            encoding.name()
        ))
    } else {
        Ok(text.into_owned())
    }
}

pub fn decode_record(record: &csv::ByteRecord, encoding: &'static Encoding) -> Result<Vec<String>> {
    record
        .iter()
        .map(|field| decode_bytes(field, encoding))
        .collect()
}

pub fn reader_headers<R>(
    reader: &mut csv::Reader<R>,
    encoding: &'static Encoding,
) -> Result<Vec<String>>
where
    R: Read,
{
    let headers = reader.byte_headers()?.clone();
    decode_record(&headers, encoding)
}

/// Reads only the cleaned header row of a CSV file.
pub fn read_csv_headers(
    path: &Path,
    delimiter: u8,
    encoding: &'static Encoding,
) -> Result<Vec<String>> {
    let mut reader = open_csv_reader_from_path(path, delimiter)?;
    let headers = reader_headers(&mut reader, encoding)
        .with_context(|| format!("Reading headers of {path:?}"))?;
    Ok(schema::clean_headers(headers))
}

/// Loads a CSV export fully into memory.
pub fn load_csv(
    path: &Path,
    name: &str,
    delimiter: u8,
    encoding: &'static Encoding,
) -> Result<Dataset> {
    let mut reader = open_csv_reader_from_path(path, delimiter)?;
    let raw_headers = reader_headers(&mut reader, encoding)
        .with_context(|| format!("Reading headers of {path:?}"))?;
    if raw_headers.iter().all(|h| h.trim().is_empty()) {
        return Err(ReconError::EmptyTable {
            table: name.to_string(),
        }
        .into());
    }
    let headers = schema::clean_headers(raw_headers);

    let mut rows = Vec::new();
    for (row_idx, record) in reader.byte_records().enumerate() {
        let record =
            record.with_context(|| format!("Reading row {} in {path:?}", row_idx + 2))?;
        if record.len() > headers.len() {
            return Err(anyhow!(
                "Row {} in {path:?} has {} field(s) but the header has {}",
                row_idx + 2,
                record.len(),
                headers.len()
            ));
        }
        let mut decoded = parse_row(&record, encoding)
            .with_context(|| format!("Decoding row {} in {path:?}", row_idx + 2))?;
        // Short rows read as trailing nulls.
        decoded.resize(headers.len(), None);
        rows.push(decoded);
    }
    info!("Loaded {name}: {} row(s)", rows.len());
    Ok(Dataset::from_rows(name, headers, rows))
}

fn parse_row(record: &csv::ByteRecord, encoding: &'static Encoding) -> Result<Vec<Option<Value>>> {
    Ok(decode_record(record, encoding)?
        .iter()
        .map(|cell| parse_cell(cell))
        .collect())
}

/// Writes `dataset` to `path`, replacing any existing file.
pub fn write_dataset(path: &Path, dataset: &Dataset, delimiter: u8) -> Result<()> {
    let mut writer = open_csv_writer(path, delimiter)?;
    writer
        .write_record(&dataset.headers)
        .with_context(|| format!("Writing headers to {path:?}"))?;
    for (idx, record) in dataset.records.iter().enumerate() {
        writer
            .write_record(dataset.render_record(record))
            .with_context(|| format!("Writing row {} to {path:?}", idx + 2))?;
    }
    writer
        .flush()
        .with_context(|| format!("Flushing output {path:?}"))?;
    Ok(())
}
