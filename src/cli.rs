use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::{schema::RenameMap, workbook::DEFAULT_SHEET};

#[derive(Debug, Parser)]
#[command(
    author,
    version,
    about = "Reconcile substation component exports against an authoritative workbook",
    long_about = None
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Merge both exports, reconcile them against the workbook and write all outputs
    Run(RunArgs),
    /// List the column headers of every input
    Columns(ColumnsArgs),
    /// Compare renamed source columns with the workbook for a single record
    Mapping(MappingArgs),
}

#[derive(Debug, Clone, Args)]
pub struct InputArgs {
    /// Directory holding the input files (relative file names resolve against it)
    #[arg(long = "data-dir", default_value = "Datasets")]
    pub data_dir: PathBuf,
    /// First source export; its rows win on duplicate OIDs
    #[arg(long = "source-one", default_value = "SUB1.csv")]
    pub source_one: PathBuf,
    /// Second source export
    #[arg(long = "source-two", default_value = "SUB2.csv")]
    pub source_two: PathBuf,
    /// Workbook holding the authoritative sheet
    #[arg(long, default_value = "SUB1-SUB2 115 kV -XcelUpdate.xlsx")]
    pub workbook: PathBuf,
    /// Name of the authoritative sheet inside the workbook
    #[arg(long, default_value = DEFAULT_SHEET)]
    pub sheet: String,
    /// Extra or replacement column renames of the form `FROM=TO`
    #[arg(long = "rename", value_parser = parse_rename, action = clap::ArgAction::Append)]
    pub renames: Vec<(String, String)>,
    /// CSV delimiter character for the source exports
    #[arg(long, value_parser = parse_delimiter)]
    pub delimiter: Option<u8>,
    /// Character encoding of the source exports (defaults to utf-8)
    #[arg(long = "input-encoding")]
    pub input_encoding: Option<String>,
}

impl InputArgs {
    pub fn source_one_path(&self) -> PathBuf {
        self.data_dir.join(&self.source_one)
    }

    pub fn source_two_path(&self) -> PathBuf {
        self.data_dir.join(&self.source_two)
    }

    pub fn workbook_path(&self) -> PathBuf {
        self.data_dir.join(&self.workbook)
    }

    /// The standard rename map with any `--rename` overrides applied.
    pub fn rename_map(&self) -> RenameMap {
        let mut map = RenameMap::standard();
        for (from, to) in &self.renames {
            map.insert(from, to);
        }
        map
    }
}

#[derive(Debug, Clone, Args)]
pub struct RunArgs {
    #[command(flatten)]
    pub inputs: InputArgs,
    /// Directory receiving the four output files (created when missing)
    #[arg(long = "output-dir", default_value = "Final")]
    pub output_dir: PathBuf,
    /// File name of the merged, deduplicated table
    #[arg(long = "merged-name", default_value = "SUB1-SUB2 115kV.csv")]
    pub merged_name: String,
    /// File name of the table flagged with the Mismatch column
    #[arg(long = "highlighted-name", default_value = "SUB1-SUB2 115kV_highlighted.csv")]
    pub highlighted_name: String,
    /// File name of the table with authoritative values applied
    #[arg(long = "updated-name", default_value = "SUB1-SUB2 115kV_updated.csv")]
    pub updated_name: String,
    /// File name of the field-level change log
    #[arg(long = "summary-name", default_value = "SUB1-SUB2 115kV_summary_report.csv")]
    pub summary_name: String,
}

#[derive(Debug, Clone, Args)]
pub struct ColumnsArgs {
    #[command(flatten)]
    pub inputs: InputArgs,
    /// Emit the listing as JSON instead of tables
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Clone, Args)]
pub struct MappingArgs {
    #[command(flatten)]
    pub inputs: InputArgs,
    /// OID of the source record to inspect (defaults to the second row of the first export)
    #[arg(long)]
    pub oid: Option<String>,
}

pub fn parse_delimiter(value: &str) -> Result<u8, String> {
    match value {
        "tab" | "\t" => Ok(b'\t'),
        "comma" | "," => Ok(b','),
        "|" | "pipe" => Ok(b'|'),
        ";" | "semicolon" => Ok(b';'),
        other => {
            let mut chars = other.chars();
            let first = chars
                .next()
                .ok_or_else(|| "Delimiter cannot be empty".to_string())?;
            if chars.next().is_some() {
                return Err("Delimiter must be a single character".to_string());
            }
            if !first.is_ascii() {
                return Err("Delimiter must be ASCII".to_string());
            }
            Ok(first as u8)
        }
    }
}

pub fn parse_rename(value: &str) -> Result<(String, String), String> {
    let (from, to) = value
        .split_once('=')
        .ok_or_else(|| format!("Rename '{value}' must be of the form FROM=TO"))?;
    let (from, to) = (from.trim(), to.trim());
    if from.is_empty() || to.is_empty() {
        return Err(format!("Rename '{value}' needs both a source and a target column"));
    }
    Ok((from.to_string(), to.to_string()))
}
