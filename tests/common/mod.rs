#![allow(dead_code)]

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use rust_xlsxwriter::Workbook;
use substation_recon::data::Value;
use substation_recon::dataset::Dataset;
use tempfile::{TempDir, tempdir};

/// Scratch directory helper that cleans up files automatically on drop.
pub struct TestWorkspace {
    temp_dir: TempDir,
}

impl TestWorkspace {
    pub fn new() -> Self {
        Self {
            temp_dir: tempdir().expect("temp dir"),
        }
    }

    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Writes `contents` into a file under the workspace and returns the path.
    pub fn write(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.temp_dir.path().join(name);
        let mut file = File::create(&path).expect("create temp file");
        file.write_all(contents.as_bytes())
            .expect("write temp file contents");
        path
    }

    /// Writes a single-sheet xlsx workbook and returns its path.
    pub fn write_workbook(&self, name: &str, sheet: &str, rows: &[Vec<Cell>]) -> PathBuf {
        let path = self.temp_dir.path().join(name);
        let mut workbook = Workbook::new();
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(sheet).expect("sheet name");
        for (row_idx, row) in rows.iter().enumerate() {
            for (col_idx, cell) in row.iter().enumerate() {
                let (r, c) = (row_idx as u32, col_idx as u16);
                match cell {
                    Cell::Text(text) => {
                        worksheet.write_string(r, c, *text).expect("write string");
                    }
                    Cell::Number(number) => {
                        worksheet.write_number(r, c, *number).expect("write number");
                    }
                    Cell::Blank => {}
                }
            }
        }
        workbook.save(&path).expect("save workbook");
        path
    }
}

#[derive(Debug, Clone, Copy)]
pub enum Cell {
    Text(&'static str),
    Number(f64),
    Blank,
}

pub fn t(value: &'static str) -> Cell {
    Cell::Text(value)
}

pub fn n(value: f64) -> Cell {
    Cell::Number(value)
}

/// Builds an in-memory dataset; `None` cells are null.
pub fn dataset(name: &str, headers: &[&str], rows: Vec<Vec<Option<Value>>>) -> Dataset {
    Dataset::from_rows(
        name,
        headers.iter().map(|h| h.to_string()).collect(),
        rows,
    )
}

pub fn text(value: &str) -> Option<Value> {
    Some(Value::text(value))
}

pub fn int(value: i64) -> Option<Value> {
    Some(Value::Integer(value))
}

pub fn dec(value: &str) -> Option<Value> {
    Some(Value::Decimal(value.parse().expect("decimal literal")))
}

/// Reads a CSV output back as rows of strings, header first.
pub fn read_csv(path: &Path) -> Vec<Vec<String>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .from_path(path)
        .expect("open output csv");
    reader
        .records()
        .map(|record| {
            record
                .expect("output record")
                .iter()
                .map(|field| field.to_string())
                .collect()
        })
        .collect()
}

/// Looks up `column` for every data row of a CSV read with [`read_csv`].
pub fn column_values(rows: &[Vec<String>], column: &str) -> Vec<String> {
    let idx = rows[0]
        .iter()
        .position(|h| h == column)
        .unwrap_or_else(|| panic!("column {column} missing from {:?}", rows[0]));
    rows[1..].iter().map(|row| row[idx].clone()).collect()
}
