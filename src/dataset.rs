//! In-memory tables of component records.
//!
//! A [`Dataset`] owns an ordered header list and a vector of [`Record`]s.
//! Records store only non-null cells; a column that is absent from a record's
//! map is null. Column order lives on the dataset so that output files keep a
//! stable layout regardless of how records were assembled.

use std::collections::BTreeMap;

use crate::{data::Value, error::ReconError, schema};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    values: BTreeMap<String, Value>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, column: &str) -> Option<&Value> {
        self.values.get(column)
    }

    pub fn set(&mut self, column: &str, value: Option<Value>) {
        match value {
            Some(value) => {
                self.values.insert(column.to_string(), value);
            }
            None => {
                self.values.remove(column);
            }
        }
    }

    pub fn identifier(&self) -> Option<&Value> {
        self.get(schema::OID)
    }

    /// Moves a cell to a new column name. Null cells stay null.
    pub fn rename(&mut self, from: &str, to: &str) {
        if let Some(value) = self.values.remove(from) {
            self.values.insert(to.to_string(), value);
        }
    }

    pub fn non_null_columns(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }
}

impl<K: Into<String>> FromIterator<(K, Value)> for Record {
    fn from_iter<I: IntoIterator<Item = (K, Value)>>(iter: I) -> Self {
        Self {
            values: iter
                .into_iter()
                .map(|(column, value)| (column.into(), value))
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    /// Label used in log lines and error messages.
    pub name: String,
    pub headers: Vec<String>,
    pub records: Vec<Record>,
}

impl Dataset {
    pub fn new(name: impl Into<String>, headers: Vec<String>) -> Self {
        Self {
            name: name.into(),
            headers,
            records: Vec::new(),
        }
    }

    /// Builds a dataset from positional rows aligned with `headers`.
    pub fn from_rows(
        name: impl Into<String>,
        headers: Vec<String>,
        rows: Vec<Vec<Option<Value>>>,
    ) -> Self {
        let records = rows
            .into_iter()
            .map(|row| {
                headers
                    .iter()
                    .zip(row)
                    .filter_map(|(header, value)| value.map(|v| (header.clone(), v)))
                    .collect::<Record>()
            })
            .collect();
        Self {
            name: name.into(),
            headers,
            records,
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.headers.iter().any(|h| h == column)
    }

    pub fn column_index(&self, column: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == column)
    }

    /// Appends a header if it is not present yet. Returns whether it was added.
    pub fn push_column(&mut self, column: &str) -> bool {
        if self.has_column(column) {
            return false;
        }
        self.headers.push(column.to_string());
        true
    }

    pub fn require_columns(&self, columns: &[&str]) -> Result<(), ReconError> {
        match columns.iter().find(|column| !self.has_column(column)) {
            Some(missing) => Err(ReconError::MissingColumn {
                table: self.name.clone(),
                column: (*missing).to_string(),
            }),
            None => Ok(()),
        }
    }

    /// Renders a record as output cells in header order; nulls become "".
    pub fn render_record(&self, record: &Record) -> Vec<String> {
        self.headers
            .iter()
            .map(|header| {
                record
                    .get(header)
                    .map(Value::as_display)
                    .unwrap_or_default()
            })
            .collect()
    }

    pub fn rendered_rows(&self) -> Vec<Vec<String>> {
        self.records.iter().map(|r| self.render_record(r)).collect()
    }
}
