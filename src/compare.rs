use std::collections::HashSet;

use crate::{
    data::Value,
    dataset::Record,
    schema::{ANNOTATION_COLUMNS, OID},
};

/// One column where a merged record disagrees with its authoritative match.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDifference {
    pub column: String,
    pub old: Option<Value>,
    pub new: Option<Value>,
}

/// Null-safe equality over canonical forms: two nulls are equal, a null never
/// equals a value, and values compare by trimmed, numerically normalized text.
pub fn values_equal(left: Option<&Value>, right: Option<&Value>) -> bool {
    match (left, right) {
        (None, None) => true,
        (Some(left), Some(right)) => left.canonical() == right.canonical(),
        _ => false,
    }
}

/// Field-by-field comparison over the columns both tables share.
///
/// The identifier is the match key rather than a reconciled field, and the
/// annotation columns are output-only, so neither is compared.
#[derive(Debug, Clone)]
pub struct Comparator {
    columns: Vec<String>,
}

impl Comparator {
    pub fn new(merged_headers: &[String], authoritative_headers: &[String]) -> Self {
        let authoritative: HashSet<&str> =
            authoritative_headers.iter().map(String::as_str).collect();
        let columns = merged_headers
            .iter()
            .filter(|column| authoritative.contains(column.as_str()))
            .filter(|column| column.as_str() != OID)
            .filter(|column| !ANNOTATION_COLUMNS.contains(&column.as_str()))
            .cloned()
            .collect();
        Self { columns }
    }

    /// Compared columns, in merged-table order.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn compare(&self, merged: &Record, authoritative: &Record) -> Vec<FieldDifference> {
        self.columns
            .iter()
            .filter_map(|column| {
                let old = merged.get(column);
                let new = authoritative.get(column);
                if values_equal(old, new) {
                    None
                } else {
                    Some(FieldDifference {
                        column: column.clone(),
                        old: old.cloned(),
                        new: new.cloned(),
                    })
                }
            })
            .collect()
    }
}
