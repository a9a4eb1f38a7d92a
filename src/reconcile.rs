//! Applying authoritative values to merged records.
//!
//! Each merged record moves through a single pass: it is either left
//! [`RecordState::Unmatched`] or matched, compared and ends up
//! [`RecordState::Reconciled`]. The pass produces two independent datasets:
//!
//! - *highlighted*: merged values untouched, plus a `Mismatch` flag;
//! - *updated*: differing fields overwritten with authoritative values, plus
//!   `Mismatch` and `Type of Change`.

use itertools::Itertools;
use log::{debug, info};

use crate::{
    compare::{Comparator, FieldDifference},
    data::Value,
    dataset::{Dataset, Record},
    matcher::{AuthoritativeIndex, MatchKind},
    schema::{MISMATCH, MISMATCH_NO, MISMATCH_YES, TYPE_OF_CHANGE, TYPE_OF_CHANGE_SEPARATOR},
};

#[derive(Debug, Clone, PartialEq)]
pub enum RecordState {
    /// No authoritative counterpart; the record passes through unchanged.
    Unmatched,
    Reconciled {
        kind: MatchKind,
        authoritative_row: usize,
        differences: Vec<FieldDifference>,
    },
}

impl RecordState {
    pub fn differences(&self) -> &[FieldDifference] {
        match self {
            RecordState::Unmatched => &[],
            RecordState::Reconciled { differences, .. } => differences,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecordOutcome {
    /// Position in the merged dataset.
    pub row: usize,
    /// Identifier as it was before reconciliation.
    pub identifier: Option<Value>,
    pub state: RecordState,
}

impl RecordOutcome {
    pub fn differences(&self) -> &[FieldDifference] {
        self.state.differences()
    }

    pub fn is_matched(&self) -> bool {
        matches!(self.state, RecordState::Reconciled { .. })
    }

    pub fn is_mismatch(&self) -> bool {
        !self.differences().is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct Reconciliation {
    pub highlighted: Dataset,
    pub updated: Dataset,
    pub outcomes: Vec<RecordOutcome>,
}

impl Reconciliation {
    pub fn mismatched(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_mismatch()).count()
    }

    pub fn unmatched(&self) -> usize {
        self.outcomes.iter().filter(|o| !o.is_matched()).count()
    }

    pub fn field_changes(&self) -> usize {
        self.outcomes.iter().map(|o| o.differences().len()).sum()
    }
}

pub fn mismatch_flag(differences: &[FieldDifference]) -> Value {
    Value::text(if differences.is_empty() {
        MISMATCH_NO
    } else {
        MISMATCH_YES
    })
}

pub fn type_of_change(differences: &[FieldDifference]) -> Value {
    Value::text(
        differences
            .iter()
            .map(|d| d.column.as_str())
            .join(TYPE_OF_CHANGE_SEPARATOR),
    )
}

/// Overwrites every differing field with its authoritative value, in order,
/// and stamps the annotation columns.
pub fn apply_differences(record: &mut Record, differences: &[FieldDifference]) {
    for difference in differences {
        record.set(&difference.column, difference.new.clone());
    }
    record.set(MISMATCH, Some(mismatch_flag(differences)));
    record.set(TYPE_OF_CHANGE, Some(type_of_change(differences)));
}

pub fn reconcile(merged: &Dataset, authoritative: &Dataset) -> Reconciliation {
    let index = AuthoritativeIndex::new(authoritative);
    let comparator = Comparator::new(&merged.headers, &authoritative.headers);
    debug!(
        "Comparing {} shared column(s) against {}",
        comparator.columns().len(),
        authoritative.name
    );

    let mut highlighted = merged.clone();
    highlighted.name = format!("{} (highlighted)", merged.name);
    highlighted.push_column(MISMATCH);

    let mut updated = merged.clone();
    updated.name = format!("{} (updated)", merged.name);
    updated.push_column(MISMATCH);
    updated.push_column(TYPE_OF_CHANGE);

    let mut outcomes = Vec::with_capacity(merged.len());
    for (row, record) in merged.records.iter().enumerate() {
        let state = match index.find(record) {
            Some(found) => {
                debug!(
                    "Row {} matched authoritative row {} by {}",
                    row + 2,
                    found.row + 2,
                    found.kind.label()
                );
                RecordState::Reconciled {
                    kind: found.kind,
                    authoritative_row: found.row,
                    differences: comparator.compare(record, found.record),
                }
            }
            None => RecordState::Unmatched,
        };

        let differences = state.differences();
        highlighted.records[row].set(MISMATCH, Some(mismatch_flag(differences)));
        apply_differences(&mut updated.records[row], differences);

        outcomes.push(RecordOutcome {
            row,
            identifier: record.identifier().cloned(),
            state,
        });
    }

    let reconciliation = Reconciliation {
        highlighted,
        updated,
        outcomes,
    };
    let mismatched = reconciliation.mismatched();
    let unmatched = reconciliation.unmatched();
    info!("Components with mismatches: {mismatched}");
    info!("Components not in {}: {unmatched}", authoritative.name);
    info!(
        "Components matching: {}",
        merged.len() - mismatched - unmatched
    );
    info!(
        "Updated {mismatched} component(s), {} field change(s)",
        reconciliation.field_changes()
    );
    reconciliation
}
