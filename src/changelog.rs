use crate::{
    data::Value,
    dataset::{Dataset, Record},
    reconcile::RecordOutcome,
    schema::CHANGE_LOG_HEADERS,
};

/// A single overwritten field.
#[derive(Debug, Clone, PartialEq)]
pub struct ChangeEntry {
    pub identifier: Option<Value>,
    pub column: String,
    pub old: Option<Value>,
    pub new: Option<Value>,
}

/// Flattened audit trail of a reconciliation pass: one entry per changed field,
/// grouped by record in merge order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChangeLog {
    pub entries: Vec<ChangeEntry>,
}

impl ChangeLog {
    pub fn from_outcomes(outcomes: &[RecordOutcome]) -> Self {
        let entries = outcomes
            .iter()
            .flat_map(|outcome| {
                outcome.differences().iter().map(|difference| ChangeEntry {
                    identifier: outcome.identifier.clone(),
                    column: difference.column.clone(),
                    old: difference.old.clone(),
                    new: difference.new.clone(),
                })
            })
            .collect();
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn to_dataset(&self) -> Dataset {
        let [oid, column, old, new] = CHANGE_LOG_HEADERS;
        let mut dataset = Dataset::new(
            "change log",
            CHANGE_LOG_HEADERS.iter().map(|h| h.to_string()).collect(),
        );
        dataset.records = self
            .entries
            .iter()
            .map(|entry| {
                let mut record = Record::new();
                record.set(oid, entry.identifier.clone());
                record.set(column, Some(Value::text(entry.column.clone())));
                record.set(old, entry.old.clone());
                record.set(new, entry.new.clone());
                record
            })
            .collect();
        dataset
    }
}
