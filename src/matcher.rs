//! Locating the authoritative counterpart of a merged record.
//!
//! Lookup order:
//!
//! 1. identifier (`OID`), when the record has one;
//! 2. station name + component description, preferring a candidate whose
//!    additional information also matches;
//! 3. station name + additional information, when no description matched.
//!
//! Keys are compared without trimming and case-sensitively. Numeric keys are
//! compared by value, so `163125` finds `163125.0`. When several authoritative
//! rows qualify, the first in sheet order wins.

use std::collections::HashMap;

use log::debug;

use crate::{
    data::Value,
    dataset::{Dataset, Record},
    schema::{ADDITIONAL_INFORMATION, COMPONENT_DESCRIPTION, STATION_NAME},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchKind {
    Identifier,
    Description,
    AdditionalInformation,
}

impl MatchKind {
    pub fn label(self) -> &'static str {
        match self {
            MatchKind::Identifier => "identifier",
            MatchKind::Description => "station + description",
            MatchKind::AdditionalInformation => "station + additional information",
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Match<'a> {
    /// Row position in the authoritative dataset.
    pub row: usize,
    pub record: &'a Record,
    pub kind: MatchKind,
}

/// Lookup tables over a borrowed authoritative dataset.
pub struct AuthoritativeIndex<'a> {
    table: &'a Dataset,
    by_identifier: HashMap<String, usize>,
    by_station: HashMap<String, Vec<usize>>,
}

impl<'a> AuthoritativeIndex<'a> {
    pub fn new(table: &'a Dataset) -> Self {
        let mut by_identifier = HashMap::new();
        let mut by_station: HashMap<String, Vec<usize>> = HashMap::new();
        for (row, record) in table.records.iter().enumerate() {
            if let Some(identifier) = record.identifier() {
                by_identifier.entry(identifier.key()).or_insert(row);
            }
            if let Some(station) = record.get(STATION_NAME) {
                by_station.entry(station.key()).or_default().push(row);
            }
        }
        Self {
            table,
            by_identifier,
            by_station,
        }
    }

    pub fn table(&self) -> &'a Dataset {
        self.table
    }

    pub fn find_by_identifier(&self, identifier: &Value) -> Option<Match<'a>> {
        self.by_identifier
            .get(&identifier.key())
            .map(|&row| self.matched(row, MatchKind::Identifier))
    }

    /// Returns the authoritative record for `record`, or `None` when nothing
    /// qualifies.
    pub fn find(&self, record: &Record) -> Option<Match<'a>> {
        if let Some(identifier) = record.identifier()
            && let Some(found) = self.find_by_identifier(identifier)
        {
            return Some(found);
        }

        let station = record.get(STATION_NAME)?;
        let candidates = self.by_station.get(&station.key())?;
        let additional = record.get(ADDITIONAL_INFORMATION);

        let described: Vec<usize> = match record.get(COMPONENT_DESCRIPTION) {
            Some(description) => candidates
                .iter()
                .copied()
                .filter(|&row| self.cell_matches(row, COMPONENT_DESCRIPTION, description))
                .collect(),
            None => Vec::new(),
        };

        if let Some(&first) = described.first() {
            if let Some(additional) = additional
                && let Some(&row) = described
                    .iter()
                    .find(|&&row| self.cell_matches(row, ADDITIONAL_INFORMATION, additional))
            {
                return Some(self.matched(row, MatchKind::Description));
            }
            if described.len() > 1 {
                debug!(
                    "{} authoritative rows share station '{}' and description; using row {}",
                    described.len(),
                    station,
                    first + 2
                );
            }
            return Some(self.matched(first, MatchKind::Description));
        }

        let additional = additional?;
        candidates
            .iter()
            .copied()
            .find(|&row| self.cell_matches(row, ADDITIONAL_INFORMATION, additional))
            .map(|row| self.matched(row, MatchKind::AdditionalInformation))
    }

    fn cell_matches(&self, row: usize, column: &str, wanted: &Value) -> bool {
        self.table.records[row]
            .get(column)
            .is_some_and(|value| value.key() == wanted.key())
    }

    fn matched(&self, row: usize, kind: MatchKind) -> Match<'a> {
        Match {
            row,
            record: &self.table.records[row],
            kind,
        }
    }
}
