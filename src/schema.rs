//! Column naming convention shared by the source exports and the
//! authoritative workbook.
//!
//! The authoritative sheet defines the target names. Source exports use a few
//! older spellings (`AMP Rating`, `High KV`, ...), which [`RenameMap`] maps onto
//! the target names before any comparison happens.

use std::collections::HashMap;

use serde::Serialize;

pub const OID: &str = "OID";
pub const STATION_NAME: &str = "Station Name";
pub const COMPONENT_DESCRIPTION: &str = "Component Description";
pub const ADDITIONAL_INFORMATION: &str = "Additional Information";

pub const MISMATCH: &str = "Mismatch";
pub const TYPE_OF_CHANGE: &str = "Type of Change";
pub const MISMATCH_YES: &str = "Yes";
pub const MISMATCH_NO: &str = "No";
pub const TYPE_OF_CHANGE_SEPARATOR: &str = ", ";

pub const CHANGE_LOG_HEADERS: [&str; 4] = [OID, "Column Updated", "Old Value", "New Value"];

/// Columns every input must carry for matching to work.
pub const KEY_COLUMNS: &[&str] = &[OID, STATION_NAME, COMPONENT_DESCRIPTION];

/// Output-only columns; never compared, never renamed.
pub const ANNOTATION_COLUMNS: &[&str] = &[MISMATCH, TYPE_OF_CHANGE];

/// Number of parallel rating type sets (normal/emergency x summer/winter).
pub const RATING_SETS: usize = 4;

/// Ordered source -> authoritative column renames.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenameMap {
    entries: Vec<(String, String)>,
}

impl Default for RenameMap {
    fn default() -> Self {
        Self::standard()
    }
}

impl RenameMap {
    pub fn empty() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// The mapping used by the substation exports: one `AMP Rating` column per
    /// rating set plus the three voltage columns.
    pub fn standard() -> Self {
        let mut map = Self::empty();
        for set in 0..RATING_SETS {
            map.insert(
                &suffixed("AMP Rating", set),
                &suffixed("High Rating", set),
            );
        }
        map.insert("High KV", "High kV");
        map.insert("Low KV", "Low kV");
        map.insert("Tertiary KV", "Tertiary kV");
        map
    }

    /// Adds a rename, replacing any existing entry for the same source column.
    pub fn insert(&mut self, from: &str, to: &str) {
        match self.entries.iter_mut().find(|(existing, _)| existing == from) {
            Some(entry) => entry.1 = to.to_string(),
            None => self.entries.push((from.to_string(), to.to_string())),
        }
    }

    pub fn target(&self, column: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(from, _)| from == column)
            .map(|(_, to)| to.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(from, to)| (from.as_str(), to.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// `name`, `name.1`, `name.2`, ... for rating set 0, 1, 2, ...
pub fn suffixed(name: &str, set: usize) -> String {
    if set == 0 {
        name.to_string()
    } else {
        format!("{name}.{set}")
    }
}

/// Header clean-up applied to every loaded table: blank names become
/// `Unnamed: {position}`, then repeats are made unique.
pub fn clean_headers(raw: Vec<String>) -> Vec<String> {
    let named = raw
        .into_iter()
        .enumerate()
        .map(|(idx, name)| {
            if name.trim().is_empty() {
                format!("Unnamed: {idx}")
            } else {
                name
            }
        })
        .collect();
    dedupe_headers(named)
}

/// Makes repeated header names unique by appending `.1`, `.2`, ... to later
/// occurrences. A generated name that is already taken is suffixed again.
pub fn dedupe_headers(headers: Vec<String>) -> Vec<String> {
    let mut counts: HashMap<String, usize> = HashMap::new();
    let mut result = Vec::with_capacity(headers.len());
    for header in headers {
        let mut name = header;
        let mut count = counts.get(&name).copied().unwrap_or(0);
        while count > 0 {
            counts.insert(name.clone(), count + 1);
            name = format!("{name}.{count}");
            count = counts.get(&name).copied().unwrap_or(0);
        }
        counts.insert(name.clone(), count + 1);
        result.push(name);
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn standard_map_covers_every_rating_set() {
        let map = RenameMap::standard();
        assert_eq!(map.target("AMP Rating"), Some("High Rating"));
        assert_eq!(map.target("AMP Rating.3"), Some("High Rating.3"));
        assert_eq!(map.target("High KV"), Some("High kV"));
        assert_eq!(map.target("Tertiary KV"), Some("Tertiary kV"));
        assert_eq!(map.target("Station Name"), None);
        assert_eq!(map.len(), 7);
    }

    #[test]
    fn insert_overrides_existing_source() {
        let mut map = RenameMap::standard();
        map.insert("High KV", "HV kV");
        assert_eq!(map.target("High KV"), Some("HV kV"));
        assert_eq!(map.len(), 7);
    }

    #[test]
    fn dedupe_headers_appends_counters() {
        let headers = names(&["AMP Rating", "Type", "AMP Rating", "AMP Rating"]);
        assert_eq!(
            dedupe_headers(headers),
            names(&["AMP Rating", "Type", "AMP Rating.1", "AMP Rating.2"])
        );
    }

    #[test]
    fn clean_headers_names_blank_columns() {
        let headers = names(&["OID", "", "OID", " "]);
        assert_eq!(
            clean_headers(headers),
            names(&["OID", "Unnamed: 1", "OID.1", "Unnamed: 3"])
        );
    }

    #[test]
    fn dedupe_headers_resuffixes_taken_names() {
        let headers = names(&["a", "a.1", "a"]);
        assert_eq!(dedupe_headers(headers), names(&["a", "a.1", "a.1.1"]));
    }
}
