//! Schema normalization of a source export onto the authoritative naming.

use std::collections::HashSet;

use log::debug;

use crate::{
    dataset::Dataset,
    error::ReconError,
    schema::{ANNOTATION_COLUMNS, RenameMap},
};

/// Renames source columns per `renames`, then appends every authoritative
/// column the source lacks as an all-null column. Source-only columns are
/// kept as they are. The input dataset is left untouched.
pub fn normalize_source(
    source: &Dataset,
    authoritative_headers: &[String],
    renames: &RenameMap,
) -> Result<Dataset, ReconError> {
    let mut headers = Vec::with_capacity(source.headers.len());
    let mut taken: HashSet<&str> = HashSet::new();
    let mut applied: Vec<(&str, &str)> = Vec::new();

    for header in &source.headers {
        let target = match renames.target(header) {
            Some(target) if target != header => {
                // The target must not already exist, either untouched in the
                // source or as the result of another rename.
                if source.has_column(target) || taken.contains(target) {
                    return Err(ReconError::SchemaCollision {
                        table: source.name.clone(),
                        from: header.clone(),
                        to: target.to_string(),
                    });
                }
                applied.push((header.as_str(), target));
                target
            }
            _ => header.as_str(),
        };
        taken.insert(target);
        headers.push(target.to_string());
    }

    let mut normalized = Dataset::new(source.name.clone(), headers);
    normalized.records = source
        .records
        .iter()
        .map(|record| {
            let mut record = record.clone();
            for (from, to) in &applied {
                record.rename(from, to);
            }
            record
        })
        .collect();

    let mut added = 0usize;
    for column in authoritative_headers {
        if ANNOTATION_COLUMNS.contains(&column.as_str()) {
            continue;
        }
        if normalized.push_column(column) {
            added += 1;
        }
    }

    debug!(
        "Normalized {}: {} column(s) renamed, {} authoritative column(s) added",
        normalized.name,
        applied.len(),
        added
    );
    Ok(normalized)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Value;

    fn names(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn renames_and_appends_authoritative_columns() {
        let source = Dataset::from_rows(
            "sub1",
            names(&["OID", "AMP Rating", "High KV", "Group"]),
            vec![vec![
                Some(Value::Integer(1)),
                Some(Value::Integer(2000)),
                Some(Value::Integer(115)),
                Some(Value::text("G1")),
            ]],
        );
        let authoritative = names(&["OID", "High Rating", "Low Rating", "High kV"]);
        let normalized =
            normalize_source(&source, &authoritative, &RenameMap::standard()).unwrap();

        assert_eq!(
            normalized.headers,
            names(&["OID", "High Rating", "High kV", "Group", "Low Rating"])
        );
        let record = &normalized.records[0];
        assert_eq!(record.get("High Rating"), Some(&Value::Integer(2000)));
        assert_eq!(record.get("AMP Rating"), None);
        assert_eq!(record.get("Low Rating"), None);
        assert_eq!(record.get("Group"), Some(&Value::text("G1")));
        // Input is not mutated.
        assert!(source.has_column("AMP Rating"));
    }

    #[test]
    fn collision_with_existing_column_is_an_error() {
        let source = Dataset::new("sub2", names(&["OID", "AMP Rating", "High Rating"]));
        let err = normalize_source(&source, &[], &RenameMap::standard()).unwrap_err();
        assert!(matches!(
            err,
            ReconError::SchemaCollision { ref from, ref to, .. }
                if from == "AMP Rating" && to == "High Rating"
        ));
    }

    #[test]
    fn two_renames_onto_one_target_collide() {
        let mut renames = RenameMap::empty();
        renames.insert("HV", "High kV");
        renames.insert("High KV", "High kV");
        let source = Dataset::new("sub1", names(&["HV", "High KV"]));
        assert!(normalize_source(&source, &[], &renames).is_err());
    }

    #[test]
    fn annotation_columns_are_not_copied_from_authoritative() {
        let source = Dataset::new("sub1", names(&["OID"]));
        let authoritative = names(&["OID", "Mismatch", "Type of Change"]);
        let normalized =
            normalize_source(&source, &authoritative, &RenameMap::standard()).unwrap();
        assert_eq!(normalized.headers, names(&["OID"]));
    }
}
