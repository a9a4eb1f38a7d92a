use std::collections::HashSet;

use log::info;

use crate::dataset::Dataset;

#[derive(Debug, Clone)]
pub struct MergeOutcome {
    pub merged: Dataset,
    pub combined_rows: usize,
    pub duplicates_removed: usize,
}

/// Stacks `first` over `second` and drops later records whose identifier was
/// already seen. Records without an identifier are always kept.
///
/// The header list is the union of both inputs: `first`'s order, then any
/// column only `second` carries.
pub fn merge_sources(first: &Dataset, second: &Dataset, name: &str) -> MergeOutcome {
    let mut merged = Dataset::new(name, first.headers.clone());
    for header in &second.headers {
        merged.push_column(header);
    }

    let combined_rows = first.len() + second.len();
    let mut seen: HashSet<String> = HashSet::new();
    let mut duplicates_removed = 0usize;

    for record in first.records.iter().chain(second.records.iter()) {
        if let Some(identifier) = record.identifier()
            && !seen.insert(identifier.key())
        {
            duplicates_removed += 1;
            continue;
        }
        merged.records.push(record.clone());
    }

    info!("Combined rows: {combined_rows}");
    if duplicates_removed > 0 {
        info!("Removed {duplicates_removed} duplicate(s)");
    }
    info!("Final merged rows: {}", merged.len());

    MergeOutcome {
        merged,
        combined_rows,
        duplicates_removed,
    }
}
