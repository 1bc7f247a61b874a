//! Curation: attach short display labels and derive the major-food subset.
//!
//! The two curated tables join differently on purpose. Major groups keep only rows present in
//! the mapping (inner join); major foods keep every selected row and leave the label empty when
//! the mapping has no entry (left join).

use serde::{Deserialize, Serialize};

use crate::types::{CuratedRecord, CurationMapping, LongRecord};

/// Which codes make up the major-food table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FoodSelection {
    /// Code prefix of the food category.
    pub prefix: String,
    /// Length of leaf-level food codes.
    pub code_len: usize,
    /// Code of the food category aggregate in the major-groups sheet.
    pub aggregate_code: String,
}

impl Default for FoodSelection {
    fn default() -> Self {
        Self {
            prefix: "01".to_string(),
            code_len: 4,
            aggregate_code: "01".to_string(),
        }
    }
}

impl FoodSelection {
    /// `true` for leaf food codes such as `0111`; excludes `01`, `011` and other categories.
    pub fn is_leaf_food_code(&self, code: &str) -> bool {
        code.starts_with(self.prefix.as_str()) && code.chars().count() == self.code_len
    }
}

/// Inner-join major-group records with `mapping` and order them by the mapping's label order,
/// then by month.
pub fn curate_major_groups(records: &[LongRecord], mapping: &CurationMapping) -> Vec<CuratedRecord> {
    let mut out: Vec<CuratedRecord> = records
        .iter()
        .filter_map(|r| {
            mapping.short_name(&r.code, &r.name).map(|short| CuratedRecord {
                record: r.clone(),
                short_name: Some(short.to_string()),
            })
        })
        .collect();

    out.sort_by_key(|c| {
        let rank = c
            .short_name
            .as_deref()
            .and_then(|s| mapping.rank(s))
            .unwrap_or(usize::MAX);
        (rank, c.record.month)
    });
    out
}

/// The food category aggregate from the major-groups extraction, followed by the leaf food
/// codes from the major-division extraction.
pub fn select_major_foods(
    divisions: &[LongRecord],
    groups: &[LongRecord],
    selection: &FoodSelection,
) -> Vec<LongRecord> {
    groups
        .iter()
        .filter(|r| r.code == selection.aggregate_code)
        .chain(divisions.iter().filter(|r| selection.is_leaf_food_code(&r.code)))
        .cloned()
        .collect()
}

/// Left-join food records with `mapping`; unmatched rows keep an empty label. Order is preserved.
pub fn curate_major_foods(records: &[LongRecord], mapping: &CurationMapping) -> Vec<CuratedRecord> {
    records
        .iter()
        .map(|r| CuratedRecord {
            record: r.clone(),
            short_name: mapping.short_name(&r.code, &r.name).map(str::to_string),
        })
        .collect()
}
