//! Long → wide reshaping with presentation column order.
//!
//! Wide tables have one row per month and one column per short label. Columns are ordered by
//! each series' index value at the latest month (descending), except that one label is pinned
//! first and one pinned last. Some codes are left out of the ordering entirely.

use std::cmp::Ordering;
use std::collections::{BTreeSet, HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::error::{PipelineError, PipelineResult};
use crate::types::{CanonicalMonth, CuratedRecord, WideRow, WideTable};

/// Fixed positions and exclusions for a wide table's columns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WideLayout {
    /// Label always placed first.
    pub first_label: String,
    /// Label always placed last.
    pub last_label: String,
    /// Codes left out of the ordered middle section.
    pub excluded_codes: Vec<String>,
}

impl WideLayout {
    /// Major groups: `All items` first, `Miscellaneous` (12+13) last. Group 02 (alcohol and
    /// tobacco) is omitted for its extreme values; 12 and 13 are folded into 12+13.
    pub fn major_groups() -> Self {
        Self {
            first_label: "All items".to_string(),
            last_label: "Miscellaneous".to_string(),
            excluded_codes: ["0999", "02", "12", "13", "12+13"]
                .into_iter()
                .map(String::from)
                .collect(),
        }
    }

    /// Major foods: `All food and drink` first, `Other food products` last.
    pub fn major_foods() -> Self {
        Self {
            first_label: "All food and drink".to_string(),
            last_label: "Other food products".to_string(),
            excluded_codes: ["01", "0119"].into_iter().map(String::from).collect(),
        }
    }

    fn is_pinned(&self, label: &str) -> bool {
        label == self.first_label || label == self.last_label
    }
}

/// Latest month present in `records`.
pub fn latest_month(records: &[CuratedRecord]) -> Option<CanonicalMonth> {
    records.iter().map(|c| c.record.month).max()
}

/// Compute the wide column order: first label, the remaining labels at the latest month sorted
/// by index value descending, last label.
///
/// The sort is stable, so ties keep their order in `records`. Missing values sort last and rows
/// without a short label are left out.
pub fn column_order(records: &[CuratedRecord], layout: &WideLayout) -> Vec<String> {
    let mut order = vec![layout.first_label.clone()];

    if let Some(latest) = latest_month(records) {
        let mut middle: Vec<(&str, Option<f64>)> = records
            .iter()
            .filter(|c| c.record.month == latest)
            .filter(|c| !layout.excluded_codes.contains(&c.record.code))
            .filter_map(|c| c.short_name.as_deref().map(|s| (s, c.record.index_value)))
            .filter(|(label, _)| !layout.is_pinned(label))
            .collect();
        middle.sort_by(|a, b| descending_missing_last(a.1, b.1));
        order.extend(middle.into_iter().map(|(label, _)| label.to_string()));
    }

    order.push(layout.last_label.clone());
    order
}

fn descending_missing_last(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) => y.total_cmp(&x),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Pivot curated records into a [`WideTable`] using [`column_order`].
///
/// Every label in the order must occur in `records` ([`PipelineError::MissingColumn`]
/// otherwise), and no (month, label) pair may occur twice ([`PipelineError::PivotConflict`]).
/// Labels outside the order are dropped.
pub fn pivot_wide(records: &[CuratedRecord], layout: &WideLayout) -> PipelineResult<WideTable> {
    let labels = column_order(records, layout);
    let position: HashMap<&str, usize> = labels
        .iter()
        .enumerate()
        .map(|(i, l)| (l.as_str(), i))
        .collect();

    let months: BTreeSet<CanonicalMonth> = records.iter().map(|c| c.record.month).collect();
    let row_of: HashMap<CanonicalMonth, usize> = months.iter().enumerate().map(|(i, m)| (*m, i)).collect();
    let mut rows: Vec<WideRow> = months
        .iter()
        .map(|m| WideRow {
            month: *m,
            values: vec![None; labels.len()],
        })
        .collect();

    let mut seen: HashSet<(CanonicalMonth, &str)> = HashSet::new();
    let mut present: HashSet<&str> = HashSet::new();
    for c in records {
        let Some(label) = c.short_name.as_deref() else {
            continue;
        };
        if !seen.insert((c.record.month, label)) {
            return Err(PipelineError::PivotConflict {
                label: label.to_string(),
                month: c.record.month.to_string(),
            });
        }
        present.insert(label);
        if let Some(&col) = position.get(label) {
            rows[row_of[&c.record.month]].values[col] = c.record.index_value;
        }
    }

    if let Some(missing) = labels.iter().find(|l| !present.contains(l.as_str())) {
        return Err(PipelineError::MissingColumn {
            context: "wide table".to_string(),
            column: missing.clone(),
        });
    }

    Ok(WideTable { labels, rows })
}

/// Flatten a wide table back into (label, month, value) triples, skipping empty cells.
pub fn unpivot(table: &WideTable) -> Vec<(String, CanonicalMonth, f64)> {
    let mut out = Vec::new();
    for row in &table.rows {
        for (label, value) in table.labels.iter().zip(&row.values) {
            if let Some(v) = value {
                out.push((label.clone(), row.month, *v));
            }
        }
    }
    out
}
