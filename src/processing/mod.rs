//! In-memory transformations over extracted records.
//!
//! Currently implemented:
//!
//! - [`curation`]: short-label joins and the major-food subset
//! - [`reshape`]: long → wide pivot with presentation column order
//!
//! ## Example: curate → pivot
//!
//! ```rust
//! use gaza_cpi::processing::{curate_major_groups, pivot_wide, WideLayout};
//! use gaza_cpi::types::{CanonicalMonth, CurationEntry, CurationMapping, LongRecord};
//!
//! let month = CanonicalMonth::from_ymd(2024, 1).unwrap();
//! let record = |code: &str, name: &str, index: f64| LongRecord {
//!     code: code.to_string(),
//!     name: name.to_string(),
//!     month,
//!     index_value: Some(index),
//!     pct_change: None,
//! };
//!
//! let mapping = CurationMapping::new(vec![
//!     CurationEntry::new("0999", "Consumer Price Index", "All items"),
//!     CurationEntry::new("01", "Food and non-alcoholic beverages", "Food"),
//!     CurationEntry::new("12+13", "Miscellaneous goods and services", "Miscellaneous"),
//! ]);
//! let records = vec![
//!     record("0999", "Consumer Price Index", 150.0),
//!     record("01", "Food and non-alcoholic beverages", 210.0),
//!     record("12+13", "Miscellaneous goods and services", 120.0),
//! ];
//!
//! let curated = curate_major_groups(&records, &mapping);
//! let wide = pivot_wide(&curated, &WideLayout::major_groups()).unwrap();
//! assert_eq!(wide.labels, vec!["All items", "Food", "Miscellaneous"]);
//! assert_eq!(wide.rows[0].values, vec![Some(150.0), Some(210.0), Some(120.0)]);
//! ```

pub mod curation;
pub mod reshape;

pub use curation::{curate_major_foods, curate_major_groups, select_major_foods, FoodSelection};
pub use reshape::{column_order, latest_month, pivot_wide, unpivot, WideLayout};
