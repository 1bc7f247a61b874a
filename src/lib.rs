//! `gaza-cpi` turns the Palestinian Central Bureau of Statistics Consumer Price Index workbook
//! for the Gaza Strip into tidy CSV tables.
//!
//! The workbook is laid out for reading, not for machines: months run left to right as column
//! groups, each with an index column and an optional percent-change column, and the spacing
//! differs between sheets and releases. The crate recovers that structure and produces:
//!
//! - a long table of every major division item,
//! - a long table of the major groups and one of the major foods, both with short labels taken
//!   from hand-maintained curation tables,
//! - wide (month × label) versions of the two curated tables, columns ordered by the latest
//!   index value.
//!
//! ## Quick example
//!
//! ```no_run
//! use gaza_cpi::config::PipelineConfig;
//! use gaza_cpi::pipeline::{build_outputs, PipelineOptions};
//!
//! # fn main() -> Result<(), gaza_cpi::PipelineError> {
//! let config = PipelineConfig::default().with_extras_dir("extras");
//! let outputs = build_outputs(&config, &PipelineOptions::default())?;
//! println!("groups={} labels={:?}", outputs.major_groups.len(), outputs.wide_groups.labels);
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! - [`ingestion`]: workbook and curation-table readers
//! - [`layout`]: month parsing, column scanning and sheet extraction
//! - [`processing`]: curation joins and the long → wide pivot
//! - [`output`]: CSV rendering and all-or-nothing publication
//! - [`pipeline`]: the end-to-end run with observer hooks
//! - [`config`]: run configuration
//! - [`types`]: cells, grids, months and records
//! - [`error`]: the error type shared by every stage

pub mod config;
pub mod error;
pub mod ingestion;
pub mod layout;
pub mod output;
pub mod pipeline;
pub mod processing;
pub mod types;

pub use error::{PipelineError, PipelineResult};
