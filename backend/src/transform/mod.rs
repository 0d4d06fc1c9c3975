//! Transformation module.
//!
//! Raw records to ordered, projected rows:
//! - Decoder: one record to one fragment
//! - Grouper: fragments to one row per identifier, ascending
//! - Projector: rows to the fixed output columns
//! - Pipeline: the whole pass, with progress logging

pub mod decoder;
pub mod grouper;
pub mod pipeline;
pub mod projector;

pub use decoder::{decode, decode_record, split_record};
pub use grouper::{aggregate, sequence, RowTable};
pub use pipeline::*;
pub use projector::{project, project_all, ProjectedRow, CELL_COLUMNS, EMPTY_CELL, HEADER};
