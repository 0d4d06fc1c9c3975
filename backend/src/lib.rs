//! # Cornerpivot - regroup per-corner point records into one row per identifier
//!
//! Input records describe one corner of one identifier (`12c/1.5/2.0/0.3`:
//! identifier 12, corner `c`, then x, y, z). Cornerpivot collects the four
//! corners of every identifier into a single row and exports the table as
//! CSV or XLSX with fixed, human-readable columns.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │  CSV bytes  │────▶│   Parser    │────▶│  Transform  │────▶│   Export    │
//! │  (ISO/UTF8) │     │  (auto-enc) │     │ (pivot rows)│     │ (CSV/XLSX)  │
//! └─────────────┘     └─────────────┘     └─────────────┘     └─────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use cornerpivot::{pivot_bytes, ExportFormat, PivotOptions};
//!
//! let result = pivot_bytes(b"1a/10/20/30\n1b/11/21/31", &PivotOptions::default())?;
//! let csv = ExportFormat::Csv.encode(&result.rows)?;
//! ```
//!
//! ## Modules
//!
//! - [`error`] - Error types
//! - [`models`] - Fragments, rows and their axis/corner grid
//! - [`parser`] - CSV tokenizing with auto-detection
//! - [`transform`] - Decoding, grouping, projection and the pipeline
//! - [`export`] - CSV and XLSX encoders
//! - [`api`] - HTTP API server

// Core modules
pub mod error;
pub mod models;

// Parsing
pub mod parser;

// Transformation
pub mod transform;

// Output
pub mod export;

// HTTP API
pub mod api;

// =============================================================================
// Re-exports - Error types
// =============================================================================

pub use error::{CsvError, DecodeError, EncodeError, PipelineError, ServerError};

// =============================================================================
// Re-exports - Models
// =============================================================================

pub use models::{Axis, Corner, Fragment, Row};

// =============================================================================
// Re-exports - CSV Parsing
// =============================================================================

pub use parser::{
    decode_content, detect_delimiter, detect_encoding, parse_bytes_auto, parse_file_auto,
    parse_records, ParseResult, RawRecord,
};

// =============================================================================
// Re-exports - Transform
// =============================================================================

pub use transform::{
    aggregate, decode, project, sequence, split_record, ProjectedRow, RowTable, HEADER,
};

pub use transform::pipeline::{
    pivot_bytes, pivot_file, pivot_records, CsvInfo, PivotOptions, PivotResult,
};

// =============================================================================
// Re-exports - Export
// =============================================================================

pub use export::{write_csv, write_xlsx, ExportFormat};

// Server
pub mod server {
    pub use crate::api::server::{router, start_server, ServerConfig};
}

// Pipeline
pub mod pipeline {
    pub use crate::transform::pipeline::*;
}
