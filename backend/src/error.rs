//! Error types for the cornerpivot pipeline.
//!
//! - [`CsvError`] - the input could not be tokenized into records
//! - [`DecodeError`] - a record's first field does not carry an identifier
//! - [`EncodeError`] - an output encoder (CSV or XLSX) failed
//! - [`PipelineError`] - a parse run was aborted
//! - [`ServerError`] - HTTP-facing failures
//!
//! Parse failures ([`CsvError`], [`DecodeError`]) abort the whole run so the
//! previously loaded table stays in place. [`EncodeError`] only aborts the
//! export that raised it.

use thiserror::Error;

// =============================================================================
// CSV Tokenizing Errors
// =============================================================================

/// Errors raised while turning raw input into records.
#[derive(Debug, Error)]
pub enum CsvError {
    /// Failed to read the input.
    #[error("Failed to read file: {0}")]
    IoError(#[from] std::io::Error),

    /// The CSV reader rejected the input.
    #[error("Invalid CSV format: {0}")]
    ParseError(#[from] csv::Error),

    /// The CSV reader only splits on single-byte delimiters.
    #[error("Delimiter '{0}' is not a single ASCII character")]
    InvalidDelimiter(char),

    /// The input held no records at all.
    #[error("CSV file is empty")]
    EmptyFile,
}

// =============================================================================
// Record Decoding Errors
// =============================================================================

/// Errors raised while decoding one record into a fragment.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// The record has no fields.
    #[error("Record has no fields")]
    EmptyRecord,

    /// The first field does not start with a digit.
    #[error("Identifier field '{field}' does not start with a digit")]
    NonNumericIdentifier { field: String },

    /// The leading digit run does not fit in a `u64`.
    #[error("Identifier in field '{field}' is too large")]
    IdentifierOverflow { field: String },
}

// =============================================================================
// Encoding Errors
// =============================================================================

/// Errors from the output encoders.
#[derive(Debug, Error)]
pub enum EncodeError {
    /// CSV writer failure.
    #[error("CSV encoding failed: {0}")]
    Csv(#[from] csv::Error),

    /// XLSX writer failure.
    #[error("XLSX encoding failed: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),

    /// More rows than the sheet can address.
    #[error("Too many rows for one worksheet: {0}")]
    TooManyRows(usize),

    /// Flushing the encoded buffer failed.
    #[error("Failed to flush encoded output: {0}")]
    Io(#[from] std::io::Error),
}

// =============================================================================
// Pipeline Errors (top-level)
// =============================================================================

/// A parse run was aborted.
///
/// Returned by [`crate::transform::pipeline::pivot_bytes`] and friends. No
/// rows are ever published when this is returned.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The tokenizer failed.
    #[error("CSV error: {0}")]
    Csv(#[from] CsvError),

    /// A record could not be decoded.
    #[error("Line {line}: {source}")]
    Decode {
        /// 1-based line of the offending record.
        line: u64,
        #[source]
        source: DecodeError,
    },
}

impl PipelineError {
    /// Attach a record line to a decode failure.
    pub fn decode(line: u64, source: DecodeError) -> Self {
        Self::Decode { line, source }
    }
}

// =============================================================================
// Server Errors
// =============================================================================

/// HTTP server errors.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Parsing the uploaded file failed.
    #[error("Pipeline error: {0}")]
    Pipeline(#[from] PipelineError),

    /// Exporting the current table failed.
    #[error("Export error: {0}")]
    Encode(#[from] EncodeError),

    /// Malformed request.
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Nothing to export yet.
    #[error("No table loaded")]
    NoTable,

    /// The blocking parse task panicked or was cancelled.
    #[error("Background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for tokenizing.
pub type CsvResult<T> = Result<T, CsvError>;

/// Result type for record decoding.
pub type DecodeResult<T> = Result<T, DecodeError>;

/// Result type for the output encoders.
pub type EncodeResult<T> = Result<T, EncodeError>;

/// Result type for pipeline runs.
pub type PipelineResult<T> = Result<T, PipelineError>;

/// Result type for server operations.
pub type ServerResult<T> = Result<T, ServerError>;
