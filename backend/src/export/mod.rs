//! Output encoders.
//!
//! Both encoders take the same projected rows and write [`HEADER`] first,
//! so a CSV and an XLSX export of one table always line up column for
//! column.
//!
//! [`HEADER`]: crate::transform::projector::HEADER

pub mod csv;
pub mod xlsx;

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::EncodeResult;
use crate::transform::projector::ProjectedRow;

pub use self::csv::write_csv;
pub use self::xlsx::{write_xlsx, SHEET_NAME};

/// Supported download formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Csv,
    Xlsx,
}

impl ExportFormat {
    pub const ALL: [ExportFormat; 2] = [ExportFormat::Csv, ExportFormat::Xlsx];

    /// Download file name.
    pub fn file_name(self) -> &'static str {
        match self {
            ExportFormat::Csv => "output.csv",
            ExportFormat::Xlsx => "output.xlsx",
        }
    }

    /// MIME type of the encoded blob.
    pub fn content_type(self) -> &'static str {
        match self {
            ExportFormat::Csv => "text/csv;charset=utf-8",
            ExportFormat::Xlsx => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        }
    }

    /// Encode rows in this format.
    pub fn encode(self, rows: &[ProjectedRow]) -> EncodeResult<Vec<u8>> {
        match self {
            ExportFormat::Csv => write_csv(rows),
            ExportFormat::Xlsx => write_xlsx(rows),
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExportFormat::Csv => write!(f, "csv"),
            ExportFormat::Xlsx => write!(f, "xlsx"),
        }
    }
}
