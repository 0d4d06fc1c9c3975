//! XLSX encoder.
//!
//! Writes a single worksheet named [`SHEET_NAME`] holding the header row and
//! one row per identifier. Identifiers become numeric cells when `f64` can
//! hold them exactly; every corner value is a text cell, and absent values
//! leave the cell blank.

use rust_xlsxwriter::{DocProperties, ExcelDateTime, Workbook, Worksheet};

use crate::error::{EncodeError, EncodeResult};
use crate::transform::projector::{ProjectedRow, CELL_COLUMNS, HEADER};

/// Name of the only worksheet.
pub const SHEET_NAME: &str = "Sheet1";

/// Largest integer an `f64` represents exactly.
const MAX_EXACT_NUMBER: u64 = 1 << 53;

/// Encode rows as an XLSX workbook.
///
/// The document creation date is pinned so identical rows always encode to
/// identical bytes.
pub fn write_xlsx(rows: &[ProjectedRow]) -> EncodeResult<Vec<u8>> {
    let mut workbook = Workbook::new();
    let created = ExcelDateTime::from_ymd(2000, 1, 1)?;
    workbook.set_properties(&DocProperties::new().set_creation_datetime(&created));

    let worksheet = workbook.add_worksheet();
    worksheet.set_name(SHEET_NAME)?;

    for (col, label) in (0u16..).zip(HEADER) {
        worksheet.write_string(0, col, label)?;
    }

    for (index, row) in rows.iter().enumerate() {
        let row_num = u32::try_from(index + 1).map_err(|_| EncodeError::TooManyRows(rows.len()))?;
        write_row(worksheet, row_num, row)?;
    }

    Ok(workbook.save_to_buffer()?)
}

fn write_row(worksheet: &mut Worksheet, row_num: u32, row: &ProjectedRow) -> EncodeResult<()> {
    if row.identifier <= MAX_EXACT_NUMBER {
        worksheet.write_number(row_num, 0, row.identifier as f64)?;
    } else {
        worksheet.write_string(row_num, 0, row.identifier.to_string())?;
    }

    for (col, column) in (1u16..).zip(CELL_COLUMNS) {
        let value = row.cell(column.axis, column.corner);
        if !value.is_empty() {
            worksheet.write_string(row_num, col, value)?;
        }
    }

    Ok(())
}
