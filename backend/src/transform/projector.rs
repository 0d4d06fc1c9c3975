//! Project rows onto the fixed output column layout.
//!
//! Both exporters write exactly [`HEADER`], in this order. Cells with no
//! value become [`EMPTY_CELL`].

use serde::{Deserialize, Serialize};

use crate::models::{Axis, Corner, Row};

/// Label of the identifier column.
pub const ID_COLUMN: &str = "ID";

/// Placeholder written for cells no fragment supplied.
pub const EMPTY_CELL: &str = "";

/// Number of corner/axis columns.
pub const CELL_COUNT: usize = 12;

/// One corner/axis output column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellColumn {
    pub label: &'static str,
    pub axis: Axis,
    pub corner: Corner,
}

const fn column(label: &'static str, axis: Axis, corner: Corner) -> CellColumn {
    CellColumn { label, axis, corner }
}

/// Corner/axis columns in output order: every axis of a corner, corner by corner.
pub const CELL_COLUMNS: [CellColumn; CELL_COUNT] = [
    column("Top Left x", Axis::X, Corner::TopLeft),
    column("Top Left y", Axis::Y, Corner::TopLeft),
    column("Top Left z", Axis::Z, Corner::TopLeft),
    column("Top Right x", Axis::X, Corner::TopRight),
    column("Top Right y", Axis::Y, Corner::TopRight),
    column("Top Right z", Axis::Z, Corner::TopRight),
    column("Bottom Right x", Axis::X, Corner::BottomRight),
    column("Bottom Right y", Axis::Y, Corner::BottomRight),
    column("Bottom Right z", Axis::Z, Corner::BottomRight),
    column("Bottom Left x", Axis::X, Corner::BottomLeft),
    column("Bottom Left y", Axis::Y, Corner::BottomLeft),
    column("Bottom Left z", Axis::Z, Corner::BottomLeft),
];

/// Full header row shared by every exporter.
pub const HEADER: [&str; CELL_COUNT + 1] = [
    ID_COLUMN,
    CELL_COLUMNS[0].label,
    CELL_COLUMNS[1].label,
    CELL_COLUMNS[2].label,
    CELL_COLUMNS[3].label,
    CELL_COLUMNS[4].label,
    CELL_COLUMNS[5].label,
    CELL_COLUMNS[6].label,
    CELL_COLUMNS[7].label,
    CELL_COLUMNS[8].label,
    CELL_COLUMNS[9].label,
    CELL_COLUMNS[10].label,
    CELL_COLUMNS[11].label,
];

/// Output-ready view of a [`Row`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectedRow {
    pub identifier: u64,
    /// Cell values in [`CELL_COLUMNS`] order.
    pub cells: [String; CELL_COUNT],
}

impl ProjectedRow {
    /// Value of one corner/axis cell.
    pub fn cell(&self, axis: Axis, corner: Corner) -> &str {
        CELL_COLUMNS
            .iter()
            .position(|c| c.axis == axis && c.corner == corner)
            .map(|i| self.cells[i].as_str())
            .unwrap_or(EMPTY_CELL)
    }

    /// All 13 fields as text, in [`HEADER`] order.
    pub fn to_record(&self) -> Vec<String> {
        let mut record = Vec::with_capacity(HEADER.len());
        record.push(self.identifier.to_string());
        record.extend(self.cells.iter().cloned());
        record
    }
}

/// Project one row.
pub fn project(row: &Row) -> ProjectedRow {
    ProjectedRow {
        identifier: row.identifier(),
        cells: CELL_COLUMNS.map(|c| row.get(c.axis, c.corner).unwrap_or(EMPTY_CELL).to_string()),
    }
}

/// Project rows, keeping their order.
pub fn project_all(rows: &[Row]) -> Vec<ProjectedRow> {
    rows.iter().map(project).collect()
}
