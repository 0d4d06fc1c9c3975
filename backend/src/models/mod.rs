//! Domain models for the pivot pipeline.
//!
//! - [`Axis`] / [`Corner`] - the two bounded dimensions of a row's cell grid
//! - [`Fragment`] - one decoded input record (one corner of one identifier)
//! - [`Row`] - every corner collected so far for one identifier

use serde::{Deserialize, Serialize};

// =============================================================================
// Axis
// =============================================================================

/// Coordinate axis of a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    /// All axes, in column order.
    pub const ALL: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];

    /// Position in the cell grid.
    pub fn index(self) -> usize {
        self as usize
    }

}

// =============================================================================
// Corner
// =============================================================================

/// One of the four corners a fragment can describe.
///
/// Input records tag corners with a single letter: `a` top-left, `b`
/// top-right, `c` bottom-right, `d` bottom-left.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Corner {
    TopLeft,
    TopRight,
    BottomRight,
    BottomLeft,
}

impl Corner {
    /// All corners, in column order.
    pub const ALL: [Corner; 4] = [
        Corner::TopLeft,
        Corner::TopRight,
        Corner::BottomRight,
        Corner::BottomLeft,
    ];

    /// Map an input tag to a corner. Tags are case-sensitive.
    pub fn from_tag(tag: char) -> Option<Self> {
        match tag {
            'a' => Some(Corner::TopLeft),
            'b' => Some(Corner::TopRight),
            'c' => Some(Corner::BottomRight),
            'd' => Some(Corner::BottomLeft),
            _ => None,
        }
    }

    /// Position in the cell grid.
    pub fn index(self) -> usize {
        self as usize
    }
}

// =============================================================================
// Fragment
// =============================================================================

/// One decoded input record.
///
/// Axis values are carried as the exact text found in the input. `None`
/// means the record stopped before that field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fragment {
    pub identifier: u64,
    pub corner_tag: char,
    pub x: Option<String>,
    pub y: Option<String>,
    pub z: Option<String>,
}

impl Fragment {
    /// Corner this fragment fills, if its tag is one of `a`..`d`.
    pub fn corner(&self) -> Option<Corner> {
        Corner::from_tag(self.corner_tag)
    }

    /// The three axis values in [`Axis::ALL`] order.
    pub fn into_values(self) -> [Option<String>; 3] {
        [self.x, self.y, self.z]
    }
}

// =============================================================================
// Row
// =============================================================================

/// All cells collected for one identifier.
///
/// Known corners live in a fixed 3×4 grid. Fragments with any other tag are
/// kept aside in `unplaced`, in arrival order, and never reach the output
/// columns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    identifier: u64,
    cells: [[Option<String>; 4]; 3],
    unplaced: Vec<(char, [Option<String>; 3])>,
}

impl Row {
    /// Create an empty row.
    pub fn new(identifier: u64) -> Self {
        Self {
            identifier,
            cells: Default::default(),
            unplaced: Vec::new(),
        }
    }

    pub fn identifier(&self) -> u64 {
        self.identifier
    }

    /// Value stored for one cell.
    pub fn get(&self, axis: Axis, corner: Corner) -> Option<&str> {
        self.cells[axis.index()][corner.index()].as_deref()
    }

    /// Overwrite one cell.
    pub fn set(&mut self, axis: Axis, corner: Corner, value: Option<String>) {
        self.cells[axis.index()][corner.index()] = value;
    }

    /// Write a fragment's x, y and z into the cells of its corner.
    ///
    /// Whatever the corner held before is replaced, including with `None`
    /// when the fragment is missing a value.
    pub fn apply(&mut self, fragment: Fragment) {
        let tag = fragment.corner_tag;
        let corner = fragment.corner();
        let values = fragment.into_values();

        match corner {
            Some(corner) => {
                for (axis, value) in Axis::ALL.into_iter().zip(values) {
                    self.set(axis, corner, value);
                }
            }
            None => {
                self.unplaced.push((tag, values));
            }
        }
    }

    /// Tag of every fragment applied outside `a`..`d`, repeats included.
    pub fn unplaced_tags(&self) -> impl Iterator<Item = char> + '_ {
        self.unplaced.iter().map(|(tag, _)| *tag)
    }

    /// Number of fragments that had no corner to fill.
    pub fn unplaced_count(&self) -> usize {
        self.unplaced.len()
    }
}
