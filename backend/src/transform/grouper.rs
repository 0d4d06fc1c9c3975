//! Group fragments into one row per identifier.
//!
//! ```text
//! Fragments (input order)           Rows (ascending identifier)
//! ┌──────────────────────┐          ┌──────────────────────────┐
//! │ 9a  1  2  3          │          │ 2   a: 4 5 6  b: 0 0 0   │
//! │ 2a  4  5  6          │    →     ├──────────────────────────┤
//! │ 9b  7  8  9          │          │ 9   a: 1 2 3  b: 7 8 9   │
//! │ 2b  0  0  0          │          └──────────────────────────┘
//! └──────────────────────┘
//! ```
//!
//! [`aggregate`] is a single left-to-right fold; a later fragment for the
//! same corner replaces the earlier one. [`sequence`] materializes the
//! ordered rows once at the end.

use std::collections::HashMap;

use crate::models::{Fragment, Row};

/// Rows keyed by identifier.
pub type RowTable = HashMap<u64, Row>;

/// Fold fragments into rows, creating each row on first sight.
pub fn aggregate<I>(fragments: I) -> RowTable
where
    I: IntoIterator<Item = Fragment>,
{
    let mut rows = RowTable::new();

    for fragment in fragments {
        rows.entry(fragment.identifier)
            .or_insert_with(|| Row::new(fragment.identifier))
            .apply(fragment);
    }

    rows
}

/// Rows in ascending numeric identifier order.
pub fn sequence(rows: RowTable) -> Vec<Row> {
    let mut ordered: Vec<Row> = rows.into_values().collect();
    ordered.sort_unstable_by_key(Row::identifier);
    ordered
}
