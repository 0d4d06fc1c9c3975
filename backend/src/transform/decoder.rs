//! Decode one input record into a [`Fragment`].
//!
//! A record's first field packs the identifier and the corner tag together
//! (`12c`): the identifier is the leading digit run, the tag is the last
//! character. Fields two to four are the x, y and z values, kept as text.

use crate::error::{DecodeError, DecodeResult, PipelineError, PipelineResult};
use crate::models::Fragment;
use crate::parser::RawRecord;

/// Separator used when a whole record is packed into one cell.
pub const PACKED_SEPARATOR: char = '/';

/// Turn a tokenized row into decoder fields.
///
/// When the first cell holds a packed record (`1a/10/20/30`) it is split on
/// `/` and the remaining cells are ignored. Otherwise the cells are already
/// the fields.
pub fn split_record<S: AsRef<str>>(cells: &[S]) -> Vec<&str> {
    match cells.first().map(AsRef::as_ref) {
        Some(first) if first.contains(PACKED_SEPARATOR) => first.split(PACKED_SEPARATOR).collect(),
        _ => cells.iter().map(AsRef::as_ref).collect(),
    }
}

/// Decode a record's fields into a fragment.
///
/// The first field is read as-is: leading whitespace means there is no
/// identifier, and a trailing space is the corner tag. Axis values are taken
/// verbatim; fields beyond the fourth are ignored.
pub fn decode<S: AsRef<str>>(fields: &[S]) -> DecodeResult<Fragment> {
    let head = fields
        .first()
        .map(|f| f.as_ref())
        .ok_or(DecodeError::EmptyRecord)?;

    let digits_len = head
        .bytes()
        .take_while(|b| b.is_ascii_digit())
        .count();

    if digits_len == 0 {
        return Err(DecodeError::NonNumericIdentifier {
            field: head.to_string(),
        });
    }

    let identifier = head[..digits_len]
        .parse::<u64>()
        .map_err(|_| DecodeError::IdentifierOverflow {
            field: head.to_string(),
        })?;

    // Non-empty: it starts with at least one digit.
    let corner_tag = head.chars().last().unwrap_or_default();

    let value = |i: usize| fields.get(i).map(|f| f.as_ref().to_string());

    Ok(Fragment {
        identifier,
        corner_tag,
        x: value(1),
        y: value(2),
        z: value(3),
    })
}

/// Split and decode a tokenized record, tagging failures with its line.
pub fn decode_record(record: &RawRecord) -> PipelineResult<Fragment> {
    let fields = split_record(&record.cells);
    decode(&fields).map_err(|e| PipelineError::decode(record.line, e))
}
