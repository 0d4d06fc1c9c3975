//! CSV encoder.

use csv::{Terminator, WriterBuilder};

use crate::error::{EncodeError, EncodeResult};
use crate::transform::projector::{ProjectedRow, HEADER};

/// Encode rows as CSV: header line, then one line per row.
///
/// Fields are quoted only when they contain a delimiter, quote or line
/// break. Lines end with CRLF.
pub fn write_csv(rows: &[ProjectedRow]) -> EncodeResult<Vec<u8>> {
    let mut writer = WriterBuilder::new()
        .terminator(Terminator::CRLF)
        .from_writer(Vec::new());

    writer.write_record(HEADER)?;
    for row in rows {
        writer.write_record(row.to_record())?;
    }

    writer.into_inner().map_err(|e| EncodeError::Io(e.into_error()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::projector::CELL_COUNT;

    fn row(identifier: u64, filled: &[&str]) -> ProjectedRow {
        let mut cells: [String; CELL_COUNT] = Default::default();
        for (cell, value) in cells.iter_mut().zip(filled) {
            *cell = value.to_string();
        }
        ProjectedRow { identifier, cells }
    }

    #[test]
    fn test_header_only() {
        let bytes = write_csv(&[]).unwrap();
        let text = String::from_utf8(bytes).unwrap();

        assert_eq!(
            text,
            "ID,Top Left x,Top Left y,Top Left z,Top Right x,Top Right y,Top Right z,\
             Bottom Right x,Bottom Right y,Bottom Right z,Bottom Left x,Bottom Left y,Bottom Left z\r\n"
        );
    }

    #[test]
    fn test_full_and_sparse_rows() {
        let rows = vec![
            row(1, &["10", "20", "30", "11", "21", "31", "12", "22", "32", "13", "23", "33"]),
            row(5, &["1", "2", "3"]),
        ];
        let text = String::from_utf8(write_csv(&rows).unwrap()).unwrap();
        let lines: Vec<&str> = text.split("\r\n").collect();

        assert_eq!(lines.len(), 4);
        assert_eq!(lines[1], "1,10,20,30,11,21,31,12,22,32,13,23,33");
        assert_eq!(lines[2], "5,1,2,3,,,,,,,,,");
        assert_eq!(lines[3], "");
    }

    #[test]
    fn test_embedded_delimiters_quoted() {
        let rows = vec![row(2, &["1,5", "say \"hi\"", "a\nb"])];
        let text = String::from_utf8(write_csv(&rows).unwrap()).unwrap();

        assert!(text.contains("2,\"1,5\",\"say \"\"hi\"\"\",\"a\nb\",,"));
    }
}
