//! High-level pipeline API: raw input to projected rows.
//!
//! One run goes tokenize → decode → aggregate → sequence → project in a
//! single synchronous pass. Either every record is decoded and the rows are
//! returned, or the run fails and nothing is returned.
//!
//! # Example
//!
//! ```rust,ignore
//! use cornerpivot::pipeline::{pivot_file, PivotOptions};
//! use cornerpivot::export::ExportFormat;
//!
//! let result = pivot_file("points.csv", &PivotOptions::default())?;
//! let bytes = ExportFormat::Xlsx.encode(&result.rows)?;
//! std::fs::write(ExportFormat::Xlsx.file_name(), bytes)?;
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::Path;

use super::decoder::decode_record;
use super::grouper::{aggregate, sequence};
use super::projector::{project_all, ProjectedRow};
use crate::api::logs::{log_info, log_success, log_warning};
use crate::error::PipelineResult;
use crate::models::Row;
use crate::parser::{parse_bytes_auto, parse_file_auto, ParseResult, RawRecord};

/// Options for a pipeline run
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PivotOptions {
    /// Force a delimiter instead of auto-detecting it
    pub delimiter: Option<char>,

    /// Drop the first record (a header line)
    pub skip_header: bool,
}

/// Input file information
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CsvInfo {
    pub encoding: String,
    pub delimiter: char,
    /// Non-blank records read, header excluded
    pub record_count: usize,
}

/// Result of a pipeline run
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PivotResult {
    /// One row per identifier, ascending
    pub rows: Vec<ProjectedRow>,

    /// Fragments whose corner tag is not `a`..`d`
    pub unplaced_fragments: usize,

    pub csv_info: CsvInfo,
}

/// Run the pipeline on a file.
pub fn pivot_file<P: AsRef<Path>>(path: P, options: &PivotOptions) -> PipelineResult<PivotResult> {
    log_info(format!("📖 Reading {}", path.as_ref().display()));
    let parsed = parse_file_auto(path, options.delimiter)?;
    pivot_parsed(parsed, options)
}

/// Run the pipeline on raw bytes (an uploaded file).
pub fn pivot_bytes(bytes: &[u8], options: &PivotOptions) -> PipelineResult<PivotResult> {
    log_info(format!("📖 Reading {} bytes", bytes.len()));
    let parsed = parse_bytes_auto(bytes, options.delimiter)?;
    pivot_parsed(parsed, options)
}

fn pivot_parsed(parsed: ParseResult, options: &PivotOptions) -> PipelineResult<PivotResult> {
    log_success(format!("Detected encoding: {}", parsed.encoding));
    log_success(format!("Detected separator: '{}'", format_delimiter(parsed.delimiter)));

    let records = if options.skip_header {
        parsed.records.get(1..).unwrap_or_default()
    } else {
        &parsed.records[..]
    };
    log_success(format!("Read {} records", records.len()));

    let (rows, unplaced_fragments) = pivot_records(records)?;

    Ok(PivotResult {
        rows,
        unplaced_fragments,
        csv_info: CsvInfo {
            encoding: parsed.encoding,
            delimiter: parsed.delimiter,
            record_count: records.len(),
        },
    })
}

/// Decode, group, order and project tokenized records.
///
/// Returns the projected rows and the number of fragments whose corner tag
/// has no output column.
pub fn pivot_records(records: &[RawRecord]) -> PipelineResult<(Vec<ProjectedRow>, usize)> {
    log_info("⚙️  Decoding records...");
    let fragments = records
        .iter()
        .map(decode_record)
        .collect::<PipelineResult<Vec<_>>>()?;

    log_info("📦 Grouping by identifier...");
    let rows = sequence(aggregate(fragments));
    log_success(format!("{} rows from {} records", rows.len(), records.len()));

    let unplaced: usize = rows.iter().map(Row::unplaced_count).sum();
    if unplaced > 0 {
        let tags: BTreeSet<char> = rows.iter().flat_map(Row::unplaced_tags).collect();
        log_warning(format!(
            "{} fragment(s) with corner tag(s) {:?} outside a-d will not be exported",
            unplaced, tags
        ));
    }

    Ok((project_all(&rows), unplaced))
}

/// Format delimiter for display
fn format_delimiter(d: char) -> String {
    match d {
        '\t' => "TAB".to_string(),
        c => c.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{DecodeError, PipelineError};
    use crate::export::ExportFormat;
    use crate::models::{Axis, Corner};

    fn run(input: &str) -> PivotResult {
        pivot_bytes(input.as_bytes(), &PivotOptions::default()).unwrap()
    }

    #[test]
    fn test_full_row() {
        let result = run("1a/10/20/30\n1b/11/21/31\n1c/12/22/32\n1d/13/23/33\n");

        assert_eq!(result.rows.len(), 1);
        assert_eq!(
            result.rows[0].to_record(),
            vec!["1", "10", "20", "30", "11", "21", "31", "12", "22", "32", "13", "23", "33"]
        );
        assert_eq!(result.csv_info.record_count, 4);
        assert_eq!(result.unplaced_fragments, 0);
    }

    #[test]
    fn test_sparse_row() {
        let result = run("5a/1/2/3");

        let row = &result.rows[0];
        assert_eq!(row.identifier, 5);
        assert_eq!(row.cells[..3], ["1", "2", "3"]);
        assert!(row.cells[3..].iter().all(|c| c.is_empty()));
    }

    #[test]
    fn test_ordering_and_merging() {
        let result = run("9a/1/1/1\n2a/2/2/2\n9b/3/3/3\n2b/4/4/4\n");

        let ids: Vec<u64> = result.rows.iter().map(|r| r.identifier).collect();
        assert_eq!(ids, vec![2, 9]);
        assert_eq!(result.rows[0].cell(Axis::X, Corner::TopLeft), "2");
        assert_eq!(result.rows[0].cell(Axis::X, Corner::TopRight), "4");
        assert_eq!(result.rows[1].cell(Axis::X, Corner::TopLeft), "1");
        assert_eq!(result.rows[1].cell(Axis::X, Corner::TopRight), "3");
    }

    #[test]
    fn test_values_kept_verbatim() {
        let result = run("3a/1.500/-0.0/1e3\n");
        let row = &result.rows[0];

        assert_eq!(row.cell(Axis::X, Corner::TopLeft), "1.500");
        assert_eq!(row.cell(Axis::Y, Corner::TopLeft), "-0.0");
        assert_eq!(row.cell(Axis::Z, Corner::TopLeft), "1e3");
    }

    #[test]
    fn test_overwrite_law() {
        let result = run("4d/1/2/3\n4d/7/8/9\n");
        let row = &result.rows[0];

        assert_eq!(row.cell(Axis::X, Corner::BottomLeft), "7");
        assert_eq!(row.cell(Axis::Y, Corner::BottomLeft), "8");
        assert_eq!(row.cell(Axis::Z, Corner::BottomLeft), "9");
    }

    #[test]
    fn test_separate_columns() {
        let result = run("2a;1;2;3\n1c;4;5;6\n");

        assert_eq!(result.csv_info.delimiter, ';');
        assert_eq!(result.rows[0].identifier, 1);
        assert_eq!(result.rows[0].cell(Axis::Z, Corner::BottomRight), "6");
    }

    #[test]
    fn test_unknown_corner_counted() {
        let result = run("1a/1/2/3\n1x/4/5/6\n2x/7/8/9\n1x/0/0/0\n");

        assert_eq!(result.unplaced_fragments, 3);
        assert_eq!(result.rows.len(), 2);
        assert!(result.rows[1].cells.iter().all(|c| c.is_empty()));
    }

    #[test]
    fn test_trailing_space_tag_not_placed() {
        let result = run("1a /1/2/3\n1b/4/5/6\n");

        assert_eq!(result.unplaced_fragments, 1);
        assert_eq!(result.rows[0].cell(Axis::X, Corner::TopLeft), "");
        assert_eq!(result.rows[0].cell(Axis::X, Corner::TopRight), "4");
    }

    #[test]
    fn test_leading_space_rejected() {
        let err = pivot_bytes(b"1a/1/2/3\n 2b/4/5/6\n", &PivotOptions::default());
        assert!(matches!(err, Err(PipelineError::Decode { line: 2, .. })));
    }

    #[test]
    fn test_skip_header() {
        let options = PivotOptions {
            skip_header: true,
            ..Default::default()
        };
        let result = pivot_bytes(b"id,x,y,z\n1a,1,2,3\n", &options).unwrap();

        assert_eq!(result.rows.len(), 1);
        assert_eq!(result.csv_info.record_count, 1);
    }

    #[test]
    fn test_header_without_skip_fails() {
        let err = pivot_bytes(b"id,x,y,z\n1a,1,2,3\n", &PivotOptions::default()).unwrap_err();

        match err {
            PipelineError::Decode { line, source } => {
                assert_eq!(line, 1);
                assert!(matches!(source, DecodeError::NonNumericIdentifier { .. }));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_bad_record_aborts_run() {
        let err = pivot_bytes(b"1a/1/2/3\nfoo/1/2/3\n2a/1/2/3\n", &PivotOptions::default());
        assert!(matches!(err, Err(PipelineError::Decode { line: 2, .. })));
    }

    #[test]
    fn test_empty_input() {
        let err = pivot_bytes(b"", &PivotOptions::default());
        assert!(matches!(err, Err(PipelineError::Csv(_))));
    }

    #[test]
    fn test_deterministic_output() {
        let input = "7b/1/2/3\n3a/4/5/6\n7a/7/8/9\n3d/a b/\n";

        let first = ExportFormat::Csv.encode(&run(input).rows).unwrap();
        let second = ExportFormat::Csv.encode(&run(input).rows).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_pivot_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("points.csv");
        std::fs::write(&path, "2b/1/2/3\n").unwrap();

        let result = pivot_file(&path, &PivotOptions::default()).unwrap();
        assert_eq!(result.rows[0].cell(Axis::Y, Corner::TopRight), "2");
    }

    #[test]
    fn test_missing_file() {
        let err = pivot_file("/definitely/not/here.csv", &PivotOptions::default());
        assert!(matches!(err, Err(PipelineError::Csv(_))));
    }
}
