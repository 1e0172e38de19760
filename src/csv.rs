//! Delimited text codec with an explicit column schema.
//!
//! The format is deliberately flat: no quoting, no escaping. A value
//! containing the delimiter cannot be represented, which is fine for the
//! numeric ids, species labels and timestamps this crate writes.
//!
//! Parsing is strict about the header: every required column must be
//! present or no rows are produced at all. Values are never coerced.

use std::collections::BTreeMap;

use crate::error::{Error, Result};

/// One row, keyed by column name. A missing key means the value was absent.
pub type Row = BTreeMap<String, String>;

/// Columns written by an export.
pub const EXPORT_COLUMNS: [&str; 4] = [
    "track_id",
    "identification_id",
    "identification_name",
    "identification_at",
];

/// Columns an import file must contain.
pub const IMPORT_COLUMNS: [&str; 3] = ["track_id", "identification_id", "identification_at"];

/// Render `rows` under a header of `columns`.
///
/// Absent values render as empty strings. The output always ends with a
/// newline.
#[must_use]
pub fn serialize(delimiter: &str, columns: &[&str], rows: &[Row]) -> String {
    let body = rows
        .iter()
        .map(|row| {
            columns
                .iter()
                .map(|column| row.get(*column).map_or("", String::as_str))
                .collect::<Vec<_>>()
                .join(delimiter)
        })
        .collect::<Vec<_>>()
        .join("\n");

    format!("{}\n{body}\n", columns.join(delimiter))
}

/// Parse `raw`, extracting the required `columns` from each line.
///
/// Blank lines are skipped and a trailing `\r` is stripped, so files with
/// CRLF endings parse the same as LF. Cells are trimmed.
///
/// # Errors
///
/// Returns `SchemaViolation` if the header lacks any required column.
pub fn parse(delimiter: &str, columns: &[&str], raw: &str) -> Result<Vec<Row>> {
    let mut lines = raw.split('\n').map(|line| line.strip_suffix('\r').unwrap_or(line));

    let header: Vec<&str> = lines
        .next()
        .map(|line| line.split(delimiter).map(str::trim).collect())
        .unwrap_or_default();

    let mut mappings = Vec::with_capacity(columns.len());
    let mut missing = Vec::new();
    for column in columns {
        match header.iter().position(|cell| cell == column) {
            Some(index) => mappings.push((*column, index)),
            None => missing.push((*column).to_string()),
        }
    }

    if !missing.is_empty() {
        return Err(Error::SchemaViolation {
            expected: columns.iter().map(|c| (*c).to_string()).collect(),
            missing,
        });
    }

    let rows = lines
        .filter(|line| !line.trim().is_empty())
        .map(|line| {
            let cells: Vec<&str> = line.split(delimiter).collect();
            mappings
                .iter()
                .filter_map(|(name, index)| {
                    cells
                        .get(*index)
                        .map(|value| ((*name).to_string(), value.trim().to_string()))
                })
                .collect()
        })
        .collect();

    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(pairs: &[(&str, &str)]) -> Row {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    #[test]
    fn test_serialize_layout() {
        let rows = vec![
            row(&[("a", "1"), ("b", "2")]),
            row(&[("b", "4")]),
        ];
        assert_eq!(serialize(",", &["a", "b"], &rows), "a,b\n1,2\n,4\n");
    }

    #[test]
    fn test_serialize_no_rows() {
        assert_eq!(serialize(",", &["a", "b"], &[]), "a,b\n\n");
    }

    #[test]
    fn test_serialize_preserves_column_order() {
        let rows = vec![row(&[("a", "1"), ("b", "2")])];
        assert_eq!(serialize(";", &["b", "a"], &rows), "b;a\n2;1\n");
    }

    #[test]
    fn test_round_trip() {
        let columns = ["track_id", "identification_id", "identification_at"];
        let rows = vec![
            row(&[("track_id", "5"), ("identification_id", "2"), ("identification_at", "2024-01-01T00:00:00.000Z")]),
            row(&[("track_id", "9"), ("identification_id", "0"), ("identification_at", "")]),
        ];

        let text = serialize(",", &columns, &rows);
        let parsed = parse(",", &columns, &text).unwrap();
        assert_eq!(parsed, rows);
    }

    #[test]
    fn test_parse_locates_columns_by_header() {
        let raw = "identification_at,extra,track_id,identification_id\nT,x,12,3\n";
        let rows = parse(",", &IMPORT_COLUMNS, raw).unwrap();
        assert_eq!(
            rows,
            vec![row(&[("track_id", "12"), ("identification_id", "3"), ("identification_at", "T")])]
        );
    }

    #[test]
    fn test_parse_missing_column_is_schema_violation() {
        let raw = "track_id,identification_id\n1,2\n";
        let err = parse(",", &IMPORT_COLUMNS, raw).unwrap_err();
        match err {
            Error::SchemaViolation { missing, expected } => {
                assert_eq!(missing, vec!["identification_at".to_string()]);
                assert_eq!(expected.len(), 3);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_parse_empty_input_is_schema_violation() {
        assert!(matches!(
            parse(",", &IMPORT_COLUMNS, ""),
            Err(Error::SchemaViolation { .. })
        ));
    }

    #[test]
    fn test_parse_short_line_leaves_values_absent() {
        let raw = "track_id,identification_id,identification_at\n7\n";
        let rows = parse(",", &IMPORT_COLUMNS, raw).unwrap();
        assert_eq!(rows, vec![row(&[("track_id", "7")])]);
    }

    #[test]
    fn test_parse_crlf_and_blank_lines() {
        let raw = "track_id,identification_id,identification_at\r\n1,2,T\r\n\r\n3,4,\r\n";
        let rows = parse(",", &IMPORT_COLUMNS, raw).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1]["identification_at"], "");
    }

    #[test]
    fn test_parse_does_not_coerce() {
        let raw = "track_id,identification_id,identification_at\nabc,1.5,whenever\n";
        let rows = parse(",", &IMPORT_COLUMNS, raw).unwrap();
        assert_eq!(rows[0]["track_id"], "abc");
        assert_eq!(rows[0]["identification_id"], "1.5");
    }
}
