//! Delimiter detection and table parsing.
//!
//! Source systems export with commas, semicolons or tabs depending on locale
//! and tooling, and never say which. Each candidate delimiter gets a full
//! parse; the first one whose header row splits into more than one distinct
//! column wins.

use std::collections::HashSet;

use csv::{ReaderBuilder, StringRecord, Trim};
use serde::{Deserialize, Serialize};

use crate::error::{IngestError, Result};

/// Candidate delimiters, most common first.
pub const DEFAULT_DELIMITERS: [u8; 3] = [b',', b';', b'\t'];

/// Maximum number of data rows accepted in one import.
pub const MAX_IMPORT_ROWS: usize = 10_000;

/// What to do when no candidate delimiter yields more than one column.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DelimiterPolicy {
    /// Use the parse of the last candidate (a single-column table).
    #[default]
    FallbackToLast,
    /// Reject the upload.
    FailClosed,
}

/// One data row, keyed by the original header spelling.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawRow {
    cells: Vec<(String, String)>,
}

impl RawRow {
    pub fn new(cells: Vec<(String, String)>) -> Self {
        Self { cells }
    }

    /// Pairs headers with record fields. Fields past the header width are
    /// dropped; headers past the record width are absent.
    fn from_record(headers: &[String], record: &StringRecord) -> Self {
        let cells = headers
            .iter()
            .zip(record.iter())
            .map(|(header, value)| (header.clone(), value.to_string()))
            .collect();
        Self { cells }
    }

    /// Value under an exact original header (the last one on duplicates).
    pub fn get(&self, header: &str) -> Option<&str> {
        self.cells
            .iter()
            .rev()
            .find(|(name, _)| name == header)
            .map(|(_, value)| value.as_str())
    }

    pub fn cells(&self) -> impl Iterator<Item = (&str, &str)> {
        self.cells
            .iter()
            .map(|(header, value)| (header.as_str(), value.as_str()))
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

/// Result of parsing an upload with one delimiter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedTable {
    delimiter: u8,
    headers: Vec<String>,
    rows: Vec<RawRow>,
}

impl ParsedTable {
    pub fn delimiter(&self) -> u8 {
        self.delimiter
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[RawRow] {
        &self.rows
    }

    pub fn into_rows(self) -> Vec<RawRow> {
        self.rows
    }

    /// Number of data rows (the header row is not counted).
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn distinct_columns(&self) -> usize {
        self.headers.iter().collect::<HashSet<_>>().len()
    }
}

/// Parses `content` with the first delimiter that yields a multi-column
/// header.
///
/// A candidate that fails to parse is skipped. When none yields more than one
/// column, `policy` decides between the last candidate's parse and
/// [`IngestError::DelimiterUndetectable`]. Fails with
/// [`IngestError::EmptyContent`] if nothing parsed or no data rows remain.
pub fn detect_and_parse(
    content: &str,
    delimiters: &[u8],
    policy: DelimiterPolicy,
) -> Result<ParsedTable> {
    let mut last = None;

    for &delimiter in delimiters {
        match parse_with_delimiter(content, delimiter) {
            Ok(table) if table.distinct_columns() > 1 => {
                tracing::debug!(
                    delimiter = %char::from(delimiter).escape_default(),
                    columns = table.headers.len(),
                    rows = table.len(),
                    "Detected delimiter"
                );
                return non_empty(table);
            }
            Ok(table) => {
                tracing::trace!(
                    delimiter = %char::from(delimiter).escape_default(),
                    "Candidate delimiter produced a single column"
                );
                last = Some(table);
            }
            Err(error) => {
                tracing::debug!(
                    delimiter = %char::from(delimiter).escape_default(),
                    %error,
                    "Candidate delimiter failed to parse"
                );
                last = None;
            }
        }
    }

    let table = last.ok_or(IngestError::EmptyContent)?;
    if table.is_empty() {
        return Err(IngestError::EmptyContent);
    }
    match policy {
        DelimiterPolicy::FallbackToLast => {
            tracing::warn!(
                delimiter = %char::from(table.delimiter).escape_default(),
                "No delimiter produced more than one column; using the last candidate"
            );
            Ok(table)
        }
        DelimiterPolicy::FailClosed => Err(IngestError::DelimiterUndetectable),
    }
}

/// Rejects tables with more than `max_rows` data rows.
pub fn enforce_row_cap(table: &ParsedTable, max_rows: usize) -> Result<()> {
    if table.len() > max_rows {
        return Err(IngestError::TooManyRows {
            rows: table.len(),
            max: max_rows,
        });
    }
    Ok(())
}

fn non_empty(table: ParsedTable) -> Result<ParsedTable> {
    if table.is_empty() {
        Err(IngestError::EmptyContent)
    } else {
        Ok(table)
    }
}

fn parse_with_delimiter(content: &str, delimiter: u8) -> std::result::Result<ParsedTable, csv::Error> {
    let mut reader = ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(content.as_bytes());

    let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        // Whitespace-only lines arrive as a single empty field.
        if record.len() == 1 && record.get(0).is_some_and(str::is_empty) {
            continue;
        }
        rows.push(RawRow::from_record(&headers, &record));
    }

    Ok(ParsedTable {
        delimiter,
        headers,
        rows,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(content: &str) -> Result<ParsedTable> {
        detect_and_parse(content, &DEFAULT_DELIMITERS, DelimiterPolicy::FallbackToLast)
    }

    #[test]
    fn test_comma() {
        let table = parse("fio,sana,summa\nAli,05.03.2024,100\nVali,06.03.2024,200\n").unwrap();
        assert_eq!(table.delimiter(), b',');
        assert_eq!(table.headers(), ["fio", "sana", "summa"]);
        assert_eq!(table.len(), 2);
        assert_eq!(table.rows()[1].get("summa"), Some("200"));
    }

    #[test]
    fn test_semicolon() {
        let table = parse("fio;sana;summa\nAli;05.03.2024;1,5\n").unwrap();
        assert_eq!(table.delimiter(), b';');
        assert_eq!(table.rows()[0].get("summa"), Some("1,5"));
    }

    #[test]
    fn test_tab() {
        let table = parse("fio\tsana\nAli, Vali\t05.03.2024\n").unwrap();
        assert_eq!(table.delimiter(), b'\t');
        assert_eq!(table.rows()[0].get("fio"), Some("Ali, Vali"));
    }

    #[test]
    fn test_quoted_fields_and_crlf() {
        let table = parse("name,comment\r\n\"Aliyev, Vali\",\"line one\nline \"\"two\"\"\"\r\n").unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(table.rows()[0].get("name"), Some("Aliyev, Vali"));
        assert_eq!(
            table.rows()[0].get("comment"),
            Some("line one\nline \"two\"")
        );
    }

    #[test]
    fn test_uneven_column_counts() {
        let table = parse("a,b,c\n1,2\n1,2,3,4\n").unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.rows()[0].len(), 2);
        assert_eq!(table.rows()[0].get("c"), None);
        assert_eq!(table.rows()[1].len(), 3);
        assert_eq!(table.rows()[1].get("c"), Some("3"));
    }

    #[test]
    fn test_cells_trimmed_and_blank_lines_skipped() {
        let table = parse(" a , b \n\n  1 ,  2  \n   \n3,4\n").unwrap();
        assert_eq!(table.headers(), ["a", "b"]);
        assert_eq!(table.len(), 2);
        assert_eq!(table.rows()[0].get("a"), Some("1"));
    }

    #[test]
    fn test_single_column_falls_back_to_last() {
        let table = parse("fio\nAli\nVali\n").unwrap();
        assert_eq!(table.delimiter(), b'\t');
        assert_eq!(table.headers(), ["fio"]);
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_single_column_fail_closed() {
        let result = detect_and_parse("fio\nAli\n", &DEFAULT_DELIMITERS, DelimiterPolicy::FailClosed);
        assert_eq!(result, Err(IngestError::DelimiterUndetectable));
    }

    #[test]
    fn test_duplicate_header_is_one_column() {
        let table = parse("fio;fio\nAli;Vali\n").unwrap();
        assert_eq!(table.delimiter(), b'\t');
        assert_eq!(table.distinct_columns(), 1);
    }

    #[test]
    fn test_stray_quote_is_tolerated() {
        // The first candidate still wins; no fallback to the next delimiter.
        let table = parse("fio,izoh\nAli,\"5\" ekran\n").unwrap();
        assert_eq!(table.delimiter(), b',');
        assert_eq!(table.len(), 1);
        assert_eq!(table.rows()[0].get("fio"), Some("Ali"));
        assert!(table.rows()[0].get("izoh").is_some_and(|v| v.contains("ekran")));
    }

    #[test]
    fn test_empty_content() {
        assert_eq!(parse(""), Err(IngestError::EmptyContent));
        assert_eq!(parse("a,b,c\n"), Err(IngestError::EmptyContent));
        assert_eq!(
            detect_and_parse("\n\n", &DEFAULT_DELIMITERS, DelimiterPolicy::FailClosed),
            Err(IngestError::EmptyContent)
        );
    }

    #[test]
    fn test_row_cap() {
        let mut content = String::from("a,b\n");
        for i in 0..11 {
            content.push_str(&format!("{i},x\n"));
        }
        let table = parse(&content).unwrap();
        assert!(enforce_row_cap(&table, 11).is_ok());
        assert_eq!(
            enforce_row_cap(&table, 10),
            Err(IngestError::TooManyRows { rows: 11, max: 10 })
        );
    }
}
