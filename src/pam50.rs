//! PAM50 subtype tables
//!
//! Subtype assignments come from loosely formatted supplementary files
//! (tab-, comma- or whitespace-separated, sometimes with `#` comments).
//! Parsing picks an id column and a subtype column by name and falls
//! back to the first two columns.

use crate::gdc::types::AnnotationRecord;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Bytes inspected when deciding whether a payload is an HTML page
pub const SNIFF_LEN: usize = 1024;

const SUBTYPE_HINTS: &[&str] = &["pam50", "subtype", "molecular", "call"];
const ID_HINTS: &[&str] = &["case", "sample", "barcode", "patient", "tumor"];
const DELIMITERS: &[u8] = &[b'\t', b',', b';', b'|'];

/// One normalised subtype assignment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pam50Label {
    pub case_id: String,
    pub pam50_subtype: String,
}

/// Outcome of a PAM50 lookup
#[derive(Debug, Clone, PartialEq)]
pub enum Pam50Table {
    /// Hits from the GDC annotations endpoint
    Annotations(Vec<AnnotationRecord>),
    /// Parsed id/subtype pairs
    Labels(Vec<Pam50Label>),
    /// Parsed rows where no id/subtype columns could be identified
    Raw {
        columns: Vec<String>,
        rows: Vec<Vec<String>>,
    },
    /// Nothing found
    Empty,
}

impl Pam50Table {
    pub fn len(&self) -> usize {
        match self {
            Pam50Table::Annotations(a) => a.len(),
            Pam50Table::Labels(l) => l.len(),
            Pam50Table::Raw { rows, .. } => rows.len(),
            Pam50Table::Empty => 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Column names of the table as it would be written out
    pub fn columns(&self) -> Vec<String> {
        let named = |cols: &[&str]| -> Vec<String> { cols.iter().map(|c| c.to_string()).collect() };
        match self {
            Pam50Table::Annotations(_) => named(&["case_id", "annotation_type", "entity_id"]),
            Pam50Table::Labels(_) => named(&["case_id", "pam50_subtype"]),
            Pam50Table::Raw { columns, .. } => columns.clone(),
            Pam50Table::Empty => Vec::new(),
        }
    }

    /// Subtype distribution; only meaningful for parsed labels
    pub fn subtype_counts(&self) -> BTreeMap<String, usize> {
        match self {
            Pam50Table::Labels(labels) => subtype_counts(labels),
            _ => BTreeMap::new(),
        }
    }
}

/// True when the payload starts like an HTML document
pub fn is_html(bytes: &[u8]) -> bool {
    let head = &bytes[..bytes.len().min(SNIFF_LEN)];
    let start = head
        .iter()
        .position(|b| !b.is_ascii_whitespace())
        .unwrap_or(head.len());
    let head = &head[start..];

    starts_with_ignore_case(head, b"<!doctype") || starts_with_ignore_case(head, b"<html")
}

fn starts_with_ignore_case(haystack: &[u8], prefix: &[u8]) -> bool {
    haystack.len() >= prefix.len() && haystack[..prefix.len()].eq_ignore_ascii_case(prefix)
}

/// Count labels per subtype
pub fn subtype_counts(labels: &[Pam50Label]) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();
    for label in labels {
        *counts.entry(label.pam50_subtype.clone()).or_insert(0) += 1;
    }
    counts
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Separator {
    Byte(u8),
    Whitespace,
}

fn is_content_line(line: &str) -> bool {
    let trimmed = line.trim();
    !trimmed.is_empty() && !trimmed.starts_with('#')
}

/// Pick the field separator from the header line. Tab wins whenever it
/// yields more than one column.
fn sniff_separator(header: &str) -> Separator {
    let columns = |d: u8| header.split(d as char).count();

    if columns(b'\t') > 1 {
        return Separator::Byte(b'\t');
    }

    let best = DELIMITERS
        .iter()
        .map(|&d| (d, columns(d)))
        .filter(|&(_, n)| n > 1)
        .max_by_key(|&(_, n)| n);

    match best {
        Some((d, _)) => Separator::Byte(d),
        None if header.split_whitespace().count() > 1 => Separator::Whitespace,
        None => Separator::Byte(b'\t'),
    }
}

/// Split the table into header and data rows.
///
/// Rows with more fields than the header are skipped; shorter rows are
/// padded with empty cells; rows with only empty cells are dropped.
fn split_rows(text: &str) -> Option<(Vec<String>, Vec<Vec<String>>)> {
    let content: Vec<&str> = text.lines().filter(|l| is_content_line(l)).collect();
    let header_line = content.first()?;

    let raw: Vec<Vec<String>> = match sniff_separator(header_line) {
        Separator::Whitespace => content
            .iter()
            .map(|l| l.split_whitespace().map(str::to_string).collect())
            .collect(),
        Separator::Byte(delim) => {
            let joined = content.join("\n");
            let mut reader = csv::ReaderBuilder::new()
                .delimiter(delim)
                .has_headers(false)
                .flexible(true)
                .from_reader(joined.as_bytes());
            reader
                .records()
                .filter_map(|r| r.ok())
                .map(|r| r.iter().map(str::to_string).collect())
                .collect()
        }
    };

    let mut iter = raw.into_iter();
    let columns: Vec<String> = iter.next()?.into_iter().map(|c| c.trim().to_string()).collect();
    let width = columns.len();

    let rows = iter
        .filter(|row| row.len() <= width)
        .map(|mut row| {
            row.resize(width, String::new());
            row
        })
        .filter(|row| row.iter().any(|cell| !cell.trim().is_empty()))
        .collect();

    Some((columns, rows))
}

fn find_column(columns: &[String], hints: &[&str], skip: Option<usize>) -> Option<usize> {
    columns.iter().enumerate().position(|(i, name)| {
        let lower = name.to_lowercase();
        Some(i) != skip && hints.iter().any(|h| lower.contains(h))
    })
}

/// Pick `(id, subtype)` column indices
fn identify_columns(columns: &[String]) -> Option<(usize, usize)> {
    let subtype = find_column(columns, SUBTYPE_HINTS, None);
    let id = find_column(columns, ID_HINTS, subtype);

    match (id, subtype) {
        (Some(id), Some(subtype)) => Some((id, subtype)),
        _ if columns.len() >= 2 => Some((0, 1)),
        _ => None,
    }
}

fn is_missing(value: &str) -> bool {
    value.is_empty() || value.eq_ignore_ascii_case("nan")
}

/// Parse a PAM50 subtype file body
pub fn parse_table(text: &str) -> Pam50Table {
    let Some((columns, rows)) = split_rows(text) else {
        return Pam50Table::Empty;
    };

    let Some((id_col, subtype_col)) = identify_columns(&columns) else {
        return Pam50Table::Raw { columns, rows };
    };

    let labels = rows
        .iter()
        .filter_map(|row| {
            let case_id = row[id_col].trim();
            let subtype = row[subtype_col].trim();
            if is_missing(case_id) || is_missing(subtype) {
                return None;
            }
            Some(Pam50Label {
                case_id: case_id.to_string(),
                pam50_subtype: subtype.to_string(),
            })
        })
        .collect();

    Pam50Table::Labels(labels)
}

#[cfg(test)]
mod tests {
    use super::*;
    use quickcheck_macros::quickcheck;

    const SIGCLUST: &str = "\
Sample\tType\tSiClust\tPAM50
TCGA-A1-A0SB-01A-11R-A144-07\ttumor\t-13\tNormal
TCGA-A1-A0SD-01A-11R-A115-07\ttumor\t-12\tLumA
TCGA-A1-A0SE-01A-11R-A084-07\ttumor\t-12\tLumA
TCGA-A1-A0SH-01A-11R-A084-07\ttumor\t-5\tLumB
TCGA-A1-A0SK-01A-12R-A084-07\ttumor\t-7\tBasal
";

    fn labels(table: Pam50Table) -> Vec<Pam50Label> {
        match table {
            Pam50Table::Labels(l) => l,
            other => panic!("expected labels, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_sigclust_table() {
        let labels = labels(parse_table(SIGCLUST));
        assert_eq!(labels.len(), 5);
        assert_eq!(labels[1].case_id, "TCGA-A1-A0SD-01A-11R-A115-07");
        assert_eq!(labels[1].pam50_subtype, "LumA");

        let counts = subtype_counts(&labels);
        assert_eq!(counts["LumA"], 2);
        assert_eq!(counts["Basal"], 1);
        assert_eq!(counts.len(), 4);
    }

    #[test]
    fn test_comments_blanks_and_nan_dropped() {
        let text = "# PAM50 calls\n\nbarcode,pam50_call\nTCGA-1, Her2 \n\nTCGA-2,nan\nTCGA-3,\n,LumA\n";
        let labels = labels(parse_table(text));
        assert_eq!(
            labels,
            vec![Pam50Label {
                case_id: "TCGA-1".to_string(),
                pam50_subtype: "Her2".to_string()
            }]
        );
    }

    #[test]
    fn test_falls_back_to_first_two_columns() {
        let text = "id\tlabel\nA\tLumB\nB\tBasal\n";
        let labels = labels(parse_table(text));
        assert_eq!(labels.len(), 2);
        assert_eq!(labels[0].case_id, "A");
        assert_eq!(labels[1].pam50_subtype, "Basal");
    }

    #[test]
    fn test_id_column_not_reused_as_subtype() {
        // "sample_subtype" matches both hint lists
        let text = "sample_subtype\tpatient\nLumA\tP1\n";
        let labels = labels(parse_table(text));
        assert_eq!(labels[0].case_id, "P1");
        assert_eq!(labels[0].pam50_subtype, "LumA");
    }

    #[test]
    fn test_whitespace_separated() {
        let text = "patient   PAM50\nP1   LumA\nP2   Normal\n";
        let labels = labels(parse_table(text));
        assert_eq!(labels.len(), 2);
        assert_eq!(labels[1].pam50_subtype, "Normal");
    }

    #[test]
    fn test_overlong_rows_skipped_short_rows_padded() {
        let text = "case\tsubtype\nC1\tLumA\textra\nC2\tBasal\nC3\n";
        let labels = labels(parse_table(text));
        assert_eq!(labels.len(), 1);
        assert_eq!(labels[0].case_id, "C2");
    }

    #[test]
    fn test_delimiter_only_rows_dropped() {
        let (columns, rows) = split_rows("barcode,pam50\n,\nTCGA-1,LumA\n ,\t\n").unwrap();
        assert_eq!(columns, vec!["barcode".to_string(), "pam50".to_string()]);
        assert_eq!(rows, vec![vec!["TCGA-1".to_string(), "LumA".to_string()]]);

        let labels = labels(parse_table("barcode,pam50\n,\nTCGA-1,LumA\n"));
        assert_eq!(labels.len(), 1);
        assert_eq!(labels[0].case_id, "TCGA-1");
    }

    #[test]
    fn test_single_column_is_raw() {
        let table = parse_table("barcodes\nTCGA-1\nTCGA-2\n");
        match table {
            Pam50Table::Raw { columns, rows } => {
                assert_eq!(columns, vec!["barcodes".to_string()]);
                assert_eq!(rows.len(), 2);
            }
            other => panic!("expected raw table, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(parse_table(""), Pam50Table::Empty);
        assert_eq!(parse_table("# only a comment\n\n"), Pam50Table::Empty);
        assert!(Pam50Table::Empty.is_empty());
    }

    #[test]
    fn test_is_html() {
        assert!(is_html(b"<!DOCTYPE html><html></html>"));
        assert!(is_html(b"<html><body>moved</body></html>"));
        assert!(is_html(b"\n  <!doctype html>"));
        assert!(!is_html(b"Sample\tPAM50\n"));
        assert!(!is_html(b""));
    }

    #[quickcheck]
    fn prop_text_without_angle_bracket_is_not_html(text: String) -> bool {
        text.contains('<') || !is_html(text.as_bytes())
    }

    #[test]
    fn test_table_columns() {
        assert_eq!(
            Pam50Table::Labels(Vec::new()).columns(),
            vec!["case_id".to_string(), "pam50_subtype".to_string()]
        );
        assert!(Pam50Table::Empty.columns().is_empty());
    }
}
