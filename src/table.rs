//! Tab-separated table output
//!
//! All tables written into the data directory are TSV with a header row;
//! `None` fields become empty cells.

use crate::errors::Result;
use serde::Serialize;
use std::path::Path;

/// Write `rows` as a TSV file with a header row.
///
/// Serde's `has_headers` only emits a header when at least one row is
/// written, so `header` is written explicitly for empty tables.
pub fn write_tsv<T: Serialize>(path: &Path, header: &[&str], rows: &[T]) -> Result<()> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(b'\t')
        .has_headers(!rows.is_empty())
        .from_path(path)?;

    if rows.is_empty() {
        writer.write_record(header)?;
    }
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gdc::types::ManifestEntry;

    const HEADER: &[&str] = &["file_id", "file_name", "file_size", "case_id", "sample_id"];

    #[test]
    fn test_write_tsv_with_missing_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("file_manifest.tsv");

        let rows = vec![ManifestEntry {
            file_id: Some("f-1".to_string()),
            file_name: Some("counts.tsv".to_string()),
            file_size: Some(12),
            case_id: None,
            sample_id: None,
        }];
        write_tsv(&path, HEADER, &rows).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let mut lines = text.lines();
        assert_eq!(lines.next(), Some("file_id\tfile_name\tfile_size\tcase_id\tsample_id"));
        assert_eq!(lines.next(), Some("f-1\tcounts.tsv\t12\t\t"));
        assert_eq!(lines.next(), None);
    }

    #[test]
    fn test_write_empty_table_keeps_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.tsv");

        write_tsv::<ManifestEntry>(&path, HEADER, &[]).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text.trim_end(), HEADER.join("\t"));
    }
}
