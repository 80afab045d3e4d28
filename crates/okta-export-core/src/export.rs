//! Record-to-CSV export

use csv::{QuoteStyle, Terminator, WriterBuilder};
use serde_json::Value;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::error::Result;
use crate::mapping::FieldMapping;

/// Result of writing one CSV file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportSummary {
    pub path: PathBuf,
    /// Data rows written, header excluded
    pub rows: usize,
}

/// Write a header row followed by one row per record.
///
/// An empty record list produces a header-only file. The destination's
/// directory must already exist.
pub fn export_records(
    records: &[Value],
    mapping: &FieldMapping,
    destination: &Path,
) -> Result<ExportSummary> {
    let file = fs::File::create(destination)?;
    let rows = write_csv(file, records, mapping)?;

    info!(
        "CSV file exported: {} ({} {} rows)",
        destination.display(),
        rows,
        mapping.kind
    );

    Ok(ExportSummary {
        path: destination.to_path_buf(),
        rows,
    })
}

/// Write a header row and exactly one row for a single detail record
pub fn export_record(
    record: &Value,
    mapping: &FieldMapping,
    destination: &Path,
) -> Result<ExportSummary> {
    export_records(std::slice::from_ref(record), mapping, destination)
}

/// Serialize records through a mapping into any writer, returning the row count
pub fn write_csv<W: Write>(writer: W, records: &[Value], mapping: &FieldMapping) -> Result<usize> {
    let mut wtr = WriterBuilder::new()
        .quote_style(QuoteStyle::Always)
        .terminator(Terminator::CRLF)
        .from_writer(writer);

    wtr.write_record(mapping.headers())?;
    for record in records {
        wtr.write_record(mapping.apply(record))?;
    }
    wtr.flush()?;

    Ok(records.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapping::{APP, GROUP_APP, GROUP_LIST, USER};
    use serde_json::json;
    use tempfile::TempDir;

    fn groups() -> Vec<Value> {
        vec![
            json!({
                "id": "00g1",
                "type": "OKTA_GROUP",
                "profile": {"name": "Engineering", "description": "Builds things, \"fast\""}
            }),
            json!({
                "id": "00g2",
                "type": "APP_GROUP",
                "profile": {"name": "Sales\nEMEA"}
            }),
            json!({"id": "00g3"}),
        ]
    }

    #[test]
    fn test_round_trip_preserves_rows_and_values() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("groups.csv");
        let records = groups();

        let summary = export_records(&records, &GROUP_LIST, &path).unwrap();
        assert_eq!(summary.rows, 3);
        assert_eq!(summary.path, path);

        let mut rdr = csv::Reader::from_path(&path).unwrap();
        let headers: Vec<String> = rdr.headers().unwrap().iter().map(String::from).collect();
        assert_eq!(headers, GROUP_LIST.headers());

        let rows: Vec<csv::StringRecord> = rdr.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), records.len());
        for (row, record) in rows.iter().zip(&records) {
            let expected = GROUP_LIST.apply(record);
            let actual: Vec<&str> = row.iter().collect();
            assert_eq!(actual, expected);
        }
        assert_eq!(&rows[0][2], "Builds things, \"fast\"");
        assert_eq!(&rows[1][1], "Sales\nEMEA");
    }

    #[test]
    fn test_every_field_is_quoted() {
        let mut buf = Vec::new();
        write_csv(&mut buf, &[json!({"id": "0oa1", "label": "Slack"})], &GROUP_APP).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert_eq!(
            text,
            "\"id\",\"label\",\"status\",\"name\",\"lastUpdated\"\r\n\
             \"0oa1\",\"Slack\",\"\",\"\",\"\"\r\n"
        );
    }

    #[test]
    fn test_empty_list_writes_header_only() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("group_apps_00g1.csv");

        let summary = export_records(&[], &GROUP_APP, &path).unwrap();
        assert_eq!(summary.rows, 0);

        let mut rdr = csv::Reader::from_path(&path).unwrap();
        assert_eq!(rdr.headers().unwrap().len(), GROUP_APP.fields.len());
        assert_eq!(rdr.records().count(), 0);
    }

    #[test]
    fn test_single_record_writes_one_row() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("app_detail_0oa1.csv");
        let app = json!({
            "id": "0oa1",
            "settings": {"app": {"baseUrl": "https://example.com/a,b"}}
        });

        let summary = export_record(&app, &APP, &path).unwrap();
        assert_eq!(summary.rows, 1);

        let mut rdr = csv::Reader::from_path(&path).unwrap();
        let rows: Vec<csv::StringRecord> = rdr.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 1);
        let settings: Value = serde_json::from_str(&rows[0][11]).unwrap();
        assert_eq!(settings["app"]["baseUrl"], "https://example.com/a,b");
    }

    #[test]
    fn test_export_is_byte_identical_across_runs() {
        let dir = TempDir::new().unwrap();
        let first = dir.path().join("a.csv");
        let second = dir.path().join("b.csv");
        let users = vec![
            json!({"id": "00u1", "profile": {"firstName": "Zoë", "login": "zoe@example.com"}}),
            json!({"id": "00u2", "status": "SUSPENDED"}),
        ];

        export_records(&users, &USER, &first).unwrap();
        export_records(&users, &USER, &second).unwrap();

        assert_eq!(fs::read(&first).unwrap(), fs::read(&second).unwrap());
    }

    #[test]
    fn test_missing_directory_is_not_created() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("users.csv");

        let err = export_records(&[json!({"id": "00u1"})], &USER, &path).unwrap_err();
        assert!(matches!(err, crate::error::ExportError::Io { .. }));
        assert!(!dir.path().join("nested").exists());
    }
}
