// Primitives for reading CSV files.

use std::fs::File;
use std::io::Read;

use crate::hub::{io_common::*, *};

pub fn read_delimited_file(path: &str) -> HubResult<RawRecordSet> {
    let file = File::open(path).context(OpeningFileSnafu { path })?;
    read_delimited(file, path)
}

/// Reads a whole delimited text payload into a flat record set.
///
/// The first row holds the field names. Cell types are inferred from their
/// literal text and empty lines are skipped. Any malformed row fails the
/// whole read.
pub fn read_delimited<R: Read>(rdr: R, path: &str) -> HubResult<RawRecordSet> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(false)
        .from_reader(rdr);

    let raw_headers: Vec<String> = reader
        .headers()
        .context(CsvFormatSnafu { path, lineno: 1u64 })?
        .iter()
        .map(|s| s.to_string())
        .collect();
    let headers = unique_headers(&raw_headers);
    debug!("read_delimited: headers: {:?}", headers);

    let mut rows: Vec<RawRecord> = Vec::new();
    for (idx, line_r) in reader.records().enumerate() {
        let position = match &line_r {
            Ok(l) => l.position(),
            Err(e) => e.position(),
        };
        let lineno = position.map(|p| p.line()).unwrap_or((idx + 2) as u64);
        let line = line_r.context(CsvFormatSnafu { path, lineno })?;

        let mut rec = RawRecord::new();
        for (name, cell) in headers.iter().zip(line.iter()) {
            if !name.is_empty() {
                rec.insert(name.as_str(), CellValue::from_literal(cell));
            }
        }
        debug!("read_delimited: lineno: {:?} record: {:?}", lineno, rec);
        rows.push(rec);
    }
    info!(
        "read_delimited: {}: {} records",
        simplify_file_name(path),
        rows.len()
    );
    Ok(RawRecordSet::Flat(rows))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn read(s: &str) -> HubResult<RawRecordSet> {
        read_delimited(s.as_bytes(), "test.csv")
    }

    fn flat(set: RawRecordSet) -> Vec<RawRecord> {
        match set {
            RawRecordSet::Flat(rows) => rows,
            RawRecordSet::Sheets(_) => panic!("expected flat records"),
        }
    }

    #[test]
    fn typed_cells() {
        let rows = flat(
            read("metric_type,channel,retention_rate,verified\nretention,ICH Logistics,91.2,TRUE\n")
                .unwrap(),
        );
        assert_eq!(rows.len(), 1);
        assert_eq!(
            rows[0].get("metric_type"),
            Some(&CellValue::Text("retention".to_string()))
        );
        assert_eq!(rows[0].get("retention_rate"), Some(&CellValue::Number(91.2)));
        assert_eq!(rows[0].get("verified"), Some(&CellValue::Bool(true)));
    }

    #[test]
    fn empty_cells_are_absent() {
        let rows = flat(read("channel,active_workers\nLFM Services,\n").unwrap());
        assert_eq!(rows[0].get("active_workers"), Some(&CellValue::Absent));
    }

    #[test]
    fn blank_lines_are_skipped() {
        let rows = flat(read("\n\nchannel,active_workers\n\nA,1\n\nB,2\n\n\n").unwrap());
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].text("channel"), Some("B".to_string()));
    }

    #[test]
    fn ragged_row_fails_the_read() {
        let res = read("channel,active_workers\nA,1\nB,2,3\n");
        match res {
            Err(e) => {
                assert!(e.is_file_format());
                assert!(matches!(e, HubError::CsvFormat { lineno: 3, .. }));
            }
            Ok(_) => panic!("expected a parse error"),
        }
    }

    #[test]
    fn header_only() {
        let rows = flat(read("channel,active_workers\n").unwrap());
        assert!(rows.is_empty());
    }

    #[test]
    fn quoted_cells() {
        let rows = flat(read("title,description\n\"Alert, urgent\",\"said \"\"hi\"\"\"\n").unwrap());
        assert_eq!(rows[0].text("title"), Some("Alert, urgent".to_string()));
        assert_eq!(rows[0].text("description"), Some("said \"hi\"".to_string()));
    }
}
