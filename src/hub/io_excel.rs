use std::io::Cursor;

use calamine::{DataType, Reader, Xls, Xlsx};

use crate::hub::{io_common::*, *};

pub fn read_workbook(path: &str) -> HubResult<RawRecordSet> {
    let data = fs::read(path).context(OpeningFileSnafu { path })?;
    read_workbook_bytes(data, path)
}

const ZIP_MAGIC: &[u8] = b"PK\x03\x04";
const CFB_MAGIC: &[u8] = &[0xD0, 0xCF, 0x11, 0xE0];

/// True if the payload should go through the legacy BIFF (`.xls`) reader.
///
/// The leading bytes decide. The file name is only used when they match
/// neither an OpenXML archive nor a compound document.
fn is_legacy_workbook(data: &[u8], path: &str) -> bool {
    if data.starts_with(ZIP_MAGIC) {
        false
    } else if data.starts_with(CFB_MAGIC) {
        true
    } else {
        path.to_ascii_lowercase().ends_with(".xls")
    }
}

/// Decodes a workbook payload into one partition per sheet.
pub fn read_workbook_bytes(data: Vec<u8>, path: &str) -> HubResult<RawRecordSet> {
    let legacy = is_legacy_workbook(&data, path);
    debug!("read_workbook: {}: legacy format: {}", path, legacy);
    let cursor = Cursor::new(data);
    if legacy {
        let mut workbook: Xls<_> = Xls::new(cursor)
            .map_err(calamine::Error::from)
            .context(WorkbookFormatSnafu { path })?;
        read_sheets(&mut workbook, path)
    } else {
        let mut workbook: Xlsx<_> = Xlsx::new(cursor)
            .map_err(calamine::Error::from)
            .context(WorkbookFormatSnafu { path })?;
        read_sheets(&mut workbook, path)
    }
}

fn read_sheets<R>(workbook: &mut R, path: &str) -> HubResult<RawRecordSet>
where
    R: Reader,
    calamine::Error: From<R::Error>,
{
    let sheet_names: Vec<String> = workbook.sheet_names().to_vec();
    info!(
        "read_workbook: {}: sheets found: {:?}",
        simplify_file_name(path),
        sheet_names
    );

    let mut sheets: Vec<(String, Vec<RawRecord>)> = Vec::new();
    for name in sheet_names {
        let wrange = match workbook.worksheet_range(&name) {
            Some(r) => r
                .map_err(calamine::Error::from)
                .context(WorkbookFormatSnafu { path })?,
            None => {
                warn!("read_workbook: sheet {:?} listed but not found", name);
                continue;
            }
        };
        let records = records_from_rows(wrange.rows());
        debug!("read_workbook: sheet {:?}: {} records", name, records.len());
        sheets.push((name, records));
    }
    Ok(RawRecordSet::Sheets(sheets))
}

/// Builds records from the rows of a sheet, the first row being the header.
///
/// Empty cells are left out and rows left without any field are dropped.
pub fn records_from_rows<'a, I>(rows: I) -> Vec<RawRecord>
where
    I: IntoIterator<Item = &'a [DataType]>,
{
    let mut iter = rows.into_iter();
    let header: Vec<String> = match iter.next() {
        Some(h) => h.iter().map(header_name).collect(),
        None => return Vec::new(),
    };
    let header = unique_headers(&header);
    debug!("records_from_rows: header: {:?}", header);

    let mut res: Vec<RawRecord> = Vec::new();
    for (idx, row) in iter.enumerate() {
        let mut rec = RawRecord::new();
        for (name, cell) in header.iter().zip(row.iter()) {
            if name.is_empty() {
                continue;
            }
            if let Some(v) = read_cell(cell) {
                rec.insert(name.as_str(), v);
            }
        }
        if rec.is_empty() {
            debug!("records_from_rows: dropping empty row {}", idx + 2);
            continue;
        }
        res.push(rec);
    }
    res
}

fn header_name(cell: &DataType) -> String {
    match read_cell(cell) {
        Some(CellValue::Text(s)) => s,
        Some(CellValue::Number(x)) => format_number(x),
        Some(CellValue::Bool(b)) => b.to_string(),
        Some(CellValue::Absent) | None => String::new(),
    }
}

fn read_cell(cell: &DataType) -> Option<CellValue> {
    match cell {
        DataType::String(s) if s.is_empty() => None,
        DataType::String(s) => Some(CellValue::Text(s.clone())),
        DataType::Float(f) => Some(CellValue::Number(*f)),
        DataType::Int(i) => Some(CellValue::Number(*i as f64)),
        DataType::Bool(b) => Some(CellValue::Bool(*b)),
        // Dates are kept as their serial number.
        DataType::DateTime(f) => Some(CellValue::Number(*f)),
        DataType::Error(e) => Some(CellValue::Text(e.to_string())),
        DataType::Empty => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn s(x: &str) -> DataType {
        DataType::String(x.to_string())
    }

    fn rows_of(rows: &[Vec<DataType>]) -> Vec<RawRecord> {
        records_from_rows(rows.iter().map(|r| r.as_slice()))
    }

    #[test]
    fn header_applies_to_following_rows() {
        let rows = vec![
            vec![s("channel"), s("active_workers"), DataType::Float(2024.0)],
            vec![s("ICH Logistics"), DataType::Int(156), DataType::Bool(true)],
            vec![s("LFM Services"), DataType::Float(67.5), DataType::Empty],
        ];
        let recs = rows_of(&rows);
        assert_eq!(recs.len(), 2);
        assert_eq!(recs[0].text("channel"), Some("ICH Logistics".to_string()));
        assert_eq!(recs[0].number("active_workers"), Some(156.0));
        assert_eq!(recs[0].get("2024"), Some(&CellValue::Bool(true)));
        assert_eq!(recs[1].get("2024"), None);
        assert_eq!(recs[1].len(), 2);
    }

    #[test]
    fn rows_without_fields_are_dropped() {
        let rows = vec![
            vec![s("title"), s("severity")],
            vec![DataType::Empty, DataType::Empty],
            vec![s(""), DataType::Empty],
            vec![s("Housing"), DataType::Empty],
        ];
        let recs = rows_of(&rows);
        assert_eq!(recs.len(), 1);
        assert_eq!(recs[0].text("title"), Some("Housing".to_string()));
    }

    #[test]
    fn columns_without_header_are_ignored() {
        let rows = vec![
            vec![s("reason"), DataType::Empty],
            vec![DataType::Empty, s("stray note")],
        ];
        assert!(rows_of(&rows).is_empty());
    }

    #[test]
    fn empty_sheet() {
        assert!(rows_of(&[]).is_empty());
        assert!(rows_of(&[vec![s("stage"), s("count")]]).is_empty());
    }

    #[test]
    fn corrupted_payload_is_a_format_error() {
        let res = read_workbook_bytes(b"not a workbook".to_vec(), "upload.xlsx");
        match res {
            Err(e) => assert!(e.is_file_format(), "{:?}", e),
            Ok(_) => panic!("expected a decoding error"),
        }
        let res = read_workbook_bytes(b"not a workbook either".to_vec(), "upload.XLS");
        assert!(matches!(res, Err(HubError::WorkbookFormat { .. })));
        let mut cfb = vec![0xD0, 0xCF, 0x11, 0xE0];
        cfb.extend_from_slice(b"truncated");
        let res = read_workbook_bytes(cfb, "upload.xlsx");
        assert!(matches!(res, Err(HubError::WorkbookFormat { .. })));
    }

    const SAMPLE: &[u8] = include_bytes!("testdata/retention_sample.xlsx");

    fn sheets(set: &RawRecordSet) -> Vec<&str> {
        match set {
            RawRecordSet::Sheets(s) => s.iter().map(|(name, _)| name.as_str()).collect(),
            RawRecordSet::Flat(_) => panic!("expected sheets"),
        }
    }

    #[test]
    fn reader_chosen_from_payload() {
        assert!(!is_legacy_workbook(SAMPLE, "renamed.xls"));
        assert!(is_legacy_workbook(&[0xD0, 0xCF, 0x11, 0xE0, 0xA1], "export"));
        assert!(is_legacy_workbook(b"??", "old.XLS"));
        assert!(!is_legacy_workbook(b"??", "new.xlsx"));
    }

    #[test]
    fn sample_workbook() {
        let set = read_workbook_bytes(SAMPLE.to_vec(), "retention_sample.xlsx").unwrap();
        assert_eq!(
            sheets(&set),
            vec!["channel_performance", "retention_metrics", "notes"]
        );

        let channels = set.sheet("channel_performance").unwrap();
        // The blank fourth row is dropped.
        assert_eq!(channels.len(), 3);
        assert_eq!(channels[0].text("channel"), Some("ICH Logistics".to_string()));
        assert_eq!(channels[0].number("active_workers"), Some(10.0));
        assert_eq!(channels[1].get("retention_rate"), None);
        assert_eq!(channels[2].text("channel"), Some("Zomato Fleet".to_string()));

        let data = normalize(&set, &SummaryDefaults::DEFAULT);
        assert_eq!(data.channel_performance.len(), 3);
        assert_eq!(data.channel_performance[0].retention_rate, Some(91.5));
        assert_eq!(data.summary.total_workers, 15);
        assert_eq!(data.summary.overall_retention_rate, 85.0);
        assert_eq!(data.summary.origins.overall_retention_rate, Origin::Derived);
        assert_eq!(data.alerts, default_alerts());
        assert!(data.churn_reasons.is_empty());
        assert!(data.attendance.is_empty());
    }

    #[test]
    fn misnamed_workbook_still_decodes() {
        let set = read_workbook_bytes(SAMPLE.to_vec(), "renamed.xls").unwrap();
        let data = normalize(&set, &SummaryDefaults::DEFAULT);
        assert_eq!(data.summary.total_workers, 15);
    }
}
