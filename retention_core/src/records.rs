// ********* Raw input data structures ***********

use std::error::Error;
use std::fmt::Display;

/// The value found in one cell of an uploaded file.
///
/// Decoders produce these values without knowing which dataset the row
/// belongs to. They are only coerced into typed fields by the normalizer.
#[derive(PartialEq, Debug, Clone)]
pub enum CellValue {
    Number(f64),
    Text(String),
    Bool(bool),
    /// The column exists for this row but holds no value.
    Absent,
}

impl CellValue {
    /// Infers the type of a cell from its literal text representation.
    ///
    /// Numeric literals become numbers, `true`/`false` (in any case) become
    /// booleans, an empty string is absent. Everything else stays text.
    pub fn from_literal(s: &str) -> CellValue {
        if s.is_empty() {
            return CellValue::Absent;
        }
        if s.eq_ignore_ascii_case("true") {
            return CellValue::Bool(true);
        }
        if s.eq_ignore_ascii_case("false") {
            return CellValue::Bool(false);
        }
        match parse_numeric(s) {
            Some(x) => CellValue::Number(x),
            None => CellValue::Text(s.to_string()),
        }
    }

    /// Truthiness as understood by the flat-file heuristics.
    pub fn is_truthy(&self) -> bool {
        match self {
            CellValue::Number(x) => *x != 0.0 && !x.is_nan(),
            CellValue::Text(s) => !s.is_empty(),
            CellValue::Bool(b) => *b,
            CellValue::Absent => false,
        }
    }
}

// Only plain decimal notation is accepted: "inf", "NaN", "0x10" or "+3" stay text.
fn parse_numeric(s: &str) -> Option<f64> {
    let t = s.trim();
    let body = t.strip_prefix('-').unwrap_or(t);
    if body.is_empty()
        || !body.chars().any(|c| c.is_ascii_digit())
        || !body
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, '.' | 'e' | 'E' | '-' | '+'))
        || body.starts_with(['e', 'E', '+'])
    {
        return None;
    }
    t.parse::<f64>().ok().filter(|x| x.is_finite())
}

/// One data row of an uploaded table, keyed by column header.
///
/// The fields are kept in the order of the header row.
#[derive(PartialEq, Debug, Clone, Default)]
pub struct RawRecord {
    fields: Vec<(String, CellValue)>,
}

impl RawRecord {
    pub fn new() -> RawRecord {
        RawRecord { fields: Vec::new() }
    }

    /// Builds a record from (header, value) pairs. A repeated header keeps its last value.
    pub fn from_pairs<K: Into<String>>(pairs: Vec<(K, CellValue)>) -> RawRecord {
        let mut rec = RawRecord::new();
        for (k, v) in pairs {
            rec.insert(k, v);
        }
        rec
    }

    pub fn insert<K: Into<String>>(&mut self, key: K, value: CellValue) {
        let key = key.into();
        if let Some(elt) = self.fields.iter_mut().find(|(k, _)| *k == key) {
            elt.1 = value;
        } else {
            self.fields.push((key, value));
        }
    }

    pub fn get(&self, key: &str) -> Option<&CellValue> {
        self.fields.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// The field as text. Numbers and booleans are rendered, empty text is none.
    pub fn text(&self, key: &str) -> Option<String> {
        match self.get(key)? {
            CellValue::Text(s) if s.is_empty() => None,
            CellValue::Text(s) => Some(s.clone()),
            CellValue::Number(x) => Some(format_number(*x)),
            CellValue::Bool(b) => Some(b.to_string()),
            CellValue::Absent => None,
        }
    }

    /// The field as a finite number. Text holding a number is accepted.
    pub fn number(&self, key: &str) -> Option<f64> {
        match self.get(key)? {
            CellValue::Number(x) if x.is_finite() => Some(*x),
            CellValue::Text(s) => parse_numeric(s),
            _ => None,
        }
    }

    /// The field as a non-negative count. Fractions are truncated.
    pub fn count(&self, key: &str) -> Option<u64> {
        self.number(key).filter(|x| *x >= 0.0).map(|x| x as u64)
    }

    pub fn is_truthy(&self, key: &str) -> bool {
        self.get(key).map(|v| v.is_truthy()).unwrap_or(false)
    }
}

/// Renders a number the way it would show in a spreadsheet cell.
pub fn format_number(x: f64) -> String {
    if x.fract() == 0.0 && x.abs() < 1e15 {
        format!("{}", x as i64)
    } else {
        format!("{}", x)
    }
}

/// All the rows read from one uploaded file.
#[derive(PartialEq, Debug, Clone)]
pub enum RawRecordSet {
    /// One partition per named sheet, in workbook order.
    Sheets(Vec<(String, Vec<RawRecord>)>),
    /// A single unnamed partition.
    Flat(Vec<RawRecord>),
}

impl RawRecordSet {
    /// The rows of the sheet with exactly this name, if the set is partitioned.
    pub fn sheet(&self, name: &str) -> Option<&[RawRecord]> {
        match self {
            RawRecordSet::Sheets(sheets) => sheets
                .iter()
                .find(|(n, _)| n == name)
                .map(|(_, rows)| rows.as_slice()),
            RawRecordSet::Flat(_) => None,
        }
    }

    pub fn partition(&self, key: PartitionKey) -> Option<&[RawRecord]> {
        self.sheet(key.sheet_name())
    }

    pub fn num_records(&self) -> usize {
        match self {
            RawRecordSet::Sheets(sheets) => sheets.iter().map(|(_, rows)| rows.len()).sum(),
            RawRecordSet::Flat(rows) => rows.len(),
        }
    }
}

// ********* Dispatch keys **********

/// The decode path of an uploaded file.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash)]
pub enum SourceFormat {
    Workbook,
    DelimitedText,
}

impl SourceFormat {
    const WORKBOOK_SUFFIXES: [&'static str; 2] = [".xlsx", ".xls"];

    /// Picks the decode path from the suffix of the declared file name.
    ///
    /// ```
    /// use retention_core::SourceFormat;
    ///
    /// assert_eq!(SourceFormat::from_file_name("q3.XLSX"), SourceFormat::Workbook);
    /// assert_eq!(SourceFormat::from_file_name("q3.csv"), SourceFormat::DelimitedText);
    /// assert_eq!(SourceFormat::from_file_name("notes"), SourceFormat::DelimitedText);
    /// ```
    pub fn from_file_name(name: &str) -> SourceFormat {
        let lower = name.to_ascii_lowercase();
        if SourceFormat::WORKBOOK_SUFFIXES
            .iter()
            .any(|suffix| lower.ends_with(suffix))
        {
            SourceFormat::Workbook
        } else {
            SourceFormat::DelimitedText
        }
    }
}

impl Display for SourceFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SourceFormat::Workbook => write!(f, "workbook"),
            SourceFormat::DelimitedText => write!(f, "delimited text"),
        }
    }
}

/// The named sheets that a workbook upload is expected to contain.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash, Ord, PartialOrd)]
pub enum PartitionKey {
    RetentionMetrics,
    ChannelPerformance,
    ChurnAnalysis,
    WorkerJourney,
    AttendanceData,
    Alerts,
}

impl PartitionKey {
    /// The exact (case-sensitive) sheet name.
    pub fn sheet_name(&self) -> &'static str {
        match self {
            PartitionKey::RetentionMetrics => "retention_metrics",
            PartitionKey::ChannelPerformance => "channel_performance",
            PartitionKey::ChurnAnalysis => "churn_analysis",
            PartitionKey::WorkerJourney => "worker_journey",
            PartitionKey::AttendanceData => "attendance_data",
            PartitionKey::Alerts => "alerts",
        }
    }
}

/// A file could not be decoded. Nothing from this upload is applied.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct FileFormatError {
    pub format: SourceFormat,
    pub message: String,
}

impl Error for FileFormatError {}

impl Display for FileFormatError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Error reading {} file: {}", self.format, self.message)
    }
}
