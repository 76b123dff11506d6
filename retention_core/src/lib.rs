/*!
Data layer of the gig-worker retention dashboard.

The crate turns the rows read from an uploaded spreadsheet into the six
datasets and the summary figures that the dashboard displays. Decoding the
files themselves is left to the caller: it only has to produce a
[RawRecordSet], either one partition per sheet (workbooks) or a single flat
partition (delimited text).

```
use retention_core::*;

let rows = vec![
    RawRecord::from_pairs(vec![
        ("channel", CellValue::Text("ICH Logistics".to_string())),
        ("active_workers", CellValue::Number(156.0)),
    ]),
];
let records = RawRecordSet::Sheets(vec![("channel_performance".to_string(), rows)]);
let data = normalize(&records, &SummaryDefaults::DEFAULT);

assert_eq!(data.summary.total_workers, 156);
// No alerts sheet: the product alerts are displayed.
assert_eq!(data.alerts.len(), 3);
```

See the [manual] for the expected sheets and columns.
*/

pub mod controller;
mod dashboard;
pub mod manual;
mod records;
pub mod samples;

use log::{debug, info, warn};

pub use crate::dashboard::*;
pub use crate::records::*;
pub use crate::samples::default_alerts;

/// At most this many alerts are taken from an alerts sheet.
pub const MAX_ALERTS: usize = 5;

/// Normalizes the rows of one upload into the dashboard datasets.
///
/// This never fails: absent sheets become empty datasets (or the default
/// alerts) and malformed fields take their per-field default.
///
/// Arguments:
/// * `records` the rows read from the uploaded file
/// * `defaults` the summary figures used when they cannot be computed
pub fn normalize(records: &RawRecordSet, defaults: &SummaryDefaults) -> DashboardData {
    info!("normalize: processing {} records", records.num_records());
    let data = match records {
        RawRecordSet::Sheets(_) => normalize_sheets(records, defaults),
        RawRecordSet::Flat(rows) => normalize_flat(rows, defaults),
    };
    let defaulted = data.summary.origins.defaulted_fields();
    if !defaulted.is_empty() {
        warn!(
            "normalize: summary fields not derived from the upload, using defaults: {:?}",
            defaulted
        );
    }
    data
}

fn sheet_rows(records: &RawRecordSet, key: PartitionKey) -> &[RawRecord] {
    match records.partition(key) {
        Some(rows) => {
            debug!(
                "sheet_rows: sheet {:?}: {} rows",
                key.sheet_name(),
                rows.len()
            );
            rows
        }
        None => {
            info!(
                "sheet_rows: missing sheet {:?}, using default",
                key.sheet_name()
            );
            &[]
        }
    }
}

fn normalize_sheets(records: &RawRecordSet, defaults: &SummaryDefaults) -> DashboardData {
    let partition = |key: PartitionKey| sheet_rows(records, key);

    let retention_metrics: Vec<RetentionMetric> = partition(PartitionKey::RetentionMetrics)
        .iter()
        .map(RetentionMetric::from_record)
        .collect();
    let channel_performance: Vec<ChannelPerformance> = partition(PartitionKey::ChannelPerformance)
        .iter()
        .map(ChannelPerformance::from_record)
        .collect();
    let churn_reasons = partition(PartitionKey::ChurnAnalysis)
        .iter()
        .map(ChurnReason::from_record)
        .collect();
    let worker_journey = partition(PartitionKey::WorkerJourney)
        .iter()
        .map(WorkerJourneyStage::from_record)
        .collect();
    let attendance = partition(PartitionKey::AttendanceData)
        .iter()
        .map(AttendanceRecord::from_record)
        .collect();
    let alerts = shape_alerts(partition(PartitionKey::Alerts));

    let summary = derive_summary(&channel_performance, &retention_metrics, defaults);

    DashboardData {
        retention_metrics,
        channel_performance,
        churn_reasons,
        worker_journey,
        attendance,
        alerts,
        summary,
    }
}

/// Flat files carry no sheet names: rows are routed by the columns they fill.
///
/// A row may land in both datasets, or in none.
fn normalize_flat(rows: &[RawRecord], defaults: &SummaryDefaults) -> DashboardData {
    let retention_metrics: Vec<RetentionMetric> = rows
        .iter()
        .filter(|r| is_retention_row(r))
        .map(RetentionMetric::from_record)
        .collect();
    let channel_performance: Vec<ChannelPerformance> = rows
        .iter()
        .filter(|r| r.is_truthy("channel"))
        .map(ChannelPerformance::from_record)
        .collect();
    debug!(
        "normalize_flat: {} rows: {} retention metrics, {} channel rows",
        rows.len(),
        retention_metrics.len(),
        channel_performance.len()
    );

    DashboardData {
        retention_metrics,
        channel_performance,
        ..DashboardData::empty(defaults)
    }
}

fn is_retention_row(rec: &RawRecord) -> bool {
    matches!(rec.get("metric_type"), Some(CellValue::Text(s)) if s == "retention")
}

/// Computes the summary figures from the uploaded channel and retention rows.
///
/// * `total_workers` is the sum of the active workers of each channel
///   (missing counts are zero). The sum saturates at `u64::MAX`.
/// * `overall_retention_rate` is the mean retention rate of the metrics, or
///   the default when there is none.
/// * The churn rate, the tenure and the satisfaction are not present in any
///   sheet and always take their default.
///
/// ```
/// use retention_core::*;
///
/// let metrics: Vec<RetentionMetric> = [80.0, 90.0]
///     .iter()
///     .map(|r| RetentionMetric {
///         metric_type: None,
///         channel: None,
///         period: None,
///         retention_rate: *r,
///     })
///     .collect();
/// let summary = derive_summary(&[], &metrics, &SummaryDefaults::DEFAULT);
/// assert_eq!(summary.overall_retention_rate, 85.0);
/// assert_eq!(summary.origins.overall_retention_rate, Origin::Derived);
/// assert_eq!(summary.churn_rate, 10.8);
/// ```
pub fn derive_summary(
    channels: &[ChannelPerformance],
    metrics: &[RetentionMetric],
    defaults: &SummaryDefaults,
) -> AggregateSummary {
    let mut summary = defaults.summary();

    summary.total_workers = channels
        .iter()
        .fold(0u64, |acc, c| acc.saturating_add(c.active_workers));
    summary.origins.total_workers = Origin::Derived;

    if !metrics.is_empty() {
        let total: f64 = metrics.iter().map(|m| m.retention_rate).sum();
        summary.overall_retention_rate = total / metrics.len() as f64;
        summary.origins.overall_retention_rate = Origin::Derived;
    }

    debug!("derive_summary: {:?}", summary);
    summary
}

/// Shapes the rows of an alerts sheet. Only the first [MAX_ALERTS] rows are kept.
///
/// Without any row, the [default_alerts] are returned.
pub fn shape_alerts(rows: &[RawRecord]) -> Vec<Alert> {
    if rows.is_empty() {
        return default_alerts();
    }
    if rows.len() > MAX_ALERTS {
        debug!(
            "shape_alerts: keeping {} alerts out of {}",
            MAX_ALERTS,
            rows.len()
        );
    }
    rows.iter().take(MAX_ALERTS).map(Alert::from_record).collect()
}
