// Writes the retention intelligence report.

use chrono::NaiveDate;
use retention_core::samples::{self, MonthlyTrend, PerformanceMetric};

use crate::hub::*;

pub fn report_file_name(date: NaiveDate) -> String {
    format!(
        "Retention_Intelligence_Report_{}.json",
        date.format("%Y-%m-%d")
    )
}

fn monthly_trend_to_json(t: &MonthlyTrend) -> JSValue {
    json!({
        "month": t.month,
        "retention": t.retention,
        "churn": t.churn,
        "newHires": t.new_hires,
        "satisfaction": t.satisfaction,
    })
}

fn performance_metric_to_json(m: &PerformanceMetric) -> JSValue {
    json!({
        "metric": m.metric,
        "value": m.value,
        "target": m.target,
        "status": m.status,
        "trend": m.trend,
    })
}

/// The three tables of the report, in sheet order.
pub fn build_report() -> JSValue {
    let attendance: Vec<JSValue> = samples::attendance_analysis()
        .iter()
        .map(attendance_to_json)
        .collect();
    let trends: Vec<JSValue> = samples::MONTHLY_TRENDS
        .iter()
        .map(monthly_trend_to_json)
        .collect();
    let metrics: Vec<JSValue> = samples::PERFORMANCE_METRICS
        .iter()
        .map(performance_metric_to_json)
        .collect();
    json!({
        "sheets": [
            {"name": "Attendance Analysis", "rows": attendance},
            {"name": "Monthly Trends", "rows": trends},
            {"name": "Performance Metrics", "rows": metrics},
        ]
    })
}

/// Writes the report for `date` into `dir` and returns the path of the file.
pub fn write_report(dir: &Path, date: NaiveDate) -> HubResult<PathBuf> {
    let p: PathBuf = dir.join(report_file_name(date));
    let path = p.display().to_string();
    fs::create_dir_all(dir).context(WritingOutputSnafu {
        path: dir.display().to_string(),
    })?;
    let contents = serde_json::to_string_pretty(&build_report()).context(ParsingJsonSnafu {})?;
    fs::write(&p, contents).context(WritingOutputSnafu { path })?;
    Ok(p)
}
