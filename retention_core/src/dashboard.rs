// ******** Normalized dashboard structures *********

use std::fmt::Display;

use crate::records::RawRecord;

const UNSPECIFIED_CHANNEL: &str = "Unspecified";

#[derive(PartialEq, Debug, Clone)]
pub struct RetentionMetric {
    pub metric_type: Option<String>,
    pub channel: Option<String>,
    pub period: Option<String>,
    /// Percentage. A missing rate counts as zero.
    pub retention_rate: f64,
}

impl RetentionMetric {
    pub fn from_record(rec: &RawRecord) -> RetentionMetric {
        RetentionMetric {
            metric_type: rec.text("metric_type"),
            channel: rec.text("channel"),
            period: rec.text("period"),
            retention_rate: rec.number("retention_rate").unwrap_or(0.0),
        }
    }
}

#[derive(PartialEq, Debug, Clone)]
pub struct ChannelPerformance {
    pub channel: String,
    pub active_workers: u64,
    pub retention_rate: Option<f64>,
    pub attendance_rate: Option<f64>,
    pub churn_rate: Option<f64>,
}

impl ChannelPerformance {
    pub fn from_record(rec: &RawRecord) -> ChannelPerformance {
        ChannelPerformance {
            channel: rec
                .text("channel")
                .unwrap_or_else(|| UNSPECIFIED_CHANNEL.to_string()),
            active_workers: rec.count("active_workers").unwrap_or(0),
            retention_rate: rec.number("retention_rate"),
            attendance_rate: rec.number("attendance_rate"),
            churn_rate: rec.number("churn_rate"),
        }
    }
}

#[derive(PartialEq, Debug, Clone)]
pub struct ChurnReason {
    pub reason: String,
    pub percentage: f64,
    pub count: u64,
}

impl ChurnReason {
    pub fn from_record(rec: &RawRecord) -> ChurnReason {
        ChurnReason {
            reason: rec.text("reason").unwrap_or_else(|| "Other".to_string()),
            percentage: rec.number("percentage").unwrap_or(0.0),
            count: rec.count("count").unwrap_or(0),
        }
    }
}

#[derive(PartialEq, Debug, Clone)]
pub struct WorkerJourneyStage {
    pub stage: String,
    pub count: u64,
    pub percentage: f64,
    pub conversion: f64,
}

impl WorkerJourneyStage {
    pub fn from_record(rec: &RawRecord) -> WorkerJourneyStage {
        WorkerJourneyStage {
            stage: rec
                .text("stage")
                .unwrap_or_else(|| "Unknown stage".to_string()),
            count: rec.count("count").unwrap_or(0),
            percentage: rec.number("percentage").unwrap_or(0.0),
            conversion: rec.number("conversion").unwrap_or(0.0),
        }
    }
}

#[derive(PartialEq, Debug, Clone)]
pub struct AttendanceRecord {
    pub channel: String,
    pub attendance: f64,
    pub consistency: f64,
    pub absent: u64,
    pub daily: f64,
    pub weekly: f64,
}

impl AttendanceRecord {
    pub fn from_record(rec: &RawRecord) -> AttendanceRecord {
        AttendanceRecord {
            channel: rec
                .text("channel")
                .unwrap_or_else(|| UNSPECIFIED_CHANNEL.to_string()),
            attendance: rec.number("attendance").unwrap_or(0.0),
            consistency: rec.number("consistency").unwrap_or(0.0),
            absent: rec.count("absent").unwrap_or(0),
            daily: rec.number("daily").unwrap_or(0.0),
            weekly: rec.number("weekly").unwrap_or(0.0),
        }
    }
}

/// How urgent an alert is. Drives the styling of the alert card.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash)]
pub enum SeverityKind {
    Critical,
    Warning,
    Success,
}

impl SeverityKind {
    pub fn parse(s: &str) -> Option<SeverityKind> {
        match s.trim().to_ascii_lowercase().as_str() {
            "critical" => Some(SeverityKind::Critical),
            "warning" => Some(SeverityKind::Warning),
            "success" => Some(SeverityKind::Success),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SeverityKind::Critical => "critical",
            SeverityKind::Warning => "warning",
            SeverityKind::Success => "success",
        }
    }
}

impl Display for SeverityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct Alert {
    pub severity: SeverityKind,
    pub title: String,
    pub description: String,
}

impl Alert {
    pub fn new(severity: SeverityKind, title: &str, description: &str) -> Alert {
        Alert {
            severity,
            title: title.to_string(),
            description: description.to_string(),
        }
    }

    pub fn from_record(rec: &RawRecord) -> Alert {
        Alert {
            severity: rec
                .text("severity")
                .and_then(|s| SeverityKind::parse(&s))
                .unwrap_or(SeverityKind::Warning),
            title: rec.text("title").unwrap_or_else(|| "Alert".to_string()),
            description: rec
                .text("description")
                .unwrap_or_else(|| "No description available".to_string()),
        }
    }
}

// ******** Summary *********

/// Where a summary figure comes from.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash)]
pub enum Origin {
    /// Computed from the uploaded rows.
    Derived,
    /// The literal fallback from [SummaryDefaults].
    Default,
}

#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub struct SummaryOrigins {
    pub total_workers: Origin,
    pub overall_retention_rate: Origin,
    pub churn_rate: Origin,
    pub average_tenure_days: Origin,
    pub satisfaction_score: Origin,
}

impl SummaryOrigins {
    pub const ALL_DEFAULT: SummaryOrigins = SummaryOrigins {
        total_workers: Origin::Default,
        overall_retention_rate: Origin::Default,
        churn_rate: Origin::Default,
        average_tenure_days: Origin::Default,
        satisfaction_score: Origin::Default,
    };

    /// The names of the fields that fell back to their default.
    pub fn defaulted_fields(&self) -> Vec<&'static str> {
        [
            ("totalWorkers", self.total_workers),
            ("overallRetention", self.overall_retention_rate),
            ("churnRate", self.churn_rate),
            ("avgTenure", self.average_tenure_days),
            ("satisfaction", self.satisfaction_score),
        ]
        .iter()
        .filter(|(_, o)| *o == Origin::Default)
        .map(|(name, _)| *name)
        .collect()
    }
}

#[derive(PartialEq, Debug, Clone)]
pub struct AggregateSummary {
    pub total_workers: u64,
    /// Percentage
    pub overall_retention_rate: f64,
    /// Percentage
    pub churn_rate: f64,
    pub average_tenure_days: u64,
    /// On a 1-5 scale
    pub satisfaction_score: f64,
    pub origins: SummaryOrigins,
}

/// The fallback figures used when a summary field cannot be computed.
#[derive(PartialEq, Debug, Clone)]
pub struct SummaryDefaults {
    pub total_workers: u64,
    pub overall_retention_rate: f64,
    pub churn_rate: f64,
    pub average_tenure_days: u64,
    pub satisfaction_score: f64,
}

impl SummaryDefaults {
    pub const DEFAULT: SummaryDefaults = SummaryDefaults {
        total_workers: 4303,
        overall_retention_rate: 89.2,
        churn_rate: 10.8,
        average_tenure_days: 127,
        satisfaction_score: 4.2,
    };

    /// A summary made only of the fallback figures.
    pub fn summary(&self) -> AggregateSummary {
        AggregateSummary {
            total_workers: self.total_workers,
            overall_retention_rate: self.overall_retention_rate,
            churn_rate: self.churn_rate,
            average_tenure_days: self.average_tenure_days,
            satisfaction_score: self.satisfaction_score,
            origins: SummaryOrigins::ALL_DEFAULT,
        }
    }
}

impl Default for SummaryDefaults {
    fn default() -> Self {
        SummaryDefaults::DEFAULT
    }
}

// ******** Display state *********

/// The six datasets and the summary that the dashboard renders.
///
/// Every field is always populated: missing source data is an empty list
/// or a literal default, never a hole.
#[derive(PartialEq, Debug, Clone)]
pub struct DashboardData {
    pub retention_metrics: Vec<RetentionMetric>,
    pub channel_performance: Vec<ChannelPerformance>,
    pub churn_reasons: Vec<ChurnReason>,
    pub worker_journey: Vec<WorkerJourneyStage>,
    pub attendance: Vec<AttendanceRecord>,
    pub alerts: Vec<Alert>,
    pub summary: AggregateSummary,
}

impl DashboardData {
    pub fn empty(defaults: &SummaryDefaults) -> DashboardData {
        DashboardData {
            retention_metrics: Vec::new(),
            channel_performance: Vec::new(),
            churn_reasons: Vec::new(),
            worker_journey: Vec::new(),
            attendance: Vec::new(),
            alerts: Vec::new(),
            summary: defaults.summary(),
        }
    }
}

/// A snapshot of what the dashboard displays.
#[derive(PartialEq, Debug, Clone)]
pub struct DashboardState {
    pub data: DashboardData,
    /// False until one upload has been applied. Selects the empty-state view.
    pub has_data: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::CellValue;

    #[test]
    fn alert_defaults() {
        let a = Alert::from_record(&RawRecord::new());
        assert_eq!(
            a,
            Alert::new(SeverityKind::Warning, "Alert", "No description available")
        );
        let rec = RawRecord::from_pairs(vec![
            ("severity", CellValue::Text("Critical".to_string())),
            ("title", CellValue::Text("Low show-up".to_string())),
        ]);
        let a = Alert::from_record(&rec);
        assert_eq!(a.severity, SeverityKind::Critical);
        assert_eq!(a.title, "Low show-up");
        assert_eq!(a.description, "No description available");
    }

    #[test]
    fn unknown_severity_is_warning() {
        let rec = RawRecord::from_pairs(vec![("severity", CellValue::Text("info".to_string()))]);
        assert_eq!(Alert::from_record(&rec).severity, SeverityKind::Warning);
    }

    #[test]
    fn malformed_fields_fall_back() {
        let rec = RawRecord::from_pairs(vec![
            ("channel", CellValue::Absent),
            ("active_workers", CellValue::Text("lots".to_string())),
            ("retention_rate", CellValue::Text("91.0".to_string())),
        ]);
        let cp = ChannelPerformance::from_record(&rec);
        assert_eq!(cp.channel, "Unspecified");
        assert_eq!(cp.active_workers, 0);
        assert_eq!(cp.retention_rate, Some(91.0));
        assert_eq!(cp.churn_rate, None);

        let js = WorkerJourneyStage::from_record(&RawRecord::new());
        assert_eq!(js.stage, "Unknown stage");
        assert_eq!(js.count, 0);
    }

    #[test]
    fn defaulted_fields_are_listed() {
        let mut origins = SummaryOrigins::ALL_DEFAULT;
        origins.total_workers = Origin::Derived;
        assert_eq!(
            origins.defaulted_fields(),
            vec!["overallRetention", "churnRate", "avgTenure", "satisfaction"]
        );
    }
}
