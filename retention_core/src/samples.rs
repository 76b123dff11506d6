//! Fixed reference tables.
//!
//! The alerts are shown whenever an upload carries none. The other tables
//! feed the exported report and do not depend on the uploaded data.

use crate::dashboard::{Alert, AttendanceRecord, SeverityKind};

/// The alerts displayed when an upload does not provide any.
pub fn default_alerts() -> Vec<Alert> {
    vec![
        Alert::new(
            SeverityKind::Critical,
            "High Churn Risk: ICH Food Delivery Segment",
            "234 food delivery workers showing signs of disengagement. 3+ consecutive absences detected.",
        ),
        Alert::new(
            SeverityKind::Warning,
            "LFM Housing Capacity Alert: Mumbai Nest",
            "Mumbai Nest at 97% occupancy. 23 new LFM workers arriving this week.",
        ),
        Alert::new(
            SeverityKind::Success,
            "Success Story: Bangalore LFM Retention Program",
            "Bangalore LFM retention program achieved 94.7% month-1 retention rate.",
        ),
    ]
}

#[derive(PartialEq, Debug, Clone)]
pub struct MonthlyTrend {
    pub month: &'static str,
    pub retention: f64,
    pub churn: f64,
    pub new_hires: u64,
    pub satisfaction: f64,
}

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct PerformanceMetric {
    pub metric: &'static str,
    pub value: &'static str,
    pub target: &'static str,
    pub status: &'static str,
    pub trend: &'static str,
}

pub fn attendance_analysis() -> Vec<AttendanceRecord> {
    [
        ("ICH Food Delivery", 93.7, 89.2, 234, 95.2, 91.8),
        ("ICH Logistics", 91.2, 87.8, 156, 92.4, 89.1),
        ("LFM Manufacturing", 95.8, 93.4, 87, 96.1, 94.7),
        ("LFM Services", 94.1, 91.2, 67, 94.8, 92.3),
    ]
    .iter()
    .map(
        |(channel, attendance, consistency, absent, daily, weekly)| AttendanceRecord {
            channel: channel.to_string(),
            attendance: *attendance,
            consistency: *consistency,
            absent: *absent,
            daily: *daily,
            weekly: *weekly,
        },
    )
    .collect()
}

pub const MONTHLY_TRENDS: [MonthlyTrend; 6] = [
    MonthlyTrend {
        month: "Jan",
        retention: 87.2,
        churn: 12.8,
        new_hires: 450,
        satisfaction: 4.1,
    },
    MonthlyTrend {
        month: "Feb",
        retention: 88.1,
        churn: 11.9,
        new_hires: 523,
        satisfaction: 4.2,
    },
    MonthlyTrend {
        month: "Mar",
        retention: 89.3,
        churn: 10.7,
        new_hires: 612,
        satisfaction: 4.3,
    },
    MonthlyTrend {
        month: "Apr",
        retention: 87.8,
        churn: 12.2,
        new_hires: 487,
        satisfaction: 4.1,
    },
    MonthlyTrend {
        month: "May",
        retention: 91.2,
        churn: 8.8,
        new_hires: 634,
        satisfaction: 4.4,
    },
    MonthlyTrend {
        month: "Jun",
        retention: 89.7,
        churn: 10.3,
        new_hires: 578,
        satisfaction: 4.2,
    },
];

pub const PERFORMANCE_METRICS: [PerformanceMetric; 6] = [
    PerformanceMetric {
        metric: "Overall Retention Rate",
        value: "89.2%",
        target: "85%",
        status: "excellent",
        trend: "+5.1%",
    },
    PerformanceMetric {
        metric: "Average Worker Tenure",
        value: "127",
        target: "120",
        status: "good",
        trend: "+12%",
    },
    PerformanceMetric {
        metric: "Worker Satisfaction",
        value: "4.2/5",
        target: "4.0",
        status: "excellent",
        trend: "+0.3",
    },
    PerformanceMetric {
        metric: "Churn Rate",
        value: "10.8%",
        target: "15%",
        status: "excellent",
        trend: "-4.2%",
    },
    PerformanceMetric {
        metric: "Time to Fill",
        value: "18 days",
        target: "21",
        status: "good",
        trend: "-3 days",
    },
    PerformanceMetric {
        metric: "Cost per Hire",
        value: "₹4,247",
        target: "₹5000",
        status: "excellent",
        trend: "-15%",
    },
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_alerts_cover_each_severity_in_order() {
        let kinds: Vec<SeverityKind> = default_alerts().iter().map(|a| a.severity).collect();
        assert_eq!(
            kinds,
            vec![
                SeverityKind::Critical,
                SeverityKind::Warning,
                SeverityKind::Success
            ]
        );
    }

    #[test]
    fn attendance_table() {
        let rows = attendance_analysis();
        assert_eq!(rows.len(), 4);
        assert_eq!(rows[2].channel, "LFM Manufacturing");
        assert_eq!(rows[2].absent, 87);
    }
}
