use log::{debug, info, warn};

use retention_core::controller::{Dashboard, UploadOutcome};
use retention_core::*;
use snafu::{prelude::*, Snafu};

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::json;
use serde_json::Value as JSValue;
use text_diff::print_diff;

use crate::hub::config_reader::*;

pub mod config_reader;
pub mod export;
mod io_common;
mod io_csv;
mod io_excel;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum HubError {
    #[snafu(display("Error reading workbook {path}: {source}"))]
    WorkbookFormat {
        source: calamine::Error,
        path: String,
    },
    #[snafu(display("Error parsing CSV {path} at line {lineno}: {source}"))]
    CsvFormat {
        source: csv::Error,
        path: String,
        lineno: u64,
    },
    #[snafu(display("Error opening file {path}"))]
    OpeningFile {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error opening JSON file {path}"))]
    OpeningJson {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error parsing JSON: {source}"))]
    ParsingJson { source: serde_json::Error },
    #[snafu(display("Error writing {path}"))]
    WritingOutput {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("The configuration file {path} has no parent directory"))]
    MissingParentDir { path: String },
    #[snafu(display("No retention data could be loaded (tried {count} file(s))"))]
    NoData { count: usize },

    #[snafu(whatever, display("{message}"))]
    Whatever {
        message: String,
        #[snafu(source(from(Box<dyn std::error::Error>, Some)))]
        source: Option<Box<dyn std::error::Error>>,
    },
}

impl HubError {
    /// True for the errors that mean the content of an uploaded file could not be decoded.
    pub fn is_file_format(&self) -> bool {
        matches!(
            self,
            HubError::WorkbookFormat { .. } | HubError::CsvFormat { .. }
        )
    }

    /// The library view of a decoding error, if this is one.
    pub fn file_format_error(&self, format: SourceFormat) -> Option<FileFormatError> {
        if self.is_file_format() {
            Some(FileFormatError {
                format,
                message: self.to_string(),
            })
        } else {
            None
        }
    }
}

pub type HubResult<T> = Result<T, HubError>;

/// Reads one uploaded file into raw records, following the decode path of the format.
pub fn read_retention_data(path: &str, format: SourceFormat) -> HubResult<RawRecordSet> {
    info!("Attempting to read retention file {:?} as {}", path, format);
    match format {
        SourceFormat::Workbook => io_excel::read_workbook(path),
        SourceFormat::DelimitedText => io_csv::read_delimited_file(path),
    }
}

/// Uploads every source in turn into the dashboard.
///
/// Files that cannot be decoded are reported and skipped: the dashboard
/// keeps what it displayed before. Other errors (missing files) stop the run.
pub fn load_sources(dashboard: &mut Dashboard, sources: &[DataSource]) -> HubResult<usize> {
    let mut applied: usize = 0;
    for source in sources.iter() {
        let ticket = match source.format()? {
            Some(format) => dashboard.begin_upload_as(&source.file_path, format),
            None => dashboard.begin_upload(&source.file_path),
        };
        let decoded = match read_retention_data(&source.file_path, ticket.format()) {
            Ok(records) => Ok(records),
            Err(e) => match e.file_format_error(ticket.format()) {
                Some(fe) => Err(fe),
                None => return Err(e),
            },
        };
        match dashboard.complete_upload(ticket, decoded) {
            Ok(UploadOutcome::Applied) => {
                applied += 1;
            }
            Ok(UploadOutcome::Superseded) => {
                debug!("load_sources: {:?} superseded", source.file_path);
            }
            Err(fe) => {
                // The user is told and the previous state stays on display.
                warn!("load_sources: {}", fe);
                eprintln!("{}", fe);
            }
        }
    }
    Ok(applied)
}

fn summary_to_json(s: &AggregateSummary) -> JSValue {
    let origin = |o: Origin| match o {
        Origin::Derived => "derived",
        Origin::Default => "default",
    };
    json!({
        "totalWorkers": s.total_workers,
        "overallRetention": s.overall_retention_rate,
        "churnRate": s.churn_rate,
        "avgTenure": s.average_tenure_days,
        "satisfaction": s.satisfaction_score,
        "origins": {
            "totalWorkers": origin(s.origins.total_workers),
            "overallRetention": origin(s.origins.overall_retention_rate),
            "churnRate": origin(s.origins.churn_rate),
            "avgTenure": origin(s.origins.average_tenure_days),
            "satisfaction": origin(s.origins.satisfaction_score),
        }
    })
}

pub fn attendance_to_json(a: &AttendanceRecord) -> JSValue {
    json!({
        "channel": a.channel,
        "attendance": a.attendance,
        "consistency": a.consistency,
        "absent": a.absent,
        "daily": a.daily,
        "weekly": a.weekly,
    })
}

/// The display state in the shape consumed by the rendering layer.
pub fn state_to_json(state: &DashboardState) -> JSValue {
    let d = &state.data;
    let retention_metrics: Vec<JSValue> = d
        .retention_metrics
        .iter()
        .map(|m| {
            json!({
                "metric_type": m.metric_type,
                "channel": m.channel,
                "period": m.period,
                "retention_rate": m.retention_rate,
            })
        })
        .collect();
    let channel_data: Vec<JSValue> = d
        .channel_performance
        .iter()
        .map(|c| {
            json!({
                "channel": c.channel,
                "active_workers": c.active_workers,
                "retention_rate": c.retention_rate,
                "attendance_rate": c.attendance_rate,
                "churn_rate": c.churn_rate,
            })
        })
        .collect();
    let churn_reasons: Vec<JSValue> = d
        .churn_reasons
        .iter()
        .map(|c| json!({"reason": c.reason, "percentage": c.percentage, "count": c.count}))
        .collect();
    let worker_journey: Vec<JSValue> = d
        .worker_journey
        .iter()
        .map(|s| {
            json!({
                "stage": s.stage,
                "count": s.count,
                "percentage": s.percentage,
                "conversion": s.conversion,
            })
        })
        .collect();
    let attendance_data: Vec<JSValue> = d.attendance.iter().map(attendance_to_json).collect();
    let alerts: Vec<JSValue> = d
        .alerts
        .iter()
        .map(|a| json!({"type": a.severity.as_str(), "title": a.title, "description": a.description}))
        .collect();

    json!({
        "hasData": state.has_data,
        "retentionMetrics": retention_metrics,
        "channelData": channel_data,
        "churnReasons": churn_reasons,
        "workerJourney": worker_journey,
        "attendanceData": attendance_data,
        "alerts": alerts,
        "overallMetrics": summary_to_json(&d.summary),
    })
}

pub fn read_reference(path: &str) -> HubResult<JSValue> {
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu { path })?;
    serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu {})
}

fn write_output(out: &str, contents: &str) -> HubResult<()> {
    if out == "stdout" {
        println!("{}", contents);
    } else {
        info!("Writing dashboard state to {:?}", out);
        fs::write(out, contents).context(WritingOutputSnafu { path: out })?;
    }
    Ok(())
}

fn resolve_path(root: &Path, file_path: &str) -> String {
    let p: PathBuf = [root, Path::new(file_path)].iter().collect();
    p.as_path().display().to_string()
}

/// Merges the configuration file (if any) and the command line arguments.
///
/// The command line always takes precedence.
pub fn build_config(
    config_path: Option<String>,
    inputs: &[String],
    input_type: Option<String>,
    out: Option<String>,
    export_dir: Option<String>,
) -> HubResult<HubConfig> {
    let mut config = match config_path {
        Some(path) => {
            let mut config = read_config(&path)?;
            let root = Path::new(path.as_str())
                .parent()
                .context(MissingParentDirSnafu { path: path.clone() })?;
            for source in config.data_sources.iter_mut() {
                source.file_path = resolve_path(root, &source.file_path);
            }
            config
        }
        None => HubConfig::default(),
    };

    if !inputs.is_empty() {
        config.data_sources = inputs
            .iter()
            .map(|p| DataSource {
                file_path: p.clone(),
                format: None,
            })
            .collect();
    }
    if let Some(input_type) = input_type {
        for source in config.data_sources.iter_mut() {
            source.format = Some(input_type.clone());
        }
    }
    if out.is_some() {
        config.output_settings.output_path = out;
    }
    if export_dir.is_some() {
        config.output_settings.report_directory = export_dir;
    }
    debug!("build_config: {:?}", config);
    Ok(config)
}

pub fn run_dashboard(config: &HubConfig, check_reference_path: Option<String>) -> HubResult<()> {
    if config.data_sources.is_empty() {
        whatever!("No data source: provide a file with --input or a configuration with --config");
    }

    let defaults = config.summary_defaults();
    let mut dashboard = Dashboard::new(defaults);
    load_sources(&mut dashboard, &config.data_sources)?;

    let state = dashboard.state();
    if !state.has_data {
        return NoDataSnafu {
            count: config.data_sources.len(),
        }
        .fail();
    }

    let state_js = state_to_json(state);
    let pretty_js_state = serde_json::to_string_pretty(&state_js).context(ParsingJsonSnafu {})?;
    let out = config
        .output_settings
        .output_path
        .clone()
        .unwrap_or_else(|| "stdout".to_string());
    write_output(&out, &pretty_js_state)?;

    if let Some(report_dir) = config.output_settings.report_directory.as_ref() {
        let today = chrono::Local::now().date_naive();
        let p = export::write_report(Path::new(report_dir), today)?;
        info!("Report exported to {:?}", p);
    }

    // The reference state, if provided for comparison
    if let Some(reference_p) = check_reference_path {
        let reference = read_reference(&reference_p)?;
        debug!("reference: {:?}", reference);
        let pretty_js_reference =
            serde_json::to_string_pretty(&reference).context(ParsingJsonSnafu {})?;
        if pretty_js_reference != pretty_js_state {
            warn!("Found differences with the reference state");
            print_diff(
                pretty_js_reference.as_str(),
                pretty_js_state.as_ref(),
                "\n",
            );
            whatever!("Difference detected between computed state and reference state")
        }
    }

    Ok(())
}
