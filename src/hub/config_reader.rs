use crate::hub::*;

use serde::{Deserialize, Serialize};

#[derive(PartialEq, Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutputSettings {
    /// A file path or `stdout`
    #[serde(rename = "outputPath")]
    pub output_path: Option<String>,
    #[serde(rename = "reportDirectory")]
    pub report_directory: Option<String>,
}

#[derive(PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct DataSource {
    #[serde(rename = "filePath")]
    pub file_path: String,
    /// Overrides the detection from the file extension: `csv`, `xlsx` or `xls`.
    pub format: Option<String>,
}

impl DataSource {
    pub fn format(&self) -> HubResult<Option<SourceFormat>> {
        match self.format.as_deref() {
            None => Ok(None),
            Some(s) => match s.to_ascii_lowercase().as_str() {
                "csv" => Ok(Some(SourceFormat::DelimitedText)),
                "xlsx" | "xls" => Ok(Some(SourceFormat::Workbook)),
                x => whatever!("Unknown input type {:?} for {}", x, self.file_path),
            },
        }
    }
}

#[derive(PartialEq, Debug, Clone, Default, Serialize, Deserialize)]
pub struct SummaryDefaultsConfig {
    #[serde(rename = "totalWorkers")]
    pub total_workers: Option<u64>,
    #[serde(rename = "overallRetentionRate")]
    pub overall_retention_rate: Option<f64>,
    #[serde(rename = "churnRate")]
    pub churn_rate: Option<f64>,
    #[serde(rename = "averageTenureDays")]
    pub average_tenure_days: Option<u64>,
    #[serde(rename = "satisfactionScore")]
    pub satisfaction_score: Option<f64>,
}

#[derive(PartialEq, Debug, Clone, Default, Serialize, Deserialize)]
pub struct HubConfig {
    #[serde(rename = "outputSettings", default)]
    pub output_settings: OutputSettings,
    #[serde(rename = "dataSources", default)]
    pub data_sources: Vec<DataSource>,
    #[serde(rename = "summaryDefaults", default)]
    pub summary_defaults: SummaryDefaultsConfig,
}

impl HubConfig {
    pub fn summary_defaults(&self) -> SummaryDefaults {
        let c = &self.summary_defaults;
        let d = SummaryDefaults::DEFAULT;
        SummaryDefaults {
            total_workers: c.total_workers.unwrap_or(d.total_workers),
            overall_retention_rate: c.overall_retention_rate.unwrap_or(d.overall_retention_rate),
            churn_rate: c.churn_rate.unwrap_or(d.churn_rate),
            average_tenure_days: c.average_tenure_days.unwrap_or(d.average_tenure_days),
            satisfaction_score: c.satisfaction_score.unwrap_or(d.satisfaction_score),
        }
    }
}

pub fn read_config(path: &str) -> HubResult<HubConfig> {
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu { path })?;
    let config: HubConfig =
        serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu {})?;
    info!("config: {:?}", config);
    Ok(config)
}
