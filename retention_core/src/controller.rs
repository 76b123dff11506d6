use log::{debug, info, warn};

use crate::{normalize, DashboardData, DashboardState, RawRecordSet, SourceFormat, SummaryDefaults};

/// Owns what the dashboard displays and applies uploads to it.
///
/// Each applied upload replaces the whole state with a new snapshot. A
/// failed upload leaves the previous snapshot in place. When uploads
/// overlap, only the one started last may be applied.
///
/// ```
/// use retention_core::controller::{Dashboard, UploadOutcome};
/// use retention_core::*;
///
/// let mut dashboard = Dashboard::new(SummaryDefaults::DEFAULT);
/// assert!(!dashboard.state().has_data);
///
/// let ticket = dashboard.begin_upload("retention.csv");
/// assert_eq!(ticket.format(), SourceFormat::DelimitedText);
///
/// let decoded: Result<RawRecordSet, FileFormatError> = Ok(RawRecordSet::Flat(vec![]));
/// let outcome = dashboard.complete_upload(ticket, decoded)?;
/// assert_eq!(outcome, UploadOutcome::Applied);
/// assert!(dashboard.state().has_data);
/// # Ok::<(), FileFormatError>(())
/// ```
pub struct Dashboard {
    defaults: SummaryDefaults,
    state: DashboardState,
    generation: u64,
}

/// Identifies one upload between the moment the file is picked and the end of its decoding.
#[derive(Eq, PartialEq, Debug)]
pub struct UploadTicket {
    generation: u64,
    format: SourceFormat,
    name: String,
}

impl UploadTicket {
    pub fn format(&self) -> SourceFormat {
        self.format
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum UploadOutcome {
    /// The state now shows this upload.
    Applied,
    /// A more recent upload was started: this completion was discarded.
    Superseded,
}

impl Dashboard {
    pub fn new(defaults: SummaryDefaults) -> Dashboard {
        let state = DashboardState {
            data: DashboardData::empty(&defaults),
            has_data: false,
        };
        Dashboard {
            defaults,
            state,
            generation: 0,
        }
    }

    pub fn state(&self) -> &DashboardState {
        &self.state
    }

    /// Starts an upload. The decode path is chosen from the file name.
    pub fn begin_upload(&mut self, file_name: &str) -> UploadTicket {
        self.begin_upload_as(file_name, SourceFormat::from_file_name(file_name))
    }

    /// Starts an upload with an explicit decode path.
    pub fn begin_upload_as(&mut self, file_name: &str, format: SourceFormat) -> UploadTicket {
        self.generation += 1;
        info!(
            "begin_upload: {:?} as {} (upload #{})",
            file_name, format, self.generation
        );
        UploadTicket {
            generation: self.generation,
            format,
            name: file_name.to_string(),
        }
    }

    /// Applies the result of decoding the file of `ticket`.
    ///
    /// A decoding error is handed back for the caller to report. The state
    /// is only replaced when the decoding succeeded and no other upload
    /// started in the meantime.
    pub fn complete_upload<E>(
        &mut self,
        ticket: UploadTicket,
        decoded: Result<RawRecordSet, E>,
    ) -> Result<UploadOutcome, E> {
        if ticket.generation != self.generation {
            warn!(
                "complete_upload: discarding {:?} (upload #{}), upload #{} is more recent",
                ticket.name, ticket.generation, self.generation
            );
            return Ok(UploadOutcome::Superseded);
        }
        let records = decoded?;
        debug!(
            "complete_upload: {:?}: {} records",
            ticket.name,
            records.num_records()
        );
        self.state = DashboardState {
            data: normalize(&records, &self.defaults),
            has_data: true,
        };
        Ok(UploadOutcome::Applied)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{CellValue, FileFormatError, RawRecord};

    fn channel_rows(workers: f64) -> RawRecordSet {
        RawRecordSet::Sheets(vec![(
            "channel_performance".to_string(),
            vec![RawRecord::from_pairs(vec![(
                "active_workers",
                CellValue::Number(workers),
            )])],
        )])
    }

    fn format_error() -> FileFormatError {
        FileFormatError {
            format: SourceFormat::Workbook,
            message: "invalid zip header".to_string(),
        }
    }

    #[test]
    fn starts_without_data() {
        let dashboard = Dashboard::new(SummaryDefaults::DEFAULT);
        let state = dashboard.state();
        assert!(!state.has_data);
        assert!(state.data.alerts.is_empty());
        assert_eq!(state.data.summary, SummaryDefaults::DEFAULT.summary());
    }

    #[test]
    fn failure_keeps_empty_state() {
        let mut dashboard = Dashboard::new(SummaryDefaults::DEFAULT);
        let before = dashboard.state().clone();
        let ticket = dashboard.begin_upload("broken.xlsx");
        let res = dashboard.complete_upload(ticket, Err(format_error()));
        assert_eq!(res, Err(format_error()));
        assert_eq!(dashboard.state(), &before);
    }

    #[test]
    fn failure_keeps_previous_upload() {
        let mut dashboard = Dashboard::new(SummaryDefaults::DEFAULT);
        let ticket = dashboard.begin_upload("good.xlsx");
        let res: Result<UploadOutcome, FileFormatError> =
            dashboard.complete_upload(ticket, Ok(channel_rows(12.0)));
        assert_eq!(res, Ok(UploadOutcome::Applied));
        let before = dashboard.state().clone();

        let ticket = dashboard.begin_upload("broken.xlsx");
        assert!(dashboard.complete_upload(ticket, Err(format_error())).is_err());
        assert_eq!(dashboard.state(), &before);
        assert_eq!(dashboard.state().data.summary.total_workers, 12);
    }

    #[test]
    fn later_upload_wins() {
        let mut dashboard = Dashboard::new(SummaryDefaults::DEFAULT);
        let first = dashboard.begin_upload("first.xlsx");
        let second = dashboard.begin_upload("second.xlsx");

        let res: Result<UploadOutcome, FileFormatError> =
            dashboard.complete_upload(second, Ok(channel_rows(2.0)));
        assert_eq!(res, Ok(UploadOutcome::Applied));
        // The first upload finishes last but was started first.
        let res: Result<UploadOutcome, FileFormatError> =
            dashboard.complete_upload(first, Ok(channel_rows(1.0)));
        assert_eq!(res, Ok(UploadOutcome::Superseded));
        assert_eq!(dashboard.state().data.summary.total_workers, 2);
    }

    #[test]
    fn stale_failure_is_not_reported() {
        let mut dashboard = Dashboard::new(SummaryDefaults::DEFAULT);
        let first = dashboard.begin_upload("first.xlsx");
        let _second = dashboard.begin_upload("second.csv");
        assert_eq!(
            dashboard.complete_upload(first, Err(format_error())),
            Ok(UploadOutcome::Superseded)
        );
    }

    #[test]
    fn same_file_twice_gives_same_state() {
        let mut dashboard = Dashboard::new(SummaryDefaults::DEFAULT);
        let ticket = dashboard.begin_upload("a.xlsx");
        let _: Result<UploadOutcome, FileFormatError> =
            dashboard.complete_upload(ticket, Ok(channel_rows(7.0)));
        let first = dashboard.state().clone();
        let ticket = dashboard.begin_upload("a.xlsx");
        let _: Result<UploadOutcome, FileFormatError> =
            dashboard.complete_upload(ticket, Ok(channel_rows(7.0)));
        assert_eq!(dashboard.state(), &first);
    }

    #[test]
    fn explicit_format() {
        let mut dashboard = Dashboard::new(SummaryDefaults::DEFAULT);
        let ticket = dashboard.begin_upload_as("export.txt", SourceFormat::Workbook);
        assert_eq!(ticket.format(), SourceFormat::Workbook);
        assert_eq!(ticket.name(), "export.txt");
    }
}
