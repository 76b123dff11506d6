use clap::Parser;

/// Loads gig-worker retention data into the datasets of the retention dashboard.
#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    /// (file path, optional) A JSON configuration file listing the data sources, the output
    /// settings and the summary defaults. See the manual of retention_core for the format.
    #[clap(short, long, value_parser)]
    pub config: Option<String>,

    /// (file path, may be repeated) A retention data file (.xlsx, .xls or .csv). Each file is
    /// uploaded in turn and the last one that can be read is displayed. Setting this option overrides
    /// the data sources of the --config option.
    #[clap(short, long, value_parser)]
    pub input: Vec<String>,

    /// (csv, xlsx or xls) Forces the decode path of all the inputs instead of using the file extension.
    #[clap(long, value_parser)]
    pub input_type: Option<String>,

    /// (file path, 'stdout' or empty) Where the dashboard state is written in JSON format.
    /// Setting this option overrides the path that may be specified with the --config option.
    #[clap(short, long, value_parser)]
    pub out: Option<String>,

    /// (file path) A reference file containing a dashboard state in JSON format. If provided,
    /// retention-hub will check that the computed state matches the reference.
    #[clap(short, long, value_parser)]
    pub reference: Option<String>,

    /// (directory) If specified, the retention intelligence report is exported into this directory.
    #[clap(long, value_parser)]
    pub export_dir: Option<String>,

    // Other arguments
    /// If passed as an argument, will turn on verbose logging to the standard output.
    #[clap(long, takes_value = false)]
    pub verbose: bool,
}
