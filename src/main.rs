mod args;
mod hub;

use clap::Parser;
use env_logger::Builder;
use log::{info, LevelFilter};
use snafu::ErrorCompat;

use crate::args::Args;

fn main() {
    let args = Args::parse();

    if args.verbose {
        Builder::from_default_env()
            .filter_level(LevelFilter::Debug)
            .init();
    } else {
        env_logger::init();
    }
    info!("args: {:?}", args);

    let res = hub::build_config(
        args.config.clone(),
        &args.input,
        args.input_type.clone(),
        args.out.clone(),
        args.export_dir.clone(),
    )
    .and_then(|config| hub::run_dashboard(&config, args.reference.clone()));

    if let Err(e) = res {
        eprintln!("An error occured: {}", e);
        if let Some(bt) = ErrorCompat::backtrace(&e) {
            eprintln!("trace: {}", bt);
        }
        std::process::exit(1);
    }
}
