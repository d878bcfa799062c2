//! Command-line entry point: run the segmentation pipeline over a CSV and
//! print the structured report as JSON.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use cohort::config::PipelineConfig;
use cohort::pipeline::run_pipeline;

/// Customer segmentation via a clustering ensemble.
#[derive(Parser)]
#[command(name = "cohort", version, about)]
struct Cli {
    /// Input CSV file.
    #[arg(default_value = "data/Customer_Data.csv")]
    data: PathBuf,

    /// Directory for generated figures.
    #[arg(long, default_value = "results/figs")]
    out_dir: PathBuf,

    /// Verbosity level (-v, -vv).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_level = match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_target(false)
        .init();

    let config = PipelineConfig {
        fig_dir: cli.out_dir,
        ..PipelineConfig::default()
    };

    match run_pipeline(&cli.data, &config) {
        Ok(report) => {
            match serde_json::to_string_pretty(&report) {
                Ok(json) => println!("{json}"),
                Err(err) => {
                    eprintln!("error: failed to serialize report: {err}");
                    return ExitCode::FAILURE;
                }
            }
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}
