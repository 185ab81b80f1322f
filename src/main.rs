use anyhow::Context;
use average_temperature::{write_averages, Strategy, TemperatureFileProcessor};
use clap::Parser;
use std::path::PathBuf;
use tracing::{info, Level};
use tracing_subscriber::EnvFilter;

/// Average temperature per city and year, written as CSV to stdout.
#[derive(Parser)]
#[command(name = "average-temperature", version)]
struct Args {
    /// Measurements file, one `city;date;...;temperature` line per measurement.
    file: PathBuf,

    /// How the measurements are aggregated.
    #[arg(short, long, value_enum, default_value_t = Strategy::Grouping)]
    strategy: Strategy,

    /// Increase logging verbosity (-v for debug, -vv for trace).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Only log errors.
    #[arg(short, long)]
    quiet: bool,
}

fn init_logging(verbose: u8, quiet: bool) -> Result<(), anyhow::Error> {
    let level = if quiet {
        Level::ERROR
    } else {
        match verbose {
            0 => Level::WARN,
            1 => Level::DEBUG,
            _ => Level::TRACE,
        }
    };
    let filter = EnvFilter::from_default_env()
        .add_directive(format!("average_temperature={level}").parse()?);
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
    Ok(())
}

fn main() -> Result<(), anyhow::Error> {
    let args = Args::parse();
    init_logging(args.verbose, args.quiet)?;
    let processor = TemperatureFileProcessor::new(&args.file);
    let averages = processor
        .process(args.strategy)
        .with_context(|| format!("can't process {}", processor.path().display()))?;
    info!(cities = averages.len(), "done");
    write_averages(std::io::stdout(), &averages)?;
    Ok(())
}
