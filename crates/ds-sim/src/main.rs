use std::error::Error;

use clap::{Parser, Subcommand};
use commands::{
    config::{self, ConfigArgs},
    run::{self, RunArgs},
    summarize::{self, SummarizeArgs},
    synth::{self, SynthArgs},
};
use tracing::Level;

mod commands;

#[derive(Parser, Debug)]
#[command(name = "ds-sim", about = "Row-wise vs cell-wise decision-space analysis")]
struct Cli {
    /// Log at DEBUG level.
    #[arg(long, global = true)]
    verbose: bool,
    /// Emit logs as JSON lines.
    #[arg(long, global = true)]
    log_json: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the analysis and write plots, surfaces and the report.
    Run(RunArgs),
    /// Write the default configuration as YAML.
    Config(ConfigArgs),
    /// Generate a synthetic trajectory dataset.
    Synth(SynthArgs),
    /// Print the report of a finished run.
    Summarize(SummarizeArgs),
}

fn init_logging(verbose: bool, json: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let builder = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr);
    let _ = if json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.log_json);
    match cli.command {
        Command::Run(args) => run::run(&args),
        Command::Config(args) => config::run(&args),
        Command::Synth(args) => synth::run(&args),
        Command::Summarize(args) => summarize::run(&args),
    }
}
