use std::env;
use std::error::Error;
use std::io;
use std::path::PathBuf;

use clap::Args;
use ds_data::{RewardCondition, SubjectRange};
use ds_run::{load_config, run_analysis, AnalysisConfig};

#[derive(Args, Debug)]
pub struct RunArgs {
    /// YAML configuration; defaults are used when omitted.
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// Output directory for plots, surfaces and the report.
    #[arg(long)]
    pub out: PathBuf,
    /// Dataset path, overriding the configuration; relative to the working directory.
    #[arg(long)]
    pub data: Option<PathBuf>,
    /// Experiment type to select.
    #[arg(long)]
    pub exp_type: Option<u32>,
    /// Reward pairing: high-high, high-low or low-low.
    #[arg(long)]
    pub condition: Option<RewardCondition>,
    /// Explicit reward sum, bypassing the condition.
    #[arg(long)]
    pub rewards_sum: Option<f64>,
    /// Inclusive subject range, e.g. 18-36.
    #[arg(long)]
    pub subjects: Option<SubjectRange>,
}

pub fn run(args: &RunArgs) -> Result<(), Box<dyn Error>> {
    let mut config = match &args.config {
        Some(path) => load_config(path)?,
        None => AnalysisConfig {
            base_dir: PathBuf::from("."),
            ..AnalysisConfig::default()
        },
    };
    apply_overrides(&mut config, args)?;
    let report = run_analysis(&config, &args.out)?;
    for plot in &report.plots {
        println!("{}", args.out.join(plot).display());
    }
    Ok(())
}

fn apply_overrides(config: &mut AnalysisConfig, args: &RunArgs) -> io::Result<()> {
    if let Some(data) = &args.data {
        // Command-line paths are relative to the working directory, not the config file.
        config.data.path = if data.is_absolute() {
            data.clone()
        } else {
            env::current_dir()?.join(data)
        };
    }
    if let Some(exp_type) = args.exp_type {
        config.selection.exp_type = exp_type;
    }
    if let Some(condition) = args.condition {
        config.selection.condition = condition;
        config.selection.rewards_sum = None;
    }
    if let Some(sum) = args.rewards_sum {
        config.selection.rewards_sum = Some(sum);
    }
    if let Some(subjects) = args.subjects {
        config.selection.subjects = subjects;
    }
    Ok(())
}
