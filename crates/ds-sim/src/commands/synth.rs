use std::error::Error;
use std::fs;
use std::path::PathBuf;

use clap::Args;
use ds_data::{synthesise, write_csv, SubjectRange, SynthSpec};

#[derive(Args, Debug)]
pub struct SynthArgs {
    /// Destination CSV path.
    #[arg(long)]
    pub out: PathBuf,
    /// Master seed.
    #[arg(long, default_value_t = 0)]
    pub seed: u64,
    /// Inclusive subject range, e.g. 18-36.
    #[arg(long, default_value = "18-36")]
    pub subjects: SubjectRange,
    /// Trials per subject, experiment type and reward condition.
    #[arg(long, default_value_t = 4)]
    pub trials: u32,
    /// Samples per trial.
    #[arg(long, default_value_t = 40)]
    pub samples: usize,
}

pub fn run(args: &SynthArgs) -> Result<(), Box<dyn Error>> {
    if let Some(parent) = args.out.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let spec = SynthSpec {
        subjects: args.subjects,
        trials_per_condition: args.trials,
        samples_per_trial: args.samples,
        ..SynthSpec::with_seed(args.seed)
    };
    write_csv(&synthesise(&spec), &args.out)?;
    Ok(())
}
