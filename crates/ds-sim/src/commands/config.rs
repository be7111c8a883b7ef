use std::error::Error;
use std::fs;
use std::path::PathBuf;

use clap::Args;
use ds_run::AnalysisConfig;

#[derive(Args, Debug)]
pub struct ConfigArgs {
    /// Destination path for the YAML configuration.
    #[arg(long)]
    pub out: PathBuf,
}

pub fn run(args: &ConfigArgs) -> Result<(), Box<dyn Error>> {
    if let Some(parent) = args.out.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let yaml = AnalysisConfig::default().to_yaml_string()?;
    fs::write(&args.out, yaml)?;
    Ok(())
}
