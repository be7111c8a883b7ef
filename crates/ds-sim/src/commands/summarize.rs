use std::error::Error;
use std::path::PathBuf;

use clap::Args;
use ds_core::serde::to_canonical_json_bytes;
use ds_run::summarize;

#[derive(Args, Debug)]
pub struct SummarizeArgs {
    /// Output directory of a completed run.
    #[arg(long)]
    pub root: PathBuf,
}

pub fn run(args: &SummarizeArgs) -> Result<(), Box<dyn Error>> {
    let report = summarize(&args.root)?;
    let json = to_canonical_json_bytes(&report)?;
    println!("{}", String::from_utf8(json)?);
    Ok(())
}
