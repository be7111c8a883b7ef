pub mod config;
pub mod run;
pub mod summarize;
pub mod synth;
