//! Command-line front end for a single harvest run.
mod args;
mod config_file;
mod logging;
mod run;

pub use args::Args;
pub use run::run;
