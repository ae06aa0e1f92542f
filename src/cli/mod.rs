pub mod commands;
pub mod handlers;
pub mod output;

pub use commands::{CliArgs, Commands, ExtractArgs, ReplaceArgs};
pub use output::{OutputFormat, OutputFormatter};
