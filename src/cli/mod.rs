pub mod commands;
pub mod output;

pub use commands::{BuildArgs, CliArgs, Commands, LocateArgs, OutputFormatArg};
pub use output::{OutputFormat, OutputFormatter};
