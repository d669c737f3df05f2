use crate::buildsystem::BuildSystemId;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Cloud Native Buildpack build step for Maven and Gradle applications
#[derive(Parser, Debug)]
#[command(
    name = "build-system-cnb",
    about = "Build a Maven or Gradle application and contribute it as a layer",
    version,
    author,
    long_about = "build-system-cnb runs the project's build wrapper, locates the artifact it \
                  produced, contributes that artifact to the application layer and replaces \
                  the application source with the result.\n\n\
                  Build arguments and the built module are read from BP_BUILD_ARGUMENTS and \
                  BP_BUILT_MODULE unless overridden on the command line."
)]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(long, global = true, value_name = "LEVEL", help = "Set logging level")]
    pub log_level: Option<String>,

    #[arg(short = 'v', long, global = true, help = "Enable debug logging")]
    pub verbose: bool,

    #[arg(
        short = 'q',
        long,
        global = true,
        conflicts_with = "verbose",
        help = "Quiet mode - suppress non-error output"
    )]
    pub quiet: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    #[command(
        about = "Run the build and contribute the application layer",
        long_about = "Runs the wrapper script, contributes the built artifact to the \
                      build-system-application layer and replaces the application root.\n\n\
                      Examples:\n  \
                      build-system-cnb build --build-system maven --layers /layers/build-system\n  \
                      build-system-cnb build /workspace --build-system gradle --layers /layers/build-system --format json"
    )]
    Build(BuildArgs),

    #[command(
        about = "Locate the built artifact without running the build",
        long_about = "Searches the build output directories for exactly one artifact and \
                      reports its classification. Nothing is executed or modified.\n\n\
                      Examples:\n  \
                      build-system-cnb locate --build-system maven\n  \
                      build-system-cnb locate /workspace --build-system maven --module api"
    )]
    Locate(LocateArgs),
}

#[derive(Parser, Debug, Clone)]
pub struct BuildArgs {
    #[arg(
        value_name = "PATH",
        help = "Application root (defaults to current directory)"
    )]
    pub application_path: Option<PathBuf>,

    #[arg(
        short = 'l',
        long,
        value_name = "DIR",
        help = "Layers directory the application layer is contributed to"
    )]
    pub layers: PathBuf,

    #[arg(
        short = 's',
        long,
        value_parser = parse_build_system,
        help = "Build system driving the application (maven, gradle)"
    )]
    pub build_system: BuildSystemId,

    #[arg(
        long,
        value_name = "ARGS",
        allow_hyphen_values = true,
        help = "Build arguments replacing the defaults (overrides BP_BUILD_ARGUMENTS)"
    )]
    pub build_arguments: Option<String>,

    #[arg(
        short = 'm',
        long,
        value_name = "MODULE",
        help = "Module whose artifact is used (overrides BP_BUILT_MODULE)"
    )]
    pub module: Option<String>,

    #[arg(
        short = 'f',
        long,
        value_enum,
        default_value = "human",
        help = "Output format"
    )]
    pub format: OutputFormatArg,
}

#[derive(Parser, Debug, Clone)]
pub struct LocateArgs {
    #[arg(
        value_name = "PATH",
        help = "Application root (defaults to current directory)"
    )]
    pub application_path: Option<PathBuf>,

    #[arg(
        short = 's',
        long,
        value_parser = parse_build_system,
        help = "Build system that produced the artifact (maven, gradle)"
    )]
    pub build_system: BuildSystemId,

    #[arg(
        short = 'm',
        long,
        value_name = "MODULE",
        help = "Module whose artifact is used (overrides BP_BUILT_MODULE)"
    )]
    pub module: Option<String>,

    #[arg(
        short = 'f',
        long,
        value_enum,
        default_value = "human",
        help = "Output format"
    )]
    pub format: OutputFormatArg,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormatArg {
    Json,
    Human,
}

impl From<OutputFormatArg> for super::output::OutputFormat {
    fn from(arg: OutputFormatArg) -> Self {
        match arg {
            OutputFormatArg::Json => super::output::OutputFormat::Json,
            OutputFormatArg::Human => super::output::OutputFormat::Human,
        }
    }
}

fn parse_build_system(s: &str) -> Result<BuildSystemId, String> {
    s.parse::<BuildSystemId>().map_err(|e| e.to_string())
}
