use build_system_cnb::buildsystem::BuildSystem;
use build_system_cnb::cli::commands::{BuildArgs, CliArgs, Commands, LocateArgs};
use build_system_cnb::cli::output::OutputFormatter;
use build_system_cnb::config::{self, BuildConfig};
use build_system_cnb::error::BuildError;
use build_system_cnb::layers::Layers;
use build_system_cnb::runner::Runner;
use build_system_cnb::util::logging::{self, LoggingConfig};
use build_system_cnb::{NAME, VERSION};

use anyhow::{Context, Result};
use clap::Parser;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::process;
use tracing::{debug, error, Level};

fn main() {
    let args = CliArgs::parse();
    init_logging_from_args(&args);

    debug!("{} v{} starting", NAME, VERSION);
    debug!("Arguments: {:?}", args);

    let exit_code = match &args.command {
        Commands::Build(build_args) => handle_build(build_args),
        Commands::Locate(locate_args) => handle_locate(locate_args),
    };

    process::exit(exit_code);
}

fn init_logging_from_args(args: &CliArgs) {
    let mut config = LoggingConfig::from_env();
    if let Some(level_str) = &args.log_level {
        config.level = logging::parse_level(level_str);
    } else if args.verbose {
        config.level = Level::DEBUG;
    } else if args.quiet {
        config.level = Level::ERROR;
    }
    logging::init_logging(config);
}

fn handle_build(args: &BuildArgs) -> i32 {
    match run_build(args) {
        Ok(output) => {
            println!("{}", output);
            0
        }
        Err(e) => {
            error!("{:#}", e);
            exit_code_for(&e)
        }
    }
}

fn run_build(args: &BuildArgs) -> Result<String> {
    let root = application_root(args.application_path.as_deref())?;
    let mut config = BuildConfig::from_env().context("Invalid build environment")?;

    if let Some(arguments) = &args.build_arguments {
        let tokens = config::tokenize(arguments);
        if !tokens.is_empty() {
            config.build_arguments = Some(tokens);
        }
    }
    if let Some(module) = &args.module {
        config.built_module = Some(module.clone());
    }

    let layers = layers_dir(&args.layers)?;
    let build_system = BuildSystem::new(args.build_system, root);
    let mut runner = Runner::new(build_system, Layers::new(layers), config);
    let report = runner.contribute()?;

    OutputFormatter::new(args.format.into()).format_report(&report)
}

fn handle_locate(args: &LocateArgs) -> i32 {
    match run_locate(args) {
        Ok(output) => {
            println!("{}", output);
            0
        }
        Err(e) => {
            error!("{:#}", e);
            1
        }
    }
}

fn run_locate(args: &LocateArgs) -> Result<String> {
    let root = application_root(args.application_path.as_deref())?;
    let mut config = BuildConfig::from_env().context("Invalid build environment")?;
    if let Some(module) = &args.module {
        config.built_module = Some(module.clone());
    }
    config.validate()?;

    let build_system = BuildSystem::new(args.build_system, root);
    let artifact = build_system.locate_artifact(config.built_module.as_deref())?;

    OutputFormatter::new(args.format.into()).format_artifact(&artifact)
}

/// Absolute application root; the source swap needs a parent directory
fn application_root(path: Option<&Path>) -> Result<PathBuf> {
    let path = match path {
        Some(path) => path.to_path_buf(),
        None => env::current_dir().context("Failed to resolve current directory")?,
    };
    fs::canonicalize(&path)
        .with_context(|| format!("Application root {} is not accessible", path.display()))
}

/// Absolute layers directory, created if missing; layer links point into it
fn layers_dir(path: &Path) -> Result<PathBuf> {
    fs::create_dir_all(path)
        .with_context(|| format!("Failed to create layers directory {}", path.display()))?;
    fs::canonicalize(path)
        .with_context(|| format!("Layers directory {} is not accessible", path.display()))
}

/// 2 when replacement failed after the layer was written, 1 otherwise
fn exit_code_for(e: &anyhow::Error) -> i32 {
    match e.downcast_ref::<BuildError>() {
        Some(build_error) if build_error.layer_may_be_usable() => 2,
        _ => 1,
    }
}
