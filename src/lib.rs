//! build-system-cnb - build step of a Cloud Native Buildpack for JVM applications
//!
//! Runs a project's Maven or Gradle wrapper, locates the artifact the build
//! produced, contributes it to the `build-system-application` layer and
//! replaces the application source with the result.
//!
//! # Core Concepts
//!
//! - **Build system**: Maven or Gradle, each with its own wrapper, default
//!   arguments, artifact location and replacement shape
//! - **Executor**: runs commands and keeps an ordered history of what ran
//! - **Layer**: a directory under the layers root plus a `<name>.toml`
//!   metadata file carrying its build/cache/launch flags
//!
//! # Example Usage
//!
//! ```no_run
//! use build_system_cnb::{BuildConfig, BuildSystem, BuildSystemId, Layers, Runner};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = BuildConfig::from_env()?;
//! let build_system = BuildSystem::new(BuildSystemId::Maven, "/workspace");
//! let mut runner = Runner::new(build_system, Layers::new("/layers/build-system"), config);
//!
//! let report = runner.contribute()?;
//! println!("Contributed {}", report.layer.display());
//! # Ok(())
//! # }
//! ```
//!
//! # Project Structure
//!
//! - [`buildsystem`]: Maven and Gradle definitions
//! - [`exec`]: command execution and recording
//! - [`artifact`]: artifact discovery and classification
//! - [`layers`]: layer contribution and metadata
//! - [`replace`]: source tree replacement
//! - [`runner`]: the build state machine

pub mod artifact;
pub mod buildsystem;
pub mod cli;
pub mod config;
pub mod error;
pub mod exec;
pub mod layers;
pub mod replace;
pub mod runner;
pub mod util;

#[cfg(test)]
mod testutil;

pub use artifact::{Artifact, ArtifactKind};
pub use buildsystem::{BuildSystem, BuildSystemId, BuildSystemStrategy};
pub use config::BuildConfig;
pub use error::{
    BuildError, ConfigError, ContributionError, DiscoveryError, ExecutionError, ReplacementError,
};
pub use exec::{Command, Execution, Executor, ProcessExecutor, RecordingExecutor};
pub use layers::{LayerFlags, LayerMetadata, Layers};
pub use replace::ReplacementPolicy;
pub use runner::{BuildReport, Runner, Stage};
pub use util::{init_logging, LoggingConfig};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
