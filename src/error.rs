//! Error taxonomy for a build run
//!
//! Every stage of the runner has its own error type so callers can tell a
//! failed subprocess from a missing artifact or a half-replaced source tree.
//! [`BuildError`] wraps them for the orchestrator.

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Failures while launching or running an external program
#[derive(Debug, Error)]
pub enum ExecutionError {
    /// The program could not be started at all (missing, not executable)
    #[error("Failed to launch {}: {source}", .bin.display())]
    Launch {
        bin: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The program ran and exited unsuccessfully
    #[error("{} exited with {}\n{output}", .bin.display(), describe_exit(.code))]
    Failed {
        bin: PathBuf,
        code: Option<i32>,
        output: String,
    },

    /// The project does not ship the wrapper script the build system needs
    #[error("Build wrapper {} does not exist", .0.display())]
    WrapperMissing(PathBuf),

    /// The runtime version probe failed, so the runtime is unusable
    #[error("Runtime probe failed: {0}")]
    Probe(#[source] Box<ExecutionError>),
}

impl ExecutionError {
    /// Captured output of the failed program, if any
    pub fn output(&self) -> Option<&str> {
        match self {
            ExecutionError::Failed { output, .. } => Some(output),
            ExecutionError::Probe(inner) => inner.output(),
            _ => None,
        }
    }
}

fn describe_exit(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("exit code {}", code),
        None => "no exit code (terminated by signal)".to_string(),
    }
}

/// Failures while looking for the artifact a build produced
#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error("No artifact found in {}", join_paths(.searched))]
    NoArtifact { searched: Vec<PathBuf> },

    #[error("Expected exactly one artifact, found {}: {}", .candidates.len(), join_paths(.candidates))]
    MultipleArtifacts { candidates: Vec<PathBuf> },

    #[error("Failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{} is not a readable archive: {source}", .path.display())]
    InvalidArchive {
        path: PathBuf,
        #[source]
        source: zip::result::ZipError,
    },
}

/// Failures while materializing a layer
#[derive(Debug, Error)]
pub enum ContributionError {
    #[error("Failed to {action} {}: {source}", .path.display())]
    Io {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to explode {}: {source}", .path.display())]
    Archive {
        path: PathBuf,
        #[source]
        source: zip::result::ZipError,
    },

    #[error("Archive {} contains an unsafe entry name: {entry}", .path.display())]
    UnsafeEntry { path: PathBuf, entry: String },

    #[error("Failed to write layer metadata {}: {source}", .path.display())]
    MetadataWrite {
        path: PathBuf,
        #[source]
        source: toml::ser::Error,
    },

    #[error("Failed to parse layer metadata {}: {source}", .path.display())]
    MetadataRead {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

impl ContributionError {
    pub(crate) fn io(action: &'static str, path: &Path, source: std::io::Error) -> Self {
        ContributionError::Io {
            action,
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Failures while replacing the application source tree
#[derive(Debug, Error)]
pub enum ReplacementError {
    #[error("Failed to {action} {}: {source}", .path.display())]
    Io {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Application root {} has no parent directory", .0.display())]
    NoParent(PathBuf),

    #[error("Failed to link {} to {}: {source}; original source tree restored", .root.display(), .target.display())]
    Relink {
        root: PathBuf,
        target: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ReplacementError {
    pub(crate) fn io(action: &'static str, path: &Path, source: std::io::Error) -> Self {
        ReplacementError::Io {
            action,
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Invalid operator supplied configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid module '{0}': must be a relative path inside the application root")]
    InvalidModule(String),

    #[error("Unknown build system: {0}. Valid options: maven, gradle")]
    UnknownBuildSystem(String),
}

/// Top-level error returned by [`crate::runner::Runner::contribute`]
#[derive(Debug, Error)]
pub enum BuildError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Build execution failed: {0}")]
    Execution(#[from] ExecutionError),

    #[error("Artifact discovery failed: {0}")]
    Discovery(#[from] DiscoveryError),

    #[error("Layer contribution failed: {0}")]
    Contribution(#[from] ContributionError),

    /// The layer was fully contributed but the source tree could not be
    /// replaced. The layer itself may already be usable.
    #[error(
        "Source replacement failed after layer {} was contributed (the layer may already be usable): {source}",
        .layer.display()
    )]
    Replacement {
        layer: PathBuf,
        #[source]
        source: ReplacementError,
    },
}

impl BuildError {
    /// Whether a complete layer exists despite the failure
    pub fn layer_may_be_usable(&self) -> bool {
        matches!(self, BuildError::Replacement { .. })
    }
}

fn join_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
