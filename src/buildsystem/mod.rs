//! Build system definitions
//!
//! Maven and Gradle differ in wrapper script, default arguments, where the
//! artifact lands, how the application layer is flagged and how the source
//! tree is replaced. Each system implements [`BuildSystemStrategy`]; the
//! closed [`BuildSystem`] enum is what the rest of the crate passes around.

pub mod gradle;
pub mod maven;

pub use gradle::GradleBuildSystem;
pub use maven::MavenBuildSystem;

use crate::artifact::{self, Artifact};
use crate::error::{ConfigError, DiscoveryError};
use crate::exec::Command;
use crate::layers::LayerPolicy;
use crate::replace::ReplacementPolicy;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Build system identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BuildSystemId {
    Maven,
    Gradle,
}

impl BuildSystemId {
    pub fn name(&self) -> &'static str {
        match self {
            BuildSystemId::Maven => "Maven",
            BuildSystemId::Gradle => "Gradle",
        }
    }
}

impl fmt::Display for BuildSystemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for BuildSystemId {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "maven" => Ok(BuildSystemId::Maven),
            "gradle" => Ok(BuildSystemId::Gradle),
            _ => Err(ConfigError::UnknownBuildSystem(s.to_string())),
        }
    }
}

/// Per-tool knowledge behind one contract
pub trait BuildSystemStrategy: Send + Sync {
    fn id(&self) -> BuildSystemId;

    /// Project root the build runs in
    fn root(&self) -> &Path;

    /// Wrapper script file name at the project root (e.g. "mvnw")
    fn wrapper_name(&self) -> &'static str;

    fn default_arguments(&self) -> &'static [&'static str];

    /// Directories searched for the built artifact
    fn artifact_dirs(&self, module: Option<&str>) -> Vec<PathBuf>;

    /// Accepted artifact file extensions
    fn artifact_extensions(&self) -> &'static [&'static str];

    /// Flags for the application layer
    fn layer_policy(&self) -> LayerPolicy;

    /// How the application root is replaced after contribution
    fn replacement_policy(&self, module: Option<&str>) -> ReplacementPolicy;

    /// Dependency cache directory relative to the home directory
    fn cache_dir(&self) -> &'static str;
}

/// The closed set of supported build systems
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildSystem {
    Maven(MavenBuildSystem),
    Gradle(GradleBuildSystem),
}

impl BuildSystem {
    pub fn new(id: BuildSystemId, root: impl Into<PathBuf>) -> Self {
        match id {
            BuildSystemId::Maven => BuildSystem::Maven(MavenBuildSystem::new(root)),
            BuildSystemId::Gradle => BuildSystem::Gradle(GradleBuildSystem::new(root)),
        }
    }

    pub fn strategy(&self) -> &dyn BuildSystemStrategy {
        match self {
            BuildSystem::Maven(maven) => maven,
            BuildSystem::Gradle(gradle) => gradle,
        }
    }

    pub fn id(&self) -> BuildSystemId {
        self.strategy().id()
    }

    pub fn root(&self) -> &Path {
        self.strategy().root()
    }

    /// Absolute path of the project-local wrapper script
    pub fn wrapper(&self) -> PathBuf {
        self.root().join(self.strategy().wrapper_name())
    }

    pub fn default_arguments(&self) -> Vec<String> {
        self.strategy()
            .default_arguments()
            .iter()
            .map(|a| a.to_string())
            .collect()
    }

    /// Override arguments win over the defaults, verbatim
    pub fn arguments(&self, overrides: Option<&[String]>) -> Vec<String> {
        match overrides {
            Some(args) => args.to_vec(),
            None => self.default_arguments(),
        }
    }

    /// `<root>/<wrapper> <args...>` run from the project root
    pub fn build_command(&self, args: Vec<String>) -> Command {
        Command::new(self.wrapper(), self.root()).args(args)
    }

    /// `java -version`, from `java_home` when given
    pub fn runtime_probe(&self, java_home: Option<&Path>) -> Command {
        let java = match java_home {
            Some(home) => home.join("bin").join("java"),
            None => PathBuf::from("java"),
        };
        Command::new(java, self.root()).args(["-version"])
    }

    pub fn locate_artifact(&self, module: Option<&str>) -> Result<Artifact, DiscoveryError> {
        let strategy = self.strategy();
        artifact::locate(
            &strategy.artifact_dirs(module),
            strategy.artifact_extensions(),
            module,
        )
    }

    pub fn layer_policy(&self) -> LayerPolicy {
        self.strategy().layer_policy()
    }

    pub fn replacement_policy(&self, module: Option<&str>) -> ReplacementPolicy {
        self.strategy().replacement_policy(module)
    }

    pub fn cache_dir(&self) -> &'static str {
        self.strategy().cache_dir()
    }
}
