//! Gradle build system (Java/Kotlin)

use super::{BuildSystemId, BuildSystemStrategy};
use crate::layers::{LayerFlags, LayerPolicy};
use crate::replace::ReplacementPolicy;
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GradleBuildSystem {
    root: PathBuf,
}

impl GradleBuildSystem {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl BuildSystemStrategy for GradleBuildSystem {
    fn id(&self) -> BuildSystemId {
        BuildSystemId::Gradle
    }

    fn root(&self) -> &Path {
        &self.root
    }

    fn wrapper_name(&self) -> &'static str {
        "gradlew"
    }

    fn default_arguments(&self) -> &'static [&'static str] {
        &["-x", "test", "build"]
    }

    fn artifact_dirs(&self, module: Option<&str>) -> Vec<PathBuf> {
        if let Some(module) = module {
            debug!(module, "Module override does not apply to Gradle, using project root");
        }
        vec![self.root.join("build").join("libs")]
    }

    fn artifact_extensions(&self) -> &'static [&'static str] {
        &["jar"]
    }

    // Launched from the layer and reused while the artifact is unchanged
    fn layer_policy(&self) -> LayerPolicy {
        LayerPolicy::uniform(LayerFlags::new(false, true, true))
    }

    fn replacement_policy(&self, _module: Option<&str>) -> ReplacementPolicy {
        ReplacementPolicy::Symlink
    }

    fn cache_dir(&self) -> &'static str {
        ".gradle"
    }
}
