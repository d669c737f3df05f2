//! Maven build system (Java/Kotlin)

use super::{BuildSystemId, BuildSystemStrategy};
use crate::layers::{LayerFlags, LayerPolicy};
use crate::replace::ReplacementPolicy;
use std::path::{Path, PathBuf};

const WRAPPER: &str = "mvnw";
const WRAPPER_CONFIG: &str = ".mvn";
const OUTPUT_DIR: &str = "target";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MavenBuildSystem {
    root: PathBuf,
}

impl MavenBuildSystem {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl BuildSystemStrategy for MavenBuildSystem {
    fn id(&self) -> BuildSystemId {
        BuildSystemId::Maven
    }

    fn root(&self) -> &Path {
        &self.root
    }

    fn wrapper_name(&self) -> &'static str {
        WRAPPER
    }

    fn default_arguments(&self) -> &'static [&'static str] {
        &["-Dmaven.test.skip=true", "package"]
    }

    fn artifact_dirs(&self, module: Option<&str>) -> Vec<PathBuf> {
        match module {
            Some(module) => vec![self.root.join(module).join(OUTPUT_DIR)],
            None => vec![self.root.join(OUTPUT_DIR)],
        }
    }

    fn artifact_extensions(&self) -> &'static [&'static str] {
        &["jar", "war"]
    }

    // Exploded output is treated as disposable and rebuilt every run
    fn layer_policy(&self) -> LayerPolicy {
        LayerPolicy::uniform(LayerFlags::NONE)
    }

    fn replacement_policy(&self, module: Option<&str>) -> ReplacementPolicy {
        let mut paths = vec![
            PathBuf::from(WRAPPER),
            PathBuf::from(WRAPPER_CONFIG),
            PathBuf::from(OUTPUT_DIR),
        ];
        if let Some(module) = module {
            paths.push(Path::new(module).join(OUTPUT_DIR));
        }
        ReplacementPolicy::RemoveBuildFiles { paths }
    }

    fn cache_dir(&self) -> &'static str {
        ".m2"
    }
}
