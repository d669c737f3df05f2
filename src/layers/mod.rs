//! On-disk layers
//!
//! A layer is a directory under the layers root plus a `<name>.toml` file
//! next to it holding the cache-control flags and free-form metadata:
//!
//! ```toml
//! [types]
//! build = false
//! cache = true
//! launch = true
//!
//! [metadata]
//! artifact = "app.jar"
//! sha256 = "..."
//! ```

pub mod application;
pub mod cache;

pub use application::{ApplicationContributor, Contribution, APPLICATION_LAYER};
pub use cache::{BuildCacheContributor, CACHE_LAYER};

use crate::error::ContributionError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Cache-control flags consumed by the host pipeline
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayerFlags {
    /// Available to subsequent build steps
    #[serde(default)]
    pub build: bool,
    /// Persisted across builds
    #[serde(default)]
    pub cache: bool,
    /// Included in the runtime image
    #[serde(default)]
    pub launch: bool,
}

impl LayerFlags {
    pub const NONE: LayerFlags = LayerFlags {
        build: false,
        cache: false,
        launch: false,
    };

    pub const fn new(build: bool, cache: bool, launch: bool) -> Self {
        Self {
            build,
            cache,
            launch,
        }
    }
}

/// Flags a build system applies to its application layer, per artifact shape
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayerPolicy {
    /// Flags when the artifact is exploded (executable jar, war)
    pub exploded: LayerFlags,
    /// Flags when the artifact is copied verbatim (plain jar)
    pub copied: LayerFlags,
}

impl LayerPolicy {
    pub const fn uniform(flags: LayerFlags) -> Self {
        Self {
            exploded: flags,
            copied: flags,
        }
    }

    pub fn flags_for(&self, exploded: bool) -> LayerFlags {
        if exploded {
            self.exploded
        } else {
            self.copied
        }
    }
}

/// Contents of a `<name>.toml` layer metadata file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayerMetadata {
    #[serde(default)]
    pub types: LayerFlags,
    #[serde(default)]
    pub metadata: BTreeMap<String, String>,
}

/// The layers root directory handed over by the pipeline
#[derive(Debug, Clone)]
pub struct Layers {
    root: PathBuf,
}

impl Layers {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn layer(&self, name: &str) -> Layer {
        Layer {
            name: name.to_string(),
            root: self.root.join(name),
            metadata_path: self.root.join(format!("{}.toml", name)),
        }
    }
}

/// A single named layer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layer {
    pub name: String,
    pub root: PathBuf,
    pub metadata_path: PathBuf,
}

impl Layer {
    /// Reads the layer metadata, `None` when the layer has never been written
    pub fn read_metadata(&self) -> Result<Option<LayerMetadata>, ContributionError> {
        let content = match fs::read_to_string(&self.metadata_path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(ContributionError::io("read", &self.metadata_path, e)),
        };

        toml::from_str(&content)
            .map(Some)
            .map_err(|source| ContributionError::MetadataRead {
                path: self.metadata_path.clone(),
                source,
            })
    }

    pub fn write_metadata(&self, metadata: &LayerMetadata) -> Result<(), ContributionError> {
        let content =
            toml::to_string(metadata).map_err(|source| ContributionError::MetadataWrite {
                path: self.metadata_path.clone(),
                source,
            })?;

        if let Some(parent) = self.metadata_path.parent() {
            fs::create_dir_all(parent).map_err(|e| ContributionError::io("create", parent, e))?;
        }
        fs::write(&self.metadata_path, content)
            .map_err(|e| ContributionError::io("write", &self.metadata_path, e))
    }

    /// Flags recorded on disk, all false when no metadata exists
    pub fn flags(&self) -> Result<LayerFlags, ContributionError> {
        Ok(self.read_metadata()?.map(|m| m.types).unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_layer_paths() {
        let layers = Layers::new("/layers");
        let layer = layers.layer("build-system-application");
        assert_eq!(layer.root, PathBuf::from("/layers/build-system-application"));
        assert_eq!(
            layer.metadata_path,
            PathBuf::from("/layers/build-system-application.toml")
        );
    }

    #[test]
    fn test_missing_metadata_reads_as_none() {
        let dir = TempDir::new().unwrap();
        let layer = Layers::new(dir.path()).layer("empty");
        assert_eq!(layer.read_metadata().unwrap(), None);
        assert_eq!(layer.flags().unwrap(), LayerFlags::NONE);
    }

    #[test]
    fn test_metadata_file_format() {
        let dir = TempDir::new().unwrap();
        let layer = Layers::new(dir.path()).layer("app");
        let mut metadata = LayerMetadata {
            types: LayerFlags::new(false, true, true),
            ..Default::default()
        };
        metadata
            .metadata
            .insert("artifact".to_string(), "app.jar".to_string());

        layer.write_metadata(&metadata).unwrap();

        let content = fs::read_to_string(&layer.metadata_path).unwrap();
        assert!(content.contains("[types]"));
        assert!(content.contains("cache = true"));
        assert!(content.contains("artifact = \"app.jar\""));
        assert_eq!(layer.read_metadata().unwrap(), Some(metadata));
    }

    #[test]
    fn test_corrupt_metadata_is_an_error() {
        let dir = TempDir::new().unwrap();
        let layer = Layers::new(dir.path()).layer("app");
        fs::write(&layer.metadata_path, "[types\nbroken").unwrap();

        assert!(matches!(
            layer.read_metadata(),
            Err(ContributionError::MetadataRead { .. })
        ));
    }

    #[test]
    fn test_policy_selects_flags_by_shape() {
        let policy = LayerPolicy {
            exploded: LayerFlags::new(false, true, true),
            copied: LayerFlags::NONE,
        };
        assert_eq!(policy.flags_for(true), LayerFlags::new(false, true, true));
        assert_eq!(policy.flags_for(false), LayerFlags::NONE);
    }
}
