//! Application layer contribution
//!
//! Turns the located artifact into the `build-system-application` layer:
//! executable jars and wars are exploded, plain jars are copied verbatim.
//! Content is staged in a temporary directory inside the layers root and
//! renamed into place once complete, so a failed contribution never leaves
//! a half-written layer behind.

use super::{Layer, LayerFlags, LayerMetadata, Layers};
use crate::artifact::Artifact;
use crate::error::ContributionError;
use sha2::{Digest, Sha256};
use std::fs::{self, File};
use std::io::{self, BufReader};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

pub const APPLICATION_LAYER: &str = "build-system-application";

const ARTIFACT_KEY: &str = "artifact";
const KIND_KEY: &str = "kind";
const DIGEST_KEY: &str = "sha256";

/// Result of a contribution
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Contribution {
    pub layer: Layer,
    pub flags: LayerFlags,
    /// The cached layer already matched the artifact and was kept as is
    pub reused: bool,
}

impl Contribution {
    pub fn root(&self) -> &Path {
        &self.layer.root
    }
}

/// Writes the application layer for one artifact
pub struct ApplicationContributor<'a> {
    layers: &'a Layers,
}

impl<'a> ApplicationContributor<'a> {
    pub fn new(layers: &'a Layers) -> Self {
        Self { layers }
    }

    pub fn contribute(
        &self,
        artifact: &Artifact,
        flags: LayerFlags,
    ) -> Result<Contribution, ContributionError> {
        let layer = self.layers.layer(APPLICATION_LAYER);
        let digest = sha256(&artifact.path)?;

        let metadata = LayerMetadata {
            types: flags,
            metadata: [
                (ARTIFACT_KEY.to_string(), artifact.file_name()),
                (KIND_KEY.to_string(), artifact.kind.to_string()),
                (DIGEST_KEY.to_string(), digest),
            ]
            .into_iter()
            .collect(),
        };

        if flags.cache && layer.root.is_dir() && layer.read_metadata()?.as_ref() == Some(&metadata) {
            info!(layer = %layer.name, "Reusing cached layer, artifact unchanged");
            return Ok(Contribution {
                layer,
                flags,
                reused: true,
            });
        }

        fs::create_dir_all(self.layers.root())
            .map_err(|e| ContributionError::io("create", self.layers.root(), e))?;
        let staging = tempfile::Builder::new()
            .prefix(&format!(".{}-", APPLICATION_LAYER))
            .tempdir_in(self.layers.root())
            .map_err(|e| ContributionError::io("create staging directory in", self.layers.root(), e))?;

        if artifact.kind.is_exploded() {
            info!(artifact = %artifact.path.display(), kind = %artifact.kind, "Exploding artifact");
            explode(&artifact.path, staging.path())?;
        } else {
            info!(artifact = %artifact.path.display(), "Copying artifact");
            let destination = staging.path().join(artifact.file_name());
            fs::copy(&artifact.path, &destination)
                .map_err(|e| ContributionError::io("copy", &artifact.path, e))?;
        }

        if fs::symlink_metadata(&layer.root).is_ok() {
            debug!(layer = %layer.root.display(), "Removing previous layer contents");
            fs::remove_dir_all(&layer.root)
                .map_err(|e| ContributionError::io("remove", &layer.root, e))?;
        }
        // after the rename the staging path is gone and dropping it is a no-op
        fs::rename(staging.path(), &layer.root)
            .map_err(|e| ContributionError::io("move staging directory to", &layer.root, e))?;
        drop(staging);

        layer.write_metadata(&metadata)?;
        info!(layer = %layer.name, build = flags.build, cache = flags.cache, launch = flags.launch, "Contributed layer");

        Ok(Contribution {
            layer,
            flags,
            reused: false,
        })
    }
}

/// Unpacks every entry of `archive` below `destination`
pub fn explode(archive: &Path, destination: &Path) -> Result<(), ContributionError> {
    let file = File::open(archive).map_err(|e| ContributionError::io("open", archive, e))?;
    let mut zip = zip::ZipArchive::new(BufReader::new(file)).map_err(|e| {
        ContributionError::Archive {
            path: archive.to_path_buf(),
            source: e,
        }
    })?;

    for i in 0..zip.len() {
        let mut entry = zip.by_index(i).map_err(|e| ContributionError::Archive {
            path: archive.to_path_buf(),
            source: e,
        })?;

        let relative: PathBuf =
            entry
                .enclosed_name()
                .ok_or_else(|| ContributionError::UnsafeEntry {
                    path: archive.to_path_buf(),
                    entry: entry.name().to_string(),
                })?;
        let target = destination.join(&relative);

        if entry.is_dir() {
            fs::create_dir_all(&target).map_err(|e| ContributionError::io("create", &target, e))?;
            continue;
        }

        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).map_err(|e| ContributionError::io("create", parent, e))?;
        }
        let mut out =
            File::create(&target).map_err(|e| ContributionError::io("create", &target, e))?;
        io::copy(&mut entry, &mut out).map_err(|e| ContributionError::io("write", &target, e))?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            if let Some(mode) = entry.unix_mode() {
                fs::set_permissions(&target, fs::Permissions::from_mode(mode & 0o7777))
                    .map_err(|e| ContributionError::io("set permissions on", &target, e))?;
            }
        }
    }

    Ok(())
}

fn sha256(path: &Path) -> Result<String, ContributionError> {
    let mut file = File::open(path).map_err(|e| ContributionError::io("open", path, e))?;
    let mut hasher = Sha256::new();
    io::copy(&mut file, &mut hasher).map_err(|e| ContributionError::io("read", path, e))?;
    Ok(hex::encode(hasher.finalize()))
}
