//! Dependency cache layer
//!
//! Build tools download dependencies into the home directory (`~/.m2`,
//! `~/.gradle`). Linking that directory into a cached layer keeps the
//! downloads between pipeline invocations.

use super::{Layer, LayerFlags, LayerMetadata, Layers};
use crate::error::ContributionError;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

pub const CACHE_LAYER: &str = "build-system-cache";

const CACHE_FLAGS: LayerFlags = LayerFlags::new(false, true, false);

pub struct BuildCacheContributor<'a> {
    layers: &'a Layers,
}

impl<'a> BuildCacheContributor<'a> {
    pub fn new(layers: &'a Layers) -> Self {
        Self { layers }
    }

    /// Links `<home>/<cache_dir>` to the cache layer
    ///
    /// An existing real directory at the link location is left alone; the
    /// build then simply runs without the persistent cache.
    pub fn contribute(&self, home: &Path, cache_dir: &str) -> Result<Layer, ContributionError> {
        let layer = self.layers.layer(CACHE_LAYER);
        fs::create_dir_all(&layer.root).map_err(|e| ContributionError::io("create", &layer.root, e))?;
        layer.write_metadata(&LayerMetadata {
            types: CACHE_FLAGS,
            ..Default::default()
        })?;

        let target =
            absolute(&layer.root).map_err(|e| ContributionError::io("resolve", &layer.root, e))?;
        let link = home.join(cache_dir);
        match fs::symlink_metadata(&link) {
            Ok(meta) if meta.file_type().is_symlink() => {
                if fs::read_link(&link).ok().as_deref() == Some(target.as_path()) {
                    debug!(link = %link.display(), "Cache link already in place");
                    return Ok(layer);
                }
                fs::remove_file(&link).map_err(|e| ContributionError::io("remove", &link, e))?;
            }
            Ok(_) => {
                warn!(path = %link.display(), "Cache directory already exists, not linking it to the cache layer");
                return Ok(layer);
            }
            Err(_) => {}
        }

        fs::create_dir_all(home).map_err(|e| ContributionError::io("create", home, e))?;
        symlink_dir(&target, &link).map_err(|e| ContributionError::io("link", &link, e))?;
        info!(link = %link.display(), layer = %target.display(), "Linked build cache");

        Ok(layer)
    }
}

/// Link targets are resolved against the link's directory, so they are
/// always written absolute
pub(crate) fn absolute(path: &Path) -> std::io::Result<PathBuf> {
    if path.is_absolute() {
        Ok(path.to_path_buf())
    } else {
        Ok(std::env::current_dir()?.join(path))
    }
}

#[cfg(unix)]
pub(crate) fn symlink_dir(target: &Path, link: &Path) -> std::io::Result<()> {
    std::os::unix::fs::symlink(target, link)
}

#[cfg(windows)]
pub(crate) fn symlink_dir(target: &Path, link: &Path) -> std::io::Result<()> {
    std::os::windows::fs::symlink_dir(target, link)
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_links_cache_directory() {
        let dir = TempDir::new().unwrap();
        let home = dir.path().join("home");
        let layers = Layers::new(dir.path().join("layers"));

        let layer = BuildCacheContributor::new(&layers)
            .contribute(&home, ".m2")
            .unwrap();

        let link = home.join(".m2");
        assert!(fs::symlink_metadata(&link).unwrap().file_type().is_symlink());
        assert_eq!(fs::read_link(&link).unwrap(), layer.root);
        assert_eq!(layer.flags().unwrap(), LayerFlags::new(false, true, false));
    }

    #[test]
    fn test_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let home = dir.path().join("home");
        let layers = Layers::new(dir.path().join("layers"));
        let contributor = BuildCacheContributor::new(&layers);

        contributor.contribute(&home, ".gradle").unwrap();
        fs::write(home.join(".gradle").join("cached.bin"), "data").unwrap();
        contributor.contribute(&home, ".gradle").unwrap();

        assert!(home.join(".gradle").join("cached.bin").is_file());
    }

    #[test]
    fn test_existing_directory_is_not_replaced() {
        let dir = TempDir::new().unwrap();
        let home = dir.path().join("home");
        fs::create_dir_all(home.join(".m2")).unwrap();
        fs::write(home.join(".m2").join("settings.xml"), "<settings/>").unwrap();
        let layers = Layers::new(dir.path().join("layers"));

        BuildCacheContributor::new(&layers)
            .contribute(&home, ".m2")
            .unwrap();

        assert!(home.join(".m2").join("settings.xml").is_file());
        assert!(!fs::symlink_metadata(home.join(".m2"))
            .unwrap()
            .file_type()
            .is_symlink());
    }

    #[test]
    fn test_absolute_resolves_against_working_directory() {
        let resolved = absolute(Path::new("layers/build-system-cache")).unwrap();
        assert!(resolved.is_absolute());
        assert_eq!(
            resolved,
            std::env::current_dir().unwrap().join("layers/build-system-cache")
        );

        let already = absolute(Path::new("/layers")).unwrap();
        assert_eq!(already, PathBuf::from("/layers"));
    }
}
