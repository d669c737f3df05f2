//! Source tree replacement
//!
//! Once the application layer exists the original source tree is reshaped
//! for launch. Gradle swaps the whole root for a symlink into the layer;
//! Maven strips the build-only files and copies the layer contents back into
//! the root, which stays an ordinary directory. Downstream launch tooling
//! relies on these two shapes, so they are kept separate.

use crate::error::ReplacementError;
use crate::layers::cache::{absolute, symlink_dir};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplacementPolicy {
    /// Replace the application root with a symlink to the layer
    Symlink,
    /// Remove these root-relative paths, then copy the layer into the root
    RemoveBuildFiles { paths: Vec<PathBuf> },
}

pub struct SourceReplacer<'a> {
    root: &'a Path,
}

impl<'a> SourceReplacer<'a> {
    pub fn new(root: &'a Path) -> Self {
        Self { root }
    }

    pub fn replace(
        &self,
        layer_root: &Path,
        policy: &ReplacementPolicy,
    ) -> Result<(), ReplacementError> {
        match policy {
            ReplacementPolicy::Symlink => self.link_to(layer_root),
            ReplacementPolicy::RemoveBuildFiles { paths } => {
                self.remove_build_files(paths)?;
                self.copy_from(layer_root)
            }
        }
    }

    /// Swaps the root for a symlink to `target`.
    ///
    /// The link is created beside the root and renamed into place, so the
    /// root is either the old tree or the finished link. The old tree is
    /// deleted only after the link is in place.
    fn link_to(&self, target: &Path) -> Result<(), ReplacementError> {
        let root = self.root;
        let (parent, name) = match (root.parent(), root.file_name()) {
            (Some(parent), Some(name)) => (parent, name.to_string_lossy()),
            _ => return Err(ReplacementError::NoParent(root.to_path_buf())),
        };
        let target = absolute(target).map_err(|e| ReplacementError::io("resolve", target, e))?;
        let staged_link = parent.join(format!(".{}.link", name));
        let aside = parent.join(format!(".{}.replaced", name));

        remove_path(&staged_link)?;
        remove_path(&aside)?;

        symlink_dir(&target, &staged_link)
            .map_err(|e| ReplacementError::io("create link", &staged_link, e))?;
        self.swap_in(&staged_link, &aside, &target, |from, to| fs::rename(from, to))
    }

    /// Moves the root aside and places `staged_link` with `place`, restoring
    /// the root if placing fails
    fn swap_in<F>(
        &self,
        staged_link: &Path,
        aside: &Path,
        target: &Path,
        place: F,
    ) -> Result<(), ReplacementError>
    where
        F: FnOnce(&Path, &Path) -> std::io::Result<()>,
    {
        let root = self.root;
        if let Err(e) = fs::rename(root, aside) {
            let _ = fs::remove_file(staged_link);
            return Err(ReplacementError::io("move aside", root, e));
        }

        if let Err(source) = place(staged_link, root) {
            let restored = fs::rename(aside, root);
            let _ = fs::remove_file(staged_link);
            return match restored {
                Ok(()) => Err(ReplacementError::Relink {
                    root: root.to_path_buf(),
                    target: target.to_path_buf(),
                    source,
                }),
                Err(e) => Err(ReplacementError::io("restore", root, e)),
            };
        }
        info!(root = %root.display(), target = %target.display(), "Replaced application root with layer link");

        if let Err(e) = fs::remove_dir_all(aside) {
            warn!(path = %aside.display(), error = %e, "Failed to delete replaced source tree");
        }
        Ok(())
    }

    fn remove_build_files(&self, paths: &[PathBuf]) -> Result<(), ReplacementError> {
        for relative in paths {
            let path = self.root.join(relative);
            if fs::symlink_metadata(&path).is_ok() {
                debug!(path = %path.display(), "Removing build file");
                remove_path(&path)?;
            }
        }
        Ok(())
    }

    /// Copies every entry below `source` into the root, overwriting files
    fn copy_from(&self, source: &Path) -> Result<(), ReplacementError> {
        for entry in WalkDir::new(source).min_depth(1) {
            let entry = entry.map_err(|e| {
                let path = e.path().unwrap_or(source).to_path_buf();
                ReplacementError::io("walk", &path, e.into())
            })?;
            let Ok(relative) = entry.path().strip_prefix(source) else {
                continue;
            };
            let destination = self.root.join(relative);
            let file_type = entry.file_type();

            if file_type.is_dir() {
                fs::create_dir_all(&destination)
                    .map_err(|e| ReplacementError::io("create", &destination, e))?;
            } else if file_type.is_symlink() {
                let target = fs::read_link(entry.path())
                    .map_err(|e| ReplacementError::io("read link", entry.path(), e))?;
                remove_path(&destination)?;
                symlink_dir(&target, &destination)
                    .map_err(|e| ReplacementError::io("create link", &destination, e))?;
            } else {
                fs::copy(entry.path(), &destination)
                    .map_err(|e| ReplacementError::io("copy", entry.path(), e))?;
            }
        }
        info!(root = %self.root.display(), layer = %source.display(), "Copied layer into application root");
        Ok(())
    }
}

fn remove_path(path: &Path) -> Result<(), ReplacementError> {
    let meta = match fs::symlink_metadata(path) {
        Ok(meta) => meta,
        Err(_) => return Ok(()),
    };
    let result = if meta.is_dir() {
        fs::remove_dir_all(path)
    } else {
        fs::remove_file(path)
    };
    result.map_err(|e| ReplacementError::io("remove", path, e))
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::testutil::touch;
    use tempfile::TempDir;

    fn layer_with_marker(dir: &Path) -> PathBuf {
        let layer = dir.join("layers/app");
        touch(&layer.join("fixture-marker"));
        touch(&layer.join("BOOT-INF/classes/app.class"));
        layer
    }

    #[test]
    fn test_symlink_replaces_root() {
        let dir = TempDir::new().unwrap();
        let root = dir.path().join("workspace");
        touch(&root.join("gradlew"));
        touch(&root.join("src/main/java/App.java"));
        let layer = layer_with_marker(dir.path());

        SourceReplacer::new(&root)
            .replace(&layer, &ReplacementPolicy::Symlink)
            .unwrap();

        let meta = fs::symlink_metadata(&root).unwrap();
        assert!(meta.file_type().is_symlink());
        assert_eq!(fs::read_link(&root).unwrap(), layer);
        assert!(root.join("fixture-marker").is_file());
        assert!(!dir.path().join(".workspace.replaced").exists());
        assert!(!dir.path().join(".workspace.link").exists());
    }

    #[test]
    fn test_symlink_cleans_leftovers_from_interrupted_run() {
        let dir = TempDir::new().unwrap();
        let root = dir.path().join("workspace");
        touch(&root.join("gradlew"));
        touch(&dir.path().join(".workspace.replaced/old"));
        let layer = layer_with_marker(dir.path());

        SourceReplacer::new(&root)
            .replace(&layer, &ReplacementPolicy::Symlink)
            .unwrap();

        assert!(root.join("fixture-marker").is_file());
        assert!(!dir.path().join(".workspace.replaced").exists());
    }

    #[test]
    fn test_remove_build_files_keeps_other_sources() {
        let dir = TempDir::new().unwrap();
        let root = dir.path().join("workspace");
        touch(&root.join("mvnw"));
        touch(&root.join(".mvn/wrapper/maven-wrapper.properties"));
        touch(&root.join("target/app.jar"));
        touch(&root.join("pom.xml"));
        touch(&root.join("README.md"));
        let layer = layer_with_marker(dir.path());

        let policy = ReplacementPolicy::RemoveBuildFiles {
            paths: vec!["mvnw".into(), ".mvn".into(), "target".into()],
        };
        SourceReplacer::new(&root).replace(&layer, &policy).unwrap();

        assert!(root.is_dir());
        assert!(!fs::symlink_metadata(&root).unwrap().file_type().is_symlink());
        assert!(!root.join("mvnw").exists());
        assert!(!root.join(".mvn").exists());
        assert!(!root.join("target").exists());
        assert!(root.join("pom.xml").is_file());
        assert!(root.join("README.md").is_file());
        assert!(root.join("fixture-marker").is_file());
        assert!(root.join("BOOT-INF/classes/app.class").is_file());
    }

    #[test]
    fn test_missing_build_files_are_ignored() {
        let dir = TempDir::new().unwrap();
        let root = dir.path().join("workspace");
        touch(&root.join("pom.xml"));
        let layer = layer_with_marker(dir.path());

        let policy = ReplacementPolicy::RemoveBuildFiles {
            paths: vec!["mvnw".into(), ".mvn".into()],
        };
        SourceReplacer::new(&root).replace(&layer, &policy).unwrap();

        assert!(root.join("pom.xml").is_file());
    }

    #[test]
    fn test_root_without_parent_is_rejected() {
        let result = SourceReplacer::new(Path::new("/"))
            .replace(Path::new("/tmp"), &ReplacementPolicy::Symlink);
        assert!(matches!(result, Err(ReplacementError::NoParent(_))));
    }

    #[test]
    fn test_failed_relink_restores_root() {
        let dir = TempDir::new().unwrap();
        let root = dir.path().join("workspace");
        touch(&root.join("gradlew"));
        touch(&root.join("src/main/java/App.java"));
        let layer = layer_with_marker(dir.path());
        let staged_link = dir.path().join(".workspace.link");
        let aside = dir.path().join(".workspace.replaced");
        symlink_dir(&layer, &staged_link).unwrap();

        let err = SourceReplacer::new(&root)
            .swap_in(&staged_link, &aside, &layer, |_, _| {
                Err(std::io::Error::new(std::io::ErrorKind::Other, "rename refused"))
            })
            .unwrap_err();

        assert!(matches!(err, ReplacementError::Relink { .. }));
        assert!(err.to_string().contains("original source tree restored"));
        assert!(!fs::symlink_metadata(&root).unwrap().file_type().is_symlink());
        assert!(root.join("gradlew").is_file());
        assert!(root.join("src/main/java/App.java").is_file());
        assert!(fs::symlink_metadata(&staged_link).is_err());
        assert!(!aside.exists());
        assert!(layer.join("fixture-marker").is_file());
    }
}
