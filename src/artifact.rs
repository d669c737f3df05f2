//! Artifact discovery and classification
//!
//! After a build, exactly one deployable archive must sit in the build
//! output directory. Whether it is exploded or copied depends on its kind,
//! which is read from the packaged manifest rather than guessed from the
//! file extension.

use crate::error::DiscoveryError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs::{self, File};
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

const MANIFEST_PATH: &str = "META-INF/MANIFEST.MF";

/// Manifest attributes that declare a standalone entrypoint
const ENTRYPOINT_ATTRIBUTES: &[&str] = &["Main-Class", "Start-Class"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ArtifactKind {
    /// Library jar without a launcher
    PlainJar,
    /// Jar declaring a main class
    ExecutableJar,
    War,
}

impl ArtifactKind {
    /// Executable jars and wars are unpacked; plain jars are copied
    pub fn is_exploded(&self) -> bool {
        !matches!(self, ArtifactKind::PlainJar)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ArtifactKind::PlainJar => "plain-jar",
            ArtifactKind::ExecutableJar => "executable-jar",
            ArtifactKind::War => "war",
        }
    }
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The single deployable output of a build
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Artifact {
    pub path: PathBuf,
    pub kind: ArtifactKind,
    /// Module the artifact was found in, for multi-module builds
    pub module: Option<String>,
}

impl Artifact {
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

/// Finds the single file with one of `extensions` across `dirs` and classifies it
///
/// Missing directories count as empty. Zero or several candidates is an error.
pub fn locate(
    dirs: &[PathBuf],
    extensions: &[&str],
    module: Option<&str>,
) -> Result<Artifact, DiscoveryError> {
    let mut candidates = Vec::new();

    for dir in dirs {
        let entries = match fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(dir = %dir.display(), "Artifact directory does not exist");
                continue;
            }
            Err(e) => {
                return Err(DiscoveryError::Io {
                    path: dir.clone(),
                    source: e,
                })
            }
        };

        for entry in entries {
            let entry = entry.map_err(|e| DiscoveryError::Io {
                path: dir.clone(),
                source: e,
            })?;
            let path = entry.path();
            if path.is_file() && has_extension(&path, extensions) {
                candidates.push(path);
            }
        }
    }

    candidates.sort();

    match candidates.len() {
        0 => Err(DiscoveryError::NoArtifact {
            searched: dirs.to_vec(),
        }),
        1 => {
            let path = candidates.remove(0);
            let kind = classify(&path)?;
            info!(artifact = %path.display(), kind = %kind, "Located artifact");
            Ok(Artifact {
                path,
                kind,
                module: module.map(str::to_string),
            })
        }
        _ => Err(DiscoveryError::MultipleArtifacts { candidates }),
    }
}

/// Determines the artifact kind from its extension and packaged manifest
pub fn classify(path: &Path) -> Result<ArtifactKind, DiscoveryError> {
    let file = File::open(path).map_err(|e| DiscoveryError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    let mut archive =
        zip::ZipArchive::new(BufReader::new(file)).map_err(|e| DiscoveryError::InvalidArchive {
            path: path.to_path_buf(),
            source: e,
        })?;

    if has_extension(path, &["war"]) {
        return Ok(ArtifactKind::War);
    }

    let manifest = match archive.by_name(MANIFEST_PATH) {
        Ok(mut entry) => {
            let mut content = String::new();
            entry
                .read_to_string(&mut content)
                .map_err(|e| DiscoveryError::Io {
                    path: path.to_path_buf(),
                    source: e,
                })?;
            content
        }
        Err(zip::result::ZipError::FileNotFound) => String::new(),
        Err(e) => {
            return Err(DiscoveryError::InvalidArchive {
                path: path.to_path_buf(),
                source: e,
            })
        }
    };

    if declares_entrypoint(&manifest) {
        Ok(ArtifactKind::ExecutableJar)
    } else {
        Ok(ArtifactKind::PlainJar)
    }
}

/// Checks the main section of a jar manifest for a non-empty entrypoint attribute
fn declares_entrypoint(manifest: &str) -> bool {
    for line in manifest.lines() {
        let line = line.trim_end_matches('\r');
        // main section ends at the first blank line
        if line.is_empty() {
            break;
        }
        if let Some((name, value)) = line.split_once(':') {
            if ENTRYPOINT_ATTRIBUTES
                .iter()
                .any(|attr| name.trim().eq_ignore_ascii_case(attr))
                && !value.trim().is_empty()
            {
                return true;
            }
        }
    }
    false
}

fn has_extension(path: &Path, extensions: &[&str]) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| extensions.iter().any(|x| e.eq_ignore_ascii_case(x)))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{write_jar, write_plain_jar};
    use tempfile::TempDir;

    #[test]
    fn test_declares_entrypoint() {
        assert!(declares_entrypoint(
            "Manifest-Version: 1.0\r\nMain-Class: com.example.App\r\n"
        ));
        assert!(declares_entrypoint(
            "Manifest-Version: 1.0\nStart-Class: com.example.App\n"
        ));
        assert!(!declares_entrypoint("Manifest-Version: 1.0\nMain-Class: \n"));
        assert!(!declares_entrypoint(
            "Manifest-Version: 1.0\n\nName: foo\nMain-Class: com.example.App\n"
        ));
        assert!(!declares_entrypoint(""));
    }

    #[test]
    fn test_classify_kinds() {
        let dir = TempDir::new().unwrap();

        let executable = dir.path().join("app.jar");
        write_jar(&executable, Some("com.example.App"), &[("fixture-marker", "")]);
        assert_eq!(classify(&executable).unwrap(), ArtifactKind::ExecutableJar);

        let plain = dir.path().join("lib.jar");
        write_plain_jar(&plain);
        assert_eq!(classify(&plain).unwrap(), ArtifactKind::PlainJar);

        let war = dir.path().join("app.war");
        write_jar(&war, None, &[("WEB-INF/web.xml", "<web-app/>")]);
        assert_eq!(classify(&war).unwrap(), ArtifactKind::War);
    }

    #[test]
    fn test_classify_rejects_non_archive() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("broken.jar");
        fs::write(&path, "not a zip").unwrap();

        assert!(matches!(
            classify(&path),
            Err(DiscoveryError::InvalidArchive { .. })
        ));
    }

    #[test]
    fn test_locate_single_candidate() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("target");
        fs::create_dir_all(&target).unwrap();
        write_plain_jar(&target.join("app.jar"));
        fs::write(target.join("app.jar.sha1"), "abc").unwrap();
        fs::create_dir(target.join("classes")).unwrap();

        let artifact = locate(&[target.clone()], &["jar", "war"], None).unwrap();

        assert_eq!(artifact.path, target.join("app.jar"));
        assert_eq!(artifact.kind, ArtifactKind::PlainJar);
        assert_eq!(artifact.module, None);
        assert_eq!(artifact.file_name(), "app.jar");
    }

    #[test]
    fn test_locate_missing_directory() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("target");

        match locate(&[target.clone()], &["jar"], None) {
            Err(DiscoveryError::NoArtifact { searched }) => assert_eq!(searched, vec![target]),
            other => panic!("Expected NoArtifact, got {:?}", other),
        }
    }

    #[test]
    fn test_locate_multiple_candidates() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("target");
        fs::create_dir_all(&target).unwrap();
        write_plain_jar(&target.join("b.jar"));
        write_plain_jar(&target.join("a.war"));

        match locate(&[target.clone()], &["jar", "war"], None) {
            Err(DiscoveryError::MultipleArtifacts { candidates }) => {
                assert_eq!(candidates, vec![target.join("a.war"), target.join("b.jar")]);
            }
            other => panic!("Expected MultipleArtifacts, got {:?}", other),
        }
    }

    #[test]
    fn test_locate_records_module() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("api").join("target");
        fs::create_dir_all(&target).unwrap();
        write_jar(&target.join("api.jar"), Some("com.example.Api"), &[]);

        let artifact = locate(&[target], &["jar"], Some("api")).unwrap();
        assert_eq!(artifact.module.as_deref(), Some("api"));
        assert_eq!(artifact.kind, ArtifactKind::ExecutableJar);
    }
}
