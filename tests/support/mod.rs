//! Shared fixtures for the integration tests
//!
//! Each [`Project`] is a sandbox with a `workspace/` application root, a
//! `layers/` directory and a `home/` directory inside one `TempDir`.

#![allow(dead_code)]

use build_system_cnb::{
    BuildConfig, BuildSystem, BuildSystemId, Layers, RecordingExecutor, Runner,
};
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

pub const JAVA_VERSION_OUTPUT: &str = "test-java-version";

pub struct Project {
    _dir: TempDir,
    pub root: PathBuf,
    pub layers: PathBuf,
    pub home: PathBuf,
}

impl Project {
    pub fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let root = dir.path().join("workspace");
        let layers = dir.path().join("layers");
        let home = dir.path().join("home");
        for path in [&root, &layers, &home] {
            fs::create_dir_all(path).unwrap();
        }
        Self {
            _dir: dir,
            root,
            layers,
            home,
        }
    }

    /// Maven project with its wrapper and wrapper configuration
    pub fn maven() -> Self {
        let project = Self::new();
        touch(&project.path("mvnw"));
        touch(&project.path(".mvn/wrapper/maven-wrapper.properties"));
        touch(&project.path("pom.xml"));
        project
    }

    pub fn gradle() -> Self {
        let project = Self::new();
        touch(&project.path("gradlew"));
        touch(&project.path("build.gradle"));
        project
    }

    pub fn path(&self, relative: &str) -> PathBuf {
        self.root.join(relative)
    }

    pub fn layer(&self, name: &str) -> PathBuf {
        self.layers.join(name)
    }

    pub fn sandbox(&self) -> &Path {
        self._dir.path()
    }

    /// Runner with a scripted executor answering the runtime probe
    pub fn runner(&self, id: BuildSystemId, config: BuildConfig) -> Runner<RecordingExecutor> {
        Runner::with_executor(
            BuildSystem::new(id, &self.root),
            Layers::new(&self.layers),
            config,
            RecordingExecutor::with_outputs([JAVA_VERSION_OUTPUT]),
        )
    }
}

pub fn touch(path: &Path) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    File::create(path).unwrap();
}

pub fn is_symlink(path: &Path) -> bool {
    fs::symlink_metadata(path)
        .map(|m| m.file_type().is_symlink())
        .unwrap_or(false)
}

/// Jar or war fixture builder
pub struct JarBuilder {
    main_class: Option<String>,
    start_class: Option<String>,
    entries: Vec<(String, String)>,
}

impl JarBuilder {
    pub fn new() -> Self {
        Self {
            main_class: None,
            start_class: None,
            entries: Vec::new(),
        }
    }

    /// Executable jar carrying the `fixture-marker` entry
    pub fn executable() -> Self {
        Self::new()
            .main_class("com.example.Application")
            .entry("fixture-marker", "")
            .entry("com/example/Application.class", "class")
    }

    pub fn plain() -> Self {
        Self::new().entry("com/example/Library.class", "class")
    }

    pub fn main_class(mut self, class: &str) -> Self {
        self.main_class = Some(class.to_string());
        self
    }

    pub fn start_class(mut self, class: &str) -> Self {
        self.start_class = Some(class.to_string());
        self
    }

    pub fn entry(mut self, name: &str, content: &str) -> Self {
        self.entries.push((name.to_string(), content.to_string()));
        self
    }

    pub fn write(&self, path: &Path) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        let mut writer = ZipWriter::new(File::create(path).unwrap());
        let options = SimpleFileOptions::default();

        let mut manifest = String::from("Manifest-Version: 1.0\r\n");
        if let Some(class) = &self.main_class {
            manifest.push_str(&format!("Main-Class: {}\r\n", class));
        }
        if let Some(class) = &self.start_class {
            manifest.push_str(&format!("Start-Class: {}\r\n", class));
        }
        writer.add_directory("META-INF/", options).unwrap();
        writer.start_file("META-INF/MANIFEST.MF", options).unwrap();
        writer.write_all(manifest.as_bytes()).unwrap();

        for (name, content) in &self.entries {
            writer.start_file(name.as_str(), options).unwrap();
            writer.write_all(content.as_bytes()).unwrap();
        }
        writer.finish().unwrap();
    }
}
