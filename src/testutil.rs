//! Fixture helpers for unit tests

use std::fs::{self, File};
use std::io::Write;
use std::path::Path;
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

/// Writes a jar with an optional `Main-Class` and the given entries
pub fn write_jar(path: &Path, main_class: Option<&str>, entries: &[(&str, &str)]) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    let mut writer = ZipWriter::new(File::create(path).unwrap());
    let options = SimpleFileOptions::default();

    let mut manifest = String::from("Manifest-Version: 1.0\r\n");
    if let Some(main_class) = main_class {
        manifest.push_str(&format!("Main-Class: {}\r\n", main_class));
    }
    writer.add_directory("META-INF/", options).unwrap();
    writer.start_file("META-INF/MANIFEST.MF", options).unwrap();
    writer.write_all(manifest.as_bytes()).unwrap();

    for (name, content) in entries {
        writer.start_file(*name, options).unwrap();
        writer.write_all(content.as_bytes()).unwrap();
    }
    writer.finish().unwrap();
}

pub fn write_executable_jar(path: &Path) {
    write_jar(
        path,
        Some("com.example.Application"),
        &[
            ("fixture-marker", ""),
            ("com/example/Application.class", "class"),
        ],
    );
}

pub fn write_plain_jar(path: &Path) {
    write_jar(path, None, &[("com/example/Library.class", "class")]);
}

pub fn touch(path: &Path) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    File::create(path).unwrap();
}
