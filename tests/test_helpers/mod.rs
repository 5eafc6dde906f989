//! Shared fixtures for integration tests.

use camino::{Utf8Path, Utf8PathBuf};
use std::fs;
use uuid::Uuid;

/// Real project directory under the system temp dir, removed on drop.
pub struct TempProjectDir {
    root: Utf8PathBuf,
}

impl TempProjectDir {
    /// Creates a fresh empty project directory.
    pub fn new(prefix: &str) -> Self {
        let root = Utf8PathBuf::from_path_buf(std::env::temp_dir())
            .expect("temp dir path is valid UTF-8")
            .join(format!("{prefix}-{}", Uuid::new_v4().simple()));
        fs::create_dir_all(root.as_std_path()).expect("failed to create temp project dir");
        Self { root }
    }

    /// Returns the absolute project path.
    pub fn path(&self) -> &Utf8Path {
        &self.root
    }

    /// Writes a `package.json` declaring the given dependencies.
    pub fn write_manifest(&self, dependencies: &[&str]) {
        let declared: serde_json::Map<String, serde_json::Value> = dependencies
            .iter()
            .map(|name| {
                (
                    (*name).to_owned(),
                    serde_json::Value::String("^1.0.0".to_owned()),
                )
            })
            .collect();
        let manifest = serde_json::json!({
            "name": self.root.file_name().unwrap_or("project"),
            "version": "0.1.0",
            "dependencies": declared,
        });
        fs::write(
            self.root.join("package.json").as_std_path(),
            serde_json::to_string_pretty(&manifest).expect("manifest serializes"),
        )
        .expect("failed to write manifest");
    }

    /// Creates a subdirectory, e.g. `node_modules` or `dist`.
    pub fn create_dir(&self, name: &str) {
        fs::create_dir_all(self.root.join(name).as_std_path())
            .expect("failed to create subdirectory");
    }

    /// Writes a placeholder entry point under `src/`.
    pub fn write_source(&self) {
        self.create_dir("src");
        fs::write(
            self.root.join("src/index.js").as_std_path(),
            "export default {};\n",
        )
        .expect("failed to write source file");
    }
}

impl Drop for TempProjectDir {
    fn drop(&mut self) {
        fs::remove_dir_all(self.root.as_std_path()).ok();
    }
}
