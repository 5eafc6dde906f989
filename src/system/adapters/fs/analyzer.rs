//! Filesystem project analyzer.

use crate::system::domain::{AnalysisReport, SystemKind, SystemStatus};
use crate::system::ports::ProjectAnalyzer;
use async_trait::async_trait;
use camino::{Utf8Path, Utf8PathBuf};
use serde::Deserialize;
use std::collections::{BTreeMap, BTreeSet};

/// Manifest file every analysable project carries.
const MANIFEST_FILE: &str = "package.json";

/// Directory created by installing manifest dependencies.
const INSTALL_MARKER_DIR: &str = "node_modules";

/// Directory conventionally holding a project's sources.
const SOURCE_DIR: &str = "src";

/// Extensions counted as source files when no `src` directory exists.
const SOURCE_EXTENSIONS: [&str; 6] = ["js", "jsx", "ts", "tsx", "mjs", "cjs"];

/// Directories indicating the project has been built.
const BUILD_OUTPUT_DIRS: [&str; 2] = ["dist", "build"];

/// Files indicating the project can be deployed.
const DEPLOY_CONFIG_FILES: [&str; 3] = ["firebase.json", "vercel.json", "netlify.toml"];

/// Fixed mapping from declared dependency names to technology tags.
const TECHNOLOGY_TAGS: [(&str, &str); 11] = [
    ("react", "React"),
    ("vue", "Vue"),
    ("next", "Next.js"),
    ("express", "Express"),
    ("koa", "Koa"),
    ("fastify", "Fastify"),
    ("firebase", "Firebase"),
    ("firebase-admin", "Firebase"),
    ("vite", "Vite"),
    ("typescript", "TypeScript"),
    ("tailwindcss", "Tailwind CSS"),
];

/// Analyzer that inspects real project directories.
///
/// Pure classification over filesystem state: the same directory contents
/// always produce the same report.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsProjectAnalyzer;

impl FsProjectAnalyzer {
    /// Creates a filesystem analyzer.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ProjectAnalyzer for FsProjectAnalyzer {
    async fn analyze(&self, path: &Utf8Path) -> AnalysisReport {
        let owned = path.to_owned();
        match tokio::task::spawn_blocking(move || analyze_directory(&owned)).await {
            Ok(report) => report,
            Err(join_error) => AnalysisReport::error(format!("analysis task failed: {join_error}")),
        }
    }

    async fn probe(&self, path: &Utf8Path) -> bool {
        let owned = path.to_owned();
        tokio::task::spawn_blocking(move || owned.as_std_path().is_dir())
            .await
            .unwrap_or(false)
    }
}

#[derive(Debug, Default, Deserialize)]
struct PackageManifest {
    #[serde(default)]
    dependencies: BTreeMap<String, String>,
    #[serde(default, rename = "devDependencies")]
    dev_dependencies: BTreeMap<String, String>,
}

impl PackageManifest {
    fn declares(&self, dependency: &str) -> bool {
        self.dependencies.contains_key(dependency) || self.dev_dependencies.contains_key(dependency)
    }
}

fn analyze_directory(path: &Utf8PathBuf) -> AnalysisReport {
    if !path.as_std_path().is_dir() {
        return AnalysisReport::error(format!(
            "project path {path} does not exist or is not a directory"
        ));
    }

    let deploy_capable = DEPLOY_CONFIG_FILES
        .iter()
        .any(|file| path.join(file).as_std_path().is_file());
    let built = BUILD_OUTPUT_DIRS
        .iter()
        .any(|dir| path.join(dir).as_std_path().is_dir());

    let manifest_path = path.join(MANIFEST_FILE);
    if !manifest_path.as_std_path().is_file() {
        return AnalysisReport::new(SystemStatus::NeedsSetup, SystemKind::Other)
            .with_deploy_capable(deploy_capable)
            .with_built(built)
            .with_detail(format!("no {MANIFEST_FILE} manifest found"));
    }

    let manifest = match read_manifest(&manifest_path) {
        Ok(manifest) => manifest,
        Err(detail) => return AnalysisReport::error(detail),
    };

    let technologies = detect_technologies(&manifest);
    let installed = path.join(INSTALL_MARKER_DIR).as_std_path().is_dir();
    let sources_present = has_source_files(path);
    let status = if installed && sources_present {
        SystemStatus::Ready
    } else {
        SystemStatus::NeedsSetup
    };

    let report = AnalysisReport::new(status, suggest_kind(&manifest, deploy_capable))
        .with_technologies(technologies)
        .with_deploy_capable(deploy_capable)
        .with_built(built);
    if sources_present {
        report
    } else {
        report.with_detail("no source files found")
    }
}

fn has_source_files(path: &Utf8Path) -> bool {
    if path.join(SOURCE_DIR).as_std_path().is_dir() {
        return true;
    }
    let Ok(entries) = std::fs::read_dir(path.as_std_path()) else {
        return false;
    };
    entries.flatten().any(|entry| {
        entry
            .path()
            .extension()
            .and_then(std::ffi::OsStr::to_str)
            .is_some_and(|extension| SOURCE_EXTENSIONS.contains(&extension))
    })
}

fn read_manifest(manifest_path: &Utf8Path) -> Result<PackageManifest, String> {
    let contents = std::fs::read_to_string(manifest_path)
        .map_err(|err| format!("failed to read {manifest_path}: {err}"))?;
    serde_json::from_str(&contents).map_err(|err| format!("failed to parse {manifest_path}: {err}"))
}

fn detect_technologies(manifest: &PackageManifest) -> BTreeSet<String> {
    TECHNOLOGY_TAGS
        .iter()
        .filter(|(dependency, _)| manifest.declares(dependency))
        .map(|(_, tag)| (*tag).to_owned())
        .collect()
}

fn suggest_kind(manifest: &PackageManifest, deploy_capable: bool) -> SystemKind {
    let has_ui = manifest.declares("react") || manifest.declares("vue") || manifest.declares("next");
    let has_server =
        manifest.declares("express") || manifest.declares("koa") || manifest.declares("fastify");
    let has_baas =
        manifest.declares("firebase") || manifest.declares("firebase-admin") || deploy_capable;

    match (has_ui, has_server, has_baas) {
        (true, true, _) => SystemKind::FullStack,
        (true, false, true) => SystemKind::ReactBaas,
        (true, false, false) => SystemKind::React,
        (false, true, _) => SystemKind::NodeService,
        (false, false, _) => SystemKind::Other,
    }
}
