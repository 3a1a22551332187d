//! Workspace manifest (pixi.toml) loading.
//!
//! Only the keys the recipe and the staging steps need are read:
//!
//! ```toml
//! [workspace]
//! description = "..."
//! license = "MIT"
//! license-file = "LICENSE"
//! homepage = "https://..."
//! repository = "https://..."
//!
//! [package]
//! name = "mist"
//! version = "0.1.0"
//!
//! [dependencies]
//! max = ">=24.4"
//!
//! [feature.nightly.dependencies]
//! max = "*"
//! ```
//!
//! Dependency tables are kept in file order.

use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;
use thiserror::Error;
use toml::Table;

/// Environment name that selects the top-level `[dependencies]` table.
pub const DEFAULT_ENVIRONMENT: &str = "default";

#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("failed to read manifest file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse manifest: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("missing required field: {0}")]
    MissingField(&'static str),

    #[error("unknown environment '{0}': no [feature.{0}.dependencies] table")]
    UnknownEnvironment(String),

    #[error("dependency '{0}' must be a version string")]
    UnsupportedDependency(String),
}

/// Raw manifest shape; every field optional so missing keys can be reported by name.
#[derive(Debug, Clone, Default, Deserialize)]
struct RawManifest {
    #[serde(default)]
    package: Option<RawPackage>,

    #[serde(default)]
    workspace: Option<RawWorkspace>,

    #[serde(default)]
    dependencies: Table,

    #[serde(default)]
    feature: BTreeMap<String, RawFeature>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct RawPackage {
    name: Option<String>,
    version: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct RawWorkspace {
    description: Option<String>,
    license: Option<String>,
    #[serde(rename = "license-file")]
    license_file: Option<String>,
    homepage: Option<String>,
    repository: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct RawFeature {
    #[serde(default)]
    dependencies: Option<Table>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageInfo {
    pub name: String,
    pub version: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkspaceInfo {
    pub description: String,
    pub license: String,
    pub license_file: String,
    pub homepage: String,
    pub repository: String,
}

/// Validated manifest.
#[derive(Debug, Clone)]
pub struct Manifest {
    pub package: PackageInfo,
    pub workspace: WorkspaceInfo,
    dependencies: Table,
    features: BTreeMap<String, Table>,
}

impl Manifest {
    /// Load and validate a manifest from disk.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ManifestError> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Parse and validate a manifest from TOML text.
    pub fn parse(content: &str) -> Result<Self, ManifestError> {
        let raw: RawManifest = toml::from_str(content)?;

        let package = raw.package.unwrap_or_default();
        let workspace = raw.workspace.unwrap_or_default();

        let package = PackageInfo {
            name: required(package.name, "package.name")?,
            version: required(package.version, "package.version")?,
        };
        let workspace = WorkspaceInfo {
            description: required(workspace.description, "workspace.description")?,
            license: required(workspace.license, "workspace.license")?,
            license_file: required(workspace.license_file, "workspace.license-file")?,
            homepage: required(workspace.homepage, "workspace.homepage")?,
            repository: required(workspace.repository, "workspace.repository")?,
        };

        let features = raw
            .feature
            .into_iter()
            .filter_map(|(name, feature)| feature.dependencies.map(|deps| (name, deps)))
            .collect();

        Ok(Self {
            package,
            workspace,
            dependencies: raw.dependencies,
            features,
        })
    }

    /// Dependency entries for an environment, in manifest order.
    ///
    /// `"default"` selects `[dependencies]`; any other name selects
    /// `[feature.<name>.dependencies]`.
    pub fn dependencies_for(&self, environment: &str) -> Result<Vec<(String, String)>, ManifestError> {
        let table = if environment == DEFAULT_ENVIRONMENT {
            &self.dependencies
        } else {
            self.features
                .get(environment)
                .ok_or_else(|| ManifestError::UnknownEnvironment(environment.to_string()))?
        };

        table
            .iter()
            .map(|(name, value)| match value.as_str() {
                Some(spec) => Ok((name.clone(), spec.to_string())),
                None => Err(ManifestError::UnsupportedDependency(name.clone())),
            })
            .collect()
    }
}

fn required(value: Option<String>, field: &'static str) -> Result<String, ManifestError> {
    value.ok_or(ManifestError::MissingField(field))
}
