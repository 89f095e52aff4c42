//! Minimal charms for deploy tests

use crate::ClientError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Contents of a charm's `metadata.yaml`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharmMetadata {
    pub name: String,
    pub summary: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub series: Vec<String>,
    #[serde(
        rename = "min-juju-version",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub min_juju_version: Option<String>,
}

impl Default for CharmMetadata {
    fn default() -> Self {
        Self {
            name: "dummy".to_string(),
            summary: "summary".to_string(),
            description: "description".to_string(),
            series: vec!["trusty".to_string()],
            min_juju_version: None,
        }
    }
}

impl CharmMetadata {
    pub fn min_juju_version<S: AsRef<str>>(mut self, version: S) -> Self {
        self.min_juju_version = Some(version.as_ref().to_string());
        self
    }

    /// Write `metadata.yaml` into `charm_dir` and return its path
    pub fn write_to(&self, charm_dir: &Path) -> Result<PathBuf, ClientError> {
        let path = charm_dir.join("metadata.yaml");
        std::fs::write(&path, serde_yaml::to_string(self)?)?;
        Ok(path)
    }

    pub fn read_from(charm_dir: &Path) -> Result<Self, ClientError> {
        let content = std::fs::read_to_string(charm_dir.join("metadata.yaml"))?;
        Ok(serde_yaml::from_str(&content)?)
    }
}

/// Write the default dummy charm into `charm_dir`, gated on `min_ver` if given
pub fn make_charm(charm_dir: &Path, min_ver: Option<&str>) -> Result<PathBuf, ClientError> {
    let metadata = match min_ver {
        Some(ver) => CharmMetadata::default().min_juju_version(ver),
        None => CharmMetadata::default(),
    };
    metadata.write_to(charm_dir)
}

/// Same as [`make_charm`] but in a fresh temporary directory that is removed
/// when the returned handle drops
pub fn temp_charm(min_ver: Option<&str>) -> Result<TempDir, ClientError> {
    let charm_dir = tempfile::Builder::new()
        .prefix("juju-assess-charm-")
        .tempdir()?;
    make_charm(charm_dir.path(), min_ver)?;
    Ok(charm_dir)
}
