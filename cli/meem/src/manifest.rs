//! `meem.toml` manifest parsing and project configuration.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use meem_codec::DocumentKind;
use serde::{Deserialize, Serialize};

pub const MANIFEST_FILE: &str = "meem.toml";

/// The top-level manifest structure for a mEEM project.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MeemManifest {
    /// Project metadata (required).
    pub project: ProjectConfig,
    /// Where the three documents live, relative to the manifest.
    #[serde(default)]
    pub documents: DocumentsConfig,
}

/// Project metadata section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectConfig {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// Document file locations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentsConfig {
    #[serde(default = "default_datamodel")]
    pub datamodel: String,
    #[serde(default = "default_platform")]
    pub platform: String,
    #[serde(default = "default_checksum")]
    pub checksum: String,
}

impl Default for DocumentsConfig {
    fn default() -> Self {
        Self {
            datamodel: default_datamodel(),
            platform: default_platform(),
            checksum: default_checksum(),
        }
    }
}

fn default_datamodel() -> String {
    DocumentKind::DataModel.default_file_name().to_string()
}

fn default_platform() -> String {
    DocumentKind::Platform.default_file_name().to_string()
}

fn default_checksum() -> String {
    DocumentKind::Checksum.default_file_name().to_string()
}

impl DocumentsConfig {
    pub fn file_name(&self, kind: DocumentKind) -> &str {
        match kind {
            DocumentKind::DataModel => &self.datamodel,
            DocumentKind::Platform => &self.platform,
            DocumentKind::Checksum => &self.checksum,
        }
    }
}

impl MeemManifest {
    /// Search upward from `start_dir` for a `meem.toml` file, parse and return it
    /// along with the directory it was found in.
    pub fn find_and_load(start_dir: &Path) -> Result<Option<(Self, PathBuf)>> {
        let mut dir = start_dir.to_path_buf();
        loop {
            let candidate = dir.join(MANIFEST_FILE);
            if candidate.is_file() {
                let content = std::fs::read_to_string(&candidate)
                    .with_context(|| format!("reading {}", candidate.display()))?;
                let manifest: MeemManifest = toml::from_str(&content)
                    .with_context(|| format!("parsing {}", candidate.display()))?;
                tracing::debug!(path = %candidate.display(), "manifest loaded");
                return Ok(Some((manifest, dir)));
            }
            if !dir.pop() {
                break;
            }
        }
        Ok(None)
    }

    #[cfg(test)]
    pub fn from_str(s: &str) -> Result<Self> {
        toml::from_str(s).context("parsing meem.toml")
    }

    /// Generate the default template for `meem init`.
    pub fn template(name: &str) -> String {
        format!(
            r#"[project]
name = "{name}"

[documents]
datamodel = "{datamodel}"
platform = "{platform}"
checksum = "{checksum}"
"#,
            datamodel = DocumentKind::DataModel.default_file_name(),
            platform = DocumentKind::Platform.default_file_name(),
            checksum = DocumentKind::Checksum.default_file_name(),
        )
    }
}
