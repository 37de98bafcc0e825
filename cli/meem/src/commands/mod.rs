//! CLI command implementations and the shared document loading.

pub mod fmt;
pub mod init;
pub mod tree;
pub mod validate;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use meem_codec::{CodecError, DocumentKind, Session};

use crate::manifest::MeemManifest;

pub const DOCUMENT_KINDS: [DocumentKind; 3] = [
    DocumentKind::DataModel,
    DocumentKind::Platform,
    DocumentKind::Checksum,
];

/// Resolved locations of the three documents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentPaths {
    pub datamodel: PathBuf,
    pub platform: PathBuf,
    pub checksum: PathBuf,
}

/// Paths given on the command line.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub datamodel: Option<PathBuf>,
    pub platform: Option<PathBuf>,
    pub checksum: Option<PathBuf>,
}

impl DocumentPaths {
    /// Command-line paths win; otherwise manifest entries (or default file
    /// names) relative to the project directory.
    pub fn resolve(
        project_dir: &Path,
        manifest: Option<&MeemManifest>,
        overrides: &Overrides,
    ) -> Self {
        let pick = |kind: DocumentKind, given: &Option<PathBuf>| -> PathBuf {
            if let Some(path) = given {
                return path.clone();
            }
            let file = manifest
                .map(|m| m.documents.file_name(kind))
                .unwrap_or_else(|| kind.default_file_name());
            project_dir.join(file)
        };
        Self {
            datamodel: pick(DocumentKind::DataModel, &overrides.datamodel),
            platform: pick(DocumentKind::Platform, &overrides.platform),
            checksum: pick(DocumentKind::Checksum, &overrides.checksum),
        }
    }

    pub fn get(&self, kind: DocumentKind) -> &Path {
        match kind {
            DocumentKind::DataModel => &self.datamodel,
            DocumentKind::Platform => &self.platform,
            DocumentKind::Checksum => &self.checksum,
        }
    }
}

/// Load every document that exists. Missing files leave the document absent;
/// any other failure aborts.
pub fn load_session(paths: &DocumentPaths) -> Result<Session> {
    let mut session = Session::new();
    for kind in DOCUMENT_KINDS {
        let path = paths.get(kind);
        let result = match kind {
            DocumentKind::DataModel => session.load_data_model_file(path),
            DocumentKind::Platform => session.load_platform_file(path),
            DocumentKind::Checksum => session.load_checksum_file(path),
        };
        match result {
            Ok(()) => tracing::info!(document = %kind, path = %path.display(), "loaded"),
            Err(CodecError::NotFound { .. }) => {
                tracing::info!(document = %kind, path = %path.display(), "not present")
            }
            Err(e) => return Err(e).with_context(|| format!("loading {}", path.display())),
        }
    }
    Ok(session)
}

/// Canonical text of a loaded document, or `None` if the session lacks it.
pub fn canonical_text(session: &Session, kind: DocumentKind) -> Result<Option<String>> {
    let text = match kind {
        DocumentKind::DataModel if session.data_model().is_some() => session.save_data_model()?,
        DocumentKind::Platform if session.platform().is_some() => session.save_platform()?,
        DocumentKind::Checksum if session.checksum().is_some() => session.save_checksum()?,
        _ => return Ok(None),
    };
    Ok(Some(text))
}
