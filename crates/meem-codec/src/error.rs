//! Error types for loading and saving documents.

use std::fmt;
use std::path::PathBuf;

/// The three persisted documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocumentKind {
    DataModel,
    Platform,
    Checksum,
}

impl DocumentKind {
    /// File name used when a project does not choose one.
    pub fn default_file_name(self) -> &'static str {
        match self {
            DocumentKind::DataModel => "data_model.json",
            DocumentKind::Platform => "platform_settings.json",
            DocumentKind::Checksum => "checksum_parameters.json",
        }
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            DocumentKind::DataModel => "data model",
            DocumentKind::Platform => "platform settings",
            DocumentKind::Checksum => "checksum settings",
        })
    }
}

/// Errors that abort a load or a save. A failed load never touches the
/// previously loaded document.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    /// Text is not valid JSON or does not have the document's shape.
    #[error("failed to deserialize {document}: {source}")]
    Malformed {
        document: DocumentKind,
        #[source]
        source: serde_json::Error,
    },

    /// Document decoded but breaks an invariant required before use.
    #[error("invalid {document}: {}", problems.join("; "))]
    Precheck {
        document: DocumentKind,
        problems: Vec<String>,
    },

    /// Serialization failure.
    #[error("failed to serialize {document}: {source}")]
    Serialize {
        document: DocumentKind,
        #[source]
        source: serde_json::Error,
    },

    /// The session holds no document of this kind.
    #[error("no {0} loaded")]
    Missing(DocumentKind),

    /// Structural edit rejected by the model.
    #[error(transparent)]
    Model(#[from] meem_core::ModelError),

    /// I/O error reading/writing document files.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Document file not found.
    #[error("document file not found: {}", path.display())]
    NotFound {
        /// The path that was not found.
        path: PathBuf,
    },
}

impl CodecError {
    pub(crate) fn precheck(document: DocumentKind, problems: Vec<String>) -> Self {
        tracing::warn!(%document, ?problems, "load precheck failed");
        CodecError::Precheck { document, problems }
    }
}

/// Result type for codec operations.
pub type Result<T> = std::result::Result<T, CodecError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn precheck_message_joins_problems() {
        let err = CodecError::Precheck {
            document: DocumentKind::DataModel,
            problems: vec!["a".into(), "b".into()],
        };
        assert_eq!(err.to_string(), "invalid data model: a; b");
    }

    #[test]
    fn not_found_names_path() {
        let err = CodecError::NotFound {
            path: PathBuf::from("/tmp/x.json"),
        };
        assert!(err.to_string().contains("/tmp/x.json"));
    }
}
