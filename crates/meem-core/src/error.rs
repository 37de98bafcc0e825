//! Error types for document model operations.

use crate::path::NodePath;

/// Errors raised by structural edits and typed field conversions.
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    /// The path does not resolve to a node in the tree.
    #[error("no node at path {0}")]
    InvalidPath(NodePath),

    /// The node kind cannot be a child of the node at the given path.
    #[error("a {child} cannot be placed under the node at path {parent}")]
    KindMismatch {
        /// Path of the intended parent.
        parent: NodePath,
        /// Kind of the rejected child.
        child: &'static str,
    },

    /// Insertion index beyond the end of the sibling sequence.
    #[error("index {index} out of range for {len} sibling(s) at path {parent}")]
    IndexOutOfRange {
        parent: NodePath,
        index: usize,
        len: usize,
    },

    /// Integer code that does not name an enumeration member.
    #[error("unknown {kind} code {code}")]
    UnknownCode { kind: &'static str, code: i128 },

    /// Parameter array longer than any EEPROM can hold.
    #[error("multiplicity {requested} exceeds the maximum of {max}")]
    MultiplicityTooLarge { requested: i64, max: i64 },

    /// Checksum parameter name already in use.
    #[error("checksum parameter '{0}' already exists")]
    DuplicateChecksumParameter(String),

    /// Checksum parameter name that is reserved or empty.
    #[error("'{0}' cannot be used as a checksum parameter name")]
    ReservedChecksumParameter(String),

    /// Text that does not parse as the requested checksum parameter kind.
    #[error("invalid {kind} value: '{text}'")]
    InvalidChecksumValue { kind: &'static str, text: String },
}

/// Result type for model operations.
pub type Result<T> = std::result::Result<T, ModelError>;
