//! Violations reported by the structural validator.

use std::fmt;

use meem_core::NodePath;
use serde::Serialize;

/// One broken rule. `path` points at the node an editor should focus, or is
/// `None` when no single node is responsible.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Violation {
    pub message: String,
    pub path: Option<NodePath>,
}

impl Violation {
    pub fn global(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            path: None,
        }
    }

    pub fn at(path: NodePath, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            path: Some(path),
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.path {
            Some(path) => write!(f, "{path}: {}", self.message),
            None => f.write_str(&self.message),
        }
    }
}
