//! Index paths into the data model tree.

use std::fmt;

use serde::{Serialize, Serializer};

/// Position of a node, resolved from the root by descending `children`.
///
/// `DefaultValue` addresses one element of a parameter's `default_value`
/// array. It shares its index shape with `Bitfield`, so it is only produced
/// by the validator and never by [`NodePath::from_indices`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodePath {
    Root,
    Block(usize),
    Parameter(usize, usize),
    Bitfield(usize, usize, usize),
    DefaultValue(usize, usize, usize),
}

impl NodePath {
    /// Path from a raw index sequence of length 0 to 3.
    pub fn from_indices(indices: &[usize]) -> Option<Self> {
        match *indices {
            [] => Some(NodePath::Root),
            [b] => Some(NodePath::Block(b)),
            [b, p] => Some(NodePath::Parameter(b, p)),
            [b, p, f] => Some(NodePath::Bitfield(b, p, f)),
            _ => None,
        }
    }

    pub fn indices(&self) -> Vec<usize> {
        match *self {
            NodePath::Root => vec![],
            NodePath::Block(b) => vec![b],
            NodePath::Parameter(b, p) => vec![b, p],
            NodePath::Bitfield(b, p, f) | NodePath::DefaultValue(b, p, f) => vec![b, p, f],
        }
    }

    /// Number of indices (tree depth).
    pub fn depth(&self) -> usize {
        match self {
            NodePath::Root => 0,
            NodePath::Block(_) => 1,
            NodePath::Parameter(..) => 2,
            NodePath::Bitfield(..) | NodePath::DefaultValue(..) => 3,
        }
    }

    /// Path of the containing node. The root has no parent.
    pub fn parent(&self) -> Option<NodePath> {
        match *self {
            NodePath::Root => None,
            NodePath::Block(_) => Some(NodePath::Root),
            NodePath::Parameter(b, _) => Some(NodePath::Block(b)),
            NodePath::Bitfield(b, p, _) | NodePath::DefaultValue(b, p, _) => {
                Some(NodePath::Parameter(b, p))
            }
        }
    }

    /// Path of the `index`-th child. Bitfields have no children.
    pub fn child(&self, index: usize) -> Option<NodePath> {
        match *self {
            NodePath::Root => Some(NodePath::Block(index)),
            NodePath::Block(b) => Some(NodePath::Parameter(b, index)),
            NodePath::Parameter(b, p) => Some(NodePath::Bitfield(b, p, index)),
            NodePath::Bitfield(..) | NodePath::DefaultValue(..) => None,
        }
    }

    /// Index among siblings.
    pub fn last_index(&self) -> Option<usize> {
        match *self {
            NodePath::Root => None,
            NodePath::Block(i)
            | NodePath::Parameter(_, i)
            | NodePath::Bitfield(_, _, i)
            | NodePath::DefaultValue(_, _, i) => Some(i),
        }
    }

    /// Same parent, different sibling index.
    pub fn with_last_index(&self, index: usize) -> NodePath {
        match *self {
            NodePath::Root => NodePath::Root,
            NodePath::Block(_) => NodePath::Block(index),
            NodePath::Parameter(b, _) => NodePath::Parameter(b, index),
            NodePath::Bitfield(b, p, _) => NodePath::Bitfield(b, p, index),
            NodePath::DefaultValue(b, p, _) => NodePath::DefaultValue(b, p, index),
        }
    }

    /// Tree node an editor should focus for this path. A default value maps
    /// to its parameter.
    pub fn owning_node(&self) -> NodePath {
        match *self {
            NodePath::DefaultValue(b, p, _) => NodePath::Parameter(b, p),
            other => other,
        }
    }
}

impl fmt::Display for NodePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            NodePath::DefaultValue(b, p, i) => write!(f, "[{b}, {p}].default_value[{i}]"),
            _ => {
                let parts: Vec<String> = self.indices().iter().map(|i| i.to_string()).collect();
                write!(f, "[{}]", parts.join(", "))
            }
        }
    }
}

impl Serialize for NodePath {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.indices().serialize(serializer)
    }
}
