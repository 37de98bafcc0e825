//! The data model tree: blocks, parameters and bitfields.
//!
//! Every node owns its `children` exclusively and order is the storage
//! layout order. Structural edits go through [`DataModel`] and a
//! [`NodePath`]; nothing in the tree points back at its parent.

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{ModelError, Result};
use crate::lenient::{self, Integer};
use crate::numeric::{self, DataType};
use crate::path::NodePath;
use crate::value::{Literal, NumberHint, Scalar};

/// Allowed checksum sizes in bytes.
pub const CHECKSUM_SIZES: [i64; 3] = [1, 2, 4];

/// Instance count bounds for rotating management types.
pub const MIN_POOL_INSTANCES: i64 = 2;
pub const MAX_POOL_INSTANCES: i64 = 15;

/// Longest parameter array: one byte per element in the largest EEPROM.
pub const MAX_MULTIPLICITY: i64 = crate::platform::MAX_EEPROM_SIZE;

// ---------------------------------------------------------------------------
// Enumerations
// ---------------------------------------------------------------------------

/// Redundancy strategy for a block's stored instances.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "Integer", into = "u8")]
pub enum ManagementType {
    /// Single copy.
    #[default]
    Basic = 0,
    /// Mirrored pair.
    BackupCopy = 1,
    /// Rotating pool of selectable profiles.
    MultiProfile = 2,
    /// Rotating pool spreading writes over instances.
    WearLeveling = 3,
}

impl ManagementType {
    pub const ALL: [ManagementType; 4] = [
        ManagementType::Basic,
        ManagementType::BackupCopy,
        ManagementType::MultiProfile,
        ManagementType::WearLeveling,
    ];

    /// Inclusive `instance_count` bounds for this strategy.
    pub fn instance_bounds(self) -> (i64, i64) {
        match self {
            ManagementType::Basic => (1, 1),
            ManagementType::BackupCopy => (2, 2),
            ManagementType::MultiProfile | ManagementType::WearLeveling => {
                (MIN_POOL_INSTANCES, MAX_POOL_INSTANCES)
            }
        }
    }

    pub fn allows_instance_count(self, count: i64) -> bool {
        let (min, max) = self.instance_bounds();
        (min..=max).contains(&count)
    }

    pub fn label(self) -> &'static str {
        match self {
            ManagementType::Basic => "Basic",
            ManagementType::BackupCopy => "Backup copy",
            ManagementType::MultiProfile => "Multi profile",
            ManagementType::WearLeveling => "Wear leveling",
        }
    }
}

impl From<ManagementType> for u8 {
    fn from(t: ManagementType) -> u8 {
        t as u8
    }
}

impl TryFrom<Integer> for ManagementType {
    type Error = ModelError;

    fn try_from(code: Integer) -> std::result::Result<Self, Self::Error> {
        usize::try_from(code.0)
            .ok()
            .and_then(|i| Self::ALL.get(i).copied())
            .ok_or(ModelError::UnknownCode {
                kind: "management type",
                code: code.0,
            })
    }
}

/// What the runtime does when a block fails its integrity check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "Integer", into = "u8")]
pub enum DataRecoveryStrategy {
    #[default]
    RecoverDefaultsAndRepair = 0,
    RecoverDefaults = 1,
}

impl From<DataRecoveryStrategy> for u8 {
    fn from(s: DataRecoveryStrategy) -> u8 {
        s as u8
    }
}

impl TryFrom<Integer> for DataRecoveryStrategy {
    type Error = ModelError;

    fn try_from(code: Integer) -> std::result::Result<Self, Self::Error> {
        match code.0 {
            0 => Ok(DataRecoveryStrategy::RecoverDefaultsAndRepair),
            1 => Ok(DataRecoveryStrategy::RecoverDefaults),
            other => Err(ModelError::UnknownCode {
                kind: "data recovery strategy",
                code: other,
            }),
        }
    }
}

// ---------------------------------------------------------------------------
// Nodes
// ---------------------------------------------------------------------------

/// Root of the tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataModel {
    #[serde(default, deserialize_with = "lenient::text")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient::text")]
    pub description: String,
    /// Absent in a document reads as 0 so the load precheck reports it.
    #[serde(default, deserialize_with = "lenient::int")]
    pub checksum_size: i64,
    #[serde(default, deserialize_with = "lenient::list")]
    pub children: Vec<Block>,
}

impl Default for DataModel {
    fn default() -> Self {
        Self {
            name: String::new(),
            description: String::new(),
            checksum_size: 1,
            children: Vec::new(),
        }
    }
}

/// A named storage region with its own management strategy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Block {
    #[serde(deserialize_with = "lenient::text")]
    pub name: String,
    #[serde(deserialize_with = "lenient::text")]
    pub description: String,
    #[serde(deserialize_with = "lenient::list")]
    pub children: Vec<Parameter>,
    pub management_type: ManagementType,
    #[serde(deserialize_with = "lenient::int")]
    pub instance_count: i64,
    pub data_recovery_strategy: DataRecoveryStrategy,
    pub compress_defaults: bool,
}

impl Default for Block {
    fn default() -> Self {
        Self {
            name: String::new(),
            description: String::new(),
            children: Vec::new(),
            management_type: ManagementType::Basic,
            instance_count: 1,
            data_recovery_strategy: DataRecoveryStrategy::RecoverDefaultsAndRepair,
            compress_defaults: true,
        }
    }
}

/// A typed scalar or fixed-length array inside a block.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Parameter {
    pub name: String,
    pub description: String,
    pub children: Vec<Bitfield>,
    pub data_type: DataType,
    pub multiplicity: i64,
    pub default_value: Vec<Scalar>,
}

/// `Parameter` as written in a document. Default values are resolved
/// against `data_type` once the whole object has been read.
#[derive(Deserialize)]
#[serde(default)]
struct ParameterDocument {
    #[serde(deserialize_with = "lenient::text")]
    name: String,
    #[serde(deserialize_with = "lenient::text")]
    description: String,
    #[serde(deserialize_with = "lenient::list")]
    children: Vec<Bitfield>,
    data_type: DataType,
    #[serde(deserialize_with = "lenient::int")]
    multiplicity: i64,
    #[serde(deserialize_with = "lenient::list")]
    default_value: Vec<Literal>,
}

impl Default for ParameterDocument {
    fn default() -> Self {
        let p = Parameter::default();
        Self {
            name: p.name,
            description: p.description,
            children: p.children,
            data_type: p.data_type,
            multiplicity: p.multiplicity,
            default_value: p.default_value.into_iter().map(Literal::plain).collect(),
        }
    }
}

impl<'de> Deserialize<'de> for Parameter {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let doc = ParameterDocument::deserialize(deserializer)?;
        let hint = NumberHint::for_type(doc.data_type);
        Ok(Parameter {
            name: doc.name,
            description: doc.description,
            children: doc.children,
            data_type: doc.data_type,
            multiplicity: doc.multiplicity,
            default_value: doc.default_value.into_iter().map(|l| l.hinted(hint)).collect(),
        })
    }
}

impl Default for Parameter {
    fn default() -> Self {
        Self {
            name: String::new(),
            description: String::new(),
            children: Vec::new(),
            data_type: DataType::Uint8,
            multiplicity: 1,
            default_value: vec![Scalar::Int(0)],
        }
    }
}

/// A named bit range inside an integer parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Bitfield {
    #[serde(deserialize_with = "lenient::text")]
    pub name: String,
    #[serde(deserialize_with = "lenient::text")]
    pub description: String,
    #[serde(deserialize_with = "lenient::int")]
    pub size_in_bits: i64,
}

impl Default for Bitfield {
    fn default() -> Self {
        Self {
            name: String::new(),
            description: String::new(),
            size_in_bits: 1,
        }
    }
}

/// An owned subtree, as inserted into or removed from the model.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Block(Block),
    Parameter(Parameter),
    Bitfield(Bitfield),
}

impl Node {
    pub fn kind(&self) -> &'static str {
        match self {
            Node::Block(_) => "block",
            Node::Parameter(_) => "parameter",
            Node::Bitfield(_) => "bitfield",
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Node::Block(b) => &b.name,
            Node::Parameter(p) => &p.name,
            Node::Bitfield(f) => &f.name,
        }
    }
}

/// A borrowed node resolved from a path.
#[derive(Debug, Clone, Copy)]
pub enum NodeRef<'a> {
    Model(&'a DataModel),
    Block(&'a Block),
    Parameter(&'a Parameter),
    Bitfield(&'a Bitfield),
}

impl NodeRef<'_> {
    pub fn kind(&self) -> &'static str {
        match self {
            NodeRef::Model(_) => "datamodel",
            NodeRef::Block(_) => "block",
            NodeRef::Parameter(_) => "parameter",
            NodeRef::Bitfield(_) => "bitfield",
        }
    }

    pub fn name(&self) -> &str {
        match self {
            NodeRef::Model(m) => &m.name,
            NodeRef::Block(b) => &b.name,
            NodeRef::Parameter(p) => &p.name,
            NodeRef::Bitfield(f) => &f.name,
        }
    }
}

// ---------------------------------------------------------------------------
// Tree access and structural edits
// ---------------------------------------------------------------------------

impl DataModel {
    pub fn block(&self, b: usize) -> Option<&Block> {
        self.children.get(b)
    }

    pub fn block_mut(&mut self, b: usize) -> Option<&mut Block> {
        self.children.get_mut(b)
    }

    pub fn parameter(&self, b: usize, p: usize) -> Option<&Parameter> {
        self.block(b)?.children.get(p)
    }

    pub fn parameter_mut(&mut self, b: usize, p: usize) -> Option<&mut Parameter> {
        self.block_mut(b)?.children.get_mut(p)
    }

    pub fn bitfield(&self, b: usize, p: usize, f: usize) -> Option<&Bitfield> {
        self.parameter(b, p)?.children.get(f)
    }

    pub fn bitfield_mut(&mut self, b: usize, p: usize, f: usize) -> Option<&mut Bitfield> {
        self.parameter_mut(b, p)?.children.get_mut(f)
    }

    /// Resolve a path. A `DefaultValue` path resolves to its parameter.
    pub fn node(&self, path: &NodePath) -> Option<NodeRef<'_>> {
        match path.owning_node() {
            NodePath::Root => Some(NodeRef::Model(self)),
            NodePath::Block(b) => self.block(b).map(NodeRef::Block),
            NodePath::Parameter(b, p) => self.parameter(b, p).map(NodeRef::Parameter),
            NodePath::Bitfield(b, p, f) => self.bitfield(b, p, f).map(NodeRef::Bitfield),
            NodePath::DefaultValue(..) => None,
        }
    }

    /// Number of children under the node at `parent`.
    pub fn child_count(&self, parent: &NodePath) -> Option<usize> {
        match self.node(parent)? {
            NodeRef::Model(m) => Some(m.children.len()),
            NodeRef::Block(b) => Some(b.children.len()),
            NodeRef::Parameter(p) => Some(p.children.len()),
            NodeRef::Bitfield(_) => None,
        }
    }

    /// Insert `node` as the `index`-th child of `parent`, shifting later
    /// siblings. Returns the path of the inserted node.
    pub fn insert(&mut self, parent: NodePath, index: usize, node: Node) -> Result<NodePath> {
        let len = self
            .child_count(&parent)
            .ok_or(ModelError::InvalidPath(parent))?;
        if index > len {
            return Err(ModelError::IndexOutOfRange { parent, index, len });
        }
        let kind = node.kind();
        match (parent, node) {
            (NodePath::Root, Node::Block(block)) => self.children.insert(index, block),
            (NodePath::Block(b), Node::Parameter(param)) => {
                self.children[b].children.insert(index, param)
            }
            (NodePath::Parameter(b, p), Node::Bitfield(field)) => {
                self.children[b].children[p].children.insert(index, field)
            }
            _ => return Err(ModelError::KindMismatch { parent, child: kind }),
        }
        tracing::debug!(%parent, index, kind, "inserted node");
        parent
            .child(index)
            .ok_or(ModelError::InvalidPath(parent))
    }

    /// Append `node` as the last child of `parent`.
    pub fn push(&mut self, parent: NodePath, node: Node) -> Result<NodePath> {
        let len = self
            .child_count(&parent)
            .ok_or(ModelError::InvalidPath(parent))?;
        self.insert(parent, len, node)
    }

    /// Remove and return the subtree at `path`.
    pub fn remove(&mut self, path: NodePath) -> Result<Node> {
        if self.node(&path).is_none() || matches!(path, NodePath::DefaultValue(..)) {
            return Err(ModelError::InvalidPath(path));
        }
        let removed = match path {
            NodePath::Block(b) => Node::Block(self.children.remove(b)),
            NodePath::Parameter(b, p) => Node::Parameter(self.children[b].children.remove(p)),
            NodePath::Bitfield(b, p, f) => {
                Node::Bitfield(self.children[b].children[p].children.remove(f))
            }
            NodePath::Root | NodePath::DefaultValue(..) => {
                return Err(ModelError::InvalidPath(path))
            }
        };
        tracing::debug!(%path, kind = removed.kind(), name = removed.name(), "removed node");
        Ok(removed)
    }

    /// Swap a node with its previous sibling. Returns the node's new path,
    /// or `None` if it is already first.
    pub fn move_up(&mut self, path: NodePath) -> Result<Option<NodePath>> {
        let index = self.sibling_index(&path)?;
        if index == 0 {
            return Ok(None);
        }
        self.swap_siblings(&path, index - 1, index);
        Ok(Some(path.with_last_index(index - 1)))
    }

    /// Swap a node with its next sibling. Returns the node's new path, or
    /// `None` if it is already last.
    pub fn move_down(&mut self, path: NodePath) -> Result<Option<NodePath>> {
        let index = self.sibling_index(&path)?;
        let parent = path.parent().ok_or(ModelError::InvalidPath(path))?;
        let len = self
            .child_count(&parent)
            .ok_or(ModelError::InvalidPath(path))?;
        if index + 1 >= len {
            return Ok(None);
        }
        self.swap_siblings(&path, index, index + 1);
        Ok(Some(path.with_last_index(index + 1)))
    }

    fn sibling_index(&self, path: &NodePath) -> Result<usize> {
        if matches!(path, NodePath::DefaultValue(..)) || self.node(path).is_none() {
            return Err(ModelError::InvalidPath(*path));
        }
        path.last_index().ok_or(ModelError::InvalidPath(*path))
    }

    // Caller has resolved `path`, so both indices are in bounds.
    fn swap_siblings(&mut self, path: &NodePath, i: usize, j: usize) {
        match *path {
            NodePath::Block(_) => self.children.swap(i, j),
            NodePath::Parameter(b, _) => self.children[b].children.swap(i, j),
            NodePath::Bitfield(b, p, _) => self.children[b].children[p].children.swap(i, j),
            NodePath::Root | NodePath::DefaultValue(..) => {}
        }
    }

    pub fn block_names(&self) -> impl Iterator<Item = &str> {
        self.children.iter().map(|b| b.name.as_str())
    }

    /// True if another block already uses `name`. `exclude` skips the block
    /// being renamed.
    pub fn block_name_exists(&self, name: &str, exclude: Option<usize>) -> bool {
        self.children
            .iter()
            .enumerate()
            .any(|(i, b)| Some(i) != exclude && b.name == name)
    }
}

// ---------------------------------------------------------------------------
// Field edits with coupled invariants
// ---------------------------------------------------------------------------

impl Block {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Change the strategy and pull `instance_count` into its new bounds.
    pub fn set_management_type(&mut self, management_type: ManagementType) {
        self.management_type = management_type;
        self.set_instance_count(self.instance_count);
    }

    /// Set `instance_count`, clamped into the bounds of the current strategy.
    pub fn set_instance_count(&mut self, count: i64) {
        let (min, max) = self.management_type.instance_bounds();
        self.instance_count = count.clamp(min, max);
    }
}

/// Outcome of storing a default value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DefaultEdit {
    /// Stored as given.
    Accepted,
    /// Out of range; the clamped value was stored instead.
    Clamped { original: Scalar },
    /// Wrong kind of number for the data type; stored as given.
    Mismatch,
}

/// Apply the storage policy to a value: mismatches are kept for the
/// validator to report, range overflows are saturated.
fn admit(value: Scalar, data_type: DataType) -> (Scalar, DefaultEdit) {
    if numeric::type_mismatch(value, data_type) {
        (value, DefaultEdit::Mismatch)
    } else if numeric::out_of_range(value, data_type) {
        (
            numeric::clamp(value, data_type),
            DefaultEdit::Clamped { original: value },
        )
    } else {
        (value, DefaultEdit::Accepted)
    }
}

impl Parameter {
    pub fn named(name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            name: name.into(),
            data_type,
            ..Self::default()
        }
    }

    /// Store one default value. Returns `None` if `index` is past the end of
    /// `default_value`.
    pub fn set_default(&mut self, index: usize, value: Scalar) -> Option<DefaultEdit> {
        let data_type = self.data_type;
        let slot = self.default_value.get_mut(index)?;
        let (stored, edit) = admit(value, data_type);
        if let DefaultEdit::Clamped { original } = edit {
            tracing::warn!(
                parameter = %self.name,
                index,
                %original,
                clamped = %stored,
                "default value clamped to {data_type} range"
            );
        }
        *slot = stored;
        Some(edit)
    }

    /// Parse editor text with a hint matching the data type, then store it.
    pub fn set_default_from_text(&mut self, index: usize, text: &str) -> Option<DefaultEdit> {
        let value = Scalar::parse_token(text, NumberHint::for_type(self.data_type));
        self.set_default(index, value)
    }

    /// Store the same value in every element.
    pub fn apply_default_to_all(&mut self, value: Scalar) -> DefaultEdit {
        let (stored, edit) = admit(value, self.data_type);
        for slot in &mut self.default_value {
            *slot = stored;
        }
        edit
    }

    /// Set the array length (at least 1), padding with zeros or dropping
    /// trailing elements. An array longer than the largest EEPROM is
    /// rejected and leaves the parameter unchanged.
    pub fn set_multiplicity(&mut self, multiplicity: i64) -> Result<()> {
        let n = multiplicity.max(1);
        let len = usize::try_from(n)
            .ok()
            .filter(|_| n <= MAX_MULTIPLICITY)
            .ok_or(ModelError::MultiplicityTooLarge {
                requested: multiplicity,
                max: MAX_MULTIPLICITY,
            })?;
        self.multiplicity = n;
        self.default_value.resize(len, Scalar::Int(0));
        Ok(())
    }

    /// Change the storage type. Float types cannot hold bitfields, so
    /// switching to one drops them.
    pub fn set_data_type(&mut self, data_type: DataType) {
        self.data_type = data_type;
        if data_type.is_float() && !self.children.is_empty() {
            tracing::debug!(
                parameter = %self.name,
                dropped = self.children.len(),
                "bitfields removed from float parameter"
            );
            self.children.clear();
        }
    }

    /// Sum of all bitfield widths.
    pub fn total_bitfield_bits(&self) -> i64 {
        self.children
            .iter()
            .fold(0, |total, f| total.saturating_add(f.size_in_bits))
    }
}

impl Bitfield {
    pub fn new(name: impl Into<String>, size_in_bits: i64) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            size_in_bits,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn model() -> DataModel {
        let mut param = Parameter::named("flags", DataType::Uint8);
        param.children = vec![Bitfield::new("a", 1), Bitfield::new("b", 2)];
        let mut cfg = Block::named("cfg");
        cfg.children = vec![param, Parameter::named("speed", DataType::Uint16)];
        DataModel {
            name: "demo".into(),
            children: vec![cfg, Block::named("calib"), Block::named("log")],
            ..DataModel::default()
        }
    }

    fn block_order(m: &DataModel) -> Vec<&str> {
        m.block_names().collect()
    }

    #[test]
    fn factory_defaults() {
        let p = Parameter::default();
        assert_eq!(p.data_type, DataType::Uint8);
        assert_eq!(p.multiplicity, 1);
        assert_eq!(p.default_value, vec![Scalar::Int(0)]);
        let b = Block::default();
        assert_eq!(b.instance_count, 1);
        assert!(b.compress_defaults);
        assert_eq!(Bitfield::default().size_in_bits, 1);
        assert_eq!(DataModel::default().checksum_size, 1);
    }

    #[test]
    fn resolve_paths() {
        let m = model();
        assert_eq!(m.node(&NodePath::Block(1)).unwrap().name(), "calib");
        assert_eq!(m.node(&NodePath::Bitfield(0, 0, 1)).unwrap().name(), "b");
        assert_eq!(m.node(&NodePath::Root).unwrap().kind(), "datamodel");
        assert!(m.node(&NodePath::Parameter(1, 0)).is_none());
        assert_eq!(m.node(&NodePath::DefaultValue(0, 1, 0)).unwrap().name(), "speed");
    }

    #[test]
    fn insert_preserves_order() {
        let mut m = model();
        let at = m
            .insert(NodePath::Root, 1, Node::Block(Block::named("new")))
            .unwrap();
        assert_eq!(at, NodePath::Block(1));
        assert_eq!(block_order(&m), ["cfg", "new", "calib", "log"]);

        let at = m
            .push(NodePath::Parameter(0, 0), Node::Bitfield(Bitfield::new("c", 1)))
            .unwrap();
        assert_eq!(at, NodePath::Bitfield(0, 0, 2));
    }

    #[test]
    fn insert_rejects_bad_targets() {
        let mut m = model();
        let err = m
            .insert(NodePath::Root, 0, Node::Parameter(Parameter::default()))
            .unwrap_err();
        assert!(matches!(err, ModelError::KindMismatch { child: "parameter", .. }));

        let err = m
            .insert(NodePath::Root, 9, Node::Block(Block::default()))
            .unwrap_err();
        assert!(matches!(err, ModelError::IndexOutOfRange { index: 9, len: 3, .. }));

        let err = m
            .insert(NodePath::Block(7), 0, Node::Parameter(Parameter::default()))
            .unwrap_err();
        assert!(matches!(err, ModelError::InvalidPath(NodePath::Block(7))));

        let err = m
            .insert(NodePath::Bitfield(0, 0, 0), 0, Node::Bitfield(Bitfield::default()))
            .unwrap_err();
        assert!(matches!(err, ModelError::InvalidPath(_)));
    }

    #[test]
    fn remove_returns_subtree() {
        let mut m = model();
        let removed = m.remove(NodePath::Block(0)).unwrap();
        match removed {
            Node::Block(b) => assert_eq!(b.children.len(), 2),
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(block_order(&m), ["calib", "log"]);
        assert!(m.remove(NodePath::Root).is_err());
        assert!(m.remove(NodePath::Block(5)).is_err());
    }

    #[test]
    fn move_at_edges_is_noop() {
        let mut m = model();
        assert_eq!(m.move_up(NodePath::Block(0)).unwrap(), None);
        assert_eq!(m.move_down(NodePath::Block(2)).unwrap(), None);
        assert_eq!(block_order(&m), ["cfg", "calib", "log"]);

        assert_eq!(m.move_down(NodePath::Block(0)).unwrap(), Some(NodePath::Block(1)));
        assert_eq!(block_order(&m), ["calib", "cfg", "log"]);
        assert_eq!(m.move_up(NodePath::Block(2)).unwrap(), Some(NodePath::Block(1)));
        assert_eq!(block_order(&m), ["calib", "log", "cfg"]);
    }

    #[test]
    fn move_bitfields() {
        let mut m = model();
        let moved = m.move_up(NodePath::Bitfield(2, 0, 1));
        assert!(moved.is_err());
        let moved = m.move_up(NodePath::Bitfield(0, 0, 1)).unwrap();
        assert_eq!(moved, Some(NodePath::Bitfield(0, 0, 0)));
        assert_eq!(m.bitfield(0, 0, 0).unwrap().name, "b");
    }

    #[test]
    fn name_lookup_excludes_self() {
        let m = model();
        assert!(m.block_name_exists("calib", None));
        assert!(!m.block_name_exists("calib", Some(1)));
        assert!(m.block_name_exists("calib", Some(0)));
        assert!(!m.block_name_exists("missing", None));
    }

    #[test]
    fn management_type_forces_instance_count() {
        let mut b = Block::default();
        b.set_management_type(ManagementType::BackupCopy);
        assert_eq!(b.instance_count, 2);
        b.set_management_type(ManagementType::WearLeveling);
        assert_eq!(b.instance_count, 2);
        b.set_instance_count(40);
        assert_eq!(b.instance_count, 15);
        b.set_management_type(ManagementType::MultiProfile);
        assert_eq!(b.instance_count, 15);
        b.set_management_type(ManagementType::Basic);
        assert_eq!(b.instance_count, 1);
        b.set_instance_count(3);
        assert_eq!(b.instance_count, 1);
    }

    #[test]
    fn default_edit_policy() {
        let mut p = Parameter::named("x", DataType::Int8);
        assert_eq!(p.set_default(0, Scalar::Int(-5)), Some(DefaultEdit::Accepted));
        assert_eq!(p.default_value[0], Scalar::Int(-5));

        let edit = p.set_default(0, Scalar::Int(300));
        assert_eq!(edit, Some(DefaultEdit::Clamped { original: Scalar::Int(300) }));
        assert_eq!(p.default_value[0], Scalar::Int(127));

        assert_eq!(p.set_default(0, Scalar::Float(1.5)), Some(DefaultEdit::Mismatch));
        assert_eq!(p.default_value[0], Scalar::Float(1.5));

        assert_eq!(p.set_default(3, Scalar::Int(0)), None);
    }

    #[test]
    fn default_from_text_uses_type_hint() {
        let mut p = Parameter::named("gain", DataType::Float32);
        assert_eq!(p.set_default_from_text(0, "2"), Some(DefaultEdit::Accepted));
        assert_eq!(p.default_value[0], Scalar::Float(2.0));
        assert_eq!(p.set_default_from_text(0, "nan"), Some(DefaultEdit::Accepted));
        assert!(p.default_value[0].is_nan());

        let mut q = Parameter::named("id", DataType::Uint64);
        let edit = q.set_default_from_text(0, "0xFFFFFFFFFFFFFFFF");
        assert_eq!(edit, Some(DefaultEdit::Accepted));
        assert_eq!(q.default_value[0], Scalar::Int(u64::MAX.into()));
    }

    #[test]
    fn apply_to_all_and_resize() {
        let mut p = Parameter::named("table", DataType::Uint8);
        p.set_multiplicity(4).unwrap();
        assert_eq!(p.default_value.len(), 4);
        let edit = p.apply_default_to_all(Scalar::Int(999));
        assert!(matches!(edit, DefaultEdit::Clamped { .. }));
        assert!(p.default_value.iter().all(|v| *v == Scalar::Int(255)));

        p.set_multiplicity(2).unwrap();
        assert_eq!(p.default_value, vec![Scalar::Int(255); 2]);
        p.set_multiplicity(-3).unwrap();
        assert_eq!(p.multiplicity, 1);
        assert_eq!(p.default_value.len(), 1);
    }

    #[test]
    fn decimal_text_default_follows_float_type() {
        let p: Parameter = serde_json::from_str(
            r#"{"name": "gain", "data_type": 8, "multiplicity": 3, "default_value": ["3", 4, "0x10"]}"#,
        )
        .unwrap();
        assert_eq!(
            p.default_value,
            vec![Scalar::Float(3.0), Scalar::Int(4), Scalar::Int(16)]
        );

        let q: Parameter =
            serde_json::from_str(r#"{"name": "count", "data_type": 2, "default_value": ["3"]}"#)
                .unwrap();
        assert_eq!(q.default_value, vec![Scalar::Int(3)]);

        let absent: Parameter = serde_json::from_str(r#"{"name": "x"}"#).unwrap();
        assert_eq!(absent.default_value, vec![Scalar::Int(0)]);
        let empty: Parameter = serde_json::from_str(r#"{"name": "x", "default_value": null}"#).unwrap();
        assert!(empty.default_value.is_empty());
    }

    #[test]
    fn oversized_multiplicity_is_rejected() {
        let mut p = Parameter::named("table", DataType::Uint16);
        p.set_multiplicity(3).unwrap();
        for huge in [i64::MAX, MAX_MULTIPLICITY + 1] {
            let err = p.set_multiplicity(huge).unwrap_err();
            assert!(matches!(err, ModelError::MultiplicityTooLarge { requested, .. } if requested == huge));
        }
        assert_eq!(p.multiplicity, 3);
        assert_eq!(p.default_value.len(), 3);
        p.set_multiplicity(MAX_MULTIPLICITY).unwrap();
        assert_eq!(p.default_value.len(), 65536);
    }

    #[test]
    fn float_type_drops_bitfields() {
        let mut m = model();
        let p = m.parameter_mut(0, 0).unwrap();
        assert_eq!(p.total_bitfield_bits(), 3);
        p.set_data_type(DataType::Uint32);
        assert_eq!(p.children.len(), 2);
        p.set_data_type(DataType::Float32);
        assert!(p.children.is_empty());
    }

    #[test]
    fn json_field_order_and_codes() {
        let mut b = Block::named("cfg");
        b.management_type = ManagementType::MultiProfile;
        b.instance_count = 3;
        let json = serde_json::to_string(&b).unwrap();
        assert_eq!(
            json,
            r#"{"name":"cfg","description":"","children":[],"management_type":2,"instance_count":3,"data_recovery_strategy":0,"compress_defaults":true}"#
        );
    }

    #[test]
    fn lenient_document() {
        let json = r#"{
            "name": "dm",
            "checksum_size": "0x2",
            "children": [{ "name": "b", "management_type": "1", "instance_count": 2,
                           "children": [{ "name": "p", "data_type": 6 }] }]
        }"#;
        let m: DataModel = serde_json::from_str(json).unwrap();
        assert_eq!(m.checksum_size, 2);
        assert_eq!(m.children[0].management_type, ManagementType::BackupCopy);
        let p = m.parameter(0, 0).unwrap();
        assert_eq!(p.data_type, DataType::Uint64);
        assert_eq!(p.default_value, vec![Scalar::Int(0)]);
        assert!(p.children.is_empty());
    }

    #[test]
    fn unknown_codes_fail() {
        let json = r#"{"checksum_size": 1, "children": [{"management_type": 7}]}"#;
        assert!(serde_json::from_str::<DataModel>(json).is_err());
        let json = r#"{"checksum_size": 1, "children": [{"data_recovery_strategy": 2}]}"#;
        assert!(serde_json::from_str::<DataModel>(json).is_err());
    }

    #[test]
    fn missing_checksum_size_reads_as_zero() {
        let m: DataModel = serde_json::from_str("{}").unwrap();
        assert_eq!(m.checksum_size, 0);
        assert!(m.children.is_empty());
    }
}
