//! An editing session owning the three documents.
//!
//! Loads are all-or-nothing: the new document replaces the current one only
//! after it decoded and passed its load precheck.

use std::path::Path;

use meem_core::{ChecksumSettings, DataModel, Node, NodePath, PlatformSettings};
use meem_validate::Violation;

use crate::align::resolve_page_alignment;
use crate::error::{CodecError, DocumentKind, Result};
use crate::json;

#[derive(Debug, Clone, Default)]
pub struct Session {
    data_model: Option<DataModel>,
    platform: Option<PlatformSettings>,
    checksum: Option<ChecksumSettings>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn data_model(&self) -> Option<&DataModel> {
        self.data_model.as_ref()
    }

    pub fn data_model_mut(&mut self) -> Option<&mut DataModel> {
        self.data_model.as_mut()
    }

    pub fn platform(&self) -> Option<&PlatformSettings> {
        self.platform.as_ref()
    }

    pub fn platform_mut(&mut self) -> Option<&mut PlatformSettings> {
        self.platform.as_mut()
    }

    pub fn checksum(&self) -> Option<&ChecksumSettings> {
        self.checksum.as_ref()
    }

    pub fn checksum_mut(&mut self) -> Option<&mut ChecksumSettings> {
        self.checksum.as_mut()
    }

    /// Replace the data model with an empty one.
    pub fn new_data_model(&mut self) -> &mut DataModel {
        self.data_model.insert(DataModel::default())
    }

    /// Replace the platform settings with the defaults.
    pub fn new_platform(&mut self) -> &mut PlatformSettings {
        self.platform.insert(PlatformSettings::default())
    }

    /// Replace the checksum settings with the defaults.
    pub fn new_checksum(&mut self) -> &mut ChecksumSettings {
        self.checksum.insert(ChecksumSettings::default())
    }

    // -- Loading ------------------------------------------------------------

    pub fn load_data_model(&mut self, text: &str) -> Result<()> {
        self.data_model = Some(json::decode_data_model(text)?);
        Ok(())
    }

    pub fn load_platform(&mut self, text: &str) -> Result<()> {
        self.platform = Some(json::decode_platform(text)?);
        Ok(())
    }

    pub fn load_checksum(&mut self, text: &str) -> Result<()> {
        self.checksum = Some(json::decode_checksum(text)?);
        Ok(())
    }

    pub fn load_data_model_file(&mut self, path: &Path) -> Result<()> {
        let text = json::read_document(path)?;
        self.load_data_model(&text)
    }

    pub fn load_platform_file(&mut self, path: &Path) -> Result<()> {
        let text = json::read_document(path)?;
        self.load_platform(&text)
    }

    pub fn load_checksum_file(&mut self, path: &Path) -> Result<()> {
        let text = json::read_document(path)?;
        self.load_checksum(&text)
    }

    // -- Saving -------------------------------------------------------------

    pub fn save_data_model(&self) -> Result<String> {
        let dm = self
            .data_model
            .as_ref()
            .ok_or(CodecError::Missing(DocumentKind::DataModel))?;
        json::encode_data_model(dm)
    }

    /// Encode the platform settings with `page_aligned_blocks` resolved
    /// against the current blocks. The in-memory settings keep whatever
    /// form the editor left them in.
    pub fn save_platform(&self) -> Result<String> {
        let ps = self
            .platform
            .as_ref()
            .ok_or(CodecError::Missing(DocumentKind::Platform))?;
        let mut copy = ps.clone();
        if let Some(dm) = &self.data_model {
            copy.page_aligned_blocks = resolve_page_alignment(&ps.page_aligned_blocks, dm.block_names());
        }
        json::encode_platform(&copy)
    }

    pub fn save_checksum(&self) -> Result<String> {
        let cs = self
            .checksum
            .as_ref()
            .ok_or(CodecError::Missing(DocumentKind::Checksum))?;
        json::encode_checksum(cs)
    }

    pub fn save_data_model_file(&self, path: &Path) -> Result<()> {
        json::write_document(path, &self.save_data_model()?)
    }

    pub fn save_platform_file(&self, path: &Path) -> Result<()> {
        json::write_document(path, &self.save_platform()?)
    }

    pub fn save_checksum_file(&self, path: &Path) -> Result<()> {
        json::write_document(path, &self.save_checksum()?)
    }

    // -- Validation and tree edits -----------------------------------------

    pub fn validate_all(&self) -> Vec<Violation> {
        meem_validate::validate_all(self.data_model.as_ref(), self.platform.as_ref())
    }

    fn model_mut(&mut self) -> Result<&mut DataModel> {
        self.data_model
            .as_mut()
            .ok_or(CodecError::Missing(DocumentKind::DataModel))
    }

    pub fn insert(&mut self, parent: NodePath, index: usize, node: Node) -> Result<NodePath> {
        Ok(self.model_mut()?.insert(parent, index, node)?)
    }

    pub fn push(&mut self, parent: NodePath, node: Node) -> Result<NodePath> {
        Ok(self.model_mut()?.push(parent, node)?)
    }

    /// Remove a subtree. Placement overrides keyed by a removed block's name
    /// stay in the platform settings, so renaming a block back restores them.
    pub fn remove(&mut self, path: NodePath) -> Result<Node> {
        let removed = self.model_mut()?.remove(path)?;
        if let (Node::Block(block), Some(ps)) = (&removed, &self.platform) {
            if ps
                .compiler_directives
                .block_placement_directives
                .contains_key(&block.name)
            {
                tracing::debug!(block = %block.name, "placement override left for removed block");
            }
        }
        Ok(removed)
    }

    pub fn move_up(&mut self, path: NodePath) -> Result<Option<NodePath>> {
        Ok(self.model_mut()?.move_up(path)?)
    }

    pub fn move_down(&mut self, path: NodePath) -> Result<Option<NodePath>> {
        Ok(self.model_mut()?.move_down(path)?)
    }
}
