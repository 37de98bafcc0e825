//! Platform settings: target byte order, EEPROM geometry and compiler
//! directives.
//!
//! Block names are referenced by string only. A name that no longer exists
//! in the data model is inert.

use std::collections::BTreeMap;

use serde::de::Deserializer;
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};

use crate::ident::is_set;
use crate::lenient;

/// Wildcard entry in `page_aligned_blocks`.
pub const ALL_BLOCKS: &str = "*";

/// Smallest and largest accepted EEPROM sizes in bytes.
pub const MIN_EEPROM_SIZE: i64 = 64;
pub const MAX_EEPROM_SIZE: i64 = 65536;

/// Largest accepted EEPROM page size in bytes.
pub const MAX_PAGE_SIZE: i64 = 32768;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Endianness {
    #[default]
    Little,
    Big,
}

/// Blocks that must start on a page boundary.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum PageAlignment {
    /// Every block, including ones added later.
    #[default]
    All,
    /// Only the named blocks.
    Blocks(Vec<String>),
}

impl PageAlignment {
    pub fn is_aligned(&self, block_name: &str) -> bool {
        match self {
            PageAlignment::All => true,
            PageAlignment::Blocks(names) => names.iter().any(|n| n == block_name),
        }
    }

    /// Entries as written to a document.
    pub fn entries(&self) -> Vec<String> {
        match self {
            PageAlignment::All => vec![ALL_BLOCKS.to_string()],
            PageAlignment::Blocks(names) => names.clone(),
        }
    }
}

impl From<Vec<String>> for PageAlignment {
    /// Any wildcard entry makes the whole list a wildcard.
    fn from(names: Vec<String>) -> Self {
        if names.iter().any(|n| n == ALL_BLOCKS) {
            PageAlignment::All
        } else {
            PageAlignment::Blocks(names)
        }
    }
}

impl Serialize for PageAlignment {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.entries().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for PageAlignment {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        lenient::list::<D, String>(deserializer).map(PageAlignment::from)
    }
}

/// Placement of the generated `defaults` and `cache` objects. For each
/// object either a directive or an attribute may be given, not both.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PlacementDirectives {
    pub directive_for_defaults: Option<String>,
    pub attribute_for_defaults: Option<String>,
    pub directive_for_cache: Option<String>,
    pub attribute_for_cache: Option<String>,
}

impl PlacementDirectives {
    pub fn defaults_conflict(&self) -> bool {
        is_set(&self.directive_for_defaults) && is_set(&self.attribute_for_defaults)
    }

    pub fn cache_conflict(&self) -> bool {
        is_set(&self.directive_for_cache) && is_set(&self.attribute_for_cache)
    }

    pub fn is_empty(&self) -> bool {
        !is_set(&self.directive_for_defaults)
            && !is_set(&self.attribute_for_defaults)
            && !is_set(&self.directive_for_cache)
            && !is_set(&self.attribute_for_cache)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CompilerDirectives {
    pub opening_pack_directive: Option<String>,
    pub closing_pack_directive: Option<String>,
    pub pack_attribute: Option<String>,
    /// Platform-wide placement, used for blocks without an override.
    #[serde(flatten)]
    pub placement: PlacementDirectives,
    /// Per-block placement overrides keyed by block name.
    #[serde(deserialize_with = "null_as_empty_map")]
    pub block_placement_directives: BTreeMap<String, PlacementDirectives>,
}

impl CompilerDirectives {
    /// True if an attribute and either pack directive are both set.
    pub fn pack_conflict(&self) -> bool {
        is_set(&self.pack_attribute)
            && (is_set(&self.opening_pack_directive) || is_set(&self.closing_pack_directive))
    }

    /// Placement override for `block`, created empty if absent.
    pub fn block_placement_mut(&mut self, block: &str) -> &mut PlacementDirectives {
        self.block_placement_directives
            .entry(block.to_string())
            .or_default()
    }

    /// Effective placement for `block`.
    pub fn placement_for(&self, block: &str) -> &PlacementDirectives {
        self.block_placement_directives
            .get(block)
            .unwrap_or(&self.placement)
    }
}

fn null_as_empty_map<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<BTreeMap<String, PlacementDirectives>, D::Error> {
    Ok(Option::deserialize(deserializer)?.unwrap_or_default())
}

/// Target platform description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformSettings {
    #[serde(default)]
    pub endianness: Endianness,
    #[serde(default = "default_eeprom_size", deserialize_with = "lenient::int")]
    pub eeprom_size: i64,
    /// 0 when the EEPROM has no pages.
    #[serde(deserialize_with = "lenient::int")]
    pub eeprom_page_size: i64,
    #[serde(default)]
    pub page_aligned_blocks: PageAlignment,
    #[serde(default, deserialize_with = "lenient::list")]
    pub external_headers: Vec<String>,
    #[serde(default)]
    pub enter_critical_section_operation: Option<String>,
    #[serde(default)]
    pub exit_critical_section_operation: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub compiler_directives: CompilerDirectives,
}

fn default_eeprom_size() -> i64 {
    256
}

fn null_as_default<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<CompilerDirectives, D::Error> {
    Ok(Option::deserialize(deserializer)?.unwrap_or_default())
}

impl Default for PlatformSettings {
    fn default() -> Self {
        Self {
            endianness: Endianness::Little,
            eeprom_size: default_eeprom_size(),
            eeprom_page_size: 0,
            page_aligned_blocks: PageAlignment::All,
            external_headers: Vec::new(),
            enter_critical_section_operation: None,
            exit_critical_section_operation: None,
            compiler_directives: CompilerDirectives::default(),
        }
    }
}

/// Power of two in `[2, MAX_PAGE_SIZE]`, or 0.
pub fn is_valid_page_size(size: i64) -> bool {
    size == 0 || ((2..=MAX_PAGE_SIZE).contains(&size) && size & (size - 1) == 0)
}
