//! Document model and numeric type system for mEEM storage configurations.
//!
//! An EEPROM-backed configuration store is described by three independent
//! documents:
//! - **Data model:** a tree of blocks, parameters and bitfields
//!   ([`DataModel`] → [`Block`] → [`Parameter`] → [`Bitfield`])
//! - **Platform settings:** target endianness, EEPROM geometry and compiler
//!   directives ([`PlatformSettings`])
//! - **Checksum settings:** algorithm name plus free-form tuning parameters
//!   ([`ChecksumSettings`])
//!
//! The tree holds no parent pointers. Positions are addressed with a
//! [`NodePath`] resolved from the root on every access.

pub mod checksum;
pub mod error;
pub mod ident;
pub mod lenient;
pub mod model;
pub mod numeric;
pub mod path;
pub mod platform;
pub mod value;

pub use checksum::{ChecksumKind, ChecksumParameter, ChecksumSettings, ChecksumValue};
pub use error::{ModelError, Result};
pub use model::{
    Bitfield, Block, DataModel, DataRecoveryStrategy, DefaultEdit, ManagementType, Node, NodeRef,
    Parameter,
};
pub use numeric::DataType;
pub use path::NodePath;
pub use platform::{
    CompilerDirectives, Endianness, PageAlignment, PlacementDirectives, PlatformSettings,
};
pub use value::{NumberHint, Radix, Scalar};
