//! JSON interchange for the three documents.
//!
//! Output is pretty-printed with a 4-space indent. Integers beyond 2^53 - 1
//! and NaN/infinities are written as strings so a reader limited to doubles
//! still round-trips them; the decoders read those strings back as numbers.

use std::path::Path;

use serde::Serialize;
use serde_json::Value;

use meem_core::lenient::Integer;
use meem_core::{ChecksumSettings, DataModel, PlatformSettings};
use meem_validate::precheck;

use crate::error::{CodecError, DocumentKind, Result};

/// Pretty-print a document.
pub fn encode<T: Serialize>(document: DocumentKind, value: &T) -> Result<String> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
    value
        .serialize(&mut ser)
        .map_err(|source| CodecError::Serialize { document, source })?;
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

pub fn encode_data_model(dm: &DataModel) -> Result<String> {
    encode(DocumentKind::DataModel, dm)
}

/// Encode platform settings as they are. Page-alignment resolution is the
/// caller's job (see [`crate::align`]).
pub fn encode_platform(ps: &PlatformSettings) -> Result<String> {
    encode(DocumentKind::Platform, ps)
}

pub fn encode_checksum(cs: &ChecksumSettings) -> Result<String> {
    encode(DocumentKind::Checksum, cs)
}

/// Decode a data model and run its load precheck.
pub fn decode_data_model(text: &str) -> Result<DataModel> {
    let document = DocumentKind::DataModel;
    let dm: DataModel =
        serde_json::from_str(text).map_err(|source| CodecError::Malformed { document, source })?;
    precheck::check_data_model_load(&dm).map_err(|p| CodecError::precheck(document, p))?;
    tracing::debug!(name = %dm.name, blocks = dm.children.len(), "decoded data model");
    Ok(dm)
}

/// Decode platform settings and run their load precheck.
pub fn decode_platform(text: &str) -> Result<PlatformSettings> {
    let document = DocumentKind::Platform;
    let value: Value =
        serde_json::from_str(text).map_err(|source| CodecError::Malformed { document, source })?;
    if let Some(problem) = platform_shape_problem(&value) {
        return Err(CodecError::precheck(document, vec![problem]));
    }
    let ps: PlatformSettings = serde_json::from_value(value)
        .map_err(|source| CodecError::Malformed { document, source })?;
    precheck::check_platform_load(&ps).map_err(|p| CodecError::precheck(document, p))?;
    tracing::debug!(page_size = ps.eeprom_page_size, "decoded platform settings");
    Ok(ps)
}

fn platform_shape_problem(value: &Value) -> Option<String> {
    let Some(object) = value.as_object() else {
        return Some("platform settings must be a JSON object".into());
    };
    match object.get("eeprom_page_size") {
        None | Some(Value::Null) => Some("eeprom_page_size must be a number".into()),
        Some(v) if serde_json::from_value::<Integer>(v.clone()).is_err() => {
            Some("eeprom_page_size must be a number".into())
        }
        Some(_) => None,
    }
}

/// Decode checksum settings. Parameter order follows the text.
pub fn decode_checksum(text: &str) -> Result<ChecksumSettings> {
    let document = DocumentKind::Checksum;
    let value: Value =
        serde_json::from_str(text).map_err(|source| CodecError::Malformed { document, source })?;
    let has_algo = value
        .as_object()
        .and_then(|o| o.get("algo"))
        .is_some_and(Value::is_string);
    if !has_algo {
        return Err(CodecError::precheck(
            document,
            vec!["checksum settings must be an object with a string 'algo'".into()],
        ));
    }
    let cs: ChecksumSettings =
        serde_json::from_str(text).map_err(|source| CodecError::Malformed { document, source })?;
    tracing::debug!(algo = %cs.algo, parameters = cs.parameters.len(), "decoded checksum settings");
    Ok(cs)
}

/// Read a document file.
pub fn read_document(path: &Path) -> Result<String> {
    if !path.exists() {
        return Err(CodecError::NotFound {
            path: path.to_path_buf(),
        });
    }
    Ok(std::fs::read_to_string(path)?)
}

/// Write a document file, replacing any existing one.
pub fn write_document(path: &Path, text: &str) -> Result<()> {
    std::fs::write(path, text)?;
    tracing::debug!(path = %path.display(), bytes = text.len(), "wrote document");
    Ok(())
}
