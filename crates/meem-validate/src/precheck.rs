//! Minimal checks a freshly decoded document must pass before it replaces
//! the live one. Failing any of them aborts the load.

use meem_core::model::CHECKSUM_SIZES;
use meem_core::platform::MAX_PAGE_SIZE;
use meem_core::{DataModel, PlatformSettings};

/// Data model load invariants: a legal checksum size and at least one block.
pub fn check_data_model_load(dm: &DataModel) -> Result<(), Vec<String>> {
    let mut problems = Vec::new();
    if !CHECKSUM_SIZES.contains(&dm.checksum_size) {
        problems.push("checksum_size must be 1,2 or 4".to_string());
    }
    if dm.children.is_empty() {
        problems.push("datamodel must contain at least one block".to_string());
    }
    finish(problems)
}

/// Platform load invariants: the page size is usable for layout.
pub fn check_platform_load(ps: &PlatformSettings) -> Result<(), Vec<String>> {
    let size = ps.eeprom_page_size;
    let problem = if size < 0 {
        Some("eeprom_page_size invalid".to_string())
    } else if size == 1 {
        Some(format!(
            "eeprom_page_size of 1 is not allowed; must be 0 or a power of two >=2 up to {MAX_PAGE_SIZE}"
        ))
    } else if size != 0 && (size > MAX_PAGE_SIZE || size & (size - 1) != 0) {
        Some(format!(
            "eeprom_page_size must be 0 or a power of two (>=2) up to {MAX_PAGE_SIZE}"
        ))
    } else {
        None
    };
    finish(problem.into_iter().collect())
}

fn finish(problems: Vec<String>) -> Result<(), Vec<String>> {
    if problems.is_empty() {
        Ok(())
    } else {
        Err(problems)
    }
}
