//! Rules for the platform settings document.

use meem_core::ident::{is_set, is_valid_filename, is_valid_identifier};
use meem_core::platform::{is_valid_page_size, MAX_EEPROM_SIZE, MIN_EEPROM_SIZE};
use meem_core::{PlacementDirectives, PlatformSettings};

use crate::report::Violation;

/// Check platform settings, appending one violation per broken rule.
/// Platform violations carry no tree path.
pub fn validate_platform(ps: &PlatformSettings, violations: &mut Vec<Violation>) {
    // 1. Page size is 0 or a power of two in [2, 32768]
    if !is_valid_page_size(ps.eeprom_page_size) {
        violations.push(Violation::global(format!(
            "EEPROM page size should be 0 or positive power of 2 up to 32768: {}",
            ps.eeprom_page_size
        )));
    }

    // 2. EEPROM size within the supported range
    if !(MIN_EEPROM_SIZE..=MAX_EEPROM_SIZE).contains(&ps.eeprom_size) {
        violations.push(Violation::global(format!(
            "EEPROM size must be between {MIN_EEPROM_SIZE} and {MAX_EEPROM_SIZE} bytes: {}",
            ps.eeprom_size
        )));
    }

    // 3. Header names usable in #include
    if ps.external_headers.iter().any(|h| !is_valid_filename(h)) {
        violations.push(Violation::global(
            "Some external headers have invalid file name",
        ));
    }

    // 4. Critical section hooks are C identifiers when set
    for (field, value) in [
        (
            "enter_critical_section_operation",
            &ps.enter_critical_section_operation,
        ),
        (
            "exit_critical_section_operation",
            &ps.exit_critical_section_operation,
        ),
    ] {
        if is_set(value) && !value.as_deref().is_some_and(is_valid_identifier) {
            violations.push(Violation::global(format!(
                "'{field}' is not a valid C-language identifier"
            )));
        }
    }

    // 5. Pack attribute and pack directives are exclusive
    let cd = &ps.compiler_directives;
    if cd.pack_conflict() {
        violations.push(Violation::global(
            "You cannot have both compiler pack directive and attr defined at the same time",
        ));
    }

    // 6. Placement: directive or attribute, never both
    placement_conflicts(None, &cd.placement, violations);
    for (block, placement) in &cd.block_placement_directives {
        placement_conflicts(Some(block), placement, violations);
    }
}

fn placement_conflicts(
    block: Option<&str>,
    placement: &PlacementDirectives,
    violations: &mut Vec<Violation>,
) {
    let prefix = block.map(|b| format!("Block '{b}': ")).unwrap_or_default();
    for (object, conflict) in [
        ("defaults", placement.defaults_conflict()),
        ("cache", placement.cache_conflict()),
    ] {
        if conflict {
            violations.push(Violation::global(format!(
                "{prefix}You cannot have both placement directive and attribute for {object} defined at the same time"
            )));
        }
    }
}
