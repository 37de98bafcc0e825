//! Rules for the data model tree.

use meem_core::ident::{duplicate_names, is_valid_identifier};
use meem_core::model::CHECKSUM_SIZES;
use meem_core::numeric::{out_of_range, type_mismatch};
use meem_core::{Bitfield, Block, DataModel, NodePath, Parameter};

use crate::report::Violation;

/// Check the whole tree, appending violations in tree order.
pub fn validate_data_model(dm: &DataModel, violations: &mut Vec<Violation>) {
    if !CHECKSUM_SIZES.contains(&dm.checksum_size) {
        violations.push(Violation::global("The checksum size can be: 1,2 or 4 bytes"));
    }
    if dm.children.is_empty() {
        violations.push(Violation::global(
            "The datamodel must contain at least one block!",
        ));
    }

    let duplicates = duplicate_names(dm.block_names());
    if !duplicates.is_empty() {
        violations.push(Violation::global(format!(
            "Found blocks with duplicate names: {}",
            duplicates.join(",")
        )));
    }

    for (b, block) in dm.children.iter().enumerate() {
        validate_block(block, NodePath::Block(b), violations);
        for (p, param) in block.children.iter().enumerate() {
            validate_parameter(block, param, (b, p), violations);
        }
    }
}

fn validate_block(block: &Block, path: NodePath, violations: &mut Vec<Violation>) {
    let name = &block.name;
    if !is_valid_identifier(name.trim()) {
        violations.push(Violation::at(path, format!("Block '{name}' has invalid name!")));
    }
    if !block.management_type.allows_instance_count(block.instance_count) {
        violations.push(Violation::at(
            path,
            format!(
                "Block '{name}' has invalid 'instance_count': {}",
                block.instance_count
            ),
        ));
    }
    if block.children.is_empty() {
        violations.push(Violation::at(
            path,
            format!("Block '{name}' must contain at least 1 parameter!"),
        ));
    }
    let duplicates = duplicate_names(block.children.iter().map(|p| p.name.as_str()));
    if !duplicates.is_empty() {
        violations.push(Violation::at(
            path,
            format!(
                "Block '{name}' contains parameters with duplicate names: {}",
                duplicates.join(",")
            ),
        ));
    }
}

fn validate_parameter(
    block: &Block,
    param: &Parameter,
    (b, p): (usize, usize),
    violations: &mut Vec<Violation>,
) {
    let path = NodePath::Parameter(b, p);
    let what = format!("Parameter '{}' in block '{}'", param.name, block.name);

    // Shape of the parameter itself
    if !is_valid_identifier(param.name.trim()) {
        violations.push(Violation::at(path, format!("{what} has invalid name!")));
    }
    let duplicates = duplicate_names(param.children.iter().map(|f| f.name.as_str()));
    if !duplicates.is_empty() {
        violations.push(Violation::at(
            path,
            format!(
                "{what} contains bitfields with duplicate names: {}",
                duplicates.join(",")
            ),
        ));
    }
    if param.multiplicity < 1 {
        violations.push(Violation::at(
            path,
            format!("{what} must have multiplicity of at least 1!"),
        ));
    }
    if i64::try_from(param.default_value.len()).ok() != Some(param.multiplicity) {
        violations.push(Violation::at(
            path,
            format!("{what} has count of default values, which differ from its multiplicity!"),
        ));
    }
    if !param.children.is_empty() && param.data_type.is_float() {
        violations.push(Violation::at(
            path,
            format!(
                "{what} must be integer. Floating point types can't be used as containers for bitfields!"
            ),
        ));
    }

    // Every default element, each check reported separately
    for (i, value) in param.default_value.iter().enumerate() {
        let at = NodePath::DefaultValue(b, p, i);
        if type_mismatch(*value, param.data_type) {
            violations.push(Violation::at(
                at,
                format!("{what} contains default values that don't match its data type!"),
            ));
        }
        if out_of_range(*value, param.data_type) {
            violations.push(Violation::at(
                at,
                format!("{what} has default values that are out of range"),
            ));
        }
    }

    // Bit packing capacity
    let capacity = i64::from(param.data_type.bit_size());
    if param.total_bitfield_bits() > capacity {
        violations.push(Violation::at(
            path,
            format!("{what}: total bitfield size exceeds parameter size"),
        ));
    }

    for (f, field) in param.children.iter().enumerate() {
        validate_bitfield(
            block,
            param,
            field,
            NodePath::Bitfield(b, p, f),
            capacity,
            violations,
        );
    }
}

fn validate_bitfield(
    block: &Block,
    param: &Parameter,
    field: &Bitfield,
    path: NodePath,
    capacity: i64,
    violations: &mut Vec<Violation>,
) {
    let what = format!(
        "Bitfield '{}' in parameter '{}' in block '{}'",
        field.name, param.name, block.name
    );
    if !is_valid_identifier(field.name.trim()) {
        violations.push(Violation::at(path, format!("{what} has invalid name!")));
    }
    if !(1..=capacity).contains(&field.size_in_bits) {
        violations.push(Violation::at(
            path,
            format!("{what} has invalid size: {} bits", field.size_in_bits),
        ));
    }
}
