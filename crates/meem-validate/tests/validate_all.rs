use meem_core::{
    Bitfield, Block, DataModel, DataType, ManagementType, NodePath, Parameter, PlatformSettings,
    Scalar,
};
use meem_validate::{validate_all, Violation};

fn param(name: &str) -> Parameter {
    Parameter::named(name, DataType::Uint8)
}

fn block(name: &str) -> Block {
    let mut b = Block::named(name);
    b.children.push(param("value"));
    b
}

fn model(blocks: Vec<Block>) -> DataModel {
    DataModel {
        name: "demo".into(),
        checksum_size: 2,
        children: blocks,
        ..DataModel::default()
    }
}

fn messages(violations: &[Violation]) -> Vec<&str> {
    violations.iter().map(|v| v.message.as_str()).collect()
}

#[test]
fn clean_model_has_no_violations() {
    let dm = model(vec![block("cfg"), block("calib")]);
    let ps = PlatformSettings::default();
    assert!(validate_all(Some(&dm), Some(&ps)).is_empty());
}

#[test]
fn missing_data_model_is_one_violation() {
    let v = validate_all(None, None);
    assert_eq!(v, vec![Violation::global("No datamodel defined")]);
}

#[test]
fn platform_rules_come_first() {
    let dm = model(vec![]);
    let mut ps = PlatformSettings::default();
    ps.eeprom_page_size = 3;
    let v = validate_all(Some(&dm), Some(&ps));
    assert_eq!(v.len(), 2);
    assert!(v[0].message.starts_with("EEPROM page size"));
    assert_eq!(v[1].message, "The datamodel must contain at least one block!");
}

#[test]
fn basic_block_requires_single_instance() {
    let mut dm = model(vec![block("a"), block("b")]);
    dm.children[1].instance_count = 2;
    let v = validate_all(Some(&dm), None);
    assert_eq!(v.len(), 1);
    assert_eq!(v[0].path, Some(NodePath::Block(1)));
    assert_eq!(v[0].message, "Block 'b' has invalid 'instance_count': 2");

    dm.children[1].instance_count = 1;
    assert!(validate_all(Some(&dm), None).is_empty());
}

#[test]
fn instance_counts_per_management_type() {
    let cases = [
        (ManagementType::BackupCopy, 2, true),
        (ManagementType::BackupCopy, 3, false),
        (ManagementType::MultiProfile, 2, true),
        (ManagementType::MultiProfile, 15, true),
        (ManagementType::MultiProfile, 16, false),
        (ManagementType::WearLeveling, 1, false),
    ];
    for (management_type, count, ok) in cases {
        let mut b = block("b");
        b.management_type = management_type;
        b.instance_count = count;
        let v = validate_all(Some(&model(vec![b])), None);
        assert_eq!(v.is_empty(), ok, "{management_type:?} x{count}");
    }
}

#[test]
fn bitfield_overflow_reported_at_parameter() {
    let mut b = block("cfg");
    b.children[0].children = vec![Bitfield::new("lo", 4), Bitfield::new("hi", 5)];
    let v = validate_all(Some(&model(vec![b])), None);
    assert_eq!(v.len(), 1);
    assert_eq!(v[0].path, Some(NodePath::Parameter(0, 0)));
    assert!(v[0]
        .message
        .ends_with("total bitfield size exceeds parameter size"));
}

#[test]
fn duplicate_blocks_reported_once() {
    let dm = model(vec![block("cfg"), block("cfg"), block("cfg")]);
    let v = validate_all(Some(&dm), None);
    assert_eq!(v.len(), 1);
    assert_eq!(v[0].path, None);
    assert_eq!(v[0].message, "Found blocks with duplicate names: cfg");
}

#[test]
fn default_value_checks_are_independent() {
    let mut p = Parameter::named("speed", DataType::Int8);
    p.set_multiplicity(3).unwrap();
    p.default_value = vec![Scalar::Int(1), Scalar::Float(1e300 + 0.5), Scalar::Float(f64::NAN)];
    let mut b = Block::named("cfg");
    b.children.push(p);
    let v = validate_all(Some(&model(vec![b])), None);

    // 1e300 is integral as a double, so it is only out of range. NaN is a
    // mismatch and truncates to 0, which is in range.
    assert_eq!(v.len(), 2);
    assert_eq!(v[0].path, Some(NodePath::DefaultValue(0, 0, 1)));
    assert!(v[0].message.ends_with("has default values that are out of range"));
    assert_eq!(v[1].path, Some(NodePath::DefaultValue(0, 0, 2)));
    assert!(v[1].message.contains("don't match its data type"));
}

#[test]
fn fraction_out_of_range_reports_both() {
    let mut p = Parameter::named("x", DataType::Uint8);
    p.default_value = vec![Scalar::Float(-1.5)];
    let mut b = Block::named("cfg");
    b.children.push(p);
    let v = validate_all(Some(&model(vec![b])), None);
    let at_value: Vec<_> = v
        .iter()
        .filter(|v| v.path == Some(NodePath::DefaultValue(0, 0, 0)))
        .collect();
    assert_eq!(at_value.len(), 2);
}

#[test]
fn parameter_shape_rules() {
    let mut p = Parameter::named("1st", DataType::Float32);
    p.multiplicity = 2;
    p.children = vec![Bitfield::new("f", 1), Bitfield::new("f", 1)];
    let mut b = Block::named("cfg");
    b.children.push(p);
    let v = validate_all(Some(&model(vec![b])), None);
    let msgs = messages(&v);
    assert!(msgs[0].ends_with("has invalid name!"));
    assert!(msgs[1].contains("bitfields with duplicate names: f"));
    assert!(msgs[2].contains("differ from its multiplicity"));
    assert!(msgs[3].contains("can't be used as containers for bitfields"));
}

#[test]
fn bitfield_size_bounds() {
    let mut p = Parameter::named("flags", DataType::Uint16);
    p.children = vec![Bitfield::new("zero", 0), Bitfield::new("wide", 17)];
    let mut b = Block::named("cfg");
    b.children.push(p);
    let v = validate_all(Some(&model(vec![b])), None);
    let sized: Vec<_> = v
        .iter()
        .filter(|v| v.message.contains("has invalid size"))
        .map(|v| v.path)
        .collect();
    assert_eq!(
        sized,
        vec![Some(NodePath::Bitfield(0, 0, 0)), Some(NodePath::Bitfield(0, 0, 1))]
    );
}

#[test]
fn empty_block_and_bad_checksum_size() {
    let mut dm = model(vec![Block::named("cfg")]);
    dm.checksum_size = 3;
    let v = validate_all(Some(&dm), None);
    assert_eq!(
        messages(&v),
        vec![
            "The checksum size can be: 1,2 or 4 bytes",
            "Block 'cfg' must contain at least 1 parameter!",
        ]
    );
}

#[test]
fn absent_children_fail_block_rule() {
    let dm: DataModel = serde_json::from_str(r#"{"name": "dm", "checksum_size": 1}"#).unwrap();
    let v = validate_all(Some(&dm), None);
    assert_eq!(
        messages(&v),
        vec!["The datamodel must contain at least one block!"]
    );
}

#[test]
fn validation_does_not_mutate() {
    let mut dm = model(vec![block("cfg")]);
    dm.children[0].children[0].default_value = vec![Scalar::Int(400)];
    let before = dm.clone();
    let v = validate_all(Some(&dm), None);
    assert_eq!(v.len(), 1);
    assert_eq!(dm, before);
}
