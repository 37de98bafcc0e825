use meem_codec::json::{decode_checksum, decode_data_model, encode_checksum, encode_data_model};
use meem_codec::{CodecError, Session};
use meem_core::{
    Block, ChecksumKind, ChecksumSettings, ChecksumValue, DataModel, DataType, Node, NodePath,
    PageAlignment, Parameter, Scalar,
};

fn model_with(param: Parameter) -> DataModel {
    let mut b = Block::named("cfg");
    b.children.push(param);
    DataModel {
        name: "dm".into(),
        checksum_size: 4,
        children: vec![b],
        ..DataModel::default()
    }
}

fn defaults_after_round_trip(data_type: DataType, values: Vec<Scalar>) -> Vec<Scalar> {
    let mut p = Parameter::named("p", data_type);
    p.set_multiplicity(values.len() as i64).unwrap();
    p.default_value = values;
    let text = encode_data_model(&model_with(p)).unwrap();
    let back = decode_data_model(&text).unwrap();
    back.children[0].children[0].default_value.clone()
}

#[test]
fn uint64_max_survives() {
    let max = Scalar::Int(u64::MAX.into());
    let back = defaults_after_round_trip(DataType::Uint64, vec![max]);
    assert_eq!(back, vec![max]);
}

#[test]
fn int64_extremes_survive() {
    let values = vec![Scalar::Int(i64::MIN.into()), Scalar::Int(i64::MAX.into())];
    let back = defaults_after_round_trip(DataType::Int64, values.clone());
    assert_eq!(back, values);
}

#[test]
fn nan_survives_as_nan() {
    let back = defaults_after_round_trip(DataType::Float64, vec![Scalar::Float(f64::NAN)]);
    assert!(back[0].is_nan());
}

#[test]
fn infinities_are_written_as_strings() {
    let mut p = Parameter::named("p", DataType::Float64);
    p.default_value = vec![Scalar::Float(f64::NEG_INFINITY)];
    let text = encode_data_model(&model_with(p)).unwrap();
    assert!(text.contains("\"-Infinity\""));
    let back = decode_data_model(&text).unwrap();
    assert_eq!(
        back.children[0].children[0].default_value,
        vec![Scalar::Float(f64::NEG_INFINITY)]
    );
}

#[test]
fn big_integers_written_as_decimal_strings() {
    let mut p = Parameter::named("p", DataType::Uint64);
    p.default_value = vec![Scalar::Int(u64::MAX.into())];
    let text = encode_data_model(&model_with(p)).unwrap();
    assert!(text.contains("\"18446744073709551615\""));
}

#[test]
fn hexadecimal_literals_accepted() {
    let text = r#"{
        "name": "dm",
        "checksum_size": "0x2",
        "children": [{
            "name": "cfg",
            "children": [{
                "name": "mask",
                "data_type": 6,
                "multiplicity": 2,
                "default_value": ["0xFFFFFFFFFFFFFFFF", "0x10"]
            }]
        }]
    }"#;
    let dm = decode_data_model(text).unwrap();
    assert_eq!(dm.checksum_size, 2);
    assert_eq!(
        dm.children[0].children[0].default_value,
        vec![Scalar::Int(u64::MAX.into()), Scalar::Int(16)]
    );
}

#[test]
fn float_default_from_decimal_text_reloads_as_float() {
    let text = r#"{
        "name": "dm",
        "checksum_size": 1,
        "children": [{
            "name": "cfg",
            "children": [{
                "name": "gain",
                "data_type": 8,
                "multiplicity": 1,
                "default_value": ["3"]
            }]
        }]
    }"#;
    let dm = decode_data_model(text).unwrap();
    assert_eq!(dm.children[0].children[0].default_value, vec![Scalar::Float(3.0)]);

    let saved = encode_data_model(&dm).unwrap();
    assert!(saved.contains("3.0"));
    let again = decode_data_model(&saved).unwrap();
    assert_eq!(again, dm);
}

#[test]
fn absent_children_is_a_precheck_failure_not_a_crash() {
    let err = decode_data_model(r#"{"name": "dm", "checksum_size": 1}"#).unwrap_err();
    assert!(matches!(err, CodecError::Precheck { .. }));
    assert!(err.to_string().contains("at least one block"));
}

#[test]
fn checksum_kinds_survive() {
    let mut cs = ChecksumSettings::default();
    *cs.add_parameter("init", ChecksumKind::Float).unwrap() = ChecksumValue::Float(0.0);
    *cs.add_parameter("poly", ChecksumKind::Integer).unwrap() =
        ChecksumValue::Integer(0xEDB8_8320);
    *cs.add_parameter("xorout", ChecksumKind::Integer).unwrap() =
        ChecksumValue::Integer(u64::MAX.into());
    cs.add_parameter("reflect", ChecksumKind::Boolean).unwrap();
    let back = decode_checksum(&encode_checksum(&cs).unwrap()).unwrap();
    assert_eq!(back, cs);
}

#[test]
fn wildcard_alignment_across_block_removal() {
    let mut s = Session::new();
    let dm = s.new_data_model();
    for name in ["a", "b"] {
        let mut b = Block::named(name);
        b.children.push(Parameter::default());
        dm.children.push(b);
    }
    s.new_platform();

    let saved = s.save_platform().unwrap();
    assert!(saved.contains("\"*\""));

    // An explicit list naming both blocks collapses to the wildcard
    s.platform_mut().unwrap().page_aligned_blocks =
        PageAlignment::Blocks(vec!["a".into(), "b".into()]);
    let saved = s.save_platform().unwrap();
    let back = meem_codec::json::decode_platform(&saved).unwrap();
    assert_eq!(back.page_aligned_blocks, PageAlignment::All);

    // A partial list loses the removed block without re-expanding
    s.insert(NodePath::Root, 2, Node::Block(Block::named("c")))
        .unwrap();
    s.remove(NodePath::Block(1)).unwrap();
    let saved = s.save_platform().unwrap();
    let back = meem_codec::json::decode_platform(&saved).unwrap();
    assert_eq!(back.page_aligned_blocks, PageAlignment::Blocks(vec!["a".into()]));
}

#[test]
fn session_files() {
    let dir = tempfile::tempdir().unwrap();
    let dm_path = dir.path().join("data_model.json");
    let ps_path = dir.path().join("platform_settings.json");
    let cs_path = dir.path().join("checksum_parameters.json");

    let mut s = Session::new();
    let dm = s.new_data_model();
    dm.name = "demo".into();
    let mut b = Block::named("cfg");
    b.children.push(Parameter::named("speed", DataType::Uint16));
    dm.children.push(b);
    s.new_platform().eeprom_page_size = 64;
    s.new_checksum().algo = "crc16".into();

    s.save_data_model_file(&dm_path).unwrap();
    s.save_platform_file(&ps_path).unwrap();
    s.save_checksum_file(&cs_path).unwrap();

    let mut loaded = Session::new();
    loaded.load_data_model_file(&dm_path).unwrap();
    loaded.load_platform_file(&ps_path).unwrap();
    loaded.load_checksum_file(&cs_path).unwrap();

    assert_eq!(loaded.data_model(), s.data_model());
    assert_eq!(loaded.platform(), s.platform());
    assert_eq!(loaded.checksum(), s.checksum());
    assert!(loaded.validate_all().is_empty());

    let missing = dir.path().join("nope.json");
    assert!(matches!(
        loaded.load_checksum_file(&missing),
        Err(CodecError::NotFound { .. })
    ));
    assert_eq!(loaded.checksum().map(|c| c.algo.as_str()), Some("crc16"));
}
