//! `meem tree`: print the data model with the index path of every node.

use anyhow::Result;
use meem_codec::{CodecError, DocumentKind, Session};
use meem_core::{DataModel, NodePath, Radix};

pub fn run(session: &Session, hex: bool) -> Result<()> {
    let dm = session
        .data_model()
        .ok_or(CodecError::Missing(DocumentKind::DataModel))?;
    let radix = if hex { Radix::Hex } else { Radix::Decimal };
    print!("{}", render(dm, radix));
    Ok(())
}

pub(crate) fn render(dm: &DataModel, radix: Radix) -> String {
    let mut out = format!(
        "{} '{}' (checksum {} byte(s))\n",
        NodePath::Root,
        dm.name,
        dm.checksum_size
    );
    for (b, block) in dm.children.iter().enumerate() {
        out.push_str(&format!(
            "  {} block '{}' {} x{}\n",
            NodePath::Block(b),
            block.name,
            block.management_type.label(),
            block.instance_count
        ));
        for (p, param) in block.children.iter().enumerate() {
            let defaults: Vec<String> = param
                .default_value
                .iter()
                .map(|v| v.format(param.data_type, radix))
                .collect();
            out.push_str(&format!(
                "    {} parameter '{}' {}[{}] = [{}]\n",
                NodePath::Parameter(b, p),
                param.name,
                param.data_type,
                param.multiplicity,
                defaults.join(", ")
            ));
            for (f, field) in param.children.iter().enumerate() {
                out.push_str(&format!(
                    "      {} bitfield '{}' {} bit(s)\n",
                    NodePath::Bitfield(b, p, f),
                    field.name,
                    field.size_in_bits
                ));
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use meem_core::{Bitfield, Block, DataType, Parameter, Scalar};

    fn model() -> DataModel {
        let mut param = Parameter::named("flags", DataType::Int8);
        param.default_value = vec![Scalar::Int(-1)];
        param.children.push(Bitfield::new("ready", 1));
        let mut block = Block::named("cfg");
        block.children.push(param);
        DataModel {
            name: "dm".into(),
            children: vec![block],
            ..DataModel::default()
        }
    }

    #[test]
    fn renders_paths_and_defaults() {
        let text = render(&model(), Radix::Decimal);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "[] 'dm' (checksum 1 byte(s))");
        assert!(lines[1].starts_with("  [0] block 'cfg'"));
        assert_eq!(lines[2], "    [0, 0] parameter 'flags' int8[1] = [-1]");
        assert_eq!(lines[3], "      [0, 0, 0] bitfield 'ready' 1 bit(s)");
    }

    #[test]
    fn hex_uses_type_width() {
        let text = render(&model(), Radix::Hex);
        assert!(text.contains("int8[1] = [0xFF]"));
    }

    #[test]
    fn needs_a_model() {
        assert!(run(&Session::new(), false).is_err());
    }
}
