//! `meem fmt`: rewrite documents in canonical form.

use std::fs;

use anyhow::{bail, Context, Result};
use meem_codec::Session;

use super::{canonical_text, DocumentPaths, DOCUMENT_KINDS};

/// Re-save every loaded document. With `check`, nothing is written and the
/// command fails if any file would change.
pub fn run(session: &Session, paths: &DocumentPaths, check: bool) -> Result<()> {
    let mut changed = Vec::new();

    for kind in DOCUMENT_KINDS {
        let Some(text) = canonical_text(session, kind)? else {
            continue;
        };
        let path = paths.get(kind);
        let current = fs::read_to_string(path).unwrap_or_default();
        if current == text {
            continue;
        }
        if !check {
            fs::write(path, &text).with_context(|| format!("writing {}", path.display()))?;
            println!("Formatted {}", path.display());
        }
        changed.push(path.display().to_string());
    }

    if check && !changed.is_empty() {
        for path in &changed {
            println!("Would reformat {path}");
        }
        bail!("{} document(s) not in canonical form", changed.len());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::{load_session, Overrides};

    const COMPACT_MODEL: &str = r#"{"name":"dm","description":"","checksum_size":"2",
        "children":[{"name":"cfg","children":[{"name":"x","data_type":0,"multiplicity":1,
        "default_value":["0x10"]}]}]}"#;

    #[test]
    fn check_then_rewrite() {
        let dir = tempfile::tempdir().unwrap();
        let dm_path = dir.path().join("data_model.json");
        fs::write(&dm_path, COMPACT_MODEL).unwrap();
        let paths = DocumentPaths::resolve(dir.path(), None, &Overrides::default());
        let session = load_session(&paths).unwrap();

        let err = run(&session, &paths, true).unwrap_err();
        assert!(err.to_string().contains("1 document(s)"));
        assert_eq!(fs::read_to_string(&dm_path).unwrap(), COMPACT_MODEL);

        run(&session, &paths, false).unwrap();
        let text = fs::read_to_string(&dm_path).unwrap();
        assert!(text.contains("\n    \"checksum_size\": 2,"));
        assert!(text.contains("16"));

        let session = load_session(&paths).unwrap();
        run(&session, &paths, true).unwrap();
    }

    #[test]
    fn absent_documents_are_not_created() {
        let dir = tempfile::tempdir().unwrap();
        let paths = DocumentPaths::resolve(dir.path(), None, &Overrides::default());
        run(&Session::new(), &paths, false).unwrap();
        assert!(!paths.platform.exists());
    }
}
