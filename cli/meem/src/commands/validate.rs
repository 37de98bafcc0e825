//! `meem validate`: run the structural validator over the loaded documents.

use anyhow::{bail, Context, Result};
use meem_codec::Session;
use meem_validate::Violation;

/// Print every violation and fail if there is at least one.
pub fn run(session: &Session, format: Option<&str>) -> Result<()> {
    let violations = session.validate_all();

    match format {
        Some("json") => {
            let json = serde_json::to_string_pretty(&violations)
                .context("serializing violations")?;
            println!("{json}");
        }
        None | Some("human") => print!("{}", render_human(&violations)),
        Some(other) => bail!("unknown format '{other}' (expected human or json)"),
    }

    if !violations.is_empty() {
        bail!("{} violation(s) found", violations.len());
    }
    Ok(())
}

pub(crate) fn render_human(violations: &[Violation]) -> String {
    if violations.is_empty() {
        return "No violations found.\n".to_string();
    }
    let mut out = String::new();
    for v in violations {
        out.push_str(&format!("  - {v}\n"));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use meem_core::NodePath;

    #[test]
    fn human_lists_paths() {
        let out = render_human(&[
            Violation::global("No datamodel defined"),
            Violation::at(NodePath::Block(2), "Block 'x' must contain at least 1 parameter!"),
        ]);
        assert_eq!(
            out,
            "  - No datamodel defined\n  - [2]: Block 'x' must contain at least 1 parameter!\n"
        );
        assert_eq!(render_human(&[]), "No violations found.\n");
    }

    #[test]
    fn empty_session_fails() {
        let err = run(&Session::new(), None).unwrap_err();
        assert_eq!(err.to_string(), "1 violation(s) found");
    }

    #[test]
    fn unknown_format_is_rejected() {
        let session = crate::commands::init::template_session("ok");
        assert!(run(&session, Some("json")).is_ok());
        let err = run(&session, Some("xml")).unwrap_err();
        assert!(err.to_string().contains("unknown format"));
    }
}
