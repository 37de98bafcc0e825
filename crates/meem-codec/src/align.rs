//! Save-time resolution of `page_aligned_blocks` against the current
//! block names.

use meem_core::PageAlignment;

/// Resolve the wildcard, drop names of blocks that no longer exist, and
/// collapse back to the wildcard when every block is aligned.
///
/// With no named blocks there is nothing to resolve against and the value
/// is returned unchanged. The result is a fixed point: resolving it again
/// against the same names yields the same value.
pub fn resolve_page_alignment<'a>(
    alignment: &PageAlignment,
    block_names: impl IntoIterator<Item = &'a str>,
) -> PageAlignment {
    let mut current: Vec<&str> = Vec::new();
    for name in block_names {
        if !name.is_empty() && !current.contains(&name) {
            current.push(name);
        }
    }
    if current.is_empty() {
        return alignment.clone();
    }

    let aligned: Vec<&str> = match alignment {
        PageAlignment::All => current.clone(),
        PageAlignment::Blocks(names) => {
            let mut kept: Vec<&str> = Vec::new();
            for name in names {
                if current.contains(&name.as_str()) && !kept.contains(&name.as_str()) {
                    kept.push(name.as_str());
                }
            }
            kept
        }
    };

    let resolved = if aligned.len() == current.len() {
        PageAlignment::All
    } else {
        PageAlignment::Blocks(aligned.into_iter().map(String::from).collect())
    };
    if resolved != *alignment {
        tracing::debug!(from = ?alignment, to = ?resolved, "resolved page alignment");
    }
    resolved
}
