//! Name legality checks shared by the validator and the editor.

/// Longest accepted header file name.
pub const MAX_FILENAME_LEN: usize = 255;

/// True if `s` is a legal C identifier: `[A-Za-z_][A-Za-z0-9_]*`.
pub fn is_valid_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// True if `name` is usable as an `#include` target.
///
/// Whitespace, angle brackets and double quotes are ignored, so `<stdint.h>`
/// and `"board.h"` are both accepted.
pub fn is_valid_filename(name: &str) -> bool {
    if name.is_empty() || name.len() > MAX_FILENAME_LEN {
        return false;
    }
    let stripped: String = name
        .trim()
        .chars()
        .filter(|c| !matches!(c, '<' | '>' | ' ' | '"'))
        .collect();
    !stripped.is_empty()
        && stripped
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
}

/// Coerce arbitrary text into a legal C identifier.
///
/// Illegal characters become `_`; a name that does not start with a letter or
/// underscore gets a single leading `_`.
pub fn normalize_name(s: &str) -> String {
    let replaced: String = s
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect();
    match replaced.chars().next() {
        None => replaced,
        Some(c) if c.is_ascii_alphabetic() || c == '_' => replaced,
        Some(_) => format!("_{}", replaced.trim_start_matches('_')),
    }
}

/// Names that occur more than once, in order of their first repetition.
pub fn duplicate_names<'a>(names: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    let mut duplicates: Vec<String> = Vec::new();
    for name in names {
        if !seen.insert(name) && !duplicates.iter().any(|d| d == name) {
            duplicates.push(name.to_string());
        }
    }
    duplicates
}

/// True if the optional text is present and non-empty.
pub fn is_set(value: &Option<String>) -> bool {
    value.as_deref().is_some_and(|s| !s.is_empty())
}
