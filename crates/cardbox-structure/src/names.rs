//! Node name validation.
//!
//! Node names double as directory names in the filesystem index, so they
//! follow the rules that keep a name a single, portable path component:
//! - Must be non-empty
//! - Must not be `.` or `..`
//! - Must not contain `/`, `\` or control characters
//! - Must not be the reserved metadata file name [`NODE_FILE`], in any case
//!
//! Siblings must also differ by more than case, since a case-insensitive
//! filesystem would map them onto one directory. See [`validate_sibling`].

use crate::error::{StructureError, StructureResult};
use crate::path::StructurePath;

/// Name of the per-node metadata file in the filesystem index.
pub const NODE_FILE: &str = "node.json";

/// Characters that are forbidden anywhere in a node name.
const FORBIDDEN_CHARS: &[char] = &['/', '\\'];

fn invalid(name: &str, reason: impl Into<String>) -> StructureError {
    StructureError::InvalidName {
        name: name.to_string(),
        reason: reason.into(),
    }
}

/// Validate a node name, returning `Ok(())` if valid.
///
/// # Examples
///
/// ```
/// use cardbox_structure::names::validate_node_name;
///
/// assert!(validate_node_name("Aff case").is_ok());
/// assert!(validate_node_name("").is_err());
/// assert!(validate_node_name("a/b").is_err());
/// ```
pub fn validate_node_name(name: &str) -> StructureResult<()> {
    if name.is_empty() {
        return Err(invalid(name, "node name must not be empty"));
    }
    if name == "." || name == ".." {
        return Err(invalid(name, "node name must not be '.' or '..'"));
    }
    if let Some(ch) = name.chars().find(|c| FORBIDDEN_CHARS.contains(c)) {
        return Err(invalid(name, format!("contains forbidden character: {ch:?}")));
    }
    if name.chars().any(char::is_control) {
        return Err(invalid(name, "must not contain control characters"));
    }
    if name.eq_ignore_ascii_case(NODE_FILE) {
        return Err(invalid(name, format!("{NODE_FILE:?} is reserved")));
    }
    Ok(())
}

/// Reject `name` if it equals one of `siblings` except for case.
///
/// An exact match is fine: adding an existing child is a no-op.
pub fn validate_sibling(siblings: &[String], name: &str) -> StructureResult<()> {
    let folded = name.to_lowercase();
    match siblings
        .iter()
        .find(|sibling| sibling.as_str() != name && sibling.to_lowercase() == folded)
    {
        Some(sibling) => Err(invalid(
            name,
            format!("differs from existing child {sibling:?} only by case"),
        )),
        None => Ok(()),
    }
}

/// Validate every segment of `path`.
pub fn validate_path(path: &StructurePath) -> StructureResult<()> {
    path.segments()
        .iter()
        .try_for_each(|segment| validate_node_name(segment))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn valid_names() {
        assert!(validate_node_name("test_dir").is_ok());
        assert!(validate_node_name("Aff case 2024").is_ok());
        assert!(validate_node_name("v1.0").is_ok());
        assert!(validate_node_name(".hidden").is_ok());
        assert!(validate_node_name("ünïcödé").is_ok());
    }

    #[test]
    fn reject_empty_name() {
        assert!(validate_node_name("").is_err());
    }

    #[test]
    fn reject_dot_names() {
        assert!(validate_node_name(".").is_err());
        assert!(validate_node_name("..").is_err());
    }

    #[test]
    fn reject_separators() {
        assert!(validate_node_name("a/b").is_err());
        assert!(validate_node_name("a\\b").is_err());
    }

    #[test]
    fn reject_control_chars() {
        assert!(validate_node_name("tab\there").is_err());
        assert!(validate_node_name("new\nline").is_err());
        assert!(validate_node_name("nul\0").is_err());
    }

    #[test]
    fn reject_reserved_name() {
        let err = validate_node_name(NODE_FILE).unwrap_err();
        assert!(matches!(err, StructureError::InvalidName { name, .. } if name == NODE_FILE));
    }

    #[test]
    fn reserved_name_ignores_case() {
        assert!(validate_node_name("NODE.JSON").is_err());
        assert!(validate_node_name("Node.json").is_err());
    }

    #[test]
    fn siblings_must_differ_beyond_case() {
        let siblings = vec!["Aff".to_string(), "neg".to_string()];
        assert!(validate_sibling(&siblings, "Aff").is_ok());
        assert!(validate_sibling(&siblings, "K").is_ok());
        let err = validate_sibling(&siblings, "aff").unwrap_err();
        assert!(matches!(err, StructureError::InvalidName { name, .. } if name == "aff"));
        assert!(validate_sibling(&siblings, "NEG").is_err());
        assert!(validate_sibling(&[], "anything").is_ok());
    }

    #[test]
    fn path_validation_checks_every_segment() {
        assert!(validate_path(&StructurePath::root()).is_ok());
        assert!(validate_path(&StructurePath::from(["a", "b"])).is_ok());
        assert!(validate_path(&StructurePath::from(["a", ".."])).is_err());
    }

    proptest! {
        #[test]
        fn names_with_slash_are_rejected(prefix in "[a-z]{0,6}", suffix in "[a-z]{0,6}") {
            let name = format!("{prefix}/{suffix}");
            prop_assert!(validate_node_name(&name).is_err());
        }

        #[test]
        fn plain_words_are_accepted(name in "[A-Za-z0-9 _-]{1,24}") {
            prop_assume!(!name.eq_ignore_ascii_case(NODE_FILE));
            prop_assert!(validate_node_name(&name).is_ok());
        }
    }
}
