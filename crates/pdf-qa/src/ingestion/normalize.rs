//! Whitespace normalization applied before chunking

use once_cell::sync::Lazy;
use regex::Regex;

static WHITESPACE_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid regex"));

/// Collapse every whitespace run (spaces, tabs, all newline variants) into one
/// space and trim both ends.
///
/// Idempotent: `normalize_whitespace(&normalize_whitespace(s)) == normalize_whitespace(s)`.
pub fn normalize_whitespace(text: &str) -> String {
    WHITESPACE_RUN.replace_all(text, " ").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_collapses_newline_variants() {
        let input = "first\r\nsecond\rthird\nfourth\u{2028}fifth";
        assert_eq!(normalize_whitespace(input), "first second third fourth fifth");
    }

    #[test]
    fn test_collapses_runs_and_trims() {
        assert_eq!(normalize_whitespace("  a \t\t b\n\n\nc   "), "a b c");
    }

    #[test]
    fn test_whitespace_only_is_empty() {
        assert_eq!(normalize_whitespace(" \n\t\r\n "), "");
    }

    #[test]
    fn test_non_breaking_space_is_whitespace() {
        assert_eq!(normalize_whitespace("a\u{00A0}\u{00A0}b"), "a b");
    }

    proptest! {
        #[test]
        fn normalization_is_idempotent(s in "\\PC*") {
            let once = normalize_whitespace(&s);
            prop_assert_eq!(normalize_whitespace(&once), once.clone());
        }

        #[test]
        fn normalized_text_has_no_double_spaces(s in "[a-z \\t\\n\\r]{0,200}") {
            let out = normalize_whitespace(&s);
            prop_assert!(!out.contains("  "));
            prop_assert!(!out.starts_with(' ') && !out.ends_with(' '));
            prop_assert!(!out.contains('\n') && !out.contains('\t') && !out.contains('\r'));
        }
    }
}
