//! Format checks applied to request fields before any state is touched.
//!
//! These run first in every reaction. A request that fails here never
//! reaches a room lock.

use once_cell::sync::Lazy;
use regex::Regex;

/// Canonical 8-4-4-4-12 hex UUID.
static IDENTIFIER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12}$",
    )
    .expect("invalid identifier regex")
});

/// Letters, digits and the six ASCII whitespace characters. Unicode
/// spaces such as NBSP are rejected.
static NAME_CHARS_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[\p{L}\p{N}\t\n\x0B\x0C\r ]+$").expect("invalid name regex")
});

static HAS_LETTER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\p{L}").expect("invalid letter regex"));

/// ASCII letters and digits, Polish diacritics, ASCII punctuation.
static CREDENTIAL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-zA-Z0-9ąćęłńóśźżĄĆĘŁŃÓŚŹŻ[:punct:]]+$")
        .expect("invalid credential regex")
});

static ENTER_CODE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[0-9a-zA-Z]{6}$").expect("invalid enter code regex")
});

/// `true` for a canonical hyphenated UUID string.
pub fn is_identifier(s: &str) -> bool {
    IDENTIFIER_RE.is_match(s)
}

/// `true` for a user or room display name: at least one letter, and
/// nothing but letters, digits and whitespace.
pub fn is_display_name(s: &str) -> bool {
    NAME_CHARS_RE.is_match(s) && HAS_LETTER_RE.is_match(s)
}

/// `true` for an acceptable room password.
pub fn is_credential(s: &str) -> bool {
    CREDENTIAL_RE.is_match(s)
}

/// `true` for a six-character alphanumeric room enter code.
///
/// The length matches the codes the room directory generates.
pub fn is_enter_code(s: &str) -> bool {
    ENTER_CODE_RE.is_match(s)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identifier_accepts_canonical_uuid() {
        assert!(is_identifier("f8c3de3d-1fea-4d7c-a8b0-29f63c4c3454"));
        assert!(is_identifier("F8C3DE3D-1FEA-4D7C-A8B0-29F63C4C3454"));
    }

    #[test]
    fn test_identifier_rejects_other_forms() {
        for bad in [
            "",
            "f8c3de3d1fea4d7ca8b029f63c4c3454",
            "{f8c3de3d-1fea-4d7c-a8b0-29f63c4c3454}",
            "f8c3de3d-1fea-4d7c-a8b0-29f63c4c345",
            "g8c3de3d-1fea-4d7c-a8b0-29f63c4c3454",
            " f8c3de3d-1fea-4d7c-a8b0-29f63c4c3454",
        ] {
            assert!(!is_identifier(bad), "{bad:?} accepted");
        }
    }

    #[test]
    fn test_display_name_rules() {
        assert!(is_display_name("James"));
        assert!(is_display_name("TajnyPokoj"));
        assert!(is_display_name("Pokój 2"));
        assert!(is_display_name("R2D2"));

        assert!(!is_display_name(""));
        assert!(!is_display_name("1234"), "needs a letter");
        assert!(!is_display_name("   "), "needs a letter");
        assert!(!is_display_name("James!"));
        assert!(!is_display_name("drop_table"));
    }

    #[test]
    fn test_display_name_only_ascii_whitespace() {
        assert!(is_display_name("Ja mes"));
        assert!(is_display_name("Ja\tmes"));

        for bad in ["Ja\u{a0}mes", "Ja\u{2003}mes", "Ja\u{3000}mes", "Ja\u{85}mes"] {
            assert!(!is_display_name(bad), "{bad:?} accepted");
        }
    }

    #[test]
    fn test_credential_rules() {
        assert!(is_credential("Tajne6Przez2Poufne.;"));
        assert!(is_credential("zażółć"));
        assert!(is_credential("!@#$%^&*()"));

        assert!(!is_credential(""));
        assert!(!is_credential("with space"));
        assert!(!is_credential("emoji🙂"));
        assert!(!is_credential("ñandú"));
    }

    #[test]
    fn test_enter_code_rules() {
        assert!(is_enter_code("zCiDsC"));
        assert!(is_enter_code("a1B2c3"));

        assert!(!is_enter_code("zCiDs"));
        assert!(!is_enter_code("zCiDsCx"));
        assert!(!is_enter_code("zCiD-C"));
    }
}
