//! Attribute selectors.
//!
//! Elements are resolved through exactly one selector shape:
//!
//! ```text
//! [data-id="<escaped id>"]
//! ```
//!
//! Ids come from untrusted callers, so the value is always written as an
//! escaped CSS string and can never break out of the quotes.

// ============================================================================
// Imports
// ============================================================================

use std::fmt::Write as _;
use std::sync::LazyLock;

use regex::Regex;

// ============================================================================
// Constants
// ============================================================================

/// `[name="value"]` with a CSS string value.
static ATTRIBUTE_SELECTOR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?s)^\[\s*([A-Za-z_][A-Za-z0-9_-]*)\s*=\s*"((?:[^"\\]|\\.)*)"\s*\]$"#)
        .expect("attribute selector regex is valid")
});

/// Attribute names accepted as lookup attributes.
static ATTRIBUTE_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z_][A-Za-z0-9_-]*$").expect("attribute name regex is valid")
});

// ============================================================================
// AttributeSelector
// ============================================================================

/// An attribute equality selector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeSelector {
    /// Attribute name.
    pub name: String,
    /// Expected attribute value (unescaped).
    pub value: String,
}

impl AttributeSelector {
    /// Creates a selector matching `name == value`.
    #[inline]
    #[must_use]
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }

    /// Renders the selector as CSS.
    #[must_use]
    pub fn to_css(&self) -> String {
        format!("[{}=\"{}\"]", self.name, escape_css_string(&self.value))
    }

    /// Parses an attribute equality selector.
    ///
    /// Returns `None` for any other selector shape.
    #[must_use]
    pub fn parse(selector: &str) -> Option<Self> {
        let captures = ATTRIBUTE_SELECTOR.captures(selector.trim())?;
        Some(Self {
            name: captures[1].to_string(),
            value: unescape_css_string(&captures[2]),
        })
    }
}

// ============================================================================
// Helpers
// ============================================================================

/// Returns `true` if `name` can be used as a lookup attribute.
#[must_use]
pub fn is_valid_attribute_name(name: &str) -> bool {
    ATTRIBUTE_NAME.is_match(name)
}

/// Escapes a value for use inside a double-quoted CSS string.
#[must_use]
pub fn escape_css_string(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    for c in value.chars() {
        match c {
            '"' | '\\' => {
                out.push('\\');
                out.push(c);
            }
            c if c.is_control() => {
                // Trailing space terminates the hex escape.
                let _ = write!(out, "\\{:x} ", c as u32);
            }
            c => out.push(c),
        }
    }
    out
}

/// Reverses [`escape_css_string`]; also accepts any valid CSS escape.
#[must_use]
pub fn unescape_css_string(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }

        let mut hex = String::new();
        while hex.len() < 6 {
            match chars.peek() {
                Some(h) if h.is_ascii_hexdigit() => {
                    hex.push(*h);
                    chars.next();
                }
                _ => break,
            }
        }

        if hex.is_empty() {
            if let Some(next) = chars.next() {
                out.push(next);
            }
            continue;
        }

        if chars.peek() == Some(&' ') {
            chars.next();
        }
        let decoded = u32::from_str_radix(&hex, 16)
            .ok()
            .and_then(char::from_u32)
            .unwrap_or('\u{FFFD}');
        out.push(decoded);
    }

    out
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use proptest::prelude::*;

    #[test]
    fn test_to_css_plain() {
        let selector = AttributeSelector::new("data-id", "btn-3");
        assert_eq!(selector.to_css(), r#"[data-id="btn-3"]"#);
    }

    #[test]
    fn test_to_css_escapes_quotes() {
        let selector = AttributeSelector::new("data-id", r#"a"] , body [x="#);
        let css = selector.to_css();
        assert_eq!(css, r#"[data-id="a\"] , body [x="]"#);

        let parsed = AttributeSelector::parse(&css).expect("parse");
        assert_eq!(parsed, selector);
    }

    #[test]
    fn test_control_characters_use_hex_escape() {
        assert_eq!(escape_css_string("a\nb"), "a\\a b");
        assert_eq!(unescape_css_string("a\\a b"), "a\nb");
    }

    #[test]
    fn test_parse_rejects_other_shapes() {
        assert!(AttributeSelector::parse("#main").is_none());
        assert!(AttributeSelector::parse("div > a").is_none());
        assert!(AttributeSelector::parse(r#"[data-id=unquoted]"#).is_none());
    }

    #[test]
    fn test_parse_tolerates_whitespace() {
        let parsed = AttributeSelector::parse(r#" [ data-id = "x" ] "#).expect("parse");
        assert_eq!(parsed.name, "data-id");
        assert_eq!(parsed.value, "x");
    }

    #[test]
    fn test_attribute_name_validation() {
        assert!(is_valid_attribute_name("data-id"));
        assert!(is_valid_attribute_name("_ref"));
        assert!(!is_valid_attribute_name(""));
        assert!(!is_valid_attribute_name("data id"));
        assert!(!is_valid_attribute_name("1x"));
    }

    proptest! {
        #[test]
        fn prop_escaped_value_survives_parse(value in any::<String>()) {
            let selector = AttributeSelector::new("data-id", value.clone());
            let parsed = AttributeSelector::parse(&selector.to_css());
            prop_assert_eq!(parsed.map(|s| s.value), Some(value));
        }
    }
}
