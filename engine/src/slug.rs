//! URL-safe identifiers derived from free-form names.

use unicode_normalization::UnicodeNormalization;

/// Turn an arbitrary string into a slug.
///
/// The value is decomposed (NFKD) and stripped of everything that is not
/// ASCII, so accented letters keep their base letter. Characters other than
/// word characters, whitespace and hyphens are then dropped, the result is
/// lowercased and trimmed, and runs of whitespace or hyphens collapse into a
/// single hyphen.
///
/// Never fails. An input with nothing usable yields the empty string, which
/// callers must treat as "no usable slug".
///
/// ```
/// use dcim_sync_engine::slugify;
///
/// assert_eq!(slugify("Café Networks!"), "cafe-networks");
/// assert_eq!(slugify("  Hewlett  Packard -- Enterprise "), "hewlett-packard-enterprise");
/// assert_eq!(slugify("!!!"), "");
/// ```
pub fn slugify(value: &str) -> String {
    let ascii: String = value.nfkd().filter(char::is_ascii).collect();

    let kept: String = ascii
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_' || *c == '-' || is_space(*c))
        .collect();

    let mut slug = String::with_capacity(kept.len());
    let mut in_separator = false;
    for c in kept.trim_matches(is_space).chars() {
        if c == '-' || is_space(c) {
            in_separator = true;
            continue;
        }
        if in_separator {
            slug.push('-');
            in_separator = false;
        }
        slug.push(c.to_ascii_lowercase());
    }
    if in_separator {
        slug.push('-');
    }

    slug
}

/// ASCII whitespace, including the information separators `\x1c..=\x1f`.
fn is_space(c: char) -> bool {
    matches!(c, ' ' | '\t'..='\r' | '\x1c'..='\x1f')
}
