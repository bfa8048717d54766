//! # Slugs
//!
//! Normalization of human-readable names into separator-consistent,
//! identifier-safe strings.
//!
//! `slugify` lowercases the input, transliterates the handful of Latin
//! diacritics common in project names, and collapses every run of characters
//! outside `[a-z0-9]` into a single separator. Leading and trailing
//! separators are dropped, so the function is idempotent:
//! `slugify(slugify(s, sep), sep) == slugify(s, sep)`.

use std::sync::OnceLock;

use regex::Regex;

/// Separator used for project slugs (`My Project` -> `my-project`).
pub const PROJECT_SLUG_SEPARATOR: &str = "-";

/// Separator used for service slugs (`My Backend` -> `mybackend`).
pub const SERVICE_SLUG_SEPARATOR: &str = "";

fn non_alphanumeric() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[^a-z0-9]+").expect("valid slug regex"))
}

fn fold_diacritic(c: char) -> Option<&'static str> {
    let folded = match c {
        'à' | 'á' | 'â' | 'ã' | 'ä' | 'å' => "a",
        'æ' => "ae",
        'ç' => "c",
        'è' | 'é' | 'ê' | 'ë' => "e",
        'ì' | 'í' | 'î' | 'ï' => "i",
        'ñ' => "n",
        'ò' | 'ó' | 'ô' | 'õ' | 'ö' | 'ø' => "o",
        'ù' | 'ú' | 'û' | 'ü' => "u",
        'ý' | 'ÿ' => "y",
        'ß' => "ss",
        _ => return None,
    };
    Some(folded)
}

/// Slugify a value using the given separator.
///
/// # Example
///
/// ```
/// use service_bootstrap::slug::slugify;
///
/// assert_eq!(slugify("My Project", "-"), "my-project");
/// assert_eq!(slugify("my backend", ""), "mybackend");
/// assert_eq!(slugify("  Città  Nuova!! ", "-"), "citta-nuova");
/// ```
pub fn slugify(value: &str, separator: &str) -> String {
    let mut lowered = String::with_capacity(value.len());
    for c in value.chars().flat_map(char::to_lowercase) {
        match fold_diacritic(c) {
            Some(folded) => lowered.push_str(folded),
            None => lowered.push(c),
        }
    }

    non_alphanumeric()
        .split(&lowered)
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(separator)
}

/// Check whether `value` is already a slug for the given separator.
pub fn is_slug(value: &str, separator: &str) -> bool {
    !value.is_empty() && slugify(value, separator) == value
}

/// Check whether `value` can be used as a code identifier: an ASCII letter or
/// underscore followed by ASCII alphanumerics or underscores.
pub fn is_identifier(value: &str) -> bool {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    }
}
