//! Deterministic, human-readable document keys.
//!
//! Specialty keys are the slug of their name; module keys combine the
//! owning specialty, a semester token, and the slug of the module name:
//! `{specialty_id}_{semester_token}_{slug}`.

use std::sync::LazyLock;

use regex::Regex;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

use crate::error::CoreError;
use crate::types::DocId;

static WHITESPACE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("valid regex"));
static NON_WORD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^a-z0-9_-]+").expect("valid regex"));
static HYPHEN_RUN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"-{2,}").expect("valid regex"));
static DIGITS_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[0-9]+").expect("valid regex"));

/// Token used when a semester label carries nothing usable.
const EMPTY_SEMESTER_TOKEN: &str = "s0";

/// Latin letters that carry no combining mark under NFD but still have a
/// plain ASCII spelling.
fn fold_letter(c: char) -> Option<&'static str> {
    let folded = match c {
        'æ' => "ae",
        'œ' => "oe",
        'ß' => "ss",
        'ø' => "o",
        'đ' | 'ð' => "d",
        'ł' => "l",
        'ħ' => "h",
        'ı' => "i",
        'ŧ' => "t",
        'þ' => "th",
        _ => return None,
    };
    Some(folded)
}

/// Lower-case `text` and fold diacritics to their base Latin letters.
///
/// The text is decomposed (NFD) and its combining marks removed, so any
/// accented Latin letter keeps its base letter. Characters without a Latin
/// base are kept as-is; [`slugify`] drops them afterwards.
pub fn fold_diacritics(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.to_lowercase().nfd().filter(|c| !is_combining_mark(*c)) {
        match fold_letter(c) {
            Some(base) => out.push_str(base),
            None => out.push(c),
        }
    }
    out
}

/// Slug a free-text name into a URL- and key-safe string.
///
/// Lower-cases, folds diacritics, turns whitespace runs into one hyphen,
/// strips every remaining non-word character, collapses repeated hyphens,
/// and trims hyphens from both ends. May return an empty string.
///
/// ```
/// use cursus_core::slug::slugify;
///
/// assert_eq!(slugify("Génie Logiciel"), "genie-logiciel");
/// assert_eq!(slugify("  Réseaux & Télécoms  "), "reseaux-telecoms");
/// ```
pub fn slugify(name: &str) -> String {
    let folded = fold_diacritics(name.trim());
    let hyphenated = WHITESPACE_RE.replace_all(&folded, "-");
    let stripped = NON_WORD_RE.replace_all(&hyphenated, "");
    let collapsed = HYPHEN_RUN_RE.replace_all(&stripped, "-");
    collapsed.trim_matches('-').to_string()
}

/// Derive a document key from a name, optionally prefixed (`{prefix}-{slug}`).
///
/// Fails when the name slugs to nothing.
pub fn document_key(name: &str, prefix: Option<&str>) -> Result<DocId, CoreError> {
    let slug = slugify(name);
    if slug.is_empty() {
        return Err(cannot_derive(name));
    }
    match prefix.map(slugify).filter(|p| !p.is_empty()) {
        Some(prefix) => Ok(format!("{prefix}-{slug}")),
        None => Ok(slug),
    }
}

/// Key of a specialty document: the slug of its name.
pub fn specialty_id(name: &str) -> Result<DocId, CoreError> {
    document_key(name, None)
}

/// Token identifying a semester inside module keys.
///
/// The first run of digits in the label prefixed with `s` ("Semestre 2"
/// becomes `s2`); labels without digits fall back to their folded
/// alphanumeric characters, and to `s0` when nothing is left.
pub fn semester_token(label: &str) -> String {
    if let Some(digits) = DIGITS_RE.find(label) {
        return format!("s{}", digits.as_str());
    }
    let sanitized: String = fold_diacritics(label)
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect();
    if sanitized.is_empty() {
        EMPTY_SEMESTER_TOKEN.to_string()
    } else {
        sanitized
    }
}

/// Composite key of a module document.
///
/// ```
/// use cursus_core::slug::module_id;
///
/// let id = module_id("spec-x", "Semestre 2", "Algèbre").unwrap();
/// assert_eq!(id, "spec-x_s2_algebre");
/// ```
pub fn module_id(specialty_id: &str, semester_key: &str, name: &str) -> Result<DocId, CoreError> {
    let specialty_id = specialty_id.trim();
    if specialty_id.is_empty() {
        return Err(CoreError::invalid(
            "specialty_id",
            "Impossible de générer l'identifiant : spécialité manquante.",
        ));
    }
    let slug = slugify(name);
    if slug.is_empty() {
        return Err(cannot_derive(name));
    }
    Ok(format!(
        "{specialty_id}_{}_{slug}",
        semester_token(semester_key)
    ))
}

fn cannot_derive(name: &str) -> CoreError {
    CoreError::invalid(
        "name",
        format!("Impossible de générer un identifiant à partir de « {} ».", name.trim()),
    )
}
