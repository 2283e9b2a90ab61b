//! Name transforms: pure string functions over the file stem.
//!
//! Each transform maps `(index, stem)` to a new stem; the extension is
//! carried over untouched. Transforms know nothing about the ledger.

use chrono::NaiveDate;
use heck::{ToKebabCase, ToLowerCamelCase, ToSnakeCase, ToTitleCase, ToUpperCamelCase};

use crate::error::{Error, Result};

/// Case styles supported by the `case` transform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum CaseStyle {
    Lower,
    Upper,
    Snake,
    Kebab,
    Pascal,
    Camel,
    Title,
}

/// Split a file name into `(stem, extension)`, extension including the dot.
///
/// A leading dot is part of the stem, so dotfiles keep their names intact.
pub fn split_name(name: &str) -> (&str, &str) {
    match name.rfind('.') {
        Some(idx) if idx > 0 => name.split_at(idx),
        _ => (name, ""),
    }
}

/// Zero-padded sequence number. `keep_name` appends the original stem after
/// the number instead of replacing it.
pub fn number(index: usize, stem: &str, start: usize, width: usize, keep_name: bool) -> String {
    let n = start + index;
    if keep_name {
        format!("{:0width$}_{}", n, stem, width = width)
    } else {
        format!("{:0width$}", n, width = width)
    }
}

/// Date stamp, prefixed by default or appended with `suffix`.
pub fn date(stem: &str, date: NaiveDate, format: &str, suffix: bool) -> String {
    let stamp = date.format(format).to_string();
    if suffix {
        format!("{}_{}", stem, stamp)
    } else {
        format!("{}_{}", stamp, stem)
    }
}

/// Regex search/replace over the stem, first match or all matches.
pub fn replace(stem: &str, pattern: &regex::Regex, replacement: &str, all: bool) -> String {
    if all {
        pattern.replace_all(stem, replacement).into_owned()
    } else {
        pattern.replace(stem, replacement).into_owned()
    }
}

/// Compile a user-supplied regex, mapping failures to a validation error.
pub fn compile_pattern(pattern: &str) -> Result<regex::Regex> {
    regex::Regex::new(pattern).map_err(|e| {
        Error::validation_invalid_argument("pattern", e.to_string(), Some(pattern.to_string()))
    })
}

/// Convert the stem to the requested case style.
pub fn convert_case(stem: &str, style: CaseStyle) -> String {
    match style {
        CaseStyle::Lower => stem.to_lowercase(),
        CaseStyle::Upper => stem.to_uppercase(),
        CaseStyle::Snake => stem.to_snake_case(),
        CaseStyle::Kebab => stem.to_kebab_case(),
        CaseStyle::Pascal => stem.to_upper_camel_case(),
        CaseStyle::Camel => stem.to_lower_camel_case(),
        CaseStyle::Title => stem.to_title_case(),
    }
}

/// Cap the stem at `length` characters.
pub fn truncate(stem: &str, length: usize) -> String {
    stem.chars().take(length).collect()
}
