use std::sync::LazyLock;

use regex::Regex;

use crate::utils::error::UtilError;

#[allow(clippy::expect_used)]
static SPECIAL_CHARS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^a-zA-Z0-9\s]").expect("valid regex"));

/// Drops everything except ASCII letters, digits and whitespace.
pub fn remove_special_chars(input: &str) -> String {
    SPECIAL_CHARS_RE.replace_all(input, "").into_owned()
}

pub fn remove_newlines(text: &str) -> String {
    text.replace('\n', "")
}

/// Parses `"true"` or `"false"` in any letter case.
pub fn str_to_bool(value: &str) -> Result<bool, UtilError> {
    let lowered = value.to_lowercase();
    match lowered.as_str() {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => Err(UtilError::InvalidBool(lowered)),
    }
}

pub fn none_to_str(value: Option<&str>) -> String {
    value.unwrap_or_default().to_string()
}

pub fn first_or_err<T>(items: &[T]) -> Result<&T, UtilError> {
    items.first().ok_or(UtilError::EmptyList)
}
