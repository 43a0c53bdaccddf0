//! Field normalizers
//!
//! Every normalizer is a total function: malformed or missing input resolves
//! to a fixed fallback value instead of an error. The fallbacks are chosen so
//! that placeholder strings such as "Price Unavailable" or "Invalid Rating"
//! come out as `0.0`, which the table filter then rejects.

use regex::Regex;
use std::fmt;
use std::sync::LazyLock;

/// Conversion factor from the storefront's listing currency to local units
pub const USD_TO_LOCAL_RATE: f64 = 16000.0;

static RATING_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[0-9]+(\.[0-9]+)?").expect("rating pattern is valid"));

static DIGIT_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[0-9]+").expect("digit pattern is valid"));

/// A raw field value as seen by a normalizer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldInput<'a> {
    /// Text lifted from markup
    Present(&'a str),
    /// No value at all
    Missing,
}

impl<'a> From<&'a str> for FieldInput<'a> {
    fn from(text: &'a str) -> Self {
        FieldInput::Present(text)
    }
}

impl<'a> From<Option<&'a str>> for FieldInput<'a> {
    fn from(text: Option<&'a str>) -> Self {
        text.map_or(FieldInput::Missing, FieldInput::Present)
    }
}

impl fmt::Display for FieldInput<'_> {
    /// Missing renders as the empty string
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldInput::Present(text) => f.write_str(text),
            FieldInput::Missing => Ok(()),
        }
    }
}

/// Converts a listing price to local currency units
///
/// Keeps only digits and decimal points, parses the remainder, multiplies by
/// [`USD_TO_LOCAL_RATE`] and rounds to a whole unit. Anything unparseable
/// yields `0.0`.
///
/// # Examples
///
/// ```
/// use storefront_harvest::transform::{normalize_price, FieldInput};
///
/// assert_eq!(normalize_price(FieldInput::Present("$64.24")), 1027840.0);
/// assert_eq!(normalize_price(FieldInput::Present("Price Unavailable")), 0.0);
/// assert_eq!(normalize_price(FieldInput::Missing), 0.0);
/// ```
pub fn normalize_price(input: FieldInput<'_>) -> f64 {
    let FieldInput::Present(text) = input else {
        return 0.0;
    };

    let cleaned: String = text
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();

    if cleaned.is_empty() {
        return 0.0;
    }

    match cleaned.parse::<f64>() {
        Ok(amount) => {
            let converted = (amount * USD_TO_LOCAL_RATE).round();
            if converted.is_finite() {
                converted
            } else {
                0.0
            }
        }
        Err(_) => 0.0,
    }
}

/// Extracts the first number (optionally decimal) found anywhere in the text
///
/// ```
/// use storefront_harvest::transform::{normalize_rating, FieldInput};
///
/// assert_eq!(normalize_rating(FieldInput::Present("Rating: ⭐ 4.8 / 5")), 4.8);
/// assert_eq!(normalize_rating(FieldInput::Present("Invalid Rating")), 0.0);
/// ```
pub fn normalize_rating(input: FieldInput<'_>) -> f64 {
    let FieldInput::Present(text) = input else {
        return 0.0;
    };

    RATING_PATTERN
        .find(text)
        .and_then(|m| m.as_str().parse::<f64>().ok())
        .filter(|rating| rating.is_finite())
        .unwrap_or(0.0)
}

/// Extracts the number of color variants, never less than one
///
/// The first run of digits is parsed; no digits, overflow or a literal `0`
/// all fall back to `1`.
pub fn normalize_color_count(input: FieldInput<'_>) -> u32 {
    let FieldInput::Present(text) = input else {
        return 1;
    };

    DIGIT_RUN
        .find(text)
        .and_then(|m| m.as_str().parse::<u32>().ok())
        .filter(|count| *count > 0)
        .unwrap_or(1)
}

/// Removes the first occurrence of `prefix` and trims surrounding whitespace
///
/// A `None` prefix cannot be removed, so the input is returned as written.
///
/// ```
/// use storefront_harvest::transform::{normalize_text_field, FieldInput};
///
/// assert_eq!(normalize_text_field(FieldInput::Present("Size: M"), Some("Size: ")), "M");
/// assert_eq!(normalize_text_field(FieldInput::Present("Size: M"), None), "Size: M");
/// ```
pub fn normalize_text_field(input: FieldInput<'_>, prefix: Option<&str>) -> String {
    match (input, prefix) {
        (FieldInput::Present(text), Some(prefix)) => {
            text.replacen(prefix, "", 1).trim().to_string()
        }
        _ => input.to_string(),
    }
}
