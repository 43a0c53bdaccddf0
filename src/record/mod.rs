//! Product record types
//!
//! A [`RawItemRecord`] is what the item parser lifts out of one listing card,
//! every field still the literal markup text. A [`TypedRecord`] is the
//! validated, normalized row handed to the sinks.

use crate::HarvestError;
use chrono::{Local, NaiveDateTime, Timelike};
use serde::{Serialize, Serializer};

/// Timestamp layout used wherever a capture time is rendered
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// One scraped listing, exactly as extracted from markup
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct RawItemRecord {
    #[serde(rename = "Title")]
    pub title: String,

    #[serde(rename = "Price")]
    pub price_text: String,

    #[serde(rename = "Rating")]
    pub rating_text: String,

    #[serde(rename = "Colors")]
    pub colors_text: String,

    #[serde(rename = "Size")]
    pub size_text: String,

    #[serde(rename = "Gender")]
    pub gender_text: String,

    /// When the item was extracted, not when it was listed
    #[serde(rename = "timestamp", serialize_with = "serialize_timestamp")]
    pub captured_at: NaiveDateTime,
}

/// One validated product row
///
/// Fields are private so that every instance has gone through
/// [`TypedRecord::new`] and satisfies `price > 0`, `rating > 0` and
/// `color_count >= 1`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TypedRecord {
    #[serde(rename = "Title")]
    title: String,

    #[serde(rename = "Price")]
    price: f64,

    #[serde(rename = "Rating")]
    rating: f64,

    #[serde(rename = "Colors")]
    color_count: u32,

    #[serde(rename = "Size")]
    size: String,

    #[serde(rename = "Gender")]
    gender: String,

    #[serde(rename = "timestamp", serialize_with = "serialize_timestamp")]
    captured_at: NaiveDateTime,
}

impl TypedRecord {
    /// Column headers shared by every sink
    pub const HEADERS: [&'static str; 7] =
        ["Title", "Price", "Rating", "Colors", "Size", "Gender", "timestamp"];

    /// Creates a typed record, rejecting values that cannot be a real listing
    pub fn new(
        title: String,
        price: f64,
        rating: f64,
        color_count: u32,
        size: String,
        gender: String,
        captured_at: NaiveDateTime,
    ) -> Result<Self, HarvestError> {
        if !price.is_finite() || price <= 0.0 {
            return Err(HarvestError::InvalidRecord(format!(
                "price must be positive for '{}', got {}",
                title, price
            )));
        }

        if !rating.is_finite() || rating <= 0.0 {
            return Err(HarvestError::InvalidRecord(format!(
                "rating must be positive for '{}', got {}",
                title, rating
            )));
        }

        if color_count == 0 {
            return Err(HarvestError::InvalidRecord(format!(
                "color count must be at least 1 for '{}'",
                title
            )));
        }

        Ok(Self {
            title,
            price,
            rating,
            color_count,
            size,
            gender,
            captured_at,
        })
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    /// Price in local currency units
    pub fn price(&self) -> f64 {
        self.price
    }

    pub fn rating(&self) -> f64 {
        self.rating
    }

    pub fn color_count(&self) -> u32 {
        self.color_count
    }

    pub fn size(&self) -> &str {
        &self.size
    }

    pub fn gender(&self) -> &str {
        &self.gender
    }

    pub fn captured_at(&self) -> NaiveDateTime {
        self.captured_at
    }

    /// Capture time rendered with [`TIMESTAMP_FORMAT`]
    pub fn captured_at_string(&self) -> String {
        self.captured_at.format(TIMESTAMP_FORMAT).to_string()
    }
}

/// Current local wall-clock time at second precision
pub fn capture_time() -> NaiveDateTime {
    let now = Local::now().naive_local();
    now.with_nanosecond(0).unwrap_or(now)
}

fn serialize_timestamp<S>(value: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.collect_str(&value.format(TIMESTAMP_FORMAT))
}
