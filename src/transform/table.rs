//! Record table builder
//!
//! Turns the raw records of a whole crawl into the final typed table. The
//! build is all-or-nothing: any failure yields an empty table rather than a
//! partially transformed one.

use crate::record::{RawItemRecord, TypedRecord};
use crate::transform::normalize::{
    normalize_color_count, normalize_price, normalize_rating, normalize_text_field, FieldInput,
};
use crate::HarvestError;
use std::collections::HashSet;

/// Placeholder title the storefront uses for listings with no real product
pub const UNKNOWN_PRODUCT: &str = "Unknown Product";

const SIZE_PREFIX: &str = "Size: ";
const GENDER_PREFIX: &str = "Gender: ";

/// Builds the typed product table from raw records
///
/// # Steps
///
/// 1. Drop rows identical to an earlier row across every raw field
/// 2. Drop rows titled [`UNKNOWN_PRODUCT`]
/// 3. Normalize price, rating, colors, size and gender
/// 4. Keep only rows with `price > 0` and `rating > 0`
///
/// Empty input is logged as an error and produces an empty table.
pub fn build_table(raw_records: &[RawItemRecord]) -> Vec<TypedRecord> {
    tracing::info!("Starting transformation of {} raw records", raw_records.len());

    if raw_records.is_empty() {
        tracing::error!("No data to transform");
        return Vec::new();
    }

    match try_build_table(raw_records) {
        Ok(table) => {
            tracing::info!("Transformation done: {} rows", table.len());
            table
        }
        Err(e) => {
            tracing::error!("Error during transformation: {}", e);
            Vec::new()
        }
    }
}

fn try_build_table(raw_records: &[RawItemRecord]) -> Result<Vec<TypedRecord>, HarvestError> {
    let mut seen = HashSet::with_capacity(raw_records.len());
    let unique: Vec<&RawItemRecord> = raw_records
        .iter()
        .filter(|record| seen.insert(*record))
        .collect();

    tracing::debug!(
        "Removed {} duplicate rows",
        raw_records.len() - unique.len()
    );

    let titled: Vec<&RawItemRecord> = unique
        .into_iter()
        .filter(|record| record.title != UNKNOWN_PRODUCT)
        .collect();

    let mut table = Vec::with_capacity(titled.len());
    for record in &titled {
        let price = normalize_price(FieldInput::Present(&record.price_text));
        let rating = normalize_rating(FieldInput::Present(&record.rating_text));

        // Sentinel prices and ratings normalize to zero and are dropped here
        if price <= 0.0 || rating <= 0.0 {
            continue;
        }

        table.push(TypedRecord::new(
            record.title.clone(),
            price,
            rating,
            normalize_color_count(FieldInput::Present(&record.colors_text)),
            normalize_text_field(FieldInput::Present(&record.size_text), Some(SIZE_PREFIX)),
            normalize_text_field(FieldInput::Present(&record.gender_text), Some(GENDER_PREFIX)),
            record.captured_at,
        )?);
    }

    tracing::debug!(
        "Filtered {} rows with unavailable price or rating",
        titled.len() - table.len()
    );

    Ok(table)
}
