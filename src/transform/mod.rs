//! Transformation of raw scraped records into typed product rows
//!
//! This module contains:
//! - Field normalizers that turn one free-form text field into a typed value
//! - The record table builder that deduplicates, filters, and normalizes a
//!   whole crawl's worth of raw records

mod normalize;
mod table;

pub use normalize::{
    normalize_color_count, normalize_price, normalize_rating, normalize_text_field, FieldInput,
    USD_TO_LOCAL_RATE,
};
pub use table::{build_table, UNKNOWN_PRODUCT};
