//! Pure normalization of raw catalog records: image URL resolution,
//! instrument extraction, gallery item building and dataset flattening.

pub mod image_item;
pub mod image_url;
pub mod instruments;
pub mod osdr;

pub use image_item::{featured_from_record, normalize_entry, SkipReason};
pub use osdr::{flatten, looks_like_dictionary};
