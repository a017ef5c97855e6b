pub mod client;
pub mod fields;

pub use client::{extract_list, CatalogClient};
