pub mod catalog_service;
pub mod featured_use_case;
pub mod feed_use_case;
pub mod osdr_use_case;
pub mod ports;

pub use catalog_service::CatalogService;
