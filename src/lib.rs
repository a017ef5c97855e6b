pub mod config;
pub mod constants;
pub mod error;
pub mod logging;
pub mod types;

// Upstream access and field alias tables
pub mod catalog;
// Pure record normalization
pub mod normalize;

// Layered boundaries for application and infrastructure
pub mod app;
pub mod infra;

pub mod observability;

pub use app::CatalogService;
pub use error::{CatalogError, Result, UpstreamError};
