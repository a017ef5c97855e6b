/// Upstream paths and defaults shared across the catalog layer
// Image catalog paths
pub const JWST_JPG_PATH: &str = "all/type/jpg";
pub const JWST_SUFFIX_PATH_PREFIX: &str = "all/suffix/";
pub const JWST_PROGRAM_PATH_PREFIX: &str = "program/id/";

// Dataset catalog path
pub const OSDR_LIST_PATH: &str = "osdr/list";

// Feed paging
pub const DEFAULT_PAGE: i64 = 1;
pub const DEFAULT_PER_PAGE: i64 = 24;
pub const MIN_PER_PAGE: i64 = 1;
pub const MAX_PER_PAGE: i64 = 60;

// Dataset list size when the caller does not give one
pub const DEFAULT_OSDR_LIMIT: u32 = 20;

/// Session key holding the featured observation
pub const SELECTED_OBSERVATION_KEY: &str = "jwst_selected_observation";

/// Dictionary keys of the dataset catalog start with this accession prefix
pub const OSDR_ACCESSION_PREFIX: &str = "OSD-";

// Default upstream locations
pub const DEFAULT_JWST_BASE_URL: &str = "https://api.jwstapi.com";
pub const DEFAULT_OSDR_BASE_URL: &str = "http://rust_iss:3000";

/// Fixed ceiling for one upstream request
pub const DEFAULT_HTTP_TIMEOUT_SECONDS: u64 = 20;
pub const DEFAULT_USER_AGENT: &str = concat!("astro-catalog/", env!("CARGO_PKG_VERSION"));

pub const API_KEY_HEADER: &str = "x-api-key";

pub const DEFAULT_STATE_DIR: &str = ".astro_catalog";
