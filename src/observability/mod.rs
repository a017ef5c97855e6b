// Observability: metrics for the catalog layer

pub mod metrics;

pub use metrics::{init, render};
