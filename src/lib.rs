//! tagls - list tagged AWS resources across regions
//!
//! The library holds everything but process startup: ARN normalization,
//! the paginated collector, the AWS tagging adapter, configuration and
//! the table/JSON presenter.

pub mod aws;
pub mod config;
pub mod error;
pub mod resource;
pub mod ui;

/// Version injected at compile time via TAGLS_VERSION env var (set by CI/CD),
/// or "dev" for local builds.
pub const VERSION: &str = match option_env!("TAGLS_VERSION") {
    Some(v) => v,
    None => "dev",
};
