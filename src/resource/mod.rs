//! Resource collection layer
//!
//! Turns the ARNs reported by the tag search API into structured records.
//!
//! # Architecture
//!
//! - [`arn`] - Service classification and ARN shortening
//! - [`registry`] - Service name to decomposition rule lookup, loaded from embedded JSON
//! - [`normalizer`] - Applies a rule to build a [`ResourceRecord`]
//! - [`api`] - The paginated tag search seam
//! - [`fetcher`] - Per-region pagination loop and the multi-region driver
//!
//! # Example
//!
//! ```ignore
//! use tagls::resource::{fetch_regions, CollectOptions, TagSearchApiFactory};
//! use tokio_util::sync::CancellationToken;
//!
//! async fn list(factory: &dyn TagSearchApiFactory) -> tagls::error::Result<()> {
//!     let regions = vec!["eu-west-1".to_string()];
//!     let collection =
//!         fetch_regions(factory, &regions, &CollectOptions::default(), &CancellationToken::new())
//!             .await?;
//!     println!("{} resources", collection.records.len());
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod arn;
mod fetcher;
mod normalizer;
mod record;
mod registry;

pub use api::{TagSearchApi, TagSearchApiFactory, TagSearchPage, TagSearchRequest};
pub use arn::{service_from_arn, short_arn};
pub use fetcher::{
    fetch_region, fetch_regions, CollectOptions, Collection, MalformedPolicy, RegionResult,
    RetryPolicy, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE,
};
pub use record::ResourceRecord;
pub use registry::{Decomposition, RuleSet};
