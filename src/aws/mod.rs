//! AWS integration
//!
//! - [`client`] - Resource Groups Tagging API client implementing the tag search seam
//! - [`regions`] - Known commercial regions and the default region

pub mod client;
pub mod regions;

pub use client::{AwsTaggingFactory, TaggingClient};
