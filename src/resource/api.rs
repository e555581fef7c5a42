//! Tag search API seam
//!
//! The collector only sees this trait; the AWS implementation lives in
//! [`crate::aws`] and tests plug in an in-memory fake.

use anyhow::Result;
use async_trait::async_trait;

/// One page request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagSearchRequest {
    pub page_size: i32,
    /// `None` requests the first page
    pub cursor: Option<String>,
    /// Optional `service[:type]` filters, e.g. `ec2:instance`
    pub resource_type_filters: Vec<String>,
}

/// One page of results
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagSearchPage {
    /// ARNs in the order the API returned them
    pub identifiers: Vec<String>,
    pub next_cursor: Option<String>,
}

impl TagSearchPage {
    /// Whether another page should be requested
    pub fn has_more(&self) -> bool {
        self.next_cursor.as_deref().is_some_and(|c| !c.is_empty())
    }
}

/// Paginated source of tagged resource ARNs for a single region
#[async_trait]
pub trait TagSearchApi: Send + Sync {
    async fn get_resources(&self, request: &TagSearchRequest) -> Result<TagSearchPage>;
}

/// Builds one API handle per region
#[async_trait]
pub trait TagSearchApiFactory: Send + Sync {
    async fn for_region(&self, region: &str) -> Result<Box<dyn TagSearchApi>>;
}
