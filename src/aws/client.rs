//! Tagging Client
//!
//! Wraps the Resource Groups Tagging API `GetResources` call behind
//! [`TagSearchApi`].

use crate::resource::{TagSearchApi, TagSearchApiFactory, TagSearchPage, TagSearchRequest};
use anyhow::Result;
use async_trait::async_trait;
use aws_config::{BehaviorVersion, Region};
use aws_sdk_resourcegroupstagging as tagging;
use tagging::error::DisplayErrorContext;

/// Tagging API client bound to one region
#[derive(Clone)]
pub struct TaggingClient {
    client: tagging::Client,
    region: String,
}

impl TaggingClient {
    /// Create a client from the default credential chain, optionally using a named profile
    pub async fn new(region: &str, profile: Option<&str>) -> Self {
        let mut loader =
            aws_config::defaults(BehaviorVersion::latest()).region(Region::new(region.to_string()));

        if let Some(profile) = profile {
            loader = loader.profile_name(profile);
        }

        let config = loader.load().await;

        tracing::debug!(
            "Created tagging client for region {} (profile: {})",
            region,
            profile.unwrap_or("default")
        );

        Self {
            client: tagging::Client::new(&config),
            region: region.to_string(),
        }
    }
}

#[async_trait]
impl TagSearchApi for TaggingClient {
    async fn get_resources(&self, request: &TagSearchRequest) -> Result<TagSearchPage> {
        tracing::debug!(
            "GetResources region={} page_size={} cursor={}",
            self.region,
            request.page_size,
            request.cursor.is_some()
        );

        let filters = if request.resource_type_filters.is_empty() {
            None
        } else {
            Some(request.resource_type_filters.clone())
        };

        let output = self
            .client
            .get_resources()
            .resources_per_page(request.page_size)
            .set_pagination_token(request.cursor.clone())
            .set_resource_type_filters(filters)
            .send()
            .await
            .map_err(|e| anyhow::anyhow!("GetResources failed: {}", DisplayErrorContext(&e)))?;

        let mut identifiers = Vec::new();
        for mapping in output.resource_tag_mapping_list() {
            match mapping.resource_arn() {
                Some(arn) => identifiers.push(arn.to_string()),
                None => tracing::debug!("{}: ignoring mapping without ARN", self.region),
            }
        }

        Ok(TagSearchPage {
            identifiers,
            next_cursor: output.pagination_token().map(str::to_string),
        })
    }
}

/// Creates a [`TaggingClient`] per region, sharing one profile
#[derive(Debug, Clone, Default)]
pub struct AwsTaggingFactory {
    profile: Option<String>,
}

impl AwsTaggingFactory {
    pub fn new(profile: Option<String>) -> Self {
        Self { profile }
    }
}

#[async_trait]
impl TagSearchApiFactory for AwsTaggingFactory {
    async fn for_region(&self, region: &str) -> Result<Box<dyn TagSearchApi>> {
        let client = TaggingClient::new(region, self.profile.as_deref()).await;
        Ok(Box::new(client))
    }
}
