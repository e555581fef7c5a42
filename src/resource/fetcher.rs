//! Resource Fetcher
//!
//! Pages through the tag search API for each region and normalizes every
//! returned ARN.

use super::api::{TagSearchApi, TagSearchApiFactory, TagSearchPage, TagSearchRequest};
use super::record::ResourceRecord;
use super::registry::RuleSet;
use crate::error::{ResourceError, Result};
use futures::stream::{self, StreamExt, TryStreamExt};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Default number of resources requested per page
pub const DEFAULT_PAGE_SIZE: i32 = 50;

/// Largest page size the tagging API accepts
pub const MAX_PAGE_SIZE: i32 = 100;

/// What to do with an ARN that cannot be normalized
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MalformedPolicy {
    /// Log it, count it and keep going
    #[default]
    Skip,
    /// Fail the region, and with it the run
    Abort,
}

/// Bounded exponential backoff for page requests
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts per page, including the first one
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(250),
        }
    }
}

impl RetryPolicy {
    /// Delay before retrying after the given (1-based) failed attempt
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt.saturating_sub(1));
        self.base_delay.saturating_mul(factor)
    }
}

/// Settings shared by every region collector
#[derive(Debug, Clone)]
pub struct CollectOptions {
    pub page_size: i32,
    pub resource_type_filters: Vec<String>,
    pub retry: RetryPolicy,
    /// Deadline for a single API call
    pub request_timeout: Duration,
    /// Regions collected at the same time
    pub concurrency: usize,
    pub malformed: MalformedPolicy,
    pub rules: RuleSet,
}

impl Default for CollectOptions {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            resource_type_filters: Vec::new(),
            retry: RetryPolicy::default(),
            request_timeout: Duration::from_secs(30),
            concurrency: 4,
            malformed: MalformedPolicy::default(),
            rules: RuleSet::builtin(),
        }
    }
}

/// Records collected from one region
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegionResult {
    pub region: String,
    pub records: Vec<ResourceRecord>,
    /// ARNs dropped under [`MalformedPolicy::Skip`]
    pub skipped: usize,
    /// Page requests that succeeded
    pub pages: usize,
}

/// Records from every region, in region order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Collection {
    pub regions: Vec<String>,
    pub records: Vec<ResourceRecord>,
    pub skipped: usize,
}

/// Fetch every page for one region
pub async fn fetch_region(
    api: &dyn TagSearchApi,
    region: &str,
    options: &CollectOptions,
    cancel: &CancellationToken,
) -> Result<RegionResult> {
    let mut result = RegionResult {
        region: region.to_string(),
        ..Default::default()
    };
    let mut cursor: Option<String> = None;

    loop {
        let request = TagSearchRequest {
            page_size: options.page_size,
            cursor: cursor.take(),
            resource_type_filters: options.resource_type_filters.clone(),
        };

        let page = fetch_page(api, region, &request, options, cancel).await?;
        result.pages += 1;

        tracing::debug!(
            "{}: page {} returned {} resources",
            region,
            result.pages,
            page.identifiers.len()
        );

        for arn in &page.identifiers {
            match options.rules.normalize_arn(arn, region) {
                Ok(record) => result.records.push(record),
                Err(e) if e.is_per_record() && options.malformed == MalformedPolicy::Skip => {
                    tracing::warn!("{}: skipping resource: {}", region, e);
                    result.skipped += 1;
                }
                Err(e) => return Err(e),
            }
        }

        if !page.has_more() {
            break;
        }
        if page.next_cursor == request.cursor {
            return Err(ResourceError::ApiRequestFailed {
                region: region.to_string(),
                attempts: 1,
                message: "tagging API returned the same pagination token twice".to_string(),
            });
        }
        cursor = page.next_cursor;
    }

    tracing::info!(
        "{}: collected {} resources in {} pages ({} skipped)",
        region,
        result.records.len(),
        result.pages,
        result.skipped
    );

    Ok(result)
}

/// Issue one page request, retrying with backoff until attempts run out
async fn fetch_page(
    api: &dyn TagSearchApi,
    region: &str,
    request: &TagSearchRequest,
    options: &CollectOptions,
    cancel: &CancellationToken,
) -> Result<TagSearchPage> {
    let max_attempts = options.retry.max_attempts.max(1);
    let mut attempt = 0;

    loop {
        attempt += 1;

        let outcome = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                return Err(ResourceError::Cancelled { region: region.to_string() });
            }
            outcome = tokio::time::timeout(
                options.request_timeout,
                api.get_resources(request),
            ) => outcome,
        };

        let message = match outcome {
            Ok(Ok(page)) => return Ok(page),
            Ok(Err(e)) => format!("{:#}", e),
            Err(_) => format!("request timed out after {:?}", options.request_timeout),
        };

        if attempt >= max_attempts {
            tracing::error!(
                "{}: giving up after {} attempts: {}",
                region,
                attempt,
                message
            );
            return Err(ResourceError::ApiRequestFailed {
                region: region.to_string(),
                attempts: attempt,
                message,
            });
        }

        let delay = options.retry.delay_for(attempt);
        tracing::warn!(
            "{}: attempt {}/{} failed: {}, retrying in {:?}",
            region,
            attempt,
            max_attempts,
            message,
            delay
        );

        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                return Err(ResourceError::Cancelled { region: region.to_string() });
            }
            _ = tokio::time::sleep(delay) => {}
        }
    }
}

/// Fetch all regions and merge the results in the order given
///
/// Regions run concurrently up to `options.concurrency`; the first region
/// that fails aborts the whole collection.
pub async fn fetch_regions(
    factory: &dyn TagSearchApiFactory,
    regions: &[String],
    options: &CollectOptions,
    cancel: &CancellationToken,
) -> Result<Collection> {
    let regions = dedup_regions(regions);
    let concurrency = options.concurrency.max(1);

    tracing::info!(
        "Collecting {} regions (concurrency {})",
        regions.len(),
        concurrency
    );

    let results: Vec<RegionResult> = stream::iter(regions.iter())
        .map(|region| async move {
            let api = factory.for_region(region).await.map_err(|e| {
                ResourceError::ClientSetup {
                    region: region.clone(),
                    message: format!("{:#}", e),
                }
            })?;
            fetch_region(api.as_ref(), region, options, cancel).await
        })
        .buffered(concurrency)
        .try_collect()
        .await?;

    let mut collection = Collection {
        regions,
        ..Default::default()
    };
    for result in results {
        collection.skipped += result.skipped;
        collection.records.extend(result.records);
    }

    Ok(collection)
}

/// Drop repeated region names, keeping the first occurrence
fn dedup_regions(regions: &[String]) -> Vec<String> {
    let mut seen = Vec::with_capacity(regions.len());
    for region in regions {
        if !seen.contains(region) {
            seen.push(region.clone());
        }
    }
    seen
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Replays scripted responses and records every request
    struct ScriptedApi {
        responses: Mutex<VecDeque<anyhow::Result<TagSearchPage>>>,
        requests: Mutex<Vec<TagSearchRequest>>,
    }

    impl ScriptedApi {
        fn new(responses: Vec<anyhow::Result<TagSearchPage>>) -> Self {
            Self {
                responses: Mutex::new(responses.into()),
                requests: Mutex::new(Vec::new()),
            }
        }

        fn requests(&self) -> Vec<TagSearchRequest> {
            self.requests.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl TagSearchApi for ScriptedApi {
        async fn get_resources(&self, request: &TagSearchRequest) -> anyhow::Result<TagSearchPage> {
            self.requests.lock().unwrap().push(request.clone());
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(anyhow::anyhow!("no scripted response left")))
        }
    }

    fn page(arns: &[&str], next: Option<&str>) -> anyhow::Result<TagSearchPage> {
        Ok(TagSearchPage {
            identifiers: arns.iter().map(|s| s.to_string()).collect(),
            next_cursor: next.map(|s| s.to_string()),
        })
    }

    async fn fetch_with_defaults(api: &ScriptedApi, region: &str) -> Result<RegionResult> {
        fetch_region(api, region, &CollectOptions::default(), &CancellationToken::new()).await
    }

    #[test]
    fn test_retry_delay_doubles() {
        let policy = RetryPolicy {
            max_attempts: 5,
            base_delay: Duration::from_millis(100),
        };
        assert_eq!(policy.delay_for(1), Duration::from_millis(100));
        assert_eq!(policy.delay_for(2), Duration::from_millis(200));
        assert_eq!(policy.delay_for(4), Duration::from_millis(800));
    }

    #[test]
    fn test_dedup_regions_keeps_first_occurrence() {
        let regions = vec![
            "eu-west-1".to_string(),
            "us-east-1".to_string(),
            "eu-west-1".to_string(),
        ];
        assert_eq!(dedup_regions(&regions), vec!["eu-west-1", "us-east-1"]);
    }

    #[tokio::test]
    async fn test_first_page_requested_once() {
        let api = ScriptedApi::new(vec![page(
            &["arn:aws:ec2:eu-west-1:1:instance/i-1"],
            Some(""),
        )]);

        let result = fetch_with_defaults(&api, "eu-west-1").await.unwrap();

        assert_eq!(result.records.len(), 1);
        assert_eq!(result.pages, 1);

        let requests = api.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].cursor, None);
        assert_eq!(requests[0].page_size, DEFAULT_PAGE_SIZE);
    }

    #[tokio::test]
    async fn test_cursor_is_forwarded() {
        let api = ScriptedApi::new(vec![
            page(&["arn:aws:s3:::a"], Some("t1")),
            page(&["arn:aws:s3:::b"], None),
        ]);

        let result = fetch_with_defaults(&api, "eu-west-1").await.unwrap();

        let ids: Vec<&str> = result.records.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);

        let cursors: Vec<Option<String>> = api.requests().into_iter().map(|r| r.cursor).collect();
        assert_eq!(cursors, vec![None, Some("t1".to_string())]);
    }

    #[tokio::test]
    async fn test_skip_policy_counts_malformed() {
        let api = ScriptedApi::new(vec![page(
            &[
                "arn:aws:ec2:eu-west-1:1:instance",
                "garbage",
                "arn:aws:ec2:eu-west-1:1:instance/i-2",
            ],
            None,
        )]);

        let result = fetch_with_defaults(&api, "eu-west-1").await.unwrap();

        assert_eq!(result.records.len(), 1);
        assert_eq!(result.records[0].id, "i-2");
        assert_eq!(result.skipped, 2);
    }

    #[tokio::test]
    async fn test_abort_policy_fails_region() {
        let api = ScriptedApi::new(vec![page(&["arn:aws:ec2:eu-west-1:1:instance"], None)]);
        let options = CollectOptions {
            malformed: MalformedPolicy::Abort,
            ..Default::default()
        };

        let err = fetch_region(&api, "eu-west-1", &options, &CancellationToken::new())
            .await
            .unwrap_err();

        assert!(matches!(err, ResourceError::MalformedResourceIdentifier { .. }));
    }

    #[tokio::test(start_paused = true)]
    async fn test_transient_failure_is_retried() {
        let api = ScriptedApi::new(vec![
            Err(anyhow::anyhow!("throttled")),
            page(&["arn:aws:s3:::a"], None),
        ]);

        let result = fetch_with_defaults(&api, "eu-west-1").await.unwrap();

        assert_eq!(result.records.len(), 1);
        assert_eq!(api.requests().len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_exhausted_retries_fail_region() {
        let api = ScriptedApi::new(vec![
            Err(anyhow::anyhow!("boom 1")),
            Err(anyhow::anyhow!("boom 2")),
            Err(anyhow::anyhow!("boom 3")),
        ]);

        let err = fetch_with_defaults(&api, "us-east-2").await.unwrap_err();

        assert_eq!(
            err,
            ResourceError::ApiRequestFailed {
                region: "us-east-2".to_string(),
                attempts: 3,
                message: "boom 3".to_string(),
            }
        );
        assert_eq!(api.requests().len(), 3);
    }

    #[tokio::test]
    async fn test_cancelled_before_request() {
        let api = ScriptedApi::new(vec![page(&["arn:aws:s3:::a"], None)]);
        let cancel = CancellationToken::new();
        cancel.cancel();

        let err = fetch_region(&api, "eu-west-1", &CollectOptions::default(), &cancel)
            .await
            .unwrap_err();

        assert!(matches!(err, ResourceError::Cancelled { .. }));
        assert!(api.requests().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancelled_during_backoff() {
        let api = ScriptedApi::new(vec![
            Err(anyhow::anyhow!("throttled")),
            page(&["arn:aws:s3:::a"], None),
        ]);
        let options = CollectOptions {
            retry: RetryPolicy {
                max_attempts: 3,
                base_delay: Duration::from_secs(10),
            },
            ..Default::default()
        };
        let cancel = CancellationToken::new();

        let (outcome, _) = tokio::join!(
            fetch_region(&api, "eu-west-1", &options, &cancel),
            async {
                tokio::time::sleep(Duration::from_secs(1)).await;
                cancel.cancel();
            }
        );

        assert_eq!(
            outcome.unwrap_err(),
            ResourceError::Cancelled {
                region: "eu-west-1".to_string(),
            }
        );
        assert_eq!(api.requests().len(), 1);
    }

    #[tokio::test]
    async fn test_repeated_cursor_fails_region() {
        let api = ScriptedApi::new(vec![
            page(&["arn:aws:s3:::a"], Some("t1")),
            page(&["arn:aws:s3:::b"], Some("t1")),
            page(&["arn:aws:s3:::c"], None),
        ]);

        let err = fetch_with_defaults(&api, "eu-west-1").await.unwrap_err();

        assert!(matches!(
            err,
            ResourceError::ApiRequestFailed { ref message, .. }
                if message.contains("same pagination token")
        ));
        assert_eq!(api.requests().len(), 2);
    }
}
