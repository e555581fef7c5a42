//! Configuration Management
//!
//! Loads the optional JSON config file for tagls. Every field may be
//! overridden from the command line.

use crate::aws::regions::{list_regions, DEFAULT_REGION};
use crate::error::ResourceError;
use crate::resource::{
    CollectOptions, Decomposition, MalformedPolicy, RetryPolicy, RuleSet, MAX_PAGE_SIZE,
};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// User configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct Config {
    /// Regions to crawl, in output order
    #[serde(default)]
    pub regions: Option<Vec<String>>,
    /// Named AWS profile
    #[serde(default)]
    pub profile: Option<String>,
    #[serde(default)]
    pub page_size: Option<i32>,
    /// Attempts per page request, including the first
    #[serde(default)]
    pub max_attempts: Option<u32>,
    #[serde(default)]
    pub retry_base_delay_ms: Option<u64>,
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,
    /// Regions collected at once
    #[serde(default)]
    pub concurrency: Option<usize>,
    /// Abort on the first ARN that cannot be normalized
    #[serde(default)]
    pub strict: bool,
    /// Extra decomposition rules, service name -> "slash" | "generic"
    #[serde(default)]
    pub rules: BTreeMap<String, Decomposition>,
    /// `service[:type]` filters passed to the tagging API
    #[serde(default)]
    pub resource_type_filters: Vec<String>,
}

impl Config {
    /// Get the default config file path
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("tagls").join("config.json"))
    }

    /// Load configuration from the default location
    ///
    /// A missing file means defaults; a file that exists but cannot be
    /// read or parsed is an error.
    pub fn load() -> Result<Self> {
        match Self::config_path() {
            Some(path) => Self::load_if_present(&path),
            None => Ok(Self::default()),
        }
    }

    /// Load from `path` when it exists, defaults otherwise
    pub fn load_if_present(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        Self::load_from(path)
    }

    /// Load configuration from an explicit path
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;

        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }

    /// Get effective regions (CLI > --all-regions > config > default)
    pub fn effective_regions(&self, cli_regions: &[String], all_regions: bool) -> Vec<String> {
        if !cli_regions.is_empty() {
            return cli_regions.to_vec();
        }
        if all_regions {
            return list_regions();
        }
        match &self.regions {
            Some(regions) if !regions.is_empty() => regions.clone(),
            _ => vec![DEFAULT_REGION.to_string()],
        }
    }

    /// Built-in rules with the configured ones layered on top
    pub fn rule_set(&self) -> RuleSet {
        RuleSet::builtin().extend(
            self.rules
                .iter()
                .map(|(service, rule)| (service.clone(), *rule)),
        )
    }

    /// Validate and convert into collector options
    pub fn collect_options(&self) -> std::result::Result<CollectOptions, ResourceError> {
        let defaults = CollectOptions::default();

        let page_size = self.page_size.unwrap_or(defaults.page_size);
        if !(1..=MAX_PAGE_SIZE).contains(&page_size) {
            return Err(ResourceError::InvalidConfig(format!(
                "page size must be between 1 and {}, got {}",
                MAX_PAGE_SIZE, page_size
            )));
        }

        let max_attempts = self.max_attempts.unwrap_or(defaults.retry.max_attempts);
        if max_attempts == 0 {
            return Err(ResourceError::InvalidConfig(
                "max_attempts must be at least 1".to_string(),
            ));
        }

        let concurrency = self.concurrency.unwrap_or(defaults.concurrency);
        if concurrency == 0 {
            return Err(ResourceError::InvalidConfig(
                "concurrency must be at least 1".to_string(),
            ));
        }

        let request_timeout = self
            .request_timeout_secs
            .map(Duration::from_secs)
            .unwrap_or(defaults.request_timeout);
        if request_timeout.is_zero() {
            return Err(ResourceError::InvalidConfig(
                "request_timeout_secs must be at least 1".to_string(),
            ));
        }

        let retry = RetryPolicy {
            max_attempts,
            base_delay: self
                .retry_base_delay_ms
                .map(Duration::from_millis)
                .unwrap_or(defaults.retry.base_delay),
        };

        Ok(CollectOptions {
            page_size,
            resource_type_filters: self.resource_type_filters.clone(),
            retry,
            request_timeout,
            concurrency,
            malformed: if self.strict {
                MalformedPolicy::Abort
            } else {
                MalformedPolicy::Skip
            },
            rules: self.rule_set(),
        })
    }
}
