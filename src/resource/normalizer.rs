//! Resource Normalizer
//!
//! Turns an ARN into a [`ResourceRecord`] using the rule registered for its service.

use super::arn::{service_from_arn, short_arn};
use super::record::ResourceRecord;
use super::registry::{Decomposition, RuleSet};
use crate::error::{ResourceError, Result};

impl Decomposition {
    /// Split a shortened ARN into `(product, id)`
    fn decompose(&self, short: &str, service: &str, arn: &str) -> Result<(Option<String>, String)> {
        match self {
            Decomposition::Generic => Ok((None, short.to_string())),
            Decomposition::Slash => {
                let Some((product, id)) = short.split_once('/') else {
                    return Err(ResourceError::MalformedResourceIdentifier {
                        arn: arn.to_string(),
                        service: service.to_string(),
                        reason: format!("expected 'label/value', got '{}'", short),
                    });
                };
                if product.is_empty() {
                    return Err(ResourceError::MalformedResourceIdentifier {
                        arn: arn.to_string(),
                        service: service.to_string(),
                        reason: "empty product label".to_string(),
                    });
                }
                Ok((Some(product.to_string()), id.to_string()))
            }
        }
    }
}

impl RuleSet {
    /// Build a record from an already shortened ARN
    pub fn normalize(
        &self,
        short: &str,
        service: &str,
        region: &str,
        arn: &str,
    ) -> Result<ResourceRecord> {
        let (product, id) = self.rule_for(service).decompose(short, service, arn)?;

        Ok(ResourceRecord {
            region: region.to_string(),
            service: service.to_string(),
            product,
            id,
            arn: arn.to_string(),
        })
    }

    /// Classify, shorten and normalize a full ARN
    pub fn normalize_arn(&self, arn: &str, region: &str) -> Result<ResourceRecord> {
        let service = service_from_arn(arn)?;
        let short = short_arn(arn)?;
        self.normalize(&short, &service, region, arn)
    }
}
