//! ARN parsing
//!
//! Splits a fully-qualified ARN (`arn:partition:service:region:account:resource`)
//! into the pieces the normalizer needs.

use crate::error::{ResourceError, Result};

/// Partitions accepted after the `arn:` prefix
pub const PARTITIONS: &[&str] = &["aws", "aws-cn", "aws-us-gov"];

/// Number of leading segments (arn, partition, service, region, account)
const PREFIX_SEGMENTS: usize = 5;

/// Extract the service token from an ARN
///
/// `arn:aws:ec2:eu-west-1:111111111111:instance/i-0123` -> `ec2`
pub fn service_from_arn(arn: &str) -> Result<String> {
    let Some(rest) = arn.strip_prefix("arn:") else {
        return Err(ResourceError::invalid_format(arn, "missing 'arn:' prefix"));
    };

    let Some((partition, rest)) = rest.split_once(':') else {
        return Err(ResourceError::invalid_format(arn, "no service segment"));
    };

    if !PARTITIONS.contains(&partition) {
        return Err(ResourceError::invalid_format(
            arn,
            format!("unknown partition '{}'", partition),
        ));
    }

    match rest.split(':').next() {
        Some(service) if !service.is_empty() => Ok(service.to_string()),
        _ => Err(ResourceError::invalid_format(arn, "empty service segment")),
    }
}

/// Drop partition, service, region and account from an ARN
///
/// Everything after the fifth colon is kept; any further colons are
/// rejoined with `/`, so `log-group:/aws/foo` becomes `log-group//aws/foo`.
pub fn short_arn(arn: &str) -> Result<String> {
    let segments: Vec<&str> = arn.split(':').collect();

    if segments.len() <= PREFIX_SEGMENTS {
        return Err(ResourceError::invalid_format(
            arn,
            format!(
                "expected at least {} colon-delimited segments, found {}",
                PREFIX_SEGMENTS + 1,
                segments.len()
            ),
        ));
    }

    Ok(segments[PREFIX_SEGMENTS..].join("/"))
}
