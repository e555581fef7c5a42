//! Error types for resource collection

use thiserror::Error;

/// Errors raised while collecting and normalizing tagged resources
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResourceError {
    #[error("Invalid identifier format '{arn}': {reason}")]
    InvalidIdentifierFormat { arn: String, reason: String },

    #[error("Malformed {service} resource identifier '{arn}': {reason}")]
    MalformedResourceIdentifier {
        arn: String,
        service: String,
        reason: String,
    },

    #[error("Tag search request failed in region {region} after {attempts} attempt(s): {message}")]
    ApiRequestFailed {
        region: String,
        attempts: u32,
        message: String,
    },

    #[error("Failed to create tag search client for region {region}: {message}")]
    ClientSetup { region: String, message: String },

    #[error("Collection cancelled in region {region}")]
    Cancelled { region: String },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl ResourceError {
    pub(crate) fn invalid_format(arn: &str, reason: impl Into<String>) -> Self {
        Self::InvalidIdentifierFormat {
            arn: arn.to_string(),
            reason: reason.into(),
        }
    }

    /// Whether this error concerns a single record rather than a whole region
    pub fn is_per_record(&self) -> bool {
        matches!(
            self,
            Self::InvalidIdentifierFormat { .. } | Self::MalformedResourceIdentifier { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, ResourceError>;
