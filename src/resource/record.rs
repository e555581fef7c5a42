//! Normalized resource record

use serde::Serialize;

/// One tagged resource, as reported by the tag search API
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResourceRecord {
    pub region: String,
    pub service: String,
    /// Sub-type label such as `instance` or `cluster`
    pub product: Option<String>,
    pub id: String,
    /// Original ARN
    pub arn: String,
}

impl ResourceRecord {
    /// Product label for display, empty when the service has no decomposition rule
    pub fn product_display(&self) -> &str {
        self.product.as_deref().unwrap_or("")
    }
}
