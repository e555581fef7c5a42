//! Presentation
//!
//! Renders collected records for stdout. The collector makes no formatting
//! decisions; everything about layout lives here.

mod table;

use crate::resource::ResourceRecord;
use anyhow::{Context, Result};
use clap::ValueEnum;

pub use table::render_table;

/// Output format for collected records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}

/// Render records in the requested format
pub fn render(records: &[ResourceRecord], format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Table => Ok(render_table(records)),
        OutputFormat::Json => render_json(records),
    }
}

/// Pretty-printed JSON array of records
pub fn render_json(records: &[ResourceRecord]) -> Result<String> {
    let mut out = serde_json::to_string_pretty(records).context("Failed to serialize records")?;
    out.push('\n');
    Ok(out)
}

/// One-line summary for stderr
pub fn summary(records: usize, regions: usize, skipped: usize) -> String {
    let mut line = format!(
        "{} resource{} in {} region{}",
        records,
        if records == 1 { "" } else { "s" },
        regions,
        if regions == 1 { "" } else { "s" }
    );
    if skipped > 0 {
        line.push_str(&format!(" ({} skipped, see log)", skipped));
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    fn record(product: Option<&str>) -> ResourceRecord {
        ResourceRecord {
            region: "eu-west-1".to_string(),
            service: "ec2".to_string(),
            product: product.map(|p| p.to_string()),
            id: "i-0123abc".to_string(),
            arn: "arn:aws:ec2:eu-west-1:111111111111:instance/i-0123abc".to_string(),
        }
    }

    #[test]
    fn test_json_output_fields() {
        let out = render(&[record(Some("instance")), record(None)], OutputFormat::Json).unwrap();
        let parsed: Value = serde_json::from_str(&out).unwrap();

        assert_eq!(parsed[0]["region"], "eu-west-1");
        assert_eq!(parsed[0]["product"], "instance");
        assert_eq!(parsed[0]["arn"], "arn:aws:ec2:eu-west-1:111111111111:instance/i-0123abc");
        assert!(parsed[1]["product"].is_null());
    }

    #[test]
    fn test_json_output_empty() {
        assert_eq!(render_json(&[]).unwrap(), "[]\n");
    }

    #[test]
    fn test_summary() {
        assert_eq!(summary(1, 1, 0), "1 resource in 1 region");
        assert_eq!(summary(3, 2, 1), "3 resources in 2 regions (1 skipped, see log)");
    }
}
