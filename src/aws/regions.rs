//! AWS Regions

/// Region used when neither the CLI nor the config names one
pub const DEFAULT_REGION: &str = "eu-west-1";

/// Commercial regions crawled by `--all-regions`
pub fn list_regions() -> Vec<String> {
    [
        // North America
        "us-east-1",
        "us-east-2",
        "us-west-1",
        "us-west-2",
        "ca-central-1",
        // Europe
        "eu-central-1",
        "eu-west-1",
        "eu-west-2",
        "eu-west-3",
        "eu-north-1",
        // Asia Pacific
        "ap-northeast-1",
        "ap-northeast-2",
        "ap-northeast-3",
        "ap-southeast-1",
        "ap-southeast-2",
        "ap-south-1",
        // South America
        "sa-east-1",
    ]
    .iter()
    .map(|r| r.to_string())
    .collect()
}

/// Split `--region` values that may hold comma-separated lists
pub fn parse_region_args(values: &[String]) -> Vec<String> {
    values
        .iter()
        .flat_map(|v| v.split(','))
        .map(str::trim)
        .filter(|r| !r.is_empty())
        .map(str::to_string)
        .collect()
}
