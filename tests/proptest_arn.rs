//! Property-based tests using proptest
//!
//! These tests check ARN classification, shortening and normalization
//! against randomized identifiers.

use proptest::prelude::*;
use tagls::error::ResourceError;
use tagls::resource::{service_from_arn, short_arn, Decomposition, RuleSet};

/// A single ARN segment without colons
fn arb_segment() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9/_.-]{0,12}"
}

fn arb_service() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9-]{1,15}"
}

fn arb_region() -> impl Strategy<Value = String> {
    prop_oneof!["", "eu-west-1", "us-east-1", "ap-south-1", "sa-east-1"].prop_map(String::from)
}

/// Full ARN plus the resource segments after the account
fn arb_arn() -> impl Strategy<Value = (String, String, Vec<String>)> {
    (
        prop_oneof!["aws", "aws-cn", "aws-us-gov"],
        arb_service(),
        arb_region(),
        "[0-9]{0,12}",
        prop::collection::vec(arb_segment(), 1..5),
    )
        .prop_map(|(partition, service, region, account, tail)| {
            let arn = format!(
                "arn:{}:{}:{}:{}:{}",
                partition,
                service,
                region,
                account,
                tail.join(":")
            );
            (arn, service, tail)
        })
}

proptest! {
    /// Shortening keeps segments 6..N joined with '/'
    #[test]
    fn short_arn_joins_tail_with_slash((arn, _service, tail) in arb_arn()) {
        prop_assert_eq!(short_arn(&arn).unwrap(), tail.join("/"));
    }

    /// Fewer than six segments is always an error, never a panic
    #[test]
    fn short_arn_rejects_short_input(segments in prop::collection::vec("[a-z0-9]{0,6}", 0..5)) {
        let arn = segments.join(":");
        let is_invalid_format = matches!(
            short_arn(&arn),
            Err(ResourceError::InvalidIdentifierFormat { .. })
        );
        prop_assert!(is_invalid_format);
    }

    /// The classifier returns the segment after the partition
    #[test]
    fn classifier_returns_service((arn, service, _tail) in arb_arn()) {
        prop_assert_eq!(service_from_arn(&arn).unwrap(), service);
    }

    /// The classified service selects the rule used for the record
    #[test]
    fn classified_service_drives_rule((arn, service, _tail) in arb_arn()) {
        let rules = RuleSet::builtin();
        match rules.normalize_arn(&arn, "eu-west-1") {
            Ok(record) => {
                prop_assert_eq!(&record.service, &service);
                let has_product = record.product.is_some();
                prop_assert_eq!(has_product, rules.rule_for(&service) == Decomposition::Slash);
            }
            Err(err) => {
                let is_malformed = matches!(err, ResourceError::MalformedResourceIdentifier { .. });
                prop_assert!(is_malformed);
                prop_assert_eq!(rules.rule_for(&service), Decomposition::Slash);
            }
        }
    }

    /// Slash decomposition recomposes to the shortened ARN
    #[test]
    fn slash_round_trip(label in "[a-z][a-z-]{0,15}", value in "[a-zA-Z0-9/_.-]{0,20}") {
        let short = format!("{}/{}", label, value);
        let arn = format!("arn:aws:ec2:eu-west-1:111111111111:{}", short);
        let record = RuleSet::builtin().normalize(&short, "ec2", "eu-west-1", &arn).unwrap();

        prop_assert_eq!(record.product.as_deref(), Some(label.as_str()));
        prop_assert_eq!(format!("{}/{}", record.product_display(), record.id), short);
    }

    /// Normalizing the same ARN twice gives identical records
    #[test]
    fn normalize_is_idempotent((arn, _service, _tail) in arb_arn()) {
        let rules = RuleSet::builtin();
        prop_assert_eq!(
            rules.normalize_arn(&arn, "us-east-1"),
            rules.normalize_arn(&arn, "us-east-1")
        );
    }

    /// Generic services keep the whole shortened ARN as id
    #[test]
    fn generic_rule_keeps_short_arn((arn, service, tail) in arb_arn()) {
        let rules = RuleSet::empty();
        let record = rules.normalize_arn(&arn, "eu-west-1").unwrap();

        prop_assert_eq!(record.service, service);
        prop_assert_eq!(record.product, None);
        prop_assert_eq!(record.id, tail.join("/"));
        prop_assert_eq!(record.arn, arn);
    }
}
