//! Decomposition Registry
//!
//! Maps service names to the rule used to split their shortened ARNs.
//! Built-in rules are embedded from JSON at compile time; user rules from
//! the config file are layered on top without touching the built-in ones.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::OnceLock;

/// Embedded rule file (compiled into the binary)
const RULES_FILE: &str = include_str!("../resources/rules.json");

/// How a service's shortened ARN is split into product and id
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Decomposition {
    /// Keep the whole shortened ARN as the id
    #[default]
    Generic,
    /// `label/value` -> product `label`, id `value`
    Slash,
}

/// Root structure of resources/rules.json
#[derive(Debug, Clone, Deserialize)]
struct RulesFile {
    #[serde(default)]
    rules: HashMap<String, Decomposition>,
}

/// Built-in rules, parsed on first access
static BUILTIN_RULES: OnceLock<HashMap<String, Decomposition>> = OnceLock::new();

fn builtin_rules() -> &'static HashMap<String, Decomposition> {
    BUILTIN_RULES.get_or_init(|| {
        let parsed: RulesFile = serde_json::from_str(RULES_FILE)
            .unwrap_or_else(|e| panic!("Failed to parse embedded rules JSON: {}", e));
        parsed.rules
    })
}

/// Lookup from service name to decomposition rule, with a generic fallback
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleSet {
    rules: HashMap<String, Decomposition>,
}

impl Default for RuleSet {
    fn default() -> Self {
        Self::builtin()
    }
}

impl RuleSet {
    /// Rules shipped with the binary
    pub fn builtin() -> Self {
        Self {
            rules: builtin_rules().clone(),
        }
    }

    /// A rule set with no service-specific rules at all
    pub fn empty() -> Self {
        Self {
            rules: HashMap::new(),
        }
    }

    /// Add or replace the rule for one service
    pub fn with_rule(mut self, service: &str, rule: Decomposition) -> Self {
        self.rules.insert(service.to_string(), rule);
        self
    }

    /// Layer several rules on top of this set
    pub fn extend<I>(mut self, rules: I) -> Self
    where
        I: IntoIterator<Item = (String, Decomposition)>,
    {
        self.rules.extend(rules);
        self
    }

    /// Rule for a service, falling back to [`Decomposition::Generic`]
    pub fn rule_for(&self, service: &str) -> Decomposition {
        self.rules.get(service).copied().unwrap_or_default()
    }

    /// Services with an explicit rule, sorted
    pub fn services(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self.rules.keys().map(|s| s.as_str()).collect();
        keys.sort_unstable();
        keys
    }
}
