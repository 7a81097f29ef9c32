use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Category assigned when no rule matches a description.
pub const FALLBACK_CATEGORY: &str = "Other";

/// One user-configured classification rule: a category label and the
/// regex pattern that claims a transaction for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryRule {
    pub label: String,
    pub pattern: String,
}

#[derive(Error, Debug)]
pub enum RuleError {
    #[error("invalid pattern for category '{label}': {source}")]
    InvalidPattern {
        label: String,
        #[source]
        source: regex::Error,
    },
}

/// Outcome of classifying one description.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Categorization {
    pub category: String,
    /// Exact substring the winning pattern matched; absent on fallback.
    pub payee: Option<String>,
}

/// Internal pairing of a rule label with its precompiled regex.
#[derive(Debug)]
struct CompiledRule {
    label: String,
    regex: Regex,
}

/// First-match-wins classifier over an ordered rule set.
///
/// Rules are evaluated in the exact order they were declared; two rule
/// sets with the same entries in different order are different engines.
/// Patterns compile once here, case-insensitively, so a bad pattern
/// fails the run at startup instead of on the first row it would touch.
#[derive(Debug)]
pub struct CategoryRuleEngine {
    rules: Vec<CompiledRule>,
}

impl CategoryRuleEngine {
    pub fn new(rules: Vec<CategoryRule>) -> Result<Self, RuleError> {
        let rules = rules
            .into_iter()
            .map(|rule| {
                let regex = RegexBuilder::new(&rule.pattern)
                    .case_insensitive(true)
                    .build()
                    .map_err(|source| RuleError::InvalidPattern {
                        label: rule.label.clone(),
                        source,
                    })?;
                Ok(CompiledRule {
                    label: rule.label,
                    regex,
                })
            })
            .collect::<Result<Vec<_>, RuleError>>()?;
        Ok(Self { rules })
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Classifies a description. Never fails: no match is the
    /// [`FALLBACK_CATEGORY`] outcome, not an error.
    pub fn categorize(&self, description: &str) -> Categorization {
        for rule in &self.rules {
            if let Some(m) = rule.regex.find(description) {
                tracing::debug!(category = %rule.label, payee = %m.as_str(), "rule matched");
                return Categorization {
                    category: rule.label.clone(),
                    payee: Some(m.as_str().to_string()),
                };
            }
        }
        Categorization {
            category: FALLBACK_CATEGORY.to_string(),
            payee: None,
        }
    }
}
