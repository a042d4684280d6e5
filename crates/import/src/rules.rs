use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One payee rewrite: a regex applied case-insensitively, with a replacement
/// that may reference capture groups as `$1` or `${name}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MappingRule {
    pub pattern: String,
    pub replacement: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// The on-disk rule document: a `mappings` list, in application order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RuleSet {
    pub mappings: Vec<MappingRule>,
}

impl RuleSet {
    pub fn from_yaml(content: &str) -> Result<Self, MappingError> {
        serde_yaml::from_str(content).map_err(|e| MappingError::MalformedRuleSet(e.to_string()))
    }

    pub fn to_yaml(&self) -> Result<String, MappingError> {
        serde_yaml::to_string(self).map_err(|e| MappingError::MalformedRuleSet(e.to_string()))
    }
}

#[derive(Debug, Error)]
pub enum MappingError {
    #[error("invalid mapping pattern `{pattern}`: {source}")]
    PatternCompilation {
        pattern: String,
        #[source]
        source: regex::Error,
    },
    #[error("malformed rule set: {0}")]
    MalformedRuleSet(String),
}

/// Pairing of a rule's replacement with its precompiled pattern.
struct CompiledRule {
    pattern: Regex,
    replacement: String,
}

/// Applies an ordered list of mapping rules to payee names.
///
/// Rules run in the order they were supplied, each against the output of the
/// previous one, so a later rule can rewrite an earlier rule's replacement.
pub struct PayeeMapper {
    rules: Vec<CompiledRule>,
}

impl PayeeMapper {
    /// Compile every pattern up front. Construction fails atomically on the
    /// first invalid pattern; a mapper is never returned half-built.
    pub fn new(rules: Vec<MappingRule>) -> Result<Self, MappingError> {
        let rules = rules
            .into_iter()
            .map(|rule| {
                let pattern = RegexBuilder::new(&rule.pattern)
                    .case_insensitive(true)
                    .build()
                    .map_err(|source| MappingError::PatternCompilation {
                        pattern: rule.pattern.clone(),
                        source,
                    })?;
                Ok(CompiledRule {
                    pattern,
                    replacement: rule.replacement,
                })
            })
            .collect::<Result<Vec<_>, MappingError>>()?;
        Ok(PayeeMapper { rules })
    }

    pub fn from_rule_set(set: RuleSet) -> Result<Self, MappingError> {
        Self::new(set.mappings)
    }

    pub fn from_yaml(content: &str) -> Result<Self, MappingError> {
        Self::from_rule_set(RuleSet::from_yaml(content)?)
    }

    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }

    /// Run every rule over `name`, cumulatively, then trim surrounding
    /// whitespace. An input no rule matches comes back trimmed but otherwise
    /// unchanged.
    pub fn map_payee(&self, name: &str) -> String {
        let mut result = name.to_string();
        for rule in &self.rules {
            result = rule
                .pattern
                .replace_all(&result, rule.replacement.as_str())
                .into_owned();
        }
        result.trim().to_string()
    }
}
