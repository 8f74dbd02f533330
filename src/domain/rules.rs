//! Layering rules: allow/deny statements over qualified-name patterns.
//!
//! Rules are an overlay, not a closed-world schema: an edge matched by no rule
//! is implicitly allowed. Precedence is first-match in declaration order, so
//! an `allowed: true` rule can carve an exception out of a broader deny rule
//! that follows it.

use crate::domain::failure::ConfigError;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// One layering policy statement, externally supplied.
///
/// Patterns use `*` as a wildcard over qualified names; dots are literal.
/// `ui.*` matches `ui.Screen` and `ui.widgets.Button` but not `uikit.X`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayeringRule {
    pub id: String,
    pub from_pattern: String,
    pub to_pattern: String,
    pub allowed: bool,
}

#[derive(Debug)]
struct CompiledRule {
    id: String,
    allowed: bool,
    from: Regex,
    to: Regex,
}

/// Outcome of matching an edge against the rule set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuleMatch<'a> {
    pub rule_id: &'a str,
    pub allowed: bool,
}

/// A validated, compiled rule set. Compilation failure is a configuration
/// error: analysis is refused until the rule set is fixed.
#[derive(Debug, Default)]
pub struct CompiledRules {
    rules: Vec<CompiledRule>,
}

impl CompiledRules {
    pub fn compile(rules: &[LayeringRule]) -> Result<Self, ConfigError> {
        let mut compiled = Vec::with_capacity(rules.len());
        for rule in rules {
            compiled.push(CompiledRule {
                id: rule.id.clone(),
                allowed: rule.allowed,
                from: compile_pattern(&rule.id, &rule.from_pattern)?,
                to: compile_pattern(&rule.id, &rule.to_pattern)?,
            });
        }
        Ok(Self { rules: compiled })
    }

    /// First rule (declaration order) matching both endpoints.
    pub fn first_match(&self, from: &str, to: &str) -> Option<RuleMatch<'_>> {
        self.rules
            .iter()
            .find(|rule| rule.from.is_match(from) && rule.to.is_match(to))
            .map(|rule| RuleMatch {
                rule_id: &rule.id,
                allowed: rule.allowed,
            })
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }
}

fn compile_pattern(rule_id: &str, pattern: &str) -> Result<Regex, ConfigError> {
    if pattern.is_empty() {
        return Err(ConfigError::InvalidPattern {
            rule_id: rule_id.to_string(),
            pattern: pattern.to_string(),
            reason: "pattern is empty".to_string(),
        });
    }
    let mut regex = String::with_capacity(pattern.len() + 8);
    regex.push('^');
    for ch in pattern.chars() {
        match ch {
            '*' => regex.push_str(".*"),
            '.' | '$' => {
                regex.push('\\');
                regex.push(ch);
            }
            c if c.is_ascii_alphanumeric() || c == '_' => regex.push(c),
            c => {
                return Err(ConfigError::InvalidPattern {
                    rule_id: rule_id.to_string(),
                    pattern: pattern.to_string(),
                    reason: format!("unsupported character `{c}`"),
                });
            }
        }
    }
    regex.push('$');
    Regex::new(&regex).map_err(|err| ConfigError::InvalidPattern {
        rule_id: rule_id.to_string(),
        pattern: pattern.to_string(),
        reason: err.to_string(),
    })
}
