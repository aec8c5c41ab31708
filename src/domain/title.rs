//! Title transforms
//!
//! Ordered regex substitutions that turn an annotation's raw suffix into an
//! issue title. Rules are applied in declaration order, each one receiving
//! the output of the previous one.

use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TitleError {
    #[error("Invalid title transform pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

/// A single `(match, replace)` rule as written in configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransformRule {
    /// Regex matched against the title
    #[serde(rename = "match")]
    pub pattern: String,

    /// Replacement text; supports `$1` / `${name}` group references
    #[serde(default)]
    pub replace: String,
}

impl TransformRule {
    pub fn new(pattern: impl Into<String>, replace: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            replace: replace.into(),
        }
    }
}

/// Compiled title transform pipeline
#[derive(Debug, Clone, Default)]
pub struct TitleTransforms {
    rules: Vec<(Regex, String)>,
}

impl TitleTransforms {
    /// Compiles the rules, failing on the first invalid pattern
    pub fn compile(rules: &[TransformRule]) -> Result<Self, TitleError> {
        let rules = rules
            .iter()
            .map(|rule| {
                Regex::new(&rule.pattern)
                    .map(|re| (re, rule.replace.clone()))
                    .map_err(|source| TitleError::InvalidPattern {
                        pattern: rule.pattern.clone(),
                        source,
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { rules })
    }

    /// Derives a title from a suffix
    pub fn apply(&self, suffix: &str) -> String {
        self.rules
            .iter()
            .fold(suffix.to_string(), |title, (re, replace)| {
                re.replace_all(&title, replace.as_str()).into_owned()
            })
    }
}
