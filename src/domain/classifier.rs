//! Annotation classifier
//!
//! Recognises header lines in two forms, for every configured keyword:
//!
//! ```text
//! <prefix><keyword><urgency>: <suffix>          unreported
//! <prefix><keyword><urgency>(<id>): <suffix>    reported
//! ```
//!
//! `<urgency>` is zero or more repetitions of the keyword's last character.
//! The prefix is greedy, so the last occurrence of a header on a line wins.
//! Matching is purely textual: a keyword inside a string literal is
//! indistinguishable from a real annotation.

use std::path::PathBuf;

use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::title::{TitleError, TitleTransforms, TransformRule};
use super::todo::Todo;

/// Keyword used when none is configured
pub const DEFAULT_KEYWORD: &str = "TODO";

/// Body separator used when none is configured
pub const DEFAULT_BODY_SEPARATOR: &str = "---";

#[derive(Debug, Error)]
pub enum ClassifierError {
    #[error("Keywords must not be empty strings")]
    EmptyKeyword,

    #[error(transparent)]
    Title(#[from] TitleError),

    #[error("Failed to build pattern for keyword '{keyword}': {source}")]
    Pattern {
        keyword: String,
        #[source]
        source: regex::Error,
    },
}

/// Title section of the annotation configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TitleConfig {
    /// Ordered transform rules
    pub transforms: Vec<TransformRule>,
}

/// Annotation settings as loaded from project configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnnotationConfig {
    /// Keywords to recognise, in priority order (empty means `TODO`)
    pub keywords: Vec<String>,

    /// A body line ending with this text closes the annotation
    pub body_separator: String,

    /// Title derivation rules
    pub title: TitleConfig,
}

impl Default for AnnotationConfig {
    fn default() -> Self {
        Self {
            keywords: vec![],
            body_separator: DEFAULT_BODY_SEPARATOR.to_string(),
            title: TitleConfig::default(),
        }
    }
}

#[derive(Debug, Clone)]
struct KeywordPattern {
    keyword: String,
    unreported: Regex,
    reported: Regex,
}

impl KeywordPattern {
    fn new(keyword: &str) -> Result<Self, ClassifierError> {
        let last = keyword.chars().last().ok_or(ClassifierError::EmptyKeyword)?;
        let kw = regex::escape(keyword);
        let marker = regex::escape(&last.to_string());

        let build = |pattern: String| {
            Regex::new(&pattern).map_err(|source| ClassifierError::Pattern {
                keyword: keyword.to_string(),
                source,
            })
        };

        Ok(Self {
            keyword: keyword.to_string(),
            unreported: build(format!(r"^(.*){kw}((?:{marker})*): (.*)$"))?,
            reported: build(format!(r"^(.*){kw}((?:{marker})*)\(([^)]*)\): (.*)$"))?,
        })
    }
}

/// Compiled annotation configuration, shared read-only by scanner workers
#[derive(Debug, Clone)]
pub struct Classifier {
    patterns: Vec<KeywordPattern>,
    transforms: TitleTransforms,
    body_separator: String,
}

impl Classifier {
    /// Compiles the configuration
    pub fn new(config: &AnnotationConfig) -> Result<Self, ClassifierError> {
        let mut keywords: Vec<&str> = Vec::new();
        for keyword in &config.keywords {
            if keyword.is_empty() {
                return Err(ClassifierError::EmptyKeyword);
            }
            if !keywords.contains(&keyword.as_str()) {
                keywords.push(keyword);
            }
        }
        if keywords.is_empty() {
            keywords.push(DEFAULT_KEYWORD);
        }

        let patterns = keywords
            .into_iter()
            .map(KeywordPattern::new)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            patterns,
            transforms: TitleTransforms::compile(&config.title.transforms)?,
            body_separator: config.body_separator.clone(),
        })
    }

    /// Classifies a single line, returning an unplaced record on a match
    pub fn classify(&self, line: &str) -> Option<Todo> {
        self.classify_unreported(line)
            .or_else(|| self.classify_reported(line))
    }

    fn classify_unreported(&self, line: &str) -> Option<Todo> {
        self.patterns.iter().find_map(|p| {
            let caps = p.unreported.captures(line)?;
            Some(self.build(p, &caps[1], &caps[2], None, &caps[3]))
        })
    }

    fn classify_reported(&self, line: &str) -> Option<Todo> {
        self.patterns.iter().find_map(|p| {
            let caps = p.reported.captures(line)?;
            Some(self.build(p, &caps[1], &caps[2], Some(&caps[3]), &caps[4]))
        })
    }

    fn build(
        &self,
        pattern: &KeywordPattern,
        prefix: &str,
        marker: &str,
        id: Option<&str>,
        suffix: &str,
    ) -> Todo {
        Todo {
            prefix: prefix.to_string(),
            keyword: pattern.keyword.clone(),
            urgency: marker.chars().count() as u32,
            id: id.map(str::to_string),
            title: self.transforms.apply(suffix),
            suffix: suffix.to_string(),
            body: Vec::new(),
            filename: PathBuf::new(),
            line: 0,
        }
    }

    /// Returns true if the line closes an annotation body
    ///
    /// An empty separator disables the rule.
    pub fn is_body_separator(&self, line: &str) -> bool {
        !self.body_separator.is_empty() && line.ends_with(self.body_separator.as_str())
    }

    /// Configured keywords in priority order
    pub fn keywords(&self) -> impl Iterator<Item = &str> {
        self.patterns.iter().map(|p| p.keyword.as_str())
    }

    pub fn body_separator(&self) -> &str {
        &self.body_separator
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn classifier() -> Classifier {
        Classifier::new(&AnnotationConfig::default()).unwrap()
    }

    fn with_keywords(keywords: &[&str]) -> Classifier {
        Classifier::new(&AnnotationConfig {
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
            ..AnnotationConfig::default()
        })
        .unwrap()
    }

    #[test]
    fn default_keyword_is_todo() {
        let c = classifier();
        assert_eq!(c.keywords().collect::<Vec<_>>(), vec!["TODO"]);
        assert_eq!(c.body_separator(), "---");
    }

    #[test]
    fn unreported_header() {
        let todo = classifier().classify("// TODO: fix this").unwrap();

        assert_eq!(todo.prefix, "// ");
        assert_eq!(todo.keyword, "TODO");
        assert_eq!(todo.suffix, "fix this");
        assert_eq!(todo.title, "fix this");
        assert_eq!(todo.id, None);
        assert_eq!(todo.urgency, 0);
        assert!(todo.body.is_empty());
        assert_eq!(todo.line, 0);
        assert_eq!(todo.filename, PathBuf::new());
    }

    #[test]
    fn reported_header() {
        let todo = classifier().classify("// TODO(#7): already filed").unwrap();

        assert_eq!(todo.prefix, "// ");
        assert_eq!(todo.id.as_deref(), Some("#7"));
        assert_eq!(todo.suffix, "already filed");
    }

    #[test]
    fn urgency_counts_repeated_last_char() {
        let todo = classifier().classify("TODOOO: x").unwrap();
        assert_eq!(todo.urgency, 2);
        assert_eq!(todo.prefix, "");
        assert_eq!(todo.suffix, "x");

        let todo = classifier().classify("# TODOO(#3): y").unwrap();
        assert_eq!(todo.urgency, 1);
        assert_eq!(todo.id.as_deref(), Some("#3"));
    }

    #[test]
    fn non_matching_lines() {
        let c = classifier();
        assert!(c.classify("").is_none());
        assert!(c.classify("fn main() {}").is_none());
        assert!(c.classify("// TODO without colon").is_none());
        assert!(c.classify("// TODO:no space").is_none());
        assert!(c.classify("// todo: lowercase").is_none());
    }

    #[test]
    fn prefix_is_greedy() {
        let todo = classifier().classify("a TODO: b TODO: c").unwrap();
        assert_eq!(todo.prefix, "a TODO: b ");
        assert_eq!(todo.suffix, "c");
    }

    #[test]
    fn id_excludes_closing_paren() {
        let todo = classifier().classify("// TODO(#1): call f(x): now").unwrap();
        assert_eq!(todo.id.as_deref(), Some("#1"));
        assert_eq!(todo.suffix, "call f(x): now");
    }

    #[test]
    fn empty_parens_give_empty_id() {
        let todo = classifier().classify("// TODO(): nobody filed this").unwrap();
        assert_eq!(todo.id.as_deref(), Some(""));
        assert!(todo.is_reported());
        assert_eq!(todo.suffix, "nobody filed this");
    }

    #[test]
    fn keywords_tried_in_order() {
        let c = with_keywords(&["FIXME", "TODO"]);

        let todo = c.classify("// FIXME: broken").unwrap();
        assert_eq!(todo.keyword, "FIXME");

        let todo = c.classify("// TODO: later").unwrap();
        assert_eq!(todo.keyword, "TODO");

        let todo = c.classify("// FIXMEEE(#2): very broken").unwrap();
        assert_eq!(todo.keyword, "FIXME");
        assert_eq!(todo.urgency, 2);
    }

    #[test]
    fn keyword_is_matched_literally() {
        let c = with_keywords(&["X.Y"]);
        assert!(c.classify("// X.Y: dotted").is_some());
        assert!(c.classify("// XzY: not dotted").is_none());
    }

    #[test]
    fn string_literal_is_not_special() {
        let todo = classifier().classify(r#"let s = "TODO: inside string";"#).unwrap();
        assert_eq!(todo.prefix, "let s = \"");
        assert_eq!(todo.suffix, "inside string\";");
    }

    #[test]
    fn title_transforms_are_applied() {
        let c = Classifier::new(&AnnotationConfig {
            title: TitleConfig {
                transforms: vec![TransformRule::new(r"^\[WIP\] ", "")],
            },
            ..AnnotationConfig::default()
        })
        .unwrap();

        let todo = c.classify("// TODO: [WIP] refactor").unwrap();
        assert_eq!(todo.suffix, "[WIP] refactor");
        assert_eq!(todo.title, "refactor");
    }

    #[test]
    fn duplicate_keywords_are_collapsed() {
        let c = with_keywords(&["TODO", "FIXME", "TODO"]);
        assert_eq!(c.keywords().collect::<Vec<_>>(), vec!["TODO", "FIXME"]);
    }

    #[test]
    fn empty_keyword_is_rejected() {
        let config = AnnotationConfig {
            keywords: vec!["".to_string()],
            ..AnnotationConfig::default()
        };
        assert!(matches!(
            Classifier::new(&config),
            Err(ClassifierError::EmptyKeyword)
        ));
    }

    #[test]
    fn body_separator_matches_line_end() {
        let c = classifier();
        assert!(c.is_body_separator("Kappa ---"));
        assert!(!c.is_body_separator("--- Kappa"));
        assert!(!c.is_body_separator(""));
        assert!(!c.is_body_separator("Kappa ---            "));
    }

    #[test]
    fn empty_body_separator_disables_rule() {
        let c = Classifier::new(&AnnotationConfig {
            body_separator: String::new(),
            ..AnnotationConfig::default()
        })
        .unwrap();
        assert!(!c.is_body_separator("anything"));
    }

    #[test]
    fn display_round_trips_header() {
        let c = classifier();
        for line in ["// TODO: a", "# TODOOO(#12): b c", "TODO: "] {
            assert_eq!(c.classify(line).unwrap().to_string(), line);
        }
    }

    proptest! {
        #[test]
        fn lines_without_keyword_never_match(line in "[a-z0-9 /#:()*-]{0,60}") {
            prop_assert!(classifier().classify(&line).is_none());
        }

        #[test]
        fn unreported_split(prefix in "[ a-z/#*;-]{0,12}", suffix in "[a-zA-Z0-9 ,.]{0,40}") {
            let line = format!("{prefix}TODO: {suffix}");
            let todo = classifier().classify(&line).unwrap();
            prop_assert_eq!(todo.prefix, prefix);
            prop_assert_eq!(todo.suffix, suffix);
            prop_assert_eq!(todo.id, None);
            prop_assert_eq!(todo.urgency, 0);
        }

        #[test]
        fn reported_split(
            prefix in "[ a-z/#*;-]{0,12}",
            id in "#[0-9]{1,5}",
            suffix in "[a-zA-Z0-9 ,.]{0,40}",
        ) {
            let line = format!("{prefix}TODO({id}): {suffix}");
            let todo = classifier().classify(&line).unwrap();
            prop_assert_eq!(todo.prefix, prefix);
            prop_assert_eq!(todo.id, Some(id));
            prop_assert_eq!(todo.suffix, suffix);
        }
    }
}
