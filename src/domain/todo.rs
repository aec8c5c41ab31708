//! Annotation record
//!
//! A [`Todo`] is one header line (`// TODO(#42): title`) plus the body lines
//! that follow it. Records are produced by the scanner and are otherwise
//! plain values: reporting assigns an id through [`Todo::with_id`], nothing
//! else mutates them.

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// A TODO-style annotation found in a source file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Todo {
    /// Text before the keyword on the header line (usually a comment marker)
    pub prefix: String,

    /// Configured keyword that matched (e.g. `TODO`, `FIXME`)
    pub keyword: String,

    /// Number of repeated trailing keyword characters (`TODOOO` is 2)
    #[serde(default)]
    pub urgency: u32,

    /// Tracker identifier, `None` while the annotation is unreported
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Issue title derived from the suffix by the title transforms
    pub title: String,

    /// Raw text after the keyword and id
    pub suffix: String,

    /// Continuation lines with the shared prefix stripped
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub body: Vec<String>,

    /// File containing the header line (empty until placed)
    #[serde(default)]
    pub filename: PathBuf,

    /// 1-indexed header line number (0 until placed)
    #[serde(default)]
    pub line: usize,
}

impl Todo {
    /// Returns true if the annotation already has a tracker id
    pub fn is_reported(&self) -> bool {
        self.id.is_some()
    }

    /// Places the record at a file location
    pub fn located(mut self, filename: impl Into<PathBuf>, line: usize) -> Self {
        self.filename = filename.into();
        self.line = line;
        self
    }

    /// Returns a copy carrying the given tracker id
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// The repeated keyword characters that encode urgency
    pub fn urgency_marker(&self) -> String {
        match self.keyword.chars().last() {
            Some(c) => std::iter::repeat(c).take(self.urgency as usize).collect(),
            None => String::new(),
        }
    }

    /// Keyword with urgency markers and id, e.g. `TODOO(#7)`
    pub fn tag(&self) -> String {
        match &self.id {
            Some(id) => format!("{}{}({})", self.keyword, self.urgency_marker(), id),
            None => format!("{}{}", self.keyword, self.urgency_marker()),
        }
    }

    /// Location-prefixed form compatible with Emacs compilation mode
    ///
    /// `src/main.rs:12: // TODO(#3): handle errors`
    pub fn log_string(&self) -> String {
        format!("{}:{}: {}", self.filename.display(), self.line, self)
    }

    /// Returns the remainder of `line` if it continues this annotation's body
    pub fn body_line<'a>(&self, line: &'a str) -> Option<&'a str> {
        line.strip_prefix(self.prefix.as_str())
    }

    /// Last line (inclusive) occupied by the header and its body
    pub fn last_line(&self) -> usize {
        self.line + self.body.len()
    }

    /// Builds the issue description from the body and an optional extra note
    pub fn issue_body(&self, extra: Option<&str>) -> String {
        let mut body = self.body.join("\n");

        if let Some(extra) = extra.filter(|e| !e.is_empty()) {
            if !body.is_empty() {
                body.push_str("\n\n");
            }
            body.push_str(extra);
        }

        body
    }
}

impl fmt::Display for Todo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}: {}", self.prefix, self.tag(), self.suffix)
    }
}
