//! snitch - finds TODO annotations in a git repository and reports them
//!
//! Annotations such as `// TODO: fix this` are extracted from every tracked
//! file by a concurrent walker, filed as issues through tracker plugins,
//! rewritten in place as `// TODO(#42): fix this`, and removed again once
//! the issue is closed.

pub mod cli;
pub mod domain;
pub mod scan;
pub mod storage;
pub mod tracker;
pub mod workflow;

pub use domain::{AnnotationConfig, Classifier, Todo};
pub use scan::{scan_file, walk, Walk};
