//! # Command-Line Interface
//!
//! User-facing CLI commands and output formatting.
//!
//! ## Commands
//!
//! | Command | Purpose |
//! |---------|---------|
//! | `list` | Print annotations, optionally only reported or unreported ones |
//! | `report` | File issues for unreported annotations and commit the rewrite |
//! | `purge` | Delete annotations whose issues are closed and commit |
//! | `trackers` | Show discovered tracker plugins |
//!
//! ## Output Formats
//!
//! All commands support `--format` flag:
//! - `text` (default) - `file:line: header` lines
//! - `json` - Machine-parseable JSON
//!
//! ## Verbose Mode
//!
//! Use `--verbose` (or `-v`) for debug output, including every git and
//! plugin command line:
//! ```bash
//! snitch --verbose list
//! ```
//!
//! ## Entry Point
//!
//! Call [`run()`] to parse arguments and execute the appropriate command.

mod app;
mod list;
mod output;
mod purge;
mod report;
mod session;
mod trackers;

pub use app::{run, Cli, Commands};
pub use output::{Output, OutputFormat};
