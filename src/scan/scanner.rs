//! Per-file scanner
//!
//! Walks a file line by line with a two-state machine:
//!
//! ```text
//! LookingForHeader --header--> CollectingBody --separator / foreign line--> LookingForHeader
//!                                    |   ^
//!                                    +---+  new header: emit current, start next
//! ```
//!
//! While collecting, a line that starts with the header's prefix becomes a
//! body line (prefix stripped). A line ending with the body separator closes
//! the annotation and is consumed. Any other line closes the annotation and
//! is treated as ordinary text. The in-progress annotation is flushed at EOF.

use std::borrow::Cow;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use super::ScanError;
use crate::domain::{Classifier, Todo};

enum State {
    LookingForHeader,
    CollectingBody(Todo),
}

/// Scans a file, handing every completed annotation to `sink`
///
/// A sink error stops the scan and is returned as is.
pub fn scan_file<F>(path: &Path, classifier: &Classifier, sink: F) -> Result<(), ScanError>
where
    F: FnMut(Todo) -> Result<(), ScanError>,
{
    let file = File::open(path).map_err(|source| ScanError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    scan_reader(BufReader::new(file), path, classifier, sink)
}

/// Scans any buffered reader; `path` is recorded on every emitted annotation
pub fn scan_reader<R, F>(
    mut reader: R,
    path: &Path,
    classifier: &Classifier,
    mut sink: F,
) -> Result<(), ScanError>
where
    R: BufRead,
    F: FnMut(Todo) -> Result<(), ScanError>,
{
    let mut state = State::LookingForHeader;
    let mut buf = Vec::new();
    let mut number = 0;

    loop {
        buf.clear();
        let read = reader
            .read_until(b'\n', &mut buf)
            .map_err(|source| ScanError::Read {
                path: path.to_path_buf(),
                source,
            })?;
        if read == 0 {
            break;
        }

        number += 1;
        let line = decode_line(&buf);
        state = step(state, &line, number, path, classifier, &mut sink)?;
    }

    if let State::CollectingBody(todo) = state {
        sink(todo)?;
    }

    Ok(())
}

fn step<F>(
    state: State,
    line: &str,
    number: usize,
    path: &Path,
    classifier: &Classifier,
    sink: &mut F,
) -> Result<State, ScanError>
where
    F: FnMut(Todo) -> Result<(), ScanError>,
{
    match state {
        State::LookingForHeader => Ok(match classifier.classify(line) {
            Some(todo) => State::CollectingBody(todo.located(path, number)),
            None => State::LookingForHeader,
        }),
        State::CollectingBody(mut current) => {
            if let Some(next) = classifier.classify(line) {
                sink(current)?;
                Ok(State::CollectingBody(next.located(path, number)))
            } else if classifier.is_body_separator(line) {
                sink(current)?;
                Ok(State::LookingForHeader)
            } else if let Some(rest) = current.body_line(line) {
                current.body.push(rest.to_string());
                Ok(State::CollectingBody(current))
            } else {
                sink(current)?;
                Ok(State::LookingForHeader)
            }
        }
    }
}

/// Strips the line terminator (`\n` or `\r\n`) and decodes lossily
fn decode_line(raw: &[u8]) -> Cow<'_, str> {
    let raw = raw.strip_suffix(b"\n").unwrap_or(raw);
    let raw = raw.strip_suffix(b"\r").unwrap_or(raw);
    String::from_utf8_lossy(raw)
}
