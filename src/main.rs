//! snitch - turn TODO annotations into issues

use std::process::ExitCode;

fn main() -> ExitCode {
    if let Err(e) = snitch::cli::run() {
        eprintln!("Error: {:#}", e);
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
