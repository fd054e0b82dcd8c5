//! Pipe mode: one command per line from stdin.
//!
//! Lines are split with shell quoting rules. Blank lines and lines starting
//! with `#` are skipped. Every line runs against the same session, so a
//! script can create entries and query them without a snapshot file.

use std::io::BufRead;

use crate::commands::build_cli;
use crate::format::{format_error, OutputMode};
use crate::parse::matches_to_action;
use crate::state::SessionState;
use crate::print_reply;

/// Run every line of `input`. Returns the process exit code.
pub fn run_pipe<R: BufRead>(input: R, state: &SessionState, mode: OutputMode) -> i32 {
    let mut exit_code = 0;
    for (number, line) in input.lines().enumerate() {
        let line = match line {
            Ok(line) => line,
            Err(e) => {
                eprintln!("(error) Failed to read stdin: {}", e);
                return 1;
            }
        };
        match run_line(&line, state, mode) {
            Ok(true) => {}
            Ok(false) => exit_code = 1,
            Err(message) => {
                eprintln!("(error) line {}: {}", number + 1, message);
                exit_code = 1;
            }
        }
    }
    exit_code
}

/// `Err` for lines that do not parse; `Ok(false)` for commands that failed.
fn run_line(line: &str, state: &SessionState, mode: OutputMode) -> Result<bool, String> {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return Ok(true);
    }

    let words = shlex::split(trimmed).ok_or_else(|| "Unbalanced quotes".to_string())?;
    let matches = build_cli()
        .try_get_matches_from(std::iter::once("entrylog".to_string()).chain(words))
        .map_err(|e| e.to_string().trim_end().to_string())?;
    let action = matches_to_action(&matches, state.transient_keys())?;

    match state.run(action) {
        Ok(reply) => {
            print_reply(&reply, mode);
            Ok(true)
        }
        Err(e) => {
            eprintln!("{}", format_error(&e, mode));
            Ok(false)
        }
    }
}
