//! EntryLog CLI
//!
//! Two modes:
//! - **Shell mode**: `entrylog [flags] COMMAND`: run a single command and exit
//! - **Pipe mode**: `printf 'read E1\n' | entrylog`: read commands line by line from stdin
//!
//! Without `--data` the store lives only for the duration of the process.

mod commands;
mod format;
mod parse;
mod pipe;
mod state;

use std::io::IsTerminal;
use std::process;

use tracing_subscriber::EnvFilter;

use commands::build_cli;
use format::{format_error, format_output, format_value, OutputMode};
use parse::matches_to_action;
use state::{Reply, SessionOptions, SessionState};

fn main() {
    let mut cli = build_cli();
    let matches = cli.clone().get_matches();

    init_logging(matches.get_flag("verbose"));

    // Determine output mode
    let output_mode = if matches.get_flag("json") {
        OutputMode::Json
    } else if matches.get_flag("raw") {
        OutputMode::Raw
    } else {
        OutputMode::Human
    };

    let state = match SessionState::open(&SessionOptions::from_matches(&matches)) {
        Ok(state) => state,
        Err(e) => {
            eprintln!("(error) {:#}", e);
            process::exit(1);
        }
    };

    // Dispatch mode
    if matches.subcommand().is_some() {
        let exit_code = run_shell_mode(&matches, &state, output_mode);
        process::exit(exit_code);
    } else if std::io::stdin().is_terminal() {
        let _ = cli.print_help();
        println!();
    } else {
        let stdin = std::io::stdin();
        let exit_code = pipe::run_pipe(stdin.lock(), &state, output_mode);
        process::exit(exit_code);
    }
}

/// `RUST_LOG` decides the filter, defaulting to `warn`; `--verbose` forces `debug`.
fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run_shell_mode(matches: &clap::ArgMatches, state: &SessionState, mode: OutputMode) -> i32 {
    let action = match matches_to_action(matches, state.transient_keys()) {
        Ok(action) => action,
        Err(e) => {
            eprintln!("(error) {}", e);
            return 1;
        }
    };
    match state.run(action) {
        Ok(reply) => {
            print_reply(&reply, mode);
            0
        }
        Err(e) => {
            eprintln!("{}", format_error(&e, mode));
            1
        }
    }
}

pub(crate) fn print_reply(reply: &Reply, mode: OutputMode) {
    let formatted = match reply {
        Reply::Output(output) => format_output(output, mode),
        Reply::Value(value) => format_value(value, mode),
    };
    if !formatted.is_empty() {
        println!("{}", formatted);
    }
}
