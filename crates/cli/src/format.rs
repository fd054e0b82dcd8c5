//! Output formatting for the three output modes.
//!
//! - **Human**: pretty-printed JSON, `OK` for mutations, `(error)` prefix
//! - **Json**: compact JSON; errors as `{"code","message","details"}`
//! - **Raw**: response payload bytes as text, bare error message

use entrylog_executor::{Error, Output};
use serde_json::Value;

/// Output formatting mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    Human,
    Json,
    Raw,
}

/// Format a successful command output.
pub fn format_output(output: &Output, mode: OutputMode) -> String {
    match (output, mode) {
        (Output::Unit, OutputMode::Human) => "OK".to_string(),
        (Output::Unit, OutputMode::Json) => r#"{"ok":true}"#.to_string(),
        (Output::Unit, OutputMode::Raw) => String::new(),
        (Output::Records { count, json }, OutputMode::Human) => {
            let mut out = pretty(json);
            out.push_str(&format!("\n({} record{})", count, if *count == 1 { "" } else { "s" }));
            out
        }
        (Output::Record(bytes), OutputMode::Human) => pretty(bytes),
        (other, _) => String::from_utf8_lossy(other.payload()).into_owned(),
    }
}

/// Format a JSON value produced outside the command set (e.g. read-full).
pub fn format_value(value: &Value, mode: OutputMode) -> String {
    match mode {
        OutputMode::Human => {
            serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
        }
        OutputMode::Json | OutputMode::Raw => value.to_string(),
    }
}

/// Format an error.
pub fn format_error(err: &Error, mode: OutputMode) -> String {
    match mode {
        OutputMode::Human => format!("(error) {}: {}", err.error_code(), err),
        OutputMode::Json => serde_json::to_string(&err.to_wire_error())
            .unwrap_or_else(|_| format!(r#"{{"code":"{}"}}"#, err.error_code())),
        OutputMode::Raw => err.to_string(),
    }
}

fn pretty(bytes: &[u8]) -> String {
    match serde_json::from_slice::<Value>(bytes) {
        Ok(value) => serde_json::to_string_pretty(&value)
            .unwrap_or_else(|_| String::from_utf8_lossy(bytes).into_owned()),
        Err(_) => String::from_utf8_lossy(bytes).into_owned(),
    }
}
