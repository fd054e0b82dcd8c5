//! ArgMatches → CliAction conversion.
//!
//! Mutating subcommands are turned into raw invocations with their payload
//! in the transient map, the same path a ledger client takes, so the CLI
//! never bypasses input validation. Reads and queries build a [`Command`]
//! directly.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use clap::ArgMatches;
use entrylog_core::TransientKeys;
use entrylog_executor::{Command, TransientMap};
use serde_json::json;

/// The result of parsing user input.
#[derive(Debug)]
pub enum CliAction {
    /// A decoded command to execute.
    Execute(Command),
    /// A raw invocation, decoded by the executor.
    Invoke {
        function: String,
        args: Vec<String>,
        transient: TransientMap,
    },
    /// Merged view of both records of one entry.
    ReadFull(String),
}

/// Convert clap ArgMatches into a CliAction.
pub fn matches_to_action(matches: &ArgMatches, keys: &TransientKeys) -> Result<CliAction, String> {
    let (sub_name, m) = matches
        .subcommand()
        .ok_or_else(|| "No command provided".to_string())?;

    match sub_name {
        "create" => parse_create(m, keys),
        "read" => Ok(CliAction::Execute(Command::Read {
            entry_id: arg(m, "id")?,
        })),
        "read-sensitive" => Ok(CliAction::Execute(Command::ReadSensitive {
            entry_id: arg(m, "id")?,
        })),
        "read-full" => Ok(CliAction::ReadFull(arg(m, "id")?)),
        "update-address" => {
            let payload = json!({"entryLogID": arg(m, "id")?, "address": arg(m, "address")?});
            Ok(invoke("updateAddress", &keys.update_address, payload))
        }
        "delete" => {
            let payload = json!({"entryLogID": arg(m, "id")?});
            Ok(invoke("delete", &keys.delete, payload))
        }
        "query-facility" => Ok(CliAction::Execute(Command::QueryByFacility {
            facility_id: arg(m, "facility")?,
        })),
        "query-personal" => Ok(CliAction::Execute(Command::QueryByPersonal {
            personal_id: arg(m, "personal")?,
        })),
        "query" => Ok(CliAction::Execute(Command::QueryRaw {
            query: arg(m, "selector")?,
        })),
        "list-facility" => Ok(CliAction::Execute(Command::ListByFacilityIndex {
            facility_id: arg(m, "facility")?,
        })),
        "list-personal" => Ok(CliAction::Execute(Command::ListByPersonalIndex {
            personal_id: arg(m, "personal")?,
        })),
        "call" => parse_call(m),
        other => Err(format!("Unknown command: {}", other)),
    }
}

fn arg(m: &ArgMatches, name: &str) -> Result<String, String> {
    m.get_one::<String>(name)
        .cloned()
        .ok_or_else(|| format!("Missing argument: {}", name))
}

fn invoke(function: &str, key: &str, payload: serde_json::Value) -> CliAction {
    let mut transient = TransientMap::new();
    transient.insert(key, payload.to_string());
    CliAction::Invoke {
        function: function.to_string(),
        args: Vec::new(),
        transient,
    }
}

// =========================================================================
// Create
// =========================================================================

fn parse_create(m: &ArgMatches, keys: &TransientKeys) -> Result<CliAction, String> {
    let entry_time = match m.get_one::<String>("entry-time") {
        Some(t) => t.clone(),
        None => chrono::Utc::now().to_rfc3339(),
    };
    let payload = json!({
        "entryLogID": arg(m, "id")?,
        "facilityID": arg(m, "facility")?,
        "year": arg(m, "year")?,
        "sex": arg(m, "sex")?,
        "entryTime": entry_time,
        "personalID": arg(m, "personal")?,
        "name": arg(m, "name")?,
        "phone": arg(m, "phone")?,
        "address": arg(m, "address")?,
    });
    Ok(invoke("create", &keys.create, payload))
}

// =========================================================================
// Raw invocation
// =========================================================================

fn parse_call(m: &ArgMatches) -> Result<CliAction, String> {
    let function = arg(m, "function")?;
    let args: Vec<String> = m
        .get_many::<String>("args")
        .map(|vals| vals.cloned().collect())
        .unwrap_or_default();

    let mut transient = TransientMap::new();
    if let Some(pairs) = m.get_many::<String>("transient") {
        for pair in pairs {
            let (key, value) = split_pair(pair)?;
            transient.insert(key, value);
        }
    }
    if let Some(pairs) = m.get_many::<String>("transient-base64") {
        for pair in pairs {
            let (key, value) = split_pair(pair)?;
            let bytes = BASE64
                .decode(value)
                .map_err(|e| format!("Invalid base64 for transient key {}: {}", key, e))?;
            transient.insert(key, bytes);
        }
    }

    Ok(CliAction::Invoke {
        function,
        args,
        transient,
    })
}

fn split_pair(pair: &str) -> Result<(&str, &str), String> {
    pair.split_once('=')
        .ok_or_else(|| format!("Expected KEY=VALUE, got: {}", pair))
}
