//! Command enum
//!
//! Every operation a caller can invoke is one variant of [`Command`], carrying
//! its already-validated input. Invocations arrive as a function name, a list
//! of positional string arguments and a transient map;
//! [`Command::from_invocation`] turns them into a command or fails before any
//! store access.
//!
//! ## Function Names
//!
//! | Command | Names | Input |
//! |---------|-------|-------|
//! | Create | `create`, `setEntryLog` | transient `entryLog` |
//! | Read | `read`, `getEntryLog` | `entryLogID` |
//! | ReadSensitive | `readSensitive`, `getEntryLogPrivateDetails` | `entryLogID` |
//! | UpdateAddress | `updateAddress` | transient `entryLog_address` |
//! | Delete | `delete` | transient `entryLog_delete` |
//! | QueryByFacility | `queryByFacility`, `queryEntryLogsByFacilityID` | `facilityID` |
//! | QueryByPersonal | `queryByPersonal`, `queryEntryLogsByPersonalID` | `personalID` |
//! | QueryRaw | `queryRaw`, `queryEntryLogs` | selector JSON |
//! | ListByFacilityIndex | `listByFacilityIndex` | `facilityID` |
//! | ListByPersonalIndex | `listByPersonalIndex` | `personalID` |
//!
//! Transient keys shown are the defaults; [`Config::transient`] overrides them.

use entrylog_core::{Config, Error, Result};
use entrylog_primitives::{AddressUpdateInput, CreateInput, DeleteInput, TransientMap};

/// A fully decoded invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Create both records and their index entries
    Create(CreateInput),
    /// Public record of one entry
    Read {
        /// Entry to read
        entry_id: String,
    },
    /// Private details of one entry
    ReadSensitive {
        /// Entry to read
        entry_id: String,
    },
    /// Replace the address in the private details
    UpdateAddress(AddressUpdateInput),
    /// Remove both records and their index entries
    Delete(DeleteInput),
    /// Selector query on the public collection by facility
    QueryByFacility {
        /// Facility to match
        facility_id: String,
    },
    /// Selector query on the sensitive collection by person
    QueryByPersonal {
        /// Person to match
        personal_id: String,
    },
    /// Caller-supplied selector on the public collection
    QueryRaw {
        /// Selector document text
        query: String,
    },
    /// Facility index scan
    ListByFacilityIndex {
        /// Facility prefix
        facility_id: String,
    },
    /// Personal index scan
    ListByPersonalIndex {
        /// Person prefix
        personal_id: String,
    },
}

impl Command {
    /// Decode an invocation
    ///
    /// Fails with `UnknownOperation` for an unrecognised name, and with
    /// `MalformedInput` when the positional argument count is wrong.
    /// Transient payloads are validated here, so a returned command is
    /// ready to execute.
    pub fn from_invocation<A: AsRef<str>>(
        function: &str,
        args: &[A],
        transient: &TransientMap,
        config: &Config,
    ) -> Result<Self> {
        let keys = &config.transient;
        let command = match function {
            "create" | "setEntryLog" => {
                no_args(function, args)?;
                Command::Create(transient.decode(&keys.create)?)
            }
            "read" | "getEntryLog" => Command::Read {
                entry_id: exactly_one(function, args)?,
            },
            "readSensitive" | "getEntryLogPrivateDetails" => Command::ReadSensitive {
                entry_id: exactly_one(function, args)?,
            },
            "updateAddress" => {
                no_args(function, args)?;
                Command::UpdateAddress(transient.decode(&keys.update_address)?)
            }
            "delete" => {
                no_args(function, args)?;
                Command::Delete(transient.decode(&keys.delete)?)
            }
            "queryByFacility" | "queryEntryLogsByFacilityID" => Command::QueryByFacility {
                facility_id: first(function, args)?,
            },
            "queryByPersonal" | "queryEntryLogsByPersonalID" => Command::QueryByPersonal {
                personal_id: first(function, args)?,
            },
            "queryRaw" | "queryEntryLogs" => Command::QueryRaw {
                query: first(function, args)?,
            },
            "listByFacilityIndex" => Command::ListByFacilityIndex {
                facility_id: first(function, args)?,
            },
            "listByPersonalIndex" => Command::ListByPersonalIndex {
                personal_id: first(function, args)?,
            },
            other => {
                return Err(Error::UnknownOperation {
                    name: other.to_string(),
                })
            }
        };
        Ok(command)
    }

    /// Canonical operation name
    pub fn name(&self) -> &'static str {
        match self {
            Command::Create(_) => "create",
            Command::Read { .. } => "read",
            Command::ReadSensitive { .. } => "readSensitive",
            Command::UpdateAddress(_) => "updateAddress",
            Command::Delete(_) => "delete",
            Command::QueryByFacility { .. } => "queryByFacility",
            Command::QueryByPersonal { .. } => "queryByPersonal",
            Command::QueryRaw { .. } => "queryRaw",
            Command::ListByFacilityIndex { .. } => "listByFacilityIndex",
            Command::ListByPersonalIndex { .. } => "listByPersonalIndex",
        }
    }

    /// Whether the command writes to the store
    pub fn is_mutating(&self) -> bool {
        matches!(
            self,
            Command::Create(_) | Command::UpdateAddress(_) | Command::Delete(_)
        )
    }
}

fn no_args<A: AsRef<str>>(function: &str, args: &[A]) -> Result<()> {
    if args.is_empty() {
        Ok(())
    } else {
        Err(Error::malformed(format!(
            "{} takes no arguments, its payload must be passed in the transient map",
            function
        )))
    }
}

fn exactly_one<A: AsRef<str>>(function: &str, args: &[A]) -> Result<String> {
    match args {
        [only] => Ok(only.as_ref().to_string()),
        _ => Err(Error::malformed(format!(
            "{} expects exactly 1 argument, got {}",
            function,
            args.len()
        ))),
    }
}

fn first<A: AsRef<str>>(function: &str, args: &[A]) -> Result<String> {
    args.first()
        .map(|a| a.as_ref().to_string())
        .ok_or_else(|| Error::malformed(format!("{} expects at least 1 argument", function)))
}
