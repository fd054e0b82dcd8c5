//! Command execution layer for EntryLog
//!
//! Every operation is expressed as a [`Command`] and produces an [`Output`].
//! The [`Executor`] runs commands against a collection store, one
//! all-or-nothing context per command.
//!
//! ```text
//! (function, args, transient) --Command::from_invocation--> Command
//!                                                             |
//!                                               Executor::execute
//!                                                             |
//!                                        handlers --> Output or Error
//! ```
//!
//! [`EntryLedger`] offers the same operations as typed Rust methods.

#![warn(missing_docs)]
#![warn(clippy::all)]

mod command;
mod executor;
mod handlers;
mod ledger;
mod output;

pub use command::Command;
pub use executor::{Executor, SharedStore};
pub use ledger::EntryLedger;
pub use output::Output;

pub use entrylog_core::{Error, Result};
pub use entrylog_primitives::TransientMap;
