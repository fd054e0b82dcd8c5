//! Core types for EntryLog
//!
//! This crate defines the vocabulary shared by every layer:
//! - [`Error`]: the single error type surfaced to callers
//! - [`EntryLog`] / [`EntryLogPrivateDetails`]: the two record kinds
//! - [`Tier`]: which confidentiality partition a record lives in
//! - [`Config`]: collection names, transient keys and access mode

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod error;
pub mod record;
pub mod types;

pub use config::{AccessMode, Config, TransientKeys};
pub use error::{Error, Result, WireError};
pub use record::{EntryLog, EntryLogPrivateDetails, ENTRY_LOG_DOC_TYPE, PRIVATE_DETAILS_DOC_TYPE};
pub use types::Tier;
