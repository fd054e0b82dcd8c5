//! CLI session state.
//!
//! Holds the store and the typed ledger over it. With `--data`, the store
//! is loaded from a snapshot file on open and written back after every
//! successful mutation, so consecutive invocations see each other's writes.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use entrylog_core::{AccessMode, Config, TransientKeys};
use entrylog_executor::{Command, EntryLedger, Executor, Output};
use entrylog_storage::MemoryStore;
use serde_json::Value;
use tracing::debug;

use crate::parse::CliAction;

/// Options taken from global flags.
#[derive(Debug, Default)]
pub struct SessionOptions {
    pub data: Option<PathBuf>,
    pub read_only: bool,
    pub public_collection: Option<String>,
    pub sensitive_collection: Option<String>,
}

impl SessionOptions {
    /// Collect options from parsed arguments.
    pub fn from_matches(matches: &clap::ArgMatches) -> Self {
        Self {
            data: matches.get_one::<String>("data").map(PathBuf::from),
            read_only: matches.get_flag("read-only"),
            public_collection: matches.get_one::<String>("public-collection").cloned(),
            sensitive_collection: matches.get_one::<String>("sensitive-collection").cloned(),
        }
    }

    fn config(&self) -> Config {
        let mut config = Config::new();
        if let Some(name) = &self.public_collection {
            config = config.public_collection(name.clone());
        }
        if let Some(name) = &self.sensitive_collection {
            config = config.sensitive_collection(name.clone());
        }
        if self.read_only {
            config = config.access_mode(AccessMode::ReadOnly);
        }
        config
    }
}

/// What an action produced.
#[derive(Debug)]
pub enum Reply {
    Output(Output),
    Value(Value),
}

/// An open store plus the ledger over it.
pub struct SessionState {
    store: Arc<MemoryStore>,
    ledger: EntryLedger,
    data: Option<PathBuf>,
}

impl SessionState {
    /// Open the store described by `options`.
    pub fn open(options: &SessionOptions) -> Result<Self> {
        let store = match &options.data {
            Some(path) => Arc::new(
                MemoryStore::open_or_create(path)
                    .with_context(|| format!("Failed to open {}", path.display()))?,
            ),
            None => Arc::new(MemoryStore::new()),
        };
        let executor =
            Executor::new(store.clone(), options.config()).context("Invalid configuration")?;
        Ok(Self {
            store,
            ledger: EntryLedger::new(executor),
            data: options.data.clone(),
        })
    }

    /// Transient keys mutating commands read their payload from.
    pub fn transient_keys(&self) -> &TransientKeys {
        &self.ledger.executor().config().transient
    }

    /// Run one action, persisting the store if it mutated.
    pub fn run(&self, action: CliAction) -> Result<Reply, entrylog_executor::Error> {
        let executor = self.ledger.executor();
        let command = match action {
            CliAction::ReadFull(entry_id) => return self.ledger.read_full(&entry_id).map(Reply::Value),
            CliAction::Execute(command) => command,
            CliAction::Invoke {
                function,
                args,
                transient,
            } => Command::from_invocation(&function, &args, &transient, executor.config())?,
        };

        let mutating = command.is_mutating();
        let output = executor.execute(command)?;
        if mutating {
            self.persist()?;
        }
        Ok(Reply::Output(output))
    }

    fn persist(&self) -> Result<(), entrylog_executor::Error> {
        if let Some(path) = &self.data {
            self.store.save_snapshot(path)?;
            debug!("Saved snapshot to {}", path.display());
        }
        Ok(())
    }
}
