//! The Executor - single entry point to EntryLog's record engine.
//!
//! Every command runs inside its own [`TxContext`]: handlers stage writes,
//! and the executor commits them only if the handler succeeded. A failing
//! command therefore leaves the store exactly as it found it, including
//! failures halfway through a multi-write operation like delete.

use std::sync::Arc;

use entrylog_core::{Config, Error, Result};
use entrylog_primitives::TransientMap;
use entrylog_storage::{CollectionStore, MemoryStore, TxContext};
use tracing::{debug, warn};

use crate::handlers;
use crate::{Command, Output};

/// Store handle shared by an executor and its owner
pub type SharedStore = Arc<dyn CollectionStore + Send + Sync>;

/// Command executor
///
/// Stateless apart from the store and configuration, so one executor can
/// serve any number of invocations.
///
/// # Example
///
/// ```
/// use entrylog_executor::{Command, Executor, Output};
///
/// let executor = Executor::in_memory();
/// let out = executor
///     .execute(Command::QueryByFacility { facility_id: "F1".into() })
///     .unwrap();
/// assert_eq!(out.payload(), b"[]");
/// ```
pub struct Executor {
    store: SharedStore,
    config: Arc<Config>,
}

impl Executor {
    /// Create an executor over `store`
    ///
    /// Fails if `config` does not validate.
    pub fn new(store: SharedStore, config: Config) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            store,
            config: Arc::new(config),
        })
    }

    /// Executor over a fresh in-memory store with the default configuration
    pub fn in_memory() -> Self {
        Self {
            store: Arc::new(MemoryStore::new()),
            config: Arc::new(Config::default()),
        }
    }

    /// Active configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Underlying store
    pub fn store(&self) -> &SharedStore {
        &self.store
    }

    /// Execute one command
    ///
    /// Mutating commands fail with `ReadOnly` when the configuration says so.
    pub fn execute(&self, command: Command) -> Result<Output> {
        let name = command.name();
        if command.is_mutating() && self.config.is_read_only() {
            warn!("Rejected {} on read-only store", name);
            return Err(Error::ReadOnly {
                operation: name.to_string(),
            });
        }

        debug!("Executing {}", name);
        let ctx = TxContext::new(self.store.as_ref());
        match handlers::dispatch(&ctx, &self.config, command) {
            Ok(output) => {
                let applied = ctx.commit()?;
                debug!("{} succeeded, {} writes applied", name, applied);
                Ok(output)
            }
            Err(e) => {
                debug!("{} failed with {}", name, e.error_code());
                ctx.discard();
                Err(e)
            }
        }
    }

    /// Decode and execute a raw invocation
    pub fn invoke<A: AsRef<str>>(
        &self,
        function: &str,
        args: &[A],
        transient: &TransientMap,
    ) -> Result<Output> {
        let command = Command::from_invocation(function, args, transient, &self.config)?;
        self.execute(command)
    }
}

impl std::fmt::Debug for Executor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Executor")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
