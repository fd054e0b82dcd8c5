//! Record lifecycle
//!
//! [`EntryLogStore`] owns every write to both collections. Each record is
//! written together with its index entry and removed together with it, so
//! for any live entry id exactly one `facility~entryLog` entry and one
//! `personal~entryLog` entry exist.
//!
//! ## State per entry id
//!
//! ```text
//! absent --create--> live --update_address--> live
//!                     |
//!                     +--delete--> absent
//! ```
//!
//! No tombstone is kept: an id that was deleted can be created again.
//!
//! Writes are issued in a fixed order and are not compensated here. Run the
//! store inside a `TxContext` to get all-or-nothing behaviour per call.

use std::sync::Arc;

use entrylog_core::{Config, EntryLog, EntryLogPrivateDetails, Error, Result, Tier};
use entrylog_storage::CollectionStore;
use tracing::{debug, info};

use crate::composite;
use crate::index::{IndexEntry, Indexed, INDEX_SENTINEL};
use crate::input::{AddressUpdateInput, CreateInput};

/// Create, read, update and delete entry logs over a collection store
pub struct EntryLogStore<S> {
    store: S,
    config: Arc<Config>,
}

impl<S: CollectionStore> EntryLogStore<S> {
    /// Wrap `store`, using the collections named in `config`
    pub fn new(store: S, config: Arc<Config>) -> Self {
        Self { store, config }
    }

    /// Active configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Underlying store
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Consume, returning the underlying store
    pub fn into_inner(self) -> S {
        self.store
    }

    fn collection(&self, tier: Tier) -> &str {
        self.config.collection(tier)
    }

    /// Whether a public record exists for `entry_id`
    pub fn exists(&self, entry_id: &str) -> Result<bool> {
        Ok(self.store.get(self.collection(Tier::Public), entry_id)?.is_some())
    }

    /// Create both records and both index entries
    ///
    /// Every record and key is built before the first write, so a
    /// validation failure leaves the store untouched. Fails with
    /// `AlreadyExists` if a public record with this id is live.
    pub fn create(&self, input: CreateInput) -> Result<()> {
        let (public, details) = input.into_records();
        let public_bytes = public.to_bytes()?;
        let details_bytes = details.to_bytes()?;
        let facility_entry = public.index_entry();
        let personal_entry = details.index_entry();
        let facility_key = facility_entry.key()?;
        let personal_key = personal_entry.key()?;

        if self.exists(&public.entry_id)? {
            return Err(Error::AlreadyExists {
                entry_id: public.entry_id,
            });
        }

        self.store
            .put(self.collection(Tier::Public), &public.entry_id, public_bytes)?;
        self.store
            .put(self.collection(Tier::Sensitive), &details.entry_id, details_bytes)?;
        self.store.put(
            self.collection(facility_entry.tier()),
            &facility_key,
            INDEX_SENTINEL.to_vec(),
        )?;
        self.store.put(
            self.collection(personal_entry.tier()),
            &personal_key,
            INDEX_SENTINEL.to_vec(),
        )?;

        info!("Created entry log {}", public.entry_id);
        Ok(())
    }

    /// Stored JSON of `entry_id` in `tier`
    pub fn read(&self, entry_id: &str, tier: Tier) -> Result<Vec<u8>> {
        if entry_id.is_empty() {
            return Err(Error::missing_field("entryLogID"));
        }
        // index keys share the collection but never name a record
        if composite::is_composite(entry_id) {
            return Err(Error::not_found(tier, entry_id));
        }
        debug!("Reading {} record {}", tier.as_str(), entry_id);
        self.store
            .get(self.collection(tier), entry_id)?
            .ok_or_else(|| Error::not_found(tier, entry_id))
    }

    /// Decoded public record
    pub fn read_public(&self, entry_id: &str) -> Result<EntryLog> {
        EntryLog::from_bytes(&self.read(entry_id, Tier::Public)?)
    }

    /// Decoded private details
    pub fn read_sensitive(&self, entry_id: &str) -> Result<EntryLogPrivateDetails> {
        EntryLogPrivateDetails::from_bytes(&self.read(entry_id, Tier::Sensitive)?)
    }

    /// Replace the address in the private details
    ///
    /// The personal index is keyed on `personalID`, so no index entry is
    /// touched. Applying the same address twice is a no-op in effect.
    pub fn update_address(&self, input: AddressUpdateInput) -> Result<()> {
        let mut details = self.read_sensitive(&input.entry_id)?;
        details.address = input.address;
        self.store.put(
            self.collection(Tier::Sensitive),
            &details.entry_id,
            details.to_bytes()?,
        )?;
        info!("Updated address of entry log {}", details.entry_id);
        Ok(())
    }

    /// Remove both records and both index entries
    ///
    /// Fails with `NotFound` for the public tier if the entry is not live,
    /// and for the sensitive tier if its private details are gone.
    pub fn delete(&self, entry_id: &str) -> Result<()> {
        let public = self.read_public(entry_id)?;
        self.store.delete(self.collection(Tier::Public), entry_id)?;
        self.remove_index(&public.index_entry())?;

        let details = self.read_sensitive(entry_id)?;
        self.remove_index(&details.index_entry())?;
        self.store.delete(self.collection(Tier::Sensitive), entry_id)?;

        info!("Deleted entry log {}", entry_id);
        Ok(())
    }

    fn remove_index(&self, entry: &IndexEntry) -> Result<()> {
        let key = entry.key()?;
        debug!("Removing {} entry for {}", entry.index, entry.entry_id);
        self.store.delete(self.collection(entry.tier()), &key)
    }
}

impl<S> std::fmt::Debug for EntryLogStore<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EntryLogStore")
            .field("public_collection", &self.config.public_collection)
            .field("sensitive_collection", &self.config.sensitive_collection)
            .finish()
    }
}
