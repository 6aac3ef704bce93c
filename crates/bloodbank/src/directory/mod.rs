//! The donor directory.
//!
//! [`Directory`] is the only entry point callers use to read or change donors
//! and messages. Each operation pauses for its simulated latency, then takes
//! the storage lock for the whole load-modify-save sequence, so concurrent
//! callers are applied one after another and never overwrite each other.
//!
//! Every donor read goes through the same seeding step: an empty donor
//! collection is replaced by [`seed_donors`] and persisted before use.

mod filter;
mod latency;
mod seed;

use std::collections::BTreeMap;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::config::Config;
use crate::error::{Error, Result};
use crate::model::{new_id, BloodGroup, Donor, DonorPatch, Message, NewDonor, NewMessage};
use crate::storage::{Backend, SqliteBackend, Storage};

pub use filter::{Availability, DonorFilter};
pub use latency::{Latency, NoLatency, Operation, SimulatedLatency};
pub use seed::seed_donors;

/// Aggregate donor counts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stats {
    /// Number of donors.
    pub total: usize,
    /// Number of donors marked available.
    pub available: usize,
    /// Donors per blood group. Groups with no donors are absent.
    pub groups: BTreeMap<BloodGroup, usize>,
}

impl Stats {
    /// Count `donors` in a single pass.
    #[must_use]
    pub fn from_donors(donors: &[Donor]) -> Self {
        donors.iter().fold(Self::default(), |mut stats, donor| {
            stats.total += 1;
            if donor.available {
                stats.available += 1;
            }
            *stats.groups.entry(donor.blood_group).or_insert(0) += 1;
            stats
        })
    }
}

/// Result of sending a message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageReceipt {
    /// Always `true`.
    pub ok: bool,
    /// Id of the stored message.
    pub id: String,
}

/// Acknowledgement for operations with nothing else to report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ack {
    /// Always `true`.
    pub ok: bool,
}

impl Ack {
    const OK: Self = Self { ok: true };
}

/// Donor and message facade over a [`Storage`].
#[derive(Debug)]
pub struct Directory<B, L = SimulatedLatency> {
    storage: Mutex<Storage<B>>,
    latency: L,
    seed_on_empty: bool,
}

impl Directory<SqliteBackend, SimulatedLatency> {
    /// Open the configured database and apply the configured latency and
    /// seeding policy.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened.
    pub fn from_config(config: &Config) -> Result<Self> {
        let storage = Storage::open(config.database_path())?;
        let latency = SimulatedLatency::new(config.latency_scale_percent());
        Ok(Self::new(storage, latency).with_seeding(config.directory.seed_on_empty))
    }
}

impl<B: Backend, L: Latency> Directory<B, L> {
    /// Build a directory over `storage`, pausing with `latency`.
    ///
    /// Seeding is enabled.
    #[must_use]
    pub fn new(storage: Storage<B>, latency: L) -> Self {
        Self {
            storage: Mutex::new(storage),
            latency,
            seed_on_empty: true,
        }
    }

    /// Enable or disable seeding of an empty donor collection.
    #[must_use]
    pub fn with_seeding(mut self, enabled: bool) -> Self {
        self.seed_on_empty = enabled;
        self
    }

    /// Give back the storage.
    #[must_use]
    pub fn into_storage(self) -> Storage<B> {
        self.storage.into_inner()
    }

    /// Count donors overall, by availability and by blood group.
    ///
    /// # Errors
    ///
    /// Returns an error if seeding an empty store fails to persist.
    pub async fn get_stats(&self) -> Result<Stats> {
        self.latency.pause(Operation::Stats).await;
        let storage = self.storage.lock().await;
        let donors = self.seeded_donors(&storage)?;
        Ok(Stats::from_donors(&donors))
    }

    /// List donors matching every criterion of `filter`, in stored order.
    ///
    /// # Errors
    ///
    /// Returns an error if seeding an empty store fails to persist.
    pub async fn list_donors(&self, filter: &DonorFilter) -> Result<Vec<Donor>> {
        self.latency.pause(Operation::ListDonors).await;
        let storage = self.storage.lock().await;
        let donors = self.seeded_donors(&storage)?;
        let matcher = filter.matcher();
        let matched: Vec<Donor> = donors.into_iter().filter(|d| matcher.matches(d)).collect();
        debug!(?filter, matched = matched.len(), "Listed donors");
        Ok(matched)
    }

    /// Register a donor. The new record goes to the front of the collection.
    ///
    /// # Errors
    ///
    /// Returns an error if the collection cannot be persisted.
    pub async fn create_donor(&self, payload: NewDonor) -> Result<Donor> {
        self.latency.pause(Operation::CreateDonor).await;
        let storage = self.storage.lock().await;
        let mut donors = self.seeded_donors(&storage)?;

        let donor = payload.into_donor(new_id());
        donors.insert(0, donor.clone());
        storage.save_donors(&donors)?;

        info!(id = %donor.id, blood_group = %donor.blood_group, "Registered donor");
        Ok(donor)
    }

    /// Look up a donor by id.
    ///
    /// # Errors
    ///
    /// Returns an error if seeding an empty store fails to persist.
    pub async fn get_donor(&self, id: &str) -> Result<Option<Donor>> {
        self.latency.pause(Operation::GetDonor).await;
        let storage = self.storage.lock().await;
        let donors = self.seeded_donors(&storage)?;
        Ok(donors.into_iter().find(|d| d.id == id))
    }

    /// Apply `patch` to the donor with the given id and persist it in place.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DonorNotFound`] if no donor has this id, or an error
    /// if the collection cannot be persisted.
    pub async fn update_donor(&self, id: &str, patch: &DonorPatch) -> Result<Donor> {
        self.latency.pause(Operation::UpdateDonor).await;
        let storage = self.storage.lock().await;
        let mut donors = self.seeded_donors(&storage)?;

        let donor = donors
            .iter_mut()
            .find(|d| d.id == id)
            .ok_or_else(|| Error::donor_not_found(id))?;
        patch.apply(donor);
        let updated = donor.clone();
        storage.save_donors(&donors)?;

        info!(id, "Updated donor");
        Ok(updated)
    }

    /// Store a contact message at the front of the log.
    ///
    /// # Errors
    ///
    /// Returns an error if the log cannot be persisted.
    pub async fn send_message(&self, payload: NewMessage) -> Result<MessageReceipt> {
        self.latency.pause(Operation::SendMessage).await;
        let storage = self.storage.lock().await;
        let mut messages = storage.load_messages();

        let message = payload.into_message(new_id(), Utc::now());
        let id = message.id.clone();
        messages.insert(0, message);
        storage.save_messages(&messages)?;

        info!(%id, "Stored message");
        Ok(MessageReceipt { ok: true, id })
    }

    /// All messages, newest first.
    pub async fn list_messages(&self) -> Vec<Message> {
        self.latency.pause(Operation::ListMessages).await;
        let storage = self.storage.lock().await;
        storage.load_messages()
    }

    /// Remove the message with the given id. A missing id is not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the log cannot be persisted.
    pub async fn delete_message(&self, id: &str) -> Result<Ack> {
        self.latency.pause(Operation::DeleteMessage).await;
        let storage = self.storage.lock().await;
        let mut messages = storage.load_messages();

        let before = messages.len();
        messages.retain(|m| m.id != id);
        if messages.len() == before {
            debug!(id, "No message to delete");
            return Ok(Ack::OK);
        }
        storage.save_messages(&messages)?;

        info!(id, "Deleted message");
        Ok(Ack::OK)
    }

    /// Empty the message log.
    ///
    /// # Errors
    ///
    /// Returns an error if the log cannot be persisted.
    pub async fn clear_all_messages(&self) -> Result<Ack> {
        self.latency.pause(Operation::ClearMessages).await;
        let storage = self.storage.lock().await;
        storage.save_messages(&[])?;
        info!("Cleared all messages");
        Ok(Ack::OK)
    }

    fn seeded_donors(&self, storage: &Storage<B>) -> Result<Vec<Donor>> {
        let donors = storage.load_donors();
        if !donors.is_empty() || !self.seed_on_empty {
            return Ok(donors);
        }

        let seed = seed_donors();
        storage.save_donors(&seed)?;
        info!(count = seed.len(), "Seeded empty donor directory");
        Ok(seed)
    }
}
