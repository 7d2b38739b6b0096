//! Race registry
//!
//! Process-wide map from race id to `Race`, shared by every session task.
//! The map is a sharded `DashMap`, so lookups for different races rarely
//! contend. A shard lock is only ever held for the single lookup step and
//! never while a race lock is being awaited.

use std::sync::Arc;

use dashmap::DashMap;
use tracing::{debug, info, warn};

use crate::endpoint::Endpoint;
use crate::race::{BroadcastReport, JoinOutcome, Race};
use crate::types::{ClientId, RaceId};

/// Result of `RaceManager::join`
#[derive(Debug)]
pub enum Admission {
    /// Joined; the handle is the race the endpoint now belongs to
    Joined(Arc<Race>),
    /// Race already started; the endpoint was not added
    AlreadyStarted,
}

/// Registry of live races
#[derive(Debug, Default)]
pub struct RaceManager {
    races: DashMap<RaceId, Arc<Race>>,
}

impl RaceManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the race for `race_id`, creating it on first use
    ///
    /// Concurrent callers with the same id always get the same object. A
    /// retired race still in the map is replaced with a fresh one.
    pub fn get_or_create(&self, race_id: &RaceId) -> Arc<Race> {
        let mut entry = self.races.entry(race_id.clone()).or_insert_with(|| {
            info!("Race {} created", race_id);
            Arc::new(Race::new(race_id.clone()))
        });

        if entry.is_retired() {
            debug!("Replacing retired race {}", race_id);
            *entry = Arc::new(Race::new(race_id.clone()));
        }

        Arc::clone(entry.value())
    }

    /// Look up a race without creating it
    pub fn get(&self, race_id: &RaceId) -> Option<Arc<Race>> {
        self.races.get(race_id).map(|entry| Arc::clone(entry.value()))
    }

    /// Start a race exactly once
    ///
    /// Returns false if the race does not exist or has already started.
    /// On success every current participant has been sent `notice`.
    pub async fn start(&self, race_id: &RaceId, notice: &str) -> bool {
        let Some(race) = self.get(race_id) else {
            warn!("Cannot start race {}: no such race", race_id);
            return false;
        };

        if race.start(notice).await {
            info!("Race {} started", race_id);
            true
        } else {
            warn!("Cannot start race {}: already started", race_id);
            false
        }
    }

    /// Join `endpoint` to the race for `race_id`, creating it if needed
    pub async fn join(&self, race_id: &RaceId, endpoint: Endpoint) -> Admission {
        loop {
            let race = self.get_or_create(race_id);
            match race.join(endpoint.clone()).await {
                JoinOutcome::Joined => return Admission::Joined(race),
                JoinOutcome::AlreadyStarted => return Admission::AlreadyStarted,
                // Emptied and evicted between lookup and join; the next
                // lookup yields a fresh race.
                JoinOutcome::Retired => continue,
            }
        }
    }

    /// Remove a participant, evicting the race once it is empty
    pub async fn leave(&self, race: &Arc<Race>, client_id: ClientId) {
        let departure = race.leave(client_id).await;

        if departure.was_member {
            debug!("Client {} left race {}", client_id, race.id);
        }

        if departure.retired {
            // Only drop the exact object that retired, never a replacement.
            if self
                .races
                .remove_if(&race.id, |_, current| Arc::ptr_eq(current, race))
                .is_some()
            {
                info!("Race {} evicted (empty)", race.id);
            }
        }
    }

    /// Relay `payload` from `from` to the rest of its race
    ///
    /// With `echo` the sender receives its own frame as well.
    pub async fn broadcast(
        &self,
        race: &Race,
        payload: &str,
        from: ClientId,
        echo: bool,
    ) -> BroadcastReport {
        let exclude = if echo { None } else { Some(from) };
        race.broadcast(payload, exclude).await
    }

    /// Number of races currently registered
    pub fn race_count(&self) -> usize {
        self.races.len()
    }
}
