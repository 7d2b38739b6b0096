//! Race struct definition
//!
//! One race's shared state: the joined endpoints and the `started` flag.
//! Both live behind the race's own lock. The lock is held for the whole
//! of a broadcast so nobody can join halfway through one; sends only queue
//! onto each endpoint and never wait on a slow client.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::endpoint::Endpoint;
use crate::types::{ClientId, RaceId};

/// Result of asking to join a race
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinOutcome {
    /// Endpoint added to the participant set
    Joined,
    /// The race has started; late joiners are turned away
    AlreadyStarted,
    /// The race emptied out and was evicted; look the id up again
    Retired,
}

/// Result of removing a participant
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Departure {
    /// The endpoint was in the set before this call
    pub was_member: bool,
    /// This removal emptied the race and retired it
    pub retired: bool,
}

/// Per-recipient tally of one broadcast
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BroadcastReport {
    pub delivered: usize,
    pub failed: usize,
}

#[derive(Debug, Default)]
struct RaceState {
    participants: HashMap<ClientId, Endpoint>,
    started: bool,
}

impl RaceState {
    fn deliver(
        &self,
        race_id: &RaceId,
        payload: &str,
        exclude: Option<ClientId>,
    ) -> BroadcastReport {
        let mut report = BroadcastReport::default();

        for (id, endpoint) in &self.participants {
            if exclude == Some(*id) {
                continue;
            }
            match endpoint.send(payload) {
                Ok(()) => report.delivered += 1,
                Err(e) => {
                    // Removal is left to the recipient's own receive loop.
                    warn!("Failed to deliver to {} in race {}: {}", id, race_id, e);
                    report.failed += 1;
                }
            }
        }

        report
    }
}

/// A shared typing race
#[derive(Debug)]
pub struct Race {
    /// Registry key
    pub id: RaceId,
    state: Mutex<RaceState>,
    /// Set under `state`'s lock; readable without it
    retired: AtomicBool,
}

impl Race {
    pub fn new(id: RaceId) -> Self {
        Self {
            id,
            state: Mutex::new(RaceState::default()),
            retired: AtomicBool::new(false),
        }
    }

    /// Add an endpoint unless the race has started or been retired
    pub async fn join(&self, endpoint: Endpoint) -> JoinOutcome {
        let mut state = self.state.lock().await;

        if self.is_retired() {
            return JoinOutcome::Retired;
        }
        if state.started {
            return JoinOutcome::AlreadyStarted;
        }

        debug!("Client {} joined race {}", endpoint.id, self.id);
        state.participants.insert(endpoint.id, endpoint);
        JoinOutcome::Joined
    }

    /// Remove an endpoint; removing an absent one is a no-op
    ///
    /// The removal that empties the set retires the race.
    pub async fn leave(&self, client_id: ClientId) -> Departure {
        let mut state = self.state.lock().await;

        let was_member = state.participants.remove(&client_id).is_some();
        let retired = was_member && state.participants.is_empty();
        if retired {
            self.retired.store(true, Ordering::Release);
        }

        Departure {
            was_member,
            retired,
        }
    }

    /// Send `payload` to every participant except `exclude`
    pub async fn broadcast(&self, payload: &str, exclude: Option<ClientId>) -> BroadcastReport {
        let state = self.state.lock().await;
        state.deliver(&self.id, payload, exclude)
    }

    /// Flip `started` and notify everyone with `notice`
    ///
    /// Returns false if the race had already started or was retired.
    pub async fn start(&self, notice: &str) -> bool {
        let mut state = self.state.lock().await;

        if state.started || self.is_retired() {
            return false;
        }
        state.started = true;

        let report = state.deliver(&self.id, notice, None);
        debug!(
            "Race {} start notice delivered to {}, failed for {}",
            self.id, report.delivered, report.failed
        );
        true
    }

    pub async fn is_started(&self) -> bool {
        self.state.lock().await.started
    }

    pub fn is_retired(&self) -> bool {
        self.retired.load(Ordering::Acquire)
    }

    pub async fn participant_count(&self) -> usize {
        self.state.lock().await.participants.len()
    }

    pub async fn contains(&self, client_id: ClientId) -> bool {
        self.state.lock().await.participants.contains_key(&client_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::endpoint::ENDPOINT_BUFFER_SIZE;
    use crate::message::Outbound;
    use std::time::Duration;

    fn race() -> Race {
        Race::new(RaceId::from("R1"))
    }

    #[tokio::test]
    async fn test_race_creation() {
        let race = race();

        assert_eq!(race.id, RaceId::from("R1"));
        assert!(!race.is_started().await);
        assert!(!race.is_retired());
        assert_eq!(race.participant_count().await, 0);
    }

    #[tokio::test]
    async fn test_join_before_start() {
        let race = race();
        let (endpoint, _rx) = Endpoint::channel(ClientId::new());
        let id = endpoint.id;

        assert_eq!(race.join(endpoint).await, JoinOutcome::Joined);
        assert!(race.contains(id).await);
        assert_eq!(race.participant_count().await, 1);
    }

    #[tokio::test]
    async fn test_join_after_start_is_rejected() {
        let race = race();
        assert!(race.start("go").await);

        let (endpoint, _rx) = Endpoint::channel(ClientId::new());
        let id = endpoint.id;

        assert_eq!(race.join(endpoint).await, JoinOutcome::AlreadyStarted);
        assert!(!race.contains(id).await);
        assert_eq!(race.participant_count().await, 0);
    }

    #[tokio::test]
    async fn test_start_is_one_shot() {
        let race = race();
        let (endpoint, mut rx) = Endpoint::channel(ClientId::new());
        race.join(endpoint).await;

        assert!(race.start("Race Started!").await);
        assert!(!race.start("Race Started!").await);

        assert_eq!(
            rx.recv().await,
            Some(Outbound::Text("Race Started!".to_string()))
        );
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_broadcast_excludes_sender() {
        let race = race();
        let (a, mut rx_a) = Endpoint::channel(ClientId::new());
        let (b, mut rx_b) = Endpoint::channel(ClientId::new());
        let a_id = a.id;
        race.join(a).await;
        race.join(b).await;

        let report = race.broadcast("hi", Some(a_id)).await;

        assert_eq!(report, BroadcastReport { delivered: 1, failed: 0 });
        assert_eq!(rx_b.recv().await, Some(Outbound::Text("hi".to_string())));
        assert!(rx_a.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_broadcast_with_echo() {
        let race = race();
        let (a, mut rx_a) = Endpoint::channel(ClientId::new());
        race.join(a).await;

        let report = race.broadcast("hi", None).await;

        assert_eq!(report.delivered, 1);
        assert_eq!(rx_a.recv().await, Some(Outbound::Text("hi".to_string())));
    }

    #[tokio::test]
    async fn test_broadcast_survives_failed_recipient() {
        let race = race();
        let (dead, dead_rx) = Endpoint::channel(ClientId::new());
        let (live, mut live_rx) = Endpoint::channel(ClientId::new());
        let dead_id = dead.id;
        race.join(dead).await;
        race.join(live).await;
        drop(dead_rx);

        let report = race.broadcast("hi", None).await;

        assert_eq!(report, BroadcastReport { delivered: 1, failed: 1 });
        assert_eq!(live_rx.recv().await, Some(Outbound::Text("hi".to_string())));
        // A failed send does not evict the recipient.
        assert!(race.contains(dead_id).await);
    }

    #[tokio::test]
    async fn test_broadcast_does_not_block_on_stalled_recipient() {
        let race = race();
        let (stalled, _stalled_rx) = Endpoint::channel(ClientId::new());
        let (b, _rx_b) = Endpoint::channel(ClientId::new());
        let (c, mut rx_c) = Endpoint::channel(ClientId::new());
        let (stalled_id, b_id) = (stalled.id, b.id);
        race.join(stalled).await;
        race.join(b).await;
        race.join(c).await;

        // Fill the stalled recipient's queue while c keeps draining.
        for i in 0..ENDPOINT_BUFFER_SIZE {
            race.broadcast(&format!("frame {}", i), Some(b_id)).await;
            rx_c.recv().await.unwrap();
        }

        let report = tokio::time::timeout(
            Duration::from_secs(2),
            race.broadcast("next", Some(b_id)),
        )
        .await
        .expect("broadcast blocked on a full queue");

        assert_eq!(report, BroadcastReport { delivered: 1, failed: 1 });
        assert_eq!(rx_c.recv().await, Some(Outbound::Text("next".to_string())));

        // The lock is free: the stalled participant can still leave.
        assert!(race.leave(stalled_id).await.was_member);
    }

    #[tokio::test]
    async fn test_leave_is_idempotent() {
        let race = race();
        let (a, _rx_a) = Endpoint::channel(ClientId::new());
        let (b, _rx_b) = Endpoint::channel(ClientId::new());
        let a_id = a.id;
        race.join(a).await;
        race.join(b).await;

        let first = race.leave(a_id).await;
        let second = race.leave(a_id).await;

        assert_eq!(first, Departure { was_member: true, retired: false });
        assert_eq!(second, Departure { was_member: false, retired: false });
        assert_eq!(race.participant_count().await, 1);
    }

    #[tokio::test]
    async fn test_last_leave_retires_race() {
        let race = race();
        let (a, _rx) = Endpoint::channel(ClientId::new());
        let a_id = a.id;
        race.join(a).await;

        let departure = race.leave(a_id).await;

        assert!(departure.retired);
        assert!(race.is_retired());
        assert!(!race.start("go").await);

        let (b, _rx_b) = Endpoint::channel(ClientId::new());
        assert_eq!(race.join(b).await, JoinOutcome::Retired);
    }

    #[tokio::test]
    async fn test_participant_may_leave_after_start() {
        let race = race();
        let (a, _rx_a) = Endpoint::channel(ClientId::new());
        let (b, _rx_b) = Endpoint::channel(ClientId::new());
        let a_id = a.id;
        race.join(a).await;
        race.join(b).await;
        race.start("go").await;

        assert!(race.leave(a_id).await.was_member);
        assert!(!race.contains(a_id).await);
        assert!(race.is_started().await);
    }
}
