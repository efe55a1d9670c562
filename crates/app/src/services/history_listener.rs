//! Live history listener: applies status records for one observed lot.
//!
//! One subscription exists per observation. Switching to another id tears the
//! previous one down before the new one starts, and every record is checked
//! against the currently observed id before it reaches the store.

use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;

use parkhub_domain::history::ParkingLotHistory;
use parkhub_domain::id::ParkingLotId;

use crate::ports::{ApiClient, StatusFeed};
use crate::services::parking_lot_store::ParkingLotStore;

/// Subscribe/unsubscribe handle tied to the observing context.
///
/// Dropping the listener stops the active observation.
pub struct HistoryListener<C, F> {
    store: Arc<ParkingLotStore<C>>,
    feed: F,
    observed: watch::Sender<Option<ParkingLotId>>,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl<C, F> HistoryListener<C, F>
where
    C: ApiClient + 'static,
    F: StatusFeed,
{
    pub fn new(store: Arc<ParkingLotStore<C>>, feed: F) -> Self {
        let (observed, _) = watch::channel(None);
        Self {
            store,
            feed,
            observed,
            task: Mutex::new(None),
        }
    }

    /// Start applying live records for `id`, replacing any previous
    /// observation.
    ///
    /// The subscription is taken before this returns, so every record
    /// published afterwards is seen. Must be called within a tokio runtime.
    #[tracing::instrument(skip(self))]
    pub fn observe(&self, id: ParkingLotId) {
        let receiver = self.feed.subscribe();
        self.observed.send_replace(Some(id.clone()));
        let liveness = self.observed.subscribe();
        let store = Arc::clone(&self.store);

        let handle = tokio::spawn(listen(store, receiver, liveness, id));
        let previous = self
            .task
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .replace(handle);
        if let Some(previous) = previous {
            previous.abort();
        }
        tracing::debug!("history observation started");
    }

    /// End the active observation, if any.
    pub fn stop(&self) {
        self.observed.send_replace(None);
        let previous = self
            .task
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(previous) = previous {
            previous.abort();
            tracing::debug!("history observation stopped");
        }
    }

    /// Id currently observed.
    #[must_use]
    pub fn observed(&self) -> Option<ParkingLotId> {
        self.observed.borrow().clone()
    }
}

impl<C, F> Drop for HistoryListener<C, F> {
    fn drop(&mut self) {
        self.observed.send_replace(None);
        let task = self
            .task
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(task) = task {
            task.abort();
        }
    }
}

async fn listen<C: ApiClient>(
    store: Arc<ParkingLotStore<C>>,
    mut receiver: broadcast::Receiver<ParkingLotHistory>,
    liveness: watch::Receiver<Option<ParkingLotId>>,
    id: ParkingLotId,
) {
    loop {
        match receiver.recv().await {
            Ok(record) => {
                if record.parking_lot_id != id {
                    continue;
                }
                if liveness.borrow().as_ref() != Some(&id) {
                    tracing::debug!(%id, "observation ended, dropping record");
                    break;
                }
                store.apply_status_event(record);
            }
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                tracing::warn!(%id, skipped, "history listener lagged behind the status feed");
            }
            Err(broadcast::error::RecvError::Closed) => {
                tracing::info!(%id, "status feed closed");
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::ports::{HistoryPublisher, Method};
    use crate::status_bus::InProcessStatusBus;
    use crate::testing::{FakeApiClient, lot_json};
    use parkhub_domain::id::HistoryId;
    use parkhub_domain::parking_lot::{Availability, ParkingLotStatus};
    use parkhub_domain::time::now;
    use serde_json::json;

    type Listener = HistoryListener<FakeApiClient, Arc<InProcessStatusBus>>;

    fn record(history_id: &str, lot: &str, status: ParkingLotStatus) -> ParkingLotHistory {
        ParkingLotHistory {
            id: HistoryId::new(history_id),
            parking_lot_id: ParkingLotId::new(lot),
            status,
            availability: Availability::NoAvailability,
            updated_at: now(),
        }
    }

    async fn setup() -> (
        Arc<ParkingLotStore<FakeApiClient>>,
        Arc<InProcessStatusBus>,
        Listener,
    ) {
        let api = FakeApiClient::new();
        api.ok(
            Method::Get,
            "/parking-lot",
            json!([lot_json("p1", "P1"), lot_json("p2", "P2")]),
        );
        let store = Arc::new(ParkingLotStore::new(api));
        store.list().await.unwrap();
        let bus = Arc::new(InProcessStatusBus::new(16));
        let listener = HistoryListener::new(Arc::clone(&store), Arc::clone(&bus));
        (store, bus, listener)
    }

    async fn settle() {
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test]
    async fn should_apply_matching_record() {
        let (store, bus, listener) = setup().await;
        listener.observe(ParkingLotId::new("p1"));
        let mut changes = store.subscribe();
        let _ = changes.borrow_and_update();

        bus.publish(record("h1", "p1", ParkingLotStatus::Closed))
            .await
            .unwrap();
        tokio::time::timeout(Duration::from_secs(1), changes.changed())
            .await
            .unwrap()
            .unwrap();

        let p1 = ParkingLotId::new("p1");
        assert_eq!(store.history(&p1).len(), 1);
        assert_eq!(store.get(&p1).unwrap().status, ParkingLotStatus::Closed);
    }

    #[tokio::test]
    async fn should_ignore_records_for_other_lots() {
        let (store, bus, listener) = setup().await;
        listener.observe(ParkingLotId::new("p1"));

        bus.publish(record("h1", "p2", ParkingLotStatus::Closed))
            .await
            .unwrap();
        settle().await;

        let p2 = ParkingLotId::new("p2");
        assert!(store.history(&p2).is_empty());
        assert_eq!(store.get(&p2).unwrap().status, ParkingLotStatus::Open);
    }

    #[tokio::test]
    async fn should_drop_stale_records_after_switching_ids() {
        let (store, bus, listener) = setup().await;
        listener.observe(ParkingLotId::new("p1"));
        listener.observe(ParkingLotId::new("p2"));
        assert_eq!(listener.observed(), Some(ParkingLotId::new("p2")));

        bus.publish(record("stale", "p1", ParkingLotStatus::Closed))
            .await
            .unwrap();
        bus.publish(record("fresh", "p2", ParkingLotStatus::Closed))
            .await
            .unwrap();
        settle().await;

        assert!(store.history(&ParkingLotId::new("p1")).is_empty());
        assert_eq!(
            store.get(&ParkingLotId::new("p1")).unwrap().status,
            ParkingLotStatus::Open
        );
        assert_eq!(store.history(&ParkingLotId::new("p2")).len(), 1);
    }

    #[tokio::test]
    async fn should_stop_applying_after_stop() {
        let (store, bus, listener) = setup().await;
        listener.observe(ParkingLotId::new("p1"));
        listener.stop();
        assert_eq!(listener.observed(), None);

        bus.publish(record("h1", "p1", ParkingLotStatus::Closed))
            .await
            .unwrap();
        settle().await;

        assert!(store.history(&ParkingLotId::new("p1")).is_empty());
    }

    #[tokio::test]
    async fn should_stop_applying_when_dropped() {
        let (store, bus, listener) = setup().await;
        listener.observe(ParkingLotId::new("p1"));
        drop(listener);

        bus.publish(record("h1", "p1", ParkingLotStatus::Closed))
            .await
            .unwrap();
        settle().await;

        assert!(store.history(&ParkingLotId::new("p1")).is_empty());
    }
}
