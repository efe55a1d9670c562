//! In-process status bus backed by a tokio broadcast channel.

use std::future::Future;

use tokio::sync::broadcast;

use parkhub_domain::error::ParkHubError;
use parkhub_domain::history::ParkingLotHistory;

use crate::ports::{HistoryPublisher, StatusFeed};

/// In-process bus carrying live [`ParkingLotHistory`] records using a tokio
/// [`broadcast`] channel.
///
/// Publishing succeeds even when there are no active subscribers
/// (the record is simply dropped).
pub struct InProcessStatusBus {
    sender: broadcast::Sender<ParkingLotHistory>,
}

impl InProcessStatusBus {
    /// Create a new bus with the given channel capacity.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Subscribe to records on this bus.
    ///
    /// Returns a receiver that will get all records published *after*
    /// the subscription is created.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<ParkingLotHistory> {
        self.sender.subscribe()
    }
}

impl HistoryPublisher for InProcessStatusBus {
    fn publish(
        &self,
        record: ParkingLotHistory,
    ) -> impl Future<Output = Result<(), ParkHubError>> + Send {
        // send fails only when there are zero receivers
        let _ = self.sender.send(record);
        async { Ok(()) }
    }
}

impl StatusFeed for InProcessStatusBus {
    fn subscribe(&self) -> broadcast::Receiver<ParkingLotHistory> {
        self.sender.subscribe()
    }
}
