//! Status feed port: publish/subscribe for live history records.

use std::future::Future;

use tokio::sync::broadcast;

use parkhub_domain::error::ParkHubError;
use parkhub_domain::history::ParkingLotHistory;

/// Publishes status records received from the real-time channel.
pub trait HistoryPublisher {
    /// Publish a record to all current subscribers.
    fn publish(
        &self,
        record: ParkingLotHistory,
    ) -> impl Future<Output = Result<(), ParkHubError>> + Send;
}

impl<T: HistoryPublisher + Send + Sync> HistoryPublisher for std::sync::Arc<T> {
    fn publish(
        &self,
        record: ParkingLotHistory,
    ) -> impl Future<Output = Result<(), ParkHubError>> + Send {
        (**self).publish(record)
    }
}

/// Hands out receivers for every record published from now on.
pub trait StatusFeed: Send + Sync {
    fn subscribe(&self) -> broadcast::Receiver<ParkingLotHistory>;
}

impl<T: StatusFeed> StatusFeed for std::sync::Arc<T> {
    fn subscribe(&self) -> broadcast::Receiver<ParkingLotHistory> {
        (**self).subscribe()
    }
}
