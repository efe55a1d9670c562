//! Parking lot store: the client-side cache of parking lots and their
//! per-lot status history.
//!
//! Every remote operation follows the same cycle: mark the operation kind
//! busy and clear the error queue, perform one request, then either mutate
//! the cache or queue a message. The cache is only touched after a
//! successful response. Views follow mutations through [`ParkingLotStore::subscribe`].

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use serde::de::{DeserializeOwned, IgnoredAny};
use tokio::sync::watch;

use parkhub_domain::dto::{ParkingLotDto, to_dto};
use parkhub_domain::error::{
    ApiError, ImageSyncError, NotFoundError, Operation, ParkHubError, SyncProgress,
};
use parkhub_domain::history::{HistoryLog, ParkingLotHistory};
use parkhub_domain::id::ParkingLotId;
use parkhub_domain::parking_lot::ParkingLot;

use crate::ports::{ApiClient, FileStorage, Method, RequestBody, api_client::decode};
use crate::services::image_session::ImageSession;
use crate::services::tracker::OperationTracker;

const ADMIN_PATH: &str = "/admin/parking-lot";
const PUBLIC_PATH: &str = "/parking-lot";

#[derive(Debug, Default)]
struct StoreState {
    lots: Vec<ParkingLot>,
    histories: HashMap<ParkingLotId, HistoryLog>,
    tracker: OperationTracker,
}

/// Cache of parking lots and history logs, backed by an [`ApiClient`].
pub struct ParkingLotStore<C> {
    api: C,
    state: Mutex<StoreState>,
    changes: watch::Sender<u64>,
}

impl<C: ApiClient> ParkingLotStore<C> {
    /// Create an empty store.
    pub fn new(api: C) -> Self {
        let (changes, _) = watch::channel(0);
        Self {
            api,
            state: Mutex::new(StoreState::default()),
            changes,
        }
    }

    /// Receiver whose value increases after every state change.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.changes.subscribe()
    }

    /// Create a parking lot and append the returned record to the cache.
    ///
    /// # Errors
    ///
    /// Returns [`ParkHubError::Request`] when the request fails; the message
    /// is also queued and the cache is left unchanged.
    #[tracing::instrument(skip(self, dto), fields(code = %dto.code))]
    pub async fn create(&self, dto: &ParkingLotDto) -> Result<ParkingLot, ParkHubError> {
        let lot: ParkingLot = self
            .call(
                Operation::Create,
                Method::Post,
                ADMIN_PATH,
                RequestBody::json(dto),
            )
            .await?;
        self.commit(Operation::Create, |state| state.lots.push(lot.clone()));
        tracing::debug!(id = ?lot.id, "parking lot created");
        Ok(lot)
    }

    /// Replace the whole cache with the backend's current set.
    ///
    /// # Errors
    ///
    /// Returns [`ParkHubError::Request`] when the request fails.
    #[tracing::instrument(skip(self))]
    pub async fn list(&self) -> Result<Vec<ParkingLot>, ParkHubError> {
        let lots: Vec<ParkingLot> = self
            .call(Operation::Get, Method::Get, PUBLIC_PATH, Ok(RequestBody::Empty))
            .await?;
        self.commit(Operation::Get, |state| state.lots.clone_from(&lots));
        tracing::debug!(count = lots.len(), "parking lots reloaded");
        Ok(lots)
    }

    /// Update a parking lot and replace the cached entry with the same id.
    ///
    /// # Errors
    ///
    /// Returns [`ParkHubError::Request`] when the request fails.
    #[tracing::instrument(skip(self, dto))]
    pub async fn update(
        &self,
        id: &ParkingLotId,
        dto: &ParkingLotDto,
    ) -> Result<ParkingLot, ParkHubError> {
        let lot: ParkingLot = self
            .call(
                Operation::Update,
                Method::Put,
                &format!("{ADMIN_PATH}/{id}"),
                RequestBody::json(dto),
            )
            .await?;
        self.commit(Operation::Update, |state| {
            if let Some(slot) = state.lots.iter_mut().find(|cached| cached.has_id(id)) {
                *slot = lot.clone();
            } else {
                tracing::debug!("updated parking lot was not cached");
            }
        });
        Ok(lot)
    }

    /// Delete a parking lot and drop it from the cache.
    ///
    /// Stored images are left alone; see [`Self::remove_with_images`].
    ///
    /// # Errors
    ///
    /// Returns [`ParkHubError::Request`] when the request fails.
    #[tracing::instrument(skip(self))]
    pub async fn remove(&self, id: &ParkingLotId) -> Result<(), ParkHubError> {
        let _: IgnoredAny = self
            .call(
                Operation::Delete,
                Method::Delete,
                &format!("{ADMIN_PATH}/{id}"),
                Ok(RequestBody::Empty),
            )
            .await?;
        self.commit(Operation::Delete, |state| {
            state.lots.retain(|cached| !cached.has_id(id));
        });
        Ok(())
    }

    /// Fetch the full history of one parking lot, oldest first, replacing
    /// whatever was cached for it.
    ///
    /// # Errors
    ///
    /// Returns [`ParkHubError::Request`] when the request fails.
    #[tracing::instrument(skip(self))]
    pub async fn get_history(
        &self,
        id: &ParkingLotId,
    ) -> Result<Vec<ParkingLotHistory>, ParkHubError> {
        let records: Vec<ParkingLotHistory> = self
            .call(
                Operation::GetHistory,
                Method::Get,
                &format!("{ADMIN_PATH}/{id}/history"),
                Ok(RequestBody::Empty),
            )
            .await?;
        let log: HistoryLog = records.into_iter().collect();
        let records = log.records().to_vec();
        self.commit(Operation::GetHistory, |state| {
            state.histories.insert(id.clone(), log);
        });
        tracing::debug!(count = records.len(), "history replaced");
        Ok(records)
    }

    /// Commit the image session, then create or update `form` with the
    /// resulting image list.
    ///
    /// The record is created when `form` has no id and updated otherwise.
    ///
    /// # Errors
    ///
    /// Returns [`ParkHubError::Validation`] before any request when `form` is
    /// invalid, [`ParkHubError::ImageSync`] when storage fails (the record is
    /// not saved), or [`ParkHubError::Request`] when the save itself fails.
    #[tracing::instrument(skip_all, fields(id = ?form.id, code = %form.code))]
    pub async fn save(
        &self,
        form: &ParkingLot,
        images: &mut ImageSession,
        storage: &impl FileStorage,
    ) -> Result<ParkingLot, ParkHubError> {
        form.validate()?;
        let target = form.id.clone().filter(|id| !id.is_empty());
        let operation = if target.is_some() {
            Operation::Update
        } else {
            Operation::Create
        };

        self.begin(operation);
        let images = match images.commit(storage).await {
            Ok(images) => images,
            Err(err) => return Err(self.fail_sync(operation, err)),
        };

        let dto = to_dto(form).with_images(images);
        match target {
            Some(id) => self.update(&id, &dto).await,
            None => self.create(&dto).await,
        }
    }

    /// Delete a cached parking lot's stored images, then the record.
    ///
    /// # Errors
    ///
    /// Returns [`ParkHubError::NotFound`] when `id` is not cached,
    /// [`ParkHubError::ImageSync`] when an image delete fails (the record is
    /// kept), or [`ParkHubError::Request`] when the record delete fails.
    #[tracing::instrument(skip(self, storage))]
    pub async fn remove_with_images(
        &self,
        id: &ParkingLotId,
        storage: &impl FileStorage,
    ) -> Result<(), ParkHubError> {
        let images = self
            .get(id)
            .map(|lot| lot.images)
            .ok_or_else(|| NotFoundError {
                entity: "ParkingLot",
                id: id.to_string(),
            })?;

        self.begin(Operation::Delete);
        let mut completed = SyncProgress::default();
        for image in images {
            if let Err(source) = storage.delete(&image.key).await {
                let err = ImageSyncError::Delete {
                    key: image.key,
                    source,
                    completed: Box::new(completed),
                };
                return Err(self.fail_sync(Operation::Delete, err));
            }
            completed.deleted.push(image.key);
        }
        self.remove(id).await
    }

    /// Apply one live history record.
    ///
    /// Appends the record to its lot's log and sets the cached lot's status,
    /// both under the same lock. A record whose id is already logged is
    /// ignored entirely. Returns `true` when the record was applied.
    pub fn apply_status_event(&self, record: ParkingLotHistory) -> bool {
        let mut state = self.lock();
        let StoreState {
            lots, histories, ..
        } = &mut *state;

        let log = histories.entry(record.parking_lot_id.clone()).or_default();
        if log.contains(&record.id) {
            tracing::debug!(id = %record.id, "duplicate status event ignored");
            return false;
        }
        if let Some(lot) = lots
            .iter_mut()
            .find(|cached| cached.has_id(&record.parking_lot_id))
        {
            lot.status = record.status;
        }
        tracing::debug!(
            parking_lot_id = %record.parking_lot_id,
            status = ?record.status,
            "status event applied"
        );
        log.append(record);
        drop(state);
        self.notify();
        true
    }

    /// Snapshot of the cached parking lots, in cache order.
    #[must_use]
    pub fn parking_lots(&self) -> Vec<ParkingLot> {
        self.lock().lots.clone()
    }

    #[must_use]
    pub fn get(&self, id: &ParkingLotId) -> Option<ParkingLot> {
        self.lock()
            .lots
            .iter()
            .find(|cached| cached.has_id(id))
            .cloned()
    }

    /// Cached history log of one lot (empty when never fetched).
    #[must_use]
    pub fn history(&self, id: &ParkingLotId) -> HistoryLog {
        self.lock().histories.get(id).cloned().unwrap_or_default()
    }

    #[must_use]
    pub fn is_busy(&self, operation: Operation) -> bool {
        self.lock().tracker.is_busy(operation)
    }

    #[must_use]
    pub fn errors(&self) -> Vec<String> {
        self.lock().tracker.errors().to_vec()
    }

    /// Take the queued messages for display.
    pub fn drain_errors(&self) -> Vec<String> {
        let drained = self.lock().tracker.drain_errors();
        if !drained.is_empty() {
            self.notify();
        }
        drained
    }

    pub fn clear_errors(&self) {
        self.lock().tracker.clear_errors();
        self.notify();
    }

    /// Forget every cached record, log, flag, and message.
    pub fn reset(&self) {
        *self.lock() = StoreState::default();
        self.notify();
    }

    async fn call<T: DeserializeOwned>(
        &self,
        operation: Operation,
        method: Method,
        path: &str,
        body: Result<RequestBody, ApiError>,
    ) -> Result<T, ParkHubError> {
        self.begin(operation);
        let result = match body {
            Ok(body) => self.api.request(method, path, body).await.and_then(decode),
            Err(err) => Err(err),
        };
        result.map_err(|err| {
            let error = self.lock().tracker.fail_request(operation, &err);
            self.notify();
            error
        })
    }

    fn begin(&self, operation: Operation) {
        self.lock().tracker.begin(operation);
        self.notify();
    }

    fn commit(&self, operation: Operation, apply: impl FnOnce(&mut StoreState)) {
        let mut state = self.lock();
        apply(&mut state);
        state.tracker.finish(operation);
        drop(state);
        self.notify();
    }

    fn fail_sync(&self, operation: Operation, err: ImageSyncError) -> ParkHubError {
        let message = err.api_error().user_message();
        self.lock().tracker.fail(operation, message);
        self.notify();
        err.into()
    }

    fn lock(&self) -> MutexGuard<'_, StoreState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn notify(&self) {
        self.changes.send_modify(|version| *version = version.wrapping_add(1));
    }
}
