//! Session: the explicit dependency container for one signed-in run.
//!
//! Built once at start-up from an [`ApiClient`] and the shared
//! [`TokenCell`]; torn down with [`Session::logout`].

use std::sync::Arc;

use parkhub_domain::id::ParkingLotId;

use crate::ports::ApiClient;
use crate::services::auth_service::AuthService;
use crate::services::file_storage::RestFileStorage;
use crate::services::history_listener::HistoryListener;
use crate::services::node_directory::NodeDirectory;
use crate::services::parking_lot_store::ParkingLotStore;
use crate::services::user_directory::UserDirectory;
use crate::status_bus::InProcessStatusBus;
use crate::token::TokenCell;

/// Capacity of the in-process status bus.
pub const STATUS_BUS_CAPACITY: usize = 256;

pub struct Session<C> {
    token: TokenCell,
    bus: Arc<InProcessStatusBus>,
    parking_lots: Arc<ParkingLotStore<Arc<C>>>,
    history: HistoryListener<Arc<C>, Arc<InProcessStatusBus>>,
    auth: AuthService<Arc<C>>,
    users: UserDirectory<Arc<C>>,
    nodes: NodeDirectory<Arc<C>>,
    storage: RestFileStorage<Arc<C>>,
}

impl<C: ApiClient + 'static> Session<C> {
    /// Wire every service around one shared client.
    pub fn new(api: C, token: TokenCell, upload_folder: impl Into<String>) -> Self {
        let api = Arc::new(api);
        let bus = Arc::new(InProcessStatusBus::new(STATUS_BUS_CAPACITY));
        let parking_lots = Arc::new(ParkingLotStore::new(Arc::clone(&api)));
        Self {
            history: HistoryListener::new(Arc::clone(&parking_lots), Arc::clone(&bus)),
            auth: AuthService::new(Arc::clone(&api), token.clone()),
            users: UserDirectory::new(Arc::clone(&api)),
            nodes: NodeDirectory::new(Arc::clone(&api)),
            storage: RestFileStorage::new(api, upload_folder),
            token,
            bus,
            parking_lots,
        }
    }

    #[must_use]
    pub fn token(&self) -> &TokenCell {
        &self.token
    }

    /// Bus the real-time adapter publishes to.
    #[must_use]
    pub fn status_bus(&self) -> Arc<InProcessStatusBus> {
        Arc::clone(&self.bus)
    }

    #[must_use]
    pub fn parking_lots(&self) -> &ParkingLotStore<Arc<C>> {
        &self.parking_lots
    }

    #[must_use]
    pub fn auth(&self) -> &AuthService<Arc<C>> {
        &self.auth
    }

    #[must_use]
    pub fn users(&self) -> &UserDirectory<Arc<C>> {
        &self.users
    }

    #[must_use]
    pub fn nodes(&self) -> &NodeDirectory<Arc<C>> {
        &self.nodes
    }

    #[must_use]
    pub fn storage(&self) -> &RestFileStorage<Arc<C>> {
        &self.storage
    }

    /// Start the live history view of one parking lot.
    pub fn watch_history(&self, id: ParkingLotId) {
        self.history.observe(id);
    }

    pub fn stop_history(&self) {
        self.history.stop();
    }

    /// Clear the token, stop the history view, and return every store to its
    /// initial state.
    pub fn logout(&self) {
        self.history.stop();
        self.auth.logout();
        self.parking_lots.reset();
    }
}
