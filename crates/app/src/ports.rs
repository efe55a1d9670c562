//! Port definitions: traits that adapters implement.
//!
//! Ports are the boundaries between the application core and the outside world.
//! They are defined here (in `app`) so that both the use-case layer and the
//! adapter layer can depend on them without creating circular dependencies.

pub mod api_client;
pub mod file_storage;
pub mod status_feed;

pub use api_client::{ApiClient, FilePart, Method, MultipartForm, RequestBody};
pub use file_storage::FileStorage;
pub use status_feed::{HistoryPublisher, StatusFeed};
