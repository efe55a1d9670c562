//! Node directory: the node choices for a parking lot.

use parkhub_domain::error::{Operation, ParkHubError};
use parkhub_domain::node::Node;

use crate::ports::api_client::decode;
use crate::ports::{ApiClient, Method, RequestBody};

pub struct NodeDirectory<C> {
    api: C,
}

impl<C: ApiClient> NodeDirectory<C> {
    pub fn new(api: C) -> Self {
        Self { api }
    }

    /// Every node the backend knows, in backend order.
    ///
    /// # Errors
    ///
    /// Returns [`ParkHubError::Request`] when the listing fails.
    #[tracing::instrument(skip(self))]
    pub async fn list(&self) -> Result<Vec<Node>, ParkHubError> {
        let nodes: Option<Vec<Node>> = self
            .api
            .request(Method::Get, "/node", RequestBody::Empty)
            .await
            .and_then(decode)
            .map_err(|err| {
                let message = err.user_message();
                tracing::warn!(%message, "failed to list nodes");
                ParkHubError::Request {
                    operation: Operation::Get,
                    kind: err.kind(),
                    message,
                }
            })?;
        let nodes = nodes.unwrap_or_default();
        tracing::debug!(count = nodes.len(), "nodes listed");
        Ok(nodes)
    }
}
