//! User directory: the owner choices for a parking lot.

use parkhub_domain::error::{Operation, ParkHubError};
use parkhub_domain::user::User;

use crate::ports::api_client::decode;
use crate::ports::{ApiClient, Method, RequestBody};

pub struct UserDirectory<C> {
    api: C,
}

impl<C: ApiClient> UserDirectory<C> {
    pub fn new(api: C) -> Self {
        Self { api }
    }

    /// Users with the OWNER role, in backend order.
    ///
    /// # Errors
    ///
    /// Returns [`ParkHubError::Request`] when the listing fails.
    #[tracing::instrument(skip(self))]
    pub async fn owners(&self) -> Result<Vec<User>, ParkHubError> {
        let users: Vec<User> = self
            .api
            .request(Method::Get, "/user", RequestBody::Empty)
            .await
            .and_then(decode)
            .map_err(|err| {
                let message = err.user_message();
                tracing::warn!(%message, "failed to list users");
                ParkHubError::Request {
                    operation: Operation::Get,
                    kind: err.kind(),
                    message,
                }
            })?;
        Ok(users.into_iter().filter(User::is_owner).collect())
    }
}
