//! Authentication: login, current user, logout.

use std::sync::{Mutex, MutexGuard, PoisonError};

use serde::Deserialize;

use parkhub_domain::error::{Operation, ParkHubError};
use parkhub_domain::user::User;

use crate::ports::api_client::decode;
use crate::ports::{ApiClient, Method, RequestBody};
use crate::services::tracker::OperationTracker;
use crate::token::TokenCell;

#[derive(Debug, Deserialize)]
struct LoginResponse {
    token: String,
    user: User,
}

#[derive(Debug, Default)]
struct AuthState {
    user: Option<User>,
    tracker: OperationTracker,
}

/// Application service for the authenticated session.
///
/// The token lives in a shared [`TokenCell`] so the API client and the
/// real-time connection pick it up without going through this service.
pub struct AuthService<C> {
    api: C,
    token: TokenCell,
    state: Mutex<AuthState>,
}

impl<C: ApiClient> AuthService<C> {
    pub fn new(api: C, token: TokenCell) -> Self {
        Self {
            api,
            token,
            state: Mutex::new(AuthState::default()),
        }
    }

    /// Exchange credentials for a token and remember the user.
    ///
    /// # Errors
    ///
    /// Returns [`ParkHubError::Request`] when the backend rejects the
    /// credentials or cannot be reached; the message is queued.
    #[tracing::instrument(skip(self, password))]
    pub async fn login(&self, email: &str, password: &str) -> Result<User, ParkHubError> {
        self.lock().tracker.begin(Operation::Login);
        let body = RequestBody::json(&serde_json::json!({
            "email": email,
            "password": password,
        }));
        let result = match body {
            Ok(body) => self
                .api
                .request(Method::Post, "/auth/login", body)
                .await
                .and_then(decode::<LoginResponse>),
            Err(err) => Err(err),
        };

        let mut state = self.lock();
        match result {
            Ok(LoginResponse { token, user }) => {
                self.token.set(token);
                state.user = Some(user.clone());
                state.tracker.finish(Operation::Login);
                tracing::info!(user_id = %user.id, "logged in");
                Ok(user)
            }
            Err(err) => Err(state.tracker.fail_request(Operation::Login, &err)),
        }
    }

    /// Fetch the user the current token belongs to.
    ///
    /// # Errors
    ///
    /// Returns [`ParkHubError::Unauthenticated`] when no token is held, or
    /// [`ParkHubError::Request`] when the backend call fails.
    #[tracing::instrument(skip(self))]
    pub async fn me(&self) -> Result<User, ParkHubError> {
        if !self.token.is_present() {
            return Err(ParkHubError::Unauthenticated);
        }
        self.lock().tracker.begin(Operation::Me);
        let result = self
            .api
            .request(Method::Get, "/auth/me", RequestBody::Empty)
            .await
            .and_then(decode::<User>);

        let mut state = self.lock();
        match result {
            Ok(user) => {
                state.user = Some(user.clone());
                state.tracker.finish(Operation::Me);
                Ok(user)
            }
            Err(err) => {
                state.user = None;
                Err(state.tracker.fail_request(Operation::Me, &err))
            }
        }
    }

    /// Drop the token and the remembered user.
    pub fn logout(&self) {
        self.token.clear();
        *self.lock() = AuthState::default();
        tracing::info!("logged out");
    }

    #[must_use]
    pub fn current_user(&self) -> Option<User> {
        self.lock().user.clone()
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.token.is_present()
    }

    #[must_use]
    pub fn is_busy(&self) -> bool {
        let state = self.lock();
        state.tracker.is_busy(Operation::Login) || state.tracker.is_busy(Operation::Me)
    }

    pub fn drain_errors(&self) -> Vec<String> {
        self.lock().tracker.drain_errors()
    }

    fn lock(&self) -> MutexGuard<'_, AuthState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
