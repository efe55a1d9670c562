//! Shared bearer token.
//!
//! The REST client reads it on every request and the real-time connection
//! reads it when connecting. Login writes it, logout clears it.

use std::sync::{Arc, PoisonError, RwLock};

/// Cloneable handle to the current session token.
#[derive(Debug, Clone, Default)]
pub struct TokenCell {
    inner: Arc<RwLock<Option<String>>>,
}

impl TokenCell {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with a known token (e.g. from configuration).
    #[must_use]
    pub fn with_token(token: impl Into<String>) -> Self {
        let cell = Self::new();
        cell.set(token);
        cell
    }

    /// Current token, if any. An empty string counts as no token.
    #[must_use]
    pub fn get(&self) -> Option<String> {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
            .filter(|token| !token.is_empty())
    }

    pub fn set(&self, token: impl Into<String>) {
        *self.inner.write().unwrap_or_else(PoisonError::into_inner) = Some(token.into());
    }

    pub fn clear(&self) {
        *self.inner.write().unwrap_or_else(PoisonError::into_inner) = None;
    }

    #[must_use]
    pub fn is_present(&self) -> bool {
        self.get().is_some()
    }
}
