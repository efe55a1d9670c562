//! Per-operation busy flags and the display error queue.

use std::collections::HashSet;

use parkhub_domain::error::{ApiError, Operation, ParkHubError};

/// `idle -> busy -> idle` per [`Operation`], plus the queue of messages
/// waiting to be shown.
///
/// Starting an operation clears the queue. A failure clears the busy flag and
/// appends exactly one message.
#[derive(Debug, Default)]
pub struct OperationTracker {
    busy: HashSet<Operation>,
    errors: Vec<String>,
}

impl OperationTracker {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin(&mut self, operation: Operation) {
        self.busy.insert(operation);
        self.errors.clear();
    }

    pub fn finish(&mut self, operation: Operation) {
        self.busy.remove(&operation);
    }

    /// Record a failed operation and queue `message` for display.
    pub fn fail(&mut self, operation: Operation, message: String) {
        self.busy.remove(&operation);
        tracing::warn!(%operation, %message, "operation failed");
        self.errors.push(message);
    }

    /// Queue the normalised message of `err` and build the error re-raised
    /// to the caller.
    pub fn fail_request(&mut self, operation: Operation, err: &ApiError) -> ParkHubError {
        let message = err.user_message();
        self.fail(operation, message.clone());
        ParkHubError::Request {
            operation,
            kind: err.kind(),
            message,
        }
    }

    #[must_use]
    pub fn is_busy(&self, operation: Operation) -> bool {
        self.busy.contains(&operation)
    }

    /// Busy operations in declaration order.
    #[must_use]
    pub fn busy(&self) -> Vec<Operation> {
        Operation::ALL
            .into_iter()
            .filter(|op| self.busy.contains(op))
            .collect()
    }

    #[must_use]
    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    /// Take every queued message, leaving the queue empty.
    pub fn drain_errors(&mut self) -> Vec<String> {
        std::mem::take(&mut self.errors)
    }

    pub fn clear_errors(&mut self) {
        self.errors.clear();
    }
}
