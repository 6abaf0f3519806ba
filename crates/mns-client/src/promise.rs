//! Deferred execution handles for asynchronous operations.
//!
//! An [`MnsPromise`] wraps a fully prepared request whose network work has
//! not started yet. The request fires when the caller invokes
//! [`MnsPromise::wait`], never on an implicit background thread, so no side
//! effect of the operation (including the completion callback) can be
//! observed before `wait()` runs.

use std::future::Future;
use std::pin::Pin;

use crate::error::MnsError;

type PendingRequest<T> = Pin<Box<dyn Future<Output = Result<T, MnsError>> + Send + 'static>>;

/// One-shot observer invoked with the terminal outcome.
pub type CompletionCallback<T> = Box<dyn FnOnce(&Result<T, MnsError>) + Send + 'static>;

/// Handle for a deferred operation.
///
/// Transitions from pending to resolved or failed exactly once; the terminal
/// state is retained, so repeated [`wait`](Self::wait) calls return copies of
/// the same outcome. A registered callback fires exactly once, on the task
/// that drives the transition, with either the value or the error.
pub struct MnsPromise<T> {
    request: Option<PendingRequest<T>>,
    outcome: Option<Result<T, MnsError>>,
    callback: Option<CompletionCallback<T>>,
}

impl<T> MnsPromise<T>
where
    T: Clone + Send + 'static,
{
    pub(crate) fn new(
        request: impl Future<Output = Result<T, MnsError>> + Send + 'static,
    ) -> Self {
        Self {
            request: Some(Box::pin(request)),
            outcome: None,
            callback: None,
        }
    }

    /// Check if the operation has not been dispatched yet.
    pub fn is_pending(&self) -> bool {
        self.outcome.is_none()
    }

    /// Check if the operation completed successfully.
    pub fn is_resolved(&self) -> bool {
        matches!(self.outcome, Some(Ok(_)))
    }

    /// Check if the operation completed with an error.
    pub fn is_failed(&self) -> bool {
        matches!(self.outcome, Some(Err(_)))
    }

    /// Register a completion observer.
    ///
    /// The observer fires exactly once: during the `wait()` call that drives
    /// the transition, or immediately if the promise is already terminal.
    /// Registering a second observer replaces an unfired one.
    pub fn on_complete(&mut self, callback: impl FnOnce(&Result<T, MnsError>) + Send + 'static) {
        match &self.outcome {
            None => self.callback = Some(Box::new(callback)),
            Some(outcome) => callback(outcome),
        }
    }

    /// Dispatch the deferred request (on first call) and return its outcome.
    ///
    /// Blocks the calling task for the full network round trip, including
    /// any server-side long-poll window. Later calls return the stored
    /// terminal outcome without touching the network again.
    pub async fn wait(&mut self) -> Result<T, MnsError> {
        if let Some(request) = self.request.take() {
            let outcome = request.await;
            if let Some(callback) = self.callback.take() {
                callback(&outcome);
            }
            self.outcome = Some(outcome);
        }

        match &self.outcome {
            Some(Ok(value)) => Ok(value.clone()),
            Some(Err(error)) => Err(error.clone()),
            // Promises are always constructed with a pending request, so the
            // take() branch has populated the outcome by this point.
            None => Err(MnsError::Transport {
                message: "promise has no pending request".to_string(),
            }),
        }
    }
}

impl<T> std::fmt::Debug for MnsPromise<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = match &self.outcome {
            None => "pending",
            Some(Ok(_)) => "resolved",
            Some(Err(_)) => "failed",
        };
        f.debug_struct("MnsPromise").field("state", &state).finish()
    }
}

#[cfg(test)]
#[path = "promise_tests.rs"]
mod tests;
