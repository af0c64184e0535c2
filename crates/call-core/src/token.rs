//! Request correlator primitives
//!
//! A [`RequestToken`] represents one in-flight service request. Resolving it
//! consumes the token, which makes double completion unrepresentable: the
//! engine takes the token out of whatever slot held it and calls one of the
//! completion methods, exactly once per request.

use tokio::sync::oneshot;

use crate::types::{CallSnapshot, LastCallFailCause};

/// Optional payload a successful request carries back to the caller
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResponsePayload {
    /// Category for the last-call-fail-cause query
    FailCause(LastCallFailCause),
    /// Snapshot list for the current-calls query
    CallList(Vec<CallSnapshot>),
}

/// Final result of one request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestOutcome {
    Success(Option<ResponsePayload>),
    Failure,
}

impl RequestOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, RequestOutcome::Success(_))
    }
}

/// Completion handle for one in-flight request
#[derive(Debug)]
pub struct RequestToken {
    tx: oneshot::Sender<RequestOutcome>,
}

impl RequestToken {
    /// Create a token and the caller-side handle awaiting its completion
    pub fn new() -> (RequestToken, PendingResponse) {
        let (tx, rx) = oneshot::channel();
        (RequestToken { tx }, PendingResponse { rx })
    }

    /// Resolve with an explicit outcome
    pub fn complete(self, outcome: RequestOutcome) {
        let _ = self.tx.send(outcome);
    }

    /// Resolve with a payload-free success
    pub fn succeed(self) {
        self.complete(RequestOutcome::Success(None));
    }

    /// Resolve successfully with a response payload
    pub fn succeed_with(self, payload: ResponsePayload) {
        self.complete(RequestOutcome::Success(Some(payload)));
    }

    /// Resolve as a generic failure
    pub fn fail(self) {
        self.complete(RequestOutcome::Failure);
    }
}

/// Caller-side handle for a request's single completion
#[derive(Debug)]
pub struct PendingResponse {
    rx: oneshot::Receiver<RequestOutcome>,
}

impl PendingResponse {
    /// Wait for the request to complete.
    ///
    /// A token dropped unresolved (engine torn down) reports as failure.
    pub async fn outcome(self) -> RequestOutcome {
        self.rx.await.unwrap_or(RequestOutcome::Failure)
    }

    /// Probe for a completion without waiting
    pub fn try_outcome(&mut self) -> Option<RequestOutcome> {
        self.rx.try_recv().ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn token_resolves_once() {
        let (token, response) = RequestToken::new();
        token.succeed();
        assert!(response.outcome().await.is_success());
    }

    #[tokio::test]
    async fn dropped_token_reports_failure() {
        let (token, response) = RequestToken::new();
        drop(token);
        assert_eq!(response.outcome().await, RequestOutcome::Failure);
    }

    #[tokio::test]
    async fn try_outcome_sees_settled_requests() {
        let (token, mut response) = RequestToken::new();
        assert!(response.try_outcome().is_none());

        token.fail();
        assert_eq!(response.try_outcome(), Some(RequestOutcome::Failure));
    }

    #[test]
    fn outcome_stays_pending_until_resolution() {
        let (token, response) = RequestToken::new();
        let mut waiting = tokio_test::task::spawn(response.outcome());

        tokio_test::assert_pending!(waiting.poll());
        token.succeed();
        tokio_test::assert_ready_eq!(waiting.poll(), RequestOutcome::Success(None));
    }
}
