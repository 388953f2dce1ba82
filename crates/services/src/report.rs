use std::sync::{Mutex, PoisonError};

use gateway::GatewayError;

/// Receives every failed gateway call exactly once, with the raw error.
pub trait ErrorReporter: Send + Sync {
    fn report(&self, error: &GatewayError);
}

/// Logs failures at `warn`.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingReporter;

impl ErrorReporter for TracingReporter {
    fn report(&self, error: &GatewayError) {
        tracing::warn!(%error, "gateway call failed");
    }
}

/// Keeps reported errors in arrival order.
#[derive(Debug, Default)]
pub struct CollectingReporter {
    errors: Mutex<Vec<GatewayError>>,
}

impl CollectingReporter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn errors(&self) -> Vec<GatewayError> {
        self.errors
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.errors
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drains the collected errors.
    pub fn take(&self) -> Vec<GatewayError> {
        std::mem::take(&mut *self.errors.lock().unwrap_or_else(PoisonError::into_inner))
    }
}

impl ErrorReporter for CollectingReporter {
    fn report(&self, error: &GatewayError) {
        tracing::debug!(%error, "collected gateway failure");
        self.errors
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(error.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collecting_reporter_keeps_order_and_drains() {
        let reporter = CollectingReporter::new();
        reporter.report(&GatewayError::NotFound);
        reporter.report(&GatewayError::Validation("taken".into()));

        assert_eq!(reporter.len(), 2);
        assert_eq!(
            reporter.take(),
            vec![
                GatewayError::NotFound,
                GatewayError::Validation("taken".into())
            ]
        );
        assert!(reporter.is_empty());
    }
}
