//! Plumbing shared by the page controllers.
//!
//! A page owns its state behind `Arc<Mutex<_>>`. Every async action captures
//! only a [`PageHandle`] (a `Weak`), so the page can be dropped while calls are
//! outstanding; a response that arrives afterwards touches nothing.

use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use crate::error::PageError;

/// Result of a page action once its gateway call has settled.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use]
pub enum Outcome<T> {
    /// The call succeeded and the page state now reflects the server value.
    Committed(T),
    /// The action did not go through. Gateway failures were already reported.
    Failed(PageError),
    /// The call succeeded after the page was dropped.
    Detached,
}

impl<T> Outcome<T> {
    #[must_use]
    pub fn is_committed(&self) -> bool {
        matches!(self, Outcome::Committed(_))
    }

    #[must_use]
    pub fn committed(self) -> Option<T> {
        match self {
            Outcome::Committed(value) => Some(value),
            _ => None,
        }
    }

    #[must_use]
    pub fn error(&self) -> Option<&PageError> {
        match self {
            Outcome::Failed(err) => Some(err),
            _ => None,
        }
    }
}

/// Future returned by page actions. Holds no strong reference to the page.
pub type PageFuture<T> = Pin<Box<dyn Future<Output = Outcome<T>> + Send + 'static>>;

pub(crate) fn ready<T: Send + 'static>(outcome: Outcome<T>) -> PageFuture<T> {
    Box::pin(std::future::ready(outcome))
}

pub(crate) fn lock<S>(state: &Mutex<S>) -> MutexGuard<'_, S> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

pub(crate) struct PageHandle<S>(Weak<Mutex<S>>);

impl<S> PageHandle<S> {
    pub(crate) fn new(state: &Arc<Mutex<S>>) -> Self {
        Self(Arc::downgrade(state))
    }

    /// Runs `f` against the page state, or returns `None` if the page is gone.
    pub(crate) fn with<R>(&self, f: impl FnOnce(&mut S) -> R) -> Option<R> {
        let state = self.0.upgrade()?;
        let mut guard = lock(&state);
        Some(f(&mut guard))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handle_detaches_when_state_dropped() {
        let state = Arc::new(Mutex::new(1_u32));
        let handle = PageHandle::new(&state);
        assert_eq!(handle.with(|n| *n += 1), Some(()));
        assert_eq!(*lock(&state), 2);

        drop(state);
        assert_eq!(handle.with(|n| *n += 1), None);
    }

    #[test]
    fn outcome_accessors() {
        let ok: Outcome<u8> = Outcome::Committed(3);
        assert!(ok.is_committed());
        assert_eq!(ok.committed(), Some(3));

        let failed: Outcome<u8> = Outcome::Failed(PageError::NotLoaded);
        assert_eq!(failed.error(), Some(&PageError::NotLoaded));
        assert_eq!(failed.committed(), None);
    }
}
