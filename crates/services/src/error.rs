//! Shared error types for the services crate.

use thiserror::Error;

use flashcards_core::StoreError;
use flashcards_core::model::FlashcardId;
use gateway::{ConfigError, GatewayError};

/// Why a page action did not commit.
///
/// Gateway failures have already been handed to the page's reporter by the
/// time a caller sees them here.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum PageError {
    #[error(transparent)]
    Gateway(#[from] GatewayError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("no category is loaded")]
    NotLoaded,
    #[error("flashcard {0} is not on this page")]
    UnknownFlashcard(FlashcardId),
    #[error("no dialog is open")]
    DialogClosed,
}

/// Errors emitted while bootstrapping client services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ClientServicesError {
    #[error(transparent)]
    Config(#[from] ConfigError),
}
