use thiserror::Error;

use crate::model::CategoryId;

/// Validation failures for user-supplied drafts and patches.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ModelError {
    #[error("category name cannot be empty")]
    EmptyName,

    #[error("flashcard question cannot be empty")]
    EmptyQuestion,

    #[error("flashcard answer cannot be empty")]
    EmptyAnswer,
}

/// Violations of the collection store invariants.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum StoreError {
    #[error("flashcard belongs to category {found}, expected {expected}")]
    CategoryMismatch {
        expected: CategoryId,
        found: CategoryId,
    },
}

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Model(#[from] ModelError),
    #[error(transparent)]
    Store(#[from] StoreError),
}
