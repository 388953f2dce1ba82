use std::sync::Arc;

use async_trait::async_trait;
use flashcards_core::model::{
    Category, CategoryDraft, CategoryId, CategoryPatch, CategoryWithCounts, CategoryWithFlashcards,
    Flashcard, FlashcardDraft, FlashcardId, FlashcardPatch,
};

use crate::error::{ConfigError, GatewayError};
use crate::http::{GatewayConfig, HttpGateway};
use crate::memory::InMemoryGateway;

/// Remote contract for categories. Every call returns the canonical
/// representation of the affected entity.
#[async_trait]
pub trait CategoryGateway: Send + Sync {
    /// Create a category; the server assigns the id.
    ///
    /// # Errors
    ///
    /// Returns `GatewayError::Validation` if the name is rejected, or
    /// `GatewayError::Network` on transport failures.
    async fn create_category(&self, draft: &CategoryDraft) -> Result<Category, GatewayError>;

    /// List every category with its flashcard counts.
    ///
    /// # Errors
    ///
    /// Returns `GatewayError::Network` on transport failures.
    async fn list_categories(&self) -> Result<Vec<CategoryWithCounts>, GatewayError>;

    /// Fetch a category with its flashcards in server order.
    ///
    /// # Errors
    ///
    /// Returns `GatewayError::NotFound` if missing, or other gateway errors.
    async fn get_category(&self, id: CategoryId) -> Result<CategoryWithFlashcards, GatewayError>;

    /// # Errors
    ///
    /// Returns `GatewayError::NotFound`, `GatewayError::Validation`, or
    /// `GatewayError::Network`.
    async fn update_category(
        &self,
        id: CategoryId,
        patch: &CategoryPatch,
    ) -> Result<Category, GatewayError>;

    /// # Errors
    ///
    /// Returns `GatewayError::NotFound` or `GatewayError::Network`.
    async fn delete_category(&self, id: CategoryId) -> Result<(), GatewayError>;
}

/// Remote contract for flashcards.
#[async_trait]
pub trait FlashcardGateway: Send + Sync {
    /// Create a flashcard in `category_id`. New cards start unknown and not
    /// bookmarked.
    ///
    /// # Errors
    ///
    /// Returns `GatewayError::Validation` or `GatewayError::Network`.
    async fn create_flashcard(
        &self,
        category_id: CategoryId,
        draft: &FlashcardDraft,
    ) -> Result<Flashcard, GatewayError>;

    /// # Errors
    ///
    /// Returns `GatewayError::NotFound` or `GatewayError::Network`.
    async fn update_flashcard(
        &self,
        id: FlashcardId,
        patch: &FlashcardPatch,
    ) -> Result<Flashcard, GatewayError>;

    /// # Errors
    ///
    /// Returns `GatewayError::NotFound` or `GatewayError::Network`.
    async fn delete_flashcard(&self, id: FlashcardId) -> Result<(), GatewayError>;
}

/// Aggregates both contracts behind trait objects for easy backend swapping.
#[derive(Clone)]
pub struct Gateway {
    pub categories: Arc<dyn CategoryGateway>,
    pub flashcards: Arc<dyn FlashcardGateway>,
}

impl Gateway {
    /// Both contracts served by one backend.
    pub fn shared<B>(backend: B) -> Self
    where
        B: CategoryGateway + FlashcardGateway + 'static,
    {
        let backend = Arc::new(backend);
        let categories: Arc<dyn CategoryGateway> = backend.clone();
        let flashcards: Arc<dyn FlashcardGateway> = backend;
        Self {
            categories,
            flashcards,
        }
    }

    #[must_use]
    pub fn in_memory() -> Self {
        Self::shared(InMemoryGateway::new())
    }

    /// Build a gateway talking to the REST API described by `config`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the HTTP client cannot be built.
    pub fn http(config: &GatewayConfig) -> Result<Self, ConfigError> {
        Ok(Self::shared(HttpGateway::new(config)?))
    }
}
