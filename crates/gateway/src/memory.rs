//! In-process stand-in for the remote collection, for tests and prototyping.
//!
//! Behaves like the server: assigns sequential ids, computes list counts,
//! rejects duplicate category names, and answers `NotFound` for unknown ids.
//! Failures can be scripted per operation with [`InMemoryGateway::fail_next`].

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use flashcards_core::filter::normalize;
use flashcards_core::model::{
    Category, CategoryDraft, CategoryId, CategoryPatch, CategoryWithCounts, CategoryWithFlashcards,
    Flashcard, FlashcardDraft, FlashcardId, FlashcardPatch,
};

use crate::error::GatewayError;
use crate::gateway::{CategoryGateway, FlashcardGateway};

/// Gateway operations, used to script failures and count calls.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Operation {
    CreateCategory,
    ListCategories,
    GetCategory,
    UpdateCategory,
    DeleteCategory,
    CreateFlashcard,
    UpdateFlashcard,
    DeleteFlashcard,
}

struct ServerState {
    next_category_id: u64,
    next_flashcard_id: u64,
    categories: Vec<Category>,
    flashcards: Vec<Flashcard>,
    failures: HashMap<Operation, VecDeque<GatewayError>>,
    calls: HashMap<Operation, usize>,
}

impl Default for ServerState {
    fn default() -> Self {
        Self {
            next_category_id: 1,
            next_flashcard_id: 1,
            categories: Vec::new(),
            flashcards: Vec::new(),
            failures: HashMap::new(),
            calls: HashMap::new(),
        }
    }
}

impl ServerState {
    /// Records the call and pops a scripted failure, if any.
    fn begin(&mut self, op: Operation) -> Result<(), GatewayError> {
        *self.calls.entry(op).or_default() += 1;
        match self.failures.get_mut(&op).and_then(VecDeque::pop_front) {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn category_index(&self, id: CategoryId) -> Result<usize, GatewayError> {
        self.categories
            .iter()
            .position(|c| c.id() == id)
            .ok_or(GatewayError::NotFound)
    }

    fn flashcard_index(&self, id: FlashcardId) -> Result<usize, GatewayError> {
        self.flashcards
            .iter()
            .position(|f| f.id() == id)
            .ok_or(GatewayError::NotFound)
    }

    fn ensure_unique_name(&self, name: &str, except: Option<CategoryId>) -> Result<(), GatewayError> {
        let wanted = normalize(name);
        let taken = self
            .categories
            .iter()
            .any(|c| Some(c.id()) != except && normalize(c.name()) == wanted);
        if taken {
            return Err(GatewayError::Validation(format!(
                "a category named {name:?} already exists"
            )));
        }
        Ok(())
    }

    fn counts(&self, id: CategoryId) -> (u32, u32) {
        self.flashcards
            .iter()
            .filter(|f| f.category_id() == id)
            .fold((0, 0), |(total, known), f| {
                (total + 1, known + u32::from(f.is_known()))
            })
    }
}

/// Simple in-memory gateway implementation for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryGateway {
    state: Arc<Mutex<ServerState>>,
}

impl InMemoryGateway {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, ServerState>, GatewayError> {
        self.state
            .lock()
            .map_err(|e| GatewayError::Network(e.to_string()))
    }

    /// Makes the next call of `op` fail with `error`. Repeated calls queue up.
    pub fn fail_next(&self, op: Operation, error: GatewayError) {
        if let Ok(mut state) = self.lock() {
            state.failures.entry(op).or_default().push_back(error);
        }
    }

    /// Number of times `op` was invoked, failed calls included.
    #[must_use]
    pub fn calls(&self, op: Operation) -> usize {
        self.lock()
            .map(|state| state.calls.get(&op).copied().unwrap_or(0))
            .unwrap_or(0)
    }

    /// Ids the next created entities will receive.
    pub fn set_next_ids(&self, category: u64, flashcard: u64) {
        if let Ok(mut state) = self.lock() {
            state.next_category_id = category;
            state.next_flashcard_id = flashcard;
        }
    }

    /// Stores a category under an explicit id, bypassing the failure script.
    ///
    /// # Errors
    ///
    /// Returns `GatewayError::Validation` for a blank name.
    pub fn seed_category(&self, id: u64, name: &str) -> Result<Category, GatewayError> {
        let category = Category::new(CategoryId::new(id), name)
            .map_err(|e| GatewayError::Validation(e.to_string()))?;
        let mut state = self.lock()?;
        state.categories.retain(|c| c.id() != category.id());
        state.categories.push(category.clone());
        state.next_category_id = state.next_category_id.max(id + 1);
        Ok(category)
    }

    /// Stores a flashcard under an explicit id, bypassing the failure script.
    ///
    /// # Errors
    ///
    /// Returns `GatewayError::Validation` for blank texts and
    /// `GatewayError::NotFound` if the category does not exist.
    pub fn seed_flashcard(
        &self,
        id: u64,
        category_id: u64,
        question: &str,
        answer: &str,
        is_known: bool,
    ) -> Result<Flashcard, GatewayError> {
        let flashcard = Flashcard::new(
            FlashcardId::new(id),
            CategoryId::new(category_id),
            question,
            answer,
            is_known,
            false,
        )
        .map_err(|e| GatewayError::Validation(e.to_string()))?;
        let mut state = self.lock()?;
        state.category_index(flashcard.category_id())?;
        state.flashcards.retain(|f| f.id() != flashcard.id());
        state.flashcards.push(flashcard.clone());
        state.next_flashcard_id = state.next_flashcard_id.max(id + 1);
        Ok(flashcard)
    }
}

#[async_trait]
impl CategoryGateway for InMemoryGateway {
    async fn create_category(&self, draft: &CategoryDraft) -> Result<Category, GatewayError> {
        let mut state = self.lock()?;
        state.begin(Operation::CreateCategory)?;
        state.ensure_unique_name(draft.name(), None)?;
        let id = CategoryId::new(state.next_category_id);
        let category =
            Category::new(id, draft.name()).map_err(|e| GatewayError::Validation(e.to_string()))?;
        state.next_category_id += 1;
        state.categories.push(category.clone());
        Ok(category)
    }

    async fn list_categories(&self) -> Result<Vec<CategoryWithCounts>, GatewayError> {
        let mut state = self.lock()?;
        state.begin(Operation::ListCategories)?;
        Ok(state
            .categories
            .iter()
            .map(|c| {
                let (total, known) = state.counts(c.id());
                CategoryWithCounts::new(c.clone(), total, known)
            })
            .collect())
    }

    async fn get_category(&self, id: CategoryId) -> Result<CategoryWithFlashcards, GatewayError> {
        let mut state = self.lock()?;
        state.begin(Operation::GetCategory)?;
        let category = state.categories[state.category_index(id)?].clone();
        let flashcards = state
            .flashcards
            .iter()
            .filter(|f| f.category_id() == id)
            .cloned();
        CategoryWithFlashcards::new(category, flashcards)
            .map_err(|e| GatewayError::Network(e.to_string()))
    }

    async fn update_category(
        &self,
        id: CategoryId,
        patch: &CategoryPatch,
    ) -> Result<Category, GatewayError> {
        let mut state = self.lock()?;
        state.begin(Operation::UpdateCategory)?;
        let index = state.category_index(id)?;
        if let Some(name) = patch.name() {
            state.ensure_unique_name(name, Some(id))?;
        }
        let category = &mut state.categories[index];
        category.apply(patch);
        Ok(category.clone())
    }

    async fn delete_category(&self, id: CategoryId) -> Result<(), GatewayError> {
        let mut state = self.lock()?;
        state.begin(Operation::DeleteCategory)?;
        let index = state.category_index(id)?;
        state.categories.remove(index);
        state.flashcards.retain(|f| f.category_id() != id);
        Ok(())
    }
}

#[async_trait]
impl FlashcardGateway for InMemoryGateway {
    async fn create_flashcard(
        &self,
        category_id: CategoryId,
        draft: &FlashcardDraft,
    ) -> Result<Flashcard, GatewayError> {
        let mut state = self.lock()?;
        state.begin(Operation::CreateFlashcard)?;
        state
            .category_index(category_id)
            .map_err(|_| GatewayError::Validation(format!("unknown category {category_id}")))?;
        let id = FlashcardId::new(state.next_flashcard_id);
        let flashcard = Flashcard::new(id, category_id, draft.question(), draft.answer(), false, false)
            .map_err(|e| GatewayError::Validation(e.to_string()))?;
        state.next_flashcard_id += 1;
        state.flashcards.push(flashcard.clone());
        Ok(flashcard)
    }

    async fn update_flashcard(
        &self,
        id: FlashcardId,
        patch: &FlashcardPatch,
    ) -> Result<Flashcard, GatewayError> {
        let mut state = self.lock()?;
        state.begin(Operation::UpdateFlashcard)?;
        let index = state.flashcard_index(id)?;
        let flashcard = &mut state.flashcards[index];
        flashcard.apply(patch);
        Ok(flashcard.clone())
    }

    async fn delete_flashcard(&self, id: FlashcardId) -> Result<(), GatewayError> {
        let mut state = self.lock()?;
        state.begin(Operation::DeleteFlashcard)?;
        let index = state.flashcard_index(id)?;
        state.flashcards.remove(index);
        Ok(())
    }
}
