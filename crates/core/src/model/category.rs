use crate::collection::KeyedCollection;
use crate::error::{ModelError, StoreError};
use crate::model::flashcard::{Flashcard, non_blank, trimmed};
use crate::model::ids::{CategoryId, FlashcardId};

//
// ─── CATEGORY ──────────────────────────────────────────────────────────────────
//

/// A named group of flashcards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Category {
    id: CategoryId,
    name: String,
}

impl Category {
    /// # Errors
    ///
    /// Returns `ModelError::EmptyName` if name is empty or whitespace-only.
    pub fn new(id: CategoryId, name: impl Into<String>) -> Result<Self, ModelError> {
        let name = non_blank(name.into(), ModelError::EmptyName)?;
        Ok(Self { id, name })
    }

    #[must_use]
    pub fn id(&self) -> CategoryId {
        self.id
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn apply(&mut self, patch: &CategoryPatch) {
        if let Some(name) = &patch.name {
            self.name.clone_from(name);
        }
    }
}

/// Input of the create/edit category dialog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryDraft {
    name: String,
}

impl CategoryDraft {
    /// # Errors
    ///
    /// Returns `ModelError::EmptyName` if name is empty after trimming.
    pub fn new(name: impl Into<String>) -> Result<Self, ModelError> {
        Ok(Self {
            name: trimmed(name.into(), ModelError::EmptyName)?,
        })
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Partial update of a category.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryPatch {
    name: Option<String>,
}

impl CategoryPatch {
    #[must_use]
    pub fn from_draft(draft: CategoryDraft) -> Self {
        Self {
            name: Some(draft.name),
        }
    }

    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }
}

//
// ─── LIST CONTEXT ──────────────────────────────────────────────────────────────
//

/// A category as shown in the categories list, with counts the gateway
/// computed. Counts are never derived locally.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryWithCounts {
    category: Category,
    flashcards_count: u32,
    known_flashcards_count: u32,
}

impl CategoryWithCounts {
    #[must_use]
    pub fn new(category: Category, flashcards_count: u32, known_flashcards_count: u32) -> Self {
        Self {
            category,
            flashcards_count,
            known_flashcards_count,
        }
    }

    /// Entry for a category that was just created and therefore has no cards.
    #[must_use]
    pub fn fresh(category: Category) -> Self {
        Self::new(category, 0, 0)
    }

    #[must_use]
    pub fn category(&self) -> &Category {
        &self.category
    }

    #[must_use]
    pub fn id(&self) -> CategoryId {
        self.category.id()
    }

    #[must_use]
    pub fn name(&self) -> &str {
        self.category.name()
    }

    #[must_use]
    pub fn flashcards_count(&self) -> u32 {
        self.flashcards_count
    }

    #[must_use]
    pub fn known_flashcards_count(&self) -> u32 {
        self.known_flashcards_count
    }

    /// Takes the canonical category fields and keeps the counts.
    pub fn merge(&mut self, category: Category) {
        self.category = category;
    }

    pub fn apply(&mut self, patch: &CategoryPatch) {
        self.category.apply(patch);
    }
}

//
// ─── DETAIL CONTEXT ────────────────────────────────────────────────────────────
//

/// A category together with its flashcards in server order.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryWithFlashcards {
    category: Category,
    flashcards: KeyedCollection<Flashcard>,
}

impl CategoryWithFlashcards {
    /// # Errors
    ///
    /// Returns `StoreError::CategoryMismatch` if any flashcard points at a
    /// different category.
    pub fn new(
        category: Category,
        flashcards: impl IntoIterator<Item = Flashcard>,
    ) -> Result<Self, StoreError> {
        let mut out = Self {
            category,
            flashcards: KeyedCollection::new(),
        };
        for flashcard in flashcards {
            out.check_owner(&flashcard)?;
            out.flashcards.insert(flashcard);
        }
        Ok(out)
    }

    #[must_use]
    pub fn category(&self) -> &Category {
        &self.category
    }

    #[must_use]
    pub fn id(&self) -> CategoryId {
        self.category.id()
    }

    #[must_use]
    pub fn name(&self) -> &str {
        self.category.name()
    }

    #[must_use]
    pub fn flashcards(&self) -> &KeyedCollection<Flashcard> {
        &self.flashcards
    }

    #[must_use]
    pub fn flashcard(&self, id: FlashcardId) -> Option<&Flashcard> {
        self.flashcards.get(id)
    }

    /// Appends a created flashcard.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::CategoryMismatch` if the card is not ours.
    pub fn insert(&mut self, flashcard: Flashcard) -> Result<(), StoreError> {
        self.check_owner(&flashcard)?;
        self.flashcards.insert(flashcard);
        Ok(())
    }

    /// Substitutes a flashcard in place. Returns `false` when it is gone.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::CategoryMismatch` if the card is not ours.
    pub fn replace(&mut self, flashcard: Flashcard) -> Result<bool, StoreError> {
        self.check_owner(&flashcard)?;
        Ok(self.flashcards.replace(flashcard))
    }

    pub fn remove(&mut self, id: FlashcardId) -> Option<Flashcard> {
        self.flashcards.remove(id)
    }

    pub(crate) fn flashcards_mut(&mut self) -> &mut KeyedCollection<Flashcard> {
        &mut self.flashcards
    }

    fn check_owner(&self, flashcard: &Flashcard) -> Result<(), StoreError> {
        if flashcard.category_id() != self.category.id() {
            return Err(StoreError::CategoryMismatch {
                expected: self.category.id(),
                found: flashcard.category_id(),
            });
        }
        Ok(())
    }
}
