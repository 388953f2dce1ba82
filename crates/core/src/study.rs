use crate::model::{CategoryWithFlashcards, FlashcardId};

/// Ids of the category's unknown flashcards, in their current order.
#[must_use]
pub fn unknown_ids(category: &CategoryWithFlashcards) -> Vec<FlashcardId> {
    category
        .flashcards()
        .iter()
        .filter(|flashcard| !flashcard.is_known())
        .map(|flashcard| flashcard.id())
        .collect()
}

/// Study-mode overlay cycling through unknown flashcards.
///
/// The session list is a snapshot taken on `enter`: marking a card as known
/// while studying does not drop it from the current pass. Re-entering takes
/// a fresh snapshot. Deleted cards are dropped with [`StudyMode::forget`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StudyMode {
    active: bool,
    ordered_unknown_ids: Vec<FlashcardId>,
    cursor: usize,
}

impl StudyMode {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshots the unknown cards of `category` and starts at the first one.
    pub fn enter(&mut self, category: &CategoryWithFlashcards) {
        self.enter_with(unknown_ids(category));
    }

    /// Starts a session over an explicit card order.
    pub fn enter_with(&mut self, ids: Vec<FlashcardId>) {
        self.ordered_unknown_ids = ids;
        self.cursor = 0;
        self.active = true;
    }

    /// Advances the cursor, wrapping to the start. No-op on an empty session.
    pub fn next(&mut self) {
        let len = self.ordered_unknown_ids.len();
        if len == 0 {
            return;
        }
        self.cursor = (self.cursor + 1) % len;
    }

    /// Drops a deleted card from the session. The cursor stays on the same
    /// card, or moves to the one that followed the deleted card.
    pub fn forget(&mut self, id: FlashcardId) {
        let Some(index) = self.ordered_unknown_ids.iter().position(|&held| held == id) else {
            return;
        };
        self.ordered_unknown_ids.remove(index);
        if index < self.cursor {
            self.cursor -= 1;
        }
        if self.cursor >= self.ordered_unknown_ids.len() {
            self.cursor = 0;
        }
    }

    pub fn exit(&mut self) {
        self.active = false;
        self.ordered_unknown_ids.clear();
        self.cursor = 0;
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Card under the cursor. `None` when inactive or nothing is cyclable.
    #[must_use]
    pub fn current(&self) -> Option<FlashcardId> {
        if !self.active {
            return None;
        }
        self.ordered_unknown_ids.get(self.cursor).copied()
    }

    #[must_use]
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    #[must_use]
    pub fn snapshot(&self) -> &[FlashcardId] {
        &self.ordered_unknown_ids
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.ordered_unknown_ids.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ordered_unknown_ids.is_empty()
    }

    /// `(cursor, len)` for a progress indicator, `None` if nothing to show.
    #[must_use]
    pub fn position(&self) -> Option<(usize, usize)> {
        self.current().map(|_| (self.cursor, self.len()))
    }
}
