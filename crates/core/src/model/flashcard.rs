use crate::error::ModelError;
use crate::model::ids::{CategoryId, FlashcardId};

//
// ─── FLASHCARD ─────────────────────────────────────────────────────────────────
//

/// A question/answer pair nested under a category.
///
/// `id` and `category_id` are assigned by the gateway and never change. The
/// review flags are the only state a user toggles outside the edit dialog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Flashcard {
    id: FlashcardId,
    category_id: CategoryId,
    question: String,
    answer: String,
    is_known: bool,
    is_bookmarked: bool,
}

impl Flashcard {
    /// Builds a flashcard from its canonical server representation.
    ///
    /// # Errors
    ///
    /// Returns `ModelError::EmptyQuestion` or `ModelError::EmptyAnswer` when
    /// either text is blank.
    pub fn new(
        id: FlashcardId,
        category_id: CategoryId,
        question: impl Into<String>,
        answer: impl Into<String>,
        is_known: bool,
        is_bookmarked: bool,
    ) -> Result<Self, ModelError> {
        let question = non_blank(question.into(), ModelError::EmptyQuestion)?;
        let answer = non_blank(answer.into(), ModelError::EmptyAnswer)?;
        Ok(Self {
            id,
            category_id,
            question,
            answer,
            is_known,
            is_bookmarked,
        })
    }

    // Accessors
    #[must_use]
    pub fn id(&self) -> FlashcardId {
        self.id
    }

    #[must_use]
    pub fn category_id(&self) -> CategoryId {
        self.category_id
    }

    #[must_use]
    pub fn question(&self) -> &str {
        &self.question
    }

    #[must_use]
    pub fn answer(&self) -> &str {
        &self.answer
    }

    #[must_use]
    pub fn is_known(&self) -> bool {
        self.is_known
    }

    #[must_use]
    pub fn is_bookmarked(&self) -> bool {
        self.is_bookmarked
    }

    /// Applies every field the patch carries, leaving the rest untouched.
    pub fn apply(&mut self, patch: &FlashcardPatch) {
        if let Some(question) = &patch.question {
            self.question.clone_from(question);
        }
        if let Some(answer) = &patch.answer {
            self.answer.clone_from(answer);
        }
        if let Some(is_known) = patch.is_known {
            self.is_known = is_known;
        }
        if let Some(is_bookmarked) = patch.is_bookmarked {
            self.is_bookmarked = is_bookmarked;
        }
    }
}

//
// ─── DRAFTS & PATCHES ──────────────────────────────────────────────────────────
//

/// Input of the create/edit flashcard dialog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlashcardDraft {
    question: String,
    answer: String,
}

impl FlashcardDraft {
    /// # Errors
    ///
    /// Returns `ModelError::EmptyQuestion` or `ModelError::EmptyAnswer` when
    /// either text is blank after trimming.
    pub fn new(question: impl Into<String>, answer: impl Into<String>) -> Result<Self, ModelError> {
        Ok(Self {
            question: trimmed(question.into(), ModelError::EmptyQuestion)?,
            answer: trimmed(answer.into(), ModelError::EmptyAnswer)?,
        })
    }

    #[must_use]
    pub fn question(&self) -> &str {
        &self.question
    }

    #[must_use]
    pub fn answer(&self) -> &str {
        &self.answer
    }
}

/// Partial update of a flashcard. Absent fields are left as they are.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlashcardPatch {
    question: Option<String>,
    answer: Option<String>,
    is_known: Option<bool>,
    is_bookmarked: Option<bool>,
}

impl FlashcardPatch {
    /// Patch produced by submitting the edit dialog.
    #[must_use]
    pub fn from_draft(draft: FlashcardDraft) -> Self {
        Self {
            question: Some(draft.question),
            answer: Some(draft.answer),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn known(is_known: bool) -> Self {
        Self {
            is_known: Some(is_known),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn bookmarked(is_bookmarked: bool) -> Self {
        Self {
            is_bookmarked: Some(is_bookmarked),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn question(&self) -> Option<&str> {
        self.question.as_deref()
    }

    #[must_use]
    pub fn answer(&self) -> Option<&str> {
        self.answer.as_deref()
    }

    #[must_use]
    pub fn is_known(&self) -> Option<bool> {
        self.is_known
    }

    #[must_use]
    pub fn is_bookmarked(&self) -> Option<bool> {
        self.is_bookmarked
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.question.is_none()
            && self.answer.is_none()
            && self.is_known.is_none()
            && self.is_bookmarked.is_none()
    }
}

/// Rejects whitespace-only text and keeps the rest untouched.
pub(crate) fn non_blank(value: String, err: ModelError) -> Result<String, ModelError> {
    if value.trim().is_empty() {
        return Err(err);
    }
    Ok(value)
}

/// Trims user input, rejecting it if nothing is left.
pub(crate) fn trimmed(value: String, err: ModelError) -> Result<String, ModelError> {
    let value = non_blank(value, err)?;
    Ok(value.trim().to_owned())
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
