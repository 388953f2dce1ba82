mod category;
mod flashcard;
mod ids;

pub use ids::{CategoryId, FlashcardId, ParseIdError};

pub use category::{Category, CategoryDraft, CategoryPatch, CategoryWithCounts, CategoryWithFlashcards};
pub use flashcard::{Flashcard, FlashcardDraft, FlashcardPatch};
