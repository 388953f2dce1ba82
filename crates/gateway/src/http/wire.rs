//! JSON bodies exchanged with the REST API.

use flashcards_core::model::{
    Category, CategoryDraft, CategoryId, CategoryPatch, CategoryWithCounts, CategoryWithFlashcards,
    Flashcard, FlashcardDraft, FlashcardId, FlashcardPatch,
};
use serde::{Deserialize, Serialize};

use crate::error::GatewayError;

// ─── REQUESTS ────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub(crate) struct CategoryBody<'a> {
    name: &'a str,
}

impl<'a> CategoryBody<'a> {
    pub(crate) fn from_draft(draft: &'a CategoryDraft) -> Self {
        Self { name: draft.name() }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct CategoryPatchBody<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<&'a str>,
}

impl<'a> CategoryPatchBody<'a> {
    pub(crate) fn from_patch(patch: &'a CategoryPatch) -> Self {
        Self { name: patch.name() }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct NewFlashcardBody<'a> {
    question: &'a str,
    answer: &'a str,
    category_id: CategoryId,
}

impl<'a> NewFlashcardBody<'a> {
    pub(crate) fn new(category_id: CategoryId, draft: &'a FlashcardDraft) -> Self {
        Self {
            question: draft.question(),
            answer: draft.answer(),
            category_id,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct FlashcardPatchBody<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    question: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    answer: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    is_known: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    is_bookmarked: Option<bool>,
}

impl<'a> FlashcardPatchBody<'a> {
    pub(crate) fn from_patch(patch: &'a FlashcardPatch) -> Self {
        Self {
            question: patch.question(),
            answer: patch.answer(),
            is_known: patch.is_known(),
            is_bookmarked: patch.is_bookmarked(),
        }
    }
}

// ─── RESPONSES ───────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub(crate) struct CategoryEnvelope<T> {
    pub(crate) category: T,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CategoriesEnvelope {
    pub(crate) categories: Vec<CategoryWithCountsDto>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct FlashcardEnvelope {
    pub(crate) flashcard: FlashcardDto,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CategoryDto {
    id: CategoryId,
    name: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CategoryWithCountsDto {
    id: CategoryId,
    name: String,
    #[serde(default)]
    flashcards_count: u32,
    #[serde(default)]
    known_flashcards_count: u32,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CategoryWithFlashcardsDto {
    id: CategoryId,
    name: String,
    #[serde(default)]
    flashcards: Vec<FlashcardDto>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct FlashcardDto {
    id: FlashcardId,
    category_id: CategoryId,
    question: String,
    answer: String,
    #[serde(default)]
    is_known: bool,
    #[serde(default)]
    is_bookmarked: bool,
}

/// A body that parsed as JSON but breaks a domain rule is as unusable as one
/// that did not parse.
fn malformed(err: impl std::fmt::Display) -> GatewayError {
    GatewayError::Network(format!("malformed response: {err}"))
}

impl TryFrom<CategoryDto> for Category {
    type Error = GatewayError;

    fn try_from(dto: CategoryDto) -> Result<Self, Self::Error> {
        Category::new(dto.id, dto.name).map_err(malformed)
    }
}

impl TryFrom<CategoryWithCountsDto> for CategoryWithCounts {
    type Error = GatewayError;

    fn try_from(dto: CategoryWithCountsDto) -> Result<Self, Self::Error> {
        let category = Category::new(dto.id, dto.name).map_err(malformed)?;
        Ok(CategoryWithCounts::new(
            category,
            dto.flashcards_count,
            dto.known_flashcards_count,
        ))
    }
}

impl TryFrom<FlashcardDto> for Flashcard {
    type Error = GatewayError;

    fn try_from(dto: FlashcardDto) -> Result<Self, Self::Error> {
        Flashcard::new(
            dto.id,
            dto.category_id,
            dto.question,
            dto.answer,
            dto.is_known,
            dto.is_bookmarked,
        )
        .map_err(malformed)
    }
}

impl TryFrom<CategoryWithFlashcardsDto> for CategoryWithFlashcards {
    type Error = GatewayError;

    fn try_from(dto: CategoryWithFlashcardsDto) -> Result<Self, Self::Error> {
        let category = Category::new(dto.id, dto.name).map_err(malformed)?;
        let flashcards = dto
            .flashcards
            .into_iter()
            .map(Flashcard::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        CategoryWithFlashcards::new(category, flashcards).map_err(malformed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn flashcard_patch_skips_absent_fields() {
        let patch = FlashcardPatch::known(true);
        let body = serde_json::to_value(FlashcardPatchBody::from_patch(&patch)).unwrap();
        assert_eq!(body, json!({ "isKnown": true }));
    }

    #[test]
    fn new_flashcard_body_carries_category() {
        let draft = FlashcardDraft::new("Q", "A").unwrap();
        let body =
            serde_json::to_value(NewFlashcardBody::new(CategoryId::new(7), &draft)).unwrap();
        assert_eq!(
            body,
            json!({ "question": "Q", "answer": "A", "categoryId": 7 })
        );
    }

    #[test]
    fn list_envelope_decodes_counts() {
        let raw = json!({
            "categories": [
                { "id": 1, "name": "Verbs", "flashcardsCount": 4, "knownFlashcardsCount": 1 }
            ]
        });
        let envelope: CategoriesEnvelope = serde_json::from_value(raw).unwrap();
        let entry = CategoryWithCounts::try_from(envelope.categories.into_iter().next().unwrap())
            .unwrap();
        assert_eq!(entry.name(), "Verbs");
        assert_eq!(entry.flashcards_count(), 4);
        assert_eq!(entry.known_flashcards_count(), 1);
    }

    #[test]
    fn detail_with_foreign_flashcard_is_malformed() {
        let raw = json!({
            "category": {
                "id": 7,
                "name": "Geo",
                "flashcards": [
                    { "id": 1, "categoryId": 8, "question": "q", "answer": "a" }
                ]
            }
        });
        let envelope: CategoryEnvelope<CategoryWithFlashcardsDto> =
            serde_json::from_value(raw).unwrap();
        let err = CategoryWithFlashcards::try_from(envelope.category).unwrap_err();
        assert!(matches!(err, GatewayError::Network(_)));
    }

    #[test]
    fn blank_name_from_server_is_malformed() {
        let dto: CategoryDto = serde_json::from_value(json!({ "id": 2, "name": " " })).unwrap();
        assert!(matches!(
            Category::try_from(dto),
            Err(GatewayError::Network(_))
        ));
    }

    #[test]
    fn server_whitespace_survives_decoding() {
        let raw = json!({
            "flashcard": {
                "id": 3,
                "categoryId": 1,
                "question": "  indented",
                "answer": "line one\n  line two ",
                "isKnown": true
            }
        });
        let envelope: FlashcardEnvelope = serde_json::from_value(raw).unwrap();
        let flashcard = Flashcard::try_from(envelope.flashcard).unwrap();
        assert_eq!(flashcard.question(), "  indented");
        assert_eq!(flashcard.answer(), "line one\n  line two ");

        let dto: CategoryDto = serde_json::from_value(json!({ "id": 2, "name": " Verbs " })).unwrap();
        assert_eq!(Category::try_from(dto).unwrap().name(), " Verbs ");
    }
}
