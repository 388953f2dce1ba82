//! Behaviour while gateway calls are still outstanding: optimistic values,
//! responses settling out of order, and pages dropped mid-call.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use flashcards_core::model::{
    Category, CategoryDraft, CategoryId, CategoryPatch, CategoryWithCounts, CategoryWithFlashcards,
    Flashcard, FlashcardDraft, FlashcardId, FlashcardPatch,
};
use gateway::{
    CategoryGateway, FlashcardGateway, Gateway, GatewayError, InMemoryGateway, Operation,
};
use services::{CategoryPage, CollectingReporter, Outcome};
use tokio::sync::oneshot;

/// Holds chosen calls until the test opens their gate. Calls are keyed by
/// the flashcard question they carry; deletes by the flashcard id.
#[derive(Clone, Default)]
struct GatedGateway {
    inner: InMemoryGateway,
    gates: Arc<Mutex<HashMap<String, oneshot::Receiver<()>>>>,
}

impl GatedGateway {
    fn gate(&self, key: &str) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        self.gates.lock().unwrap().insert(key.to_string(), rx);
        tx
    }

    async fn wait(&self, key: Option<String>) {
        let rx = key.and_then(|key| self.gates.lock().unwrap().remove(&key));
        if let Some(rx) = rx {
            let _ = rx.await;
        }
    }
}

#[async_trait]
impl CategoryGateway for GatedGateway {
    async fn create_category(&self, draft: &CategoryDraft) -> Result<Category, GatewayError> {
        self.inner.create_category(draft).await
    }

    async fn list_categories(&self) -> Result<Vec<CategoryWithCounts>, GatewayError> {
        self.inner.list_categories().await
    }

    async fn get_category(&self, id: CategoryId) -> Result<CategoryWithFlashcards, GatewayError> {
        self.inner.get_category(id).await
    }

    async fn update_category(
        &self,
        id: CategoryId,
        patch: &CategoryPatch,
    ) -> Result<Category, GatewayError> {
        self.inner.update_category(id, patch).await
    }

    async fn delete_category(&self, id: CategoryId) -> Result<(), GatewayError> {
        self.inner.delete_category(id).await
    }
}

#[async_trait]
impl FlashcardGateway for GatedGateway {
    async fn create_flashcard(
        &self,
        category_id: CategoryId,
        draft: &FlashcardDraft,
    ) -> Result<Flashcard, GatewayError> {
        self.wait(Some(draft.question().to_string())).await;
        self.inner.create_flashcard(category_id, draft).await
    }

    async fn update_flashcard(
        &self,
        id: FlashcardId,
        patch: &FlashcardPatch,
    ) -> Result<Flashcard, GatewayError> {
        self.wait(patch.question().map(str::to_string)).await;
        self.inner.update_flashcard(id, patch).await
    }

    async fn delete_flashcard(&self, id: FlashcardId) -> Result<(), GatewayError> {
        self.wait(Some(format!("delete {id}"))).await;
        self.inner.delete_flashcard(id).await
    }
}

fn setup() -> (GatedGateway, CategoryPage, Arc<CollectingReporter>) {
    let gated = GatedGateway::default();
    gated.inner.seed_category(1, "Deck").unwrap();
    gated.inner.seed_flashcard(5, 1, "original", "answer", false).unwrap();
    gated.inner.seed_flashcard(6, 1, "other", "answer", false).unwrap();
    let reporter = Arc::new(CollectingReporter::new());
    let page = CategoryPage::new(
        CategoryId::new(1),
        Gateway::shared(gated.clone()),
        reporter.clone(),
    );
    (gated, page, reporter)
}

fn edit(question: &str) -> FlashcardPatch {
    FlashcardPatch::from_draft(FlashcardDraft::new(question, "answer").unwrap())
}

fn question(page: &CategoryPage, id: u64) -> String {
    page.flashcard(FlashcardId::new(id))
        .unwrap()
        .question()
        .to_string()
}

#[tokio::test]
async fn optimistic_edit_is_visible_before_the_response() {
    let (gated, page, _) = setup();
    let _ = page.load().await;
    let release = gated.gate("edited");

    let pending = tokio::spawn(page.update_flashcard(FlashcardId::new(5), edit("edited")));
    assert_eq!(question(&page, 5), "edited");

    release.send(()).unwrap();
    assert_eq!(pending.await.unwrap(), Outcome::Committed(()));
    assert_eq!(question(&page, 5), "edited");
}

#[tokio::test]
async fn last_response_to_settle_wins() {
    let (gated, page, reporter) = setup();
    let _ = page.load().await;
    let release_first = gated.gate("first");
    let release_second = gated.gate("second");

    let first = tokio::spawn(page.update_flashcard(FlashcardId::new(5), edit("first")));
    let second = tokio::spawn(page.update_flashcard(FlashcardId::new(5), edit("second")));
    assert_eq!(question(&page, 5), "second");

    release_second.send(()).unwrap();
    assert!(second.await.unwrap().is_committed());
    assert_eq!(question(&page, 5), "second");

    release_first.send(()).unwrap();
    assert!(first.await.unwrap().is_committed());
    assert_eq!(question(&page, 5), "first");
    assert!(reporter.is_empty());
}

#[tokio::test]
async fn delete_removes_before_the_call_settles() {
    let (gated, page, _) = setup();
    let _ = page.load().await;
    let release = gated.gate("delete 5");

    let pending = tokio::spawn(page.delete_flashcard(FlashcardId::new(5)));
    assert!(page.flashcard(FlashcardId::new(5)).is_none());

    release.send(()).unwrap();
    assert_eq!(pending.await.unwrap(), Outcome::Committed(()));
    assert_eq!(gated.inner.calls(Operation::DeleteFlashcard), 1);
}

#[tokio::test]
async fn edit_settling_after_delete_does_not_resurrect() {
    let (gated, page, reporter) = setup();
    let _ = page.load().await;
    let release = gated.gate("late edit");

    let edit = tokio::spawn(page.update_flashcard(FlashcardId::new(6), edit("late edit")));
    assert!(page.delete_flashcard(FlashcardId::new(6)).await.is_committed());

    release.send(()).unwrap();
    let outcome = edit.await.unwrap();
    assert!(matches!(outcome, Outcome::Failed(_)));
    assert!(page.flashcard(FlashcardId::new(6)).is_none());
    assert_eq!(reporter.errors(), vec![GatewayError::NotFound]);
}

#[tokio::test]
async fn create_settling_after_drop_is_detached() {
    let (gated, page, reporter) = setup();
    let _ = page.load().await;
    let release = gated.gate("late card");

    let pending = tokio::spawn(page.create_flashcard(FlashcardDraft::new("late card", "a").unwrap()));
    drop(page);

    release.send(()).unwrap();
    assert_eq!(pending.await.unwrap(), Outcome::Detached);
    assert!(reporter.is_empty());
    let stored = gated.inner.get_category(CategoryId::new(1)).await.unwrap();
    assert_eq!(stored.flashcards().len(), 3);
}

#[tokio::test]
async fn failure_settling_after_drop_is_still_reported() {
    let (gated, page, reporter) = setup();
    let _ = page.load().await;
    let release = gated.gate("doomed");
    gated.inner.fail_next(
        Operation::UpdateFlashcard,
        GatewayError::Network("connection reset".into()),
    );

    let pending = tokio::spawn(page.update_flashcard(FlashcardId::new(5), edit("doomed")));
    drop(page);

    release.send(()).unwrap();
    assert!(matches!(pending.await.unwrap(), Outcome::Failed(_)));
    assert_eq!(
        reporter.errors(),
        vec![GatewayError::Network("connection reset".into())]
    );
}

#[tokio::test]
async fn late_success_leaves_a_reopened_dialog_open() {
    let (gated, page, _) = setup();
    let _ = page.load().await;
    let release = gated.gate("first");

    page.open_create_dialog();
    let pending = tokio::spawn(page.submit_dialog(FlashcardDraft::new("first", "a").unwrap()));
    page.close_dialog();
    page.open_create_dialog();
    let reopened = page.dialog();

    release.send(()).unwrap();
    assert!(pending.await.unwrap().is_committed());
    assert_eq!(page.dialog(), reopened);
    assert_eq!(page.flashcards().len(), 3);
}
