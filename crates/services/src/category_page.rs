use std::sync::{Arc, Mutex};

use rand::rng;
use rand::seq::SliceRandom;

use flashcards_core::model::{
    CategoryId, CategoryWithFlashcards, Flashcard, FlashcardDraft, FlashcardId, FlashcardPatch,
};
use flashcards_core::study::unknown_ids;
use flashcards_core::{
    CategoryDetailState, Dialog, DialogState, DialogTicket, DismissHook, Filters, StoreError,
    StudyMode, TriState, filter_visible,
};
use gateway::{Gateway, GatewayError};

use crate::categories_page::close_if_unchanged;
use crate::error::PageError;
use crate::page::{Outcome, PageFuture, PageHandle, lock, ready};
use crate::report::ErrorReporter;

#[derive(Debug, Default)]
struct DetailPage {
    store: CategoryDetailState,
    dialog: DialogState<FlashcardId>,
    study: StudyMode,
    search: String,
    filters: Filters,
    loading: bool,
}

/// Controller of a single category page: its flashcards, the flashcard
/// dialog, the search and status filters, and study mode.
///
/// Dialogs and study mode exclude each other: opening a dialog leaves study
/// mode, entering study mode closes the dialog.
pub struct CategoryPage {
    category_id: CategoryId,
    gateway: Gateway,
    reporter: Arc<dyn ErrorReporter>,
    shuffle_study: bool,
    state: Arc<Mutex<DetailPage>>,
}

impl CategoryPage {
    #[must_use]
    pub fn new(category_id: CategoryId, gateway: Gateway, reporter: Arc<dyn ErrorReporter>) -> Self {
        Self {
            category_id,
            gateway,
            reporter,
            shuffle_study: false,
            state: Arc::new(Mutex::new(DetailPage::default())),
        }
    }

    /// Dialogs opened by this page arm `hook` until they are closed.
    #[must_use]
    pub fn with_dismiss_hook(self, hook: Arc<dyn DismissHook>) -> Self {
        {
            let mut page = lock(&self.state);
            page.dialog = std::mem::take(&mut page.dialog).with_dismiss_hook(hook);
        }
        self
    }

    /// Study sessions visit the unknown cards in random order.
    #[must_use]
    pub fn with_shuffle_study(mut self, shuffle: bool) -> Self {
        self.shuffle_study = shuffle;
        self
    }

    #[must_use]
    pub fn category_id(&self) -> CategoryId {
        self.category_id
    }

    fn handle(&self) -> PageHandle<DetailPage> {
        PageHandle::new(&self.state)
    }

    /// Fetch the category and its flashcards. A failed fetch leaves the page
    /// without a category.
    pub fn load(&self) -> PageFuture<usize> {
        lock(&self.state).loading = true;
        let categories = Arc::clone(&self.gateway.categories);
        let reporter = Arc::clone(&self.reporter);
        let page = self.handle();
        let id = self.category_id;
        Box::pin(async move {
            let fetched = categories.get_category(id).await.and_then(|category| {
                if category.id() == id {
                    Ok(category)
                } else {
                    Err(GatewayError::Network(format!(
                        "malformed response: requested category {id}, got {}",
                        category.id()
                    )))
                }
            });
            match fetched {
                Ok(category) => page
                    .with(move |s| {
                        let count = category.flashcards().len();
                        s.store.load(category);
                        s.loading = false;
                        count
                    })
                    .map_or(Outcome::Detached, Outcome::Committed),
                Err(err) => {
                    reporter.report(&err);
                    page.with(|s| {
                        s.store.clear();
                        s.loading = false;
                    });
                    Outcome::Failed(err.into())
                }
            }
        })
    }

    // ─── Dialog ──────────────────────────────────────────────────────────

    pub fn open_create_dialog(&self) {
        let mut page = lock(&self.state);
        page.study.exit();
        page.dialog.open_create_dismissible();
    }

    /// Opens the edit dialog for a flashcard on the page. Returns `false` and
    /// changes nothing if the flashcard is not there.
    pub fn open_edit_dialog(&self, id: FlashcardId) -> bool {
        let mut page = lock(&self.state);
        if page.store.flashcard(id).is_none() {
            return false;
        }
        page.study.exit();
        page.dialog.open_edit_dismissible(id);
        true
    }

    pub fn close_dialog(&self) {
        lock(&self.state).dialog.close();
    }

    /// The platform back gesture dismissed the dialog.
    pub fn dismiss_dialog_externally(&self) {
        lock(&self.state).dialog.external_cancel();
    }

    #[must_use]
    pub fn dialog(&self) -> Dialog<FlashcardId> {
        lock(&self.state).dialog.current()
    }

    /// Submits the open dialog. The dialog closes only if the call succeeds.
    pub fn submit_dialog(&self, draft: FlashcardDraft) -> PageFuture<FlashcardId> {
        let (submitted, ticket) = {
            let page = lock(&self.state);
            (page.dialog.current(), page.dialog.ticket())
        };
        match submitted {
            Dialog::Open {
                target: Some(id), ..
            } => {
                let update = self.update(id, FlashcardPatch::from_draft(draft), ticket);
                Box::pin(async move {
                    match update.await {
                        Outcome::Committed(()) => Outcome::Committed(id),
                        Outcome::Failed(err) => Outcome::Failed(err),
                        Outcome::Detached => Outcome::Detached,
                    }
                })
            }
            Dialog::Open { target: None, .. } => self.create(draft, ticket),
            Dialog::Closed => ready(Outcome::Failed(PageError::DialogClosed)),
        }
    }

    // ─── Mutations ───────────────────────────────────────────────────────

    /// Create a flashcard in this category. It is appended once the server
    /// returns it.
    pub fn create_flashcard(&self, draft: FlashcardDraft) -> PageFuture<FlashcardId> {
        self.create(draft, None)
    }

    /// Edit a flashcard optimistically. On failure the local edit stays.
    pub fn update_flashcard(&self, id: FlashcardId, patch: FlashcardPatch) -> PageFuture<()> {
        self.update(id, patch, None)
    }

    pub fn toggle_known(&self, id: FlashcardId) -> PageFuture<()> {
        let current = lock(&self.state).store.flashcard(id).map(Flashcard::is_known);
        match current {
            Some(is_known) => self.update(id, FlashcardPatch::known(!is_known), None),
            None => ready(Outcome::Failed(PageError::UnknownFlashcard(id))),
        }
    }

    pub fn toggle_bookmarked(&self, id: FlashcardId) -> PageFuture<()> {
        let current = lock(&self.state)
            .store
            .flashcard(id)
            .map(Flashcard::is_bookmarked);
        match current {
            Some(is_bookmarked) => self.update(id, FlashcardPatch::bookmarked(!is_bookmarked), None),
            None => ready(Outcome::Failed(PageError::UnknownFlashcard(id))),
        }
    }

    /// Remove a flashcard from the page, then from the server.
    pub fn delete_flashcard(&self, id: FlashcardId) -> PageFuture<()> {
        {
            let mut page = lock(&self.state);
            page.store.remove(id);
            page.study.forget(id);
        }
        let flashcards = Arc::clone(&self.gateway.flashcards);
        let reporter = Arc::clone(&self.reporter);
        let page = self.handle();
        Box::pin(async move {
            match flashcards.delete_flashcard(id).await {
                Ok(()) => page.with(|_| ()).map_or(Outcome::Detached, Outcome::Committed),
                Err(err) => {
                    reporter.report(&err);
                    Outcome::Failed(err.into())
                }
            }
        })
    }

    fn create(
        &self,
        draft: FlashcardDraft,
        submitted: Option<DialogTicket>,
    ) -> PageFuture<FlashcardId> {
        if lock(&self.state).store.current().is_none() {
            return ready(Outcome::Failed(PageError::NotLoaded));
        }
        let flashcards = Arc::clone(&self.gateway.flashcards);
        let reporter = Arc::clone(&self.reporter);
        let page = self.handle();
        let category_id = self.category_id;
        Box::pin(async move {
            match flashcards.create_flashcard(category_id, &draft).await {
                Ok(flashcard) => {
                    let id = flashcard.id();
                    let applied = page.with(move |s| -> Result<FlashcardId, StoreError> {
                        s.store.insert_created(flashcard)?;
                        close_if_unchanged(&mut s.dialog, submitted);
                        Ok(id)
                    });
                    settle(applied)
                }
                Err(err) => {
                    reporter.report(&err);
                    Outcome::Failed(err.into())
                }
            }
        })
    }

    fn update(
        &self,
        id: FlashcardId,
        patch: FlashcardPatch,
        submitted: Option<DialogTicket>,
    ) -> PageFuture<()> {
        lock(&self.state).store.apply_patch(id, &patch);
        let flashcards = Arc::clone(&self.gateway.flashcards);
        let reporter = Arc::clone(&self.reporter);
        let page = self.handle();
        Box::pin(async move {
            match flashcards.update_flashcard(id, &patch).await {
                Ok(flashcard) => {
                    let applied = page.with(move |s| -> Result<(), StoreError> {
                        if !s.store.reconcile(flashcard)? {
                            tracing::debug!(%id, "updated flashcard is no longer on the page");
                        }
                        close_if_unchanged(&mut s.dialog, submitted);
                        Ok(())
                    });
                    settle(applied)
                }
                Err(err) => {
                    reporter.report(&err);
                    Outcome::Failed(err.into())
                }
            }
        })
    }

    // ─── Filters ─────────────────────────────────────────────────────────

    pub fn set_search(&self, text: impl Into<String>) {
        lock(&self.state).search = text.into();
    }

    #[must_use]
    pub fn search(&self) -> String {
        lock(&self.state).search.clone()
    }

    pub fn set_filters(&self, filters: Filters) {
        lock(&self.state).filters = filters;
    }

    pub fn set_known_filter(&self, value: TriState) {
        lock(&self.state).filters.is_known = value;
    }

    pub fn set_bookmarked_filter(&self, value: TriState) {
        lock(&self.state).filters.is_bookmarked = value;
    }

    #[must_use]
    pub fn filters(&self) -> Filters {
        lock(&self.state).filters
    }

    // ─── Queries ─────────────────────────────────────────────────────────

    #[must_use]
    pub fn is_loading(&self) -> bool {
        lock(&self.state).loading
    }

    #[must_use]
    pub fn category(&self) -> Option<CategoryWithFlashcards> {
        lock(&self.state).store.current().cloned()
    }

    #[must_use]
    pub fn flashcard(&self, id: FlashcardId) -> Option<Flashcard> {
        lock(&self.state).store.flashcard(id).cloned()
    }

    /// Every flashcard on the page, in server order.
    #[must_use]
    pub fn flashcards(&self) -> Vec<Flashcard> {
        lock(&self.state)
            .store
            .current()
            .map(|c| c.flashcards().iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Flashcards passing the search text and both status filters.
    #[must_use]
    pub fn visible(&self) -> Vec<Flashcard> {
        let page = lock(&self.state);
        let Some(current) = page.store.current() else {
            return Vec::new();
        };
        filter_visible(current.flashcards().iter(), &page.search, &page.filters)
            .into_iter()
            .cloned()
            .collect()
    }

    // ─── Study mode ──────────────────────────────────────────────────────

    /// Snapshots the unknown cards and starts cycling through them. Returns
    /// the snapshot size, or `None` if no category is loaded.
    pub fn enter_study(&self) -> Option<usize> {
        let mut page = lock(&self.state);
        let mut ids = unknown_ids(page.store.current()?);
        if self.shuffle_study {
            ids.shuffle(&mut rng());
        }
        page.dialog.close();
        page.study.enter_with(ids);
        Some(page.study.len())
    }

    pub fn next_study_card(&self) {
        lock(&self.state).study.next();
    }

    pub fn exit_study(&self) {
        lock(&self.state).study.exit();
    }

    #[must_use]
    pub fn is_studying(&self) -> bool {
        lock(&self.state).study.is_active()
    }

    #[must_use]
    pub fn study(&self) -> StudyMode {
        lock(&self.state).study.clone()
    }

    /// The card under the study cursor, as it currently is on the page.
    /// `None` only when the session is empty.
    #[must_use]
    pub fn study_card(&self) -> Option<Flashcard> {
        let page = lock(&self.state);
        let id = page.study.current()?;
        page.store.flashcard(id).cloned()
    }
}

fn settle<T>(applied: Option<Result<T, StoreError>>) -> Outcome<T> {
    match applied {
        Some(Ok(value)) => Outcome::Committed(value),
        Some(Err(err)) => {
            tracing::warn!(error = %err, "server returned a flashcard for another category");
            Outcome::Failed(err.into())
        }
        None => Outcome::Detached,
    }
}
