use std::sync::{Arc, Mutex};

use flashcards_core::model::{CategoryDraft, CategoryId, CategoryPatch, CategoryWithCounts};
use flashcards_core::{
    CategoryListState, Dialog, DialogState, DialogTicket, DismissHook, Filters, filter_visible,
};
use gateway::CategoryGateway;

use crate::error::PageError;
use crate::page::{Outcome, PageFuture, PageHandle, lock, ready};
use crate::report::ErrorReporter;

#[derive(Debug, Default)]
struct ListPage {
    store: CategoryListState,
    dialog: DialogState<CategoryId>,
    search: String,
    loading: bool,
}

/// Controller of the categories list page.
///
/// Creates insert only after the server answers; renames patch the entry at
/// once and reconcile on success; deletes remove the entry before the call
/// settles and never restore it.
pub struct CategoriesPage {
    categories: Arc<dyn CategoryGateway>,
    reporter: Arc<dyn ErrorReporter>,
    state: Arc<Mutex<ListPage>>,
}

impl CategoriesPage {
    #[must_use]
    pub fn new(categories: Arc<dyn CategoryGateway>, reporter: Arc<dyn ErrorReporter>) -> Self {
        Self {
            categories,
            reporter,
            state: Arc::new(Mutex::new(ListPage::default())),
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

    fn handle(&self) -> PageHandle<ListPage> {
        PageHandle::new(&self.state)
    }

    /// Fetch the list. A failed fetch leaves the page empty.
    pub fn load(&self) -> PageFuture<usize> {
        lock(&self.state).loading = true;
        let categories = Arc::clone(&self.categories);
        let reporter = Arc::clone(&self.reporter);
        let page = self.handle();
        Box::pin(async move {
            match categories.list_categories().await {
                Ok(listed) => page
                    .with(move |s| {
                        s.store.load(listed);
                        s.loading = false;
                        s.store.categories().len()
                    })
                    .map_or(Outcome::Detached, Outcome::Committed),
                Err(err) => {
                    reporter.report(&err);
                    page.with(|s| {
                        s.store.load(Vec::new());
                        s.loading = false;
                    });
                    Outcome::Failed(err.into())
                }
            }
        })
    }

    // ─── Dialog ──────────────────────────────────────────────────────────

    pub fn open_create_dialog(&self) {
        lock(&self.state).dialog.open_create_dismissible();
    }

    /// Opens the edit dialog for a listed category. Returns `false` and
    /// leaves the dialog alone if the category is not on the page.
    pub fn open_edit_dialog(&self, id: CategoryId) -> bool {
        let mut page = lock(&self.state);
        if page.store.get(id).is_none() {
            return false;
        }
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
    pub fn dialog(&self) -> Dialog<CategoryId> {
        lock(&self.state).dialog.current()
    }

    /// Submits the open dialog: creates in create mode, renames the target
    /// in edit mode. The dialog closes only if the call succeeds.
    pub fn submit_dialog(&self, draft: CategoryDraft) -> PageFuture<CategoryId> {
        let (submitted, ticket) = {
            let page = lock(&self.state);
            (page.dialog.current(), page.dialog.ticket())
        };
        match submitted {
            Dialog::Open {
                target: Some(id), ..
            } => {
                let update = self.update(id, CategoryPatch::from_draft(draft), ticket);
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

    /// Create a category; it is appended with zero counts once the server
    /// assigns its id.
    pub fn create_category(&self, draft: CategoryDraft) -> PageFuture<CategoryId> {
        self.create(draft, None)
    }

    /// Rename a category optimistically. On failure the local rename stays.
    pub fn update_category(&self, id: CategoryId, patch: CategoryPatch) -> PageFuture<()> {
        self.update(id, patch, None)
    }

    /// Remove a category from the page, then from the server.
    pub fn delete_category(&self, id: CategoryId) -> PageFuture<()> {
        lock(&self.state).store.remove(id);
        let categories = Arc::clone(&self.categories);
        let reporter = Arc::clone(&self.reporter);
        let page = self.handle();
        Box::pin(async move {
            match categories.delete_category(id).await {
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
        draft: CategoryDraft,
        submitted: Option<DialogTicket>,
    ) -> PageFuture<CategoryId> {
        let categories = Arc::clone(&self.categories);
        let reporter = Arc::clone(&self.reporter);
        let page = self.handle();
        Box::pin(async move {
            match categories.create_category(&draft).await {
                Ok(category) => {
                    let id = category.id();
                    page.with(move |s| {
                        tracing::debug!(%id, "category created");
                        s.store.insert_created(category);
                        close_if_unchanged(&mut s.dialog, submitted);
                    })
                    .map_or(Outcome::Detached, |()| Outcome::Committed(id))
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
        id: CategoryId,
        patch: CategoryPatch,
        submitted: Option<DialogTicket>,
    ) -> PageFuture<()> {
        lock(&self.state).store.apply_patch(id, &patch);
        let categories = Arc::clone(&self.categories);
        let reporter = Arc::clone(&self.reporter);
        let page = self.handle();
        Box::pin(async move {
            match categories.update_category(id, &patch).await {
                Ok(category) => page
                    .with(move |s| {
                        if !s.store.reconcile(category) {
                            tracing::debug!(%id, "updated category is no longer listed");
                        }
                        close_if_unchanged(&mut s.dialog, submitted);
                    })
                    .map_or(Outcome::Detached, Outcome::Committed),
                Err(err) => {
                    reporter.report(&err);
                    Outcome::Failed(err.into())
                }
            }
        })
    }

    // ─── Queries ─────────────────────────────────────────────────────────

    pub fn set_search(&self, text: impl Into<String>) {
        lock(&self.state).search = text.into();
    }

    #[must_use]
    pub fn search(&self) -> String {
        lock(&self.state).search.clone()
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        lock(&self.state).loading
    }

    /// Every category on the page, in list order.
    #[must_use]
    pub fn categories(&self) -> Vec<CategoryWithCounts> {
        lock(&self.state).store.categories().iter().cloned().collect()
    }

    #[must_use]
    pub fn category(&self, id: CategoryId) -> Option<CategoryWithCounts> {
        lock(&self.state).store.get(id).cloned()
    }

    /// Categories matching the search text, in list order.
    #[must_use]
    pub fn visible(&self) -> Vec<CategoryWithCounts> {
        let page = lock(&self.state);
        filter_visible(page.store.categories().iter(), &page.search, &Filters::default())
            .into_iter()
            .cloned()
            .collect()
    }
}

/// Closes the dialog a successful submit came from, unless the user has
/// since closed it or opened another one.
pub(crate) fn close_if_unchanged<Id: Copy>(
    dialog: &mut DialogState<Id>,
    submitted: Option<DialogTicket>,
) {
    if let Some(ticket) = submitted {
        dialog.close_if_current(ticket);
    }
}
