//! In-memory mirror of the remote collection.
//!
//! Entities are held in an id-keyed map with a separately maintained order of
//! keys. `insert` appends, `replace` substitutes in place, `remove` deletes;
//! `replace` and `remove` on an unknown id are no-ops so late responses for
//! entities that are already gone are tolerated.

use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;

use crate::error::StoreError;
use crate::model::{
    Category, CategoryId, CategoryPatch, CategoryWithCounts, CategoryWithFlashcards, Flashcard,
    FlashcardId, FlashcardPatch,
};

/// Entities addressable by a stable, server-assigned key.
pub trait Keyed {
    type Key: Copy + Eq + Hash + Debug;

    fn key(&self) -> Self::Key;
}

impl Keyed for Flashcard {
    type Key = FlashcardId;

    fn key(&self) -> FlashcardId {
        self.id()
    }
}

impl Keyed for CategoryWithCounts {
    type Key = CategoryId;

    fn key(&self) -> CategoryId {
        self.id()
    }
}

//
// ─── KEYED COLLECTION ──────────────────────────────────────────────────────────
//

/// Ordered, id-keyed sequence of entities.
#[derive(Debug, Clone, PartialEq)]
pub struct KeyedCollection<T: Keyed> {
    entries: HashMap<T::Key, T>,
    order: Vec<T::Key>,
}

impl<T: Keyed> Default for KeyedCollection<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Keyed> KeyedCollection<T> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
            order: Vec::new(),
        }
    }

    /// Appends the entity. An entity whose key is already present is
    /// substituted at its current position instead.
    pub fn insert(&mut self, entity: T) {
        let key = entity.key();
        if self.entries.insert(key, entity).is_none() {
            self.order.push(key);
        }
    }

    /// Substitutes the entity with the same key. Returns `false` and leaves
    /// the collection untouched if there is none.
    pub fn replace(&mut self, entity: T) -> bool {
        match self.entries.get_mut(&entity.key()) {
            Some(slot) => {
                *slot = entity;
                true
            }
            None => false,
        }
    }

    /// Mutates the entity in place. Returns `false` if the key is unknown.
    pub fn update(&mut self, key: T::Key, f: impl FnOnce(&mut T)) -> bool {
        match self.entries.get_mut(&key) {
            Some(entity) => {
                f(entity);
                true
            }
            None => false,
        }
    }

    pub fn remove(&mut self, key: T::Key) -> Option<T> {
        let removed = self.entries.remove(&key)?;
        if let Some(pos) = self.order.iter().position(|k| *k == key) {
            self.order.remove(pos);
        }
        Some(removed)
    }

    #[must_use]
    pub fn get(&self, key: T::Key) -> Option<&T> {
        self.entries.get(&key)
    }

    #[must_use]
    pub fn contains(&self, key: T::Key) -> bool {
        self.entries.contains_key(&key)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Keys in display order.
    #[must_use]
    pub fn keys(&self) -> &[T::Key] {
        &self.order
    }

    /// Entities in display order.
    pub fn iter(&self) -> impl Iterator<Item = &T> + '_ {
        self.order.iter().filter_map(|key| self.entries.get(key))
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.order.clear();
    }
}

impl<T: Keyed> FromIterator<T> for KeyedCollection<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut out = Self::new();
        for entity in iter {
            out.insert(entity);
        }
        out
    }
}

//
// ─── LIST VIEW ─────────────────────────────────────────────────────────────────
//

/// Store backing the categories list page.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CategoryListState {
    categories: KeyedCollection<CategoryWithCounts>,
}

impl CategoryListState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the whole list with a fresh gateway listing.
    pub fn load(&mut self, categories: impl IntoIterator<Item = CategoryWithCounts>) {
        self.categories = categories.into_iter().collect();
    }

    #[must_use]
    pub fn categories(&self) -> &KeyedCollection<CategoryWithCounts> {
        &self.categories
    }

    #[must_use]
    pub fn get(&self, id: CategoryId) -> Option<&CategoryWithCounts> {
        self.categories.get(id)
    }

    /// Appends a category returned by a successful create call.
    pub fn insert_created(&mut self, category: Category) {
        self.categories.insert(CategoryWithCounts::fresh(category));
    }

    /// Optimistic step of an update.
    pub fn apply_patch(&mut self, id: CategoryId, patch: &CategoryPatch) -> bool {
        self.categories.update(id, |entry| entry.apply(patch))
    }

    /// Reconciles with the canonical category, keeping the gateway counts.
    pub fn reconcile(&mut self, category: Category) -> bool {
        let id = category.id();
        self.categories.update(id, move |entry| entry.merge(category))
    }

    pub fn remove(&mut self, id: CategoryId) -> Option<CategoryWithCounts> {
        self.categories.remove(id)
    }
}

//
// ─── DETAIL VIEW ───────────────────────────────────────────────────────────────
//

/// Store backing a single category page. Holds nothing until loaded; every
/// mutation against an unloaded page is a no-op.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CategoryDetailState {
    current: Option<CategoryWithFlashcards>,
}

impl CategoryDetailState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load(&mut self, category: CategoryWithFlashcards) {
        self.current = Some(category);
    }

    pub fn clear(&mut self) {
        self.current = None;
    }

    #[must_use]
    pub fn current(&self) -> Option<&CategoryWithFlashcards> {
        self.current.as_ref()
    }

    #[must_use]
    pub fn flashcard(&self, id: FlashcardId) -> Option<&Flashcard> {
        self.current.as_ref()?.flashcard(id)
    }

    /// Appends a flashcard returned by a successful create call. Returns
    /// `Ok(false)` when no category is loaded.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::CategoryMismatch` if the card belongs elsewhere.
    pub fn insert_created(&mut self, flashcard: Flashcard) -> Result<bool, StoreError> {
        match self.current.as_mut() {
            Some(current) => current.insert(flashcard).map(|()| true),
            None => Ok(false),
        }
    }

    /// Optimistic step of an update.
    pub fn apply_patch(&mut self, id: FlashcardId, patch: &FlashcardPatch) -> bool {
        self.current
            .as_mut()
            .is_some_and(|current| current.flashcards_mut().update(id, |f| f.apply(patch)))
    }

    /// Substitutes the canonical flashcard in place.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::CategoryMismatch` if the card belongs elsewhere.
    pub fn reconcile(&mut self, flashcard: Flashcard) -> Result<bool, StoreError> {
        match self.current.as_mut() {
            Some(current) => current.replace(flashcard),
            None => Ok(false),
        }
    }

    pub fn remove(&mut self, id: FlashcardId) -> Option<Flashcard> {
        self.current.as_mut()?.remove(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flashcard(id: u64, question: &str) -> Flashcard {
        Flashcard::new(
            FlashcardId::new(id),
            CategoryId::new(7),
            question,
            "answer",
            false,
            false,
        )
        .unwrap()
    }

    fn ids(collection: &KeyedCollection<Flashcard>) -> Vec<u64> {
        collection.iter().map(|f| f.id().value()).collect()
    }

    #[test]
    fn insert_appends_in_order() {
        let collection: KeyedCollection<Flashcard> =
            vec![flashcard(3, "c"), flashcard(1, "a"), flashcard(2, "b")]
                .into_iter()
                .collect();
        assert_eq!(ids(&collection), vec![3, 1, 2]);
    }

    #[test]
    fn replace_preserves_position() {
        let mut collection: KeyedCollection<Flashcard> =
            vec![flashcard(1, "a"), flashcard(2, "b"), flashcard(3, "c")]
                .into_iter()
                .collect();
        assert!(collection.replace(flashcard(2, "updated")));
        assert_eq!(ids(&collection), vec![1, 2, 3]);
        assert_eq!(collection.get(FlashcardId::new(2)).unwrap().question(), "updated");
    }

    #[test]
    fn replace_unknown_id_is_noop() {
        let mut collection: KeyedCollection<Flashcard> =
            std::iter::once(flashcard(1, "a")).collect();
        let before = collection.clone();
        assert!(!collection.replace(flashcard(9, "ghost")));
        assert_eq!(collection, before);
    }

    #[test]
    fn remove_twice_equals_once() {
        let mut once: KeyedCollection<Flashcard> =
            vec![flashcard(1, "a"), flashcard(2, "b")].into_iter().collect();
        let mut twice = once.clone();
        once.remove(FlashcardId::new(1));
        twice.remove(FlashcardId::new(1));
        assert!(twice.remove(FlashcardId::new(1)).is_none());
        assert_eq!(once, twice);
        assert_eq!(ids(&twice), vec![2]);
    }

    #[test]
    fn insert_existing_id_keeps_single_entry() {
        let mut collection: KeyedCollection<Flashcard> =
            vec![flashcard(1, "a"), flashcard(2, "b")].into_iter().collect();
        collection.insert(flashcard(1, "again"));
        assert_eq!(ids(&collection), vec![1, 2]);
        assert_eq!(collection.len(), 2);
    }

    #[test]
    fn list_reconcile_keeps_counts() {
        let mut state = CategoryListState::new();
        state.load(vec![CategoryWithCounts::new(
            Category::new(CategoryId::new(1), "Verbs").unwrap(),
            3,
            1,
        )]);
        assert!(state.reconcile(Category::new(CategoryId::new(1), "Nouns").unwrap()));
        let entry = state.get(CategoryId::new(1)).unwrap();
        assert_eq!(entry.name(), "Nouns");
        assert_eq!(entry.flashcards_count(), 3);
    }

    #[test]
    fn list_insert_created_starts_at_zero_counts() {
        let mut state = CategoryListState::new();
        state.insert_created(Category::new(CategoryId::new(4), "Kanji").unwrap());
        let entry = state.get(CategoryId::new(4)).unwrap();
        assert_eq!(entry.flashcards_count(), 0);
        assert_eq!(entry.known_flashcards_count(), 0);
    }

    #[test]
    fn detail_mutations_without_category_are_noops() {
        let mut state = CategoryDetailState::new();
        assert_eq!(state.insert_created(flashcard(1, "a")), Ok(false));
        assert!(!state.apply_patch(FlashcardId::new(1), &FlashcardPatch::known(true)));
        assert_eq!(state.reconcile(flashcard(1, "a")), Ok(false));
        assert!(state.remove(FlashcardId::new(1)).is_none());
        assert!(state.current().is_none());
    }

    #[test]
    fn detail_patch_applies_in_place() {
        let mut state = CategoryDetailState::new();
        let category = Category::new(CategoryId::new(7), "Geo").unwrap();
        state.load(CategoryWithFlashcards::new(category, vec![flashcard(5, "q")]).unwrap());
        assert!(state.apply_patch(FlashcardId::new(5), &FlashcardPatch::known(true)));
        assert!(state.flashcard(FlashcardId::new(5)).unwrap().is_known());
    }
}
