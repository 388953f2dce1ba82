#![forbid(unsafe_code)]

pub mod collection;
pub mod dialog;
pub mod error;
pub mod filter;
pub mod model;
pub mod study;

pub use collection::{CategoryDetailState, CategoryListState, Keyed, KeyedCollection};
pub use dialog::{Dialog, DialogMode, DialogState, DialogTicket, DismissHook};
pub use error::{Error, ModelError, StoreError};
pub use filter::{Filters, SearchQuery, Searchable, TriState, filter_visible, matches, normalize};
pub use study::StudyMode;
