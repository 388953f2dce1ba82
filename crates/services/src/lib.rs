#![forbid(unsafe_code)]

pub mod app_services;
pub mod categories_page;
pub mod category_page;
pub mod error;
pub mod page;
pub mod report;

pub use app_services::ClientServices;
pub use categories_page::CategoriesPage;
pub use category_page::CategoryPage;
pub use error::{ClientServicesError, PageError};
pub use page::{Outcome, PageFuture};
pub use report::{CollectingReporter, ErrorReporter, TracingReporter};
