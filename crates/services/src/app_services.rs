use std::sync::Arc;

use flashcards_core::model::CategoryId;
use gateway::{Gateway, GatewayConfig};

use crate::categories_page::CategoriesPage;
use crate::category_page::CategoryPage;
use crate::error::ClientServicesError;
use crate::report::{ErrorReporter, TracingReporter};

/// Wires a gateway and an error reporter into page controllers.
#[derive(Clone)]
pub struct ClientServices {
    gateway: Gateway,
    reporter: Arc<dyn ErrorReporter>,
    shuffle_study: bool,
}

impl ClientServices {
    #[must_use]
    pub fn new(gateway: Gateway, reporter: Arc<dyn ErrorReporter>) -> Self {
        Self {
            gateway,
            reporter,
            shuffle_study: false,
        }
    }

    /// Build services talking to the REST API, logging failures.
    ///
    /// # Errors
    ///
    /// Returns `ClientServicesError::Config` if the HTTP client cannot be built.
    pub fn http(config: &GatewayConfig) -> Result<Self, ClientServicesError> {
        let gateway = Gateway::http(config)?;
        tracing::debug!(base_url = config.base_url(), "http gateway ready");
        Ok(Self::new(gateway, Arc::new(TracingReporter)))
    }

    /// Category pages built from here shuffle their study sessions.
    #[must_use]
    pub fn with_shuffle_study(mut self, shuffle: bool) -> Self {
        self.shuffle_study = shuffle;
        self
    }

    #[must_use]
    pub fn gateway(&self) -> &Gateway {
        &self.gateway
    }

    #[must_use]
    pub fn reporter(&self) -> Arc<dyn ErrorReporter> {
        Arc::clone(&self.reporter)
    }

    #[must_use]
    pub fn categories_page(&self) -> CategoriesPage {
        CategoriesPage::new(
            Arc::clone(&self.gateway.categories),
            Arc::clone(&self.reporter),
        )
    }

    #[must_use]
    pub fn category_page(&self, id: CategoryId) -> CategoryPage {
        CategoryPage::new(id, self.gateway.clone(), Arc::clone(&self.reporter))
            .with_shuffle_study(self.shuffle_study)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::CollectingReporter;
    use gateway::InMemoryGateway;

    #[tokio::test]
    async fn pages_share_one_backend() {
        let backend = InMemoryGateway::new();
        backend.seed_category(1, "Verbs").unwrap();
        backend.seed_flashcard(1, 1, "ser", "to be", false).unwrap();
        let services = ClientServices::new(
            Gateway::shared(backend),
            Arc::new(CollectingReporter::new()),
        );

        let list = services.categories_page();
        let detail = services.category_page(CategoryId::new(1));
        assert!(list.load().await.is_committed());
        assert!(detail.load().await.is_committed());

        assert_eq!(list.categories()[0].flashcards_count(), 1);
        assert_eq!(detail.flashcards().len(), 1);
    }

    #[test]
    fn http_services_build_from_default_config() {
        let services = ClientServices::http(&GatewayConfig::default()).unwrap();
        let page = services.category_page(CategoryId::new(3));
        assert_eq!(page.category_id(), CategoryId::new(3));
    }
}
