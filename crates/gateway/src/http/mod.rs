//! REST adapter for the remote collection.

mod wire;

use std::env;
use std::time::Duration;

use async_trait::async_trait;
use flashcards_core::model::{
    Category, CategoryDraft, CategoryId, CategoryPatch, CategoryWithCounts, CategoryWithFlashcards,
    Flashcard, FlashcardDraft, FlashcardId, FlashcardPatch,
};
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;

use crate::error::{ConfigError, GatewayError};
use crate::gateway::{CategoryGateway, FlashcardGateway};
use wire::{
    CategoriesEnvelope, CategoryBody, CategoryDto, CategoryEnvelope, CategoryPatchBody,
    CategoryWithFlashcardsDto, FlashcardEnvelope, FlashcardPatchBody, NewFlashcardBody,
};

pub const DEFAULT_BASE_URL: &str = "http://localhost:3333";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

const BASE_URL_VAR: &str = "FLASHCARDS_API_URL";
const TIMEOUT_VAR: &str = "FLASHCARDS_API_TIMEOUT_SECS";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GatewayConfig {
    base_url: String,
    timeout: Duration,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl GatewayConfig {
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidBaseUrl` unless the URL is http(s).
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ConfigError> {
        Ok(Self {
            base_url: parse_base_url(base_url)?,
            timeout,
        })
    }

    /// Reads `FLASHCARDS_API_URL` and `FLASHCARDS_API_TIMEOUT_SECS`, falling
    /// back to the defaults for unset variables.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set to an invalid value.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as [`GatewayConfig::from_env`] over an arbitrary variable source.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set to an invalid value.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        if let Some(raw) = lookup(BASE_URL_VAR).filter(|v| !v.trim().is_empty()) {
            config.base_url = parse_base_url(&raw)?;
        }
        if let Some(raw) = lookup(TIMEOUT_VAR).filter(|v| !v.trim().is_empty()) {
            config.timeout = parse_timeout_secs(&raw)?;
        }
        Ok(config)
    }

    /// # Errors
    ///
    /// Returns `ConfigError::InvalidBaseUrl` unless the URL is http(s).
    pub fn with_base_url(mut self, raw: &str) -> Result<Self, ConfigError> {
        self.base_url = parse_base_url(raw)?;
        Ok(self)
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

fn parse_base_url(raw: &str) -> Result<String, ConfigError> {
    let trimmed = raw.trim().trim_end_matches('/');
    let host = trimmed
        .strip_prefix("http://")
        .or_else(|| trimmed.strip_prefix("https://"));
    match host {
        Some(host) if !host.is_empty() => Ok(trimmed.to_string()),
        _ => Err(ConfigError::InvalidBaseUrl {
            raw: raw.to_string(),
        }),
    }
}

/// Parses a whole, positive number of seconds.
///
/// # Errors
///
/// Returns `ConfigError::InvalidTimeout` otherwise.
pub fn parse_timeout_secs(raw: &str) -> Result<Duration, ConfigError> {
    match raw.trim().parse::<u64>() {
        Ok(secs) if secs > 0 => Ok(Duration::from_secs(secs)),
        _ => Err(ConfigError::InvalidTimeout {
            raw: raw.to_string(),
        }),
    }
}

// ─── CLIENT ──────────────────────────────────────────────────────────────────

/// Gateway over the JSON REST API.
#[derive(Clone, Debug)]
pub struct HttpGateway {
    client: Client,
    base_url: String,
}

impl HttpGateway {
    /// # Errors
    ///
    /// Returns `ConfigError::Client` if the HTTP client cannot be built.
    pub fn new(config: &GatewayConfig) -> Result<Self, ConfigError> {
        let client = Client::builder().timeout(config.timeout()).build()?;
        Ok(Self {
            client,
            base_url: config.base_url().to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, GatewayError> {
        let response = self.execute(request).await?;
        response
            .json::<T>()
            .await
            .map_err(|err| GatewayError::Network(format!("malformed response: {err}")))
    }

    async fn execute(&self, request: RequestBuilder) -> Result<reqwest::Response, GatewayError> {
        let response = request.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        let err = status_error(status, &body);
        tracing::debug!(%status, error = %err, "request rejected");
        Err(err)
    }
}

/// Maps a non-success status to the gateway taxonomy.
///
/// Validation messages come from a JSON `message`/`error` field when the body
/// has one, else from the raw body text.
pub(crate) fn status_error(status: StatusCode, body: &str) -> GatewayError {
    match status {
        StatusCode::NOT_FOUND => GatewayError::NotFound,
        StatusCode::BAD_REQUEST | StatusCode::CONFLICT | StatusCode::UNPROCESSABLE_ENTITY => {
            GatewayError::Validation(error_message(body).unwrap_or_else(|| status.to_string()))
        }
        _ => GatewayError::Network(format!("unexpected status {status}")),
    }
}

fn error_message(body: &str) -> Option<String> {
    let body = body.trim();
    if body.is_empty() {
        return None;
    }
    let from_json = serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|value| {
            ["message", "error"]
                .iter()
                .find_map(|key| value.get(key)?.as_str().map(str::to_string))
        });
    Some(from_json.unwrap_or_else(|| body.to_string()))
}

#[async_trait]
impl CategoryGateway for HttpGateway {
    async fn create_category(&self, draft: &CategoryDraft) -> Result<Category, GatewayError> {
        tracing::debug!(name = draft.name(), "create category");
        let request = self
            .client
            .post(self.url("categories"))
            .json(&CategoryBody::from_draft(draft));
        let envelope: CategoryEnvelope<CategoryDto> = self.send(request).await?;
        Category::try_from(envelope.category)
    }

    async fn list_categories(&self) -> Result<Vec<CategoryWithCounts>, GatewayError> {
        tracing::debug!("list categories");
        let envelope: CategoriesEnvelope = self.send(self.client.get(self.url("categories"))).await?;
        envelope
            .categories
            .into_iter()
            .map(CategoryWithCounts::try_from)
            .collect()
    }

    async fn get_category(&self, id: CategoryId) -> Result<CategoryWithFlashcards, GatewayError> {
        tracing::debug!(%id, "get category");
        let request = self.client.get(self.url(&format!("categories/{id}")));
        let envelope: CategoryEnvelope<CategoryWithFlashcardsDto> = self.send(request).await?;
        CategoryWithFlashcards::try_from(envelope.category)
    }

    async fn update_category(
        &self,
        id: CategoryId,
        patch: &CategoryPatch,
    ) -> Result<Category, GatewayError> {
        tracing::debug!(%id, "update category");
        let request = self
            .client
            .put(self.url(&format!("categories/{id}")))
            .json(&CategoryPatchBody::from_patch(patch));
        let envelope: CategoryEnvelope<CategoryDto> = self.send(request).await?;
        Category::try_from(envelope.category)
    }

    async fn delete_category(&self, id: CategoryId) -> Result<(), GatewayError> {
        tracing::debug!(%id, "delete category");
        let request = self.client.delete(self.url(&format!("categories/{id}")));
        self.execute(request).await.map(|_| ())
    }
}

#[async_trait]
impl FlashcardGateway for HttpGateway {
    async fn create_flashcard(
        &self,
        category_id: CategoryId,
        draft: &FlashcardDraft,
    ) -> Result<Flashcard, GatewayError> {
        tracing::debug!(%category_id, "create flashcard");
        let request = self
            .client
            .post(self.url("flashcards"))
            .json(&NewFlashcardBody::new(category_id, draft));
        let envelope: FlashcardEnvelope = self.send(request).await?;
        Flashcard::try_from(envelope.flashcard)
    }

    async fn update_flashcard(
        &self,
        id: FlashcardId,
        patch: &FlashcardPatch,
    ) -> Result<Flashcard, GatewayError> {
        tracing::debug!(%id, "update flashcard");
        let request = self
            .client
            .put(self.url(&format!("flashcards/{id}")))
            .json(&FlashcardPatchBody::from_patch(patch));
        let envelope: FlashcardEnvelope = self.send(request).await?;
        Flashcard::try_from(envelope.flashcard)
    }

    async fn delete_flashcard(&self, id: FlashcardId) -> Result<(), GatewayError> {
        tracing::debug!(%id, "delete flashcard");
        let request = self.client.delete(self.url(&format!("flashcards/{id}")));
        self.execute(request).await.map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn config_defaults_when_unset() {
        let config = GatewayConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, GatewayConfig::default());
        assert_eq!(config.base_url(), "http://localhost:3333");
        assert_eq!(config.timeout(), Duration::from_secs(10));
    }

    #[test]
    fn config_reads_variables() {
        let config = GatewayConfig::from_lookup(lookup(&[
            ("FLASHCARDS_API_URL", "https://cards.example.com/api/"),
            ("FLASHCARDS_API_TIMEOUT_SECS", "3"),
        ]))
        .unwrap();
        assert_eq!(config.base_url(), "https://cards.example.com/api");
        assert_eq!(config.timeout(), Duration::from_secs(3));
    }

    #[test]
    fn config_rejects_bad_values() {
        assert!(matches!(
            GatewayConfig::from_lookup(lookup(&[("FLASHCARDS_API_URL", "localhost:3333")])),
            Err(ConfigError::InvalidBaseUrl { .. })
        ));
        assert!(matches!(
            GatewayConfig::from_lookup(lookup(&[("FLASHCARDS_API_TIMEOUT_SECS", "0")])),
            Err(ConfigError::InvalidTimeout { .. })
        ));
        assert!(matches!(
            parse_timeout_secs("ten"),
            Err(ConfigError::InvalidTimeout { .. })
        ));
    }

    #[test]
    fn url_joins_without_double_slash() {
        let config = GatewayConfig::new("http://api.test/v1/", DEFAULT_TIMEOUT).unwrap();
        let gateway = HttpGateway::new(&config).unwrap();
        assert_eq!(gateway.url("categories"), "http://api.test/v1/categories");
        assert_eq!(gateway.url("/flashcards/5"), "http://api.test/v1/flashcards/5");
    }

    #[test]
    fn status_mapping() {
        assert_eq!(status_error(StatusCode::NOT_FOUND, ""), GatewayError::NotFound);
        assert_eq!(
            status_error(StatusCode::CONFLICT, r#"{"message":"name taken"}"#),
            GatewayError::Validation("name taken".into())
        );
        assert_eq!(
            status_error(StatusCode::UNPROCESSABLE_ENTITY, "question required"),
            GatewayError::Validation("question required".into())
        );
        assert!(matches!(
            status_error(StatusCode::BAD_REQUEST, ""),
            GatewayError::Validation(_)
        ));
        assert!(matches!(
            status_error(StatusCode::INTERNAL_SERVER_ERROR, "boom"),
            GatewayError::Network(_)
        ));
        assert!(matches!(
            status_error(StatusCode::UNAUTHORIZED, ""),
            GatewayError::Network(_)
        ));
    }
}
