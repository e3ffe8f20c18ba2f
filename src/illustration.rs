//! Species illustrations from an image-generation provider
//!
//! The fetcher never fails: provider errors are logged and replaced by the
//! configured fallback image, so one bad call cannot break a recomputation.

use crate::config::ImageSettings;
use moka::future::Cache;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum IllustrationError {
    /// No API key configured
    #[error("image provider credential is not configured")]
    MissingCredential,

    /// Network or transport failure
    #[error("image request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Provider answered with a non-success status (auth, rate limit, content policy)
    #[error("image provider returned {status}: {body}")]
    Status { status: u16, body: String },

    /// Provider did not answer in time
    #[error("image provider did not answer within {0:?}")]
    Timeout(Duration),

    /// Provider answered without an image URL
    #[error("image provider response contained no image URL")]
    EmptyResponse,
}

pub type ProviderFuture<'a> = Pin<Box<dyn Future<Output = Result<String, IllustrationError>> + Send + 'a>>;

/// Something that turns a prompt into an image URL
pub trait ImageProvider: Send + Sync {
    fn generate<'a>(&'a self, prompt: &'a str) -> ProviderFuture<'a>;
}

#[derive(Debug, Serialize)]
struct GenerationRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    size: &'a str,
    quality: &'a str,
    n: u8,
}

#[derive(Debug, Deserialize)]
struct GenerationResponse {
    #[serde(default)]
    data: Vec<GeneratedImage>,
}

#[derive(Debug, Deserialize)]
struct GeneratedImage {
    url: Option<String>,
}

/// OpenAI-compatible `images/generations` client
pub struct OpenAiImageClient {
    client: reqwest::Client,
    settings: ImageSettings,
}

impl OpenAiImageClient {
    pub fn new(settings: ImageSettings) -> Result<Self, IllustrationError> {
        let client = reqwest::Client::builder().timeout(settings.timeout).build()?;
        Ok(Self { client, settings })
    }

    async fn request(&self, prompt: &str) -> Result<String, IllustrationError> {
        let api_key = self
            .settings
            .api_key
            .as_deref()
            .ok_or(IllustrationError::MissingCredential)?;

        let body = GenerationRequest {
            model: &self.settings.model,
            prompt,
            size: &self.settings.size,
            quality: &self.settings.quality,
            n: 1,
        };

        let response = self
            .client
            .post(&self.settings.endpoint)
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(IllustrationError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: GenerationResponse = response.json().await?;
        parsed
            .data
            .into_iter()
            .find_map(|image| image.url)
            .ok_or(IllustrationError::EmptyResponse)
    }
}

impl ImageProvider for OpenAiImageClient {
    fn generate<'a>(&'a self, prompt: &'a str) -> ProviderFuture<'a> {
        Box::pin(self.request(prompt))
    }
}

pub fn species_prompt(species: &str) -> String {
    format!("a realistic photo of {} with no text", species.trim())
}

/// Image reference for a species, cached and with a fallback on failure
#[derive(Clone)]
pub struct IllustrationFetcher {
    provider: Arc<dyn ImageProvider>,
    cache: Cache<String, String>,
    fallback_url: String,
    timeout: Duration,
}

impl IllustrationFetcher {
    pub fn new(provider: Arc<dyn ImageProvider>, settings: &ImageSettings) -> Self {
        let cache = Cache::builder()
            .max_capacity(1_000)
            .time_to_live(settings.cache_ttl)
            .build();

        Self {
            provider,
            cache,
            fallback_url: settings.fallback_url.clone(),
            timeout: settings.timeout,
        }
    }

    pub fn fallback_url(&self) -> &str {
        &self.fallback_url
    }

    /// URL of a generated image for the species, or the fallback URL
    pub async fn fetch(&self, species: &str) -> String {
        let species = species.trim();
        if species.is_empty() {
            return self.fallback_url.clone();
        }

        if let Some(cached) = self.cache.get(species).await {
            tracing::debug!("Cache hit for illustration of '{}'", species);
            return cached;
        }

        let prompt = species_prompt(species);
        let start = std::time::Instant::now();
        let outcome = tokio::time::timeout(self.timeout, self.provider.generate(&prompt))
            .await
            .unwrap_or_else(|_| Err(IllustrationError::Timeout(self.timeout)));
        match outcome {
            Ok(url) => {
                tracing::info!("Generated illustration for '{}' in {:?}", species, start.elapsed());
                self.cache.insert(species.to_string(), url.clone()).await;
                url
            }
            Err(e) => {
                tracing::warn!("Illustration for '{}' unavailable: {}", species, e);
                self.fallback_url.clone()
            }
        }
    }
}
