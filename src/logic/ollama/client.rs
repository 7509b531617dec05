//! Ollama API Client
//!
//! HTTP client for the local inference service. Reachability and catalog
//! probes use a short timeout; the generation call uses a long one sized
//! for local-model latency. Every failure here is soft: callers receive
//! `false` or an empty outcome and the run continues.

use std::time::Duration;

use crate::logic::classify::CategoryTaxonomy;
use crate::logic::snapshot::types::ProcessRecord;

use super::prompt::build_batch_prompt;
use super::types::{BatchOutcome, GenerateResponse, TagsResponse};
use super::{parse, select_candidates, InferenceProvider};

/// Inference service configuration for one run.
#[derive(Debug, Clone)]
pub struct OllamaConfig {
    pub base_url: String,
    pub model: String,
    pub temperature: f32,
    pub probe_timeout: Duration,
    pub generate_timeout: Duration,
}

pub struct OllamaClient {
    config: OllamaConfig,
    http_client: reqwest::Client,
}

impl OllamaClient {
    pub fn new(config: OllamaConfig) -> Self {
        Self {
            config,
            http_client: reqwest::Client::new(),
        }
    }

    fn tags_url(&self) -> String {
        format!("{}/api/tags", self.config.base_url)
    }

    fn generate_url(&self) -> String {
        format!("{}/api/generate", self.config.base_url)
    }

    pub fn model(&self) -> &str {
        &self.config.model
    }

    /// Fetch the model catalog. Any transport or decode failure is `None`.
    async fn fetch_tags(&self) -> Option<TagsResponse> {
        let response = self
            .http_client
            .get(self.tags_url())
            .timeout(self.config.probe_timeout)
            .send()
            .await
            .ok()?;

        if !response.status().is_success() {
            return None;
        }

        response.json().await.ok()
    }

    /// Issue one generation request and return the raw response text.
    pub async fn generate(&self, prompt: &str) -> Result<String, reqwest::Error> {
        let body = serde_json::json!({
            "model": self.config.model,
            "prompt": prompt,
            "stream": false,
            "options": { "temperature": self.config.temperature },
        });

        let response = self
            .http_client
            .post(self.generate_url())
            .timeout(self.config.generate_timeout)
            .json(&body)
            .send()
            .await?
            .error_for_status()?;

        let generated: GenerateResponse = response.json().await?;
        Ok(generated.response)
    }
}

impl InferenceProvider for OllamaClient {
    /// Lightweight reachability probe.
    async fn is_available(&self) -> bool {
        self.fetch_tags().await.is_some()
    }

    /// Is the configured model present in the catalog? The version suffix
    /// after `:` is ignored, so `gemma2:9b` matches any `gemma2` tag.
    async fn has_model(&self) -> bool {
        let Some(tags) = self.fetch_tags().await else {
            return false;
        };

        let base_name = self
            .config
            .model
            .split(':')
            .next()
            .unwrap_or(self.config.model.as_str());

        tags.models.iter().any(|m| m.name.contains(base_name))
    }

    async fn classify_batch(
        &self,
        candidates: &[&ProcessRecord],
        taxonomy: &CategoryTaxonomy,
    ) -> BatchOutcome {
        if candidates.is_empty() {
            return BatchOutcome::default();
        }

        let selected = select_candidates(candidates);
        let prompt = build_batch_prompt(&selected, taxonomy);

        log::debug!(
            "Sending {} of {} unresolved processes to {} for categorization",
            selected.len(),
            candidates.len(),
            self.config.model
        );

        match self.generate(&prompt).await {
            Ok(raw) => parse::parse_batch(&raw, taxonomy),
            Err(e) => {
                // Timeouts and transport errors degrade to an empty batch;
                // the convergence engine turns that into stall termination.
                log::warn!("Generation call failed: {}", e);
                BatchOutcome::default()
            }
        }
    }
}
