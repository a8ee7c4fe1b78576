//! Ollama Responder Implementation
//!
//! Provides integration with Ollama's local LLM API, used when the pipeline
//! runs with simulation switched off.
//!
//! # Features
//!
//! - Async HTTP communication with Ollama API
//! - Configurable endpoint, model and reported confidence
//! - Transient failures retried with capped exponential backoff
//! - Timeout handling
//!
//! # Examples
//!
//! ```no_run
//! use tribunal_llm::OllamaResponder;
//!
//! let responder = OllamaResponder::new("http://localhost:11434", "llama3");
//! ```

use crate::{sha256_hex, ModelAssurance};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tribunal_domain::{ProviderResponse, Responder, ResponderError};

/// Default Ollama API endpoint
pub const DEFAULT_ENDPOINT: &str = "http://localhost:11434";

/// Default timeout for requests (30 seconds)
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Default number of retry attempts
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Confidence reported when the model gives no signal of its own
pub const DEFAULT_CONFIDENCE: f64 = 0.5;

/// Ollama API responder for local LLM inference
pub struct OllamaResponder {
    endpoint: String,
    model: String,
    client: reqwest::Client,
    max_retries: u32,
    confidence: f64,
    reliability: f64,
}

/// Request body for Ollama generate API
#[derive(Serialize)]
struct OllamaGenerateRequest {
    model: String,
    prompt: String,
    stream: bool,
}

/// Response from Ollama generate API
#[derive(Deserialize)]
struct OllamaGenerateResponse {
    response: String,
    #[serde(default)]
    eval_count: Option<u32>,
}

impl OllamaResponder {
    /// Create a new Ollama responder
    ///
    /// # Parameters
    ///
    /// - `endpoint`: Ollama API endpoint (e.g., "http://localhost:11434")
    /// - `model`: Model to use (e.g., "llama3", "mistral")
    pub fn new(endpoint: impl Into<String>, model: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            endpoint: endpoint.into(),
            model: model.into(),
            client,
            max_retries: DEFAULT_MAX_RETRIES,
            confidence: DEFAULT_CONFIDENCE,
            reliability: 1.0,
        }
    }

    /// Create a new Ollama responder on the default endpoint
    pub fn default_endpoint(model: impl Into<String>) -> Self {
        Self::new(DEFAULT_ENDPOINT, model)
    }

    /// Set the maximum number of retry attempts
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Set the confidence reported with each answer
    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = confidence;
        self
    }

    /// Set the reliability used for witness ranking
    pub fn with_reliability(mut self, reliability: f64) -> Self {
        self.reliability = reliability.clamp(0.0, 1.0);
        self
    }

    /// Post the prompt, retrying transient failures
    ///
    /// Unknown models and unparseable bodies fail at once. Communication
    /// failures are retried with [`backoff`] until `max_retries` attempts are
    /// spent, which surfaces as [`ResponderError::BudgetExhausted`] the same
    /// way a simulated responder reports it.
    async fn post_generate(&self, prompt: &str) -> Result<OllamaGenerateResponse, ResponderError> {
        let url = format!("{}/api/generate", self.endpoint);
        let body = OllamaGenerateRequest {
            model: self.model.clone(),
            prompt: prompt.to_string(),
            stream: false,
        };
        let attempts = self.max_retries.max(1);

        for attempt in 1..=attempts {
            let error = match self.attempt(&url, &body).await {
                Ok(parsed) => return Ok(parsed),
                Err(e) if !is_transient(&e) => return Err(e),
                Err(e) => e,
            };

            tracing::warn!(model = %self.model, attempt, error = %error, "ollama attempt failed");
            if attempt < attempts {
                tokio::time::sleep(backoff(attempt)).await;
            }
        }

        Err(ResponderError::BudgetExhausted { attempts })
    }

    /// One request and its classification
    async fn attempt(
        &self,
        url: &str,
        body: &OllamaGenerateRequest,
    ) -> Result<OllamaGenerateResponse, ResponderError> {
        let response = self
            .client
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(|e| ResponderError::Communication(format!("Request failed: {}", e)))?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(ResponderError::ModelNotAvailable(self.model.clone()));
        }
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(ResponderError::Communication(format!("HTTP {}: {}", status, detail)));
        }

        response
            .json::<OllamaGenerateResponse>()
            .await
            .map_err(|e| ResponderError::InvalidResponse(format!("Failed to parse response: {}", e)))
    }
}

/// Whether another attempt could succeed
fn is_transient(error: &ResponderError) -> bool {
    matches!(error, ResponderError::Communication(_))
}

/// Delay before the attempt after `attempt` (1-based): 250ms doubling, capped at 4s
fn backoff(attempt: u32) -> Duration {
    let factor = 1u64 << attempt.saturating_sub(1).min(4);
    Duration::from_millis(250 * factor)
}

#[async_trait]
impl Responder for OllamaResponder {
    fn model_id(&self) -> &str {
        &self.model
    }

    fn reliability(&self) -> f64 {
        self.reliability
    }

    async fn generate(&self, prompt: &str) -> Result<ProviderResponse, ResponderError> {
        let started = Instant::now();
        let body = self.post_generate(prompt).await?;
        let latency_ms = started.elapsed().as_secs_f64() * 1000.0;

        let tokens = body
            .eval_count
            .unwrap_or_else(|| ModelAssurance::estimate_tokens(&body.response));
        let fingerprint = sha256_hex(body.response.as_bytes());

        Ok(ProviderResponse::new(
            self.model.clone(),
            body.response,
            self.confidence,
            latency_ms,
            tokens,
        )?
        .with_fingerprint(fingerprint)
        .with_metadata("endpoint", self.endpoint.clone()))
    }

    async fn health_check(&self) -> bool {
        let url = format!("{}/api/tags", self.endpoint);
        match self.client.get(&url).send().await {
            Ok(response) => response.status().is_success(),
            Err(e) => {
                tracing::warn!(model = %self.model, error = %e, "health check failed");
                false
            }
        }
    }
}
