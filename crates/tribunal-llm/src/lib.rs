//! Tribunal Responder Layer
//!
//! Responder implementations plus the Model Assurance Layer (MAL).
//!
//! # Architecture
//!
//! This crate provides implementations of the `Responder` trait from
//! `tribunal-domain`. The pipeline only sees trait objects, so every
//! responder here is interchangeable.
//!
//! # Responders
//!
//! - `MockResponder`: Scripted responses for testing
//! - `SimulatedResponder`: Deterministic responses derived from the MAL
//! - `OllamaResponder`: Local Ollama API integration
//!
//! # Examples
//!
//! ```
//! use tribunal_llm::MockResponder;
//! use tribunal_domain::Responder;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let responder = MockResponder::new("alpha", "Hello from the ensemble!");
//! let response = responder.generate("test prompt").await.unwrap();
//! assert_eq!(response.content(), "Hello from the ensemble!");
//! # }
//! ```

#![warn(missing_docs)]

pub mod assurance;
mod error;
pub mod ollama;
pub mod simulated;

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tribunal_domain::{ProviderResponse, Responder, ResponderError};

pub use assurance::{sha256_hex, AssuranceConfig, ModelAssurance, RetryOutcome, RetryStatus};
pub use error::AssuranceError;
pub use ollama::OllamaResponder;
pub use simulated::SimulatedResponder;

#[derive(Debug, Clone)]
enum Scripted {
    Answer(String),
    Error,
}

/// Mock responder for deterministic testing
///
/// Returns pre-configured responses without making any network calls.
///
/// # Examples
///
/// ```
/// use tribunal_llm::MockResponder;
/// use tribunal_domain::Responder;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let mut responder = MockResponder::new("alpha", "default");
/// responder.add_response("prompt1", "response1");
/// responder.add_error("bad prompt");
///
/// assert_eq!(responder.generate("prompt1").await.unwrap().content(), "response1");
/// assert!(responder.generate("bad prompt").await.is_err());
/// assert_eq!(responder.call_count(), 2);
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct MockResponder {
    model_id: String,
    default_response: String,
    confidence: f64,
    reliability: f64,
    delay: Option<Duration>,
    fail_all: bool,
    responses: Arc<Mutex<HashMap<String, Scripted>>>,
    call_count: Arc<AtomicUsize>,
    healthy: Arc<AtomicBool>,
}

impl MockResponder {
    /// Create a new MockResponder with a fixed response for all prompts
    pub fn new(model_id: impl Into<String>, response: impl Into<String>) -> Self {
        Self {
            model_id: model_id.into(),
            default_response: response.into(),
            confidence: 0.9,
            reliability: 1.0,
            delay: None,
            fail_all: false,
            responses: Arc::new(Mutex::new(HashMap::new())),
            call_count: Arc::new(AtomicUsize::new(0)),
            healthy: Arc::new(AtomicBool::new(true)),
        }
    }

    /// Create a responder that fails every call
    pub fn failing(model_id: impl Into<String>) -> Self {
        Self {
            fail_all: true,
            ..Self::new(model_id, "")
        }
    }

    /// Set the confidence reported with every response
    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = confidence;
        self
    }

    /// Set the reliability used for witness ranking
    pub fn with_reliability(mut self, reliability: f64) -> Self {
        self.reliability = reliability;
        self
    }

    /// Delay every call (useful for completion-order tests)
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Add a specific response for a given prompt
    pub fn add_response(&mut self, prompt: impl Into<String>, response: impl Into<String>) {
        self.responses
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(prompt.into(), Scripted::Answer(response.into()));
    }

    /// Configure to return an error for a specific prompt
    pub fn add_error(&mut self, prompt: impl Into<String>) {
        self.responses
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(prompt.into(), Scripted::Error);
    }

    /// Mark the responder healthy or unhealthy
    pub fn set_healthy(&self, healthy: bool) {
        self.healthy.store(healthy, Ordering::SeqCst);
    }

    /// Get the number of times generate was called
    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }

    /// Reset the call count
    pub fn reset_call_count(&self) {
        self.call_count.store(0, Ordering::SeqCst);
    }
}

#[async_trait]
impl Responder for MockResponder {
    fn model_id(&self) -> &str {
        &self.model_id
    }

    fn reliability(&self) -> f64 {
        self.reliability
    }

    async fn generate(&self, prompt: &str) -> Result<ProviderResponse, ResponderError> {
        self.call_count.fetch_add(1, Ordering::SeqCst);

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        if self.fail_all {
            return Err(ResponderError::Other("Mock error".to_string()));
        }

        let scripted = self
            .responses
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(prompt)
            .cloned();

        let content = match scripted {
            Some(Scripted::Error) => return Err(ResponderError::Other("Mock error".to_string())),
            Some(Scripted::Answer(answer)) => answer,
            None => self.default_response.clone(),
        };

        let tokens = ModelAssurance::estimate_tokens(&content);
        let response = ProviderResponse::new(
            self.model_id.clone(),
            content.clone(),
            self.confidence,
            0.0,
            tokens,
        )?
        .with_fingerprint(sha256_hex(content.as_bytes()));
        Ok(response)
    }

    async fn health_check(&self) -> bool {
        self.healthy.load(Ordering::SeqCst)
    }
}
