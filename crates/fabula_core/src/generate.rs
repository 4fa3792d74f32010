//! Generation collaborator contract.
//!
//! Field values are explicitly tagged as literal text or a generation
//! prompt; nothing in the core sniffs magic string prefixes. The collaborator
//! itself is external: the core only defines the [`Generator`] trait, the
//! timeout around it, and the fallback rule (on failure or timeout the field
//! becomes the literal prompt text).

use std::sync::mpsc;
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use thiserror::Error;
use tracing::warn;

/// Default bound on a single generation call.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Failure reported by a generation backend.
#[derive(Debug, Error)]
#[error("generation failed: {message}")]
pub struct GenerateError {
    /// Backend-specific description.
    pub message: String,
}

impl GenerateError {
    /// Creates a generation error.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// A blocking text-generation backend.
pub trait Generator: Send + Sync {
    /// Produces text for a prompt.
    fn generate(&self, prompt: &str) -> Result<String, GenerateError>;
}

/// Backend that always fails, so every generated field falls back to its
/// literal prompt text. The default for tests and unconfigured CLIs.
#[derive(Debug, Default)]
pub struct NullGenerator;

impl Generator for NullGenerator {
    fn generate(&self, _prompt: &str) -> Result<String, GenerateError> {
        Err(GenerateError::new("no generator configured"))
    }
}

/// A field value handed to a verb: either text to store as-is, or a prompt
/// to run through the generation collaborator first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    /// Store this text verbatim.
    Literal(String),
    /// Generate text from this prompt; fall back to the prompt on failure.
    Generated(String),
}

impl FieldValue {
    /// The underlying text, prompt or literal.
    #[must_use]
    pub fn text(&self) -> &str {
        match self {
            FieldValue::Literal(text) | FieldValue::Generated(text) => text,
        }
    }
}

impl From<&str> for FieldValue {
    fn from(text: &str) -> Self {
        FieldValue::Literal(text.to_string())
    }
}

/// Bounded client over a generation backend.
///
/// The backend call runs on a worker thread; if it does not answer within
/// the timeout it is abandoned and the caller gets the fallback. This is the
/// only place in the core where a failure is deliberately swallowed.
pub struct GenerationClient {
    generator: Arc<dyn Generator>,
    timeout: Duration,
}

impl GenerationClient {
    /// Creates a client with the given backend and timeout.
    #[must_use]
    pub fn new(generator: Arc<dyn Generator>, timeout: Duration) -> Self {
        Self { generator, timeout }
    }

    /// Creates a client whose generated fields always fall back.
    #[must_use]
    pub fn disabled() -> Self {
        Self::new(Arc::new(NullGenerator), DEFAULT_TIMEOUT)
    }

    /// Resolves a field value to the text that will be stored.
    pub fn resolve(&self, value: &FieldValue) -> String {
        let prompt = match value {
            FieldValue::Literal(text) => return text.clone(),
            FieldValue::Generated(prompt) => prompt.clone(),
        };

        let (tx, rx) = mpsc::channel();
        let generator = Arc::clone(&self.generator);
        let worker_prompt = prompt.clone();
        thread::spawn(move || {
            let _ = tx.send(generator.generate(&worker_prompt));
        });

        match rx.recv_timeout(self.timeout) {
            Ok(Ok(text)) => text,
            Ok(Err(err)) => {
                warn!(%err, "generation failed, storing prompt text");
                prompt
            }
            Err(_) => {
                warn!(timeout = ?self.timeout, "generation timed out, storing prompt text");
                prompt
            }
        }
    }
}
