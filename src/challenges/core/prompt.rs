//! Host-provided prompt capability used to collect challenge answers.

use secrecy::SecretString;
use thiserror::Error;

/// Failure while asking the user for a credential.
#[derive(Debug, Error)]
pub enum PromptError {
    #[error("no input available")]
    EndOfInput,
    #[error("conversation failed: {0}")]
    Conversation(String),
}

/// Synchronous, blocking prompt that shows `text` and returns the user's secret.
pub trait PromptAdapter: Send + Sync {
    fn prompt_secret(&self, text: &str) -> Result<SecretString, PromptError>;
}

impl<F> PromptAdapter for F
where
    F: Fn(&str) -> Result<SecretString, PromptError> + Send + Sync,
{
    fn prompt_secret(&self, text: &str) -> Result<SecretString, PromptError> {
        self(text)
    }
}
