//! Core building blocks shared by the challenge engine and its transports.

pub mod codec;
pub mod executor;
pub mod prompt;
pub mod reqwest_client;
pub mod types;

pub use codec::{
    ACCEPTED_MARKER, DEFAULT_CHALLENGE_PROMPT, FAILURE_MARKER, REJECT_MARKER, decode_response,
};
pub use executor::{
    ValidationHttpClient, ValidationHttpClientError, ValidationHttpResponse,
    ValidationSubmission, submit_validation,
};
pub use prompt::{PromptAdapter, PromptError};
pub use reqwest_client::ReqwestValidationClient;
pub use types::{AuthRequest, ChallengeRound, ValidationOutcome};
