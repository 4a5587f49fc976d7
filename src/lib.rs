//! # linotp-pam-rs
//!
//! Remote one-time-password authentication against a LinOTP style
//! `/validate/simplecheck` endpoint, written for PAM-style hosts.
//!
//! The validation service answers with terse markers (`:-)` accepted,
//! `:-/` failed, `:-(` rejected). A reject marker followed by a state token
//! and optional text is a challenge: the user is prompted for another factor,
//! which is resubmitted bound to that state until a final answer arrives.
//!
//! ## Features
//!
//! - Single-shot and multi-round challenge-response authentication
//! - Fail-closed outcome: transport, prompt and protocol failures all deny
//! - Bounded number of challenge rounds
//! - Per-instance TLS verification and request timeout
//! - PAM-style argument parsing (`url=`, `realm=`, `prompt=`, `debug`, ...)
//! - Credentials kept in `secrecy` wrappers and redacted from logs
//!
//! ## Example
//!
//! ```no_run
//! use linotp_pam_rs::{LinOtpAuthenticator, PromptError, ValidationOutcome};
//! use secrecy::SecretString;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let authenticator = LinOtpAuthenticator::builder()
//!         .with_endpoint("https://otp.example.com/validate/simplecheck")?
//!         .with_realm("staff")
//!         .build()?;
//!
//!     let prompt = |text: &str| -> Result<SecretString, PromptError> {
//!         println!("{text}");
//!         Err(PromptError::EndOfInput)
//!     };
//!
//!     let outcome = authenticator
//!         .authenticate("alice", SecretString::from("123456"), &prompt)
//!         .await;
//!     assert!(matches!(outcome, ValidationOutcome::Accepted | ValidationOutcome::Denied));
//!     Ok(())
//! }
//! ```

mod authenticator;

pub mod challenges;
pub mod config;
pub mod modules;
pub mod pam;

pub use crate::authenticator::{
    AuthenticatorError,
    AuthenticatorResult,
    LinOtpAuthenticator,
    LinOtpAuthenticatorBuilder,
    LinOtpAuthenticatorConfig,
};

pub use crate::challenges::core::{
    AuthRequest,
    ChallengeRound,
    PromptAdapter,
    PromptError,
    ReqwestValidationClient,
    ValidationHttpClient,
    ValidationHttpClientError,
    ValidationHttpResponse,
    ValidationOutcome,
    decode_response,
};

pub use crate::challenges::engine::{
    AuthenticationError,
    ChallengeEngine,
    DEFAULT_MAX_CHALLENGE_ROUNDS,
};

pub use crate::config::{ConfigError, ModuleOptions, TransportConfig};

pub use crate::modules::{
    AuthEvent,
    EventDispatcher,
    EventHandler,
    LoggingHandler,
};

pub use crate::pam::{PamRequest, PamReturnCode};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
