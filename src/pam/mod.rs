//! Host boundary for PAM-style callers.
//!
//! A PAM service module receives the user, an optional password already
//! collected by an earlier module, and its argument list. [`authenticate`]
//! turns those into a return code the host understands; every failure,
//! whatever its cause, comes back as [`PamReturnCode::AuthErr`].

use secrecy::SecretString;

use crate::authenticator::LinOtpAuthenticator;
use crate::challenges::core::{PromptAdapter, ValidationOutcome};
use crate::config::ModuleOptions;

/// Linux-PAM return codes produced by this module.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum PamReturnCode {
    Success = 0,
    AuthErr = 7,
}

impl PamReturnCode {
    pub fn as_raw(self) -> i32 {
        self as i32
    }
}

impl From<&ValidationOutcome> for PamReturnCode {
    fn from(outcome: &ValidationOutcome) -> Self {
        match outcome {
            ValidationOutcome::Accepted => PamReturnCode::Success,
            _ => PamReturnCode::AuthErr,
        }
    }
}

/// What the host knows about the attempt when the module is invoked.
#[derive(Debug)]
pub struct PamRequest {
    pub user: String,
    /// Password collected by a previous module in the stack, if any.
    pub authtok: Option<SecretString>,
}

impl PamRequest {
    pub fn new(user: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            authtok: None,
        }
    }

    pub fn with_authtok(mut self, authtok: SecretString) -> Self {
        self.authtok = Some(authtok);
        self
    }
}

/// Authenticate `request` using the module arguments `args`.
///
/// When no password was handed over, it is collected through `prompt` with
/// the configured initial prompt. Blocks until the exchange finishes.
pub fn authenticate<I, S>(request: PamRequest, args: I, prompt: &dyn PromptAdapter) -> PamReturnCode
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let options = match ModuleOptions::from_args(args) {
        Ok(options) => options,
        Err(err) => {
            log::error!("rejecting {}: {err}", request.user);
            return PamReturnCode::AuthErr;
        }
    };

    if options.debug {
        log::debug!(
            "start authentication of {} against {}",
            request.user,
            options.url
        );
    }

    if request.user.is_empty() {
        log::warn!("no user name supplied");
        return PamReturnCode::AuthErr;
    }

    let authenticator = match LinOtpAuthenticator::from_options(options) {
        Ok(authenticator) => authenticator,
        Err(err) => {
            log::error!("rejecting {}: {err}", request.user);
            return PamReturnCode::AuthErr;
        }
    };

    let credential = match request.authtok {
        Some(authtok) => authtok,
        None => {
            log::debug!("no password handed over, asking {}", request.user);
            match prompt.prompt_secret(&authenticator.config().initial_prompt) {
                Ok(secret) => secret,
                Err(err) => {
                    log::warn!("could not read password for {}: {err}", request.user);
                    return PamReturnCode::AuthErr;
                }
            }
        }
    };

    let outcome = authenticator.authenticate_blocking(&request.user, credential, prompt);
    PamReturnCode::from(&outcome)
}
