//! Core data structures shared by the codec, the transport and the engine.

use std::fmt;

use secrecy::SecretString;

/// Credential check sent on the first round of an authentication attempt.
#[derive(Debug, Clone)]
pub struct AuthRequest {
    pub username: String,
    pub credential: SecretString,
    pub realm: Option<String>,
}

impl AuthRequest {
    pub fn new(username: impl Into<String>, credential: SecretString) -> Self {
        Self {
            username: username.into(),
            credential,
            realm: None,
        }
    }

    pub fn with_realm(mut self, realm: Option<String>) -> Self {
        self.realm = realm;
        self
    }
}

/// Follow-up submission answering a server challenge.
///
/// Built fresh from each prompt result; only the state token is taken from
/// the previous response.
#[derive(Debug)]
pub struct ChallengeRound {
    pub state_token: String,
    pub credential: SecretString,
}

impl ChallengeRound {
    pub fn new(state_token: impl Into<String>, credential: SecretString) -> Self {
        Self {
            state_token: state_token.into(),
            credential,
        }
    }
}

/// Semantic meaning of a validation service response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationOutcome {
    /// Credential valid.
    Accepted,
    /// Credential invalid.
    Denied,
    /// Explicit hard rejection.
    Rejected,
    /// The service wants another factor bound to `state_token`.
    ChallengePending {
        state_token: String,
        prompt_text: String,
    },
    /// The response matched no known shape.
    Malformed,
}

impl ValidationOutcome {
    /// Whether the exchange ends with this outcome.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, ValidationOutcome::ChallengePending { .. })
    }

    pub fn is_accepted(&self) -> bool {
        matches!(self, ValidationOutcome::Accepted)
    }
}

impl fmt::Display for ValidationOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationOutcome::Accepted => write!(f, "accepted"),
            ValidationOutcome::Denied => write!(f, "denied"),
            ValidationOutcome::Rejected => write!(f, "rejected"),
            ValidationOutcome::ChallengePending { .. } => write!(f, "challenge pending"),
            ValidationOutcome::Malformed => write!(f, "malformed response"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_pending_challenges_are_non_terminal() {
        assert!(ValidationOutcome::Accepted.is_terminal());
        assert!(ValidationOutcome::Denied.is_terminal());
        assert!(ValidationOutcome::Rejected.is_terminal());
        assert!(ValidationOutcome::Malformed.is_terminal());
        assert!(
            !ValidationOutcome::ChallengePending {
                state_token: "1".into(),
                prompt_text: "OTP:".into(),
            }
            .is_terminal()
        );
    }

    #[test]
    fn debug_output_does_not_leak_credentials() {
        let request = AuthRequest::new("alice", SecretString::from("hunter2"));
        assert!(!format!("{request:?}").contains("hunter2"));
    }
}
