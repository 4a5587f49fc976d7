//! Event system for authentication activity.
//!
//! The engine reports what it does as typed events; handlers decide how to
//! render them. Secrets arrive already redacted unless debug mode is on.

use chrono::{DateTime, Utc};
use http::Method;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// Placeholder written in place of credentials and state tokens.
pub const REDACTED: &str = "***";

/// A validation request is about to be sent.
#[derive(Debug, Clone)]
pub struct RoundSubmittedEvent {
    pub round: usize,
    pub username: String,
    pub url: Url,
    pub method: Method,
    pub fields: Vec<(String, String)>,
    pub timestamp: DateTime<Utc>,
}

/// The validation endpoint answered.
#[derive(Debug, Clone)]
pub struct ResponseReceivedEvent {
    pub round: usize,
    pub body: String,
    pub latency: Duration,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct ChallengeIssuedEvent {
    pub round: usize,
    pub username: String,
    pub state_token: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct OutcomeEvent {
    pub username: String,
    pub outcome: String,
    pub rounds: usize,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct ErrorEvent {
    pub username: String,
    pub round: usize,
    pub error: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub enum AuthEvent {
    RoundSubmitted(RoundSubmittedEvent),
    ResponseReceived(ResponseReceivedEvent),
    ChallengeIssued(ChallengeIssuedEvent),
    Outcome(OutcomeEvent),
    Error(ErrorEvent),
}

/// Trait implemented by event handlers.
pub trait EventHandler: Send + Sync {
    fn handle(&self, event: &AuthEvent);
}

/// Dispatcher that broadcasts events to registered handlers.
#[derive(Default, Clone)]
pub struct EventDispatcher {
    handlers: Vec<Arc<dyn EventHandler>>,
}

impl EventDispatcher {
    pub fn new() -> Self {
        Self {
            handlers: Vec::new(),
        }
    }

    pub fn register_handler(&mut self, handler: Arc<dyn EventHandler>) {
        self.handlers.push(handler);
    }

    pub fn dispatch(&self, event: AuthEvent) {
        for handler in &self.handlers {
            handler.handle(&event);
        }
    }
}

/// Logs events using the `log` crate.
#[derive(Debug)]
pub struct LoggingHandler;

impl EventHandler for LoggingHandler {
    fn handle(&self, event: &AuthEvent) {
        match event {
            AuthEvent::RoundSubmitted(round) => {
                log::debug!(
                    "round {} -> {} {} {:?}",
                    round.round,
                    round.method,
                    round.url,
                    round.fields
                );
            }
            AuthEvent::ResponseReceived(response) => {
                log::debug!(
                    "round {} <- {:?} ({:.2}s)",
                    response.round,
                    response.body,
                    response.latency.as_secs_f64()
                );
            }
            AuthEvent::ChallengeIssued(challenge) => {
                log::info!(
                    "user {} in challenge mode (round {}, state {})",
                    challenge.username,
                    challenge.round,
                    challenge.state_token
                );
            }
            AuthEvent::Outcome(outcome) => {
                log::info!(
                    "user {} {} after {} round(s)",
                    outcome.username,
                    outcome.outcome,
                    outcome.rounds
                );
            }
            AuthEvent::Error(error) => {
                log::warn!(
                    "authentication of {} failed in round {}: {}",
                    error.username,
                    error.round,
                    error.error
                );
            }
        }
    }
}

/// Returns `value` when `reveal` is set, the redaction marker otherwise.
pub fn redact(value: &str, reveal: bool) -> String {
    if reveal {
        value.to_string()
    } else {
        REDACTED.to_string()
    }
}
