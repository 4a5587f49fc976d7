//! Challenge-response engine.
//!
//! Drives one authentication attempt against the validation endpoint:
//!
//! 1. Submit `user`, `pass` and the optional `realm`, then decode the answer.
//! 2. Return any terminal outcome as is.
//! 3. On a challenge, ask the prompt adapter for the next credential, submit
//!    it bound to the server's state token and decode again.
//!
//! The loop is bounded by `max_challenge_rounds`. Every failure (transport,
//! prompt, bound exceeded) ends the attempt as [`ValidationOutcome::Denied`];
//! the cause is only reported through the event dispatcher.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use http::Method;
use thiserror::Error;
use url::Url;

use crate::challenges::core::{
    AuthRequest, ChallengeRound, PromptAdapter, PromptError, ValidationHttpClient,
    ValidationHttpClientError, ValidationOutcome, ValidationSubmission, decode_response,
    executor::{FIELD_PASS, FIELD_STATE},
    submit_validation,
};
use crate::modules::events::{
    AuthEvent, ChallengeIssuedEvent, ErrorEvent, EventDispatcher, OutcomeEvent,
    ResponseReceivedEvent, RoundSubmittedEvent, redact,
};

/// Follow-up rounds allowed after the initial check.
pub const DEFAULT_MAX_CHALLENGE_ROUNDS: usize = 10;

/// Reasons an attempt is cut short. Never surfaced to the caller of
/// [`ChallengeEngine::authenticate`].
#[derive(Debug, Error)]
pub enum AuthenticationError {
    #[error("validation request failed: {0}")]
    Transport(#[from] ValidationHttpClientError),
    #[error("could not obtain challenge response: {0}")]
    Prompt(#[from] PromptError),
    #[error("protocol violation: {0}")]
    Protocol(String),
}

/// Stateless protocol driver; safe to share between concurrent attempts.
#[derive(Clone)]
pub struct ChallengeEngine {
    client: Arc<dyn ValidationHttpClient>,
    endpoint: Url,
    method: Method,
    max_challenge_rounds: usize,
    debug: bool,
    events: Arc<EventDispatcher>,
}

impl ChallengeEngine {
    pub fn new(client: Arc<dyn ValidationHttpClient>, endpoint: Url) -> Self {
        Self {
            client,
            endpoint,
            method: Method::POST,
            max_challenge_rounds: DEFAULT_MAX_CHALLENGE_ROUNDS,
            debug: false,
            events: Arc::new(EventDispatcher::new()),
        }
    }

    pub fn with_method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    pub fn with_max_challenge_rounds(mut self, rounds: usize) -> Self {
        self.max_challenge_rounds = rounds.max(1);
        self
    }

    /// Report credentials, state tokens and raw responses in clear.
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    pub fn with_events(mut self, events: Arc<EventDispatcher>) -> Self {
        self.events = events;
        self
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Run the exchange to a terminal outcome. Never returns
    /// [`ValidationOutcome::ChallengePending`].
    pub async fn authenticate(
        &self,
        request: AuthRequest,
        prompt: &dyn PromptAdapter,
    ) -> ValidationOutcome {
        let username = request.username.clone();
        let mut rounds = 0usize;

        let outcome = match self.try_authenticate(request, prompt, &mut rounds).await {
            Ok(outcome) => outcome,
            Err(error) => {
                self.events.dispatch(AuthEvent::Error(ErrorEvent {
                    username: username.clone(),
                    round: rounds,
                    error: error.to_string(),
                    timestamp: chrono::Utc::now(),
                }));
                ValidationOutcome::Denied
            }
        };

        self.events.dispatch(AuthEvent::Outcome(OutcomeEvent {
            username,
            outcome: outcome.to_string(),
            rounds,
            timestamp: chrono::Utc::now(),
        }));

        outcome
    }

    /// The exchange itself. `rounds` counts requests sent so far, so the
    /// caller can report it even when the attempt fails.
    async fn try_authenticate(
        &self,
        request: AuthRequest,
        prompt: &dyn PromptAdapter,
        rounds: &mut usize,
    ) -> Result<ValidationOutcome, AuthenticationError> {
        let mut outcome = self
            .submit(rounds, &request.username, ValidationSubmission::Initial(&request))
            .await?;
        let mut challenge_rounds = 0usize;

        loop {
            let (state_token, prompt_text) = match outcome {
                ValidationOutcome::ChallengePending {
                    state_token,
                    prompt_text,
                } => (state_token, prompt_text),
                terminal => return Ok(terminal),
            };

            if challenge_rounds >= self.max_challenge_rounds {
                return Err(AuthenticationError::Protocol(format!(
                    "endpoint still challenging after {} follow-up rounds",
                    self.max_challenge_rounds
                )));
            }
            challenge_rounds += 1;

            self.events
                .dispatch(AuthEvent::ChallengeIssued(ChallengeIssuedEvent {
                    round: *rounds,
                    username: request.username.clone(),
                    state_token: redact(&state_token, self.debug),
                    timestamp: chrono::Utc::now(),
                }));

            let credential = prompt.prompt_secret(&prompt_text)?;
            let round = ChallengeRound::new(state_token, credential);

            outcome = self
                .submit(
                    rounds,
                    &request.username,
                    ValidationSubmission::Challenge {
                        username: &request.username,
                        round: &round,
                    },
                )
                .await?;
        }
    }

    async fn submit(
        &self,
        rounds: &mut usize,
        username: &str,
        submission: ValidationSubmission<'_>,
    ) -> Result<ValidationOutcome, AuthenticationError> {
        *rounds += 1;
        let form_fields = submission.form_fields();

        self.events
            .dispatch(AuthEvent::RoundSubmitted(RoundSubmittedEvent {
                round: *rounds,
                username: username.to_string(),
                url: self.endpoint.clone(),
                method: self.method.clone(),
                fields: self.loggable_fields(&form_fields),
                timestamp: chrono::Utc::now(),
            }));

        let started = Instant::now();
        let body =
            submit_validation(self.client.as_ref(), &self.method, &self.endpoint, &form_fields)
                .await?;
        let latency = started.elapsed();

        let outcome = decode_response(&body);

        self.events
            .dispatch(AuthEvent::ResponseReceived(ResponseReceivedEvent {
                round: *rounds,
                body: if self.debug {
                    String::from_utf8_lossy(&body).into_owned()
                } else {
                    outcome.to_string()
                },
                latency,
                timestamp: chrono::Utc::now(),
            }));

        Ok(outcome)
    }

    fn loggable_fields(&self, form_fields: &HashMap<String, String>) -> Vec<(String, String)> {
        let mut fields = form_fields
            .iter()
            .map(|(name, value)| {
                let value = match name.as_str() {
                    FIELD_PASS | FIELD_STATE => redact(value, self.debug),
                    _ => value.clone(),
                };
                (name.clone(), value)
            })
            .collect::<Vec<_>>();
        fields.sort();
        fields
    }
}
