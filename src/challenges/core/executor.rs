//! Validation request execution.
//!
//! Turns an [`AuthRequest`] or [`ChallengeRound`] into the form fields the
//! validation endpoint expects and hands them to the transport. The raw body
//! is returned untouched; decoding is the codec's job.

use std::collections::HashMap;

use async_trait::async_trait;
use http::Method;
use secrecy::ExposeSecret;
use thiserror::Error;
use url::Url;

use super::types::{AuthRequest, ChallengeRound};

pub const FIELD_USER: &str = "user";
pub const FIELD_PASS: &str = "pass";
pub const FIELD_REALM: &str = "realm";
pub const FIELD_STATE: &str = "state";

/// Contract that abstracts the HTTP transport used to reach the validation endpoint.
#[async_trait]
pub trait ValidationHttpClient: Send + Sync {
    async fn send_form(
        &self,
        method: &Method,
        url: &Url,
        form_fields: &HashMap<String, String>,
    ) -> Result<ValidationHttpResponse, ValidationHttpClientError>;
}

/// Minimal response representation returned by the transport abstraction.
#[derive(Debug, Clone)]
pub struct ValidationHttpResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl ValidationHttpResponse {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ValidationHttpClientError {
    #[error("http transport error: {0}")]
    Transport(String),
    #[error("validation endpoint answered with status {0}")]
    Status(u16),
}

/// Which part of the exchange a submission belongs to.
#[derive(Debug)]
pub enum ValidationSubmission<'a> {
    Initial(&'a AuthRequest),
    Challenge {
        username: &'a str,
        round: &'a ChallengeRound,
    },
}

impl ValidationSubmission<'_> {
    /// Form fields for this submission. The realm is only sent on the initial round.
    pub fn form_fields(&self) -> HashMap<String, String> {
        let mut fields = HashMap::new();
        match self {
            ValidationSubmission::Initial(request) => {
                fields.insert(FIELD_USER.to_string(), request.username.clone());
                fields.insert(
                    FIELD_PASS.to_string(),
                    request.credential.expose_secret().to_string(),
                );
                if let Some(realm) = &request.realm {
                    fields.insert(FIELD_REALM.to_string(), realm.clone());
                }
            }
            ValidationSubmission::Challenge { username, round } => {
                fields.insert(FIELD_USER.to_string(), username.to_string());
                fields.insert(
                    FIELD_PASS.to_string(),
                    round.credential.expose_secret().to_string(),
                );
                fields.insert(FIELD_STATE.to_string(), round.state_token.clone());
            }
        }
        fields
    }
}

/// Submits one validation round and returns the raw response body.
pub async fn submit_validation(
    client: &dyn ValidationHttpClient,
    method: &Method,
    endpoint: &Url,
    form_fields: &HashMap<String, String>,
) -> Result<Vec<u8>, ValidationHttpClientError> {
    let response = client.send_form(method, endpoint, form_fields).await?;

    if !(200..300).contains(&response.status) {
        return Err(ValidationHttpClientError::Status(response.status));
    }

    Ok(response.body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::SecretString;
    use std::sync::Mutex;

    struct StubClient {
        responses: Mutex<Vec<ValidationHttpResponse>>,
    }

    impl StubClient {
        fn new(responses: Vec<ValidationHttpResponse>) -> Self {
            Self {
                responses: Mutex::new(responses.into_iter().rev().collect()),
            }
        }
    }

    #[async_trait]
    impl ValidationHttpClient for StubClient {
        async fn send_form(
            &self,
            _method: &Method,
            _url: &Url,
            _form_fields: &HashMap<String, String>,
        ) -> Result<ValidationHttpResponse, ValidationHttpClientError> {
            Ok(self
                .responses
                .lock()
                .unwrap()
                .pop()
                .expect("no more stub responses"))
        }
    }

    fn endpoint() -> Url {
        Url::parse("https://otp.example.com/validate/simplecheck").unwrap()
    }

    #[test]
    fn initial_submission_carries_realm_when_configured() {
        let request = AuthRequest::new("alice", SecretString::from("123456"))
            .with_realm(Some("staff".into()));
        let fields = ValidationSubmission::Initial(&request).form_fields();

        assert_eq!(fields.get("user").map(String::as_str), Some("alice"));
        assert_eq!(fields.get("pass").map(String::as_str), Some("123456"));
        assert_eq!(fields.get("realm").map(String::as_str), Some("staff"));
        assert!(!fields.contains_key("state"));
    }

    #[test]
    fn initial_submission_omits_missing_realm() {
        let request = AuthRequest::new("alice", SecretString::from("123456"));
        let fields = ValidationSubmission::Initial(&request).form_fields();
        assert!(!fields.contains_key("realm"));
    }

    #[test]
    fn challenge_submission_carries_state_but_never_realm() {
        let round = ChallengeRound::new("S1", SecretString::from("654321"));
        let fields = ValidationSubmission::Challenge {
            username: "alice",
            round: &round,
        }
        .form_fields();

        assert_eq!(fields.len(), 3);
        assert_eq!(fields.get("state").map(String::as_str), Some("S1"));
        assert_eq!(fields.get("pass").map(String::as_str), Some("654321"));
        assert!(!fields.contains_key("realm"));
    }

    #[tokio::test]
    async fn returns_body_on_success() {
        let client = StubClient::new(vec![ValidationHttpResponse::new(200, ":-)")]);
        let body = submit_validation(&client, &Method::POST, &endpoint(), &HashMap::new())
            .await
            .unwrap();
        assert_eq!(body, b":-)");
    }

    #[tokio::test]
    async fn error_status_is_a_transport_failure() {
        let client = StubClient::new(vec![ValidationHttpResponse::new(503, "busy")]);
        let result =
            submit_validation(&client, &Method::POST, &endpoint(), &HashMap::new()).await;
        assert!(matches!(result, Err(ValidationHttpClientError::Status(503))));
    }
}
