//! Reqwest-based implementation of the `ValidationHttpClient` trait.
//!
//! Provides a thin adapter around `reqwest::Client` configured from a
//! [`TransportConfig`]. Certificate verification is a property of the client
//! instance, so disabling it never leaks into other authenticators.

use std::collections::HashMap;

use async_trait::async_trait;
use http::Method as HttpMethod;
use reqwest::{Client, Method};
use url::Url;

use super::{ValidationHttpClient, ValidationHttpClientError, ValidationHttpResponse};
use crate::config::TransportConfig;

/// Reqwest-backed HTTP client used to reach the validation endpoint.
pub struct ReqwestValidationClient {
    client: Client,
}

impl ReqwestValidationClient {
    /// Creates a client honouring the timeout and certificate policy of `config`.
    pub fn new(config: &TransportConfig) -> Result<Self, reqwest::Error> {
        if !config.verify_tls {
            log::warn!(
                "TLS certificate verification is disabled; the validation channel can be intercepted"
            );
        }

        // No idle pool: blocking callers drive each attempt on a fresh runtime,
        // and pooled connections die with the runtime that opened them.
        let client = Client::builder()
            .pool_max_idle_per_host(0)
            .timeout(config.timeout)
            .danger_accept_invalid_certs(!config.verify_tls)
            .build()?;

        Ok(Self { client })
    }

    /// Wrap an existing reqwest client.
    pub fn from_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ValidationHttpClient for ReqwestValidationClient {
    async fn send_form(
        &self,
        method: &HttpMethod,
        url: &Url,
        form_fields: &HashMap<String, String>,
    ) -> Result<ValidationHttpResponse, ValidationHttpClientError> {
        let req_method = map_method(method)?;

        let builder = self.client.request(req_method.clone(), url.as_str());
        let builder = if req_method == Method::GET {
            builder.query(form_fields)
        } else {
            builder.form(form_fields)
        };

        let response = builder.send().await.map_err(transport_error)?;

        let status = response.status().as_u16();
        let body = response.bytes().await.map_err(transport_error)?.to_vec();

        Ok(ValidationHttpResponse { status, body })
    }
}

fn map_method(method: &HttpMethod) -> Result<Method, ValidationHttpClientError> {
    Method::from_bytes(method.as_str().as_bytes())
        .map_err(|err| ValidationHttpClientError::Transport(err.to_string()))
}

/// GET requests carry the credentials in the query string, so the URL is
/// stripped before the error text reaches the event log.
fn transport_error(err: reqwest::Error) -> ValidationHttpClientError {
    ValidationHttpClientError::Transport(err.without_url().to_string())
}
