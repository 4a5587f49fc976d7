//! High level authenticator.
//!
//! Wires the validation transport, the challenge engine and the event
//! dispatcher together behind one value that a PAM host (or any other caller)
//! can keep around and share between concurrent authentication attempts.

use std::sync::Arc;

use secrecy::SecretString;
use thiserror::Error;
use url::Url;

use crate::challenges::core::{
    AuthRequest, PromptAdapter, ReqwestValidationClient, ValidationHttpClient, ValidationOutcome,
};
use crate::challenges::engine::{ChallengeEngine, DEFAULT_MAX_CHALLENGE_ROUNDS};
use crate::config::{ConfigError, DEFAULT_PROMPT, ModuleOptions, TransportConfig};
use crate::modules::events::{EventDispatcher, EventHandler, LoggingHandler};

/// Result alias used when building an authenticator.
pub type AuthenticatorResult<T> = Result<T, AuthenticatorError>;

/// Construction-time failures. Authentication itself never errors.
#[derive(Debug, Error)]
pub enum AuthenticatorError {
    #[error("http client initialisation failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
}

/// Authenticator configuration used by the builder.
#[derive(Debug, Clone)]
pub struct LinOtpAuthenticatorConfig {
    pub endpoint: Url,
    pub realm: Option<String>,
    /// Label used when the host has no password yet.
    pub initial_prompt: String,
    pub debug: bool,
    pub transport: TransportConfig,
    pub max_challenge_rounds: usize,
}

impl Default for LinOtpAuthenticatorConfig {
    fn default() -> Self {
        let options = ModuleOptions::default();
        Self {
            endpoint: options.url,
            realm: None,
            initial_prompt: DEFAULT_PROMPT.to_string(),
            debug: false,
            transport: TransportConfig::default(),
            max_challenge_rounds: DEFAULT_MAX_CHALLENGE_ROUNDS,
        }
    }
}

impl From<ModuleOptions> for LinOtpAuthenticatorConfig {
    fn from(options: ModuleOptions) -> Self {
        let transport = options.transport();
        Self {
            endpoint: options.url,
            realm: options.realm,
            initial_prompt: options.prompt,
            debug: options.debug,
            transport,
            max_challenge_rounds: options.max_challenge_rounds,
        }
    }
}

/// Fluent builder for [`LinOtpAuthenticator`].
pub struct LinOtpAuthenticatorBuilder {
    config: LinOtpAuthenticatorConfig,
    handlers: Vec<Arc<dyn EventHandler>>,
    http_client: Option<Arc<dyn ValidationHttpClient>>,
}

impl LinOtpAuthenticatorBuilder {
    pub fn new() -> Self {
        Self {
            config: LinOtpAuthenticatorConfig::default(),
            handlers: Vec::new(),
            http_client: None,
        }
    }

    pub fn with_config(mut self, config: LinOtpAuthenticatorConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_endpoint(mut self, endpoint: &str) -> AuthenticatorResult<Self> {
        self.config.endpoint = Url::parse(endpoint).map_err(ConfigError::from)?;
        Ok(self)
    }

    pub fn with_realm(mut self, realm: impl Into<String>) -> Self {
        self.config.realm = Some(realm.into());
        self
    }

    pub fn with_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.config.initial_prompt = prompt.into();
        self
    }

    /// Log credentials and server responses in clear. Only for troubleshooting.
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.config.debug = debug;
        self
    }

    pub fn with_transport(mut self, transport: TransportConfig) -> Self {
        self.config.transport = transport;
        self
    }

    pub fn with_max_challenge_rounds(mut self, rounds: usize) -> Self {
        self.config.max_challenge_rounds = rounds.max(1);
        self
    }

    /// Register an extra event handler next to the default logging one.
    pub fn with_event_handler(mut self, handler: Arc<dyn EventHandler>) -> Self {
        self.handlers.push(handler);
        self
    }

    /// Replace the reqwest transport, e.g. with a host-specific client.
    pub fn with_http_client(mut self, client: Arc<dyn ValidationHttpClient>) -> Self {
        self.http_client = Some(client);
        self
    }

    pub fn build(self) -> AuthenticatorResult<LinOtpAuthenticator> {
        let client = match self.http_client {
            Some(client) => client,
            None => Arc::new(ReqwestValidationClient::new(&self.config.transport)?),
        };

        let mut events = EventDispatcher::new();
        events.register_handler(Arc::new(LoggingHandler));
        for handler in self.handlers {
            events.register_handler(handler);
        }

        if self.config.debug {
            log::warn!("debug logging enabled: credentials will be written to the log");
        }

        let engine = ChallengeEngine::new(client, self.config.endpoint.clone())
            .with_method(self.config.transport.method.clone())
            .with_max_challenge_rounds(self.config.max_challenge_rounds)
            .with_debug(self.config.debug)
            .with_events(Arc::new(events));

        Ok(LinOtpAuthenticator {
            config: self.config,
            engine,
        })
    }
}

impl Default for LinOtpAuthenticatorBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Remote OTP authenticator.
pub struct LinOtpAuthenticator {
    config: LinOtpAuthenticatorConfig,
    engine: ChallengeEngine,
}

impl LinOtpAuthenticator {
    /// Authenticator against the default endpoint (`https://localhost/validate/simplecheck`).
    pub fn new() -> AuthenticatorResult<Self> {
        LinOtpAuthenticatorBuilder::new().build()
    }

    pub fn builder() -> LinOtpAuthenticatorBuilder {
        LinOtpAuthenticatorBuilder::new()
    }

    /// Build from parsed module arguments.
    pub fn from_options(options: ModuleOptions) -> AuthenticatorResult<Self> {
        LinOtpAuthenticatorBuilder::new()
            .with_config(options.into())
            .build()
    }

    pub fn config(&self) -> &LinOtpAuthenticatorConfig {
        &self.config
    }

    /// Check `credential` for `username`, answering challenges through `prompt`.
    ///
    /// Always yields a terminal outcome; any internal failure is `Denied`.
    ///
    /// `prompt` is called synchronously between rounds and holds the current
    /// task until the user answers. Interactive hosts on a multi-threaded
    /// runtime should use [`authenticate_blocking`](Self::authenticate_blocking)
    /// from a blocking context instead.
    pub async fn authenticate(
        &self,
        username: &str,
        credential: SecretString,
        prompt: &dyn PromptAdapter,
    ) -> ValidationOutcome {
        let request =
            AuthRequest::new(username, credential).with_realm(self.config.realm.clone());
        self.engine.authenticate(request, prompt).await
    }

    /// Blocking variant for synchronous hosts.
    ///
    /// Runs the exchange on a private current-thread runtime. When called from
    /// a thread that already drives a tokio runtime, the exchange moves to a
    /// scoped helper thread and the caller blocks until it finishes.
    pub fn authenticate_blocking(
        &self,
        username: &str,
        credential: SecretString,
        prompt: &dyn PromptAdapter,
    ) -> ValidationOutcome {
        if tokio::runtime::Handle::try_current().is_err() {
            return self.run_to_completion(username, credential, prompt);
        }

        log::debug!("caller is inside a tokio runtime, validating {username} on a helper thread");
        std::thread::scope(|scope| {
            scope
                .spawn(move || self.run_to_completion(username, credential, prompt))
                .join()
                .unwrap_or_else(|_| {
                    log::error!("validation thread for {username} panicked");
                    ValidationOutcome::Denied
                })
        })
    }

    fn run_to_completion(
        &self,
        username: &str,
        credential: SecretString,
        prompt: &dyn PromptAdapter,
    ) -> ValidationOutcome {
        let runtime = match tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
        {
            Ok(runtime) => runtime,
            Err(err) => {
                log::error!("failed to start runtime for {username}: {err}");
                return ValidationOutcome::Denied;
            }
        };

        runtime.block_on(self.authenticate(username, credential, prompt))
    }
}

impl std::fmt::Debug for LinOtpAuthenticator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LinOtpAuthenticator")
            .field("endpoint", &self.config.endpoint.as_str())
            .field("realm", &self.config.realm)
            .finish_non_exhaustive()
    }
}
