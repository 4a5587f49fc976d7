//! HTTP transport settings.

use std::time::Duration;

use http::Method;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Transport options owned by one authenticator instance.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    /// Verify the endpoint's TLS certificate. Turning this off lets anyone on
    /// the path answer `:-)` for every user.
    pub verify_tls: bool,
    /// Upper bound for one request/response round trip.
    pub timeout: Duration,
    pub method: Method,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            verify_tls: true,
            timeout: DEFAULT_TIMEOUT,
            method: Method::POST,
        }
    }
}

impl TransportConfig {
    pub fn with_verify_tls(mut self, verify: bool) -> Self {
        self.verify_tls = verify;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }
}
