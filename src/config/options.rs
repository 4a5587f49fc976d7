//! PAM module argument parsing.
//!
//! A PAM stack line hands the module a flat list of tokens such as
//! `debug url=https://otp.example.com/validate/simplecheck realm=staff`.
//! Bare words are flags, everything else is `key=value`.

use std::time::Duration;

use http::Method;
use once_cell::sync::Lazy;
use thiserror::Error;
use url::Url;

use super::transport::{DEFAULT_TIMEOUT, TransportConfig};
use crate::challenges::engine::DEFAULT_MAX_CHALLENGE_ROUNDS;

pub const DEFAULT_URL: &str = "https://localhost/validate/simplecheck";
pub const DEFAULT_PROMPT: &str = "Your OTP:";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid validation url: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("invalid value for {key}: {value:?}")]
    InvalidNumber { key: &'static str, value: String },
    #[error("unsupported http method: {0:?}")]
    InvalidMethod(String),
}

/// Options recognised on the module's argument list.
#[derive(Debug, Clone)]
pub struct ModuleOptions {
    pub url: Url,
    pub prompt: String,
    pub realm: Option<String>,
    pub debug: bool,
    pub verify_tls: bool,
    pub timeout: Duration,
    pub max_challenge_rounds: usize,
    pub method: Method,
}

impl Default for ModuleOptions {
    fn default() -> Self {
        Self {
            url: default_url(),
            prompt: DEFAULT_PROMPT.to_string(),
            realm: None,
            debug: false,
            verify_tls: true,
            timeout: DEFAULT_TIMEOUT,
            max_challenge_rounds: DEFAULT_MAX_CHALLENGE_ROUNDS,
            method: Method::POST,
        }
    }
}

impl ModuleOptions {
    /// Parse module arguments. Unknown tokens are ignored.
    pub fn from_args<I, S>(args: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut options = Self::default();

        for arg in args {
            let arg = arg.as_ref();
            match arg.split_once('=') {
                None => match arg {
                    "debug" => options.debug = true,
                    "nosslcertverify" => options.verify_tls = false,
                    other => log::debug!("ignoring unknown module flag {other:?}"),
                },
                Some(("url", value)) => options.url = Url::parse(value)?,
                Some(("realm", value)) => {
                    options.realm = (!value.is_empty()).then(|| value.to_string());
                }
                Some(("prompt", value)) => options.prompt = value.replace('_', " "),
                Some(("timeout", value)) => {
                    let secs = parse_number("timeout", value)?;
                    options.timeout = Duration::from_secs(secs as u64);
                }
                Some(("maxrounds", value)) => {
                    options.max_challenge_rounds = parse_number("maxrounds", value)?;
                }
                Some(("method", value)) => options.method = parse_method(value)?,
                Some((key, _)) => log::debug!("ignoring unknown module option {key:?}"),
            }
        }

        Ok(options)
    }

    pub fn transport(&self) -> TransportConfig {
        TransportConfig::default()
            .with_verify_tls(self.verify_tls)
            .with_timeout(self.timeout)
            .with_method(self.method.clone())
    }
}

fn default_url() -> Url {
    DEFAULT_ENDPOINT.clone()
}

static DEFAULT_ENDPOINT: Lazy<Url> =
    Lazy::new(|| Url::parse(DEFAULT_URL).expect("default validation url is valid"));

fn parse_number(key: &'static str, value: &str) -> Result<usize, ConfigError> {
    value
        .trim()
        .parse::<usize>()
        .ok()
        .filter(|number| *number > 0)
        .ok_or_else(|| ConfigError::InvalidNumber {
            key,
            value: value.to_string(),
        })
}

fn parse_method(value: &str) -> Result<Method, ConfigError> {
    match value.to_ascii_lowercase().as_str() {
        "post" => Ok(Method::POST),
        "get" => Ok(Method::GET),
        _ => Err(ConfigError::InvalidMethod(value.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_without_arguments() {
        let options = ModuleOptions::from_args(Vec::<String>::new()).unwrap();
        assert_eq!(options.url.as_str(), DEFAULT_URL);
        assert_eq!(options.prompt, DEFAULT_PROMPT);
        assert!(options.realm.is_none());
        assert!(!options.debug);
        assert!(options.verify_tls);
        assert_eq!(options.method, Method::POST);
        assert_eq!(options.max_challenge_rounds, DEFAULT_MAX_CHALLENGE_ROUNDS);
    }

    #[test]
    fn parses_a_full_stack_line() {
        let options = ModuleOptions::from_args([
            "debug",
            "nosslcertverify",
            "url=https://otp.example.com/validate/simplecheck",
            "realm=staff",
            "prompt=LinOTP_one-time_password:",
            "timeout=3",
            "maxrounds=4",
            "method=GET",
        ])
        .unwrap();

        assert!(options.debug);
        assert!(!options.verify_tls);
        assert_eq!(options.url.host_str(), Some("otp.example.com"));
        assert_eq!(options.realm.as_deref(), Some("staff"));
        assert_eq!(options.prompt, "LinOTP one-time password:");
        assert_eq!(options.timeout, Duration::from_secs(3));
        assert_eq!(options.max_challenge_rounds, 4);
        assert_eq!(options.method, Method::GET);

        let transport = options.transport();
        assert!(!transport.verify_tls);
        assert_eq!(transport.timeout, Duration::from_secs(3));
    }

    #[test]
    fn url_values_keep_embedded_equals_signs() {
        let options =
            ModuleOptions::from_args(["url=https://otp.example.com/validate/check?client=pam"])
                .unwrap();
        assert_eq!(options.url.query(), Some("client=pam"));
    }

    #[test]
    fn unknown_tokens_are_ignored() {
        let options = ModuleOptions::from_args(["use_first_pass", "color=blue"]).unwrap();
        assert_eq!(options.url.as_str(), DEFAULT_URL);
    }

    #[test]
    fn empty_realm_means_no_realm() {
        let options = ModuleOptions::from_args(["realm="]).unwrap();
        assert!(options.realm.is_none());
    }

    #[test]
    fn rejects_bad_values() {
        assert!(matches!(
            ModuleOptions::from_args(["url=not a url"]),
            Err(ConfigError::InvalidUrl(_))
        ));
        assert!(matches!(
            ModuleOptions::from_args(["timeout=soon"]),
            Err(ConfigError::InvalidNumber { key: "timeout", .. })
        ));
        assert!(matches!(
            ModuleOptions::from_args(["maxrounds=0"]),
            Err(ConfigError::InvalidNumber { key: "maxrounds", .. })
        ));
        assert!(matches!(
            ModuleOptions::from_args(["method=PUT"]),
            Err(ConfigError::InvalidMethod(_))
        ));
    }
}
