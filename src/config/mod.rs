//! Settings and configuration module
//!
//! Provides:
//! - Parsing of PAM-style `key=value` module arguments
//! - Transport settings scoped to a single authenticator

pub mod options;
pub mod transport;

pub use options::{ConfigError, DEFAULT_PROMPT, DEFAULT_URL, ModuleOptions};
pub use transport::TransportConfig;
