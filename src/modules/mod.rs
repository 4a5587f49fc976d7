//! Cross-cutting services module
//!
//! Reports authentication activity to logging and custom handlers.

pub mod events;

pub use events::{
    AuthEvent, ChallengeIssuedEvent, ErrorEvent, EventDispatcher, EventHandler, LoggingHandler,
    OutcomeEvent, REDACTED, ResponseReceivedEvent, RoundSubmittedEvent, redact,
};
