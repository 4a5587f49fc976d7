// Aggregates the response codec, validation transport and the challenge-response engine.

pub mod core;
pub mod engine;
