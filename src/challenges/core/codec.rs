//! Decoding of the validation service's terse response grammar.
//!
//! The service answers `/validate/simplecheck` with a three character marker.
//! Challenge responses reuse the reject marker as a prefix followed by the
//! state token and an optional message, so the length check must run before
//! the reject marker is taken at face value.

use super::types::ValidationOutcome;

/// Credential accepted.
pub const ACCEPTED_MARKER: &[u8] = b":-)";
/// Credential invalid.
pub const FAILURE_MARKER: &[u8] = b":-/";
/// Hard rejection, and prefix of every challenge response.
pub const REJECT_MARKER: &[u8] = b":-(";
/// Label shown when answering a challenge.
pub const DEFAULT_CHALLENGE_PROMPT: &str = "OTP:";

/// Map a raw response body onto a [`ValidationOutcome`].
///
/// Every byte sequence maps to exactly one outcome.
pub fn decode_response(raw: &[u8]) -> ValidationOutcome {
    if raw == ACCEPTED_MARKER {
        return ValidationOutcome::Accepted;
    }
    if raw == FAILURE_MARKER {
        return ValidationOutcome::Denied;
    }
    if raw == REJECT_MARKER {
        return ValidationOutcome::Rejected;
    }

    match raw.strip_prefix(REJECT_MARKER) {
        Some(remainder) if !remainder.is_empty() => decode_challenge(remainder),
        _ => ValidationOutcome::Malformed,
    }
}

fn decode_challenge(remainder: &[u8]) -> ValidationOutcome {
    let text = String::from_utf8_lossy(remainder);
    let mut tokens = text.split_whitespace();

    let state_token = tokens.next().unwrap_or_default().to_string();
    let message = tokens.collect::<Vec<_>>().join(" ");

    let prompt_text = if message.is_empty() {
        DEFAULT_CHALLENGE_PROMPT.to_string()
    } else {
        format!("{message} - {DEFAULT_CHALLENGE_PROMPT}")
    };

    ValidationOutcome::ChallengePending {
        state_token,
        prompt_text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pending(state: &str, prompt: &str) -> ValidationOutcome {
        ValidationOutcome::ChallengePending {
            state_token: state.into(),
            prompt_text: prompt.into(),
        }
    }

    #[test]
    fn decodes_terminal_markers() {
        assert_eq!(decode_response(b":-)"), ValidationOutcome::Accepted);
        assert_eq!(decode_response(b":-/"), ValidationOutcome::Denied);
        assert_eq!(decode_response(b":-("), ValidationOutcome::Rejected);
    }

    #[test]
    fn reject_marker_with_payload_is_a_challenge() {
        assert_eq!(
            decode_response(b":-( tok text"),
            pending("tok", "text - OTP:")
        );
        assert_eq!(
            decode_response(b":-( 99 Enter your OTP"),
            pending("99", "Enter your OTP - OTP:")
        );
    }

    #[test]
    fn challenge_without_message_uses_default_prompt() {
        assert_eq!(decode_response(b":-( 1234"), pending("1234", "OTP:"));
    }

    #[test]
    fn challenge_without_token_has_empty_state() {
        // A single trailing space is longer than the marker, so it is still a challenge.
        assert_eq!(decode_response(b":-( "), pending("", "OTP:"));
    }

    #[test]
    fn challenge_message_whitespace_is_collapsed() {
        assert_eq!(
            decode_response(b":-(  77   please   enter  pin\n"),
            pending("77", "please enter pin - OTP:")
        );
    }

    #[test]
    fn markers_are_matched_exactly() {
        assert_eq!(decode_response(b":-) "), ValidationOutcome::Malformed);
        assert_eq!(decode_response(b" :-)"), ValidationOutcome::Malformed);
        assert_eq!(decode_response(b":-/\n"), ValidationOutcome::Malformed);
        assert_eq!(decode_response(b":-"), ValidationOutcome::Malformed);
    }

    #[test]
    fn unknown_shapes_are_malformed() {
        assert_eq!(decode_response(b""), ValidationOutcome::Malformed);
        assert_eq!(
            decode_response(b"<html>500 Internal Server Error</html>"),
            ValidationOutcome::Malformed
        );
        assert_eq!(decode_response(&[0xff, 0xfe, 0x00]), ValidationOutcome::Malformed);
    }

    #[test]
    fn invalid_utf8_after_challenge_marker_still_decodes() {
        let outcome = decode_response(b":-( \xff\xfe text");
        match outcome {
            ValidationOutcome::ChallengePending { prompt_text, .. } => {
                assert_eq!(prompt_text, "text - OTP:");
            }
            other => panic!("expected a challenge, got {other:?}"),
        }
    }

    #[test]
    fn decoding_is_total_over_short_inputs() {
        let alphabet = [b':', b'-', b')', b'(', b'/', b' ', b'a', 0xff];
        let mut inputs: Vec<Vec<u8>> = vec![Vec::new()];
        let mut level: Vec<Vec<u8>> = vec![Vec::new()];
        for _ in 0..5 {
            level = level
                .iter()
                .flat_map(|prefix| {
                    alphabet.iter().map(move |byte| {
                        let mut extended = prefix.clone();
                        extended.push(*byte);
                        extended
                    })
                })
                .collect();
            inputs.extend(level.iter().cloned());
        }

        for input in inputs {
            let outcome = decode_response(&input);
            if input.len() > REJECT_MARKER.len() && input.starts_with(REJECT_MARKER) {
                assert!(!outcome.is_terminal(), "{input:?} should be a challenge");
            }
        }
    }
}
