//! Sanitizers backed by the external scrubbing collaborator.
//!
//! Each one consumes a classified value and returns a new value with a lower
//! risk classification cleared for a specific sink:
//!
//! | Sanitizer        | Output classification | Cleared for            |
//! |------------------|-----------------------|------------------------|
//! | card display     | SystemInternal        | Console, LogStore      |
//! | identity         | Plaintext             | Console (and all else) |
//! | error message    | SystemInternal        | Console, LogStore      |

use crate::classification::{Classification, ClassifiedValue};
use crate::collaborators::Scrubber;
use crate::error::PipelineError;

/// Card token → display string (masked by the vault).
pub fn sanitize_card_for_display(
    scrubber: &dyn Scrubber,
    card: &ClassifiedValue<String>,
) -> Result<ClassifiedValue<String>, PipelineError> {
    if card.is_empty() {
        return Err(PipelineError::InvalidCardData);
    }

    let display = scrubber.display_card(card.as_str())?;
    Ok(card.declassify(display, Classification::SystemInternal))
}

/// Identity data with every private fragment removed.
///
/// The output is computed from the input alone.
pub fn sanitize_identity(
    scrubber: &dyn Scrubber,
    identity: &ClassifiedValue<String>,
) -> ClassifiedValue<String> {
    let scrubbed = scrubber.scrub_privacy(identity.as_str());
    identity.declassify(scrubbed, Classification::Plaintext)
}

/// Error or event message stripped of credential, card and personal data.
///
/// Every message derived from an error passes through here before it reaches
/// the console.
pub fn sanitize_error_message(
    scrubber: &dyn Scrubber,
    message: &ClassifiedValue<String>,
) -> ClassifiedValue<String> {
    let scrubbed = scrubber.scrub_exception(message.as_str());
    message.declassify(scrubbed, Classification::SystemInternal)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classification::{is_cleared, Sink};
    use crate::collaborators::fake::FakeCollaborator;

    #[test]
    fn test_card_display_masks_and_clears_for_console() {
        let fake = FakeCollaborator::healthy();
        let card = ClassifiedValue::new("tok_ABCDEF123456".to_string(), Classification::PaymentCard);

        let display = sanitize_card_for_display(&fake, &card).unwrap();
        assert_eq!(display.as_str(), "************3456");
        assert_eq!(display.classification(), Classification::SystemInternal);
        assert!(is_cleared(&display, Sink::Console));
        assert!(is_cleared(&display, Sink::LogStore));
        assert!(!is_cleared(&display, Sink::OutboundResponse));
    }

    #[test]
    fn test_card_display_rejects_empty() {
        let fake = FakeCollaborator::healthy();
        let card = ClassifiedValue::new(String::new(), Classification::PaymentCard);

        let err = sanitize_card_for_display(&fake, &card).unwrap_err();
        assert_eq!(err.to_string(), "invalid card data");
    }

    #[test]
    fn test_identity_sanitizer_output_is_console_safe() {
        let fake = FakeCollaborator::healthy();
        let ssn = ClassifiedValue::new(
            "123-45-6789".to_string(),
            Classification::PersonallyIdentifiable,
        );

        let sanitized = sanitize_identity(&fake, &ssn);
        assert_eq!(sanitized.as_str(), "[SSN]");
        assert!(is_cleared(&sanitized, Sink::Console));
        assert!(!is_cleared(&ssn, Sink::Console));
    }

    #[test]
    fn test_error_message_scrubbed_for_console() {
        let fake = FakeCollaborator::healthy();
        let message = ClassifiedValue::new(
            "user u1 loaded from database; password = Abcdefg123".to_string(),
            Classification::Credential,
        );

        let sanitized = sanitize_error_message(&fake, &message);
        assert_eq!(
            sanitized.as_str(),
            "user u1 loaded from database; password = [REDACTED]"
        );
        assert_eq!(sanitized.classification(), Classification::SystemInternal);
        assert!(is_cleared(&sanitized, Sink::Console));
    }

    #[test]
    fn test_plaintext_message_stays_plaintext() {
        let fake = FakeCollaborator::healthy();
        let message = ClassifiedValue::plaintext("user processing initiated".to_string());
        let sanitized = sanitize_error_message(&fake, &message);
        assert_eq!(sanitized.classification(), Classification::Plaintext);
    }
}
