//! Submission stage.
//!
//! Checks run in a fixed order and the first failure wins. A failed check
//! never reaches the submitter: the error is absorbed into one audit event
//! and turned into a non-zero status.

use crate::classification::{check_clearance, ClassifiedValue, MessageBuilder, Sink};
use crate::collaborators::{Submission, Submitter, SUBMIT_OK, SUBMIT_SECURITY_REJECTION};
use crate::error::PipelineError;
use crate::events::EventRouter;
use crate::validation::{check_card_format, check_credential, check_internal_host, check_presence};

use super::transform::{DisplaySafeProfile, LocalizedInstruments};

/// Number of fields in a host descriptor.
pub const HOST_DESCRIPTOR_FIELDS: usize = 4;

/// Status for a local validation failure that is not a security rejection.
pub const STATUS_VALIDATION_FAILED: i32 = 1;

/// Everything the submission stage is handed by the orchestrator.
#[derive(Debug, Clone, Copy, Default)]
pub struct SubmissionInput<'a> {
    pub host: Option<&'a [ClassifiedValue<String>]>,
    pub user_id: Option<&'a ClassifiedValue<String>>,
    pub profile: Option<&'a DisplaySafeProfile>,
    pub card: Option<&'a ClassifiedValue<String>>,
    pub instruments: Option<&'a LocalizedInstruments>,
}

/// Status reported for an absorbed submission error.
pub fn status_for(err: &PipelineError) -> i32 {
    match err {
        PipelineError::UnexpectedHost | PipelineError::CredentialPolicy => {
            SUBMIT_SECURITY_REJECTION
        }
        _ => STATUS_VALIDATION_FAILED,
    }
}

/// Validate and post one user's information.
///
/// Returns the submitter's status, or a local failure status when a check
/// fails before the outbound call.
pub fn post_information(
    submitter: &dyn Submitter,
    router: &EventRouter<'_>,
    input: SubmissionInput<'_>,
) -> i32 {
    let router = router.for_stage("submission");

    match try_post(submitter, &router, input) {
        Ok(status) => {
            log::info!("{} STAGE_COMPLETE status={}", router.context(), status);
            status
        }
        Err(err) => {
            let status = status_for(&err);
            log::warn!("{} STAGE_FAILED status={}", router.context(), status);
            let reason = ClassifiedValue::plaintext(err.to_string());
            router.audit(
                MessageBuilder::new("submission for processing failed: internal message ")
                    .value(&reason)
                    .build(),
            );
            status
        }
    }
}

fn note(router: &EventRouter<'_>, text: &str) {
    router.programmer_note(ClassifiedValue::plaintext(text.to_string()));
}

fn try_post(
    submitter: &dyn Submitter,
    router: &EventRouter<'_>,
    input: SubmissionInput<'_>,
) -> Result<i32, PipelineError> {
    let host = match input.host {
        Some(host) if host.len() == HOST_DESCRIPTOR_FIELDS => host,
        _ => {
            note(router, "hostInformation not included in submission");
            return Err(PipelineError::HostInfoInvalid);
        }
    };

    let hostname = &host[0];
    if !check_internal_host(hostname.as_str()).passed {
        router.security(
            MessageBuilder::new("Attempt to submit to unexpected host ")
                .value(hostname)
                .build(),
        );
        return Err(PipelineError::UnexpectedHost);
    }

    let user_id = match input.user_id {
        Some(user_id) if check_presence(Some(user_id.as_str())).passed => user_id,
        _ => {
            note(router, "userID not included in submission");
            return Err(PipelineError::MissingUserId);
        }
    };

    let credential = match input.profile.and_then(DisplaySafeProfile::credential) {
        Some(credential) if !credential.is_empty() => credential,
        _ => {
            note(router, "user password not included in submission");
            return Err(PipelineError::MissingCredential);
        }
    };

    if !check_credential(credential.as_str()).passed {
        router.security(
            MessageBuilder::new("invalid user credential supplied: userid = ")
                .value(user_id)
                .text("; credential = ")
                .value(credential)
                .build(),
        );
        return Err(PipelineError::CredentialPolicy);
    }

    let card = match input.card {
        Some(card) => card,
        None => {
            note(router, "credit card data not included in submission");
            return Err(PipelineError::MissingCardData);
        }
    };

    let card_check = check_card_format(card.as_str());
    if !card_check.passed {
        log::debug!("{} CARD_FORMAT_SUSPICIOUS reason={}", router.context(), card_check.reason);
        router.security(
            MessageBuilder::new("suspicious credit card format: ")
                .value(card)
                .build(),
        );
    }

    let email = input.profile.and_then(DisplaySafeProfile::email);
    let notes = input.profile.and_then(DisplaySafeProfile::notes);
    let instruments = input.instruments.map(LocalizedInstruments::items).unwrap_or_default();

    let outbound = [Some(user_id), Some(credential), email, notes]
        .into_iter()
        .flatten()
        .chain(instruments.iter());
    for value in outbound {
        check_clearance(value, Sink::OutboundResponse)?;
    }

    router.audit(
        MessageBuilder::new("Posting user information to host: ")
            .value(hostname)
            .build(),
    );

    let instrument_lines: Vec<String> = instruments.iter().map(|i| i.as_str().to_string()).collect();
    let submission = Submission {
        user_id: user_id.as_str(),
        credential: credential.as_str(),
        email: email.map(ClassifiedValue::as_str),
        notes: notes.map(ClassifiedValue::as_str),
        instruments: &instrument_lines,
    };

    let status = submitter.submit(&submission);
    if status != SUBMIT_OK {
        log::warn!("{} SUBMIT_REJECTED status={}", router.context(), status);
    }
    Ok(status)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classification::Classification;
    use crate::collaborators::fake::{FakeCollaborator, RecordingConsole};
    use crate::events::{EventSeverity, EventTarget};
    use crate::logging::LogContext;
    use crate::pipeline::context::ServerConfig;
    use crate::pipeline::transform::{localize_instruments, sanitize_for_display};

    struct Fixture {
        host: Vec<ClassifiedValue<String>>,
        user_id: ClassifiedValue<String>,
        profile: DisplaySafeProfile,
        card: ClassifiedValue<String>,
        instruments: LocalizedInstruments,
    }

    fn classified(value: &str, classification: Classification) -> ClassifiedValue<String> {
        ClassifiedValue::new(value.to_string(), classification)
    }

    fn fixture(fake: &FakeCollaborator, host: &str, credential: &str, card: &str) -> Fixture {
        let console = RecordingConsole::default();
        let router = EventRouter::new(fake, fake, &console, LogContext::new("run-setup"));

        let pii = |v: &str| Some(classified(v, Classification::PersonallyIdentifiable));
        let profile = vec![
            pii("Alice"),
            Some(classified(credential, Classification::Credential)),
            pii("alice@example.com"),
            pii("prefers email"),
        ];
        let quotes = vec![pii("AAPL 189.50")];

        let fixture = Fixture {
            host: ServerConfig::from_fields(host, "access-7731", "accounts", "txkey-5521", "Password")
                .host_descriptor(),
            user_id: classified("u1", Classification::PersonallyIdentifiable),
            profile: sanitize_for_display(&router, Some(&profile)).expect("profile"),
            card: classified(card, Classification::PaymentCard),
            instruments: localize_instruments(fake, &router, Some(&quotes)).expect("quotes"),
        };
        fake.clear_events();
        fixture
    }

    fn input(f: &Fixture) -> SubmissionInput<'_> {
        SubmissionInput {
            host: Some(&f.host),
            user_id: Some(&f.user_id),
            profile: Some(&f.profile),
            card: Some(&f.card),
            instruments: Some(&f.instruments),
        }
    }

    #[test]
    fn test_valid_submission_posts_and_audits() {
        let fake = FakeCollaborator::healthy();
        let f = fixture(&fake, "internalAB", "Abcdefg123", "tok_ABCDEF123456");
        let console = RecordingConsole::default();
        let router = EventRouter::new(&fake, &fake, &console, LogContext::new("run-test"));

        assert_eq!(post_information(&fake, &router, input(&f)), SUBMIT_OK);

        let events = fake.events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].target, EventTarget::Audit);
        assert_eq!(events[0].message, "Posting user information to host: internalAB");

        let submissions = fake.submissions.lock();
        assert_eq!(submissions.len(), 1);
        assert_eq!(submissions[0].user_id, "u1");
        assert_eq!(submissions[0].credential, "Abcdefg123");
        assert_eq!(submissions[0].email.as_deref(), Some("alice@example.com"));
        assert_eq!(submissions[0].instruments, vec!["AAPL 189,50"]);
        assert_eq!(submissions[0].notes.as_deref(), Some("prefers email"));
    }

    #[test]
    fn test_short_credential_is_a_security_rejection() {
        let fake = FakeCollaborator::healthy();
        let f = fixture(&fake, "internalAB", "Abcdefg12", "tok_ABCDEF123456");
        let console = RecordingConsole::default();
        let router = EventRouter::new(&fake, &fake, &console, LogContext::new("run-test"));

        let status = post_information(&fake, &router, input(&f));
        assert_eq!(status, SUBMIT_SECURITY_REJECTION);
        assert!(fake.submissions.lock().is_empty());

        let security = fake.events_for(EventTarget::Security);
        assert_eq!(security.len(), 1);
        assert_eq!(
            security[0].message,
            "invalid user credential supplied: userid = u1; credential = Abcdefg12"
        );

        let audit = fake.events_for(EventTarget::Audit);
        assert_eq!(audit.len(), 1);
        assert!(audit[0].message.contains("user password does not conform to policy"));
        assert!(console.lines().iter().all(|l| !l.contains("Abcdefg12")));
    }

    #[test]
    fn test_unexpected_host_stops_before_other_checks() {
        let fake = FakeCollaborator::healthy();
        let f = fixture(&fake, "externalXY", "bad", "tok_ABCDEF123456");
        let console = RecordingConsole::default();
        let router = EventRouter::new(&fake, &fake, &console, LogContext::new("run-test"));

        assert_eq!(post_information(&fake, &router, input(&f)), SUBMIT_SECURITY_REJECTION);

        let security = fake.events_for(EventTarget::Security);
        assert_eq!(security.len(), 1);
        assert_eq!(security[0].message, "Attempt to submit to unexpected host externalXY");
        assert!(fake.submissions.lock().is_empty());
    }

    #[test]
    fn test_missing_host_descriptor() {
        let fake = FakeCollaborator::healthy();
        let f = fixture(&fake, "internalAB", "Abcdefg123", "tok_ABCDEF123456");
        let console = RecordingConsole::default();
        let router = EventRouter::new(&fake, &fake, &console, LogContext::new("run-test"));

        let short_host = &f.host[..3];
        let status = post_information(
            &fake,
            &router,
            SubmissionInput {
                host: Some(short_host),
                ..input(&f)
            },
        );
        assert_eq!(status, STATUS_VALIDATION_FAILED);

        let events = fake.events();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].severity, EventSeverity::Debug);
        assert_eq!(events[0].message, "hostInformation not included in submission");
        assert_eq!(
            events[1].message,
            "submission for processing failed: internal message host information for submission invalid"
        );
    }

    #[test]
    fn test_missing_card_fails_validation() {
        let fake = FakeCollaborator::healthy();
        let f = fixture(&fake, "internalAB", "Abcdefg123", "tok_ABCDEF123456");
        let console = RecordingConsole::default();
        let router = EventRouter::new(&fake, &fake, &console, LogContext::new("run-test"));

        let status = post_information(
            &fake,
            &router,
            SubmissionInput {
                card: None,
                ..input(&f)
            },
        );
        assert_eq!(status, STATUS_VALIDATION_FAILED);
        assert!(fake.submissions.lock().is_empty());
    }

    #[test]
    fn test_bare_card_number_is_flagged_but_submitted() {
        let fake = FakeCollaborator::healthy();
        let f = fixture(&fake, "internalAB", "Abcdefg123", "4111111111111111");
        let console = RecordingConsole::default();
        let router = EventRouter::new(&fake, &fake, &console, LogContext::new("run-test"));

        assert_eq!(post_information(&fake, &router, input(&f)), SUBMIT_OK);

        let security = fake.events_for(EventTarget::Security);
        assert_eq!(security.len(), 1);
        assert_eq!(security[0].message, "suspicious credit card format: 4111111111111111");
        assert_eq!(fake.submissions.lock().len(), 1);
        assert!(console.lines().iter().all(|l| !l.contains("4111111111111111")));
    }

    #[test]
    fn test_submitter_status_is_returned() {
        let mut fake = FakeCollaborator::healthy();
        fake.submit_status = 7;
        let f = fixture(&fake, "internalAB", "Abcdefg123", "tok_ABCDEF123456");
        let console = RecordingConsole::default();
        let router = EventRouter::new(&fake, &fake, &console, LogContext::new("run-test"));

        assert_eq!(post_information(&fake, &router, input(&f)), 7);
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(status_for(&PipelineError::UnexpectedHost), 2);
        assert_eq!(status_for(&PipelineError::CredentialPolicy), 2);
        assert_eq!(status_for(&PipelineError::MissingCardData), 1);
    }
}
