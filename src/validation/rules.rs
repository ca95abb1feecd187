//! Format and presence rules.
//!
//! Every rule is a pure predicate over a raw value and reports pass/fail with
//! a reason. Rules never log; the stage that applies them decides which event
//! a failure turns into.

use lazy_static::lazy_static;
use regex::Regex;

use crate::error::PipelineError;

/// Required length of a user credential.
pub const CREDENTIAL_LENGTH: usize = 10;

/// Required length of a card token.
pub const CARD_LENGTH: usize = 16;

lazy_static! {
    /// Seven letters followed by three digits
    static ref CREDENTIAL_PATTERN: Regex = Regex::new(r"^[A-Za-z]{7}[0-9]{3}$").unwrap();

    /// A bare sixteen digit card number
    static ref CARD_DIGITS_PATTERN: Regex = Regex::new(r"^[0-9]{16}$").unwrap();

    /// Literal "internal" followed by two uppercase letters
    static ref INTERNAL_HOST_PATTERN: Regex = Regex::new(r"^internal[A-Z]{2}$").unwrap();
}

/// Outcome of applying a single rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleOutcome {
    pub passed: bool,
    pub reason: String,
}

impl RuleOutcome {
    pub fn pass(reason: &str) -> Self {
        Self {
            passed: true,
            reason: reason.to_string(),
        }
    }

    pub fn fail(reason: &str) -> Self {
        Self {
            passed: false,
            reason: reason.to_string(),
        }
    }

    /// Turn a failed outcome into the given error.
    pub fn or_err(self, err: PipelineError) -> Result<(), PipelineError> {
        if self.passed {
            Ok(())
        } else {
            Err(err)
        }
    }
}

/// Non-null and non-empty.
pub fn check_presence(value: Option<&str>) -> RuleOutcome {
    match value {
        None => RuleOutcome::fail("value missing"),
        Some(v) if v.is_empty() => RuleOutcome::fail("value empty"),
        Some(_) => RuleOutcome::pass("value present"),
    }
}

/// Exactly ten characters: seven letters then three digits.
pub fn check_credential(value: &str) -> RuleOutcome {
    if value.chars().count() != CREDENTIAL_LENGTH {
        return RuleOutcome::fail("credential length");
    }
    if !CREDENTIAL_PATTERN.is_match(value) {
        return RuleOutcome::fail("credential pattern");
    }
    RuleOutcome::pass("credential conforms")
}

/// Card token format check.
///
/// Fails (suspicious) when the token is not sixteen characters long, and also
/// when it is a bare sixteen digit number: a well-formed PAN showing up where
/// a vault token is expected gets audited rather than accepted silently.
pub fn check_card_format(value: &str) -> RuleOutcome {
    if value.chars().count() != CARD_LENGTH {
        return RuleOutcome::fail("card token length");
    }
    if CARD_DIGITS_PATTERN.is_match(value) {
        return RuleOutcome::fail("card token is a bare card number");
    }
    RuleOutcome::pass("card token format")
}

/// Submission target must be an internal host.
pub fn check_internal_host(value: &str) -> RuleOutcome {
    if INTERNAL_HOST_PATTERN.is_match(value) {
        RuleOutcome::pass("internal host")
    } else {
        RuleOutcome::fail("unexpected host")
    }
}

/// Collection present, non-empty and free of null elements.
///
/// The first null element is reported by index.
pub fn check_collection<T>(items: Option<&[Option<T>]>, name: &'static str) -> Result<(), PipelineError> {
    let items = match items {
        Some(items) if !items.is_empty() => items,
        _ => return Err(PipelineError::EmptyCollection { name }),
    };

    match items.iter().position(Option::is_none) {
        Some(index) => Err(PipelineError::NullElement { name, index }),
        None => Ok(()),
    }
}
