//! Regex-based privacy scrubbing.
//!
//! Detects and replaces sensitive fragments in free text:
//! - `name = value` pairs for passwords, keys, codes and tokens
//! - SSNs
//! - Credit card numbers
//! - Email addresses
//! - Phone numbers
//! - IP addresses
//! - Credential-shaped words (seven letters, three digits)
//!
//! Used by the local collaborator to back the privacy and exception
//! scrubbers.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// Secret-bearing key/value pairs ("password = x", "transaction key = y")
    static ref SECRET_PAIR_PATTERN: Regex = Regex::new(
        r"(?i)\b(password|credential|access code|transaction key|key|token|CC)\s*[=:]\s*[^\s)]+"
    ).unwrap();

    /// SSN pattern
    static ref SSN_PATTERN: Regex = Regex::new(
        r"\b\d{3}-\d{2}-\d{4}\b"
    ).unwrap();

    /// Credit card pattern (basic)
    static ref CC_PATTERN: Regex = Regex::new(
        r"\b(?:\d{4}[-\s]?){3}\d{4}\b"
    ).unwrap();

    /// Email pattern
    static ref EMAIL_PATTERN: Regex = Regex::new(
        r"[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}"
    ).unwrap();

    /// Phone number patterns (various formats)
    static ref PHONE_PATTERN: Regex = Regex::new(
        r"(?:\+?1[-.\s]?)?\(?[0-9]{3}\)?[-.\s][0-9]{3}[-.\s][0-9]{4}\b"
    ).unwrap();

    /// IP address pattern (IPv4)
    static ref IP_PATTERN: Regex = Regex::new(
        r"\b(?:\d{1,3}\.){3}\d{1,3}\b"
    ).unwrap();

    /// Credential-shaped word
    static ref CREDENTIAL_WORD_PATTERN: Regex = Regex::new(
        r"\b[A-Za-z]{7}[0-9]{3}\b"
    ).unwrap();
}

/// Counts of what was replaced.
#[derive(Debug, Default)]
pub struct PiiScrubResult {
    pub secrets_found: usize,
    pub ssns_found: usize,
    pub ccs_found: usize,
    pub emails_found: usize,
    pub phones_found: usize,
    pub ips_found: usize,
    pub credentials_found: usize,
}

impl PiiScrubResult {
    pub fn total_entities(&self) -> usize {
        self.secrets_found
            + self.ssns_found
            + self.ccs_found
            + self.emails_found
            + self.phones_found
            + self.ips_found
            + self.credentials_found
    }
}

fn replace(pattern: &Regex, text: String, replacement: &str, count: &mut usize) -> String {
    let found = pattern.find_iter(&text).count();
    if found == 0 {
        return text;
    }
    *count += found;
    pattern.replace_all(&text, replacement).into_owned()
}

/// Scrub sensitive fragments from a string.
///
/// Replaces them with placeholder tokens like [SSN], [EMAIL], etc. Secret
/// pairs keep their name: "password = x" becomes "password = [REDACTED]".
pub fn scrub_text(s: &str) -> (String, PiiScrubResult) {
    let mut result = PiiScrubResult::default();
    let mut scrubbed = s.to_string();

    scrubbed = replace(&SECRET_PAIR_PATTERN, scrubbed, "$1 = [REDACTED]", &mut result.secrets_found);
    scrubbed = replace(&SSN_PATTERN, scrubbed, "[SSN]", &mut result.ssns_found);
    scrubbed = replace(&CC_PATTERN, scrubbed, "[CREDIT_CARD]", &mut result.ccs_found);
    scrubbed = replace(&EMAIL_PATTERN, scrubbed, "[EMAIL]", &mut result.emails_found);
    scrubbed = replace(&PHONE_PATTERN, scrubbed, "[PHONE]", &mut result.phones_found);
    scrubbed = replace(&IP_PATTERN, scrubbed, "[IP_ADDRESS]", &mut result.ips_found);
    scrubbed = replace(
        &CREDENTIAL_WORD_PATTERN,
        scrubbed,
        "[CREDENTIAL]",
        &mut result.credentials_found,
    );

    if result.total_entities() > 0 {
        log::debug!(
            "PII_SCRUBBED secrets={} ssns={} ccs={} emails={} phones={} ips={} credentials={}",
            result.secrets_found,
            result.ssns_found,
            result.ccs_found,
            result.emails_found,
            result.phones_found,
            result.ips_found,
            result.credentials_found
        );
    }

    (scrubbed, result)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_scrubbing() {
        let (scrubbed, result) = scrub_text("Contact john@example.com for help");
        assert_eq!(scrubbed, "Contact [EMAIL] for help");
        assert_eq!(result.emails_found, 1);
    }

    #[test]
    fn test_phone_scrubbing() {
        let (scrubbed, result) = scrub_text("Call 555-123-4567 now");
        assert_eq!(scrubbed, "Call [PHONE] now");
        assert_eq!(result.phones_found, 1);
    }

    #[test]
    fn test_ssn_scrubbing() {
        let (scrubbed, result) = scrub_text("SSN 123-45-6789 on file");
        assert_eq!(scrubbed, "SSN [SSN] on file");
        assert_eq!(result.ssns_found, 1);
    }

    #[test]
    fn test_card_number_not_mistaken_for_phone() {
        let (scrubbed, result) = scrub_text("card 1234567890123456");
        assert_eq!(scrubbed, "card [CREDIT_CARD]");
        assert_eq!(result.ccs_found, 1);
        assert_eq!(result.phones_found, 0);
    }

    #[test]
    fn test_secret_pairs_keep_their_name() {
        let (scrubbed, _) = scrub_text(
            "user u1 loaded from database; password = Abcdefg123",
        );
        assert_eq!(scrubbed, "user u1 loaded from database; password = [REDACTED]");

        let (scrubbed, result) = scrub_text("sensitive transaction key = txkey-5521 done");
        assert_eq!(scrubbed, "sensitive transaction key = [REDACTED] done");
        assert_eq!(result.secrets_found, 1);
    }

    #[test]
    fn test_card_token_in_audit_text() {
        let (scrubbed, _) = scrub_text("retrieved for user u1 (CC: tok_ABCDEF123456 )");
        assert_eq!(scrubbed, "retrieved for user u1 (CC = [REDACTED] )");
    }

    #[test]
    fn test_bare_credential_word() {
        let (scrubbed, result) = scrub_text("credential supplied Abcdefg123 rejected");
        assert_eq!(scrubbed, "credential supplied [CREDENTIAL] rejected");
        assert_eq!(result.credentials_found, 1);
    }

    #[test]
    fn test_no_pii() {
        let original = "This is a normal text without PII";
        let (scrubbed, result) = scrub_text(original);
        assert_eq!(scrubbed, original);
        assert_eq!(result.total_entities(), 0);
    }
}
