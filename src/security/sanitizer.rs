//! HTML display sanitization.
//!
//! Escapes markup-significant characters so a value can be embedded in the
//! outbound HTML response:
//! - `<` → `&lt;`
//! - `>` → `&gt;`
//! - `&` → `&amp;` (unless it already starts a character entity)
//! - `"` → `&quot;`
//! - `'` → `&#39;`
//!
//! Script-injection patterns are counted as a detection signal only.

use lazy_static::lazy_static;
use regex::Regex;

use crate::classification::ClassifiedValue;

lazy_static! {
    /// A character entity at the start of the input
    static ref ENTITY_PREFIX: Regex = Regex::new(
        r"^&(?:[a-zA-Z][a-zA-Z0-9]{1,31}|#[0-9]{1,7}|#[xX][0-9a-fA-F]{1,6});"
    ).unwrap();

    /// XSS detection patterns
    static ref XSS_PATTERNS: Vec<Regex> = vec![
        Regex::new(r"(?i)<script[^>]*>").unwrap(),
        Regex::new(r"(?i)javascript:").unwrap(),
        Regex::new(r"(?i)on\w+\s*=").unwrap(),
        Regex::new(r"(?i)<iframe[^>]*>").unwrap(),
        Regex::new(r"(?i)<object[^>]*>").unwrap(),
        Regex::new(r"(?i)<embed[^>]*>").unwrap(),
    ];
}

/// Escape a string for HTML display.
///
/// Idempotent: escaping already-escaped text returns it unchanged.
pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());

    for (i, c) in s.char_indices() {
        match c {
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            '&' if ENTITY_PREFIX.is_match(&s[i..]) => out.push('&'),
            '&' => out.push_str("&amp;"),
            _ => out.push(c),
        }
    }

    out
}

/// Number of script-injection patterns present in `s`.
pub fn count_xss_patterns(s: &str) -> usize {
    XSS_PATTERNS.iter().filter(|p| p.is_match(s)).count()
}

/// Result of escaping one value for display.
#[derive(Debug)]
pub struct DisplayEscape {
    pub value: ClassifiedValue<String>,
    /// True when escaping altered the input.
    pub changed: bool,
    pub xss_detections: usize,
}

/// Escape one classified value for display. Its classification is kept.
pub fn escape_for_display(input: &ClassifiedValue<String>) -> DisplayEscape {
    let escaped = escape_html(input.as_str());
    let changed = escaped != input.as_str();
    let xss_detections = if changed {
        count_xss_patterns(input.as_str())
    } else {
        0
    };

    DisplayEscape {
        value: input.declassify(escaped, input.classification()),
        changed,
        xss_detections,
    }
}
