//! First-class classified values.
//!
//! A `ClassifiedValue` pairs a value with the classification it received at the
//! point it entered the pipeline. The tag is fixed for the lifetime of the
//! value; only a sanitizer may produce a copy with a lower-risk tag (see
//! `ClassifiedValue::declassify`, which is crate-private and only called from
//! `security`).

use std::fmt;

use super::model::Classification;

/// Placeholder printed by `Debug` for anything but plaintext.
pub const REDACTED_PLACEHOLDER: &str = "[REDACTED]";

#[derive(Clone, PartialEq, Eq)]
pub struct ClassifiedValue<T> {
    value: T,
    classification: Classification,
}

impl<T> ClassifiedValue<T> {
    /// Classify raw data as it arrives from a collaborator.
    pub fn new(value: T, classification: Classification) -> Self {
        Self {
            value,
            classification,
        }
    }

    pub fn plaintext(value: T) -> Self {
        Self::new(value, Classification::Plaintext)
    }

    pub fn classification(&self) -> Classification {
        self.classification
    }

    /// Borrow the raw value. Callers writing to a sink go through the
    /// clearance gate first.
    pub fn expose(&self) -> &T {
        &self.value
    }

    pub fn into_inner(self) -> T {
        self.value
    }

    /// Transform the value while keeping its classification.
    pub fn map<U, F>(self, f: F) -> ClassifiedValue<U>
    where
        F: FnOnce(T) -> U,
    {
        ClassifiedValue {
            value: f(self.value),
            classification: self.classification,
        }
    }

    /// Produce a value with a lower classification.
    ///
    /// Only sanitizers call this. A target riskier than the current tag is
    /// never applied: the result keeps the current tag.
    pub(crate) fn declassify<U>(&self, value: U, target: Classification) -> ClassifiedValue<U> {
        let classification = if target.risk() <= self.classification.risk() {
            target
        } else {
            self.classification
        };
        ClassifiedValue {
            value,
            classification,
        }
    }
}

impl ClassifiedValue<String> {
    pub fn is_empty(&self) -> bool {
        self.value.is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.value
    }
}

impl<T: fmt::Debug> fmt::Debug for ClassifiedValue<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = f.debug_struct("ClassifiedValue");
        out.field("classification", &self.classification);
        if self.classification == Classification::Plaintext {
            out.field("value", &self.value);
        } else {
            out.field("value", &REDACTED_PLACEHOLDER);
        }
        out.finish()
    }
}

/// Builds a log message out of literal text and classified parts.
///
/// The resulting message carries the join of every part's classification, so
/// a note that embeds a credential is itself a credential.
#[derive(Debug, Default)]
pub struct MessageBuilder {
    text: String,
    classification: Option<Classification>,
}

impl MessageBuilder {
    pub fn new(text: &str) -> Self {
        Self {
            text: text.to_string(),
            classification: None,
        }
    }

    pub fn text(mut self, text: &str) -> Self {
        self.text.push_str(text);
        self
    }

    pub fn value(mut self, part: &ClassifiedValue<String>) -> Self {
        self.text.push_str(part.as_str());
        self.classification = Some(match self.classification {
            Some(current) => current.join(part.classification()),
            None => part.classification(),
        });
        self
    }

    pub fn build(self) -> ClassifiedValue<String> {
        ClassifiedValue::new(
            self.text,
            self.classification.unwrap_or(Classification::Plaintext),
        )
    }
}
