//! Transform stages.
//!
//! Both stages are whole-collection, element-wise transforms that return a
//! collection of the same length. A missing or empty input, or any null
//! element, aborts the whole stage with one programmer note; no partial
//! output is returned.

use crate::classification::{ClassifiedValue, MessageBuilder};
use crate::collaborators::Scrubber;
use crate::error::PipelineError;
use crate::events::EventRouter;
use crate::security::sanitizer::escape_for_display;
use crate::validation::check_collection;

/// Profile fields escaped for HTML display.
///
/// Only `sanitize_for_display` builds one, so holding a value of this type
/// means every field went through the display sanitizer.
#[derive(Debug, Clone)]
pub struct DisplaySafeProfile(Vec<ClassifiedValue<String>>);

impl DisplaySafeProfile {
    pub fn fields(&self) -> &[ClassifiedValue<String>] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&ClassifiedValue<String>> {
        self.0.get(index)
    }

    pub fn credential(&self) -> Option<&ClassifiedValue<String>> {
        self.get(1)
    }

    pub fn email(&self) -> Option<&ClassifiedValue<String>> {
        self.get(2)
    }

    pub fn notes(&self) -> Option<&ClassifiedValue<String>> {
        self.get(3)
    }
}

/// Instrument quotes rewritten for the user's locale.
#[derive(Debug, Clone)]
pub struct LocalizedInstruments(Vec<ClassifiedValue<String>>);

impl LocalizedInstruments {
    pub fn items(&self) -> &[ClassifiedValue<String>] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

fn present(
    collection: &[Option<ClassifiedValue<String>>],
) -> impl Iterator<Item = &ClassifiedValue<String>> {
    collection.iter().flatten()
}

/// Escape every profile field for display.
///
/// A field that changes under escaping raises a Security event: it is a
/// detection signal only, and the escaped value is kept.
pub fn sanitize_for_display(
    router: &EventRouter<'_>,
    profile: Option<&[Option<ClassifiedValue<String>>]>,
) -> Option<DisplaySafeProfile> {
    let router = router.for_stage("display_sanitize");

    if let Err(err) = check_collection(profile, "userProfileData") {
        log::warn!("{} STAGE_FAILED", router.context());
        router.programmer_error(err);
        return None;
    }
    let profile = profile.unwrap_or_default();

    let mut suspicious = 0;
    let mut fields = Vec::with_capacity(profile.len());

    for field in present(profile) {
        let escaped = escape_for_display(field);
        if escaped.changed {
            suspicious += 1;
            log::debug!(
                "{} PATTERN_DETECTED type=xss count={}",
                router.context(),
                escaped.xss_detections
            );
            router.security(
                MessageBuilder::new("Suspicious data found for user: ")
                    .value(&escaped.value)
                    .build(),
            );
        }
        fields.push(escaped.value);
    }

    log::info!(
        "{} STAGE_COMPLETE fields={} suspicious={}",
        router.context(),
        fields.len(),
        suspicious
    );

    Some(DisplaySafeProfile(fields))
}

/// Rewrite every instrument quote through the locale formatter.
pub fn localize_instruments(
    localizer: &dyn Scrubber,
    router: &EventRouter<'_>,
    raw: Option<&[Option<ClassifiedValue<String>>]>,
) -> Option<LocalizedInstruments> {
    let router = router.for_stage("localize");

    match try_localize(localizer, raw) {
        Ok(items) => {
            log::info!("{} STAGE_COMPLETE instruments={}", router.context(), items.len());
            Some(LocalizedInstruments(items))
        }
        Err(err) => {
            log::warn!("{} STAGE_FAILED", router.context());
            router.programmer_error(err);
            None
        }
    }
}

fn try_localize(
    localizer: &dyn Scrubber,
    raw: Option<&[Option<ClassifiedValue<String>>]>,
) -> Result<Vec<ClassifiedValue<String>>, PipelineError> {
    check_collection(raw, "rawFinancialInstrument")?;

    present(raw.unwrap_or_default())
        .map(|item| {
            let formatted = localizer.localize_instrument(item.as_str())?;
            Ok(ClassifiedValue::new(formatted, item.classification()))
        })
        .collect()
}
