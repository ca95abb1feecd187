//! Retrieval stages.
//!
//! Each stage validates its input, calls one collaborator, classifies and
//! validates what came back, and absorbs its own failure: the error becomes
//! exactly one log event and the stage returns `None`.

use sha2::{Digest, Sha256};

use crate::classification::{Classification, ClassifiedValue, MessageBuilder};
use crate::collaborators::{ConfigSource, DataProvider};
use crate::error::PipelineError;
use crate::events::EventRouter;
use crate::security::scrub::sanitize_card_for_display;
use crate::validation::check_presence;

use super::context::{RawCollection, ServerConfig};

/// Number of fields the configuration source must supply.
pub const CONFIG_FIELD_COUNT: usize = 5;

/// Minimum number of positional profile fields.
pub const MIN_PROFILE_FIELDS: usize = 2;

/// Profile field holding the user's credential.
pub const PROFILE_CREDENTIAL_INDEX: usize = 1;

fn check_user_id(user_id: &ClassifiedValue<String>) -> Result<(), PipelineError> {
    check_presence(Some(user_id.as_str())).or_err(PipelineError::InvalidUserId)
}

fn required_field(fields: &[Option<String>], index: usize) -> Result<&str, PipelineError> {
    let value = fields.get(index).and_then(|f| f.as_deref());
    check_presence(value).or_err(PipelineError::ConfigCorrupt)?;
    Ok(value.unwrap_or_default())
}

/// Load server connection properties.
///
/// On success the whole configuration is written to the programmer-note log
/// as one debug string, and the password label is echoed to the console.
/// A failure is Critical: without configuration nothing can be submitted.
pub fn load_configuration(source: &dyn ConfigSource, router: &EventRouter<'_>) -> Option<ServerConfig> {
    let router = router.for_stage("config_load");

    match try_load_configuration(source, &router) {
        Ok(config) => {
            log::info!("{} STAGE_COMPLETE fields={}", router.context(), CONFIG_FIELD_COUNT);
            Some(config)
        }
        Err(err) => {
            log::warn!("{} STAGE_FAILED", router.context());
            router.critical(err);
            None
        }
    }
}

fn try_load_configuration(
    source: &dyn ConfigSource,
    router: &EventRouter<'_>,
) -> Result<ServerConfig, PipelineError> {
    let fields = source.load_config()?;

    let config = ServerConfig::from_fields(
        required_field(&fields, 0)?,
        required_field(&fields, 1)?,
        required_field(&fields, 2)?,
        required_field(&fields, 3)?,
        required_field(&fields, 4)?,
    );

    router.display(
        &MessageBuilder::new("Password label is ")
            .value(&config.password_label)
            .build(),
    );

    let debug_note = MessageBuilder::new("Server configuration data loaded: parameters = ")
        .text("host = ")
        .value(&config.host)
        .text(" sensitive access code = ")
        .value(&config.access_code)
        .text(" database table = ")
        .value(&config.database_table)
        .text(" sensitive transaction key = ")
        .value(&config.transaction_key)
        .text(" password label = ")
        .value(&config.password_label)
        .build();
    router.programmer_note(debug_note);

    Ok(config)
}

/// Fetch the user's card token from the vault.
///
/// The raw token is audit-logged, then a masked copy is shown on the console.
pub fn retrieve_card_data(
    provider: &dyn DataProvider,
    router: &EventRouter<'_>,
    user_id: &ClassifiedValue<String>,
    vault_key: &ClassifiedValue<String>,
) -> Option<ClassifiedValue<String>> {
    let router = router.for_stage("card_retrieval");

    match try_retrieve_card_data(provider, &router, user_id, vault_key) {
        Ok(token) => {
            log::info!("{} STAGE_COMPLETE", router.context());
            Some(token)
        }
        Err(err) => {
            log::warn!("{} STAGE_FAILED", router.context());
            router.fail(err);
            None
        }
    }
}

fn try_retrieve_card_data(
    provider: &dyn DataProvider,
    router: &EventRouter<'_>,
    user_id: &ClassifiedValue<String>,
    vault_key: &ClassifiedValue<String>,
) -> Result<ClassifiedValue<String>, PipelineError> {
    check_user_id(user_id)?;

    let token = ClassifiedValue::new(
        provider.fetch_card_data(user_id.as_str(), vault_key.as_str())?,
        Classification::PaymentCard,
    );

    router.audit(
        MessageBuilder::new("Credit card data retrieved for user ")
            .value(user_id)
            .text(" (CC: ")
            .value(&token)
            .text(" )")
            .build(),
    );

    let display = sanitize_card_for_display(router.scrubber(), &token)?;
    router.display(
        &MessageBuilder::new("Safe credit card data displayed for user: ")
            .value(&display)
            .build(),
    );

    Ok(token)
}

/// Load the user's positional profile fields.
pub fn load_user_profile(
    provider: &dyn DataProvider,
    router: &EventRouter<'_>,
    user_id: &ClassifiedValue<String>,
) -> Option<RawCollection> {
    let router = router.for_stage("profile_load");

    match try_load_user_profile(provider, &router, user_id) {
        Ok(profile) => {
            log::info!("{} STAGE_COMPLETE fields={}", router.context(), profile.len());
            Some(profile)
        }
        Err(err) => {
            log::warn!("{} STAGE_FAILED", router.context());
            router.fail(err);
            None
        }
    }
}

fn try_load_user_profile(
    provider: &dyn DataProvider,
    router: &EventRouter<'_>,
    user_id: &ClassifiedValue<String>,
) -> Result<RawCollection, PipelineError> {
    check_user_id(user_id)?;

    let fields = provider.fetch_profile(user_id.as_str())?;
    if fields.len() < MIN_PROFILE_FIELDS {
        return Err(PipelineError::ProfileIncomplete);
    }

    let profile: RawCollection = fields
        .into_iter()
        .enumerate()
        .map(|(index, field)| {
            let classification = if index == PROFILE_CREDENTIAL_INDEX {
                Classification::Credential
            } else {
                Classification::PersonallyIdentifiable
            };
            field.map(|value| ClassifiedValue::new(value, classification))
        })
        .collect();

    let credential = profile[PROFILE_CREDENTIAL_INDEX]
        .as_ref()
        .ok_or(PipelineError::ProfileIncomplete)?;

    router.programmer_note(
        MessageBuilder::new("user ")
            .value(user_id)
            .text(" loaded from database; password = ")
            .value(credential)
            .build(),
    );
    router.audit(
        MessageBuilder::new("user ")
            .value(user_id)
            .text(" processed.")
            .build(),
    );

    Ok(profile)
}

/// Fetch quotes for the user's financial instruments from the gateway.
pub fn load_financial_instruments(
    provider: &dyn DataProvider,
    router: &EventRouter<'_>,
    user_id: &ClassifiedValue<String>,
    gateway: &str,
    port: u16,
) -> Option<RawCollection> {
    let router = router.for_stage("instrument_load");

    match try_load_financial_instruments(provider, &router, user_id, gateway, port) {
        Ok(instruments) => {
            log::info!(
                "{} STAGE_COMPLETE instruments={}",
                router.context(),
                instruments.len()
            );
            Some(instruments)
        }
        Err(err) => {
            log::warn!("{} STAGE_FAILED", router.context());
            router.fail(err);
            None
        }
    }
}

fn try_load_financial_instruments(
    provider: &dyn DataProvider,
    router: &EventRouter<'_>,
    user_id: &ClassifiedValue<String>,
    gateway: &str,
    port: u16,
) -> Result<RawCollection, PipelineError> {
    check_user_id(user_id)?;

    let instruments = provider
        .fetch_instruments(gateway, port)?
        .into_iter()
        .map(|item| item.map(|v| ClassifiedValue::new(v, Classification::PersonallyIdentifiable)))
        .collect();

    router.audit(
        MessageBuilder::new("financial instruments retrieved for user ")
            .value(user_id)
            .build(),
    );

    Ok(instruments)
}

/// Derive the user's identity number, formatted `NNN-NN-NNNN`.
pub fn identity_number(user_id: &str) -> String {
    let digest = Sha256::digest(user_id.as_bytes());
    let digits: String = digest
        .iter()
        .take(9)
        .map(|b| char::from(b'0' + b % 10))
        .collect();
    format!("{}-{}-{}", &digits[..3], &digits[3..5], &digits[5..])
}

/// Look up the user's identity number. Always succeeds for a non-empty id.
pub fn lookup_identity(
    router: &EventRouter<'_>,
    user_id: &ClassifiedValue<String>,
) -> Option<ClassifiedValue<String>> {
    let router = router.for_stage("identity_lookup");

    match check_user_id(user_id) {
        Ok(()) => Some(ClassifiedValue::new(
            identity_number(user_id.as_str()),
            Classification::PersonallyIdentifiable,
        )),
        Err(err) => {
            log::warn!("{} STAGE_FAILED", router.context());
            router.fail(err);
            None
        }
    }
}
