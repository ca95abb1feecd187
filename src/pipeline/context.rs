//! Per-run state.
//!
//! `UserContext` is the single mutable aggregate of one run. It is created by
//! the orchestrator, filled in stage by stage, and dropped when the run ends.

use crate::classification::{Classification, ClassifiedValue};
use crate::config::Config;

use super::transform::{DisplaySafeProfile, LocalizedInstruments};

/// Server connection properties, classified field by field.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: ClassifiedValue<String>,
    pub access_code: ClassifiedValue<String>,
    pub database_table: ClassifiedValue<String>,
    pub transaction_key: ClassifiedValue<String>,
    /// Display label for the password prompt. Not a secret.
    pub password_label: ClassifiedValue<String>,
}

impl ServerConfig {
    pub fn from_fields(
        host: &str,
        access_code: &str,
        database_table: &str,
        transaction_key: &str,
        password_label: &str,
    ) -> Self {
        Self {
            host: ClassifiedValue::new(host.to_string(), Classification::SystemInternal),
            access_code: ClassifiedValue::new(access_code.to_string(), Classification::Credential),
            database_table: ClassifiedValue::new(
                database_table.to_string(),
                Classification::SystemInternal,
            ),
            transaction_key: ClassifiedValue::new(
                transaction_key.to_string(),
                Classification::Credential,
            ),
            password_label: ClassifiedValue::plaintext(password_label.to_string()),
        }
    }

    /// The four host fields handed to the submission stage.
    ///
    /// The password label is display text and is not part of the descriptor.
    pub fn host_descriptor(&self) -> Vec<ClassifiedValue<String>> {
        vec![
            self.host.clone(),
            self.access_code.clone(),
            self.database_table.clone(),
            self.transaction_key.clone(),
        ]
    }
}

/// Values a run needs besides the user id.
#[derive(Debug, Clone)]
pub struct PipelineSettings {
    pub gateway_name: String,
    pub gateway_port: u16,
    pub vault_key: ClassifiedValue<String>,
}

impl PipelineSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            gateway_name: config.gateway_name.clone(),
            gateway_port: config.gateway_port,
            vault_key: ClassifiedValue::new(config.vault_key.clone(), Classification::Credential),
        }
    }
}

/// Raw positional collection as returned by a provider. `None` marks a null
/// element.
pub type RawCollection = Vec<Option<ClassifiedValue<String>>>;

/// Everything gathered for one user during one run.
#[derive(Debug)]
pub struct UserContext {
    pub user_id: ClassifiedValue<String>,
    pub config: Option<ServerConfig>,
    pub card: Option<ClassifiedValue<String>>,
    pub profile: Option<RawCollection>,
    pub instruments: Option<RawCollection>,
    pub identity: Option<ClassifiedValue<String>>,
    pub display_profile: Option<DisplaySafeProfile>,
    pub localized: Option<LocalizedInstruments>,
}

impl UserContext {
    pub fn new(user_id: &str) -> Self {
        Self {
            user_id: ClassifiedValue::new(
                user_id.to_string(),
                Classification::PersonallyIdentifiable,
            ),
            config: None,
            card: None,
            profile: None,
            instruments: None,
            identity: None,
            display_profile: None,
            localized: None,
        }
    }
}
