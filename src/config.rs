//! Environment configuration for the binary.

use std::path::PathBuf;
use std::str::FromStr;

use envconfig::Envconfig;

#[derive(Envconfig, Clone, Debug)]
pub struct Config {
    #[envconfig(from = "PIPELINE_LOG_LEVEL", default = "info")]
    pub log_level: EnvLevel,

    /// JSON fixture backing the local collaborator.
    #[envconfig(from = "PIPELINE_FIXTURE", default = "fixtures/pipeline.json")]
    pub fixture: PathBuf,

    /// JSON-lines file the log store appends to.
    #[envconfig(from = "PIPELINE_EVENT_LOG", default = "sinkguard-events.jsonl")]
    pub event_log: PathBuf,

    /// Directory rendered submissions are written into.
    #[envconfig(from = "PIPELINE_OUTBOX_DIR", default = "outbox")]
    pub outbox_dir: PathBuf,

    #[envconfig(from = "PIPELINE_GATEWAY_NAME", default = "ExternalGateway")]
    pub gateway_name: String,

    #[envconfig(from = "PIPELINE_GATEWAY_PORT", default = "8100")]
    pub gateway_port: u16,

    #[envconfig(from = "PIPELINE_VAULT_KEY", default = "")]
    pub vault_key: String,
}

impl Config {
    pub fn log_level(&self) -> log::LevelFilter {
        self.log_level.0
    }
}

#[derive(Debug, Clone, Copy)]
pub struct EnvLevel(pub log::LevelFilter);

#[derive(Debug, PartialEq, Eq)]
pub struct ParseEnvLevelError;

impl FromStr for EnvLevel {
    type Err = ParseEnvLevelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let level = log::LevelFilter::from_str(s.trim()).map_err(|_| ParseEnvLevelError)?;

        Ok(EnvLevel(level))
    }
}
