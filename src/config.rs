use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::Path;
use thiserror::Error;
use validator::Validate;

use crate::models::{Criteria, DEFAULT_MATCH_THRESHOLD};

/// Errors raised while loading settings
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Invalid criteria: {0}")]
    Invalid(#[from] validator::ValidationErrors),
}

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    #[serde(default = "default_match_threshold")]
    pub match_threshold: f64,
    pub criteria: CriteriaSettings,
    #[serde(default)]
    pub schedule: ScheduleSettings,
    #[serde(default)]
    pub ledger: LedgerSettings,
    pub source: SourceSettings,
    #[serde(default)]
    pub notifications: NotificationSettings,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CriteriaSettings {
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub companies: Vec<String>,
    pub location: Option<String>,
    pub experience_level: Option<String>,
    pub job_type: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScheduleSettings {
    #[serde(default = "default_interval_minutes")]
    pub interval_minutes: u64,
}

impl Default for ScheduleSettings {
    fn default() -> Self {
        Self { interval_minutes: default_interval_minutes() }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LedgerSettings {
    #[serde(default = "default_ledger_url")]
    pub url: String,
    #[serde(default = "default_retention_days")]
    pub retention_days: u32,
    pub max_connections: Option<u32>,
}

impl Default for LedgerSettings {
    fn default() -> Self {
        Self {
            url: default_ledger_url(),
            retention_days: default_retention_days(),
            max_connections: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SourceSettings {
    pub endpoint: String,
    #[serde(default = "default_results_wanted")]
    pub results_wanted: u32,
    #[serde(default = "default_hours_old")]
    pub hours_old: u32,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NotificationSettings {
    #[serde(default)]
    pub email: EmailSettings,
    #[serde(default)]
    pub whatsapp: WhatsAppSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EmailSettings {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_smtp_server")]
    pub smtp_server: String,
    #[serde(default = "default_smtp_port")]
    pub smtp_port: u16,
    pub sender: Option<String>,
    pub password: Option<String>,
    pub recipient: Option<String>,
}

impl Default for EmailSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            smtp_server: default_smtp_server(),
            smtp_port: default_smtp_port(),
            sender: None,
            password: None,
            recipient: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct WhatsAppSettings {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_whatsapp_api_base")]
    pub api_base: String,
    pub api_token: Option<String>,
    pub phone_number_id: Option<String>,
    pub recipient_phone: Option<String>,
}

impl Default for WhatsAppSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            api_base: default_whatsapp_api_base(),
            api_token: None,
            phone_number_id: None,
            recipient_phone: None,
        }
    }
}

fn default_match_threshold() -> f64 { DEFAULT_MATCH_THRESHOLD }
fn default_interval_minutes() -> u64 { 5 }
fn default_ledger_url() -> String { "sqlite://jobs.db".to_string() }
fn default_retention_days() -> u32 { 30 }
fn default_results_wanted() -> u32 { 25 }
fn default_hours_old() -> u32 { 24 }
fn default_timeout_secs() -> u64 { 30 }
fn default_smtp_server() -> String { "smtp.gmail.com".to_string() }
fn default_smtp_port() -> u16 { 587 }
fn default_whatsapp_api_base() -> String { "https://graph.facebook.com/v21.0".to_string() }

/// Secrets read from the environment and the settings key they override
const SECRET_OVERRIDES: &[(&str, &str)] = &[
    ("DATABASE_URL", "ledger.url"),
    ("SMTP_SENDER_EMAIL", "notifications.email.sender"),
    ("SMTP_SENDER_PASSWORD", "notifications.email.password"),
    ("SMTP_RECIPIENT_EMAIL", "notifications.email.recipient"),
    ("WHATSAPP_API_TOKEN", "notifications.whatsapp.api_token"),
    ("WHATSAPP_PHONE_NUMBER_ID", "notifications.whatsapp.phone_number_id"),
    ("WHATSAPP_RECIPIENT_PHONE", "notifications.whatsapp.recipient_phone"),
];

impl Settings {
    /// Load configuration from files and environment variables
    ///
    /// Configuration is loaded in the following order (later overrides earlier):
    /// 1. Default values in the struct
    /// 2. Configuration file (config/default.toml)
    /// 3. Local overrides (config/local.toml)
    /// 4. Environment variables (prefixed with JOBSCOUT__)
    /// 5. Secrets such as SMTP_SENDER_PASSWORD
    pub fn load() -> Result<Self, SettingsError> {
        Ok(layered(None)?.try_deserialize()?)
    }

    /// Load configuration from a custom path
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, SettingsError> {
        Ok(layered(Some(path.as_ref()))?.try_deserialize()?)
    }

    /// Build the validated matching criteria
    pub fn criteria(&self) -> Result<Criteria, SettingsError> {
        let c = &self.criteria;
        let criteria = Criteria {
            skills: c.skills.clone(),
            keywords: c.keywords.clone(),
            companies: c.companies.clone(),
            location: non_empty(&c.location),
            experience_level: non_empty(&c.experience_level),
            job_type: non_empty(&c.job_type),
            match_threshold: self.match_threshold,
        };

        criteria.validate()?;
        Ok(criteria)
    }
}

impl LedgerSettings {
    /// Load only the `[ledger]` section, ignoring criteria and source
    ///
    /// Falls back to the defaults when the section is absent.
    pub fn load(path: Option<&Path>) -> Result<Self, SettingsError> {
        match layered(path)?.get::<LedgerSettings>("ledger") {
            Ok(settings) => Ok(settings),
            Err(ConfigError::NotFound(_)) => Ok(LedgerSettings::default()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Files, then `JOBSCOUT__` variables, then secrets
fn layered(path: Option<&Path>) -> Result<Config, SettingsError> {
    let builder = match path {
        Some(path) => Config::builder().add_source(File::from(path)),
        None => Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false)),
    };

    // e.g., JOBSCOUT__SCHEDULE__INTERVAL_MINUTES -> schedule.interval_minutes
    let settings = builder.add_source(env_source()).build()?;

    Ok(substitute_env_vars(settings)?)
}

/// Criteria lists that can be overridden with comma separated env values
const LIST_KEYS: &[&str] = &["criteria.skills", "criteria.keywords", "criteria.companies"];

fn env_source() -> Environment {
    // e.g., JOBSCOUT__CRITERIA__SKILLS=Rust,SQL -> criteria.skills
    LIST_KEYS.iter().fold(
        Environment::with_prefix("JOBSCOUT")
            .prefix_separator("__")
            .separator("__")
            .list_separator(",")
            .try_parsing(true),
        |env, key| env.with_list_parse_key(key),
    )
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value
        .as_ref()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Apply secrets from well-known environment variables
fn substitute_env_vars(settings: Config) -> Result<Config, ConfigError> {
    let mut builder = Config::builder().add_source(settings);

    for (var, key) in SECRET_OVERRIDES {
        if let Ok(value) = std::env::var(var) {
            if !value.is_empty() {
                builder = builder.set_override(*key, value)?;
            }
        }
    }

    builder.build()
}
