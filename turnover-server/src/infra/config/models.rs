use std::{path::PathBuf, time::Duration};

use chrono::NaiveTime;
use turnover_core::settings::{
    AdvisorWeights, DEFAULT_AUDIT_PAGE_SIZE, DEFAULT_DUPLICATE_RACE_WINDOW,
    DEFAULT_SUGGESTION_LIMIT, TurnoverSettings,
};

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_MAX_CONNECTIONS: u32 = 10;

#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub sync: SyncConfig,
    pub audit: AuditConfig,
    pub advisor: AdvisorConfig,
    pub metadata: ConfigMetadata,
}

impl Default for Config {
    fn default() -> Self {
        let settings = TurnoverSettings::default();
        Self {
            server: ServerConfig {
                host: DEFAULT_HOST.to_string(),
                port: DEFAULT_PORT,
            },
            database: DatabaseConfig {
                url: None,
                max_connections: DEFAULT_MAX_CONNECTIONS,
            },
            sync: SyncConfig {
                default_checkout_time: settings.default_checkout_time,
            },
            audit: AuditConfig {
                page_size: DEFAULT_AUDIT_PAGE_SIZE,
                duplicate_race_window: DEFAULT_DUPLICATE_RACE_WINDOW,
            },
            advisor: AdvisorConfig {
                weights: AdvisorWeights::default(),
                default_limit: DEFAULT_SUGGESTION_LIMIT,
            },
            metadata: ConfigMetadata::default(),
        }
    }
}

impl Config {
    /// Knobs handed to the domain services.
    pub fn turnover_settings(&self) -> TurnoverSettings {
        TurnoverSettings {
            default_checkout_time: self.sync.default_checkout_time,
            audit_page_size: self.audit.page_size,
            duplicate_race_window: self.audit.duplicate_race_window,
            advisor_weights: self.advisor.weights,
            default_suggestion_limit: self.advisor.default_limit,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseConfig {
    pub url: Option<String>,
    pub max_connections: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncConfig {
    pub default_checkout_time: NaiveTime,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditConfig {
    pub page_size: usize,
    pub duplicate_race_window: Duration,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AdvisorConfig {
    pub weights: AdvisorWeights,
    pub default_limit: usize,
}

#[derive(Debug, Clone, Default)]
pub struct ConfigMetadata {
    pub config_path: Option<PathBuf>,
    pub env_file_loaded: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigWarning {
    pub message: String,
    pub hint: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct ConfigWarnings {
    pub items: Vec<ConfigWarning>,
}

impl ConfigWarnings {
    pub fn push(&mut self, message: impl Into<String>) {
        self.items.push(ConfigWarning {
            message: message.into(),
            hint: None,
        });
    }

    pub fn push_with_hint(&mut self, message: impl Into<String>, hint: impl Into<String>) {
        self.items.push(ConfigWarning {
            message: message.into(),
            hint: Some(hint.into()),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
