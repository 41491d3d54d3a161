use once_cell::sync::Lazy;
use std::{fs, path::PathBuf, time::Duration};

use chrono::NaiveTime;
use thiserror::Error;
use turnover_core::settings::{
    AdvisorWeights, DEFAULT_AUDIT_PAGE_SIZE, DEFAULT_DUPLICATE_RACE_WINDOW,
    DEFAULT_SUGGESTION_LIMIT, TurnoverSettings,
};

use super::{
    models::{
        AdvisorConfig, AuditConfig, Config, ConfigMetadata, ConfigWarnings, DEFAULT_HOST,
        DEFAULT_MAX_CONNECTIONS, DEFAULT_PORT, DatabaseConfig, ServerConfig, SyncConfig,
    },
    sources::{EnvConfig, FileAdvisorConfig, FileConfig, FileDatabaseConfig},
};

static DEFAULT_CONFIG_LOCATIONS: Lazy<Vec<PathBuf>> = Lazy::new(|| {
    vec![
        PathBuf::from("turnover.toml"),
        PathBuf::from("config/turnover.toml"),
    ]
});

#[derive(Debug, Default, Clone)]
struct ConfigLoaderOptions {
    config_path: Option<PathBuf>,
    env_file: Option<PathBuf>,
}

#[derive(Debug, Default)]
pub struct ConfigLoader {
    options: ConfigLoaderOptions,
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config_path<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.options.config_path = Some(path.into());
        self
    }

    pub fn with_env_file<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.options.env_file = Some(path.into());
        self
    }

    /// Load `.env`, then the TOML file, then the process environment.
    pub fn load(&self) -> Result<ConfigLoad, ConfigLoadError> {
        let env_file_loaded = match &self.options.env_file {
            Some(path) => dotenvy::from_path(path).map(|_| true).or_else(|err| match err {
                dotenvy::Error::Io(_) => Ok(false),
                _ => Err(err),
            })?,
            None => dotenvy::dotenv().map(|_| true).or_else(|err| match err {
                dotenvy::Error::Io(_) => Ok(false),
                _ => Err(err),
            })?,
        };

        let mut load = self.load_with_env(EnvConfig::gather())?;
        load.config.metadata.env_file_loaded = env_file_loaded;
        Ok(load)
    }

    /// Same as [`ConfigLoader::load`] over an explicit environment snapshot,
    /// without touching `.env`.
    pub fn load_with_env(&self, env: EnvConfig) -> Result<ConfigLoad, ConfigLoadError> {
        let (file_config, config_path) = self.load_file_config(&env)?;
        let (config, warnings) = compose_config(file_config, env, config_path)?;
        Ok(ConfigLoad { config, warnings })
    }

    fn load_file_config(
        &self,
        env: &EnvConfig,
    ) -> Result<(Option<FileConfig>, Option<PathBuf>), ConfigLoadError> {
        let explicit = self
            .options
            .config_path
            .clone()
            .or_else(|| env.config_path.clone());

        let path = match explicit {
            Some(path) if !path.exists() => {
                return Err(ConfigLoadError::MissingConfig { path });
            }
            Some(path) => path,
            None => match DEFAULT_CONFIG_LOCATIONS
                .iter()
                .find(|candidate| candidate.exists())
            {
                Some(path) => path.clone(),
                None => return Ok((None, None)),
            },
        };

        let contents = fs::read_to_string(&path).map_err(|source| ConfigLoadError::Io {
            path: path.clone(),
            source,
        })?;
        let file_config: FileConfig =
            toml::from_str(&contents).map_err(|source| ConfigLoadError::Parse {
                path: path.clone(),
                source,
            })?;

        Ok((Some(file_config), Some(path)))
    }
}

fn compose_config(
    file_config: Option<FileConfig>,
    env: EnvConfig,
    config_path: Option<PathBuf>,
) -> Result<(Config, ConfigWarnings), ConfigLoadError> {
    let mut warnings = ConfigWarnings::default();
    if file_config.is_none() {
        warnings.push_with_hint(
            "No turnover.toml detected; using defaults and environment variables",
            "Set TURNOVER_CONFIG_PATH or pass --config to point at a file",
        );
    }

    let FileConfig {
        server: file_server,
        database: file_database,
        sync: file_sync,
        audit: file_audit,
        advisor: file_advisor,
    } = file_config.unwrap_or_default();

    let server = ServerConfig {
        host: env
            .server_host
            .clone()
            .or(file_server.host)
            .unwrap_or_else(|| DEFAULT_HOST.to_string()),
        port: env.server_port.or(file_server.port).unwrap_or(DEFAULT_PORT),
    };

    let database = resolve_database(&env, file_database, &mut warnings)?;

    let default_checkout_time = match file_sync.default_checkout_time {
        Some(raw) => parse_time(&raw).ok_or_else(|| ConfigLoadError::InvalidValue {
            field: "sync.default_checkout_time",
            message: format!("'{raw}' is not a HH:MM time"),
        })?,
        None => TurnoverSettings::default().default_checkout_time,
    };

    let page_size = file_audit.page_size.unwrap_or(DEFAULT_AUDIT_PAGE_SIZE);
    if page_size == 0 {
        return Err(ConfigLoadError::InvalidValue {
            field: "audit.page_size",
            message: "must be at least 1".into(),
        });
    }
    let duplicate_race_window = match file_audit.duplicate_race_window {
        Some(raw) => parse_window(&raw)?,
        None => DEFAULT_DUPLICATE_RACE_WINDOW,
    };

    let advisor = resolve_advisor(file_advisor)?;

    let config = Config {
        server,
        database,
        sync: SyncConfig {
            default_checkout_time,
        },
        audit: AuditConfig {
            page_size,
            duplicate_race_window,
        },
        advisor,
        metadata: ConfigMetadata {
            config_path,
            env_file_loaded: false,
        },
    };
    Ok((config, warnings))
}

fn resolve_database(
    env: &EnvConfig,
    file_database: FileDatabaseConfig,
    warnings: &mut ConfigWarnings,
) -> Result<DatabaseConfig, ConfigLoadError> {
    let url = env
        .database_url
        .clone()
        .or(file_database.url)
        .map(|url| url.trim().to_string())
        .filter(|url| !url.is_empty());

    if let Some(url) = &url
        && !(url.starts_with("postgres://") || url.starts_with("postgresql://"))
    {
        return Err(ConfigLoadError::InvalidValue {
            field: "database.url",
            message: "must start with postgres:// or postgresql://".into(),
        });
    }
    if url.is_none() {
        warnings.push_with_hint(
            "No database URL configured",
            "Set DATABASE_URL before running serve, reconcile or backfill",
        );
    }

    let max_connections = env
        .database_max_connections
        .or(file_database.max_connections)
        .unwrap_or(DEFAULT_MAX_CONNECTIONS)
        .max(1);

    Ok(DatabaseConfig {
        url,
        max_connections,
    })
}

fn resolve_advisor(file: FileAdvisorConfig) -> Result<AdvisorConfig, ConfigLoadError> {
    let defaults = AdvisorWeights::default();
    let weights = AdvisorWeights {
        proximity: file.proximity_weight.unwrap_or(defaults.proximity),
        workload: file.workload_weight.unwrap_or(defaults.workload),
        rating: file.rating_weight.unwrap_or(defaults.rating),
    };

    let all = [weights.proximity, weights.workload, weights.rating];
    if all.iter().any(|w| !w.is_finite() || *w < 0.0) || all.iter().sum::<f64>() <= 0.0 {
        return Err(ConfigLoadError::InvalidValue {
            field: "advisor",
            message: "weights must be non-negative with a positive sum".into(),
        });
    }

    Ok(AdvisorConfig {
        weights,
        default_limit: file.default_limit.unwrap_or(DEFAULT_SUGGESTION_LIMIT).max(1),
    })
}

fn parse_time(raw: &str) -> Option<NaiveTime> {
    let raw = raw.trim();
    NaiveTime::parse_from_str(raw, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M:%S"))
        .ok()
}

fn parse_window(raw: &str) -> Result<Duration, ConfigLoadError> {
    humantime::parse_duration(raw.trim()).map_err(|err| ConfigLoadError::InvalidValue {
        field: "audit.duplicate_race_window",
        message: err.to_string(),
    })
}

#[derive(Debug, Error)]
pub enum ConfigLoadError {
    #[error("configuration file missing: {path}")]
    MissingConfig { path: PathBuf },
    #[error("failed to read configuration {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse configuration {path}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("invalid value for {field}: {message}")]
    InvalidValue { field: &'static str, message: String },
    #[error(transparent)]
    EnvFile(#[from] dotenvy::Error),
}

#[derive(Debug)]
pub struct ConfigLoad {
    pub config: Config,
    pub warnings: ConfigWarnings,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_config(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new()
            .suffix(".toml")
            .tempfile()
            .expect("temp file");
        file.write_all(contents.as_bytes()).expect("write config");
        file
    }

    #[test]
    fn file_values_are_applied() {
        let file = write_config(
            r#"
            [server]
            port = 9090

            [database]
            url = "postgres://turnover@localhost/turnover"
            max_connections = 4

            [sync]
            default_checkout_time = "11:30"

            [audit]
            page_size = 200
            duplicate_race_window = "2m"

            [advisor]
            proximity_weight = 0.6
            default_limit = 3
            "#,
        );

        let load = ConfigLoader::new()
            .with_config_path(file.path())
            .load_with_env(EnvConfig::default())
            .expect("config loads");
        let config = load.config;

        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 9090);
        assert_eq!(config.database.max_connections, 4);
        assert_eq!(
            config.sync.default_checkout_time,
            NaiveTime::from_hms_opt(11, 30, 0).unwrap()
        );
        assert_eq!(config.audit.page_size, 200);
        assert_eq!(config.audit.duplicate_race_window, Duration::from_secs(120));
        assert_eq!(config.advisor.weights.proximity, 0.6);
        assert_eq!(config.advisor.weights.workload, 0.35);
        assert_eq!(config.advisor.default_limit, 3);
        assert!(load.warnings.is_empty());
        assert_eq!(config.metadata.config_path.as_deref(), Some(file.path()));
    }

    #[test]
    fn environment_overrides_file() {
        let file = write_config(
            r#"
            [server]
            host = "127.0.0.1"
            port = 9090

            [database]
            url = "postgres://file@localhost/turnover"
            "#,
        );
        let env = EnvConfig {
            server_port: Some(7070),
            database_url: Some("postgresql://env@db/turnover".into()),
            ..EnvConfig::default()
        };

        let config = ConfigLoader::new()
            .with_config_path(file.path())
            .load_with_env(env)
            .expect("config loads")
            .config;
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 7070);
        assert_eq!(
            config.database.url.as_deref(),
            Some("postgresql://env@db/turnover")
        );
    }

    #[test]
    fn explicit_missing_file_is_an_error() {
        let dir = tempfile::tempdir().expect("temp dir");
        let missing = dir.path().join("absent.toml");
        let err = ConfigLoader::new()
            .with_config_path(&missing)
            .load_with_env(EnvConfig::default())
            .unwrap_err();
        assert!(matches!(err, ConfigLoadError::MissingConfig { path } if path == missing));
    }

    #[test]
    fn malformed_toml_reports_path() {
        let file = write_config("[server\nport = ");
        let err = ConfigLoader::new()
            .with_config_path(file.path())
            .load_with_env(EnvConfig::default())
            .unwrap_err();
        assert!(matches!(err, ConfigLoadError::Parse { .. }));
    }

    #[test]
    fn invalid_values_are_rejected() {
        for contents in [
            "[audit]\nduplicate_race_window = \"soon\"",
            "[audit]\npage_size = 0",
            "[sync]\ndefault_checkout_time = \"25:99\"",
            "[advisor]\nproximity_weight = 0.0\nworkload_weight = 0.0\nrating_weight = 0.0",
            "[database]\nurl = \"mysql://localhost/turnover\"",
        ] {
            let file = write_config(contents);
            let err = ConfigLoader::new()
                .with_config_path(file.path())
                .load_with_env(EnvConfig::default())
                .unwrap_err();
            assert!(
                matches!(err, ConfigLoadError::InvalidValue { .. }),
                "{contents} -> {err}"
            );
        }
    }

    #[test]
    fn settings_mirror_config_sections() {
        let file = write_config("[audit]\npage_size = 50\n[advisor]\ndefault_limit = 8");
        let config = ConfigLoader::new()
            .with_config_path(file.path())
            .load_with_env(EnvConfig::default())
            .expect("config loads")
            .config;

        let settings = config.turnover_settings();
        assert_eq!(settings.audit_page_size, 50);
        assert_eq!(settings.default_suggestion_limit, 8);
        assert_eq!(settings.duplicate_race_window, DEFAULT_DUPLICATE_RACE_WINDOW);
    }

    #[test]
    fn explicit_env_file_is_reported_when_present() {
        let config = write_config("[server]\nport = 8181");
        let mut env_file = tempfile::NamedTempFile::new().expect("temp env file");
        writeln!(env_file, "TURNOVER_ENV_FILE_MARKER=1").expect("write env file");

        let loaded = ConfigLoader::new()
            .with_config_path(config.path())
            .with_env_file(env_file.path())
            .load()
            .expect("config loads");
        assert!(loaded.config.metadata.env_file_loaded);
        assert_eq!(
            std::env::var("TURNOVER_ENV_FILE_MARKER").as_deref(),
            Ok("1")
        );

        let dir = tempfile::tempdir().expect("temp dir");
        let missing = ConfigLoader::new()
            .with_config_path(config.path())
            .with_env_file(dir.path().join("absent.env"))
            .load()
            .expect("missing env file is tolerated");
        assert!(!missing.config.metadata.env_file_loaded);
    }
}
