//! Configuration module
//!
//! The cleaner service is configured once at startup. Plain settings come from
//! environment variables (after loading `.env`), the shared API key comes from the
//! secret provider so a mounted secret file wins over the environment.

use std::path::PathBuf;

use crate::models::upload::ALLOWED_EXTENSIONS;
use crate::secrets::{EnvSecrets, LayeredSecrets, SecretProvider};

const SERVER_PORT: u16 = 5001;
const MAX_FILE_SIZE_MB: usize = 16;
const TOOL_TIMEOUT_SECS: u64 = 60;
const REQUEST_TIMEOUT_SECS: u64 = 300;
const HTTP_CONCURRENCY_LIMIT: usize = 64;

/// Name of the shared secret guarding `/metadata` and `/clean`
pub const API_KEY_SECRET: &str = "CLEANER_API_KEY";

/// Log output format
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl LogFormat {
    fn parse(value: &str) -> Self {
        if value.eq_ignore_ascii_case("json") {
            LogFormat::Json
        } else {
            LogFormat::Text
        }
    }
}

/// Cleaner service configuration
#[derive(Clone, Debug)]
pub struct Config {
    pub server_port: u16,
    pub environment: String,
    pub cors_origins: Vec<String>,
    /// `None` runs the service in open mode (no key check)
    pub api_key: Option<String>,
    pub exiftool_path: String,
    pub tool_timeout_secs: u64,
    /// Parent directory for per-request workspaces; system temp dir when unset
    pub workspace_root: Option<PathBuf>,
    pub max_file_size_bytes: usize,
    pub allowed_extensions: Vec<String>,
    pub request_timeout_secs: u64,
    pub http_concurrency_limit: usize,
    pub log_format: LogFormat,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_port: SERVER_PORT,
            environment: "development".to_string(),
            cors_origins: vec!["*".to_string()],
            api_key: None,
            exiftool_path: "exiftool".to_string(),
            tool_timeout_secs: TOOL_TIMEOUT_SECS,
            workspace_root: None,
            max_file_size_bytes: MAX_FILE_SIZE_MB * 1024 * 1024,
            allowed_extensions: ALLOWED_EXTENSIONS.iter().map(|s| s.to_string()).collect(),
            request_timeout_secs: REQUEST_TIMEOUT_SECS,
            http_concurrency_limit: HTTP_CONCURRENCY_LIMIT,
            log_format: LogFormat::Text,
        }
    }
}

fn parse_or<T: std::str::FromStr>(vars: &dyn SecretProvider, name: &str, default: T) -> T {
    match vars.lookup(name) {
        Some(raw) => match raw.trim().parse::<T>() {
            Ok(v) => v,
            Err(_) => {
                tracing::warn!(var = %name, value = %raw, "Ignoring unparsable setting, using default");
                default
            }
        },
        None => default,
    }
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .collect()
}

impl Config {
    /// Load from the process environment and the mounted secret directory.
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();
        let secrets = LayeredSecrets::from_env();
        let config = Self::from_lookup(&secrets, &EnvSecrets);
        config.validate()?;
        Ok(config)
    }

    /// Build from explicit sources: `secrets` for the API key, `vars` for plain settings.
    pub fn from_lookup(secrets: &dyn SecretProvider, vars: &dyn SecretProvider) -> Self {
        let defaults = Config::default();

        let environment = vars
            .lookup("ENVIRONMENT")
            .or_else(|| vars.lookup("APP_ENV"))
            .unwrap_or(defaults.environment);

        let cors_origins = vars
            .lookup("CORS_ORIGINS")
            .map(|raw| {
                raw.split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect()
            })
            .unwrap_or(defaults.cors_origins);

        let allowed_extensions = vars
            .lookup("ALLOWED_EXTENSIONS")
            .map(|raw| split_list(&raw))
            .unwrap_or(defaults.allowed_extensions);

        let max_file_size_mb = parse_or(vars, "MAX_FILE_SIZE_MB", MAX_FILE_SIZE_MB);

        Self {
            server_port: parse_or(vars, "PORT", defaults.server_port),
            environment,
            cors_origins,
            api_key: secrets.lookup(API_KEY_SECRET),
            exiftool_path: vars
                .lookup("EXIFTOOL_PATH")
                .unwrap_or(defaults.exiftool_path),
            tool_timeout_secs: parse_or(vars, "TOOL_TIMEOUT_SECS", defaults.tool_timeout_secs),
            workspace_root: vars.lookup("WORKSPACE_ROOT").map(PathBuf::from),
            max_file_size_bytes: max_file_size_mb * 1024 * 1024,
            allowed_extensions,
            request_timeout_secs: parse_or(
                vars,
                "REQUEST_TIMEOUT_SECS",
                defaults.request_timeout_secs,
            ),
            http_concurrency_limit: parse_or(
                vars,
                "HTTP_CONCURRENCY_LIMIT",
                defaults.http_concurrency_limit,
            ),
            log_format: vars
                .lookup("LOG_FORMAT")
                .map(|v| LogFormat::parse(&v))
                .unwrap_or_default(),
        }
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.allowed_extensions.is_empty() {
            return Err(anyhow::anyhow!("ALLOWED_EXTENSIONS must not be empty"));
        }
        if self.max_file_size_bytes == 0 {
            return Err(anyhow::anyhow!("MAX_FILE_SIZE_MB must be greater than 0"));
        }
        if self.tool_timeout_secs == 0 {
            return Err(anyhow::anyhow!("TOOL_TIMEOUT_SECS must be greater than 0"));
        }
        if self.request_timeout_secs < self.tool_timeout_secs {
            return Err(anyhow::anyhow!(
                "REQUEST_TIMEOUT_SECS ({}) must be at least TOOL_TIMEOUT_SECS ({})",
                self.request_timeout_secs,
                self.tool_timeout_secs
            ));
        }
        if self.http_concurrency_limit == 0 {
            return Err(anyhow::anyhow!("HTTP_CONCURRENCY_LIMIT must be greater than 0"));
        }
        if self.exiftool_path.trim().is_empty() {
            return Err(anyhow::anyhow!("EXIFTOOL_PATH must not be empty"));
        }
        Ok(())
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        let env = self.environment.to_lowercase();
        env == "production" || env == "prod"
    }

    pub fn auth_enabled(&self) -> bool {
        self.api_key.is_some()
    }
}

/// Database credentials resolved from the same secret store as the API key.
///
/// The cleaner never connects to a database; front ends keeping upload history
/// resolve their connection settings through this lookup.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DbCredentials {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub database: String,
}

impl DbCredentials {
    /// `DB_USER`/`DB_PASSWORD` from `secrets`, host, port and name from `vars`.
    pub fn resolve(secrets: &dyn SecretProvider, vars: &dyn SecretProvider) -> Self {
        Self {
            host: vars
                .lookup("DB_HOST")
                .unwrap_or_else(|| "metacleaner-db".to_string()),
            port: parse_or(vars, "DB_PORT", 3306),
            user: secrets
                .lookup("DB_USER")
                .unwrap_or_else(|| "REPLACE_USER".to_string()),
            password: secrets
                .lookup("DB_PASSWORD")
                .unwrap_or_else(|| "REPLACE_PASSWORD".to_string()),
            database: vars
                .lookup("DB_NAME")
                .unwrap_or_else(|| "dbMetaCleaner".to_string()),
        }
    }

    pub fn from_env() -> Self {
        Self::resolve(&LayeredSecrets::from_env(), &EnvSecrets)
    }
}
