use engine::app::CorsPolicy;
use error_stack::{Report, ResultExt};
use repositories::postgres::{ConnectionDetails, PoolSettings};
use std::str::FromStr;
use std::time::Duration;

const DEFAULT_PORT: u16 = 3001;
const DEFAULT_DB_PORT: u16 = 5432;
const DEFAULT_DB_USER: &str = "postgres";
const DEFAULT_DB_NAME: &str = "postgres";
const DEFAULT_CORS_ORIGINS: &str = "http://localhost:3000";
const PRODUCTION: &str = "production";
const WILDCARD_ORIGIN: &str = "*";

#[derive(Debug, thiserror::Error)]
#[error("invalid configuration")]
pub struct ConfigError;

pub type ConfigResult<T> = Result<T, Report<ConfigError>>;

#[derive(Debug)]
pub struct AppConfig {
    pub port: u16,
    /// `None` runs the service without storage.
    pub database: Option<ConnectionDetails>,
    pub pool: PoolSettings,
    pub cors: CorsPolicy,
    pub metrics_enabled: bool,
}

impl AppConfig {
    pub fn from_env() -> ConfigResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> ConfigResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let database = match (var("DATABASE_URL"), var("DB_HOST")) {
            (Some(url), _) => Some(ConnectionDetails::Url(url)),
            (None, Some(host)) => Some(ConnectionDetails::Params {
                host,
                port: parse_or(var("DB_PORT"), "DB_PORT", DEFAULT_DB_PORT)?,
                user: var("DB_USER").unwrap_or_else(|| DEFAULT_DB_USER.to_string()),
                password: var("DB_PASSWORD"),
                dbname: var("DB_NAME").unwrap_or_else(|| DEFAULT_DB_NAME.to_string()),
            }),
            (None, None) => None,
        };

        let defaults = PoolSettings::default();
        let pool = PoolSettings {
            max_size: parse_or(var("DB_POOL_SIZE"), "DB_POOL_SIZE", defaults.max_size)?,
            acquire_timeout: Duration::from_secs(parse_or(
                var("DB_ACQUIRE_TIMEOUT_SECS"),
                "DB_ACQUIRE_TIMEOUT_SECS",
                defaults.acquire_timeout.as_secs(),
            )?),
        };

        let cors = if var("APP_ENV").is_some_and(|env| env == PRODUCTION) {
            let origins = var("CORS_ORIGINS").unwrap_or_else(|| DEFAULT_CORS_ORIGINS.to_string());
            let origins: Vec<String> = origins
                .split(',')
                .map(str::trim)
                .filter(|o| !o.is_empty())
                .map(String::from)
                .collect();
            if origins.iter().any(|o| o == WILDCARD_ORIGIN) {
                return Err(Report::new(ConfigError)
                    .attach("CORS_ORIGINS must name origins in production, '*' is not allowed"));
            }
            CorsPolicy::Origins(origins)
        } else {
            CorsPolicy::AnyOrigin
        };

        Ok(Self {
            port: parse_or(var("PORT"), "PORT", DEFAULT_PORT)?,
            database,
            pool,
            cors,
            metrics_enabled: var("TOPICS_METRICS").is_none_or(|v| !v.eq_ignore_ascii_case("false")),
        })
    }
}

fn parse_or<T: FromStr>(value: Option<String>, key: &str, default: T) -> ConfigResult<T>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match value {
        Some(value) => value
            .trim()
            .parse()
            .change_context(ConfigError)
            .attach_with(|| format!("{key} must be a number, got '{value}'")),
        None => Ok(default),
    }
}
