use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;

use crate::recommend::domain::AgeBucket;
use crate::recommend::scoring::ScoringConfig;
use crate::recommend::seats::SeatRequirementPolicy;

/// Distinguishes runtime behavior for different stages of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub scoring: ScoringConfig,
    pub seat_policy: SeatRequirementPolicy,
    /// Wall-clock budget for scoring one request, if any.
    pub scoring_budget_ms: Option<u64>,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
        let json = environment == AppEnvironment::Production;

        let scoring = load_scoring_config()?;
        let seat_policy = match env::var("STANDBY_SEAT_TABLE") {
            Ok(table) => SeatRequirementPolicy::parse(&table)?,
            Err(_) => SeatRequirementPolicy::default(),
        };
        let scoring_budget_ms = env::var("STANDBY_SCORING_BUDGET_MS")
            .ok()
            .map(|raw| parse_value("STANDBY_SCORING_BUDGET_MS", &raw))
            .transpose()?;

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level, json },
            scoring,
            seat_policy,
            scoring_budget_ms,
        })
    }
}

fn load_scoring_config() -> Result<ScoringConfig, ConfigError> {
    let defaults = ScoringConfig::default();
    let config = ScoringConfig {
        buffer_max_minutes: env_or("STANDBY_BUFFER_MAX_MINUTES", defaults.buffer_max_minutes)?,
        base_weight: env_or("STANDBY_BASE_WEIGHT", defaults.base_weight)?,
        bonus_weight: env_or("STANDBY_BONUS_WEIGHT", defaults.bonus_weight)?,
        tie_epsilon: env_or("STANDBY_TIE_EPSILON", defaults.tie_epsilon)?,
        min_eligible_returns: env_or(
            "STANDBY_MIN_ELIGIBLE_RETURNS",
            defaults.min_eligible_returns,
        )?,
        hard_buffer_threshold_minutes: env_or(
            "STANDBY_HARD_BUFFER_MINUTES",
            defaults.hard_buffer_threshold_minutes,
        )?,
        exclude_negative_margin: env_or(
            "STANDBY_EXCLUDE_NEGATIVE_MARGIN",
            defaults.exclude_negative_margin,
        )?,
        stale_after_minutes: env_or("STANDBY_STALE_AFTER_MINUTES", defaults.stale_after_minutes)?,
    };
    config.validate()?;
    Ok(config)
}

fn env_or<T: FromStr>(key: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(key) {
        Ok(raw) => parse_value(key, &raw),
        Err(_) => Ok(default),
    }
}

fn parse_value<T: FromStr>(key: &'static str, raw: &str) -> Result<T, ConfigError> {
    raw.trim()
        .parse::<T>()
        .map_err(|_| ConfigError::InvalidValue {
            key,
            value: raw.to_string(),
        })
}

/// Settings controlling the HTTP server binding.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        if self.host.eq_ignore_ascii_case("localhost") {
            return Ok(SocketAddr::new(IpAddr::from([127, 0, 0, 1]), self.port));
        }

        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|source| ConfigError::InvalidHost { source })?;

        Ok(SocketAddr::new(ip, self.port))
    }
}

/// Tracing and metrics controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
    pub json: bool,
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidValue { key: &'static str, value: String },
    UnknownAgeBucket(String),
    MissingSeatWeight(AgeBucket),
    DuplicateSeatWeight(AgeBucket),
    MalformedSeatEntry(String),
    ZeroBufferMax,
    InvalidWeight { name: &'static str, value: f64 },
    InvalidEpsilon(f64),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidValue { key, value } => {
                write!(f, "{key} has an unparseable value '{value}'")
            }
            ConfigError::UnknownAgeBucket(name) => {
                write!(f, "seat table names unknown age bucket '{name}'")
            }
            ConfigError::MissingSeatWeight(bucket) => {
                write!(f, "seat table has no weight for '{}'", bucket.label())
            }
            ConfigError::DuplicateSeatWeight(bucket) => {
                write!(f, "seat table lists '{}' more than once", bucket.label())
            }
            ConfigError::MalformedSeatEntry(entry) => {
                write!(f, "seat table entry '{entry}' must look like bucket=seats")
            }
            ConfigError::ZeroBufferMax => write!(f, "buffer_max_minutes must be positive"),
            ConfigError::InvalidWeight { name, value } => {
                write!(f, "{name} must be finite and non-negative, got {value}")
            }
            ConfigError::InvalidEpsilon(value) => {
                write!(f, "tie_epsilon must be finite and non-negative: {value}")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::{Mutex, OnceLock};

    fn env_guard() -> &'static Mutex<()> {
        static GUARD: OnceLock<Mutex<()>> = OnceLock::new();
        GUARD.get_or_init(|| Mutex::new(()))
    }

    fn reset_env() {
        for key in [
            "APP_ENV",
            "APP_HOST",
            "APP_PORT",
            "APP_LOG_LEVEL",
            "STANDBY_BUFFER_MAX_MINUTES",
            "STANDBY_BASE_WEIGHT",
            "STANDBY_BONUS_WEIGHT",
            "STANDBY_TIE_EPSILON",
            "STANDBY_MIN_ELIGIBLE_RETURNS",
            "STANDBY_HARD_BUFFER_MINUTES",
            "STANDBY_EXCLUDE_NEGATIVE_MARGIN",
            "STANDBY_STALE_AFTER_MINUTES",
            "STANDBY_SEAT_TABLE",
            "STANDBY_SCORING_BUDGET_MS",
        ] {
            env::remove_var(key);
        }
    }

    #[test]
    fn load_uses_defaults_when_env_missing() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        let config = AppConfig::load().expect("config loads with defaults");
        assert_eq!(config.environment, AppEnvironment::Development);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.telemetry.log_level, "info");
        assert!(!config.telemetry.json);
        assert_eq!(config.scoring, ScoringConfig::default());
        assert_eq!(config.seat_policy, SeatRequirementPolicy::default());
        assert_eq!(config.scoring_budget_ms, None);
    }

    #[test]
    fn accepts_localhost_host() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("APP_HOST", "localhost");
        let config = AppConfig::load().expect("config loads");
        let addr = config.server.socket_addr().expect("localhost resolves");
        assert_eq!(addr, SocketAddr::new(IpAddr::from([127, 0, 0, 1]), 3000));
        reset_env();
    }

    #[test]
    fn scoring_overrides_are_applied() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("STANDBY_BUFFER_MAX_MINUTES", "90");
        env::set_var("STANDBY_TIE_EPSILON", "0.01");
        env::set_var("STANDBY_EXCLUDE_NEGATIVE_MARGIN", "false");
        env::set_var("STANDBY_SEAT_TABLE", "infant=1,child=1,adult=1");
        env::set_var("STANDBY_SCORING_BUDGET_MS", "250");

        let config = AppConfig::load().expect("config loads");
        assert_eq!(config.scoring.buffer_max_minutes, 90);
        assert_eq!(config.scoring.tie_epsilon, 0.01);
        assert!(!config.scoring.exclude_negative_margin);
        assert_eq!(config.seat_policy.weight(AgeBucket::Infant), 1);
        assert_eq!(config.scoring_budget_ms, Some(250));
        reset_env();
    }

    #[test]
    fn rejects_unknown_seat_bucket_at_load() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("STANDBY_SEAT_TABLE", "infant=0,child=1,adult=1,pet=1");
        let err = AppConfig::load().expect_err("unknown bucket is fatal");
        assert!(matches!(err, ConfigError::UnknownAgeBucket(ref name) if name == "pet"));
        reset_env();
    }

    #[test]
    fn rejects_invalid_weights_and_buffer() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("STANDBY_BASE_WEIGHT", "-0.2");
        assert!(matches!(
            AppConfig::load(),
            Err(ConfigError::InvalidWeight {
                name: "base_weight",
                ..
            })
        ));

        reset_env();
        env::set_var("STANDBY_BUFFER_MAX_MINUTES", "0");
        assert!(matches!(AppConfig::load(), Err(ConfigError::ZeroBufferMax)));

        reset_env();
        env::set_var("STANDBY_TIE_EPSILON", "lots");
        assert!(matches!(
            AppConfig::load(),
            Err(ConfigError::InvalidValue {
                key: "STANDBY_TIE_EPSILON",
                ..
            })
        ));
        reset_env();
    }
}
