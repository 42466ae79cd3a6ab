use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};

use crate::workflows::cancellation::domain::NotificationConfig;
use crate::workflows::cancellation::settings::SystemSettings;

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
    pub workflow: WorkflowConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(&var_or("APP_ENV", "development"));

        let host = var_or("APP_HOST", "127.0.0.1");
        let port = var_or("APP_PORT", "3000")
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;

        let log_level = var_or("APP_LOG_LEVEL", "info");

        let defaults = SystemSettings::default();
        let workflow = WorkflowConfig {
            default_settlement_days: parse_days(
                "APP_DEFAULT_SETTLEMENT_DAYS",
                defaults.default_settlement_days,
            )?,
            notify_before_days: parse_days(
                "APP_NOTIFY_BEFORE_DAYS",
                defaults.notifications.notify_before_days,
            )?,
            notify_on_overdue: parse_flag(
                "APP_NOTIFY_ON_OVERDUE",
                defaults.notifications.notify_on_overdue,
            )?,
            enable_alerts: parse_flag("APP_ENABLE_ALERTS", defaults.notifications.enable_alerts)?,
            department_name: var_or("APP_DEPARTMENT_NAME", &defaults.department_name),
            section_name: var_or("APP_SECTION_NAME", &defaults.section_name),
            branch_name: var_or("APP_BRANCH_NAME", &defaults.branch_name),
        };

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            workflow,
        })
    }
}

fn var_or(name: &str, default: &str) -> String {
    env::var(name).unwrap_or_else(|_| default.to_string())
}

fn parse_days(name: &'static str, default: u32) -> Result<u32, ConfigError> {
    let Ok(value) = env::var(name) else {
        return Ok(default);
    };

    match value.trim().parse::<u32>() {
        Ok(days) => Ok(days),
        Err(_) => Err(ConfigError::InvalidNumber { name, value }),
    }
}

fn parse_flag(name: &'static str, default: bool) -> Result<bool, ConfigError> {
    let Ok(value) = env::var(name) else {
        return Ok(default);
    };

    let normalized = value.trim().to_ascii_lowercase();
    match normalized.as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidFlag { name, value }),
    }
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
}

/// Initial values for the settings store.
#[derive(Debug, Clone)]
pub struct WorkflowConfig {
    pub default_settlement_days: u32,
    pub notify_before_days: u32,
    pub notify_on_overdue: bool,
    pub enable_alerts: bool,
    pub department_name: String,
    pub section_name: String,
    pub branch_name: String,
}

impl WorkflowConfig {
    pub fn into_settings(self) -> Result<SystemSettings, ConfigError> {
        let settings = SystemSettings {
            department_name: self.department_name,
            section_name: self.section_name,
            branch_name: self.branch_name,
            default_settlement_days: self.default_settlement_days,
            notifications: NotificationConfig {
                notify_before_days: self.notify_before_days,
                notify_on_overdue: self.notify_on_overdue,
                enable_alerts: self.enable_alerts,
            },
        };
        settings
            .validate()
            .map_err(|err| ConfigError::InvalidSettings(err.to_string()))?;
        Ok(settings)
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidNumber { name: &'static str, value: String },
    InvalidFlag { name: &'static str, value: String },
    InvalidSettings(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidNumber { name, value } => {
                write!(f, "{name} must be a whole number of days, got '{value}'")
            }
            ConfigError::InvalidFlag { name, value } => {
                write!(f, "{name} must be true or false, got '{value}'")
            }
            ConfigError::InvalidSettings(reason) => write!(f, "invalid settings: {reason}"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            ConfigError::InvalidPort
            | ConfigError::InvalidNumber { .. }
            | ConfigError::InvalidFlag { .. }
            | ConfigError::InvalidSettings(_) => None,
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
        for name in [
            "APP_ENV",
            "APP_HOST",
            "APP_PORT",
            "APP_LOG_LEVEL",
            "APP_DEFAULT_SETTLEMENT_DAYS",
            "APP_NOTIFY_BEFORE_DAYS",
            "APP_NOTIFY_ON_OVERDUE",
            "APP_ENABLE_ALERTS",
            "APP_DEPARTMENT_NAME",
            "APP_SECTION_NAME",
            "APP_BRANCH_NAME",
        ] {
            env::remove_var(name);
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

        let settings = config.workflow.into_settings().expect("defaults are valid");
        assert_eq!(settings, SystemSettings::default());
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
    fn workflow_overrides_are_read() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("APP_DEFAULT_SETTLEMENT_DAYS", "30");
        env::set_var("APP_NOTIFY_BEFORE_DAYS", "5");
        env::set_var("APP_NOTIFY_ON_OVERDUE", "off");
        env::set_var("APP_BRANCH_NAME", "Northern Branch");

        let settings = AppConfig::load()
            .expect("config loads")
            .workflow
            .into_settings()
            .expect("overrides are valid");
        assert_eq!(settings.default_settlement_days, 30);
        assert_eq!(settings.notifications.notify_before_days, 5);
        assert!(!settings.notifications.notify_on_overdue);
        assert!(settings.notifications.enable_alerts);
        assert_eq!(settings.branch_name, "Northern Branch");
        reset_env();
    }

    #[test]
    fn invalid_values_name_the_variable() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("APP_NOTIFY_BEFORE_DAYS", "soon");
        let err = AppConfig::load().expect_err("non-numeric days rejected");
        assert!(err.to_string().contains("APP_NOTIFY_BEFORE_DAYS"));

        reset_env();
        env::set_var("APP_ENABLE_ALERTS", "maybe");
        let err = AppConfig::load().expect_err("unknown flag rejected");
        assert!(err.to_string().contains("APP_ENABLE_ALERTS"));

        reset_env();
        env::set_var("APP_DEFAULT_SETTLEMENT_DAYS", "0");
        let err = AppConfig::load()
            .expect("zero parses")
            .workflow
            .into_settings()
            .expect_err("zero settlement days rejected");
        assert!(matches!(err, ConfigError::InvalidSettings(_)));
        reset_env();
    }
}
