use std::path::PathBuf;

use thiserror::Error;

use crate::auth::CookiePolicy;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {name}: {message}")]
    InvalidValue { name: String, message: String },
    #[error("failed to parse {name} as integer: {source}")]
    ParseInt {
        name: String,
        #[source]
        source: std::num::ParseIntError,
    },
    #[error("failed to parse {name} as boolean: {value}")]
    ParseBool { name: String, value: String },
}

/// Deployment environment. Production turns on secure cookies by default.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    // Database
    pub database_path: PathBuf,

    // Web Server
    pub web_host: String,
    pub web_port: u16,
    pub environment: Environment,

    // Cookies
    pub cookie_secure: bool,

    // CORS
    pub cors_allowed_origins: Vec<String>,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if an environment variable is present but invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        let environment = parse_environment(&env_or_default("APP_ENV", "development"))?;

        Ok(Self {
            // Database
            database_path: PathBuf::from(env_or_default("DATABASE_PATH", "./data/auth.sqlite")),

            // Web Server
            web_host: env_or_default("WEB_HOST", "0.0.0.0"),
            web_port: parse_env_u16("WEB_PORT", 8080)?,
            environment,

            // Cookies
            cookie_secure: parse_env_bool(
                "COOKIE_SECURE",
                environment == Environment::Production,
            )?,

            // CORS
            cors_allowed_origins: parse_list(&env_or_default(
                "CORS_ALLOWED_ORIGINS",
                "http://localhost:5173",
            )),
        })
    }

    /// Validate that the configuration is usable.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.web_port == 0 {
            return Err(ConfigError::InvalidValue {
                name: "WEB_PORT".to_string(),
                message: "must be non-zero".to_string(),
            });
        }
        if self.cors_allowed_origins.is_empty() {
            return Err(ConfigError::InvalidValue {
                name: "CORS_ALLOWED_ORIGINS".to_string(),
                message: "must list at least one origin".to_string(),
            });
        }
        if self.cors_allowed_origins.iter().any(|o| o == "*") {
            return Err(ConfigError::InvalidValue {
                name: "CORS_ALLOWED_ORIGINS".to_string(),
                message: "wildcard origin cannot be used with credentialed requests".to_string(),
            });
        }
        if self.environment == Environment::Production && !self.cookie_secure {
            return Err(ConfigError::InvalidValue {
                name: "COOKIE_SECURE".to_string(),
                message: "cannot be disabled in production".to_string(),
            });
        }
        Ok(())
    }

    /// Cookie attributes derived from this configuration.
    #[must_use]
    pub const fn cookie_policy(&self) -> CookiePolicy {
        CookiePolicy {
            secure: self.cookie_secure,
        }
    }
}

fn env_or_default(name: &str, default: &str) -> String {
    std::env::var(name)
        .ok()
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn parse_env_u16(name: &str, default: u16) -> Result<u16, ConfigError> {
    match std::env::var(name) {
        Ok(val) if !val.is_empty() => val.parse().map_err(|e| ConfigError::ParseInt {
            name: name.to_string(),
            source: e,
        }),
        _ => Ok(default),
    }
}

fn parse_env_bool(name: &str, default: bool) -> Result<bool, ConfigError> {
    match std::env::var(name) {
        Ok(val) if !val.is_empty() => match val.to_lowercase().as_str() {
            "true" | "1" | "yes" | "on" => Ok(true),
            "false" | "0" | "no" | "off" => Ok(false),
            _ => Err(ConfigError::ParseBool {
                name: name.to_string(),
                value: val,
            }),
        },
        _ => Ok(default),
    }
}

fn parse_environment(value: &str) -> Result<Environment, ConfigError> {
    match value.to_lowercase().as_str() {
        "development" | "dev" => Ok(Environment::Development),
        "production" | "prod" => Ok(Environment::Production),
        _ => Err(ConfigError::InvalidValue {
            name: "APP_ENV".to_string(),
            message: format!("must be 'development' or 'production', got '{value}'"),
        }),
    }
}

fn parse_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}
