//! Application configuration management.
//!
//! Configuration is loaded from a YAML file with environment variable overrides. The configuration
//! file path defaults to `config.yaml` but can be specified via `-f` flag or `FIRMDESK_CONFIG`
//! environment variable.
//!
//! ## Loading Priority
//!
//! Configuration sources are merged in the following order (later sources override earlier ones):
//!
//! 1. **YAML config file** - Base configuration (default: `config.yaml`)
//! 2. **Environment variables** - Variables prefixed with `FIRMDESK_` override YAML values
//! 3. **DATABASE_URL** - Special case: overrides `database_url` if set
//!
//! For nested config values, use double underscores in environment variables. For example,
//! `FIRMDESK_AUTH__ACCESS_TOKEN_SECRET=...` sets the `auth.access_token_secret` field.
//!
//! ## Signing secrets
//!
//! The access and refresh token secrets are process-wide configuration. They are validated
//! once at startup: a missing or empty secret is a fatal configuration error, never a
//! per-request failure. The two secrets must differ so that compromising one token class
//! does not compromise the other.

use clap::Parser;
use figment::{
    Figment,
    providers::{Env, Format, Yaml},
};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::errors::Error;

/// Simple CLI args - just for specifying config file
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to configuration file
    #[arg(short = 'f', long, env = "FIRMDESK_CONFIG", default_value = "config.yaml")]
    pub config: String,

    /// Validate configuration and exit without starting the server.
    /// Useful for CI/CD pipelines to catch config errors before deployment.
    #[arg(long)]
    pub validate: bool,
}

/// Main application configuration.
///
/// All fields have sensible defaults defined in the `Default` implementation,
/// except the signing secrets which must be provided.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// HTTP server host to bind to (e.g., "0.0.0.0" for all interfaces)
    pub host: String,
    /// HTTP server port to bind to
    pub port: u16,
    /// PostgreSQL connection string
    #[serde(skip_serializing_if = "Option::is_none")]
    pub database_url: Option<String>,
    /// Email address for the initial superadmin (created on first startup)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub superadmin_email: Option<String>,
    /// Password for the initial superadmin (optional, can be set via environment)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub superadmin_password: Option<String>,
    /// Authentication configuration (secrets, token lifetimes, password rules)
    pub auth: AuthConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            database_url: None,
            superadmin_email: None,
            superadmin_password: None,
            auth: AuthConfig::default(),
        }
    }
}

/// Authentication configuration: signing secrets, token lifetimes and
/// password hashing parameters.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct AuthConfig {
    /// Symmetric secret for signing access tokens
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_token_secret: Option<String>,
    /// Symmetric secret for signing refresh tokens (must differ from the access secret)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_token_secret: Option<String>,
    /// Access token lifetime (short-lived)
    #[serde(with = "humantime_serde")]
    pub access_token_ttl: Duration,
    /// Refresh token lifetime (long-lived)
    #[serde(with = "humantime_serde")]
    pub refresh_token_ttl: Duration,
    /// Password validation and hashing rules
    pub password: PasswordConfig,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            access_token_secret: None,
            refresh_token_secret: None,
            access_token_ttl: Duration::from_secs(15 * 60),
            refresh_token_ttl: Duration::from_secs(5 * 24 * 60 * 60),
            password: PasswordConfig::default(),
        }
    }
}

impl AuthConfig {
    /// The access-token signing secret. Config validation guarantees presence;
    /// the error path exists for states constructed without [`Config::load`].
    pub fn access_secret(&self) -> Result<&str, Error> {
        self.access_token_secret.as_deref().ok_or_else(|| Error::Internal {
            operation: "sign access token: access_token_secret is required".to_string(),
        })
    }

    /// The refresh-token signing secret.
    pub fn refresh_secret(&self) -> Result<&str, Error> {
        self.refresh_token_secret.as_deref().ok_or_else(|| Error::Internal {
            operation: "sign refresh token: refresh_token_secret is required".to_string(),
        })
    }
}

/// Password validation rules and Argon2 cost parameters.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct PasswordConfig {
    /// Minimum password length
    pub min_length: usize,
    /// Maximum password length
    pub max_length: usize,
    /// Argon2 memory cost in KiB (default: 19456 KiB = 19 MB, secure for production)
    pub argon2_memory_kib: u32,
    /// Argon2 iterations (default: 2, secure for production)
    pub argon2_iterations: u32,
    /// Argon2 parallelism (default: 1)
    pub argon2_parallelism: u32,
}

impl Default for PasswordConfig {
    fn default() -> Self {
        Self {
            min_length: 8,
            max_length: 128,
            argon2_memory_kib: 19456,
            argon2_iterations: 2,
            argon2_parallelism: 1,
        }
    }
}

impl Config {
    fn figment(args: &Args) -> Figment {
        Figment::new()
            .merge(Yaml::file(&args.config))
            .merge(Env::prefixed("FIRMDESK_").split("__"))
    }

    #[allow(clippy::result_large_err)]
    pub fn load(args: &Args) -> Result<Self, figment::Error> {
        let mut config: Self = Self::figment(args).extract()?;

        // DATABASE_URL wins over the config file, matching common deployment setups
        if let Ok(url) = std::env::var("DATABASE_URL") {
            config.database_url = Some(url);
        }

        config.validate().map_err(|e| figment::Error::from(e.to_string()))?;
        Ok(config)
    }

    /// Validate the configuration for consistency and required fields.
    ///
    /// An absent signing secret is a fatal startup condition: the process must
    /// refuse to start rather than fail on the first sign-in.
    pub fn validate(&self) -> Result<(), Error> {
        match &self.auth.access_token_secret {
            None => {
                return Err(Error::Internal {
                    operation: "Config validation: auth.access_token_secret is not configured. \
                     Set FIRMDESK_AUTH__ACCESS_TOKEN_SECRET or add it to the config file."
                        .to_string(),
                });
            }
            Some(secret) if secret.is_empty() => {
                return Err(Error::Internal {
                    operation: "Config validation: auth.access_token_secret must not be empty".to_string(),
                });
            }
            Some(_) => {}
        }

        match &self.auth.refresh_token_secret {
            None => {
                return Err(Error::Internal {
                    operation: "Config validation: auth.refresh_token_secret is not configured. \
                     Set FIRMDESK_AUTH__REFRESH_TOKEN_SECRET or add it to the config file."
                        .to_string(),
                });
            }
            Some(secret) if secret.is_empty() => {
                return Err(Error::Internal {
                    operation: "Config validation: auth.refresh_token_secret must not be empty".to_string(),
                });
            }
            Some(_) => {}
        }

        // Distinct secrets per token class: compromising one must not compromise the other
        if self.auth.access_token_secret == self.auth.refresh_token_secret {
            return Err(Error::Internal {
                operation: "Config validation: access_token_secret and refresh_token_secret must differ".to_string(),
            });
        }

        if self.auth.password.min_length > self.auth.password.max_length {
            return Err(Error::Internal {
                operation: format!(
                    "Config validation: Invalid password configuration: min_length ({}) cannot be greater than max_length ({})",
                    self.auth.password.min_length, self.auth.password.max_length
                ),
            });
        }

        if self.auth.password.min_length < 1 {
            return Err(Error::Internal {
                operation: "Config validation: Invalid password configuration: min_length must be at least 1".to_string(),
            });
        }

        Ok(())
    }

    /// The address the HTTP server binds to
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
