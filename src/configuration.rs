use std::{env, time};

use config::{Config, ConfigError, Environment, File};
use secrecy::{ExposeSecret, SecretString};
use sqlx::postgres::{PgConnectOptions, PgSslMode};
use sqlx::ConnectOptions;
use tracing::log::LevelFilter;
use url::{ParseError, Url};

use crate::mailer::{SmtpMailer, SmtpSecurity};

/// Settings
#[derive(Clone, serde::Deserialize)]
pub struct Settings {
    pub application: ApplicationSettings,
    pub database: DatabaseSettings,
    pub smtp: SmtpSettings,
    pub admin: AdminSettings,
}

impl Settings {
    /// Get settings from configuration files and environment variables
    pub fn get_config() -> Result<Self, ConfigError> {
        let path = env::current_dir().map_err(|e| {
            ConfigError::Message(format!("Failed to determine the current directory: {e}"))
        })?;
        let config_dir = path.join("config");

        // Detect the running environment (default: `dev`)
        let env: Env = env::var("APP_ENVIRONMENT")
            .unwrap_or_else(|_| "dev".into())
            .try_into()
            .map_err(ConfigError::Message)?;

        Config::builder()
            // Base configuration file
            .add_source(File::from(config_dir.join("base.yaml")).required(true))
            // Environment-specific configuration file
            .add_source(File::from(config_dir.join(env.as_str())).required(true))
            // Environment variables (e.g., `NEWSLETTER__SMTP__HOST=smtp.example.com`
            // would set Settings.smtp.host to smtp.example.com)
            .add_source(Environment::with_prefix("NEWSLETTER").separator("__"))
            .build()?
            .try_deserialize()
    }
}

/// Application settings
#[derive(Clone, serde::Deserialize)]
pub struct ApplicationSettings {
    pub app_host: String,
    pub app_port: u16,
    /// Public URL of this application, used to build unsubscribe links
    pub base_url: String,
    /// Secret used to sign session and flash message cookies (at least 64 bytes)
    pub session_key: SecretString,
}

impl ApplicationSettings {
    /// Parse base URL
    pub fn base_url(&self) -> Result<Url, ParseError> {
        Url::parse(&self.base_url)
    }
}

/// Database settings
#[derive(Clone, serde::Deserialize)]
pub struct DatabaseSettings {
    pub username: String,
    pub password: SecretString,
    pub host: String,
    pub port: u16,
    pub database: String,
    pub require_ssl: bool,
}

impl DatabaseSettings {
    /// Generate options and flags that can be used to configure a database connection
    pub fn db_options(&self) -> PgConnectOptions {
        let ssl_mode = if self.require_ssl {
            PgSslMode::Require
        } else {
            PgSslMode::Prefer
        };
        PgConnectOptions::new()
            .username(&self.username)
            .password(self.password.expose_secret())
            .host(&self.host)
            .port(self.port)
            .database(&self.database)
            .ssl_mode(ssl_mode)
            .log_statements(LevelFilter::Trace)
    }
}

/// SMTP relay settings
#[derive(Clone, serde::Deserialize)]
pub struct SmtpSettings {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: SecretString,
    /// Defaults to `username` when missing or empty
    #[serde(default)]
    pub sender_email: Option<String>,
    pub security: SmtpSecurity,
    pub timeout_secs: u64,
}

impl SmtpSettings {
    /// Sender address, falling back to the SMTP username
    pub fn sender_email(&self) -> &str {
        match self.sender_email.as_deref() {
            Some(sender) if !sender.trim().is_empty() => sender,
            _ => &self.username,
        }
    }

    /// Get configured timeout
    pub const fn timeout(&self) -> time::Duration {
        time::Duration::from_secs(self.timeout_secs)
    }

    /// Build the SMTP mailer
    pub fn mailer(&self, base_url: Url) -> anyhow::Result<SmtpMailer> {
        SmtpMailer::new(self, base_url)
    }
}

/// Default admin account, created at startup when missing
#[derive(Clone, serde::Deserialize)]
pub struct AdminSettings {
    pub username: String,
    pub password: SecretString,
}

/// Available runtime environments
#[derive(Debug)]
pub enum Env {
    Development,
    Production,
}

impl Env {
    /// Represent environment as a string
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Development => "dev",
            Self::Production => "prd",
        }
    }
}

impl TryFrom<String> for Env {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.to_lowercase().as_str() {
            "dev" => Ok(Self::Development),
            "prd" => Ok(Self::Production),
            other => Err(format!(
                "`{other}` is not a supported environment. Use either `dev` or `prd`"
            )),
        }
    }
}
