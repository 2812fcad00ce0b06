use config::{Config as ConfigBuilder, ConfigError, Environment, File};
use serde::Deserialize;
use std::env;

/// Fallback signing secret so a bare environment still boots.
/// Startup warns loudly when it is in use.
pub const DEFAULT_SESSION_SECRET: &str = "a_fallback_secret_key_if_not_set";

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    #[serde(default)]
    pub mail: MailConfig,
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct MailConfig {
    #[serde(default = "default_mail_server")]
    pub server: String,
    #[serde(default = "default_mail_port")]
    pub port: u16,
    #[serde(default)]
    pub use_tls: bool,
    #[serde(default)]
    pub use_ssl: bool,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    #[serde(default = "default_sender")]
    pub default_sender: String,
    #[serde(default)]
    pub recipient: String,
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            server: default_mail_server(),
            port: default_mail_port(),
            use_tls: false,
            use_ssl: false,
            username: String::new(),
            password: String::new(),
            default_sender: default_sender(),
            recipient: String::new(),
        }
    }
}

fn default_mail_server() -> String {
    "localhost".to_string()
}

fn default_mail_port() -> u16 {
    587
}

fn default_sender() -> String {
    "noreply@postbox.local".to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct SessionConfig {
    #[serde(default = "default_session_secret")]
    pub secret: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            secret: default_session_secret(),
        }
    }
}

impl SessionConfig {
    pub fn is_default_secret(&self) -> bool {
        self.secret == DEFAULT_SESSION_SECRET
    }
}

fn default_session_secret() -> String {
    DEFAULT_SESSION_SECRET.to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct ObservabilityConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Config {
    /// Load configuration from file and environment variables
    ///
    /// Priority (highest to lowest):
    /// 1. Legacy environment variables (MAIL_SERVER, RECIPIENT_EMAIL, etc.)
    /// 2. Prefixed environment variables (POSTBOX__MAIL__SERVER, etc.)
    /// 3. Config file specified by path
    /// 4. Hardcoded defaults
    pub fn load(config_path: Option<String>) -> Result<Self, ConfigError> {
        let mut builder = ConfigBuilder::builder();

        // Set defaults
        builder = builder
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 3000)?;

        // Load config file if path provided or CONFIG_PATH env var set
        let config_file_path = config_path
            .or_else(|| env::var("CONFIG_PATH").ok())
            .unwrap_or_else(|| "config/default.toml".to_string());

        // Try to load config file (optional - ignore if not found)
        if std::path::Path::new(&config_file_path).exists() {
            builder = builder.add_source(File::with_name(&config_file_path));
        }

        // Override with environment variables (POSTBOX__MAIL__SERVER, etc.)
        builder = builder.add_source(
            Environment::with_prefix("POSTBOX")
                .separator("__")
                .try_parsing(true),
        );

        // Also support the legacy environment variables without prefix
        if let Ok(server) = env::var("MAIL_SERVER") {
            builder = builder.set_override("mail.server", server)?;
        }
        if let Ok(port) = env::var("MAIL_PORT") {
            let port: u16 = port
                .parse()
                .map_err(|_| ConfigError::Message(format!("invalid MAIL_PORT: {port}")))?;
            builder = builder.set_override("mail.port", i64::from(port))?;
        }
        if let Ok(use_tls) = env::var("MAIL_USE_TLS") {
            builder = builder.set_override("mail.use_tls", parse_bool(&use_tls))?;
        }
        if let Ok(use_ssl) = env::var("MAIL_USE_SSL") {
            builder = builder.set_override("mail.use_ssl", parse_bool(&use_ssl))?;
        }
        if let Ok(username) = env::var("MAIL_USERNAME") {
            builder = builder.set_override("mail.username", username)?;
        }
        if let Ok(password) = env::var("MAIL_PASSWORD") {
            builder = builder.set_override("mail.password", password)?;
        }
        if let Ok(sender) = env::var("MAIL_DEFAULT_SENDER") {
            builder = builder.set_override("mail.default_sender", sender)?;
        }
        if let Ok(recipient) = env::var("RECIPIENT_EMAIL") {
            builder = builder.set_override("mail.recipient", recipient)?;
        }
        if let Ok(secret) = env::var("SECRET_KEY") {
            builder = builder.set_override("session.secret", secret)?;
        }

        builder.build()?.try_deserialize()
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.server.port == 0 {
            return Err("Server port must be greater than 0".to_string());
        }
        if self.mail.server.is_empty() {
            return Err("Mail server must be set".to_string());
        }
        if self.mail.port == 0 {
            return Err("Mail port must be greater than 0".to_string());
        }
        if self.mail.default_sender.is_empty() {
            return Err("Mail default sender must be set".to_string());
        }
        if self.mail.recipient.is_empty() {
            return Err("Recipient email must be set".to_string());
        }
        if self.session.secret.len() < 32 {
            return Err("Session secret must be at least 32 characters long".to_string());
        }
        Ok(())
    }
}

/// Boolean environment flags accept "true" (any case); anything else is false.
fn parse_bool(value: &str) -> bool {
    value.to_lowercase() == "true"
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_config() -> Config {
        Config {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 3000,
            },
            mail: MailConfig {
                recipient: "operator@example.com".to_string(),
                ..MailConfig::default()
            },
            session: SessionConfig {
                secret: "test_secret_key_minimum_32_characters_long".to_string(),
            },
            observability: ObservabilityConfig::default(),
        }
    }

    #[test]
    fn test_validation_valid_config() {
        assert!(valid_config().validate().is_ok());
    }

    #[test]
    fn test_validation_zero_server_port() {
        let mut config = valid_config();
        config.server.port = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_empty_mail_server() {
        let mut config = valid_config();
        config.mail.server = String::new();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_zero_mail_port() {
        let mut config = valid_config();
        config.mail.port = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_missing_recipient() {
        let mut config = valid_config();
        config.mail.recipient = String::new();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_short_secret() {
        let mut config = valid_config();
        config.session.secret = "short".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_default_secret_is_long_enough_and_flagged() {
        let session = SessionConfig::default();
        assert!(session.secret.len() >= 32);
        assert!(session.is_default_secret());

        let session = SessionConfig {
            secret: "an_explicitly_configured_signing_secret".to_string(),
        };
        assert!(!session.is_default_secret());
    }

    #[test]
    fn test_parse_bool_matches_legacy_flags() {
        assert!(parse_bool("true"));
        assert!(parse_bool("True"));
        assert!(parse_bool("TRUE"));
        assert!(!parse_bool("false"));
        assert!(!parse_bool("1"));
        assert!(!parse_bool(""));
    }
}
